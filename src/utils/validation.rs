//! Input validation utilities

/// Validate an ISO 4217 currency code (three uppercase ASCII letters)
pub fn validate_currency(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}
