//! Integration test modules

mod auth_tests;
mod document_tests;
mod organization_tests;
mod quote_lifecycle_tests;
mod repository_tests;
