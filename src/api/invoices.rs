//! Invoice API endpoints
//!
//! Invoices are created directly here or arrive through quote conversion.
//! `GET /{id}` is what the dashboard's document view fetches after a
//! successful conversion.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    db::InvoiceRepository,
    middleware::AuthUser,
    models::{CreateInvoiceRequest, Invoice},
    utils::{validation, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/{id}", get(get_invoice))
}

async fn list_invoices(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let repo = InvoiceRepository::new(&state.db);
    let invoices = repo.list(auth_user.organization_id).await.map_err(|e| {
        tracing::error!("Failed to list invoices: {}", e);
        AppError::internal("Failed to list invoices")
    })?;

    Ok(Json(invoices))
}

async fn get_invoice(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid invoice ID"))?;

    let repo = InvoiceRepository::new(&state.db);
    let invoice = repo
        .get_by_id(auth_user.organization_id, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get invoice: {}", e);
            AppError::internal("Failed to get invoice")
        })?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;

    Ok(Json(invoice))
}

async fn create_invoice(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    if payload.client_name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Client name must not be empty".to_string(),
        ));
    }
    if !validation::validate_currency(&payload.currency) {
        return Err(AppError::ValidationError(
            "Currency must be a three-letter ISO 4217 code".to_string(),
        ));
    }
    if payload.total.is_sign_negative() {
        return Err(AppError::ValidationError(
            "Total must not be negative".to_string(),
        ));
    }

    let repo = InvoiceRepository::new(&state.db);
    let invoice = repo
        .create(auth_user.organization_id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create invoice: {}", e);
            AppError::internal("Failed to create invoice")
        })?;

    Ok((StatusCode::CREATED, Json(invoice)))
}
