//! Quote API endpoints
//!
//! Quotes are listed and created here, but every status mutation goes
//! through the lifecycle service, which is the authority for the workflow.
//! The action path segment parses into the closed [`QuoteAction`] union;
//! unknown segments are rejected before any database work happens.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    db::QuoteRepository,
    middleware::AuthUser,
    models::{ConversionResponse, CreateQuoteRequest, Quote, QuoteAction},
    services::LifecycleService,
    utils::{validation, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quotes).post(create_quote))
        .route("/{id}", get(get_quote))
        .route("/{id}/convert-to-invoice", post(convert_to_invoice))
        .route("/{id}/{action}", post(perform_action))
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::bad_request("Invalid quote ID"))
}

async fn list_quotes(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Quote>>, AppError> {
    let repo = QuoteRepository::new(&state.db);
    let quotes = repo.list(auth_user.organization_id).await.map_err(|e| {
        tracing::error!("Failed to list quotes: {}", e);
        AppError::internal("Failed to list quotes")
    })?;

    Ok(Json(quotes))
}

async fn get_quote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Quote>, AppError> {
    let id = parse_id(&id)?;

    let repo = QuoteRepository::new(&state.db);
    let quote = repo
        .get_by_id(auth_user.organization_id, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get quote: {}", e);
            AppError::internal("Failed to get quote")
        })?
        .ok_or_else(|| AppError::not_found("Quote not found"))?;

    Ok(Json(quote))
}

async fn create_quote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<Quote>), AppError> {
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

    let repo = QuoteRepository::new(&state.db);
    let quote = repo
        .create(auth_user.organization_id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quote: {}", e);
            AppError::internal("Failed to create quote")
        })?;

    Ok((StatusCode::CREATED, Json(quote)))
}

async fn perform_action(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, action)): Path<(String, String)>,
) -> Result<Json<Quote>, AppError> {
    let id = parse_id(&id)?;
    let action: QuoteAction = action
        .parse()
        .map_err(|_| AppError::bad_request(format!("Unknown quote action: {}", action)))?;

    let service = LifecycleService::new(&state.db);
    let quote = service
        .perform_action(auth_user.organization_id, id, action)
        .await?;

    Ok(Json(quote))
}

async fn convert_to_invoice(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ConversionResponse>), AppError> {
    let id = parse_id(&id)?;

    let service = LifecycleService::new(&state.db);
    let invoice = service
        .convert_to_invoice(auth_user.organization_id, id)
        .await?;

    Ok((StatusCode::CREATED, Json(ConversionResponse { invoice })))
}
