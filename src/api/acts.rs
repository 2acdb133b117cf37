//! Work-completion act API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    db::ActRepository,
    middleware::AuthUser,
    models::{Act, CreateActRequest},
    utils::{validation, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_acts).post(create_act))
        .route("/{id}", get(get_act).delete(delete_act))
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::bad_request("Invalid act ID"))
}

async fn list_acts(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Act>>, AppError> {
    let repo = ActRepository::new(&state.db);
    let acts = repo.list(auth_user.organization_id).await.map_err(|e| {
        tracing::error!("Failed to list acts: {}", e);
        AppError::internal("Failed to list acts")
    })?;

    Ok(Json(acts))
}

async fn get_act(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Act>, AppError> {
    let id = parse_id(&id)?;

    let repo = ActRepository::new(&state.db);
    let act = repo
        .get_by_id(auth_user.organization_id, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get act: {}", e);
            AppError::internal("Failed to get act")
        })?
        .ok_or_else(|| AppError::not_found("Act not found"))?;

    Ok(Json(act))
}

async fn create_act(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateActRequest>,
) -> Result<(StatusCode, Json<Act>), AppError> {
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

    let repo = ActRepository::new(&state.db);
    let act = repo
        .create(auth_user.organization_id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create act: {}", e);
            AppError::internal("Failed to create act")
        })?;

    Ok((StatusCode::CREATED, Json(act)))
}

async fn delete_act(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;

    let repo = ActRepository::new(&state.db);
    let deleted = repo
        .delete(auth_user.organization_id, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete act: {}", e);
            AppError::internal("Failed to delete act")
        })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Act not found"))
    }
}
