//! Authentication API endpoints

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::Serialize;
use validator::Validate;

use crate::{
    db::{OrganizationRepository, UserRepository},
    middleware::auth::{create_access_token, create_refresh_token},
    middleware::AuthUser,
    models::{LoginRequest, MemberRole, RegisterRequest, TokenResponse, UserPublic},
    services::AuthService,
    utils::AppError,
    AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    payload.validate()?;
    if payload.password.len() < state.config.auth.password_min_length {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {} characters",
            state.config.auth.password_min_length
        )));
    }

    let users = UserRepository::new(&state.db);
    if users.get_by_email(&payload.email).await.map_err(|e| {
        tracing::error!("Failed to check existing user: {}", e);
        AppError::internal("Failed to register")
    })?
    .is_some()
    {
        return Err(AppError::conflict("Email already registered"));
    }

    let service = AuthService::new(state.db.clone());
    let (user, organization) = service
        .register(
            &payload.email,
            &payload.display_name,
            &payload.password,
            &payload.organization_name,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to register user: {}", e);
            AppError::internal("Failed to register")
        })?;

    let tokens = issue_tokens(&state, &user.id, &organization.id, &user.email)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            access_token: tokens.0,
            refresh_token: tokens.1,
            user: user.into(),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let service = AuthService::new(state.db.clone());
    let user = service
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(|e| {
            tracing::error!("Failed to authenticate user: {}", e);
            AppError::internal("Failed to authenticate")
        })?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    let organization = OrganizationRepository::new(&state.db)
        .find_for_user(user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve organization: {}", e);
            AppError::internal("Failed to authenticate")
        })?
        .ok_or_else(|| AppError::unauthorized("No active organization membership"))?;

    let tokens = issue_tokens(&state, &user.id, &organization.id, &user.email)?;

    Ok(Json(TokenResponse {
        access_token: tokens.0,
        refresh_token: tokens.1,
        user: user.into(),
    }))
}

/// Response for the current-session endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    user: UserPublic,
    organization_id: uuid::Uuid,
    role: MemberRole,
}

async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = UserRepository::new(&state.db)
        .get_by_id(auth_user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user: {}", e);
            AppError::internal("Failed to load user")
        })?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(MeResponse {
        user: user.into(),
        organization_id: auth_user.organization_id,
        role: auth_user.role,
    }))
}

fn issue_tokens(
    state: &AppState,
    user_id: &uuid::Uuid,
    organization_id: &uuid::Uuid,
    email: &str,
) -> Result<(String, String), AppError> {
    let access = create_access_token(
        user_id,
        organization_id,
        email,
        &state.config.auth.jwt_secret,
        state.config.auth.token_expiry_hours,
    )
    .map_err(|e| {
        tracing::error!("Failed to issue access token: {}", e);
        AppError::internal("Failed to issue token")
    })?;

    let refresh = create_refresh_token(
        user_id,
        organization_id,
        email,
        &state.config.auth.jwt_secret,
        state.config.auth.refresh_token_expiry_days,
    )
    .map_err(|e| {
        tracing::error!("Failed to issue refresh token: {}", e);
        AppError::internal("Failed to issue token")
    })?;

    Ok((access, refresh))
}
