//! Organization and membership API endpoints
//!
//! All routes operate on the caller's own organization; there is no
//! cross-tenant surface. Membership management requires the owner or admin
//! role, and the owner can never be removed.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{OrganizationRepository, UserRepository},
    middleware::AuthUser,
    models::{InviteMemberRequest, Member, MemberRole, MemberStatus, Organization},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/current", get(get_current_organization))
        .route("/current/members", get(list_members).post(invite_member))
        .route("/current/members/{user_id}", axum::routing::delete(remove_member))
}

fn require_member_management(auth_user: &AuthUser) -> Result<(), AppError> {
    if auth_user.role.can_manage_members() {
        Ok(())
    } else {
        Err(AppError::forbidden("owner or admin role required"))
    }
}

async fn get_current_organization(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Organization>, AppError> {
    let repo = OrganizationRepository::new(&state.db);
    let org = repo
        .get_by_id(auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get current organization: {}", e);
            AppError::internal("Failed to get current organization")
        })?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    Ok(Json(org))
}

async fn list_members(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Member>>, AppError> {
    let repo = OrganizationRepository::new(&state.db);
    let members = repo
        .list_members(auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list members: {}", e);
            AppError::internal("Failed to list members")
        })?;

    Ok(Json(members))
}

async fn invite_member(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<InviteMemberRequest>,
) -> Result<(StatusCode, Json<Member>), AppError> {
    require_member_management(&auth_user)?;
    payload.validate()?;

    if payload.role == MemberRole::Owner {
        return Err(AppError::bad_request("Organization already has an owner"));
    }

    let users = UserRepository::new(&state.db);
    let user = users
        .get_by_email(&payload.email)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up invitee: {}", e);
            AppError::internal("Failed to invite member")
        })?
        .ok_or_else(|| AppError::not_found("No user with that email"))?;

    let repo = OrganizationRepository::new(&state.db);
    let member = repo
        .add_member(
            auth_user.organization_id,
            user.id,
            payload.role,
            MemberStatus::Invited,
        )
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::conflict("User is already a member")
            } else {
                tracing::error!("Failed to invite member: {}", e);
                AppError::internal("Failed to invite member")
            }
        })?;

    Ok((StatusCode::CREATED, Json(member)))
}

async fn remove_member(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<bool>, AppError> {
    require_member_management(&auth_user)?;
    let user_id =
        Uuid::parse_str(&user_id).map_err(|_| AppError::bad_request("Invalid user ID"))?;

    let repo = OrganizationRepository::new(&state.db);
    let org = repo
        .get_by_id(auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get organization: {}", e);
            AppError::internal("Failed to remove member")
        })?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    if org.owner_id == user_id {
        return Err(AppError::bad_request(
            "The organization owner cannot be removed",
        ));
    }

    let removed = repo
        .remove_member(auth_user.organization_id, user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove member: {}", e);
            AppError::internal("Failed to remove member")
        })?;

    if !removed {
        return Err(AppError::not_found("Member not found"));
    }

    Ok(Json(true))
}
