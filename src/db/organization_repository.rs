//! Organization (tenant) and membership repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{parse_db_timestamp, parse_db_uuid};
use crate::models::{Member, MemberRole, MemberStatus, Organization};

#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: String,
    name: String,
    owner_id: String,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    organization_id: String,
    user_id: String,
    email: String,
    role: String,
    status: String,
    created_at: String,
    updated_at: String,
}

pub struct OrganizationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            "SELECT id, name, owner_id, created_at, updated_at FROM organizations WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get organization")?;

        row.map(row_to_organization).transpose()
    }

    /// Find the organization a user acts in
    ///
    /// A user can hold memberships in several organizations; login scopes
    /// the session to the earliest non-removed one.
    pub async fn find_for_user(&self, user_id: Uuid) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT o.id, o.name, o.owner_id, o.created_at, o.updated_at
            FROM organizations o
            INNER JOIN organization_members m ON m.organization_id = o.id
            WHERE m.user_id = ? AND m.status != 'removed'
            ORDER BY m.created_at
            LIMIT 1
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to find organization for user")?;

        row.map(row_to_organization).transpose()
    }

    pub async fn list_members(&self, organization_id: Uuid) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT m.organization_id, m.user_id, u.email, m.role, m.status,
                   m.created_at, m.updated_at
            FROM organization_members m
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = ?
            ORDER BY m.created_at
            "#,
        )
        .bind(organization_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list members")?;

        rows.into_iter().map(row_to_member).collect()
    }

    pub async fn get_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT m.organization_id, m.user_id, u.email, m.role, m.status,
                   m.created_at, m.updated_at
            FROM organization_members m
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = ? AND m.user_id = ?
            "#,
        )
        .bind(organization_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get member")?;

        row.map(row_to_member).transpose()
    }

    pub async fn add_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
        status: MemberStatus,
    ) -> Result<Member> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role, status,
                                              created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(organization_id.to_string())
        .bind(user_id.to_string())
        .bind(role.as_str())
        .bind(status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to add member")?;

        self.get_member(organization_id, user_id)
            .await?
            .context("Failed to retrieve added member")
    }

    /// Mark a membership removed; returns `false` when no such member exists
    pub async fn remove_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE organization_members
            SET status = ?, updated_at = ?
            WHERE organization_id = ? AND user_id = ? AND status != ?
            "#,
        )
        .bind(MemberStatus::Removed.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(organization_id.to_string())
        .bind(user_id.to_string())
        .bind(MemberStatus::Removed.as_str())
        .execute(self.pool)
        .await
        .context("Failed to remove member")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_organization(row: OrganizationRow) -> Result<Organization> {
    Ok(Organization {
        id: parse_db_uuid(&row.id)?,
        name: row.name,
        owner_id: parse_db_uuid(&row.owner_id)?,
        created_at: parse_db_timestamp(&row.created_at)?,
        updated_at: parse_db_timestamp(&row.updated_at)?,
    })
}

fn row_to_member(row: MemberRow) -> Result<Member> {
    Ok(Member {
        organization_id: parse_db_uuid(&row.organization_id)?,
        user_id: parse_db_uuid(&row.user_id)?,
        email: row.email,
        role: row.role.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        status: row.status.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        created_at: parse_db_timestamp(&row.created_at)?,
        updated_at: parse_db_timestamp(&row.updated_at)?,
    })
}
