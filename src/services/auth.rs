//! Authentication service
//!
//! Provides password hashing with Argon2 and account registration. A new
//! account always comes with its own organization: the registering user is
//! inserted, the organization is created with them as owner, and the owner
//! membership row is written, all in one transaction.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::rngs::OsRng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::UserRepository;
use crate::models::{MemberRole, MemberStatus, Organization, User};

/// Authentication service for user management
pub struct AuthService {
    pool: SqlitePool,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Hash a password using Argon2id
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Authenticate a user by email and password
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let repo = UserRepository::new(&self.pool);
        let user = repo.get_by_email(email).await?;

        match user {
            Some(user) => {
                if Self::verify_password(password, &user.password_hash)? {
                    Ok(Some(user))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    /// Register a new user together with their organization
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
        organization_name: &str,
    ) -> Result<(User, Organization)> {
        let password_hash = Self::hash_password(password)?;

        let user_id = Uuid::new_v4();
        let organization_id = Uuid::new_v4();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin registration transaction")?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id.to_string())
        .bind(email)
        .bind(display_name)
        .bind(&password_hash)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .context("Failed to insert user")?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(organization_id.to_string())
        .bind(organization_name)
        .bind(user_id.to_string())
        .bind(&now_str)
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .context("Failed to insert organization")?;

        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role, status,
                                              created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(organization_id.to_string())
        .bind(user_id.to_string())
        .bind(MemberRole::Owner.as_str())
        .bind(MemberStatus::Active.as_str())
        .bind(&now_str)
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .context("Failed to insert owner membership")?;

        tx.commit()
            .await
            .context("Failed to commit registration transaction")?;

        let user = User {
            id: user_id,
            email: email.to_string(),
            display_name: display_name.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        };
        let organization = Organization {
            id: organization_id,
            name: organization_name.to_string(),
            owner_id: user_id,
            created_at: now,
            updated_at: now,
        };

        Ok((user, organization))
    }
}
