//! Dashboard user accounts.

use std::sync::Arc;

use anyhow::anyhow;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::AdminSeed;
use crate::error::{AppError, FieldViolation, ValidationError};
use crate::models::{NewUser, User, UserChanges};
use crate::store::UserStore;

// ---

const BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.store.list_users().await?)
    }

    pub async fn create_user(&self, req: CreateUser) -> Result<User, AppError> {
        // ---
        let mut violations = check_identity(&req.name, &req.email);
        if req.password.is_empty() {
            violations.push(FieldViolation::new("password", "is required"));
        }
        if !violations.is_empty() {
            return Err(ValidationError { violations }.into());
        }

        let user = NewUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash: hash_password(req.password).await?,
        };
        let stored = self.store.insert_user(&user).await?;

        tracing::info!("Created user {} <{}>", stored.id, stored.email);
        Ok(stored)
    }

    /// Replace name and email; the password only changes when supplied.
    pub async fn update_user(&self, id: Uuid, req: UpdateUser) -> Result<User, AppError> {
        // ---
        let violations = check_identity(&req.name, &req.email);
        if !violations.is_empty() {
            return Err(ValidationError { violations }.into());
        }

        let password_hash = match req.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };
        let changes = UserChanges {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash,
        };

        let updated = self
            .store
            .update_user(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

        tracing::info!("Updated user {}", id);
        Ok(updated)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        // ---
        if !self.store.delete_user(id).await? {
            return Err(AppError::NotFound(format!("user {id}")));
        }
        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Create the seed admin when no account exists yet. Returns whether one was
    /// created; calling it again is a no-op.
    pub async fn ensure_default_admin(&self, seed: &AdminSeed) -> Result<bool, AppError> {
        // ---
        if self.store.count_users().await? > 0 {
            tracing::debug!("Users present, skipping default admin");
            return Ok(false);
        }

        let admin = NewUser {
            name: seed.name.clone(),
            email: seed.email.clone(),
            password_hash: hash_password(seed.password.clone()).await?,
        };
        self.store.insert_user(&admin).await?;

        tracing::warn!(
            "Default admin user created: {} (change its password)",
            seed.email
        );
        Ok(true)
    }
}

fn check_identity(name: &str, email: &str) -> Vec<FieldViolation> {
    // ---
    let mut violations = Vec::new();
    if name.trim().is_empty() {
        violations.push(FieldViolation::new("name", "is required"));
    }
    let email = email.trim();
    if email.is_empty() {
        violations.push(FieldViolation::new("email", "is required"));
    } else if !is_plausible_email(email) {
        violations.push(FieldViolation::new("email", "must be a valid email address"));
    }
    violations
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

/// bcrypt is CPU bound, so it runs off the async workers.
pub(crate) async fn hash_password(password: String) -> Result<String, AppError> {
    // ---
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| anyhow!("password hashing task failed: {e}"))?
        .map_err(|e| AppError::Internal(anyhow!("password hashing failed: {e}")))
}

pub(crate) async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    // ---
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| anyhow!("password check task failed: {e}"))?
        .map_err(|e| AppError::Internal(anyhow!("password check failed: {e}")))
}
