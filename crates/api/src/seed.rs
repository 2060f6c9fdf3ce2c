//! First-run admin account.

use efference_core::roles::ROLE_ADMIN;
use efference_db::models::user::CreateUser;
use efference_db::repositories::UserRepo;
use efference_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};

/// Credentials for the bootstrap admin, read from the environment.
///
/// | Env Var          | Default         |
/// |------------------|-----------------|
/// | `ADMIN_EMAIL`    | unset (no seed) |
/// | `ADMIN_PASSWORD` | unset (no seed) |
/// | `ADMIN_NAME`     | `Admin`         |
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AdminSeed {
    /// `None` unless both `ADMIN_EMAIL` and `ADMIN_PASSWORD` are set.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.trim().is_empty())?;
        let password = std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty())?;
        let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".into());
        Some(Self {
            name,
            email,
            password,
        })
    }
}

/// Create the admin account if no user holds its email yet.
///
/// Returns `true` when a user was created.
pub async fn seed_admin(pool: &DbPool, seed: &AdminSeed) -> anyhow::Result<bool> {
    if UserRepo::email_exists(pool, &seed.email).await? {
        tracing::debug!(email = %seed.email, "Admin account already present");
        return Ok(false);
    }

    validate_password_strength(&seed.password).map_err(anyhow::Error::msg)?;
    let password_hash = hash_password(&seed.password)
        .map_err(|e| anyhow::anyhow!("Password hashing error: {e}"))?;

    let admin = UserRepo::create(
        pool,
        &CreateUser {
            name: seed.name.clone(),
            email: seed.email.clone(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
            is_invited: false,
        },
    )
    .await?;

    tracing::info!(user_id = %admin.id, "Seeded admin account");
    Ok(true)
}
