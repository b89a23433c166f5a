/**
 * Server Configuration
 *
 * Loads the Conversation Store configuration from environment variables.
 *
 * # Configuration Sources
 *
 * - `DATABASE_URL` - Postgres connection string; without it messages are
 *   kept in memory
 * - `SERVER_PORT` - listen port (default 3000)
 * - `JWT_SECRET` - signing key for operator tokens
 * - `OPERATOR_PASSWORD_HASH` - bcrypt hash of the operator password
 * - `OPERATOR_PASSWORD` - plaintext fallback, hashed at startup
 *
 * # Error Handling
 *
 * A missing or unreachable database is logged and the server falls back to
 * the in-memory repository. A missing operator password disables operator
 * login.
 */

use sqlx::PgPool;

use crate::backend::auth::OperatorAuth;
use crate::backend::error::BackendError;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

const DEV_JWT_SECRET: &str = "supportdesk-dev-secret-change-in-production";

/// Database configuration result
pub type DatabaseConfig = Option<PgPool>;

/// Settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub operator_password_hash: Option<String>,
    pub operator_password: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        Self {
            port,
            jwt_secret,
            operator_password_hash: non_empty("OPERATOR_PASSWORD_HASH"),
            operator_password: non_empty("OPERATOR_PASSWORD"),
        }
    }

    /// Build operator authentication, preferring the pre-hashed password
    pub fn operator_auth(&self) -> Result<OperatorAuth, BackendError> {
        if let Some(hash) = &self.operator_password_hash {
            return Ok(OperatorAuth::new(Some(hash.clone()), self.jwt_secret.clone()));
        }
        if let Some(password) = &self.operator_password {
            tracing::info!("Hashing OPERATOR_PASSWORD at startup");
            return OperatorAuth::from_password(
                password,
                bcrypt::DEFAULT_COST,
                self.jwt_secret.clone(),
            );
        }
        tracing::warn!("No operator password configured. Operator login is disabled.");
        Ok(OperatorAuth::new(None, self.jwt_secret.clone()))
    }
}

/// Load and initialize database connection pool
///
/// 1. Reads `DATABASE_URL` from environment
/// 2. Creates a PostgreSQL connection pool
/// 3. Runs database migrations
///
/// Returns `None` if `DATABASE_URL` is not set, the connection fails or
/// the migrations cannot be applied.
pub async fn load_database() -> DatabaseConfig {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set. Conversations will be kept in memory.");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Conversations will be kept in memory.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    if let Err(e) = run_migrations(&pool).await {
        tracing::error!("{}", e);
        tracing::warn!("Conversations will be kept in memory.");
        return None;
    }
    tracing::info!("Database migrations completed successfully");

    Some(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), BackendError> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}
