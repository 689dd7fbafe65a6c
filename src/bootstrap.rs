use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{Connection, PgPool, Postgres};
use tokio::sync::Mutex;

use crate::auth::password;
use crate::config::BootstrapAdmin;
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;

/// Fixed advisory-lock key serializing bootstrap across all processes that
/// share the store.
pub const BOOTSTRAP_LOCK_KEY: i64 = 0xB007;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// No bootstrap credentials configured.
    Disabled,
    /// Another instance holds the lock and is handling bootstrap.
    LockDenied,
    /// An account with the bootstrap email already exists.
    AlreadyExists,
    /// This instance created the admin account.
    Created,
}

/// Store-managed mutual exclusion usable across independent processes.
#[async_trait]
pub trait StartupLock: Send + Sync {
    async fn try_acquire(&self, key: i64) -> Result<bool, sqlx::Error>;
    async fn release(&self, key: i64) -> Result<(), sqlx::Error>;
}

/// Postgres session advisory lock. Session locks are connection-scoped, so
/// the acquiring connection is held out of the pool until release.
pub struct PgAdvisoryLock {
    pool: PgPool,
    held: Mutex<Option<PoolConnection<Postgres>>>,
}

impl PgAdvisoryLock {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            held: Mutex::new(None),
        }
    }
}

#[async_trait]
impl StartupLock for PgAdvisoryLock {
    async fn try_acquire(&self, key: i64) -> Result<bool, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let (granted,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
            .bind(key)
            .fetch_one(&mut *conn)
            .await?;
        if granted {
            *self.held.lock().await = Some(conn);
        }
        Ok(granted)
    }

    async fn release(&self, key: i64) -> Result<(), sqlx::Error> {
        let Some(mut conn) = self.held.lock().await.take() else {
            return Ok(());
        };
        match sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(key)
            .execute(&mut *conn)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                // Closing the session also releases its advisory locks.
                let _ = conn.detach().close().await;
                Err(e)
            }
        }
    }
}

/// Create the bootstrap administrator at most once, fleet-wide.
///
/// Safe to run from any number of concurrently starting processes: the
/// check-then-create runs under a store-level lock, and the lock is released
/// on every exit path, including a failed create.
pub async fn ensure_bootstrap_admin(
    pool: &PgPool,
    lock: &dyn StartupLock,
    admin: Option<&BootstrapAdmin>,
) -> Result<BootstrapOutcome, AppError> {
    let Some(admin) = admin else {
        tracing::info!("Bootstrap admin not configured, skipping");
        return Ok(BootstrapOutcome::Disabled);
    };

    if !lock.try_acquire(BOOTSTRAP_LOCK_KEY).await? {
        tracing::info!("Bootstrap lock held by another instance, skipping");
        return Ok(BootstrapOutcome::LockDenied);
    }

    let result = create_if_missing(pool, admin).await;
    let released = lock.release(BOOTSTRAP_LOCK_KEY).await;

    let outcome = result?;
    released?;

    Ok(outcome)
}

async fn create_if_missing(
    pool: &PgPool,
    admin: &BootstrapAdmin,
) -> Result<BootstrapOutcome, AppError> {
    let email = admin.email.trim().to_lowercase();

    let mut tx = pool.begin().await?;

    if db::users::find_by_email(&mut *tx, &email).await?.is_some() {
        tracing::info!("Bootstrap admin already exists");
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    let pw_hash = password::hash(&admin.password).map_err(AppError::Internal)?;
    let user = db::users::create(&mut *tx, &email, &pw_hash, None, None, true).await?;
    tx.commit().await?;

    tracing::info!("Bootstrap admin created with id={}", user.id);

    audit::log_event(
        pool,
        Some(user.id),
        "user.bootstrapped",
        "user",
        Some(user.id),
        None,
    )
    .await;

    Ok(BootstrapOutcome::Created)
}
