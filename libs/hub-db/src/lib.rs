//! SQLite access for PortfoHub.
//!
//! One sqlx pool is opened per process and shared with SeaORM. Every new
//! connection gets the configured pragmas plus `foreign_keys = ON`:
//!
//! - `journal_mode`: WAL for files, DELETE for in-memory databases
//! - `synchronous`: NORMAL
//! - `busy_timeout`: from [`ConnectOpts`] unless the DSN overrides it
//!
//! Pragmas may also be passed in the DSN query, e.g.
//! `sqlite://database/portfohub.db?journal_mode=delete&busy_timeout=1000`.

mod sqlite;

pub use sqlite::{absolutize_sqlite_dsn, is_memory_dsn};

use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unsupported DSN, expected sqlite:...: {0}")]
    UnknownDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Pool size for file databases. In-memory databases always use one connection.
    pub max_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    pub busy_timeout: Option<Duration>,
    /// Create missing parent directories of the database file.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(30)),
            busy_timeout: Some(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS)),
            create_sqlite_dirs: true,
        }
    }
}

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Clone, Debug)]
pub struct DbHandle {
    pool: SqlitePool,
    sea: DatabaseConnection,
    dsn: String,
}

impl DbHandle {
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let dsn = dsn.trim();
        if !dsn.starts_with("sqlite:") {
            return Err(DbError::UnknownDsn(dsn.to_string()));
        }

        let memory = is_memory_dsn(dsn);
        if !memory && opts.create_sqlite_dirs {
            let parent = sqlite::file_path(dsn).and_then(|p| p.parent().map(|d| d.to_path_buf()));
            if let Some(parent) = parent.filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(&parent)?;
            }
        }

        let (clean_dsn, pragmas) = sqlite::extract_pragmas(dsn);

        let default_journal = if memory {
            SqliteJournalMode::Delete
        } else {
            SqliteJournalMode::Wal
        };
        let busy_timeout = pragmas
            .busy_timeout_ms
            .map(Duration::from_millis)
            .or(opts.busy_timeout)
            .unwrap_or(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS));

        let connect_opts = SqliteConnectOptions::from_str(&clean_dsn)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(pragmas.journal_mode.unwrap_or(default_journal))
            .synchronous(pragmas.synchronous.unwrap_or(SqliteSynchronous::Normal))
            .busy_timeout(busy_timeout);

        let mut pool_opts = SqlitePoolOptions::new();
        if memory {
            // Each connection to :memory: is a separate database; keep exactly one alive.
            pool_opts = pool_opts
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else if let Some(n) = opts.max_conns {
            pool_opts = pool_opts.max_connections(n);
        }
        if let Some(t) = opts.acquire_timeout {
            pool_opts = pool_opts.acquire_timeout(t);
        }

        let pool = pool_opts.connect_with(connect_opts).await?;
        let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
        tracing::debug!(dsn = %clean_dsn, memory, "sqlite pool ready");

        Ok(Self {
            pool,
            sea,
            dsn: clean_dsn,
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// DSN as handed to sqlx (pragma parameters removed).
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn is_memory(&self) -> bool {
        is_memory_dsn(&self.dsn)
    }

    pub fn sqlx_sqlite(&self) -> &SqlitePool {
        &self.pool
    }

    /// SeaORM connection (clone of a cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    pub fn seaorm(&self) -> &DatabaseConnection {
        &self.sea
    }
}
