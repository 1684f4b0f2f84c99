//! Repository backend selection.

use crate::server::config::ServerConfig;
use roster_tonic_core::roster::repository::{
    EmployeeRepository, UserRepository,
    memory::{InMemoryEmployeeRepository, InMemoryUserRepository},
};
use std::sync::Arc;

/// The repositories every handler is built from.
#[derive(Clone, Debug)]
pub struct Backends {
    pub employees: Arc<dyn EmployeeRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Backends {
    /// Process-local maps. Contents are lost on restart.
    pub fn in_memory() -> Self {
        Self {
            employees: Arc::new(InMemoryEmployeeRepository::default()),
            users: Arc::new(InMemoryUserRepository::default()),
        }
    }

    /// Postgres when a database URL is configured, in-memory otherwise.
    pub async fn connect(config: &ServerConfig) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        {
            if let Some(url) = config.database_url.as_deref() {
                use roster_tonic_core::roster::repository::postgres::{
                    PgEmployeeRepository, PgUserRepository,
                };

                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .connect(url)
                    .await?;
                tracing::info!(
                    max_connections = config.db_max_connections,
                    "using postgres repositories"
                );
                return Ok(Self {
                    employees: Arc::new(PgEmployeeRepository::new(pool.clone())),
                    users: Arc::new(PgUserRepository::new(pool)),
                });
            }
        }

        let _ = config;
        tracing::warn!("no database configured, using in-memory repositories");
        Ok(Self::in_memory())
    }
}
