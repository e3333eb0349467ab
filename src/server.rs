//! HTTP server lifecycle: storage setup, bind, serve, graceful stop.

use anyhow::Context;
use tokio::net::TcpListener;

use crate::api::create_router;
use crate::config::{Environment, RepositoryBackend, Settings};
use crate::db::{AsyncDbPool, establish_async_connection_pool, run_pending_migrations};
use crate::repositories::Repositories;

pub struct Server {
    settings: Settings,
    environment: Environment,
}

impl Server {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    /// Wires the configured repositories into the router and serves until
    /// Ctrl+C or SIGTERM. Swagger UI is mounted in development only.
    pub async fn run(self) -> anyhow::Result<()> {
        let Settings {
            application,
            server,
            repository,
            ..
        } = &self.settings;
        tracing::info!(
            name = %application.name,
            version = %application.version,
            environment = %self.environment,
            backend = %repository.backend,
            log_level = %self.settings.logger.level,
            "catalog-rs starting"
        );

        let pool = self.database_pool().await?;
        let repositories = Repositories::from_settings(&self.settings, pool)?;

        let with_docs = self.environment.is_development();
        let app = create_router(repositories, with_docs);

        let address = server.address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("cannot bind {address}"))?;
        tracing::info!(%address, api_docs = with_docs, "Listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown())
            .await
            .context("HTTP server terminated abnormally")?;

        tracing::info!("Stopped");
        Ok(())
    }

    /// `None` unless the database backend is selected. Pending migrations are
    /// applied first when `database.auto_migrate` is set.
    async fn database_pool(&self) -> anyhow::Result<Option<AsyncDbPool>> {
        if self.settings.repository.backend != RepositoryBackend::Database {
            return Ok(None);
        }
        let database = &self.settings.database;

        if database.auto_migrate {
            let applied = run_pending_migrations(&database.url).await?;
            tracing::info!(applied = ?applied, "Schema migrated");
        }

        Ok(Some(establish_async_connection_pool(database).await?))
    }
}

/// Resolves on the first of Ctrl+C or (on unix) SIGTERM. A handler that
/// cannot be installed is logged and never fires.
async fn wait_for_shutdown() {
    use tokio::signal;

    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(error) => {
                tracing::error!(%error, "Ctrl+C handler unavailable");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                "SIGTERM"
            }
            Err(error) => {
                tracing::error!(%error, "SIGTERM handler unavailable");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    tracing::info!(signal = received, "Shutting down gracefully");
}
