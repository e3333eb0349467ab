//! `catalog-rs serve`: start the API, or describe what would start with
//! `--dry-run`.

use crate::config::{Environment, RepositoryBackend, Settings};
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    settings: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    pub async fn execute(&self, dry_run: bool) -> AppResult<()> {
        self.settings.validate()?;

        if dry_run {
            for line in self.summary() {
                println!("{line}");
            }
            return Ok(());
        }

        Server::new(self.settings.clone(), self.environment).run().await?;
        Ok(())
    }

    /// Human readable description of the effective setup.
    fn summary(&self) -> Vec<String> {
        let Settings {
            server,
            repository,
            database,
            logger,
            ..
        } = &self.settings;

        let mut lines = vec![
            "configuration OK".to_string(),
            format!("environment   {}", self.environment),
            format!("listen        {}", server.address()),
            format!("backend       {}", repository.backend),
            format!("log level     {}", logger.level),
            format!(
                "swagger ui    {}",
                if self.environment.is_development() { "on" } else { "off" }
            ),
        ];
        if repository.backend == RepositoryBackend::Database {
            lines.push(format!(
                "pool          {}..{} connections, auto-migrate {}",
                database.min_connections, database.max_connections, database.auto_migrate
            ));
        }
        lines
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn dry_run_with_defaults_succeeds() {
        let handler = ServeCommandHandler::new(Settings::default(), Environment::Test);
        assert_eq!(handler.settings(), &Settings::default());
        assert!(handler.execute(true).await.is_ok());
    }

    #[tokio::test]
    async fn dry_run_still_validates() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        let handler = ServeCommandHandler::new(settings, Environment::Test);

        match handler.execute(true).await {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "server.port"),
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn database_backend_without_url_is_rejected() {
        let mut settings = Settings::default();
        settings.repository.backend = RepositoryBackend::Database;
        let handler = ServeCommandHandler::new(settings, Environment::Test);

        assert!(handler.execute(true).await.is_err());
    }

    #[test]
    fn summary_mentions_pool_only_for_database() {
        let handler = ServeCommandHandler::new(Settings::default(), Environment::Development);
        let summary = handler.summary();
        assert!(summary.iter().any(|l| l.contains("swagger ui    on")));
        assert!(!summary.iter().any(|l| l.starts_with("pool")));

        let mut settings = Settings::default();
        settings.repository.backend = RepositoryBackend::Database;
        let summary = ServeCommandHandler::new(settings, Environment::Production).summary();
        assert!(summary.iter().any(|l| l.starts_with("pool")));
        assert!(summary.iter().any(|l| l.contains("swagger ui    off")));
    }
}
