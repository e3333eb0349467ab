//! Command line flags applied on top of the file and environment layers.
//! Validation runs once, on the merged result.

use super::parser::{Cli, Commands, ServeArgs};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Load the base configuration selected by `--config` and `--env`.
    ///
    /// Without `--config` the layered loader reads `CATALOG_CONFIG_DIR`,
    /// `CATALOG_CONFIG_FILE` and `CATALOG_APP_ENV`.
    ///
    /// # Errors
    /// Returns ConfigError if the files cannot be found or parsed.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        Self::from_loader(ConfigLoader::new()?, cli)
    }

    /// Same as [`ConfigurationMerger::from_cli`] with an explicit base loader.
    pub fn from_loader(mut loader: ConfigLoader, cli: &Cli) -> Result<Self, ConfigError> {
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }
        if let Some(ref path) = cli.config {
            loader = loader.with_config_file(path);
        }

        let base_config = loader.load_unvalidated()?;
        Ok(Self::new(base_config, loader.environment()))
    }

    /// Copy of the base settings with `cli` applied, validated.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve(args)) = &cli.command {
            Self::apply_serve_overrides(&mut config, args);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_serve_overrides(config: &mut Settings, args: &ServeArgs) {
        if let Some(host) = &args.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        // --log-level is more specific than --verbose/--quiet
        if let Some(level) = args.log_level {
            config.logger.level = level.as_str().to_string();
        }
        if let Some(backend) = args.backend {
            config.repository.backend = backend.into();
        }
    }

    /// The unmerged configuration
    pub fn config(&self) -> &Settings {
        &self.base_config
    }

    /// Environment the configuration was loaded for
    pub fn environment(&self) -> Environment {
        self.environment
    }
}
