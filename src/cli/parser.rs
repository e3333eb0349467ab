use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use super::validation::{
    validate_config_file_path, validate_host_address, validate_port, validate_rollback_steps,
};
use crate::config::{self, RepositoryBackend};

#[derive(Parser, Debug)]
#[command(name = "catalog-rs", version = crate::clap_long_version())]
#[command(about = "Products and categories catalog API server")]
#[command(after_long_help = "\
Examples:
  catalog-rs                                    serve with config/ defaults
  catalog-rs serve --backend database --port 8080
  catalog-rs --config /etc/catalog-rs/production.toml serve
  catalog-rs serve --dry-run                    print the effective setup
  catalog-rs migrate --dry-run                  list pending migrations
  catalog-rs migrate --rollback 1               revert the latest migration

Any setting can also be overridden with CATALOG_<SECTION>__<KEY>,
e.g. CATALOG_SERVER__PORT=8080.")]
pub struct Cli {
    /// Runs `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read this TOML file instead of the layered config/ directory
    #[arg(short, long, value_name = "FILE", value_parser = validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Deployment stage; Swagger UI is only served in development
    #[arg(short, long, value_enum, value_name = "STAGE")]
    pub env: Option<Environment>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the catalog HTTP API
    Serve(ServeArgs),
    /// Apply, list or revert database migrations
    Migrate(MigrateArgs),
}

#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    /// Interface to listen on
    #[arg(long, value_name = "ADDRESS", value_parser = validate_host_address)]
    pub host: Option<String>,

    #[arg(short, long, value_parser = validate_port)]
    pub port: Option<u16>,

    /// Beats --verbose and --quiet
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Storage used for products and categories
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// Check the configuration, print it and exit
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrateArgs {
    /// List pending migrations without running them
    #[arg(long, conflicts_with = "rollback")]
    pub dry_run: bool,

    /// Revert this many applied migrations (1-100)
    #[arg(long, value_name = "STEPS", value_parser = validate_rollback_steps)]
    pub rollback: Option<u32>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    Test,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    #[value(alias = "in-memory")]
    Memory,
    #[value(alias = "db", alias = "postgres")]
    Database,
}

impl Cli {
    /// Flag combinations that slip past clap when `Cli` is built by hand.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("--verbose and --quiet are mutually exclusive".to_string());
        }
        match &self.command {
            Some(Commands::Migrate(MigrateArgs {
                dry_run: true,
                rollback: Some(_),
            })) => Err("--dry-run cannot be combined with --rollback".to_string()),
            _ => Ok(()),
        }
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => Self::Development,
            Environment::Test => Self::Test,
            Environment::Staging => Self::Staging,
            Environment::Production => Self::Production,
        }
    }
}

impl From<Backend> for RepositoryBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Memory => Self::Memory,
            Backend::Database => Self::Database,
        }
    }
}
