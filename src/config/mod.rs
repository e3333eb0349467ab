//! Layered settings: `default.toml`, `{environment}.toml`, `local.toml`, then
//! `CATALOG_SECTION__KEY` variables, each overriding the one before.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, DatabaseConfig, RepositoryBackend, RepositoryConfig, ServerConfig,
    Settings,
};

/// Held by tests that touch process environment variables.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
