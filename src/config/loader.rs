//! Assembles [`Settings`] from TOML files and `CATALOG_*` variables.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat};

use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Points the loader at a directory of layered files.
pub const CONFIG_DIR_ENV: &str = "CATALOG_CONFIG_DIR";

/// Points the loader at one file that replaces the layered files.
pub const CONFIG_FILE_ENV: &str = "CATALOG_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "CATALOG";
const ENV_NESTING: &str = "__";

#[derive(Debug, Clone)]
enum Layout {
    /// `default.toml`, then `{env}.toml`, then `local.toml`
    Layered,
    Single(PathBuf),
}

/// Layered configuration loader.
///
/// Sources, later ones winning:
///
/// 1. `default.toml` (required)
/// 2. `{environment}.toml`
/// 3. `local.toml`
/// 4. `CATALOG_SECTION__KEY` environment variables
///
/// Selecting a single file replaces the first three sources with that file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    layout: Layout,
    environment: Environment,
}

impl ConfigLoader {
    /// Builds a loader from `CATALOG_CONFIG_DIR`, `CATALOG_CONFIG_FILE` and
    /// `CATALOG_APP_ENV`. Setting both of the first two is an error.
    pub fn new() -> Result<Self, ConfigError> {
        let dir = std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from);
        let file = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);

        let layout = match (&dir, file) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingSources(format!(
                    "set either {CONFIG_DIR_ENV} or {CONFIG_FILE_ENV}, not both"
                )));
            }
            (_, Some(file)) => Layout::Single(file),
            _ => Layout::Layered,
        };

        Ok(Self {
            config_dir: dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            layout,
            environment: Environment::from_env(),
        })
    }

    pub fn from_dir(config_dir: impl Into<PathBuf>, environment: Environment) -> Self {
        Self {
            config_dir: config_dir.into(),
            layout: Layout::Layered,
            environment,
        }
    }

    pub fn with_config_file(self, path: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::Single(path.into()),
            ..self
        }
    }

    pub fn with_environment(self, environment: Environment) -> Self {
        Self {
            environment,
            ..self
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// [`load_unvalidated`](Self::load_unvalidated) followed by
    /// [`Settings::validate`].
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        let merged = self.files(Config::builder())?.add_source(env_overrides()).build()?;
        merged
            .try_deserialize()
            .map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    fn files(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        match &self.layout {
            Layout::Single(path) => toml_file(builder, path, true),
            Layout::Layered => {
                let env_file = format!("{}.toml", self.environment);
                let builder = toml_file(builder, &self.config_dir.join("default.toml"), true)?;
                let builder = toml_file(builder, &self.config_dir.join(env_file), false)?;
                toml_file(builder, &self.config_dir.join("local.toml"), false)
            }
        }
    }
}

fn toml_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.is_file() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let name = path.to_string_lossy();
    Ok(builder.add_source(File::new(&name, FileFormat::Toml).required(required)))
}

/// `CATALOG_SERVER__PORT=8080` becomes `server.port = 8080`.
fn env_overrides() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_NESTING)
        .ignore_empty(true)
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryBackend;
    use crate::config::env_lock;
    use std::fs;
    use tempfile::TempDir;

    fn config_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        dir
    }

    /// Restores touched variables on drop.
    #[derive(Default)]
    struct ScopedEnv(Vec<(&'static str, Option<std::ffi::OsString>)>);

    impl ScopedEnv {
        fn set(&mut self, key: &'static str, value: &str) {
            self.0.push((key, std::env::var_os(key)));
            unsafe { std::env::set_var(key, value) };
        }

        fn unset(&mut self, key: &'static str) {
            self.0.push((key, std::env::var_os(key)));
            unsafe { std::env::remove_var(key) };
        }
    }

    impl Drop for ScopedEnv {
        fn drop(&mut self) {
            for (key, previous) in self.0.drain(..).rev() {
                match previous {
                    Some(value) => unsafe { std::env::set_var(key, value) },
                    None => unsafe { std::env::remove_var(key) },
                }
            }
        }
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let _lock = env_lock();
        let dir = config_dir(&[
            ("default.toml", "[server]\nport = 3000\nhost = \"127.0.0.1\"\n"),
            ("test.toml", "[server]\nport = 4000\n"),
            ("local.toml", "[logger]\nlevel = \"debug\"\n"),
        ]);

        let settings = ConfigLoader::from_dir(dir.path(), Environment::Test)
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.logger.level, "debug");
    }

    #[test]
    fn environment_layer_may_be_absent() {
        let _lock = env_lock();
        let dir = config_dir(&[("default.toml", "[server]\nport = 3100\n")]);

        let settings = ConfigLoader::from_dir(dir.path(), Environment::Production)
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 3100);
    }

    #[test]
    fn default_layer_is_required() {
        let dir = config_dir(&[]);
        let result = ConfigLoader::from_dir(dir.path(), Environment::Development).load();
        match result {
            Err(ConfigError::MissingFile(path)) => assert!(path.ends_with("default.toml")),
            other => panic!("expected a missing file error, got {:?}", other),
        }
    }

    #[test]
    fn single_file_replaces_layers() {
        let _lock = env_lock();
        let dir = config_dir(&[
            ("default.toml", "[server]\nport = 3000\n"),
            ("custom.toml", "[server]\nport = 9000\n"),
        ]);

        let settings = ConfigLoader::from_dir(dir.path(), Environment::Development)
            .with_config_file(dir.path().join("custom.toml"))
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 9000);
    }

    #[test]
    fn variables_override_files() {
        let _lock = env_lock();
        let mut env = ScopedEnv::default();
        env.set("CATALOG_SERVER__PORT", "5050");
        env.set("CATALOG_REPOSITORY__BACKEND", "memory");

        let dir = config_dir(&[("default.toml", "[server]\nport = 3000\n")]);
        let settings = ConfigLoader::from_dir(dir.path(), Environment::Development)
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 5050);
        assert_eq!(settings.repository.backend, RepositoryBackend::Memory);
    }

    #[test]
    fn load_validates_but_load_unvalidated_does_not() {
        let _lock = env_lock();
        let dir = config_dir(&[("default.toml", "[repository]\nbackend = \"database\"\n")]);
        let loader = ConfigLoader::from_dir(dir.path(), Environment::Development);

        let err = loader.load().unwrap_err();
        assert_eq!(err.key(), Some("database.url"));

        let raw = loader.load_unvalidated().unwrap();
        assert_eq!(raw.repository.backend, RepositoryBackend::Database);
    }

    #[test]
    fn new_reads_process_environment() {
        let _lock = env_lock();
        let mut env = ScopedEnv::default();
        env.unset(CONFIG_FILE_ENV);
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(Environment::ENV_VAR, "staging");

        let loader = ConfigLoader::new().unwrap();
        assert_eq!(loader.config_dir(), Path::new("/custom/config"));
        assert_eq!(loader.environment(), Environment::Staging);
    }

    #[test]
    fn dir_and_file_variables_conflict() {
        let _lock = env_lock();
        let mut env = ScopedEnv::default();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/custom/config.toml");

        assert!(matches!(
            ConfigLoader::new(),
            Err(ConfigError::ConflictingSources(_))
        ));
    }
}
