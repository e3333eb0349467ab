//! Numbered file rotation for the logger

use std::fs;
use std::path::{Path, PathBuf};

use super::config::RotationConfig;
use super::error::LoggerError;

/// Rolls `app.log` into `app.log.1`, shifting older files up by one.
pub struct RotationManager {
    config: RotationConfig,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self { config }
    }

    pub fn should_rotate(&self, current_file_size: u64) -> bool {
        current_file_size >= self.config.max_size
    }

    /// Path of the `index`-th rolled file (`app.log` → `app.log.{index}`).
    pub fn rolled_path(base_path: &Path, index: usize) -> PathBuf {
        let mut name = base_path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}", index));
        base_path.with_file_name(name)
    }

    /// Performs one rotation step.
    ///
    /// The oldest file (`.{max_files}`) is dropped, every other rolled file
    /// moves up one index and the active file becomes `.1`.
    pub fn rotate(&self, current_path: &Path) -> Result<(), LoggerError> {
        let max_files = self.config.max_files;

        let oldest = Self::rolled_path(current_path, max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for index in (1..max_files).rev() {
            let from = Self::rolled_path(current_path, index);
            if from.exists() {
                fs::rename(&from, Self::rolled_path(current_path, index + 1))?;
            }
        }

        if current_path.exists() {
            fs::rename(current_path, Self::rolled_path(current_path, 1))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(max_files: usize) -> RotationManager {
        RotationManager::new(RotationConfig {
            max_size: 16,
            max_files,
        })
    }

    #[test]
    fn test_should_rotate_at_threshold() {
        let manager = manager(3);
        assert!(!manager.should_rotate(15));
        assert!(manager.should_rotate(16));
        assert!(manager.should_rotate(100));
    }

    #[test]
    fn test_rolled_path_appends_index() {
        let path = Path::new("/var/log/app.log");
        assert_eq!(
            RotationManager::rolled_path(path, 2),
            PathBuf::from("/var/log/app.log.2")
        );
    }

    #[test]
    fn test_rotate_shifts_and_caps_files() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("app.log");
        let manager = manager(2);

        for generation in ["first", "second", "third"] {
            fs::write(&base, generation).unwrap();
            manager.rotate(&base).unwrap();
        }

        assert!(!base.exists());
        assert_eq!(
            fs::read_to_string(RotationManager::rolled_path(&base, 1)).unwrap(),
            "third"
        );
        assert_eq!(
            fs::read_to_string(RotationManager::rolled_path(&base, 2)).unwrap(),
            "second"
        );
        assert!(!RotationManager::rolled_path(&base, 3).exists());
    }

    #[test]
    fn test_rotate_without_active_file() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("app.log");
        manager(3).rotate(&base).unwrap();
        assert!(!RotationManager::rolled_path(&base, 1).exists());
    }
}
