//! `catalog-rs migrate`: apply, preview or revert the embedded migrations.

use crate::config::Settings;
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Preview,
    Apply,
    Revert(u32),
}

impl Action {
    fn from_flags(dry_run: bool, rollback: Option<u32>) -> AppResult<Self> {
        match (dry_run, rollback) {
            (_, Some(0)) => Err(AppError::Validation {
                field: "rollback_steps".to_string(),
                reason: "at least one step must be rolled back".to_string(),
            }),
            (true, _) => Ok(Action::Preview),
            (false, Some(steps)) => Ok(Action::Revert(steps)),
            (false, None) => Ok(Action::Apply),
        }
    }
}

pub struct MigrateCommandHandler {
    settings: Settings,
}

impl MigrateCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Always validates `[database]`, whichever repository backend is
    /// configured for serving.
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        let action = Action::from_flags(dry_run, rollback)?;
        self.settings.database.validate()?;
        let url = self.settings.database.url.as_str();

        match action {
            Action::Preview => {
                let pending = pending_migrations(url).await?;
                report("pending", &pending);
                if !pending.is_empty() {
                    println!("(dry run, nothing applied)");
                }
            }
            Action::Apply => {
                let applied = run_pending_migrations(url).await?;
                report("applied", &applied);
            }
            Action::Revert(steps) => {
                let reverted = revert_migrations(url, steps).await?;
                report("reverted", &reverted);
                if reverted.len() < steps as usize {
                    println!("history exhausted after {} of {steps} step(s)", reverted.len());
                }
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

fn report(verb: &str, versions: &[String]) {
    if versions.is_empty() {
        println!("schema is up to date, 0 migrations {verb}");
        return;
    }
    println!("{} migration(s) {verb}:", versions.len());
    for version in versions {
        println!("  {version}");
    }
}
