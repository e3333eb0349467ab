use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands, MigrateArgs, ServeArgs};
use crate::config::{Environment, Settings};
use crate::error::{AppError, AppResult};

/// Runs the selected subcommand against already merged settings. A bare
/// invocation behaves like `serve`.
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> AppResult<()> {
    check_arguments(cli)?;

    match &cli.command {
        None => ServeCommandHandler::new(settings, environment).execute(false).await,
        Some(Commands::Serve(args)) => {
            ServeCommandHandler::new(settings, environment)
                .execute(args.dry_run)
                .await
        }
        Some(Commands::Migrate(args)) => {
            MigrateCommandHandler::new(settings)
                .execute(args.dry_run, args.rollback)
                .await
        }
    }
}

/// Rejects contradictory flags and warns about risky but legal ones.
fn check_arguments(cli: &Cli) -> AppResult<()> {
    cli.validate().map_err(|reason| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason,
    })?;

    match &cli.command {
        Some(Commands::Serve(ServeArgs {
            host: Some(host),
            port: Some(port),
            ..
        })) if *port < 1024 && host == "0.0.0.0" => {
            tracing::warn!(port, "privileged port on all interfaces usually needs root");
        }
        Some(Commands::Migrate(MigrateArgs {
            rollback: Some(steps),
            ..
        })) if *steps > 50 => {
            tracing::warn!(steps, "large rollback requested");
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("catalog-rs").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn serve_dry_run_succeeds_with_defaults() {
        let result =
            execute_command(&cli(&["serve", "--dry-run"]), Settings::default(), Environment::Test)
                .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn migrate_needs_database_settings() {
        let result =
            execute_command(&cli(&["migrate", "--dry-run"]), Settings::default(), Environment::Test)
                .await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn ordinary_arguments_pass() {
        assert!(check_arguments(&cli(&["serve", "--port", "8080"])).is_ok());
        assert!(check_arguments(&cli(&["migrate", "--rollback", "60"])).is_ok());
    }

    #[test]
    fn hand_built_conflicts_are_rejected() {
        let conflicting = Cli {
            command: Some(Commands::Migrate(MigrateArgs {
                dry_run: true,
                rollback: Some(5),
            })),
            config: None,
            env: None,
            verbose: false,
            quiet: false,
        };
        match check_arguments(&conflicting) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "cli_arguments"),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }
}
