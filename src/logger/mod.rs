//! `tracing-subscriber` setup: an optional colored console layer plus an
//! optional rotating file layer in full, compact or JSON format.

pub mod config;
pub mod error;
pub mod rotation;
pub(crate) mod writer;


pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};
use writer::RotatingFileWriter;

type DynLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber. A `RUST_LOG` directive overrides
/// `config.level`.
pub fn init_logger(config: LoggerConfig) -> Result<(), LoggerError> {
    config.validate()?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // The file layer goes first so console ANSI escapes stay out of span
    // fields written to the file (tokio-rs/tracing#1817).
    let layers: Vec<DynLayer> = [
        config.file.enabled.then(|| file_layer(&config.file)).transpose()?,
        config.console.enabled.then(|| console_layer(&config.console)),
    ]
    .into_iter()
    .flatten()
    .collect();

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;
    Ok(())
}

fn console_layer(config: &ConsoleConfig) -> DynLayer {
    fmt::layer()
        .with_ansi(config.colored && std::io::stdout().is_terminal())
        .with_target(true)
        .boxed()
}

fn file_layer(config: &FileConfig) -> Result<DynLayer, LoggerError> {
    let writer = RotatingFileWriter::new(config)?;
    let base = fmt::layer().with_ansi(false).with_target(true);

    Ok(match config.format {
        LogFormat::Full => base.with_writer(writer).boxed(),
        LogFormat::Compact => base.compact().with_writer(writer).boxed(),
        LogFormat::Json => base.json().with_writer(writer).boxed(),
    })
}
