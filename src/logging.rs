//! Tracing setup.
//!
//! `RUST_LOG` takes precedence over the configured level. SQL statement
//! logging from sqlx is held at `warn` unless `RUST_LOG` asks for it.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{BdeError, Result};

/// Level named in `[logging] level`; unknown names mean `info`.
fn level_filter(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::INFO)
}

fn env_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let filter = EnvFilter::default().add_directive(level_filter(level).into());
    match "sqlx::query=warn".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Install the global subscriber.
///
/// Events go to stdout and, when `file` is set, to that file too (its
/// parent directory is created). Fails if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let Some(path) = config.file.as_deref() else {
        return tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .with(env_filter(&config.level))
            .try_init()
            .map_err(|e| BdeError::Config(format!("logging: {e}")));
    };

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let log_file = Arc::new(File::create(path)?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(env_filter(&config.level))
        .try_init()
        .map_err(|e| BdeError::Config(format!("logging: {e}")))
}

/// Stdout-only fallback used when [`init`] fails.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(env_filter(level))
        .try_init();
}
