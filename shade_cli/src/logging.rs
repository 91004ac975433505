//! Tracing subscriber setup: console layer plus an optional JSON-lines file.

use std::path::Path;

use eyre::WrapErr;
use shade_config::{LogRotation, Logging};
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::FILE_GUARD;

fn appender(path: &Path, rotation: LogRotation) -> RollingFileAppender {
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .map_or_else(|| "shade.log".into(), |f| f.to_string_lossy().into_owned());
    match rotation {
        LogRotation::Never => rolling::never(dir, file),
        LogRotation::Daily => rolling::daily(dir, file),
        LogRotation::Hourly => rolling::hourly(dir, file),
    }
}

/// Install the global subscriber. Console output goes to stderr so stdout
/// only carries results.
///
/// Filter precedence: `RUST_LOG`, then `--log-level`, then `[logging].level`,
/// then `info`.
pub fn init(json: bool, cli_level: Option<&str>, cfg: &Logging) -> eyre::Result<()> {
    let level = cli_level
        .or(cfg.level.as_deref())
        .unwrap_or("info")
        .to_string();
    let filter = || {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter())
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter())
            .boxed()
    };

    let file = match &cfg.file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .wrap_err_with(|| format!("create log directory {}", dir.display()))?;
            }
            let (writer, guard) = tracing_appender::non_blocking(appender(path, cfg.rotation));
            // Keep the worker alive until process exit.
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(filter())
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}
