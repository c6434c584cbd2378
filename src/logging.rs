use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

pub enum LogTarget {
    /// Used while the terminal UI owns stdout.
    File(PathBuf),
    Stderr,
}

/// `RUST_LOG` takes precedence over the configured level.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_tracing(default_level: &str, target: LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_target(false);

    let result = match target {
        LogTarget::File(path) => {
            ensure_parent_dir(&path)?;
            let file = File::options().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

/// Like [`init_tracing`], but a subscriber that cannot be set up only costs
/// the logs: the failure is reported on stderr and `false` is returned.
pub fn init_tracing_or_warn(default_level: &str, target: LogTarget) -> bool {
    let describe = match &target {
        LogTarget::File(path) => path.display().to_string(),
        LogTarget::Stderr => "stderr".to_string(),
    };
    match init_tracing(default_level, target) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("procwatch: logging to {describe} disabled: {err}");
            false
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
