//! iSlides Gallery logging
//!
//! Provides structured logging, log retention and crash reports.

mod panic_hook;
mod logging;

pub use panic_hook::init_panic_hook;
pub use logging::{cleanup_old_logs, init_logging, LOG_FILE_PREFIX};
pub use tracing_appender::non_blocking::WorkerGuard;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "iSlides", "iSlides")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Where and how much to log
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    pub dir: PathBuf,
    /// Rolled files older than this are removed at startup; 0 keeps everything
    pub retention_days: u32,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: log_dir(),
            retention_days: 7,
        }
    }
}

/// Initialize logging and the panic hook.
///
/// The returned guard flushes the file writer on drop and must be held
/// until the process exits.
pub fn init(settings: &LogSettings) -> anyhow::Result<WorkerGuard> {
    let guard = init_logging(settings)?;
    init_panic_hook();

    if settings.retention_days > 0 {
        if let Err(e) = cleanup_old_logs(&settings.dir, settings.retention_days) {
            tracing::warn!("Log cleanup failed: {}", e);
        }
    }

    Ok(guard)
}
