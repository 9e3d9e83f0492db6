//! Console logging set-up

use flexi_logger::{DeferredNow, Logger, LoggerHandle, Record};

use crate::error::Result;

/// Start logging to stderr. The level comes from RUST_LOG, falling back to
/// `info`. The returned handle must be kept alive for the life of the app.
pub fn setup() -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str("info")?
        .format(compact_format)
        .start()?;

    log::debug!("Adjust the log level by setting RUST_LOG. By default RUST_LOG=info");

    Ok(handle)
}

/// One line per record: level, time, module, message
pub fn compact_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        w,
        "{:<5} [{}] [{}] {}",
        record.level(),
        now.format("%H:%M:%S%.3f"),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )
}
