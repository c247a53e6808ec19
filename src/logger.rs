use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env};

pub const LOG_FILE_NAME: &str = "default.log";

/// Route `log` records to `<log_dir>/default.log`, filtered by `RUST_LOG`
/// (default `info`).
pub fn init_logger(log_dir: impl AsRef<Path>) -> Result<()> {
    let log_dir = log_dir.as_ref();
    // Create the log dir.
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE_NAME))
        .context("failed to open log file")?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:<5}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .try_init()
        .context("logger already initialized")?;

    Ok(())
}
