use crate::app::config::LoggingConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming};
use std::path::{Path, PathBuf};

/// Initialize the file logger. The returned handle must stay alive for the
/// lifetime of the program or buffered lines are lost.
pub fn init_logger(config: &LoggingConfig) -> Result<LoggerHandle, FlexiLoggerError> {
    let level = if cfg!(debug_assertions) {
        "debug".to_string()
    } else {
        config.level.to_lowercase()
    };

    let mut logger = Logger::try_with_str(&level)?
        .log_to_file(
            FileSpec::default()
                .directory(get_log_directory(config))
                .basename("mulise")
                .suppress_timestamp(),
        )
        .format_for_files(custom_log_format)
        .use_utc();

    if config.append_to_file {
        logger = logger.append();
    }

    if config.rotate_logs {
        logger = logger.rotate(
            Criterion::Size(config.rotation_size_mb * 1024 * 1024),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(config.keep_log_files as usize),
        );
    }

    if config.log_to_console {
        logger = logger.duplicate_to_stderr(flexi_logger::Duplicate::All);
    }

    let handle = logger.start()?;
    log::info!("Logger initialized with level: {}", level);
    log::info!("Log file location: {}", get_log_file_path(config).display());

    Ok(handle)
}

/// Get the log directory: the configured one, else a platform data directory
pub fn get_log_directory(config: &LoggingConfig) -> PathBuf {
    if let Some(dir) = &config.log_directory {
        return dir.clone();
    }

    #[cfg(target_os = "macos")]
    return dirs::home_dir()
        .map(|h| h.join("Library/Logs/mulise"))
        .unwrap_or_else(|| PathBuf::from("./logs"));

    #[cfg(not(target_os = "macos"))]
    return dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .map(|d| d.join("mulise/logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"));
}

/// Get the full path to the main log file
pub fn get_log_file_path(config: &LoggingConfig) -> PathBuf {
    get_log_directory(config).join("mulise.log")
}

/// Custom log format for file output
fn custom_log_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} [{}] [{}:{}] {}",
        now.now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.args()
    )
}

/// Ensure log directory exists
pub fn ensure_log_directory(config: &LoggingConfig) -> color_eyre::Result<()> {
    let log_dir = get_log_directory(config);
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)?;
    }
    Ok(())
}

pub fn log_startup_info(config: &LoggingConfig) {
    log::info!("=== mulise starting ===");
    log::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    log::info!("OS: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    log::info!("Log file: {}", get_log_file_path(config).display());
}

pub fn log_shutdown_info() {
    log::info!("=== mulise shutting down ===");
}

/// Log the outcome of one request to the library server
pub fn log_server_request(endpoint: &str, status: u16, body_len: usize) {
    if (200..300).contains(&status) {
        log::debug!("{} -> HTTP {} ({} bytes)", endpoint, status, body_len);
    } else {
        log::warn!("{} -> HTTP {}", endpoint, status);
    }
}

/// Log user interactions for debugging
pub fn log_user_interaction(action: &str, context: Option<&str>) {
    match context {
        Some(ctx) => log::debug!("User action: {} - {}", action, ctx),
        None => log::debug!("User action: {}", action),
    }
}

pub fn log_config_loading(config_path: &Path, created: bool) {
    if created {
        log::info!("Created default config file at: {}", config_path.display());
    } else {
        log::info!("Loaded config file from: {}", config_path.display());
    }
}
