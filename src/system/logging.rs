//! Logging system initialization

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;

const DEFAULT_LOG_FILE_NAME: &str = "linktrack.log";

type LogWriter = Box<dyn Write + Send + Sync>;

/// 按 `[logging]` 选择输出：stdout、单文件或按天滚动的文件
fn build_writer(config: &LoggingConfig) -> Result<LogWriter> {
    let Some(log_file) = config.file.as_deref().filter(|f| !f.is_empty()) else {
        return Ok(Box::new(std::io::stdout()));
    };

    if !config.enable_rotation {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open log file {}", log_file))?;
        return Ok(Box::new(file));
    }

    let path = Path::new(log_file);
    let dir = path.parent().unwrap_or(Path::new("."));
    let prefix = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(DEFAULT_LOG_FILE_NAME)
        .trim_end_matches(".log");

    let appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(config.max_backups as usize)
        .build(dir)
        .with_context(|| format!("Failed to create rolling log appender in {}", dir.display()))?;
    Ok(Box::new(appender))
}

/// Install the global subscriber
///
/// The returned guard flushes buffered lines on drop; keep it alive until exit.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(build_writer(config)?);
    let to_stdout = config.file.as_ref().is_none_or(|f| f.is_empty());

    let builder = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.level))
        .with_ansi(to_stdout);

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn logging_config(file: Option<String>, enable_rotation: bool) -> LoggingConfig {
        LoggingConfig {
            file,
            enable_rotation,
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn test_plain_file_writer_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.log");
        let config = logging_config(Some(path.to_string_lossy().into_owned()), false);

        let mut writer = build_writer(&config).unwrap();
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("nested.log");
        let config = logging_config(Some(path.to_string_lossy().into_owned()), false);

        assert!(build_writer(&config).is_err());
    }

    #[test]
    fn test_empty_file_means_stdout() {
        assert!(build_writer(&logging_config(Some(String::new()), true)).is_ok());
        assert!(build_writer(&logging_config(None, false)).is_ok());
    }
}
