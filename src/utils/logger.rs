use anyhow::Context;
use std::str::FromStr;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

const ENV_LEVEL: &str = "PULLKIT_LOG_LEVEL";
const ENV_FILE_DIR: &str = "PULLKIT_LOG_FILE_DIR";
const ENV_FILE_PREFIX: &str = "PULLKIT_LOG_FILE_PREFIX";
const ENV_ROLLING: &str = "PULLKIT_LOG_ROLLING";

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct LoggerConfig {
    pub level: String,
    pub file_dir: Option<String>,
    pub file_prefix: Option<String>,
    pub rolling: Option<String>,
    #[serde(default)]
    pub max_files: usize,
}

impl LoggerConfig {
    /// Loads logging configuration from `PULLKIT_LOG_LEVEL`,
    /// `PULLKIT_LOG_FILE_DIR`, `PULLKIT_LOG_FILE_PREFIX` and `PULLKIT_LOG_ROLLING`.
    /// Unset variables fall back to defaults.
    pub fn from_env() -> Self {
        let level = std::env::var(ENV_LEVEL).unwrap_or_else(|_| "info".to_string());
        let file_dir = std::env::var(ENV_FILE_DIR).ok();
        let file_prefix = std::env::var(ENV_FILE_PREFIX).ok();
        let rolling = std::env::var(ENV_ROLLING).ok();

        Self {
            level,
            file_dir,
            file_prefix,
            rolling,
            max_files: 2,
        }
    }

    /// Parsed level; unknown strings mean `INFO`.
    pub fn max_level(&self) -> Level {
        Level::from_str(&self.level).unwrap_or(Level::INFO)
    }

    fn rotation(&self) -> Rotation {
        match self.rolling.as_deref() {
            Some("hourly") => Rotation::HOURLY,
            Some("minutely") => Rotation::MINUTELY,
            Some("never") => Rotation::NEVER,
            _ => Rotation::DAILY,
        }
    }

    /// Installs the global subscriber. Writes to a rolling file when
    /// `file_dir` is set, otherwise to stdout. The returned guard must be
    /// kept alive for buffered file output to be flushed.
    ///
    /// A subscriber that is already installed is left in place.
    pub fn init(&self) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
        let level = self.max_level();

        let Some(dir_str) = self.file_dir.as_deref() else {
            let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
            tracing::debug!("logging to stdout (no file_dir)");
            return Ok(None);
        };

        let prefix = self.file_prefix.as_deref().unwrap_or("pullkit");
        let appender: RollingFileAppender = RollingFileAppender::builder()
            .rotation(self.rotation())
            .max_log_files(self.max_files.max(1))
            .filename_prefix(prefix)
            .build(dir_str)
            .with_context(|| format!("failed to create rolling appender in {}", dir_str))?;

        let (nb, guard) = tracing_appender::non_blocking(appender);
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(nb)
            .try_init();

        tracing::info!(
            "logging to dir: {}, prefix: {}, rotation: {:?}",
            dir_str,
            prefix,
            self.rolling
        );
        Ok(Some(guard))
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_dir: None,
            file_prefix: None,
            rolling: Some("daily".to_string()),
            max_files: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_falls_back_to_info() {
        let mut cfg = LoggerConfig::default();
        assert_eq!(cfg.max_level(), Level::INFO);
        cfg.level = "trace".into();
        assert_eq!(cfg.max_level(), Level::TRACE);
        cfg.level = "loud".into();
        assert_eq!(cfg.max_level(), Level::INFO);
    }

    #[test]
    fn deserializes_without_max_files() {
        let raw = r#"{
            "level": "debug",
            "file_dir": null,
            "file_prefix": null,
            "rolling": "hourly"
        }"#;
        let cfg: LoggerConfig = serde_json::from_str(raw).expect("valid config");
        assert_eq!(cfg.max_files, 0);
        assert_eq!(cfg.max_level(), Level::DEBUG);
        assert_eq!(cfg.rotation(), Rotation::HOURLY);
    }

    #[test]
    fn stdout_init_is_repeatable() {
        let cfg = LoggerConfig {
            level: "warn".into(),
            ..Default::default()
        };
        assert!(cfg.init().expect("stdout init").is_none());
        assert!(cfg.init().expect("second init").is_none());
    }
}
