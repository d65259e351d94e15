//! 日志系统模块
//!
//! 基于 `tracing` 的结构化日志。控制台输出始终开启；
//! `[logging] file_output = true` 时额外写入按天滚动的日志文件（不带 ANSI 颜色）。
//! 环境变量 `RUST_LOG` 优先于配置文件中的级别。
//!
//! ```no_run
//! use d3d_app::core::{log, Config};
//!
//! let config = Config::default();
//! log::init_logger(&config.logging);
//! tracing::info!(width = 800, height = 600, "Window created");
//! ```

use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use super::config::{LogLevel, LoggingConfig};

const DEFAULT_LOG_FILE: &str = "d3d_app.log";

/// 初始化全局日志订阅者
///
/// 重复调用是安全的：已经安装过订阅者时直接忽略。
pub fn init_logger(config: &LoggingConfig) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(Level::from(config.level)).into())
        .from_env_lossy();

    let console_layer = fmt::layer().with_target(true).with_ansi(true);

    let file_layer = config.file_output.then(|| {
        let (directory, filename) = log_file_location(&config.log_file);
        let appender = RollingFileAppender::new(Rotation::DAILY, directory, filename);
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(appender)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// 把日志文件路径拆成目录和文件名
///
/// 没有目录部分时写到当前目录，路径为空时使用 `d3d_app.log`。
pub fn log_file_location(path: &str) -> (PathBuf, String) {
    let path = Path::new(path);
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (directory, filename)
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
    }

    #[test]
    fn test_log_file_location() {
        assert_eq!(
            log_file_location("logs/d3d_app.log"),
            (PathBuf::from("logs"), "d3d_app.log".to_string())
        );
        assert_eq!(
            log_file_location("run.log"),
            (PathBuf::from("."), "run.log".to_string())
        );
        assert_eq!(
            log_file_location(""),
            (PathBuf::from("."), DEFAULT_LOG_FILE.to_string())
        );
    }

    #[test]
    fn test_init_logger_twice_does_not_panic() {
        let config = LoggingConfig::default();
        init_logger(&config);
        init_logger(&config);
    }
}
