//! # 终端日志
//!
//! `log` 门面的终端实现，按级别着色写到 stderr。
//! 级别来自 `CIFPLAYER_LOG`，否则由 `-v` 次数决定
//! （0: warn, 1: info, 2: debug, 3+: trace）。
//!
//! ## 依赖关系
//! - 被 `main.rs` 初始化
//! - 使用 `utils/output.rs`, `log` crate

use super::output;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use std::str::FromStr;
use std::sync::OnceLock;

static LOGGER: OnceLock<TerminalLogger> = OnceLock::new();

struct TerminalLogger {
    level: LevelFilter,
}

/// 由命令行参数确定日志级别
pub fn level_from(verbose: u8, env_level: Option<&str>) -> LevelFilter {
    if let Some(level) = env_level.and_then(|s| LevelFilter::from_str(s.trim()).ok()) {
        return level;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| TerminalLogger { level });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

impl log::Log for TerminalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = record.args().to_string();
        match record.level() {
            Level::Error => output::print_error(&msg),
            Level::Warn => output::print_warning(&msg),
            Level::Info => output::print_info(&msg),
            Level::Debug | Level::Trace => output::print_debug(&msg),
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level_from(0, None), LevelFilter::Warn);
        assert_eq!(level_from(2, None), LevelFilter::Debug);
        assert_eq!(level_from(7, None), LevelFilter::Trace);
    }

    #[test]
    fn test_env_level_wins() {
        assert_eq!(level_from(0, Some("debug")), LevelFilter::Debug);
        assert_eq!(level_from(2, Some("off")), LevelFilter::Off);
        // 无法识别时退回 -v
        assert_eq!(level_from(1, Some("loud")), LevelFilter::Info);
    }
}
