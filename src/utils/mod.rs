//! # 工具函数模块
//!
//! 提供美化输出、进度条和终端日志。
//!
//! ## 依赖关系
//! - 被 `main.rs`, `commands/`, `batch/` 模块使用
//! - 子模块: logger, output, progress

pub mod logger;
pub mod output;
pub mod progress;
