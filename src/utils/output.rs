//! # 美化输出工具
//!
//! 提供统一的终端输出样式。诊断信息（日志、错误）写到 stderr，
//! 以免混入写往 stdout 的 JSON 输出。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块和 `utils/logger.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    eprintln!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    eprintln!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印调试消息
pub fn print_debug(msg: &str) {
    eprintln!("{} {}", "[DBG]".dimmed(), msg.dimmed());
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    eprintln!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印 `键: 值` 行
pub fn print_field(key: &str, value: &str) {
    println!("  {:<14} {}", format!("{}:", key).cyan(), value);
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
