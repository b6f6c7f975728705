//! # cifplayer - 晶体结构命令行工具
//!
//! 读取 CIF、POSCAR、OPTIMADE 结构文件，转换为 CIF，
//! 或导出渲染模型与扁平结构。
//!
//! ## 子命令
//! - `convert` - 批量转换为 CIF
//! - `info`    - 查看结构信息
//! - `render`  - 导出渲染模型 (JSON)
//! - `flatten` - 导出扁平结构 (JSON)
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── cifplayer 库 (解析、对称性、渲染模型)
//!   ├── batch/      (并行批处理)
//!   └── utils/      (输出、进度条、日志)
//! ```

mod batch;
mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let level = utils::logger::level_from(cli.verbose, cli.log_level.as_deref());
    if let Err(e) = utils::logger::init(level) {
        utils::output::print_warning(&format!("Logger unavailable: {}", e));
    }

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
