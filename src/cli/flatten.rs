//! # flatten 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/flatten.rs`

use clap::Args;
use std::path::PathBuf;

/// flatten 子命令参数
#[derive(Args, Debug)]
pub struct FlattenArgs {
    /// Structure file (CIF or POSCAR)
    pub file: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
