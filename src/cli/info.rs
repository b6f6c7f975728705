//! # info 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/info.rs`

use clap::Args;
use std::path::PathBuf;

/// info 子命令参数
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Structure file (CIF, POSCAR or OPTIMADE JSON)
    pub file: PathBuf,

    /// Maximum number of atoms to list
    #[arg(long, default_value_t = 20)]
    pub atoms: usize,
}
