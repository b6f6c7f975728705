//! # render 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/render.rs`

use clap::Args;
use std::path::PathBuf;

/// render 子命令参数
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Structure file (CIF, POSCAR or OPTIMADE JSON)
    pub file: PathBuf,

    /// Enable a symmetry operation, e.g. "-x,-y,z" (repeatable, applied in order)
    #[arg(short, long = "symmetry", allow_hyphen_values = true)]
    pub symmetry: Vec<String>,

    /// Enable every operation of the structure's space group
    #[arg(long, default_value_t = false, conflicts_with = "symmetry")]
    pub all_symmetry: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}
