//! # convert 子命令 CLI 定义
//!
//! 批量转换结构文件为 CIF (CIF/POSCAR/OPTIMADE -> .cif)
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input directory (or single file) containing structure files
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for converted files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Glob pattern(s) for input files, comma separated
    #[arg(short, long, default_value = "*")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0, env = "CIFPLAYER_JOBS")]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Write a CSV summary of converted structures
    #[arg(long)]
    pub summary: Option<PathBuf>,
}
