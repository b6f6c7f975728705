//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `convert`: 批量转换为 CIF
//! - `info`: 查看单个结构
//! - `render`: 导出渲染模型 (JSON)
//! - `flatten`: 导出扁平结构 (JSON)
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert, info, render, flatten

pub mod convert;
pub mod flatten;
pub mod info;
pub mod render;

use clap::{ArgAction, Parser, Subcommand};

/// cifplayer - 晶体结构读取与渲染模型工具
#[derive(Parser)]
#[command(name = "cifplayer")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Read CIF, POSCAR and OPTIMADE structures and export render models", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log level (error, warn, info, debug, trace, off); overrides -v
    #[arg(long, env = "CIFPLAYER_LOG", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert CIF / POSCAR / OPTIMADE files to CIF
    Convert(convert::ConvertArgs),

    /// Show cell, symmetry and atoms of a structure file
    Info(info::InfoArgs),

    /// Export the deduplicated render model as JSON
    Render(render::RenderArgs),

    /// Export the flattened structure (transposed cell, typed atoms) as JSON
    Flatten(flatten::FlattenArgs),
}
