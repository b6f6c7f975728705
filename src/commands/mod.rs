//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `utils/`, `batch/` 和 cifplayer 库
//! - 子模块: convert, info, render, flatten

pub mod convert;
pub mod flatten;
pub mod info;
pub mod render;

use crate::cli::Commands;
use cifplayer::error::{CifPlayerError, Result};
use cifplayer::parsers;
use cifplayer::StructureSource;
use std::fs;
use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Convert(args) => convert::execute(args),
        Commands::Info(args) => info::execute(args),
        Commands::Render(args) => render::execute(args),
        Commands::Flatten(args) => flatten::execute(args),
    }
}

/// 读取结构文件并识别格式
pub(crate) fn load_source(path: &Path) -> Result<StructureSource> {
    let raw = parsers::read_structure_file(path)?;
    let source = StructureSource::new(raw);
    log::debug!("{}: detected {}", path.display(), source.format());
    Ok(source)
}

/// 写到文件；没有给出路径时写到 stdout
pub(crate) fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(p) => fs::write(p, content).map_err(|e| CifPlayerError::FileWriteError {
            path: p.display().to_string(),
            source: e,
        }),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
