//! # flatten 命令实现
//!
//! 输出扁平结构 JSON。
//!
//! ## 依赖关系
//! - 使用 `cli/flatten.rs` 定义的参数
//! - 使用 cifplayer 库的 `StructureSource`

use super::{load_source, write_output};
use crate::cli::flatten::FlattenArgs;
use cifplayer::error::Result;

/// 执行 flatten 命令
pub fn execute(args: FlattenArgs) -> Result<()> {
    let source = load_source(&args.file)?;
    let flat = source.flatten()?;
    let json = serde_json::to_string_pretty(flat)?;
    write_output(args.output.as_deref(), &json)
}
