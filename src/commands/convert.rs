//! # convert 命令实现
//!
//! 批量转换结构文件为 CIF。
//!
//! ## 功能
//! - 读取 CIF / POSCAR / OPTIMADE 文件（自动识别格式）
//! - 输出 `<stem>.cif`；CIF 输入原样复制
//! - 支持并行处理
//! - 可选输出 CSV 汇总
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `batch/`, `utils/output.rs`
//! - 使用 cifplayer 库的 `StructureSource`

use super::load_source;
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::convert::ConvertArgs;
use crate::utils::output;
use cifplayer::error::{CifPlayerError, Result};

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// CSV 汇总行
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub file: String,
    pub format: String,
    pub formula: String,
    pub atoms: usize,
    pub space_group: String,
    pub output: String,
}

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header("Converting to CIF");

    // 创建输出目录
    fs::create_dir_all(&args.output).map_err(|e| CifPlayerError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    // 收集输入文件
    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            args.pattern,
            args.input.display()
        ));
        return Ok(());
    }

    // 单个文件不显示进度条
    let runner = BatchRunner::new(args.jobs).with_progress(files.len() > 1);
    output::print_info(&format!(
        "Found {} files to convert ({} jobs)",
        files.len(),
        runner.jobs()
    ));

    let result = runner.run(&files, |input_path| {
        match convert_file(input_path, &args.output, args.overwrite) {
            Ok(Some(row)) => ProcessResult::Success(row),
            Ok(None) => ProcessResult::Skipped(input_path.display().to_string()),
            Err(e) => ProcessResult::Failed(input_path.display().to_string(), e.to_string()),
        }
    })?;

    if let Some(summary) = &args.summary {
        save_summary_csv(&result.outputs, summary)?;
        output::print_success(&format!("Summary saved to '{}'", summary.display()));
    }

    output::print_done(&format!(
        "Converted {}/{} file(s) to '{}' ({} skipped, {} failed)",
        result.success(),
        result.total(),
        args.output.display(),
        result.skipped,
        result.failed()
    ));

    Ok(())
}

fn output_path(input_path: &Path, output_dir: &Path) -> PathBuf {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("structure");
    output_dir.join(format!("{}.cif", stem))
}

/// 转换单个文件；目标已存在且不覆盖时返回 None
fn convert_file(input_path: &Path, output_dir: &Path, overwrite: bool) -> Result<Option<SummaryRow>> {
    let target = output_path(input_path, output_dir);

    // 检查是否需要跳过
    if target.exists() && !overwrite {
        return Ok(None);
    }

    let source = load_source(input_path)?;
    let structure = source.structure()?;
    let cif = source.cif()?;

    fs::write(&target, cif).map_err(|e| CifPlayerError::FileWriteError {
        path: target.display().to_string(),
        source: e,
    })?;

    log::info!("{} -> {}", input_path.display(), target.display());

    Ok(Some(SummaryRow {
        file: input_path.display().to_string(),
        format: source.format().to_string(),
        formula: structure.formula(),
        atoms: structure.atoms.len(),
        space_group: structure.symmetry_label().unwrap_or_default(),
        output: target.display().to_string(),
    }))
}

/// 保存汇总到 CSV
fn save_summary_csv(rows: &[SummaryRow], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush().map_err(|e| CifPlayerError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
