//! # 批量执行器
//!
//! 并行执行批量处理任务。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代（独立线程池）
//! - 进度条显示
//! - 结果收集与汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::utils::progress;
use cifplayer::error::{CifPlayerError, Result};

use rayon::prelude::*;
use std::path::PathBuf;

/// 单个文件处理结果，`T` 为成功时的附带数据
#[derive(Debug, Clone)]
pub enum ProcessResult<T> {
    /// 处理成功
    Success(T),
    /// 跳过（如文件已存在）
    Skipped(String),
    /// 处理失败
    Failed(String, String), // (文件路径, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug)]
pub struct BatchResult<T> {
    /// 成功项的附带数据，保持输入顺序
    pub outputs: Vec<T>,
    /// 跳过数量
    pub skipped: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        BatchResult {
            outputs: Vec::new(),
            skipped: 0,
            failures: Vec::new(),
        }
    }
}

impl<T> BatchResult<T> {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult<T>) {
        match result {
            ProcessResult::Success(out) => self.outputs.push(out),
            ProcessResult::Skipped(_) => self.skipped += 1,
            ProcessResult::Failed(path, err) => self.failures.push((path, err)),
        }
    }

    pub fn success(&self) -> usize {
        self.outputs.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success() + self.skipped + self.failed()
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
    /// 是否显示进度条
    progress: bool,
}

impl BatchRunner {
    /// 创建新的批量执行器，`jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self {
            jobs,
            progress: true,
        }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理文件列表
    pub fn run<T, F>(&self, files: &[PathBuf], processor: F) -> Result<BatchResult<T>>
    where
        T: Send,
        F: Fn(&PathBuf) -> ProcessResult<T> + Sync + Send,
    {
        let pb = if self.progress {
            progress::create_progress_bar(files.len() as u64, "Processing")
        } else {
            indicatif::ProgressBar::hidden()
        };

        // 配置 rayon 线程池
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| CifPlayerError::InvalidArgument(format!("thread pool: {}", e)))?;

        let results: Vec<ProcessResult<T>> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file);
                    if let ProcessResult::Failed(path, err) = &result {
                        pb.suspend(|| log::error!("{}: {}", path, err));
                    }
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();

        // 汇总结果
        let mut batch_result = BatchResult::default();
        for result in results {
            batch_result.merge(result);
        }

        Ok(batch_result)
    }
}
