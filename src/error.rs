//! # 统一错误处理模块
//!
//! 定义 cifplayer 的所有错误类型，使用 `thiserror` 派生。
//!
//! 解析类错误对单次调用是终止性的：输入是确定的，重试没有意义，
//! 由调用方展示消息并让用户换一个输入。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// cifplayer 统一错误类型
#[derive(Error, Debug)]
pub enum CifPlayerError {
    // ─────────────────────────────────────────────────────────────
    // 结构解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid cell definition")]
    InvalidCellDefinition,

    #[error("Unrecognized format: {0}")]
    UnrecognizedFormat(String),

    #[error("Malformed atom record: {0}")]
    MalformedAtomRecord(String),

    /// CIF 文件中 `_cif_error` 标签携带的消息，原样返回
    #[error("{0}")]
    EmbeddedSourceError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, CifPlayerError>;
