//! # 渲染模块
//!
//! 由统一结构派生的输出表示。
//!
//! ## 子模块
//! - `builder`: 渲染模型（去重、着色、对称展开）
//! - `flatten`: 扁平结构
//!
//! ## 依赖关系
//! - 被 `source.rs`, `commands/` 使用
//! - 使用 `models/`, `symmetry/`

pub mod builder;
pub mod flatten;

pub use builder::{to_render_model, INDEX_KEY, SYMBOL_KEY};
pub use flatten::{flatten, FlatStructure};
