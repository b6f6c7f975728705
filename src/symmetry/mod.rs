//! # 对称性模块
//!
//! 空间群查找与对称副本展开。
//!
//! ## 子模块
//! - `table`: 静态空间群操作表
//! - `spacegroup`: 空间群、操作求值与重叠抑制
//!
//! ## 依赖关系
//! - 被 `render/builder.rs`, `source.rs`, `commands/` 使用
//! - 使用 `models/`

pub mod spacegroup;
pub mod table;

pub use spacegroup::{expand, symmetric_atom, SpaceGroup, IDENTITY_OP, POS_OVERLAP_LIMIT};
