//! # cifplayer - 晶体结构读取与渲染模型核心
//!
//! 读取 CIF、POSCAR、OPTIMADE 三种结构格式，统一成 `Structure`，
//! 再派生出去重着色后的渲染模型、对称展开副本、扁平结构和 CIF 文本。
//!
//! ## 数据流
//! ```text
//! 原始输入 → detect_format → 解析器 → Structure
//!          → (对称展开) → to_render_model → RenderModel
//! ```
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── parsers/   (格式识别与解析, CIF 写出)
//!   ├── models/    (结构、晶胞几何、元素表、渲染模型)
//!   ├── symmetry/  (空间群表与对称操作)
//!   ├── render/    (渲染模型构建、扁平结构)
//!   ├── source.rs  (带缓存的结构来源)
//!   └── error.rs   (错误处理)
//! ```

pub mod error;
pub mod models;
pub mod parsers;
pub mod render;
pub mod source;
pub mod symmetry;

pub use error::{CifPlayerError, Result};
pub use models::{Atom, RenderAtom, RenderModel, Structure};
pub use parsers::{detect_format, parse, Format, RawInput};
pub use render::{flatten, to_render_model, FlatStructure};
pub use source::StructureSource;
pub use symmetry::SpaceGroup;

/// 结构写成 CIF 文本
pub fn to_cif(structure: &Structure) -> Result<String> {
    parsers::cif::to_cif_string(structure)
}
