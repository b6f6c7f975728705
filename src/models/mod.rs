//! # 数据模型模块
//!
//! 定义统一的晶体结构、晶胞几何与渲染模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `symmetry/`, `render/` 使用
//! - 子模块: cell, elements, structure, render

pub mod cell;
pub mod elements;
pub mod render;
pub mod structure;

pub use cell::{CellParams, Matrix3};
pub use render::{CellDescr, RenderAtom, RenderModel};
pub use structure::{Atom, CellDefinition, OverlayValue, Overlays, Structure};
