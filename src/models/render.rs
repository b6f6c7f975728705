//! # 渲染模型
//!
//! 供可视化层使用的去重、着色后的原子集合。
//! 可视化层只依赖这里的类型，不需要知道源文件格式。
//!
//! ## 依赖关系
//! - 被 `render/` 构建
//! - 使用 `models/structure.rs`, `models/cell.rs`

use crate::models::cell::{CellParams, Matrix3};
use crate::models::structure::Overlays;
use serde::Serialize;

/// 合并后的可渲染原子
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderAtom {
    /// 笛卡尔坐标 (Å)
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// 归一化分数坐标；无晶胞时缺失
    pub fract: Option<[f64; 3]>,

    /// 十六进制颜色
    pub color: String,

    /// 半径 (Å)
    pub radius: f64,

    /// 合并后的叠加属性，总是包含 "S" 与 "N"
    pub overlays: Overlays,

    /// 代表原子的元素符号
    pub symbol: String,

    /// 代表原子的标签
    pub label: Option<String>,
}

impl RenderAtom {
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// 显示用的晶胞描述：六参数加可选的对称性标签
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDescr {
    #[serde(flatten)]
    pub params: CellParams,

    /// 如 `"P6_3/mmc (194)"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symlabel: Option<String>,
}

/// 渲染模型
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub atoms: Vec<RenderAtom>,

    pub cell_matrix: Option<Matrix3>,

    pub cell_descr: Option<CellDescr>,

    /// 结构中实际出现的自定义叠加键 → 可读名称
    pub overlayed: Vec<(String, String)>,

    pub space_group_name: Option<String>,

    pub space_group_number: Option<u32>,

    pub info: String,

    pub source_is_demo: bool,

    pub source_is_curated: bool,
}

impl RenderModel {
    /// 叠加键对应的可读名称
    pub fn overlay_title(&self, key: &str) -> Option<&str> {
        self.overlayed
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
