//! # 晶体结构数据模型
//!
//! 各解析器输出的统一结构表示。构建完成后不再修改，
//! 渲染模型、对称展开等派生数据按需计算。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `render/`, `symmetry/` 使用
//! - 使用 `models/cell.rs`

use crate::error::{CifPlayerError, Result};
use crate::models::cell::{cell_params_from_matrix, cell_to_matrix, CellParams, Matrix3};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// 自定义叠加属性：CIF 原子循环中可选的列
///
/// 它们不作为原子的一等字段，而是存放在 `overlays` 中。
/// `label` 是特殊项：`_atom_site_label` 参与必选属性解析，
/// 同时也作为叠加属性保留。
pub const CUSTOM_OVERLAYS: &[(&str, &str)] = &[
    ("_atom_site_occupancy", "site occupancies"),
    ("_atom_site_charge", "formal charges"),
    ("label", "labels"),
];

/// 占位率叠加键，合并时以 `+` 连接
pub const OCCUPANCY_KEY: &str = "_atom_site_occupancy";

/// 原子标签叠加键
pub const LABEL_KEY: &str = "label";

/// 自定义叠加键对应的可读名称
pub fn overlay_title(key: &str) -> Option<&'static str> {
    CUSTOM_OVERLAYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, title)| *title)
}

/// 叠加属性值：文本或数字
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OverlayValue {
    Text(String),
    Number(f64),
}

impl OverlayValue {
    /// 以分隔符拼接另一个值，结果总是文本
    pub fn append(&mut self, sep: &str, other: &dyn fmt::Display) {
        *self = OverlayValue::Text(format!("{}{}{}", self, sep, other));
    }
}

impl fmt::Display for OverlayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayValue::Text(s) => write!(f, "{}", s),
            // 整数值不带小数点
            OverlayValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            OverlayValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for OverlayValue {
    fn from(s: &str) -> Self {
        OverlayValue::Text(s.to_string())
    }
}

impl From<String> for OverlayValue {
    fn from(s: String) -> Self {
        OverlayValue::Text(s)
    }
}

impl From<f64> for OverlayValue {
    fn from(n: f64) -> Self {
        OverlayValue::Number(n)
    }
}

impl From<usize> for OverlayValue {
    fn from(n: usize) -> Self {
        OverlayValue::Number(n as f64)
    }
}

/// 保持插入顺序的叠加属性表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlays(Vec<(String, OverlayValue)>);

impl Overlays {
    pub fn new() -> Self {
        Overlays(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&OverlayValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut OverlayValue> {
        self.0.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 插入或覆盖；已有键保持原位置
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OverlayValue>) {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OverlayValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Overlays {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atom {
    /// 元素符号（首字母大写）
    pub symbol: String,

    /// 原始位点标签
    pub label: Option<String>,

    /// 坐标，含义由 `Structure::cartesian` 决定
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// 归一化后的分数坐标（计算后才有）
    pub fract: Option<[f64; 3]>,

    pub overlays: Overlays,
}

impl Atom {
    pub fn new(symbol: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            symbol: symbol.into(),
            label: None,
            x: position[0],
            y: position[1],
            z: position[2],
            fract: None,
            overlays: Overlays::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.overlays.insert(LABEL_KEY, label.as_str());
        self.label = Some(label);
        self
    }

    pub fn with_overlay(mut self, key: impl Into<String>, value: impl Into<OverlayValue>) -> Self {
        self.overlays.insert(key, value);
        self
    }

    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// 晶胞定义：参数或矩阵，二者只取其一
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellDefinition {
    /// 六参数（CIF）
    Parameters(CellParams),
    /// 基矢矩阵（POSCAR, OPTIMADE）
    Matrix(Matrix3),
}

impl CellDefinition {
    /// 得到基矢矩阵；参数不完整时报错
    pub fn matrix(&self) -> Result<Matrix3> {
        match self {
            CellDefinition::Parameters(p) => cell_to_matrix(p),
            CellDefinition::Matrix(m) => Ok(*m),
        }
    }

    /// 得到六参数
    pub fn params(&self) -> CellParams {
        match self {
            CellDefinition::Parameters(p) => *p,
            CellDefinition::Matrix(m) => cell_params_from_matrix(m),
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Structure {
    /// 晶胞，可能缺失
    pub cell: Option<CellDefinition>,

    /// 原子列表（成功解析后非空）
    pub atoms: Vec<Atom>,

    /// 原子坐标是否为笛卡尔坐标
    pub cartesian: bool,

    /// 文件内联的对称操作表达式
    pub symmetry_ops: Option<Vec<String>>,

    /// Hermann–Mauguin 空间群名称
    pub space_group_name: Option<String>,

    /// 空间群编号（原样保留字符串）
    pub space_group_number: Option<String>,

    /// 描述信息（CIF 数据块名、OPTIMADE id 等）
    pub info: String,

    /// 演示数据来源标记
    pub source_is_demo: bool,

    /// 精选数据来源标记
    pub source_is_curated: bool,

    /// POSCAR 的原子类型序号（按元素块，从 1 开始）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<usize>>,
}

impl Structure {
    pub fn new(cell: Option<CellDefinition>, atoms: Vec<Atom>, cartesian: bool) -> Self {
        Structure {
            cell,
            atoms,
            cartesian,
            symmetry_ops: None,
            space_group_name: None,
            space_group_number: None,
            info: String::new(),
            source_is_demo: false,
            source_is_curated: false,
            types: None,
        }
    }

    /// 晶胞参数（若有）
    pub fn cell_params(&self) -> Option<CellParams> {
        self.cell.as_ref().map(|c| c.params())
    }

    /// 基矢矩阵；无晶胞时为 `Ok(None)`，参数不完整时报错
    pub fn cell_matrix(&self) -> Result<Option<Matrix3>> {
        self.cell.as_ref().map(|c| c.matrix()).transpose()
    }

    /// 必须有晶胞矩阵的场合使用
    pub fn require_cell_matrix(&self) -> Result<Matrix3> {
        self.cell_matrix()?
            .ok_or(CifPlayerError::InvalidCellDefinition)
    }

    /// 空间群编号的数值形式
    pub fn space_group_num(&self) -> Option<u32> {
        self.space_group_number
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
    }

    /// 对称性标签，如 `"Fm-3m (225)"`
    pub fn symmetry_label(&self) -> Option<String> {
        let name = self.space_group_name.as_deref().filter(|s| !s.is_empty());
        let number = self.space_group_number.as_deref().filter(|s| !s.is_empty());
        if name.is_none() && number.is_none() {
            return None;
        }
        let mut label = name.unwrap_or_default().to_string();
        if let Some(n) = number {
            label.push_str(&format!(" ({})", n));
        }
        Some(label)
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for atom in &self.atoms {
            *counts.entry(atom.symbol.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlays_keep_order() {
        let mut o = Overlays::new();
        o.insert("S", "Fe");
        o.insert("N", 1usize);
        o.insert("S", "Co");
        let keys: Vec<&str> = o.keys().collect();
        assert_eq!(keys, vec!["S", "N"]);
        assert_eq!(o.get("S"), Some(&OverlayValue::Text("Co".into())));
    }

    #[test]
    fn test_overlay_value_display() {
        assert_eq!(OverlayValue::Number(3.0).to_string(), "3");
        assert_eq!(OverlayValue::Number(0.25).to_string(), "0.25");
        let mut v = OverlayValue::Number(0.5);
        v.append("+", &OverlayValue::Number(0.5));
        assert_eq!(v, OverlayValue::Text("0.5+0.5".into()));
    }

    #[test]
    fn test_overlays_serialize_as_map() {
        let atom = Atom::new("Fe", [0.0, 0.0, 0.0]).with_overlay("_atom_site_charge", 2.0);
        let json = serde_json::to_string(&atom.overlays).unwrap();
        assert_eq!(json, r#"{"_atom_site_charge":2.0}"#);
    }

    #[test]
    fn test_atom_with_label() {
        let atom = Atom::new("Fe", [0.0, 0.0, 0.0]).with_label("Fe1");
        assert_eq!(atom.label, Some("Fe1".to_string()));
        assert_eq!(atom.overlays.get(LABEL_KEY), Some(&OverlayValue::from("Fe1")));
    }

    #[test]
    fn test_symmetry_label() {
        let mut s = Structure::new(None, vec![Atom::new("Na", [0.0; 3])], false);
        assert_eq!(s.symmetry_label(), None);
        s.space_group_name = Some("Fm-3m".into());
        assert_eq!(s.symmetry_label().as_deref(), Some("Fm-3m"));
        s.space_group_number = Some("225".into());
        assert_eq!(s.symmetry_label().as_deref(), Some("Fm-3m (225)"));
        assert_eq!(s.space_group_num(), Some(225));
    }

    #[test]
    fn test_cell_matrix_requires_complete_params() {
        let cell = CellParams::new(4.0, 4.0, 4.0, 90.0, 90.0, 0.0);
        let s = Structure::new(Some(CellDefinition::Parameters(cell)), vec![], false);
        assert!(matches!(
            s.cell_matrix(),
            Err(CifPlayerError::InvalidCellDefinition)
        ));

        let s = Structure::new(None, vec![], false);
        assert!(s.cell_matrix().unwrap().is_none());
        assert!(s.require_cell_matrix().is_err());
    }

    #[test]
    fn test_structure_formula() {
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.0]),
            Atom::new("Cl", [0.5, 0.5, 0.5]),
            Atom::new("Cl", [0.5, 0.0, 0.0]),
        ];
        let s = Structure::new(None, atoms, false);
        assert_eq!(s.formula(), "Cl2Na");
    }
}
