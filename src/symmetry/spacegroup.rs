//! # 空间群与对称操作求值
//!
//! 按名称或编号查表得到空间群，对原子施加对称操作，
//! 并在启用多个操作时去掉重叠的副本。
//!
//! ## 对称操作表达式
//! 逗号分隔的三个分量，例如 `"-x,-y,z"`、`"1/2+x,y,-z"`。
//! 每个分量从左到右求值：`+`/`-` 切换符号，`x`/`y`/`z` 累加对应的
//! 分数坐标，其余字符拼成常数项 `p/q`，带上它开始时的符号。
//!
//! ## 依赖关系
//! - 被 `render/builder.rs`, `source.rs`, `commands/` 使用
//! - 使用 `symmetry/table.rs`, `models/cell.rs`, `models/render.rs`

use super::table::TABLE;
use crate::models::cell::{fract_cord_norm, fract_to_cart, Matrix3};
use crate::models::{RenderAtom, Structure};
use rayon::prelude::*;
use std::borrow::Cow;
use std::sync::LazyLock;

/// 原子重叠判定阈值（与笛卡尔坐标同单位）
pub const POS_OVERLAP_LIMIT: f64 = 0.01;

/// 恒等操作
pub const IDENTITY_OP: &str = "x,y,z";

/// 空间群
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceGroup {
    pub name: String,
    pub number: u32,
    operations: Vec<String>,
}

static IDENTITY: LazyLock<SpaceGroup> =
    LazyLock::new(|| SpaceGroup::new("P1", 1, vec![IDENTITY_OP.to_string()]));

impl SpaceGroup {
    pub(crate) fn new(name: &str, number: u32, operations: Vec<String>) -> SpaceGroup {
        SpaceGroup {
            name: name.to_string(),
            number,
            operations,
        }
    }

    /// 编号优先，其次名称，都查不到时返回恒等群
    pub fn by_name_or_num(name: Option<&str>, number: Option<u32>) -> &'static SpaceGroup {
        number
            .filter(|n| *n != 0)
            .and_then(Self::by_num)
            .or_else(|| name.filter(|n| !n.trim().is_empty()).and_then(Self::by_name))
            .unwrap_or_else(Self::identity)
    }

    pub fn by_num(number: u32) -> Option<&'static SpaceGroup> {
        TABLE.get_by_number(number)
    }

    /// 名称查找，首字母自动大写，忽略空白与下划线
    pub fn by_name(name: &str) -> Option<&'static SpaceGroup> {
        let mut fixed = name.trim().to_string();
        if let Some(first) = fixed.get(..1).map(str::to_uppercase) {
            fixed.replace_range(..1, &first);
        }
        TABLE.get_by_name(&fixed)
    }

    /// 只含 `x,y,z` 的占位空间群
    pub fn identity() -> &'static SpaceGroup {
        &IDENTITY
    }

    pub fn is_identity(&self) -> bool {
        self.operations.len() == 1 && self.operations[0] == IDENTITY_OP
    }

    /// 由文件内联的操作表构造
    ///
    /// 行首的数字编号会被去掉；无法解析的操作记录警告后丢弃。
    /// 没有可用操作时返回 None。
    pub fn from_operations(ops: &[String]) -> Option<SpaceGroup> {
        let operations: Vec<String> = ops
            .iter()
            .filter_map(|raw| {
                let op = strip_site_id(raw);
                if evaluate(op, [0.0; 3]).is_some() {
                    Some(op.split_whitespace().collect::<String>())
                } else {
                    log::warn!("Ignoring malformed symmetry operation '{}'", raw.trim());
                    None
                }
            })
            .collect();

        if operations.is_empty() {
            return None;
        }

        Some(SpaceGroup {
            name: String::new(),
            number: 0,
            operations,
        })
    }

    /// 结构对应的空间群：查表优先，查不到时使用文件内联的操作
    pub fn for_structure(structure: &Structure) -> Cow<'static, SpaceGroup> {
        let group = Self::by_name_or_num(
            structure.space_group_name.as_deref(),
            structure.space_group_num(),
        );
        if !group.is_identity() {
            return Cow::Borrowed(group);
        }

        structure
            .symmetry_ops
            .as_deref()
            .and_then(Self::from_operations)
            .map(|mut g| {
                g.name = structure.space_group_name.clone().unwrap_or_default();
                g.number = structure.space_group_num().unwrap_or(0);
                Cow::Owned(g)
            })
            .unwrap_or(Cow::Borrowed(group))
    }

    /// 对称操作表达式列表
    pub fn symmetry_list(&self) -> &[String] {
        &self.operations
    }

    /// 对单个原子施加对称操作；原子无分数坐标或表达式无效时返回 None
    pub fn symmetric_atom(&self, op: &str, atom: &RenderAtom, cell: &Matrix3) -> Option<RenderAtom> {
        symmetric_atom(op, atom, cell)
    }

    /// 对单个原子施加本空间群的全部操作
    pub fn symmetric_atoms(&self, atom: &RenderAtom, cell: &Matrix3) -> Vec<RenderAtom> {
        self.operations
            .iter()
            .filter_map(|op| symmetric_atom(op, atom, cell))
            .collect()
    }
}

fn strip_site_id(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((id, rest)) if id.chars().all(|c| c.is_ascii_digit()) => rest.trim(),
        _ => trimmed,
    }
}

/// 对单个分量求值
pub fn calc_symmetry_span(span: &str, fract: [f64; 3]) -> Option<f64> {
    let mut res = 0.0;
    let mut sign = 1.0;
    let mut coef_sign = 1.0;
    let mut coef = String::new();

    for c in span.chars().filter(|c| !c.is_whitespace()) {
        match c.to_ascii_lowercase() {
            'x' => res += sign * fract[0],
            'y' => res += sign * fract[1],
            'z' => res += sign * fract[2],
            '+' => sign = 1.0,
            '-' => sign = -1.0,
            other => {
                coef_sign = sign;
                coef.push(other);
            }
        }
    }

    if !coef.is_empty() {
        let value = match coef.split_once('/') {
            Some((p, q)) => p.parse::<f64>().ok()? / q.parse::<f64>().ok()?,
            None => coef.parse::<f64>().ok()?,
        };
        if !value.is_finite() {
            return None;
        }
        res += coef_sign * value;
    }

    Some(res)
}

/// 对分数坐标求整条表达式，结果未归一化
pub fn evaluate(op: &str, fract: [f64; 3]) -> Option<[f64; 3]> {
    let spans: Vec<&str> = op.split(',').collect();
    if spans.len() != 3 {
        return None;
    }
    Some([
        calc_symmetry_span(spans[0], fract)?,
        calc_symmetry_span(spans[1], fract)?,
        calc_symmetry_span(spans[2], fract)?,
    ])
}

/// 对称副本：分数坐标归一化后按晶胞矩阵换算笛卡尔坐标
pub fn symmetric_atom(op: &str, atom: &RenderAtom, cell: &Matrix3) -> Option<RenderAtom> {
    let fract = evaluate(op, atom.fract?)?.map(fract_cord_norm);
    let [x, y, z] = fract_to_cart(fract, cell);

    Some(RenderAtom {
        fract: Some(fract),
        x,
        y,
        z,
        ..atom.clone()
    })
}

/// 每轴坐标差都不超过阈值即视为重叠
pub fn is_overlap(a: [f64; 3], b: [f64; 3], delta: f64) -> bool {
    a.iter().zip(b.iter()).all(|(p, q)| (p - q).abs() <= delta)
}

/// 按启用顺序展开对称副本
///
/// 某个操作生成的原子若与排在它前面的任一启用操作所生成的原子重叠，
/// 则丢弃。各操作的副本列表并行计算。
pub fn expand(atoms: &[RenderAtom], enabled_ops: &[String], cell: &Matrix3) -> Vec<RenderAtom> {
    let per_op: Vec<Vec<RenderAtom>> = enabled_ops
        .par_iter()
        .map(|op| {
            let copies: Vec<RenderAtom> = atoms
                .iter()
                .filter_map(|atom| symmetric_atom(op, atom, cell))
                .collect();
            if copies.len() < atoms.iter().filter(|a| a.fract.is_some()).count() {
                log::warn!("Symmetry operation '{}' could not be evaluated", op);
            }
            copies
        })
        .collect();

    let mut visible = Vec::new();
    for (k, copies) in per_op.iter().enumerate() {
        let earlier = &per_op[..k];
        for atom in copies {
            let pos = atom.position();
            let covered = earlier
                .iter()
                .flatten()
                .any(|other| is_overlap(pos, other.position(), POS_OVERLAP_LIMIT));
            if !covered {
                visible.push(atom.clone());
            }
        }
    }

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Overlays;

    const CUBIC: Matrix3 = [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]];

    fn atom_at(fract: [f64; 3]) -> RenderAtom {
        let [x, y, z] = fract_to_cart(fract, &CUBIC);
        RenderAtom {
            x,
            y,
            z,
            fract: Some(fract),
            color: "#FFFFFF".to_string(),
            radius: 1.0,
            overlays: Overlays::new(),
            symbol: "Na".to_string(),
            label: None,
        }
    }

    fn assert_close(a: [f64; 3], b: [f64; 3]) {
        for (p, q) in a.iter().zip(b.iter()) {
            assert!((p - q).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_identity_group() {
        let g = SpaceGroup::by_name_or_num(None, Some(0));
        assert_eq!(g.symmetry_list(), ["x,y,z"]);
        assert!(g.is_identity());

        let g = SpaceGroup::by_name_or_num(Some("Xyz"), None);
        assert!(g.is_identity());
    }

    #[test]
    fn test_number_priority() {
        let g = SpaceGroup::by_name_or_num(Some("P-1"), Some(225));
        assert_eq!(g.name, "Fm-3m");

        // 编号查不到时退回名称
        let g = SpaceGroup::by_name_or_num(Some("P-1"), Some(231));
        assert_eq!(g.number, 2);
    }

    #[test]
    fn test_lookup_whole_table() {
        let g = SpaceGroup::by_name_or_num(Some("Fd-3m"), None);
        assert_eq!(g.number, 227);
        assert_eq!(g.symmetry_list().len(), 192);

        let g = SpaceGroup::by_name_or_num(None, Some(176));
        assert_eq!(g.name, "P6_3/m");
        assert_eq!(g.symmetry_list().len(), 12);

        assert_eq!(SpaceGroup::by_num(141).unwrap().symmetry_list().len(), 32);
        assert_eq!(SpaceGroup::by_name("pbca").unwrap().number, 61);
        assert!(std::ptr::eq(SpaceGroup::by_num(61).unwrap(), SpaceGroup::by_name("Pbca").unwrap()));
    }

    #[test]
    fn test_by_name_lowercase_first_letter() {
        let g = SpaceGroup::by_name("pnma").unwrap();
        assert_eq!(g.number, 62);
        assert_eq!(g.symmetry_list().len(), 8);
    }

    #[test]
    fn test_symmetric_atom() {
        let out = symmetric_atom("-x,-y,z", &atom_at([0.2, 0.3, 0.4]), &CUBIC).unwrap();
        assert_close(out.fract.unwrap(), [0.8, 0.7, 0.4]);
        assert_close(out.position(), [3.2, 2.8, 1.6]);
        assert_eq!(out.symbol, "Na");
    }

    #[test]
    fn test_calc_symmetry_span() {
        let f = [0.1, 0.2, 0.3];
        assert!((calc_symmetry_span("1/2+x", f).unwrap() - 0.6).abs() < 1e-12);
        assert!((calc_symmetry_span("-x+1/2", f).unwrap() - 0.4).abs() < 1e-12);
        assert!((calc_symmetry_span("x-y", f).unwrap() + 0.1).abs() < 1e-12);
        assert!((calc_symmetry_span(" -z ", f).unwrap() + 0.3).abs() < 1e-12);
        assert!(calc_symmetry_span("x+q", f).is_none());
    }

    #[test]
    fn test_malformed_op() {
        assert!(symmetric_atom("x,y", &atom_at([0.1, 0.1, 0.1]), &CUBIC).is_none());
    }

    #[test]
    fn test_atom_without_fract() {
        let mut atom = atom_at([0.1, 0.1, 0.1]);
        atom.fract = None;
        assert!(symmetric_atom("x,y,z", &atom, &CUBIC).is_none());
    }

    #[test]
    fn test_expand_suppresses_overlap() {
        // 原点上的原子在 -x,-y,-z 下映射到自身
        let atoms = vec![atom_at([0.0, 0.0, 0.0]), atom_at([0.25, 0.25, 0.25])];
        let ops = vec!["x,y,z".to_string(), "-x,-y,-z".to_string()];
        let out = expand(&atoms, &ops, &CUBIC);

        assert_eq!(out.len(), 3);
        assert_close(out[2].fract.unwrap(), [0.75, 0.75, 0.75]);
    }

    #[test]
    fn test_expand_empty_ops() {
        let atoms = vec![atom_at([0.1, 0.2, 0.3])];
        assert!(expand(&atoms, &[], &CUBIC).is_empty());
    }

    #[test]
    fn test_from_operations() {
        let ops = vec![
            "1 x,y,z".to_string(),
            "2 -x, y+1/2, -z".to_string(),
            "garbage".to_string(),
        ];
        let g = SpaceGroup::from_operations(&ops).unwrap();
        assert_eq!(g.symmetry_list(), ["x,y,z", "-x,y+1/2,-z"]);
    }

    #[test]
    fn test_for_structure_prefers_table() {
        let mut s = Structure::new(None, Vec::new(), false);
        s.space_group_number = Some("14".to_string());
        s.symmetry_ops = Some(vec!["x,y,z".to_string(), "-x,-y,-z".to_string()]);
        assert_eq!(SpaceGroup::for_structure(&s).symmetry_list().len(), 4);

        s.space_group_number = Some("999".to_string());
        let g = SpaceGroup::for_structure(&s);
        assert_eq!(g.symmetry_list(), ["x,y,z", "-x,-y,-z"]);
        assert_eq!(g.number, 999);
    }
}
