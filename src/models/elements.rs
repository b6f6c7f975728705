//! # 化学元素静态数据表
//!
//! Jmol 配色与 ASE 共价半径，进程内只读常量。
//! 注意：从 Bk 开始的半径数据并不准确（统一为 3.0 Å）。
//!
//! ## 依赖关系
//! - 被 `parsers/`（元素符号校验）和 `render/`（颜色、半径）使用
//! - 无外部模块依赖

use std::collections::HashMap;
use std::sync::OnceLock;

/// 未知元素的默认颜色
pub const DEFAULT_COLOR: &str = "#FFFF00";

/// 未知元素的默认半径 (Å)
pub const DEFAULT_RADIUS: f64 = 0.66;

/// 元素表中的一项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    /// Jmol 颜色（十六进制）
    pub color: Option<&'static str>,
    /// ASE 半径 (Å)
    pub radius: Option<f64>,
}

const fn el(symbol: &'static str, color: Option<&'static str>, radius: Option<f64>) -> Element {
    Element {
        symbol,
        color,
        radius,
    }
}

const ELEMENTS: &[Element] = &[
    el("D", Some("#FFFFC0"), None),
    el("X", None, Some(0.66)),
    el("H", Some("#FFFFFF"), Some(0.31)),
    el("He", Some("#D9FFFF"), Some(0.28)),
    el("Li", Some("#CC80FF"), Some(1.28)),
    el("Be", Some("#C2FF00"), Some(0.96)),
    el("B", Some("#FFB5B5"), Some(0.84)),
    el("C", Some("#909090"), Some(0.76)),
    el("N", Some("#3050F8"), Some(0.71)),
    el("O", Some("#FF0D0D"), Some(0.66)),
    el("F", Some("#90E050"), Some(0.57)),
    el("Ne", Some("#B3E3F5"), Some(0.58)),
    el("Na", Some("#AB5CF2"), Some(1.66)),
    el("Mg", Some("#8AFF00"), Some(1.41)),
    el("Al", Some("#BFA6A6"), Some(1.21)),
    el("Si", Some("#F0C8A0"), Some(1.11)),
    el("P", Some("#FF8000"), Some(1.07)),
    el("S", Some("#FFFF30"), Some(1.05)),
    el("Cl", Some("#1FF01F"), Some(1.02)),
    el("Ar", Some("#80D1E3"), Some(1.06)),
    el("K", Some("#8F40D4"), Some(2.03)),
    el("Ca", Some("#3DFF00"), Some(1.76)),
    el("Sc", Some("#E6E6E6"), Some(1.70)),
    el("Ti", Some("#BFC2C7"), Some(1.60)),
    el("V", Some("#A6A6AB"), Some(1.53)),
    el("Cr", Some("#8A99C7"), Some(1.39)),
    el("Mn", Some("#9C7AC7"), Some(1.39)),
    el("Fe", Some("#E06633"), Some(1.32)),
    el("Co", Some("#F090A0"), Some(1.26)),
    el("Ni", Some("#50D050"), Some(1.24)),
    el("Cu", Some("#C88033"), Some(1.32)),
    el("Zn", Some("#7D80B0"), Some(1.22)),
    el("Ga", Some("#C28F8F"), Some(1.22)),
    el("Ge", Some("#668F8F"), Some(1.20)),
    el("As", Some("#BD80E3"), Some(1.19)),
    el("Se", Some("#FFA100"), Some(1.20)),
    el("Br", Some("#A62929"), Some(1.20)),
    el("Kr", Some("#5CB8D1"), Some(1.16)),
    el("Rb", Some("#702EB0"), Some(2.20)),
    el("Sr", Some("#00FF00"), Some(1.95)),
    el("Y", Some("#94FFFF"), Some(1.90)),
    el("Zr", Some("#94E0E0"), Some(1.75)),
    el("Nb", Some("#73C2C9"), Some(1.64)),
    el("Mo", Some("#54B5B5"), Some(1.54)),
    el("Tc", Some("#3B9E9E"), Some(1.47)),
    el("Ru", Some("#248F8F"), Some(1.46)),
    el("Rh", Some("#0A7D8C"), Some(1.42)),
    el("Pd", Some("#006985"), Some(1.39)),
    el("Ag", Some("#C0C0C0"), Some(1.45)),
    el("Cd", Some("#FFD98F"), Some(1.44)),
    el("In", Some("#A67573"), Some(1.42)),
    el("Sn", Some("#668080"), Some(1.39)),
    el("Sb", Some("#9E63B5"), Some(1.39)),
    el("Te", Some("#D47A00"), Some(1.38)),
    el("I", Some("#940094"), Some(1.39)),
    el("Xe", Some("#429EB0"), Some(1.40)),
    el("Cs", Some("#57178F"), Some(2.44)),
    el("Ba", Some("#00C900"), Some(2.15)),
    el("La", Some("#70D4FF"), Some(2.07)),
    el("Ce", Some("#FFFFC7"), Some(2.04)),
    el("Pr", Some("#D9FFC7"), Some(2.03)),
    el("Nd", Some("#C7FFC7"), Some(2.01)),
    el("Pm", Some("#A3FFC7"), Some(1.99)),
    el("Sm", Some("#8FFFC7"), Some(1.98)),
    el("Eu", Some("#61FFC7"), Some(1.98)),
    el("Gd", Some("#45FFC7"), Some(1.96)),
    el("Tb", Some("#30FFC7"), Some(1.94)),
    el("Dy", Some("#1FFFC7"), Some(1.92)),
    el("Ho", Some("#00FF9C"), Some(1.92)),
    el("Er", Some("#00E675"), Some(1.89)),
    el("Tm", Some("#00D452"), Some(1.90)),
    el("Yb", Some("#00BF38"), Some(1.87)),
    el("Lu", Some("#00AB24"), Some(1.87)),
    el("Hf", Some("#4DC2FF"), Some(1.75)),
    el("Ta", Some("#4DA6FF"), Some(1.70)),
    el("W", Some("#2194D6"), Some(1.62)),
    el("Re", Some("#267DAB"), Some(1.51)),
    el("Os", Some("#266696"), Some(1.44)),
    el("Ir", Some("#175487"), Some(1.41)),
    el("Pt", Some("#D0D0E0"), Some(1.36)),
    el("Au", Some("#FFD123"), Some(1.36)),
    el("Hg", Some("#B8B8D0"), Some(1.32)),
    el("Tl", Some("#A6544D"), Some(1.45)),
    el("Pb", Some("#575961"), Some(1.46)),
    el("Bi", Some("#9E4FB5"), Some(1.48)),
    el("Po", Some("#AB5C00"), Some(1.40)),
    el("At", Some("#754F45"), Some(1.50)),
    el("Rn", Some("#428296"), Some(1.50)),
    el("Fr", Some("#420066"), Some(2.60)),
    el("Ra", Some("#007D00"), Some(2.21)),
    el("Ac", Some("#70ABFA"), Some(2.15)),
    el("Th", Some("#00BAFF"), Some(2.06)),
    el("Pa", Some("#00A1FF"), Some(2.00)),
    el("U", Some("#008FFF"), Some(1.96)),
    el("Np", Some("#0080FF"), Some(1.90)),
    el("Pu", Some("#006BFF"), Some(1.87)),
    el("Am", Some("#545CF2"), Some(1.80)),
    el("Cm", Some("#785CE3"), Some(1.69)),
    el("Bk", Some("#8A4FE3"), Some(3.00)),
    el("Cf", Some("#A136D4"), Some(3.00)),
    el("Es", Some("#B31FD4"), Some(3.00)),
    el("Fm", Some("#B31FBA"), Some(3.00)),
    el("Md", Some("#B30DA6"), Some(3.00)),
    el("No", Some("#BD0D87"), Some(3.00)),
    el("Lr", Some("#C70066"), Some(3.00)),
    el("Rf", Some("#CC0059"), Some(3.00)),
    el("Db", Some("#D1004F"), Some(3.00)),
    el("Sg", Some("#D90045"), Some(3.00)),
    el("Bh", Some("#E00038"), Some(3.00)),
    el("Hs", Some("#E6002E"), Some(3.00)),
    el("Mt", Some("#EB0026"), Some(3.00)),
];

fn index() -> &'static HashMap<&'static str, &'static Element> {
    static INDEX: OnceLock<HashMap<&'static str, &'static Element>> = OnceLock::new();
    INDEX.get_or_init(|| ELEMENTS.iter().map(|e| (e.symbol, e)).collect())
}

/// 按符号查找元素（区分大小写）
pub fn lookup(symbol: &str) -> Option<&'static Element> {
    index().get(symbol).copied()
}

/// 符号是否在元素表中
pub fn is_known(symbol: &str) -> bool {
    lookup(symbol).is_some()
}

/// 元素颜色，未知时返回默认黄色
pub fn color_of(symbol: &str) -> &'static str {
    lookup(symbol)
        .and_then(|e| e.color)
        .unwrap_or(DEFAULT_COLOR)
}

/// 元素半径，未知时返回默认值
pub fn radius_of(symbol: &str) -> f64 {
    tabulated_radius(symbol).unwrap_or(DEFAULT_RADIUS)
}

/// 表中记录的半径（不含默认值），用于重叠原子的排序
pub fn tabulated_radius(symbol: &str) -> Option<f64> {
    lookup(symbol).and_then(|e| e.radius)
}

/// 首字母大写，其余小写
pub fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
