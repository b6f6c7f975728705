//! # VASP POSCAR 格式解析器
//!
//! 解析 VASP POSCAR/CONTCAR 文件格式。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (or element symbols)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1 [symbol]      # atom positions
//! ...
//! ```
//!
//! VASP 4 文件没有元素行，此时元素可以写在第 0 行，
//! 或写在每个坐标行的末尾；都没有时用占位符号 `Xx`。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`, `models/elements.rs`

use super::normalize_newlines;
use crate::error::{CifPlayerError, Result};
use crate::models::elements;
use crate::models::{Atom, CellDefinition, Matrix3, Structure};

/// 缺少元素信息时的占位符号
pub const PLACEHOLDER_SYMBOL: &str = "Xx";

/// 坐标类型标记（取前 6 个字符）
#[derive(Debug, Clone, Copy, PartialEq)]
enum Marker {
    Direct,
    Cartesian,
    Selective,
}

fn marker_of(line: &str) -> Option<Marker> {
    let head: String = line.trim().to_lowercase().chars().take(6).collect();
    match head.as_str() {
        "direct" => Some(Marker::Direct),
        "cartes" => Some(Marker::Cartesian),
        "select" => Some(Marker::Selective),
        _ => None,
    }
}

fn is_numeric(token: &str) -> bool {
    token.parse::<f64>().map(|v| v.is_finite()).unwrap_or(false)
}

/// 去掉非单词字符和数字，空结果用占位符号
pub(crate) fn sanitize_symbol(token: &str) -> String {
    let symbol: String = token.chars().filter(|c| c.is_alphabetic()).collect();
    if symbol.is_empty() {
        PLACEHOLDER_SYMBOL.to_string()
    } else {
        symbol
    }
}

/// 头部（第 0–8 行）解析过程中收集的信息
#[derive(Default)]
struct Header {
    symbols: Vec<String>,
    counts: Vec<usize>,
    cartesian: bool,
    selective: bool,
}

impl Header {
    /// 第 5、6 行：原子数或元素符号
    fn read_species_line(&mut self, tokens: &[&str]) {
        match tokens.first() {
            Some(first) if is_numeric(first) => {
                self.counts = tokens.iter().filter_map(|t| t.parse().ok()).collect();
            }
            Some(_) => self.symbols = tokens.iter().map(|t| t.to_string()).collect(),
            None => {}
        }
    }

    /// 按原子数展开的类型序号（元素块序号，从 1 开始）
    fn expanded_types(&self) -> Vec<usize> {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(k, count)| std::iter::repeat(k + 1).take(*count))
            .collect()
    }

    /// 按原子数展开的元素序列
    fn expanded_symbols(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (k, symbol) in self.symbols.iter().enumerate() {
            let count = self.counts.get(k).copied().unwrap_or(0);
            out.extend(std::iter::repeat(symbol.clone()).take(count));
        }
        out
    }
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str) -> Result<Structure> {
    let text = normalize_newlines(content);
    let lines: Vec<&str> = text.split('\n').collect();

    if lines.len() < 7 {
        return Err(CifPlayerError::UnrecognizedFormat(
            "POSCAR file too short".to_string(),
        ));
    }

    let mut header = Header::default();
    let mut info = String::new();

    // Line 0: 注释，或全部为已知元素时作为元素行
    let first: Vec<&str> = lines[0].split_whitespace().collect();
    if !first.is_empty() && first.iter().all(|t| elements::is_known(t)) {
        header.symbols = first.iter().map(|t| t.to_string()).collect();
    } else {
        info = lines[0].trim().to_string();
    }

    // Line 1: Scaling factor
    let scale: f64 = match lines[1].split_whitespace().next().and_then(|t| t.parse().ok()) {
        Some(v) => v,
        None => {
            log::warn!("Invalid POSCAR scaling factor '{}', using 1.0", lines[1].trim());
            1.0
        }
    };

    // Lines 2-4: Lattice vectors
    let mut matrix: Matrix3 = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(CifPlayerError::UnrecognizedFormat(format!(
                "invalid POSCAR lattice vector at line {}",
                3 + i
            )));
        }
        *row = [parts[0] * scale, parts[1] * scale, parts[2] * scale];
    }

    // Line 5: 原子数或元素符号
    header.read_species_line(&lines[5].split_whitespace().collect::<Vec<_>>());

    // Line 6: 坐标类型或 Selective dynamics，或（第 5 行是元素时）原子数
    match marker_of(lines[6]) {
        Some(Marker::Direct) => {}
        Some(Marker::Cartesian) => header.cartesian = true,
        Some(Marker::Selective) => header.selective = true,
        None => header.read_species_line(&lines[6].split_whitespace().collect::<Vec<_>>()),
    }

    let species = header.expanded_symbols();
    let mut atoms: Vec<Atom> = Vec::new();

    for (i, line) in lines.iter().enumerate().skip(7) {
        if i < 9 {
            match marker_of(line) {
                Some(Marker::Direct) => continue,
                Some(Marker::Selective) => {
                    header.selective = true;
                    continue;
                }
                Some(Marker::Cartesian) => {
                    header.cartesian = true;
                    continue;
                }
                None => {}
            }
        }

        // 注释符号只去掉字符本身，其后的元素名仍然有效
        let cleaned = line.replace(['#', '!'], " ");
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        if tokens.is_empty() {
            break;
        }
        if tokens.len() < 3 {
            return Err(CifPlayerError::MalformedAtomRecord(format!(
                "unknown atom definition at line {}: '{}'",
                i + 1,
                line.trim()
            )));
        }

        let mut position = [0.0; 3];
        for (k, slot) in position.iter_mut().enumerate() {
            *slot = tokens[k].parse().map_err(|_| {
                CifPlayerError::MalformedAtomRecord(format!(
                    "non-numeric coordinate '{}' at line {}",
                    tokens[k],
                    i + 1
                ))
            })?;
        }

        // Selective dynamics 的 T/F 标记不是元素
        let explicit = tokens[3..]
            .iter()
            .find(|t| !(header.selective && (**t == "T" || **t == "F")));

        let symbol = match explicit {
            Some(token) => sanitize_symbol(token),
            None => species
                .get(atoms.len())
                .cloned()
                .unwrap_or_else(|| PLACEHOLDER_SYMBOL.to_string()),
        };

        atoms.push(Atom::new(symbol, position));
    }

    if atoms.is_empty() {
        return Err(CifPlayerError::UnrecognizedFormat(
            "unexpected POSCAR format".to_string(),
        ));
    }

    let mut structure = Structure::new(
        Some(CellDefinition::Matrix(matrix)),
        atoms,
        header.cartesian,
    );
    structure.info = info;

    let types = header.expanded_types();
    if types.len() == structure.atoms.len() {
        structure.types = Some(types);
    }

    Ok(structure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poscar_vasp5() {
        let content = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;
        let s = parse_poscar_content(content).unwrap();
        assert_eq!(s.info, "NaCl");
        assert_eq!(s.atoms.len(), 8);
        assert!(!s.cartesian);

        let na_count = s.atoms.iter().filter(|a| a.symbol == "Na").count();
        let cl_count = s.atoms.iter().filter(|a| a.symbol == "Cl").count();
        assert_eq!(na_count, 4);
        assert_eq!(cl_count, 4);
    }

    #[test]
    fn test_parse_poscar_with_scale() {
        let content = r#"Si
2.0
2.0 0.0 0.0
0.0 2.0 0.0
0.0 0.0 2.0
Si
2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;
        let s = parse_poscar_content(content).unwrap();
        let p = s.cell_params().unwrap();

        // 2.0 * 2.0 = 4.0
        assert!((p.a - 4.0).abs() < 1e-9);
        assert!((p.c - 4.0).abs() < 1e-9);
        // 第 0 行全是元素符号，不作为注释
        assert_eq!(s.info, "");
    }

    #[test]
    fn test_parse_poscar_selective_dynamics() {
        let content = r#"Fe with selective
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
2
Selective dynamics
Cartesian
0.0 0.0 0.0 T T T
1.435 1.435 1.435 F F F
"#;
        let s = parse_poscar_content(content).unwrap();
        assert_eq!(s.atoms.len(), 2);
        assert!(s.cartesian);
        assert!(s.atoms.iter().all(|a| a.symbol == "Fe"));
    }

    #[test]
    fn test_parse_poscar_vasp4_selective_dynamics() {
        // 没有元素行：第 6 行就是 Selective dynamics
        let content = "Fe\n1.0\n2.87 0 0\n0 2.87 0\n0 0 2.87\n2\nSelective dynamics\nDirect\n\
                       0 0 0 T T T\n0.5 0.5 0.5 F F F\n";
        let s = parse_poscar_content(content).unwrap();
        let symbols: Vec<&str> = s.atoms.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, ["Fe", "Fe"]);
        assert!(!s.cartesian);

        let bare = "Fe\n1.0\n2.87 0 0\n0 2.87 0\n0 0 2.87\n2\nSelective dynamics\nCartesian\n\
                    0 0 0\n1.435 1.435 1.435\n";
        let s = parse_poscar_content(bare).unwrap();
        assert!(s.atoms.iter().all(|a| a.symbol == "Fe"));
        assert!(s.cartesian);
    }

    #[test]
    fn test_parse_poscar_vasp4_inline_symbols() {
        let content = r#"Cu Au
1.0
3.9 0 0
0 3.9 0
0 0 3.9
1 1
Direct
0 0 0 Cu1
0.5 0.5 0.5 # Au
"#;
        let s = parse_poscar_content(content).unwrap();
        assert_eq!(s.atoms[0].symbol, "Cu");
        assert_eq!(s.atoms[1].symbol, "Au");
    }

    #[test]
    fn test_parse_poscar_species_from_first_line() {
        let content = "Cu Au\n1.0\n3.9 0 0\n0 3.9 0\n0 0 3.9\n1 1\nDirect\n0 0 0\n0.5 0.5 0.5\n";
        let s = parse_poscar_content(content).unwrap();
        assert_eq!(s.atoms[0].symbol, "Cu");
        assert_eq!(s.atoms[1].symbol, "Au");
    }

    #[test]
    fn test_parse_poscar_placeholder_symbol() {
        let content = "title\n1.0\n3 0 0\n0 3 0\n0 0 3\n2\nDirect\n0 0 0\n0.5 0.5 0.5\n";
        let s = parse_poscar_content(content).unwrap();
        assert!(s.atoms.iter().all(|a| a.symbol == PLACEHOLDER_SYMBOL));
    }

    #[test]
    fn test_short_atom_line_fails() {
        let content = "title\n1.0\n3 0 0\n0 3 0\n0 0 3\nSi\n1\nDirect\n0 0\n";
        let err = parse_poscar_content(content).unwrap_err();
        assert!(matches!(err, CifPlayerError::MalformedAtomRecord(_)));
    }

    #[test]
    fn test_no_atoms_fails() {
        let content = "title\n1.0\n3 0 0\n0 3 0\n0 0 3\nSi\n1\nDirect\n\n";
        let err = parse_poscar_content(content).unwrap_err();
        assert!(matches!(err, CifPlayerError::UnrecognizedFormat(_)));
    }

    #[test]
    fn test_blank_line_ends_positions() {
        let content = "title\n1.0\n3 0 0\n0 3 0\n0 0 3\nSi\n1\nDirect\n0 0 0\n\n0.1 0.1 0.1\n";
        let s = parse_poscar_content(content).unwrap();
        assert_eq!(s.atoms.len(), 1);
    }

    #[test]
    fn test_sanitize_symbol() {
        assert_eq!(sanitize_symbol("Fe2+"), "Fe");
        assert_eq!(sanitize_symbol("_1"), PLACEHOLDER_SYMBOL);
    }
}
