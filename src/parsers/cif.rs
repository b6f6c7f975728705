//! # CIF 格式解析器
//!
//! 单遍逐行扫描 Crystallographic Information File。
//!
//! ## CIF 格式说明
//! ```text
//! data_NaCl
//! _cell_length_a    5.64
//! ...
//! _symmetry_space_group_name_H-M 'F m -3 m'
//! _symmetry_Int_Tables_number 225
//!
//! loop_
//!  _symmetry_equiv_pos_as_xyz
//!  x,y,z
//!  ...
//!
//! loop_
//!  _atom_site_label
//!  _atom_site_type_symbol
//!  _atom_site_fract_x
//!  _atom_site_fract_y
//!  _atom_site_fract_z
//!  Na1 Na 0 0 0
//!  Cl1 Cl 0.5 0.5 0.5
//! ```
//!
//! 另外支持两个非标准标签：`_pauling_file_entry`（精选数据来源）
//! 和 `_cif_error`（文件内嵌的错误消息）。
//!
//! 一个文件含多个 `data_` 块时只返回最后一个（尚不支持帧切换）。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`, `models/elements.rs`

use super::{normalize_newlines, parse_number, starts_with_ci, strip_quotes};
use crate::error::{CifPlayerError, Result};
use crate::models::cell::cart_to_fract;
use crate::models::elements::{self, title_case};
use crate::models::structure::{CUSTOM_OVERLAYS, LABEL_KEY};
use crate::models::{Atom, CellDefinition, CellParams, OverlayValue, Overlays, Structure};

/// 扫描器状态
enum ScanState {
    /// 不在循环中
    Idle,
    /// 原子（或其他）循环，记录列标签顺序
    InLoop(Vec<String>),
    /// 对称操作循环
    InSymmetryLoop,
}

/// 原子循环中可识别的列
#[derive(Debug, Clone, Copy, PartialEq)]
enum AtomField {
    Label,
    Symbol,
    X,
    Y,
    Z,
    /// 自定义叠加属性，值为叠加键
    Overlay(&'static str),
}

impl AtomField {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "_atom_site_label" => Some(AtomField::Label),
            "_atom_site_type_symbol" => Some(AtomField::Symbol),
            "_atom_site_fract_x" | "_atom_site_cartn_x" => Some(AtomField::X),
            "_atom_site_fract_y" | "_atom_site_cartn_y" => Some(AtomField::Y),
            "_atom_site_fract_z" | "_atom_site_cartn_z" => Some(AtomField::Z),
            _ => CUSTOM_OVERLAYS
                .iter()
                .find(|(key, _)| key.starts_with('_') && key.eq_ignore_ascii_case(tag))
                .map(|(key, _)| AtomField::Overlay(key)),
        }
    }
}

/// 逐列累积一个原子
#[derive(Default)]
struct AtomBuilder {
    label: Option<String>,
    symbol: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    overlays: Overlays,
}

/// CIF 中表示"未知/不适用"的占位值
fn is_placeholder(token: &str) -> bool {
    token == "?" || token == "."
}

impl AtomBuilder {
    fn apply(&mut self, field: AtomField, token: &str) {
        match field {
            AtomField::Label if !is_placeholder(token) => self.label = Some(token.to_string()),
            AtomField::Symbol if !is_placeholder(token) => self.symbol = Some(title_case(token)),
            AtomField::X => self.x = parse_number(token),
            AtomField::Y => self.y = parse_number(token),
            AtomField::Z => self.z = parse_number(token),
            AtomField::Overlay(key) => {
                let value = match parse_number(token) {
                    Some(n) => OverlayValue::Number(n),
                    None => OverlayValue::Text(token.to_string()),
                };
                self.overlays.insert(key, value);
            }
            _ => {}
        }
    }

    /// x, y, z 齐全且能确定元素符号时才生成原子
    fn build(self) -> Option<Atom> {
        let (x, y, z) = (self.x?, self.y?, self.z?);

        let mut overlays = self.overlays;
        if let Some(label) = &self.label {
            overlays.insert(LABEL_KEY, label.as_str());
        }

        let symbol = self
            .symbol
            .as_deref()
            .or(self.label.as_deref())
            .and_then(element_from_token)?;

        Some(Atom {
            symbol,
            label: self.label,
            x,
            y,
            z,
            fract: None,
            overlays,
        })
    }
}

/// 从符号或标签推断元素符号
///
/// 取开头的字母部分（去掉编号、电荷和位点后缀），首字母大写；
/// 若长度大于 1 且不在元素表中，去掉最后一个字符再试一次。
fn element_from_token(token: &str) -> Option<String> {
    let letters: String = token.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let mut symbol = title_case(&letters);
    if symbol.len() > 1 && !elements::is_known(&symbol) {
        symbol.pop();
    }
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

/// 正在解析的数据块
#[derive(Default)]
struct BlockBuilder {
    title: String,
    cell: Option<CellParams>,
    atoms: Vec<Atom>,
    cartesian: bool,
    symmetry_ops: Vec<String>,
    space_group_name: Option<String>,
    space_group_number: Option<String>,
    demo: bool,
    curated: bool,
}

impl BlockBuilder {
    fn titled(title: &str) -> Self {
        BlockBuilder {
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn finish(self) -> Structure {
        let mut structure = Structure::new(
            self.cell.map(CellDefinition::Parameters),
            self.atoms,
            self.cartesian,
        );
        // 只有一个操作（恒等）时不保留
        if self.symmetry_ops.len() > 1 {
            structure.symmetry_ops = Some(self.symmetry_ops);
        }
        structure.space_group_name = self.space_group_name;
        structure.space_group_number = self.space_group_number;
        structure.info = self.title;
        structure.source_is_demo = self.demo;
        structure.source_is_curated = self.curated;
        structure
    }

    /// `_cell_length_a 5.64(1)` 之类的行
    fn read_cell_line(&mut self, line: &str) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            return;
        }
        let name = tokens[0].rsplit('_').next().unwrap_or("").to_ascii_lowercase();
        let literal = tokens[tokens.len() - 1];
        let Some(value) = parse_number(literal) else {
            return;
        };

        let mut cell = self.cell.unwrap_or_default();
        if !cell.set(&name, value) {
            return;
        }
        self.cell = Some(cell);

        // 演示数据的晶格常数 a 恰好保留两位小数
        if name == "a" {
            if let Some((_, decimals)) = literal.rsplit_once('.') {
                if decimals.len() == 2 {
                    self.demo = true;
                }
            }
        }
    }

    /// 按列标签顺序读取一行原子数据
    fn read_atom_row(&mut self, properties: &[String], line: &str) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut builder = AtomBuilder::default();

        for (tag, token) in properties.iter().zip(tokens.iter()) {
            if let Some(field) = AtomField::from_tag(tag) {
                builder.apply(field, token);
            }
        }

        if let Some(atom) = builder.build() {
            self.atoms.push(atom);
        }
    }
}

/// 从字符串内容解析 CIF 格式
pub fn parse_cif_content(content: &str) -> Result<Structure> {
    let text = normalize_newlines(content);
    let mut structures: Vec<Structure> = Vec::new();
    let mut current = BlockBuilder::default();
    let mut state = ScanState::Idle;

    for raw_line in text.split('\n') {
        let line = raw_line.trim();
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            state = ScanState::Idle;
            continue;
        }

        if starts_with_ci(line, "data_") {
            state = ScanState::Idle;
            let finished = std::mem::replace(&mut current, BlockBuilder::titled(&line[5..]));
            if !finished.atoms.is_empty() {
                structures.push(finished.finish());
            }
            continue;
        }

        if starts_with_ci(line, "_cell_") || starts_with_ci(line, "_cell.") {
            state = ScanState::Idle;
            current.read_cell_line(line);
            continue;
        }

        if starts_with_ci(line, "_symmetry_space_group_name_h-m")
            || starts_with_ci(line, "_space_group.patterson_name_h-m")
        {
            state = ScanState::Idle;
            // 名称从固定偏移处开始
            let name = strip_quotes(line.get(31..).unwrap_or("")).trim().to_string();
            if !name.is_empty() {
                current.space_group_name = Some(name);
            }
            continue;
        }

        if starts_with_ci(line, "_space_group.it_number")
            || starts_with_ci(line, "_space_group_it_number")
            || starts_with_ci(line, "_symmetry_int_tables_number")
        {
            state = ScanState::Idle;
            if let Some(last) = line.split_whitespace().last() {
                if line.split_whitespace().count() > 1 {
                    current.space_group_number = Some(strip_quotes(last).trim().to_string());
                }
            }
            continue;
        }

        if starts_with_ci(line, "_cif_error") {
            let message = line[10..]
                .trim()
                .trim_matches(|c| c == '\'' || c == '"')
                .to_string();
            return Err(CifPlayerError::EmbeddedSourceError(message));
        }

        if starts_with_ci(line, "_pauling_file_entry") {
            state = ScanState::Idle;
            current.curated = true;
            continue;
        }

        if starts_with_ci(line, "loop_") {
            state = ScanState::InLoop(Vec::new());
            continue;
        }

        let next_state = match &mut state {
            ScanState::Idle => None,
            ScanState::InSymmetryLoop => {
                if !line.starts_with('_') {
                    current.symmetry_ops.push(strip_quotes(line));
                }
                None
            }
            ScanState::InLoop(properties) => {
                if starts_with_ci(line, "_symmetry_equiv") || starts_with_ci(line, "_space_group") {
                    Some(ScanState::InSymmetryLoop)
                } else if line.starts_with('_') {
                    if line.eq_ignore_ascii_case("_atom_site_Cartn_x") {
                        current.cartesian = true;
                    }
                    if starts_with_ci(line, "_atom_site") && AtomField::from_tag(line).is_none() {
                        log::debug!("Skipping unsupported atom loop tag: {}", line);
                    }
                    properties.push(line.to_string());
                    None
                } else {
                    current.read_atom_row(properties, line);
                    None
                }
            }
        };

        if let Some(next) = next_state {
            state = next;
        }
    }

    if !current.atoms.is_empty() {
        structures.push(current.finish());
    }

    if structures.len() > 1 {
        log::warn!(
            "CIF contains {} data blocks, only the last one is shown",
            structures.len()
        );
    }

    structures
        .pop()
        .ok_or_else(|| CifPlayerError::UnrecognizedFormat("unexpected CIF format".to_string()))
}

/// 将 Structure 转换为 CIF 格式字符串
///
/// 输出 P1 对称性的最简 CIF；笛卡尔坐标按晶胞矩阵反解为分数坐标。
pub fn to_cif_string(structure: &Structure) -> Result<String> {
    let cell = structure
        .cell
        .as_ref()
        .ok_or(CifPlayerError::InvalidCellDefinition)?;
    let params = cell.params();

    let mut result = String::from("data_matinfio\n");

    result.push_str(&format!("_cell_length_a    {:.6}\n", params.a));
    result.push_str(&format!("_cell_length_b    {:.6}\n", params.b));
    result.push_str(&format!("_cell_length_c    {:.6}\n", params.c));
    result.push_str(&format!("_cell_angle_alpha {:.6}\n", params.alpha));
    result.push_str(&format!("_cell_angle_beta  {:.6}\n", params.beta));
    result.push_str(&format!("_cell_angle_gamma {:.6}\n", params.gamma));

    result.push_str("_symmetry_space_group_name_H-M 'P1'\n_symmetry_Int_Tables_number 1\n");
    result.push_str("\nloop_\n _symmetry_equiv_pos_as_xyz\n +x,+y,+z\n");

    result.push_str("\nloop_\n");
    result.push_str(" _atom_site_label\n");
    result.push_str(" _atom_site_type_symbol\n");
    result.push_str(" _atom_site_fract_x\n");
    result.push_str(" _atom_site_fract_y\n");
    result.push_str(" _atom_site_fract_z\n");

    let matrix = if structure.cartesian {
        Some(cell.matrix()?)
    } else {
        None
    };

    for (i, atom) in structure.atoms.iter().enumerate() {
        let fract = match &matrix {
            Some(m) => cart_to_fract(atom.position(), m).ok_or(CifPlayerError::InvalidCellDefinition)?,
            None => atom.position(),
        };
        result.push_str(&format!(
            " {}{}  {}  {:.3}  {:.3}  {:.3}\n",
            atom.symbol,
            i + 1,
            atom.symbol,
            fract[0],
            fract[1],
            fract[2]
        ));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cell::cell_to_matrix;

    const CUBIC: &str = r#"data_ScSn
_cell_length_a    3.666
_cell_length_b    3.666
_cell_length_c    3.666
_cell_angle_alpha 90
_cell_angle_beta  90
_cell_angle_gamma 90
_symmetry_space_group_name_H-M 'P m -3 m'
_symmetry_Int_Tables_number 221

loop_
 _symmetry_equiv_pos_as_xyz
 'x, y, z'
 '-x, -y, z'

loop_
 _atom_site_label
 _atom_site_fract_x
 _atom_site_fract_y
 _atom_site_fract_z
 _atom_site_occupancy
 Sc_a 0 0 0 1.0
 Sn1 0.5 0.5 0.5 0.5
"#;

    #[test]
    fn test_parse_cubic_cell() {
        let s = parse_cif_content(CUBIC).unwrap();
        assert_eq!(s.info, "ScSn");
        assert_eq!(s.atoms.len(), 2);
        assert!(!s.cartesian);

        let m = cell_to_matrix(&s.cell_params().unwrap()).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 3.666 } else { 0.0 };
                assert!((m[i][j] - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_symbol_from_label() {
        let s = parse_cif_content(CUBIC).unwrap();
        let sc = &s.atoms[0];
        assert_eq!(sc.symbol, "Sc");
        assert_eq!(sc.label.as_deref(), Some("Sc_a"));
        assert_eq!(sc.overlays.get(LABEL_KEY), Some(&OverlayValue::from("Sc_a")));
        assert_eq!(s.atoms[1].symbol, "Sn");
    }

    #[test]
    fn test_space_group_and_symmetry_ops() {
        let s = parse_cif_content(CUBIC).unwrap();
        assert_eq!(s.space_group_name.as_deref(), Some("P m -3 m"));
        assert_eq!(s.space_group_number.as_deref(), Some("221"));
        assert_eq!(
            s.symmetry_ops,
            Some(vec!["x, y, z".to_string(), "-x, -y, z".to_string()])
        );
    }

    #[test]
    fn test_occupancy_overlay() {
        let s = parse_cif_content(CUBIC).unwrap();
        assert_eq!(
            s.atoms[1].overlays.get("_atom_site_occupancy"),
            Some(&OverlayValue::Number(0.5))
        );
        // 自定义列在前，label 在后
        let keys: Vec<&str> = s.atoms[1].overlays.keys().collect();
        assert_eq!(keys, vec!["_atom_site_occupancy", "label"]);
    }

    #[test]
    fn test_cif_error_tag() {
        let content = "data_x\n_cif_error 'bad file'\nloop_\n_atom_site_label\n";
        let err = parse_cif_content(content).unwrap_err();
        match err {
            CifPlayerError::EmbeddedSourceError(msg) => assert_eq!(msg, "bad file"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_provenance_flags() {
        let content = "data_x\n_pauling_file_entry 1\n_cell_length_a 3.66\n\nloop_\n_atom_site_type_symbol\n_atom_site_fract_x\n_atom_site_fract_y\n_atom_site_fract_z\nfe 0 0 0\n";
        let s = parse_cif_content(content).unwrap();
        assert!(s.source_is_curated);
        assert!(s.source_is_demo);
        assert_eq!(s.atoms[0].symbol, "Fe");

        let plain = content.replace("3.66", "3.666").replace("_pauling_file_entry 1\n", "");
        let s = parse_cif_content(&plain).unwrap();
        assert!(!s.source_is_curated);
        assert!(!s.source_is_demo);
    }

    #[test]
    fn test_zero_coordinate_counts_as_present() {
        let content = "data_x\nloop_\n_atom_site_label\n_atom_site_fract_x\n_atom_site_fract_y\n_atom_site_fract_z\nO1 0.0 0 0.0\nO2 0.1 0.2\n";
        let s = parse_cif_content(content).unwrap();
        // 第二行缺 z，被丢弃
        assert_eq!(s.atoms.len(), 1);
        assert_eq!(s.atoms[0].symbol, "O");
    }

    #[test]
    fn test_cartesian_loop() {
        let content = "data_x\nloop_\n_atom_site_type_symbol\n_atom_site_Cartn_x\n_atom_site_Cartn_y\n_atom_site_Cartn_z\nC 1.0 2.0 3.0\n";
        let s = parse_cif_content(content).unwrap();
        assert!(s.cartesian);
        assert_eq!(s.atoms[0].position(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_suffixed_label_is_shortened() {
        assert_eq!(element_from_token("Ow3").as_deref(), Some("O"));
        assert_eq!(element_from_token("FE2+").as_deref(), Some("Fe"));
        assert_eq!(element_from_token("C12A").as_deref(), Some("C"));
        assert_eq!(element_from_token("123"), None);
    }

    #[test]
    fn test_uncertainties_and_crlf() {
        let content = "data_x\r\n_cell_length_a 5.4307(2)\r\n\r\nloop_\r\n_atom_site_label\r\n_atom_site_fract_x\r\n_atom_site_fract_y\r\n_atom_site_fract_z\r\nSi1 0.125(3) 0.125 0.125\r\n";
        let s = parse_cif_content(content).unwrap();
        assert!((s.cell_params().unwrap().a - 5.4307).abs() < 1e-9);
        assert!((s.atoms[0].x - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_blocks_returns_last() {
        let block = |name: &str, el: &str| {
            format!(
                "data_{}\nloop_\n_atom_site_label\n_atom_site_fract_x\n_atom_site_fract_y\n_atom_site_fract_z\n{}1 0 0 0\n\n",
                name, el
            )
        };
        let content = format!("{}{}", block("first", "Na"), block("second", "Cl"));
        let s = parse_cif_content(&content).unwrap();
        assert_eq!(s.info, "second");
        assert_eq!(s.atoms[0].symbol, "Cl");
    }

    #[test]
    fn test_no_atoms_fails() {
        let err = parse_cif_content("data_x\n_cell_length_a 4\n").unwrap_err();
        assert!(matches!(err, CifPlayerError::UnrecognizedFormat(_)));
    }

    #[test]
    fn test_unknown_loop_tags_are_skipped() {
        let content = "data_x\nloop_\n_atom_site_label\n_atom_site_U_iso_or_equiv\n_atom_site_fract_x\n_atom_site_fract_y\n_atom_site_fract_z\nNa1 0.01 0.5 0.5 0.5\n";
        let s = parse_cif_content(content).unwrap();
        assert_eq!(s.atoms[0].position(), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_to_cif_round_trip() {
        let s = parse_cif_content(CUBIC).unwrap();
        let cif = to_cif_string(&s).unwrap();
        assert!(cif.starts_with("data_matinfio\n_cell_length_a    3.666000\n"));
        assert!(cif.contains(" Sc1  Sc  0.000  0.000  0.000\n"));
        assert!(cif.contains(" Sn2  Sn  0.500  0.500  0.500\n"));

        let back = parse_cif_content(&cif).unwrap();
        assert_eq!(back.atoms.len(), 2);
        assert_eq!(back.space_group_name.as_deref(), Some("P1"));
        assert!(back.symmetry_ops.is_none());
    }

    #[test]
    fn test_to_cif_from_cartesian() {
        let matrix = [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]];
        let s = Structure::new(
            Some(CellDefinition::Matrix(matrix)),
            vec![Atom::new("Fe", [2.0, 1.0, 3.0])],
            true,
        );
        let cif = to_cif_string(&s).unwrap();
        assert!(cif.contains("_cell_angle_gamma 90.000000\n"));
        assert!(cif.contains(" Fe1  Fe  0.500  0.250  0.750\n"));
    }

    #[test]
    fn test_to_cif_without_cell_fails() {
        let s = Structure::new(None, vec![Atom::new("Fe", [0.0; 3])], false);
        assert!(matches!(
            to_cif_string(&s),
            Err(CifPlayerError::InvalidCellDefinition)
        ));
    }
}
