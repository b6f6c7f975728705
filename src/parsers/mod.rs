//! # 解析器模块
//!
//! 格式识别，以及 CIF、POSCAR、OPTIMADE 三种格式的解析器。
//!
//! ## 依赖关系
//! - 被 `source.rs` 和 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: cif, poscar, optimade

pub mod cif;
pub mod optimade;
pub mod poscar;

use crate::error::{CifPlayerError, Result};
use crate::models::Structure;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// 可识别的输入格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Format {
    Cif,
    Poscar,
    /// 已解码的 JSON 对象
    Optimade,
    /// 尚未解码的 OPTIMADE JSON 文本
    OptimadeJsonText,
    Unknown,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Cif => write!(f, "CIF"),
            Format::Poscar => write!(f, "POSCAR"),
            Format::Optimade => write!(f, "OPTIMADE"),
            Format::OptimadeJsonText => write!(f, "OPTIMADE (JSON text)"),
            Format::Unknown => write!(f, "unknown"),
        }
    }
}

/// 原始输入：文本，或已解码的 JSON
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Text(String),
    Json(Value),
}

impl From<&str> for RawInput {
    fn from(s: &str) -> Self {
        RawInput::Text(s.to_string())
    }
}

impl From<String> for RawInput {
    fn from(s: String) -> Self {
        RawInput::Text(s)
    }
}

impl From<Value> for RawInput {
    fn from(v: Value) -> Self {
        RawInput::Json(v)
    }
}

/// 统一换行符为 `\n`
pub(crate) fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// 识别输入格式
///
/// 按顺序检查：已解码 JSON → CIF 标记 → OPTIMADE JSON 文本 →
/// 第 6–8 行的 POSCAR 坐标类型标记。
pub fn detect_format(input: &RawInput) -> Format {
    let text = match input {
        RawInput::Json(_) => return Format::Optimade,
        RawInput::Text(t) => t,
    };

    if text.contains("_atom_site") && text.contains("loop_") {
        return Format::Cif;
    }

    if text.contains("\"immutable_id\"")
        && text.contains("\"cartesian_site_positions\"")
        && text.contains("\"lattice_vectors\"")
    {
        return Format::OptimadeJsonText;
    }

    let normalized = normalize_newlines(text);
    let lines: Vec<&str> = normalized.split('\n').collect();
    for line in lines.iter().skip(6).take(3) {
        if line.is_empty() {
            break;
        }
        let marker = line.trim().to_lowercase();
        if marker.starts_with("direct") || marker.starts_with("cartes") {
            return Format::Poscar;
        }
    }

    Format::Unknown
}

/// 识别格式并解析
pub fn parse(input: &RawInput) -> Result<Structure> {
    parse_as(input, detect_format(input))
}

/// 按指定格式解析
pub fn parse_as(input: &RawInput, format: Format) -> Result<Structure> {
    match (format, input) {
        (Format::Optimade, RawInput::Json(value)) => optimade::parse_optimade_value(value),
        (Format::Optimade, RawInput::Text(text)) | (Format::OptimadeJsonText, RawInput::Text(text)) => {
            optimade::parse_optimade_str(text)
        }
        (Format::OptimadeJsonText, RawInput::Json(value)) => optimade::parse_optimade_value(value),
        (Format::Cif, RawInput::Text(text)) => cif::parse_cif_content(text),
        (Format::Poscar, RawInput::Text(text)) => poscar::parse_poscar_content(text),
        (Format::Unknown, _) => Err(CifPlayerError::UnrecognizedFormat(
            "file format not recognized".to_string(),
        )),
        (format, RawInput::Json(_)) => Err(CifPlayerError::UnrecognizedFormat(format!(
            "{} cannot be read from a JSON object",
            format
        ))),
    }
}

/// 读取结构文件
///
/// `.json` 文件先解码为 JSON 对象，其他文件按文本读取。
pub fn read_structure_file(path: &Path) -> Result<RawInput> {
    let content = fs::read_to_string(path).map_err(|e| CifPlayerError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        Ok(RawInput::Json(serde_json::from_str(&content)?))
    } else {
        Ok(RawInput::Text(content))
    }
}

/// 解析数字字面量，容忍 CIF 标准不确定度写法 `1.234(5)`
///
/// 只取开头的数字部分，无法解析时返回 None。
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
    });
    re.find(token.trim()).and_then(|m| m.as_str().parse().ok())
}

/// 去掉单引号和双引号
pub(crate) fn strip_quotes(s: &str) -> String {
    s.chars().filter(|c| *c != '\'' && *c != '"').collect()
}

/// 不区分 ASCII 大小写的前缀匹配
pub(crate) fn starts_with_ci(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSCAR_LIKE: &str = "Si2\n1.0\n5.43 0 0\n0 5.43 0\n0 0 5.43\nSi\n2\nDirect\n0 0 0\n";

    /// VASP 4：没有元素行，第 6 行即坐标类型
    const POSCAR_VASP4: &str = "Si2\n1.0\n5.43 0 0\n0 5.43 0\n0 0 5.43\n2\nDirect\n0 0 0\n0.25 0.25 0.25";

    #[test]
    fn test_detect_cif() {
        let input = RawInput::from("data_x\nloop_\n_atom_site_label\nFe1 0 0 0\n");
        assert_eq!(detect_format(&input), Format::Cif);
    }

    #[test]
    fn test_detect_decoded_json() {
        let input = RawInput::from(serde_json::json!({ "data": [] }));
        assert_eq!(detect_format(&input), Format::Optimade);
    }

    #[test]
    fn test_detect_optimade_text() {
        let input = RawInput::from(
            r#"{"immutable_id": "x", "cartesian_site_positions": [], "lattice_vectors": []}"#,
        );
        assert_eq!(detect_format(&input), Format::OptimadeJsonText);
    }

    #[test]
    fn test_detect_poscar() {
        assert_eq!(detect_format(&RawInput::from(POSCAR_LIKE)), Format::Poscar);

        let cartesian = POSCAR_LIKE.replace("Direct", "Cartesian").replace('\n', "\r\n");
        assert_eq!(detect_format(&RawInput::from(cartesian)), Format::Poscar);
    }

    #[test]
    fn test_detect_poscar_marker_on_line_six() {
        let lines: Vec<&str> = POSCAR_VASP4.split('\n').collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[6], "Direct");
        assert_eq!(detect_format(&RawInput::from(POSCAR_VASP4)), Format::Poscar);

        // 第 6 行为空时停止扫描
        let gap = POSCAR_VASP4.replace("\nDirect", "\n\nDirect");
        assert_eq!(detect_format(&RawInput::from(gap)), Format::Unknown);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_format(&RawInput::from("hello\nworld")), Format::Unknown);
        assert_eq!(detect_format(&RawInput::from("")), Format::Unknown);
    }

    #[test]
    fn test_parse_unknown_fails() {
        let err = parse(&RawInput::from("nothing here")).unwrap_err();
        assert!(matches!(err, CifPlayerError::UnrecognizedFormat(_)));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("3.666"), Some(3.666));
        assert_eq!(parse_number("5.4307(2)"), Some(5.4307));
        assert_eq!(parse_number("-.5"), Some(-0.5));
        assert_eq!(parse_number("1e-3"), Some(0.001));
        assert_eq!(parse_number("?"), None);
        assert_eq!(parse_number("."), None);
    }

    #[test]
    fn test_starts_with_ci() {
        assert!(starts_with_ci("DATA_foo", "data_"));
        assert!(!starts_with_ci("dat", "data_"));
        assert!(!starts_with_ci("é_data", "data_"));
    }
}
