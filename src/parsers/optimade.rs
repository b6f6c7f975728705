//! # OPTIMADE JSON 解析器
//!
//! 读取 OPTIMADE `structures` 响应（或单个条目）中的
//! `cartesian_site_positions`、`lattice_vectors` 和物种信息。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`, `parsers/poscar.rs` 的符号清理

use super::poscar::sanitize_symbol;
use crate::error::{CifPlayerError, Result};
use crate::models::{Atom, CellDefinition, Matrix3, Structure};
use serde_json::Value;

/// 先解码 JSON 文本再解析
pub fn parse_optimade_str(content: &str) -> Result<Structure> {
    let payload: Value = serde_json::from_str(content).map_err(|e| {
        CifPlayerError::UnrecognizedFormat(format!("invalid OPTIMADE JSON: {}", e))
    })?;
    parse_optimade_value(&payload)
}

/// 解析已解码的 OPTIMADE 对象
///
/// 优先取 `data[0]`，否则把整个对象当作条目。
pub fn parse_optimade_value(payload: &Value) -> Result<Structure> {
    let src = payload
        .get("data")
        .and_then(|d| d.get(0))
        .unwrap_or(payload);

    let attributes = src
        .get("attributes")
        .filter(|a| a.is_object())
        .ok_or_else(|| CifPlayerError::UnrecognizedFormat("unexpected OPTIMADE format".to_string()))?;

    let positions = read_positions(attributes)?;
    if positions.is_empty() {
        return Err(CifPlayerError::UnrecognizedFormat(
            "no atomic positions found".to_string(),
        ));
    }

    let atoms = match (species_symbols(attributes, positions.len()), attributes.get("species_at_sites")) {
        (Some(symbols), _) => positions
            .iter()
            .zip(symbols)
            .map(|(pos, symbol)| Atom::new(symbol, *pos))
            .collect(),
        (None, Some(Value::Array(sites))) => sites_to_atoms(sites, &positions)?,
        _ => {
            return Err(CifPlayerError::MalformedAtomRecord(
                "no atomic data found".to_string(),
            ))
        }
    };

    let cell = read_lattice(attributes).map(CellDefinition::Matrix);
    let mut structure = Structure::new(cell, atoms, true);
    structure.info = format!("id={}", id_text(src.get("id")));

    Ok(structure)
}

fn read_positions(attributes: &Value) -> Result<Vec<[f64; 3]>> {
    let rows = match attributes.get("cartesian_site_positions") {
        Some(Value::Array(rows)) => rows,
        _ => {
            return Err(CifPlayerError::UnrecognizedFormat(
                "no atomic positions found".to_string(),
            ))
        }
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            vector3(row).ok_or_else(|| {
                CifPlayerError::MalformedAtomRecord(format!("invalid site position #{}", i + 1))
            })
        })
        .collect()
}

fn read_lattice(attributes: &Value) -> Option<Matrix3> {
    let rows = attributes.get("lattice_vectors")?.as_array()?;
    if rows.len() != 3 {
        return None;
    }
    let mut matrix = [[0.0; 3]; 3];
    for (slot, row) in matrix.iter_mut().zip(rows) {
        *slot = vector3(row)?;
    }
    Some(matrix)
}

fn vector3(value: &Value) -> Option<[f64; 3]> {
    let items = value.as_array()?;
    if items.len() < 3 {
        return None;
    }
    Some([items[0].as_f64()?, items[1].as_f64()?, items[2].as_f64()?])
}

/// `species[*].chemical_symbols[0]`，仅当物种表覆盖全部位点时使用
fn species_symbols(attributes: &Value, n_sites: usize) -> Option<Vec<String>> {
    let species = attributes.get("species")?.as_array()?;
    if species.len() < n_sites {
        return None;
    }
    species
        .iter()
        .take(n_sites)
        .map(|item| {
            item.get("chemical_symbols")?
                .get(0)?
                .as_str()
                .map(str::to_string)
        })
        .collect()
}

fn sites_to_atoms(sites: &[Value], positions: &[[f64; 3]]) -> Result<Vec<Atom>> {
    if sites.len() < positions.len() {
        return Err(CifPlayerError::MalformedAtomRecord(format!(
            "species_at_sites lists {} sites, expected {}",
            sites.len(),
            positions.len()
        )));
    }

    positions
        .iter()
        .zip(sites)
        .map(|(pos, site)| {
            let raw = site.as_str().ok_or_else(|| {
                CifPlayerError::MalformedAtomRecord(format!("invalid species_at_sites entry {}", site))
            })?;
            Ok(Atom::new(sanitize_symbol(raw), *pos).with_label(raw))
        })
        .collect()
}

fn id_text(id: Option<&Value>) -> String {
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structure::LABEL_KEY;
    use serde_json::json;

    fn nacl_entry() -> Value {
        json!({
            "id": "mpds-S1234",
            "attributes": {
                "lattice_vectors": [[5.64, 0.0, 0.0], [0.0, 5.64, 0.0], [0.0, 0.0, 5.64]],
                "cartesian_site_positions": [[0.0, 0.0, 0.0], [2.82, 2.82, 2.82]],
                "species_at_sites": ["Na1", "Cl2"]
            }
        })
    }

    #[test]
    fn test_species_at_sites() {
        let s = parse_optimade_value(&nacl_entry()).unwrap();
        assert!(s.cartesian);
        assert_eq!(s.info, "id=mpds-S1234");
        assert_eq!(s.atoms.len(), 2);
        assert_eq!(s.atoms[0].symbol, "Na");
        assert_eq!(s.atoms[1].symbol, "Cl");
        assert_eq!(
            s.atoms[1].overlays.get(LABEL_KEY).map(|v| v.to_string()),
            Some("Cl2".to_string())
        );
        assert!(matches!(s.cell, Some(CellDefinition::Matrix(_))));
    }

    #[test]
    fn test_data_wrapper_and_species_objects() {
        let payload = json!({
            "data": [{
                "id": 7,
                "attributes": {
                    "lattice_vectors": [[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]],
                    "cartesian_site_positions": [[0.0, 0.0, 0.0], [1.5, 1.5, 1.5]],
                    "species": [
                        { "name": "Cs", "chemical_symbols": ["Cs"] },
                        { "name": "Cl", "chemical_symbols": ["Cl"] }
                    ]
                }
            }]
        });
        let s = parse_optimade_value(&payload).unwrap();
        assert_eq!(s.info, "id=7");
        assert_eq!(s.atoms[0].symbol, "Cs");
        assert_eq!(s.atoms[1].symbol, "Cl");
        assert!((s.atoms[1].x - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_short_species_falls_back_to_sites() {
        let mut entry = nacl_entry();
        entry["attributes"]["species"] = json!([{ "chemical_symbols": ["Na"] }]);
        let s = parse_optimade_value(&entry).unwrap();
        assert_eq!(s.atoms[1].symbol, "Cl");
    }

    #[test]
    fn test_parse_from_text() {
        let text = nacl_entry().to_string();
        let s = parse_optimade_str(&text).unwrap();
        assert_eq!(s.atoms.len(), 2);
    }

    #[test]
    fn test_missing_attributes_fails() {
        let err = parse_optimade_value(&json!({ "data": [] })).unwrap_err();
        assert!(matches!(err, CifPlayerError::UnrecognizedFormat(_)));
    }

    #[test]
    fn test_empty_positions_fails() {
        let mut entry = nacl_entry();
        entry["attributes"]["cartesian_site_positions"] = json!([]);
        let err = parse_optimade_value(&entry).unwrap_err();
        assert!(matches!(err, CifPlayerError::UnrecognizedFormat(_)));
    }

    #[test]
    fn test_missing_species_fails() {
        let mut entry = nacl_entry();
        entry["attributes"]
            .as_object_mut()
            .unwrap()
            .remove("species_at_sites");
        let err = parse_optimade_value(&entry).unwrap_err();
        assert!(matches!(err, CifPlayerError::MalformedAtomRecord(_)));
    }

    #[test]
    fn test_invalid_json_text_fails() {
        let err = parse_optimade_str("{ not json").unwrap_err();
        assert!(matches!(err, CifPlayerError::UnrecognizedFormat(_)));
    }
}
