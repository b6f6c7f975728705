//! # 渲染模型构建
//!
//! 把 `Structure` 转成可视化用的 `RenderModel`：
//! 计算分数/笛卡尔坐标，合并重叠位点，汇总叠加属性，
//! 查颜色和半径，可选地展开对称副本。
//!
//! ## 依赖关系
//! - 被 `source.rs`, `commands/render.rs` 使用
//! - 使用 `models/`, `symmetry/spacegroup.rs`

use crate::error::Result;
use crate::models::cell::{cart_to_fract, fract_cord_norm, fract_to_cart, Matrix3};
use crate::models::elements;
use crate::models::structure::{overlay_title, CUSTOM_OVERLAYS, OCCUPANCY_KEY};
use crate::models::{Atom, CellDescr, Overlays, RenderAtom, RenderModel, Structure};
use crate::symmetry::spacegroup::{expand, is_overlap, POS_OVERLAP_LIMIT};

/// 符号列表叠加键
pub const SYMBOL_KEY: &str = "S";

/// 位点序号叠加键
pub const INDEX_KEY: &str = "N";

/// 位置重合的一组原子，成员按表中半径从大到小排列
struct Group {
    fract: Option<[f64; 3]>,
    cart: [f64; 3],
    members: Vec<usize>,
}

impl Group {
    /// 按半径降序插入；半径相同或未知时排在已有成员之后
    fn insert(&mut self, atoms: &[Atom], index: usize) {
        let radius = elements::tabulated_radius(&atoms[index].symbol);
        let slot = self.members.iter().position(|m| {
            match (radius, elements::tabulated_radius(&atoms[*m].symbol)) {
                (Some(new), Some(old)) => new > old,
                _ => false,
            }
        });
        match slot {
            Some(pos) => self.members.insert(pos, index),
            None => self.members.push(index),
        }
    }
}

/// 单个原子的 (分数坐标, 笛卡尔坐标)
fn positions(atom: &Atom, cartesian: bool, matrix: Option<&Matrix3>) -> (Option<[f64; 3]>, [f64; 3]) {
    let pos = atom.position();

    let fract = if cartesian {
        matrix
            .and_then(|m| cart_to_fract(pos, m))
            .map(|f| f.map(fract_cord_norm))
    } else {
        Some(pos.map(fract_cord_norm))
    };

    let cart = match (fract, matrix) {
        (Some(f), Some(m)) => fract_to_cart(f, m),
        _ => pos,
    };

    (fract, cart)
}

/// 组内叠加属性汇总
fn merge_overlays(atoms: &[Atom], members: &[usize]) -> Overlays {
    let primary = &atoms[members[0]];

    let mut overlays = Overlays::new();
    overlays.insert(SYMBOL_KEY, primary.symbol.as_str());
    overlays.insert(INDEX_KEY, members[0] + 1);
    for (key, value) in primary.overlays.iter() {
        overlays.insert(key, value.clone());
    }

    let keys: Vec<String> = overlays.keys().map(str::to_string).collect();
    let mut seen: Vec<&str> = vec![primary.symbol.as_str()];

    for &index in &members[1..] {
        let atom = &atoms[index];
        for key in &keys {
            let Some(slot) = overlays.get_mut(key) else {
                continue;
            };
            match key.as_str() {
                SYMBOL_KEY => {
                    if !seen.contains(&atom.symbol.as_str()) {
                        slot.append(" ", &atom.symbol);
                        seen.push(atom.symbol.as_str());
                    }
                }
                INDEX_KEY => slot.append(", ", &(index + 1)),
                OCCUPANCY_KEY => {
                    if let Some(value) = atom.overlays.get(key) {
                        slot.append("+", value);
                    }
                }
                _ => {
                    if let Some(value) = atom.overlays.get(key) {
                        slot.append(" ", value);
                    }
                }
            }
        }
    }

    overlays
}

/// 结构中实际出现的自定义叠加键
fn present_overlays(atoms: &[Atom]) -> Vec<(String, String)> {
    CUSTOM_OVERLAYS
        .iter()
        .filter(|(key, _)| atoms.iter().any(|a| a.overlays.contains_key(key)))
        .filter_map(|(key, _)| overlay_title(key).map(|t| (key.to_string(), t.to_string())))
        .collect()
}

/// 构建渲染模型
///
/// `enabled_ops` 非空且存在晶胞时，原子替换为对称展开的结果。
pub fn to_render_model(structure: &Structure, enabled_ops: &[String]) -> Result<RenderModel> {
    let matrix = structure.cell_matrix()?;

    let cell_descr = structure.cell_params().map(|params| CellDescr {
        params,
        symlabel: structure.symmetry_label(),
    });

    if structure.atoms.is_empty() {
        log::warn!("Note: no atomic coordinates supplied");
    }

    let mut groups: Vec<Group> = Vec::new();
    for (index, atom) in structure.atoms.iter().enumerate() {
        let (fract, cart) = positions(atom, structure.cartesian, matrix.as_ref());

        match groups
            .iter_mut()
            .find(|g| is_overlap(cart, g.cart, POS_OVERLAP_LIMIT))
        {
            Some(group) => group.insert(&structure.atoms, index),
            None => groups.push(Group {
                fract,
                cart,
                members: vec![index],
            }),
        }
    }

    let mut atoms: Vec<RenderAtom> = groups
        .iter()
        .map(|group| {
            let primary = &structure.atoms[group.members[0]];
            RenderAtom {
                x: group.cart[0],
                y: group.cart[1],
                z: group.cart[2],
                fract: group.fract,
                color: elements::color_of(&primary.symbol).to_string(),
                radius: elements::radius_of(&primary.symbol),
                overlays: merge_overlays(&structure.atoms, &group.members),
                symbol: primary.symbol.clone(),
                label: primary.label.clone(),
            }
        })
        .collect();

    if !enabled_ops.is_empty() {
        match matrix.as_ref() {
            Some(m) => atoms = expand(&atoms, enabled_ops, m),
            None => log::warn!("Symmetry expansion skipped: no unit cell defined"),
        }
    }

    Ok(RenderModel {
        atoms,
        cell_matrix: matrix,
        cell_descr,
        overlayed: present_overlays(&structure.atoms),
        space_group_name: structure.space_group_name.clone(),
        space_group_number: structure.space_group_num(),
        info: structure.info.clone(),
        source_is_demo: structure.source_is_demo,
        source_is_curated: structure.source_is_curated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CifPlayerError;
    use crate::models::{CellDefinition, CellParams};

    fn cubic(a: f64) -> Option<CellDefinition> {
        Some(CellDefinition::Parameters(CellParams::new(a, a, a, 90.0, 90.0, 90.0)))
    }

    fn text(model: &RenderModel, i: usize, key: &str) -> String {
        model.atoms[i].overlays.get(key).unwrap().to_string()
    }

    #[test]
    fn test_merge_same_position() {
        let atoms = vec![
            Atom::new("Sn", [0.5, 0.5, 0.5]),
            Atom::new("Sc", [0.5, 0.5, 0.5]),
        ];
        let s = Structure::new(cubic(4.0), atoms, false);
        let model = to_render_model(&s, &[]).unwrap();

        assert_eq!(model.atoms.len(), 1);
        let symbols = text(&model, 0, SYMBOL_KEY);
        let mut parts: Vec<&str> = symbols.split(' ').collect();
        parts.sort();
        assert_eq!(parts, ["Sc", "Sn"]);

        // Sc 半径更大，作为代表原子
        assert_eq!(model.atoms[0].symbol, "Sc");
        assert_eq!(text(&model, 0, INDEX_KEY), "2, 1");
    }

    #[test]
    fn test_same_symbol_listed_once() {
        let atoms = vec![
            Atom::new("Fe", [0.0, 0.0, 0.0]),
            Atom::new("Fe", [1.0, 1.0, 1.0]),
        ];
        let s = Structure::new(cubic(3.0), atoms, false);
        let model = to_render_model(&s, &[]).unwrap();

        assert_eq!(model.atoms.len(), 1);
        assert_eq!(text(&model, 0, SYMBOL_KEY), "Fe");
        assert_eq!(text(&model, 0, INDEX_KEY), "1, 2");
    }

    #[test]
    fn test_occupancy_joined_with_plus() {
        let atoms = vec![
            Atom::new("Sn", [0.1, 0.1, 0.1]).with_overlay(OCCUPANCY_KEY, 0.5),
            Atom::new("Sn", [0.1, 0.1, 0.1]).with_overlay(OCCUPANCY_KEY, 0.25),
            Atom::new("O", [0.6, 0.1, 0.1]).with_label("O1"),
        ];
        let s = Structure::new(cubic(5.0), atoms, false);
        let model = to_render_model(&s, &[]).unwrap();

        assert_eq!(model.atoms.len(), 2);
        assert_eq!(text(&model, 0, OCCUPANCY_KEY), "0.5+0.25");
        assert_eq!(model.atoms[1].label.as_deref(), Some("O1"));
        assert_eq!(
            model.overlayed,
            vec![
                (OCCUPANCY_KEY.to_string(), "site occupancies".to_string()),
                ("label".to_string(), "labels".to_string()),
            ]
        );
    }

    #[test]
    fn test_fractional_positions_normalized() {
        let s = Structure::new(cubic(2.0), vec![Atom::new("Na", [-0.25, 1.25, 0.0])], false);
        let model = to_render_model(&s, &[]).unwrap();
        let atom = &model.atoms[0];

        let f = atom.fract.unwrap();
        assert!((f[0] - 0.75).abs() < 1e-9);
        assert!((f[1] - 0.25).abs() < 1e-9);
        assert!((atom.x - 1.5).abs() < 1e-9);
        assert!((atom.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cartesian_input() {
        let m = [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]];
        let s = Structure::new(
            Some(CellDefinition::Matrix(m)),
            vec![Atom::new("Cl", [-1.0, 2.0, 5.0])],
            true,
        );
        let model = to_render_model(&s, &[]).unwrap();
        let atom = &model.atoms[0];

        let f = atom.fract.unwrap();
        assert!((f[0] - 0.75).abs() < 1e-9);
        assert!((f[2] - 0.25).abs() < 1e-9);
        assert!((atom.x - 3.0).abs() < 1e-9);
        assert!((atom.z - 1.0).abs() < 1e-9);
        assert!((model.cell_descr.unwrap().params.a - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_cell_keeps_positions() {
        let s = Structure::new(None, vec![Atom::new("C", [1.5, 2.5, 3.5])], true);
        let model = to_render_model(&s, &[]).unwrap();
        let atom = &model.atoms[0];

        assert!(atom.fract.is_none());
        assert_eq!(atom.position(), [1.5, 2.5, 3.5]);
        assert!(model.cell_matrix.is_none());
        assert!(model.cell_descr.is_none());
    }

    #[test]
    fn test_colors_and_defaults() {
        let atoms = vec![
            Atom::new("Fe", [0.0, 0.0, 0.0]),
            Atom::new("Xx", [0.5, 0.5, 0.5]),
        ];
        let s = Structure::new(cubic(3.0), atoms, false);
        let model = to_render_model(&s, &[]).unwrap();

        assert_eq!(model.atoms[0].color, elements::color_of("Fe"));
        assert_eq!(model.atoms[1].color, elements::DEFAULT_COLOR);
        assert_eq!(model.atoms[1].radius, elements::DEFAULT_RADIUS);
    }

    #[test]
    fn test_incomplete_cell_fails() {
        let params = CellParams::new(3.0, 3.0, 0.0, 90.0, 90.0, 90.0);
        let s = Structure::new(
            Some(CellDefinition::Parameters(params)),
            vec![Atom::new("C", [0.0, 0.0, 0.0])],
            false,
        );
        let err = to_render_model(&s, &[]).unwrap_err();
        assert!(matches!(err, CifPlayerError::InvalidCellDefinition));
    }

    #[test]
    fn test_symmetry_expansion() {
        let mut s = Structure::new(cubic(4.0), vec![Atom::new("Na", [0.1, 0.2, 0.3])], false);
        s.space_group_name = Some("P-1".to_string());
        s.space_group_number = Some("2".to_string());

        let ops = vec!["x,y,z".to_string(), "-x,-y,-z".to_string()];
        let model = to_render_model(&s, &ops).unwrap();

        assert_eq!(model.atoms.len(), 2);
        let f = model.atoms[1].fract.unwrap();
        assert!((f[0] - 0.9).abs() < 1e-9);
        assert_eq!(model.space_group_number, Some(2));
        assert_eq!(
            model.cell_descr.unwrap().symlabel.as_deref(),
            Some("P-1 (2)")
        );
    }

    #[test]
    fn test_empty_structure_warns_only() {
        let s = Structure::new(cubic(4.0), Vec::new(), false);
        let model = to_render_model(&s, &[]).unwrap();
        assert!(model.atoms.is_empty());
    }
}
