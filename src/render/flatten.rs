//! # 扁平结构
//!
//! 供外部数值程序使用的简单表示：转置后的晶胞矩阵，
//! 原子坐标，以及从 1 开始的类型序号。
//!
//! 结构自带类型序号（POSCAR）时保持原子顺序并沿用这些序号，
//! 否则按元素首次出现顺序分组。
//!
//! ## 依赖关系
//! - 被 `source.rs`, `commands/flatten.rs` 使用
//! - 使用 `models/`

use crate::error::Result;
use crate::models::cell::{transpose, Matrix3};
use crate::models::Structure;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatStructure {
    /// 转置后的晶胞矩阵（列为基矢）
    pub cell: Matrix3,

    /// 原子坐标
    pub atoms: Vec<[f64; 3]>,

    /// 每个原子的类型序号，从 1 开始
    pub types: Vec<usize>,

    /// 类型序号对应的元素（`species[t - 1]`）
    pub species: Vec<String>,

    pub symlabel: Option<String>,
}

/// 结构转扁平表示；坐标保持原样（分数或笛卡尔）
pub fn flatten(structure: &Structure) -> Result<FlatStructure> {
    if structure.symmetry_ops.is_some() {
        log::warn!("Reading of symmetry operations is not implemented, expect errors");
    }

    let cell = transpose(&structure.require_cell_matrix()?);

    let (atoms, types, species) = match &structure.types {
        Some(types) if types.len() == structure.atoms.len() => keep_order(structure, types),
        _ => group_by_symbol(structure),
    };

    Ok(FlatStructure {
        cell,
        atoms,
        types,
        species,
        symlabel: structure.symmetry_label(),
    })
}

type Flattened = (Vec<[f64; 3]>, Vec<usize>, Vec<String>);

/// 沿用已有的类型序号，原子顺序不变
fn keep_order(structure: &Structure, types: &[usize]) -> Flattened {
    let mut species = vec![String::new(); types.iter().copied().max().unwrap_or(0)];
    for (atom, t) in structure.atoms.iter().zip(types) {
        if let Some(slot) = species.get_mut(t.wrapping_sub(1)) {
            if slot.is_empty() {
                *slot = atom.symbol.clone();
            }
        }
    }
    let atoms = structure.atoms.iter().map(|a| a.position()).collect();
    (atoms, types.to_vec(), species)
}

/// 按元素首次出现顺序分组
fn group_by_symbol(structure: &Structure) -> Flattened {
    let mut species: Vec<String> = Vec::new();
    let mut grouped: Vec<Vec<[f64; 3]>> = Vec::new();
    for atom in &structure.atoms {
        match species.iter().position(|s| *s == atom.symbol) {
            Some(k) => grouped[k].push(atom.position()),
            None => {
                species.push(atom.symbol.clone());
                grouped.push(vec![atom.position()]);
            }
        }
    }

    let mut atoms = Vec::with_capacity(structure.atoms.len());
    let mut types = Vec::with_capacity(structure.atoms.len());
    for (k, positions) in grouped.into_iter().enumerate() {
        types.extend(std::iter::repeat(k + 1).take(positions.len()));
        atoms.extend(positions);
    }
    (atoms, types, species)
}
