//! # info 命令实现
//!
//! 打印结构文件的格式、晶胞、空间群、叠加属性和原子表。
//!
//! ## 依赖关系
//! - 使用 `cli/info.rs` 定义的参数
//! - 使用 `utils/output.rs`
//! - 使用 cifplayer 库的 `StructureSource`, `SpaceGroup`

use super::load_source;
use crate::cli::info::InfoArgs;
use crate::utils::output;
use cifplayer::error::Result;
use cifplayer::models::Structure;
use cifplayer::SpaceGroup;

use tabled::{Table, Tabled};

/// 原子表行
#[derive(Debug, Clone, Tabled)]
struct AtomRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "x")]
    x: String,
    #[tabled(rename = "y")]
    y: String,
    #[tabled(rename = "z")]
    z: String,
}

fn atom_rows(structure: &Structure, limit: usize) -> Vec<AtomRow> {
    structure
        .atoms
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, atom)| AtomRow {
            index: i + 1,
            symbol: atom.symbol.clone(),
            label: atom.label.clone().unwrap_or_default(),
            x: format!("{:.4}", atom.x),
            y: format!("{:.4}", atom.y),
            z: format!("{:.4}", atom.z),
        })
        .collect()
}

/// 执行 info 命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let source = load_source(&args.file)?;
    let structure = source.structure()?;

    output::print_header(&format!("{}", args.file.display()));

    output::print_field("Format", &source.format().to_string());
    if !structure.info.is_empty() {
        output::print_field("Info", &structure.info);
    }
    output::print_field("Formula", &structure.formula());
    output::print_field(
        "Coordinates",
        if structure.cartesian { "cartesian" } else { "fractional" },
    );

    match structure.cell_params() {
        Some(p) => output::print_field(
            "Cell",
            &format!(
                "a={:.4} b={:.4} c={:.4}  α={:.2} β={:.2} γ={:.2}",
                p.a, p.b, p.c, p.alpha, p.beta, p.gamma
            ),
        ),
        None => output::print_field("Cell", "none"),
    }

    let group = SpaceGroup::for_structure(structure);
    let label = structure
        .symmetry_label()
        .unwrap_or_else(|| "unknown".to_string());
    output::print_field(
        "Space group",
        &format!("{} ({} operations)", label, group.symmetry_list().len()),
    );

    let mut provenance = Vec::new();
    if structure.source_is_demo {
        provenance.push("demo");
    }
    if structure.source_is_curated {
        provenance.push("curated");
    }
    if !provenance.is_empty() {
        output::print_field("Source", &provenance.join(", "));
    }

    // 渲染模型给出去重后的位点数
    let model = source.render_model(&[])?;
    output::print_field(
        "Atoms",
        &format!("{} ({} unique sites)", structure.atoms.len(), model.atoms.len()),
    );
    if !model.overlayed.is_empty() {
        let titles: Vec<&str> = model.overlayed.iter().map(|(_, t)| t.as_str()).collect();
        output::print_field("Overlays", &titles.join(", "));
    }

    output::print_separator();
    println!("{}", Table::new(atom_rows(structure, args.atoms)));

    if structure.atoms.len() > args.atoms {
        output::print_info(&format!(
            "{} more atom(s) not shown (use --atoms)",
            structure.atoms.len() - args.atoms
        ));
    }

    Ok(())
}
