//! # render 命令实现
//!
//! 输出渲染模型 JSON，可选启用对称操作。
//!
//! ## 依赖关系
//! - 使用 `cli/render.rs` 定义的参数
//! - 使用 cifplayer 库的 `StructureSource`, `SpaceGroup`

use super::{load_source, write_output};
use crate::cli::render::RenderArgs;
use cifplayer::error::{CifPlayerError, Result};
use cifplayer::symmetry::spacegroup::evaluate;
use cifplayer::SpaceGroup;

/// 检查用户给出的对称操作
fn validate_ops(ops: &[String]) -> Result<Vec<String>> {
    ops.iter()
        .map(|op| {
            let op = op.trim();
            evaluate(op, [0.0; 3])
                .map(|_| op.to_string())
                .ok_or_else(|| {
                    CifPlayerError::InvalidArgument(format!("invalid symmetry operation '{}'", op))
                })
        })
        .collect()
}

/// 执行 render 命令
pub fn execute(args: RenderArgs) -> Result<()> {
    let source = load_source(&args.file)?;

    let ops = if args.all_symmetry {
        SpaceGroup::for_structure(source.structure()?)
            .symmetry_list()
            .to_vec()
    } else {
        validate_ops(&args.symmetry)?
    };
    log::info!("{} symmetry operation(s) enabled", ops.len());

    let model = source.render_model(&ops)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&*model)?
    } else {
        serde_json::to_string(&*model)?
    };

    write_output(args.output.as_deref(), &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ops() {
        let ops = vec![" x,y,z ".to_string(), "1/2+x,-y,z".to_string()];
        assert_eq!(validate_ops(&ops).unwrap(), ["x,y,z", "1/2+x,-y,z"]);

        let err = validate_ops(&["x,y".to_string()]).unwrap_err();
        assert!(matches!(err, CifPlayerError::InvalidArgument(_)));
    }
}
