//! # 空间群操作表
//!
//! 230 个空间群的对称操作，由 Hall 符号生成。
//! 设定：单斜取 b 轴唯一（cell choice 1），有两种原点的取原点 2
//! （对称中心在原点），三方 R 取六方轴。
//!
//! Hall 符号给出格子类型和至多四个生成元，例如 `-F 4vw 2vw 3`：
//! 前导 `-` 表示含对称中心，每个矩阵符号由阶数、轴、螺旋分量和平移字母组成，
//! 末尾括号内为原点平移（1/12 为单位）。生成元闭包后再叠加格心平移，
//! 最后格式化为 `"-x+1/2,y,z"` 形式的表达式。
//!
//! ## 依赖关系
//! - 被 `symmetry/spacegroup.rs` 使用
//! - 表项为 `symmetry/spacegroup.rs` 的 `SpaceGroup`

use super::spacegroup::SpaceGroup;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// (编号, Hermann–Mauguin 短符号, Hall 符号)
const GROUPS: &[(u32, &str, &str)] = &[
    (1, "P1", "P 1"),
    (2, "P-1", "-P 1"),
    (3, "P2", "P 2y"),
    (4, "P2_1", "P 2yb"),
    (5, "C2", "C 2y"),
    (6, "Pm", "P -2y"),
    (7, "Pc", "P -2yc"),
    (8, "Cm", "C -2y"),
    (9, "Cc", "C -2yc"),
    (10, "P2/m", "-P 2y"),
    (11, "P2_1/m", "-P 2yb"),
    (12, "C2/m", "-C 2y"),
    (13, "P2/c", "-P 2yc"),
    (14, "P2_1/c", "-P 2ybc"),
    (15, "C2/c", "-C 2yc"),
    (16, "P222", "P 2 2"),
    (17, "P222_1", "P 2c 2"),
    (18, "P2_12_12", "P 2 2ab"),
    (19, "P2_12_12_1", "P 2ac 2ab"),
    (20, "C222_1", "C 2c 2"),
    (21, "C222", "C 2 2"),
    (22, "F222", "F 2 2"),
    (23, "I222", "I 2 2"),
    (24, "I2_12_12_1", "I 2b 2c"),
    (25, "Pmm2", "P 2 -2"),
    (26, "Pmc2_1", "P 2c -2"),
    (27, "Pcc2", "P 2 -2c"),
    (28, "Pma2", "P 2 -2a"),
    (29, "Pca2_1", "P 2c -2ac"),
    (30, "Pnc2", "P 2 -2bc"),
    (31, "Pmn2_1", "P 2ac -2"),
    (32, "Pba2", "P 2 -2ab"),
    (33, "Pna2_1", "P 2c -2n"),
    (34, "Pnn2", "P 2 -2n"),
    (35, "Cmm2", "C 2 -2"),
    (36, "Cmc2_1", "C 2c -2"),
    (37, "Ccc2", "C 2 -2c"),
    (38, "Amm2", "A 2 -2"),
    (39, "Aem2", "A 2 -2b"),
    (40, "Ama2", "A 2 -2a"),
    (41, "Aea2", "A 2 -2ab"),
    (42, "Fmm2", "F 2 -2"),
    (43, "Fdd2", "F 2 -2d"),
    (44, "Imm2", "I 2 -2"),
    (45, "Iba2", "I 2 -2c"),
    (46, "Ima2", "I 2 -2a"),
    (47, "Pmmm", "-P 2 2"),
    (48, "Pnnn", "-P 2ab 2bc"),
    (49, "Pccm", "-P 2 2c"),
    (50, "Pban", "-P 2ab 2b"),
    (51, "Pmma", "-P 2a 2a"),
    (52, "Pnna", "-P 2a 2bc"),
    (53, "Pmna", "-P 2ac 2"),
    (54, "Pcca", "-P 2a 2ac"),
    (55, "Pbam", "-P 2 2ab"),
    (56, "Pccn", "-P 2ab 2ac"),
    (57, "Pbcm", "-P 2c 2b"),
    (58, "Pnnm", "-P 2 2n"),
    (59, "Pmmn", "-P 2ab 2a"),
    (60, "Pbcn", "-P 2n 2ab"),
    (61, "Pbca", "-P 2ac 2ab"),
    (62, "Pnma", "-P 2ac 2n"),
    (63, "Cmcm", "-C 2c 2"),
    (64, "Cmce", "-C 2bc 2"),
    (65, "Cmmm", "-C 2 2"),
    (66, "Cccm", "-C 2 2c"),
    (67, "Cmme", "-C 2b 2"),
    (68, "Ccce", "-C 2b 2bc"),
    (69, "Fmmm", "-F 2 2"),
    (70, "Fddd", "-F 2uv 2vw"),
    (71, "Immm", "-I 2 2"),
    (72, "Ibam", "-I 2 2c"),
    (73, "Ibca", "-I 2b 2c"),
    (74, "Imma", "-I 2b 2"),
    (75, "P4", "P 4"),
    (76, "P4_1", "P 4w"),
    (77, "P4_2", "P 4c"),
    (78, "P4_3", "P 4cw"),
    (79, "I4", "I 4"),
    (80, "I4_1", "I 4bw"),
    (81, "P-4", "P -4"),
    (82, "I-4", "I -4"),
    (83, "P4/m", "-P 4"),
    (84, "P4_2/m", "-P 4c"),
    (85, "P4/n", "-P 4a"),
    (86, "P4_2/n", "-P 4bc"),
    (87, "I4/m", "-I 4"),
    (88, "I4_1/a", "-I 4ad"),
    (89, "P422", "P 4 2"),
    (90, "P42_12", "P 4ab 2ab"),
    (91, "P4_122", "P 4w 2c"),
    (92, "P4_12_12", "P 4abw 2nw"),
    (93, "P4_222", "P 4c 2"),
    (94, "P4_22_12", "P 4n 2n"),
    (95, "P4_322", "P 4cw 2c"),
    (96, "P4_32_12", "P 4nw 2abw"),
    (97, "I422", "I 4 2"),
    (98, "I4_122", "I 4bw 2bw"),
    (99, "P4mm", "P 4 -2"),
    (100, "P4bm", "P 4 -2ab"),
    (101, "P4_2cm", "P 4c -2c"),
    (102, "P4_2nm", "P 4n -2n"),
    (103, "P4cc", "P 4 -2c"),
    (104, "P4nc", "P 4 -2n"),
    (105, "P4_2mc", "P 4c -2"),
    (106, "P4_2bc", "P 4c -2ab"),
    (107, "I4mm", "I 4 -2"),
    (108, "I4cm", "I 4 -2c"),
    (109, "I4_1md", "I 4bw -2"),
    (110, "I4_1cd", "I 4bw -2c"),
    (111, "P-42m", "P -4 2"),
    (112, "P-42c", "P -4 2c"),
    (113, "P-42_1m", "P -4 2ab"),
    (114, "P-42_1c", "P -4 2n"),
    (115, "P-4m2", "P -4 -2"),
    (116, "P-4c2", "P -4 -2c"),
    (117, "P-4b2", "P -4 -2ab"),
    (118, "P-4n2", "P -4 -2n"),
    (119, "I-4m2", "I -4 -2"),
    (120, "I-4c2", "I -4 -2c"),
    (121, "I-42m", "I -4 2"),
    (122, "I-42d", "I -4 2bw"),
    (123, "P4/mmm", "-P 4 2"),
    (124, "P4/mcc", "-P 4 2c"),
    (125, "P4/nbm", "-P 4a 2b"),
    (126, "P4/nnc", "-P 4a 2bc"),
    (127, "P4/mbm", "-P 4 2ab"),
    (128, "P4/mnc", "-P 4 2n"),
    (129, "P4/nmm", "-P 4a 2a"),
    (130, "P4/ncc", "-P 4a 2ac"),
    (131, "P4_2/mmc", "-P 4c 2"),
    (132, "P4_2/mcm", "-P 4c 2c"),
    (133, "P4_2/nbc", "-P 4ac 2b"),
    (134, "P4_2/nnm", "-P 4ac 2bc"),
    (135, "P4_2/mbc", "-P 4c 2ab"),
    (136, "P4_2/mnm", "-P 4n 2n"),
    (137, "P4_2/nmc", "-P 4ac 2a"),
    (138, "P4_2/ncm", "-P 4ac 2ac"),
    (139, "I4/mmm", "-I 4 2"),
    (140, "I4/mcm", "-I 4 2c"),
    (141, "I4_1/amd", "-I 4bd 2"),
    (142, "I4_1/acd", "-I 4bd 2c"),
    (143, "P3", "P 3"),
    (144, "P3_1", "P 31"),
    (145, "P3_2", "P 32"),
    (146, "R3", "R 3"),
    (147, "P-3", "-P 3"),
    (148, "R-3", "-R 3"),
    (149, "P312", "P 3 2"),
    (150, "P321", "P 3 2\""),
    (151, "P3_112", "P 31 2c (0 0 1)"),
    (152, "P3_121", "P 31 2\""),
    (153, "P3_212", "P 32 2c (0 0 -1)"),
    (154, "P3_221", "P 32 2\""),
    (155, "R32", "R 3 2\""),
    (156, "P3m1", "P 3 -2\""),
    (157, "P31m", "P 3 -2"),
    (158, "P3c1", "P 3 -2\"c"),
    (159, "P31c", "P 3 -2c"),
    (160, "R3m", "R 3 -2\""),
    (161, "R3c", "R 3 -2\"c"),
    (162, "P-31m", "-P 3 2"),
    (163, "P-31c", "-P 3 2c"),
    (164, "P-3m1", "-P 3 2\""),
    (165, "P-3c1", "-P 3 2\"c"),
    (166, "R-3m", "-R 3 2\""),
    (167, "R-3c", "-R 3 2\"c"),
    (168, "P6", "P 6"),
    (169, "P6_1", "P 61"),
    (170, "P6_5", "P 65"),
    (171, "P6_2", "P 62"),
    (172, "P6_4", "P 64"),
    (173, "P6_3", "P 6c"),
    (174, "P-6", "P -6"),
    (175, "P6/m", "-P 6"),
    (176, "P6_3/m", "-P 6c"),
    (177, "P622", "P 6 2"),
    (178, "P6_122", "P 61 2 (0 0 -1)"),
    (179, "P6_522", "P 65 2 (0 0 1)"),
    (180, "P6_222", "P 62 2c (0 0 1)"),
    (181, "P6_422", "P 64 2c (0 0 -1)"),
    (182, "P6_322", "P 6c 2c"),
    (183, "P6mm", "P 6 -2"),
    (184, "P6cc", "P 6 -2c"),
    (185, "P6_3cm", "P 6c -2"),
    (186, "P6_3mc", "P 6c -2c"),
    (187, "P-6m2", "P -6 2"),
    (188, "P-6c2", "P -6c 2"),
    (189, "P-62m", "P -6 -2"),
    (190, "P-62c", "P -6c -2c"),
    (191, "P6/mmm", "-P 6 2"),
    (192, "P6/mcc", "-P 6 2c"),
    (193, "P6_3/mcm", "-P 6c 2"),
    (194, "P6_3/mmc", "-P 6c 2c"),
    (195, "P23", "P 2 2 3"),
    (196, "F23", "F 2 2 3"),
    (197, "I23", "I 2 2 3"),
    (198, "P2_13", "P 2ac 2ab 3"),
    (199, "I2_13", "I 2b 2c 3"),
    (200, "Pm-3", "-P 2 2 3"),
    (201, "Pn-3", "-P 2ab 2bc 3"),
    (202, "Fm-3", "-F 2 2 3"),
    (203, "Fd-3", "-F 2uv 2vw 3"),
    (204, "Im-3", "-I 2 2 3"),
    (205, "Pa-3", "-P 2ac 2ab 3"),
    (206, "Ia-3", "-I 2b 2c 3"),
    (207, "P432", "P 4 2 3"),
    (208, "P4_232", "P 4n 2 3"),
    (209, "F432", "F 4 2 3"),
    (210, "F4_132", "F 4d 2 3"),
    (211, "I432", "I 4 2 3"),
    (212, "P4_332", "P 4acd 2ab 3"),
    (213, "P4_132", "P 4bd 2ab 3"),
    (214, "I4_132", "I 4bd 2c 3"),
    (215, "P-43m", "P -4 2 3"),
    (216, "F-43m", "F -4 2 3"),
    (217, "I-43m", "I -4 2 3"),
    (218, "P-43n", "P -4n 2 3"),
    (219, "F-43c", "F -4a 2 3"),
    (220, "I-43d", "I -4bd 2c 3"),
    (221, "Pm-3m", "-P 4 2 3"),
    (222, "Pn-3n", "-P 4a 2bc 3"),
    (223, "Pm-3n", "-P 4n 2 3"),
    (224, "Pn-3m", "-P 4bc 2bc 3"),
    (225, "Fm-3m", "-F 4 2 3"),
    (226, "Fm-3c", "-F 4a 2 3"),
    (227, "Fd-3m", "-F 4vw 2vw 3"),
    (228, "Fd-3c", "-F 4cvw 2vw 3"),
    (229, "Im-3m", "-I 4 2 3"),
    (230, "Ia-3d", "-I 4bd 2c 3"),
];

/// 旧的 Hermann–Mauguin 写法（e 滑移面之前的名称）
const ALIASES: &[(&str, u32)] = &[
    ("Abm2", 39),
    ("Aba2", 41),
    ("Cmca", 64),
    ("Cmma", 67),
    ("Ccca", 68),
];

/// 格子类型
#[derive(Debug, Clone, Copy, PartialEq)]
enum Centering {
    P,
    A,
    B,
    C,
    I,
    F,
    /// 六方轴下的菱方格心
    R,
}

impl Centering {
    fn from_symbol(symbol: &str) -> Option<Centering> {
        match symbol {
            "P" => Some(Centering::P),
            "A" => Some(Centering::A),
            "B" => Some(Centering::B),
            "C" => Some(Centering::C),
            "I" => Some(Centering::I),
            "F" => Some(Centering::F),
            "R" => Some(Centering::R),
            _ => None,
        }
    }

    /// 格心平移（1/12 为单位）
    fn translations(self) -> &'static [[i32; 3]] {
        match self {
            Centering::P => &[[0, 0, 0]],
            Centering::A => &[[0, 0, 0], [0, 6, 6]],
            Centering::B => &[[0, 0, 0], [6, 0, 6]],
            Centering::C => &[[0, 0, 0], [6, 6, 0]],
            Centering::I => &[[0, 0, 0], [6, 6, 6]],
            Centering::F => &[[0, 0, 0], [0, 6, 6], [6, 0, 6], [6, 6, 0]],
            Centering::R => &[[0, 0, 0], [8, 4, 4], [4, 8, 8]],
        }
    }
}

type Rotation = [[i32; 3]; 3];

const UNIT: Rotation = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];

/// 整数仿射变换：`rot` 的第 i 行给出新坐标 i 的 x/y/z 系数，`shift` 以 1/12 为单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Affine {
    rot: Rotation,
    shift: [i32; 3],
}

impl Affine {
    const IDENTITY: Affine = Affine { rot: UNIT, shift: [0; 3] };

    fn new(rot: Rotation, shift: [i32; 3]) -> Affine {
        Affine {
            rot,
            shift: shift.map(|s| s.rem_euclid(12)),
        }
    }

    /// 先施加 `other`，再施加 `self`
    fn compose(&self, other: &Affine) -> Affine {
        let mut rot = [[0; 3]; 3];
        let mut shift = self.shift;
        for i in 0..3 {
            for j in 0..3 {
                rot[i][j] = (0..3).map(|k| self.rot[i][k] * other.rot[k][j]).sum();
                shift[i] += self.rot[i][j] * other.shift[j];
            }
        }
        Affine::new(rot, shift)
    }

    fn translated(self, t: [i32; 3]) -> Affine {
        Affine::new(self.rot, [0, 1, 2].map(|i| self.shift[i] + t[i]))
    }

    /// 原点平移 `v`：t' = t + v - R·v
    fn shifted_origin(self, v: [i32; 3]) -> Affine {
        let shift = [0, 1, 2].map(|i| {
            let rv: i32 = (0..3).map(|k| self.rot[i][k] * v[k]).sum();
            self.shift[i] + v[i] - rv
        });
        Affine::new(self.rot, shift)
    }

    fn inverted(self) -> Affine {
        Affine::new(self.rot.map(|row| row.map(|c| -c)), self.shift)
    }

    pub(crate) fn to_expression(self) -> String {
        (0..3)
            .map(|i| format_component(self.rot[i], self.shift[i]))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn format_component(row: [i32; 3], shift: i32) -> String {
    let mut out = String::new();
    for (coef, axis) in row.iter().zip(["x", "y", "z"]) {
        match *coef {
            0 => {}
            c if c > 0 => {
                if !out.is_empty() {
                    out.push('+');
                }
                if c != 1 {
                    out.push_str(&c.to_string());
                }
                out.push_str(axis);
            }
            c => {
                out.push('-');
                if c != -1 {
                    out.push_str(&(-c).to_string());
                }
                out.push_str(axis);
            }
        }
    }
    if shift != 0 {
        let g = gcd(shift, 12);
        if !out.is_empty() {
            out.push('+');
        }
        out.push_str(&format!("{}/{}", shift / g, 12 / g));
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

fn gcd(a: i32, b: i32) -> i32 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

/// 真转动矩阵；`'`/`"` 为相对于前一个主轴的面对角二次轴，`*` 为体对角三次轴
fn rotation(order: char, axis: char, principal: char) -> Option<Rotation> {
    let m = match (order, axis, principal) {
        ('1', _, _) => UNIT,
        ('2', 'x', _) => [[1, 0, 0], [0, -1, 0], [0, 0, -1]],
        ('2', 'y', _) => [[-1, 0, 0], [0, 1, 0], [0, 0, -1]],
        ('2', 'z', _) => [[-1, 0, 0], [0, -1, 0], [0, 0, 1]],
        ('3', 'x', _) => [[1, 0, 0], [0, 0, -1], [0, 1, -1]],
        ('3', 'y', _) => [[-1, 0, 1], [0, 1, 0], [-1, 0, 0]],
        ('3', 'z', _) => [[0, -1, 0], [1, -1, 0], [0, 0, 1]],
        ('4', 'x', _) => [[1, 0, 0], [0, 0, -1], [0, 1, 0]],
        ('4', 'y', _) => [[0, 0, 1], [0, 1, 0], [-1, 0, 0]],
        ('4', 'z', _) => [[0, -1, 0], [1, 0, 0], [0, 0, 1]],
        ('6', 'x', _) => [[1, 0, 0], [0, 1, -1], [0, 1, 0]],
        ('6', 'y', _) => [[0, 0, 1], [0, 1, 0], [-1, 0, 1]],
        ('6', 'z', _) => [[1, -1, 0], [1, 0, 0], [0, 0, 1]],
        ('2', '\'', 'x') => [[-1, 0, 0], [0, 0, -1], [0, -1, 0]],
        ('2', '"', 'x') => [[-1, 0, 0], [0, 0, 1], [0, 1, 0]],
        ('2', '\'', 'y') => [[0, 0, -1], [0, -1, 0], [-1, 0, 0]],
        ('2', '"', 'y') => [[0, 0, 1], [0, -1, 0], [1, 0, 0]],
        ('2', '\'', 'z') => [[0, -1, 0], [-1, 0, 0], [0, 0, -1]],
        ('2', '"', 'z') => [[0, 1, 0], [1, 0, 0], [0, 0, -1]],
        ('3', '*', _) => [[0, 0, 1], [1, 0, 0], [0, 1, 0]],
        _ => return None,
    };
    Some(m)
}

/// 平移字母（1/12 为单位）
fn translation_symbol(c: char) -> Option<[i32; 3]> {
    match c {
        'a' => Some([6, 0, 0]),
        'b' => Some([0, 6, 0]),
        'c' => Some([0, 0, 6]),
        'n' => Some([6, 6, 6]),
        'u' => Some([3, 0, 0]),
        'v' => Some([0, 3, 0]),
        'w' => Some([0, 0, 3]),
        'd' => Some([3, 3, 3]),
        _ => None,
    }
}

/// 解析过程中需要记住的前一个矩阵符号
struct Previous {
    order: char,
    principal: char,
}

/// 解析一个矩阵符号，如 `-4bw`、`2"c`、`31`
fn parse_matrix(token: &str, index: usize, prev: &mut Previous) -> Option<Affine> {
    let mut chars = token.chars().peekable();
    let improper = chars.next_if_eq(&'-').is_some();
    let order = chars.next().filter(|c| "12346".contains(*c))?;
    let explicit_axis = chars.next_if(|c| "xyz'\"*".contains(*c));
    let screw = chars.next_if(|c| c.is_ascii_digit());

    let axis = match (explicit_axis, index, order) {
        (Some(axis), _, _) => axis,
        (None, _, '1') | (None, 0, _) => 'z',
        (None, 1, '2') if matches!(prev.order, '2' | '4') => 'x',
        (None, 1, '2') => '\'',
        (None, 2, '3') => '*',
        _ => return None,
    };

    let mut shift = [0; 3];
    for c in chars {
        let t = translation_symbol(c)?;
        for (s, dt) in shift.iter_mut().zip(t) {
            *s += dt;
        }
    }

    if let Some(digit) = screw {
        let k = digit.to_digit(10)? as i32;
        let n = order.to_digit(10)? as i32;
        let slot = "xyz".find(axis)?;
        if k >= n {
            return None;
        }
        shift[slot] += 12 * k / n;
    }

    let rot = rotation(order, axis, prev.principal)?;
    prev.order = order;
    if "xyz".contains(axis) {
        prev.principal = axis;
    }

    let op = Affine::new(rot, shift);
    Some(if improper { op.inverted() } else { op })
}

/// Hall 符号解析为格子类型和生成元
fn parse_hall(symbol: &str) -> Option<(Centering, Vec<Affine>)> {
    let (body, origin) = match symbol.split_once('(') {
        Some((body, rest)) => {
            let values: Vec<i32> = rest
                .trim_end_matches(')')
                .split_whitespace()
                .map(|v| v.parse().ok())
                .collect::<Option<_>>()?;
            let origin: [i32; 3] = values.try_into().ok()?;
            (body, origin)
        }
        None => (symbol, [0; 3]),
    };

    let mut tokens = body.split_whitespace();
    let lattice = tokens.next()?;
    let (centric, lattice) = match lattice.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, lattice),
    };
    let centering = Centering::from_symbol(lattice)?;

    let mut generators = Vec::new();
    if centric {
        generators.push(Affine::IDENTITY.inverted());
    }
    let mut prev = Previous { order: '1', principal: 'z' };
    for (index, token) in tokens.enumerate() {
        generators.push(parse_matrix(token, index, &mut prev)?);
    }

    let generators = generators
        .into_iter()
        .map(|g| g.shifted_origin(origin))
        .collect();
    Some((centering, generators))
}

/// 生成元闭包（平移模 1），恒等操作在首位
fn close(generators: &[Affine]) -> Vec<Affine> {
    let mut ops = vec![Affine::IDENTITY];
    let mut seen: HashSet<Affine> = ops.iter().copied().collect();
    let mut i = 0;
    while i < ops.len() {
        let current = ops[i];
        for g in generators {
            let next = current.compose(g);
            if seen.insert(next) {
                ops.push(next);
            }
        }
        i += 1;
    }
    ops
}

/// Hall 符号展开为完整的操作表达式列表
fn operations_from_hall(symbol: &str) -> Option<Vec<String>> {
    let (centering, generators) = parse_hall(symbol)?;
    let base = close(&generators);

    let mut seen = HashSet::new();
    let operations = centering
        .translations()
        .iter()
        .flat_map(|t| base.iter().map(move |op| op.translated(*t)))
        .filter(|op| seen.insert(*op))
        .map(Affine::to_expression)
        .collect();
    Some(operations)
}

pub struct SpaceGroupTable {
    groups: Vec<SpaceGroup>,
    by_number: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl SpaceGroupTable {
    pub fn get_by_number(&self, number: u32) -> Option<&SpaceGroup> {
        self.by_number.get(&number).map(|i| &self.groups[*i])
    }

    pub fn get_by_name(&self, name: &str) -> Option<&SpaceGroup> {
        self.by_name.get(&normalize_name(name)).map(|i| &self.groups[*i])
    }
}

/// 名称归一化：去掉空白与下划线，小写
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

pub static TABLE: LazyLock<SpaceGroupTable> = LazyLock::new(|| {
    let groups: Vec<SpaceGroup> = GROUPS
        .iter()
        .filter_map(|(number, name, hall)| match operations_from_hall(hall) {
            Some(ops) => Some(SpaceGroup::new(name, *number, ops)),
            None => {
                log::error!("Invalid Hall symbol '{}' for space group {}", hall, number);
                None
            }
        })
        .collect();

    let by_number: HashMap<u32, usize> =
        groups.iter().enumerate().map(|(i, g)| (g.number, i)).collect();
    let mut by_name: HashMap<String, usize> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| (normalize_name(&g.name), i))
        .collect();
    for (alias, number) in ALIASES {
        if let Some(i) = by_number.get(number) {
            by_name.insert(normalize_name(alias), *i);
        }
    }

    SpaceGroupTable {
        groups,
        by_number,
        by_name,
    }
});
