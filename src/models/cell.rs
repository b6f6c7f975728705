//! # 晶胞几何
//!
//! 六个晶胞参数 (a, b, c, α, β, γ) 与 3×3 基矢矩阵之间的换算，
//! 以及分数坐标与笛卡尔坐标的互转。
//!
//! 约定：矩阵按行存放基矢 `[va, vb, vc]`，坐标为行向量，
//! 即 `cart = fract · M`。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `render/`, `symmetry/` 使用
//! - 无外部模块依赖

use crate::error::{CifPlayerError, Result};
use serde::{Deserialize, Serialize};

/// 3×3 矩阵，行向量为晶胞基矢
pub type Matrix3 = [[f64; 3]; 3];

/// 晶胞参数，长度单位 Å，角度单位：度
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CellParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl CellParams {
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        CellParams {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        }
    }

    /// 按 (a, b, c, alpha, beta, gamma) 顺序返回
    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.alpha, self.beta, self.gamma]
    }

    /// 六个参数是否都已给出（非零且有限）
    pub fn is_complete(&self) -> bool {
        self.to_array().iter().all(|v| *v != 0.0 && v.is_finite())
    }

    /// 通过参数名设置，名称不识别时返回 false
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match name {
            "a" => self.a = value,
            "b" => self.b = value,
            "c" => self.c = value,
            "alpha" => self.alpha = value,
            "beta" => self.beta = value,
            "gamma" => self.gamma = value,
            _ => return false,
        }
        true
    }
}

fn dot(u: [f64; 3], v: [f64; 3]) -> f64 {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

fn norm(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

fn scale(v: [f64; 3], k: f64) -> [f64; 3] {
    [v[0] * k, v[1] * k, v[2] * k]
}

fn unit(v: [f64; 3]) -> [f64; 3] {
    scale(v, 1.0 / norm(v))
}

fn cross(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn mat_mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// 晶胞参数转 3×3 矩阵
///
/// 参考法向 (0,0,1) 与参考方向 (1,0,0) 目前是写死的，
/// 只支持这一种标准取向。
pub fn cell_to_matrix(cell: &CellParams) -> Result<Matrix3> {
    if !cell.is_complete() {
        return Err(CifPlayerError::InvalidCellDefinition);
    }

    let alpha_rad = cell.alpha.to_radians();
    let beta_rad = cell.beta.to_radians();
    let gamma_rad = cell.gamma.to_radians();

    let ab_norm = [0.0, 0.0, 1.0];
    let a_dir = [1.0, 0.0, 0.0];
    let z = unit(ab_norm);
    let x = unit({
        let proj = scale(z, dot(a_dir, z));
        [a_dir[0] - proj[0], a_dir[1] - proj[1], a_dir[2] - proj[2]]
    });
    let y = cross(z, x);

    let va = scale([1.0, 0.0, 0.0], cell.a);
    let vb = scale([gamma_rad.cos(), gamma_rad.sin(), 0.0], cell.b);
    let cx = beta_rad.cos();
    let cy = (alpha_rad.cos() - beta_rad.cos() * gamma_rad.cos()) / gamma_rad.sin();
    let cz = (1.0 - cx * cx - cy * cy).sqrt();
    let vc = scale([cx, cy, cz], cell.c);

    Ok(mat_mul(&[va, vb, vc], &[x, y, z]))
}

/// 3×3 矩阵转晶胞参数
///
/// 行向量长度给出 a, b, c；角度按循环顺序取相邻两行的夹角，
/// 长度乘积小于 1e-16 时取 90°。
pub fn cell_params_from_matrix(matrix: &Matrix3) -> CellParams {
    let norms: Vec<f64> = matrix.iter().map(|v| norm(*v)).collect();
    let mut angles = [90.0; 3];

    for (i, angle) in angles.iter_mut().enumerate() {
        let j = (i + 2) % 3;
        let k = (i + 1) % 3;
        let lenmult = norms[j] * norms[k];
        if lenmult > 1e-16 {
            let cos = (dot(matrix[j], matrix[k]) / lenmult).clamp(-1.0, 1.0);
            *angle = cos.acos().to_degrees();
        }
    }

    CellParams::new(norms[0], norms[1], norms[2], angles[0], angles[1], angles[2])
}

/// 分数坐标归一化到 [0, 1)
pub fn fract_cord_norm(cord: f64) -> f64 {
    let mut res = cord % 1.0;
    if res < 0.0 {
        res += 1.0;
    }
    // -1e-17 + 1.0 会舍入成 1.0
    if res >= 1.0 {
        0.0
    } else {
        res
    }
}

/// 分数坐标转笛卡尔坐标：`fract · M`
pub fn fract_to_cart(fract: [f64; 3], m: &Matrix3) -> [f64; 3] {
    [
        fract[0] * m[0][0] + fract[1] * m[1][0] + fract[2] * m[2][0],
        fract[0] * m[0][1] + fract[1] * m[1][1] + fract[2] * m[2][1],
        fract[0] * m[0][2] + fract[1] * m[1][2] + fract[2] * m[2][2],
    ]
}

/// 矩阵求逆，奇异矩阵返回 None
pub fn invert(m: &Matrix3) -> Option<Matrix3> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

    if det.abs() < 1e-10 || !det.is_finite() {
        return None;
    }

    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
        ],
    ])
}

/// 笛卡尔坐标转分数坐标：解 `cart = fract · M`
pub fn cart_to_fract(cart: [f64; 3], m: &Matrix3) -> Option<[f64; 3]> {
    invert(m).map(|inv| fract_to_cart(cart, &inv))
}

/// 矩阵转置
pub fn transpose(m: &Matrix3) -> Matrix3 {
    let mut t = [[0.0; 3]; 3];
    for (i, row) in m.iter().enumerate() {
        for (j, v) in row.iter().enumerate() {
            t[j][i] = *v;
        }
    }
    t
}
