//! # 角度 → 动量转移 (q) 转换
//!
//! 根据电子运动学把散射角坐标轴换算为动量转移 q (Å⁻¹)，
//! 并修复无法精确表示 q = 0 或在原点附近非单调的坐标轴。
//!
//! ## 公式
//! ```text
//! k0 = sqrt(2·mc²·E0) / ħc
//! k1 = sqrt(2·mc²·(E0 − E_loss)) / ħc
//! q  = sqrt(k0² + k1² − 2·k0·k1·cos θ)
//! ```
//! 实现中使用等价形式 q² = (k0 − k1)² + 4·k0·k1·sin²(θ/2)，
//! 使 θ = 0、E_loss = 0 时严格得到 0。
//!
//! ## 坐标轴修复
//! 负角度给出 NaN。修复时丢弃非有限值，按升序排列剩余 q，
//! 并在前端补上等间距的负 q（个数 = 丢弃个数，间距 = 最小步长），
//! 使输出长度与列数一致且单调。
//!
//! ## 依赖关系
//! - 被 `commands/qconvert.rs`、`commands/pipeline.rs` 调用
//! - 使用 `models/grid.rs` 的 Grid

use crate::error::{QlossError, Result};
use crate::models::Grid;

/// 约化普朗克常数 (eV·s)
pub const HBAR_EV_S: f64 = 6.582119569e-16;
/// 光速 (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// 电子静能 mc² (eV)
pub const ELECTRON_REST_ENERGY_EV: f64 = 0.5109989461e6;

/// ħc (eV·Å)
pub fn hbar_c_ev_angstrom() -> f64 {
    HBAR_EV_S * SPEED_OF_LIGHT * 1e10
}

/// 动能为 `energy_ev` 的电子波矢 (Å⁻¹)
pub fn wavevector(energy_ev: f64) -> f64 {
    (2.0 * ELECTRON_REST_ENERGY_EV * energy_ev).sqrt() / hbar_c_ev_angstrom()
}

/// 散射角（弧度）→ 动量转移 q (Å⁻¹)
///
/// `E0 < 0`、`angle < 0` 或 `E_loss > E0` 时返回 NaN。
pub fn angle_to_q(angle_rad: f64, e0_ev: f64, e_loss_ev: f64) -> f64 {
    if e0_ev.is_nan() || e0_ev < 0.0 || angle_rad.is_nan() || angle_rad < 0.0 {
        return f64::NAN;
    }
    if !(e_loss_ev <= e0_ev) {
        return f64::NAN;
    }

    let k0 = wavevector(e0_ev);
    let k1 = wavevector(e0_ev - e_loss_ev);
    let half = (angle_rad / 2.0).sin();
    let q2 = (k0 - k1).powi(2) + 4.0 * k0 * k1 * half * half;

    q2.max(0.0).sqrt()
}

/// 坐标轴转换结果
#[derive(Debug, Clone, PartialEq)]
pub struct AxisConversionResult {
    pub q_values: Vec<f64>,
    /// 输入中是否至少存在一个有限正 q
    pub valid: bool,
}

/// 修复 q 坐标轴
pub fn repair_q_axis(raw: &[f64]) -> AxisConversionResult {
    let unchanged = || AxisConversionResult {
        q_values: raw.to_vec(),
        valid: false,
    };

    let mut finite: Vec<f64> = raw.iter().copied().filter(|q| q.is_finite()).collect();
    if finite.is_empty() || !finite.iter().any(|&q| q > 0.0) {
        return unchanged();
    }

    finite.sort_by(|a, b| a.total_cmp(b));

    let min_positive = finite
        .iter()
        .copied()
        .filter(|&q| q > 0.0)
        .fold(f64::INFINITY, f64::min);

    // 相邻差值中的最小正步长；全部重合时退回最小正 q
    let step = finite
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&d| d > 0.0)
        .fold(f64::INFINITY, f64::min);
    let step = if step.is_finite() { step } else { min_positive };

    let missing = raw.len() - finite.len();
    let top = if finite[0] > 0.0 {
        0.0
    } else {
        finite[0] - step
    };

    let mut q_values: Vec<f64> = (0..missing)
        .map(|k| top - (missing - 1 - k) as f64 * step)
        .collect();
    q_values.extend(finite);

    AxisConversionResult {
        q_values,
        valid: true,
    }
}

/// 单个谱图的 q 转换结果
#[derive(Debug, Clone)]
pub struct QConversion {
    pub grid: Grid,
    pub axis: AxisConversionResult,
    /// 使用的弹性峰能量 (eV)
    pub e0: f64,
}

/// 转换单个谱图；列标签为角度（度）
pub fn convert_grid(grid: &Grid, e0: Option<f64>) -> Result<QConversion> {
    let e0 = match e0 {
        Some(v) if v.is_finite() && v > 0.0 => v,
        other => {
            return Err(QlossError::InvalidElasticEnergy {
                title: grid.title().to_string(),
                value: other,
            })
        }
    };

    let raw: Vec<f64> = grid
        .col_labels()
        .iter()
        .map(|deg| angle_to_q(deg.to_radians(), e0, 0.0))
        .collect();
    let axis = repair_q_axis(&raw);
    let grid = grid.relabeled(grid.row_labels().to_vec(), axis.q_values.clone())?;

    Ok(QConversion { grid, axis, e0 })
}

/// 批量转换；每个谱图独立成功或失败，顺序与输入一致
pub fn convert(grids: &[Grid], e0_per_grid: &[Option<f64>]) -> Vec<Result<QConversion>> {
    grids
        .iter()
        .enumerate()
        .map(|(i, grid)| convert_grid(grid, e0_per_grid.get(i).copied().flatten()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_angle_gives_zero_q() {
        assert_eq!(angle_to_q(0.0, 100.0, 0.0), 0.0);
        assert_eq!(angle_to_q(0.0, 3.7, 0.0), 0.0);
    }

    #[test]
    fn test_domain_guards() {
        assert!(angle_to_q(0.1, -1.0, 0.0).is_nan());
        assert!(angle_to_q(-0.1, 100.0, 0.0).is_nan());
        assert!(angle_to_q(0.1, 10.0, 20.0).is_nan());
    }

    #[test]
    fn test_wavevector_magnitude() {
        // 100 eV 电子：k ≈ 5.123 Å⁻¹
        assert_relative_eq!(wavevector(100.0), 5.1232, max_relative = 1e-3);
    }

    #[test]
    fn test_elastic_q_matches_geometry() {
        // 弹性散射：q = 2k·sin(θ/2)
        let theta = 30.0_f64.to_radians();
        let k = wavevector(50.0);
        assert_relative_eq!(
            angle_to_q(theta, 50.0, 0.0),
            2.0 * k * (theta / 2.0).sin(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_cosine_law_agreement() {
        let (theta, e0, loss) = (0.7_f64, 80.0, 12.0);
        let k0 = wavevector(e0);
        let k1 = wavevector(e0 - loss);
        let expected = (k0 * k0 + k1 * k1 - 2.0 * k0 * k1 * theta.cos()).sqrt();
        assert_relative_eq!(angle_to_q(theta, e0, loss), expected, max_relative = 1e-10);
    }

    #[test]
    fn test_repair_no_positive_is_unchanged() {
        let raw = vec![f64::NAN, 0.0, f64::NAN];
        let result = repair_q_axis(&raw);
        assert!(!result.valid);
        assert_eq!(result.q_values.len(), 3);
        assert!(result.q_values[0].is_nan());
        assert_eq!(result.q_values[1], 0.0);

        let all_nan = repair_q_axis(&[f64::NAN, f64::NAN]);
        assert!(!all_nan.valid);
    }

    #[test]
    fn test_repair_prepends_negative_run() {
        let raw = vec![f64::NAN, f64::NAN, f64::NAN, 0.1, 0.2, 0.35];
        let result = repair_q_axis(&raw);
        assert!(result.valid);
        assert_eq!(result.q_values.len(), raw.len());
        let step = 0.1;
        assert_relative_eq!(result.q_values[0], -2.0 * step, epsilon = 1e-12);
        assert_relative_eq!(result.q_values[1], -step, epsilon = 1e-12);
        assert_relative_eq!(result.q_values[2], 0.0);
        assert_eq!(&result.q_values[3..], &[0.1, 0.2, 0.35]);
        assert!(result.q_values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_repair_with_existing_zero() {
        let raw = vec![f64::NAN, f64::NAN, 0.0, 0.05, 0.1];
        let result = repair_q_axis(&raw);
        assert!(result.valid);
        assert_relative_eq!(result.q_values[0], -0.1, epsilon = 1e-12);
        assert_relative_eq!(result.q_values[1], -0.05, epsilon = 1e-12);
        assert_eq!(result.q_values[2], 0.0);
        assert!(result.q_values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_convert_symmetric_angles() {
        let angles: Vec<f64> = (-5..=5).map(|a| a as f64).collect();
        let grid = Grid::new(
            "sym",
            vec![0.0, 1.0],
            angles.clone(),
            (0..22).map(|v| v as f64).collect(),
        )
        .unwrap();

        let conv = convert_grid(&grid, Some(20.0)).unwrap();
        assert!(conv.axis.valid);
        let q = conv.grid.col_labels();
        assert_eq!(q.len(), angles.len());
        assert_eq!(q[5], 0.0);
        assert!(q[..5].iter().all(|&v| v < 0.0));
        assert!(q.windows(2).all(|w| w[0] < w[1]));
        // 强度与行标签保持不变
        assert_eq!(conv.grid.values(), grid.values());
        assert_eq!(conv.grid.row_labels(), grid.row_labels());
    }

    #[test]
    fn test_convert_negative_angles_is_invalid() {
        let grid = Grid::new(
            "neg",
            vec![0.0, 1.0],
            vec![-3.0, -2.0, -1.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();

        let conv = convert_grid(&grid, Some(20.0)).unwrap();
        assert!(!conv.axis.valid);
        assert_eq!(conv.axis.q_values.len(), 3);
        assert!(conv.grid.col_labels().iter().all(|q| q.is_nan()));
        assert_eq!(conv.grid.values(), grid.values());
    }

    #[test]
    fn test_convert_rejects_bad_e0_per_grid() {
        let grid = Grid::new("g", vec![0.0], vec![1.0, 2.0], vec![1.0, 2.0]).unwrap();
        let grids = vec![grid.clone(), grid.clone(), grid];
        let results = convert(&grids, &[Some(10.0), Some(0.0)]);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(QlossError::InvalidElasticEnergy { value: Some(_), .. })
        ));
        assert!(matches!(
            results[2],
            Err(QlossError::InvalidElasticEnergy { value: None, .. })
        ));
    }
}
