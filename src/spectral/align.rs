//! # 原点对齐
//!
//! 对一批谱图分别拟合 X/Y 剖面峰位，并将坐标轴平移使峰位落在 (0, 0)。
//!
//! ## 失败策略
//! 某个谱图某一方向拟合失败时，该方向峰位记为 `None`，
//! 对应坐标轴原样保留，其余谱图继续处理。
//!
//! ## 依赖关系
//! - 被 `commands/align.rs`、`commands/pipeline.rs` 调用
//! - 使用 `spectral/profile.rs` 拟合剖面

use crate::error::Result;
use crate::models::{Axis, Grid};
use crate::spectral::lineshape::LineShape;
use crate::spectral::optimizer::FitOptions;
use crate::spectral::profile::{self, PeakFit, ReduceMethod};

use rayon::prelude::*;

/// 对齐配置
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignConfig {
    pub method: ReduceMethod,
    pub shape: LineShape,
    pub fit: FitOptions,
}

/// 单个谱图单个方向的拟合失败记录
#[derive(Debug, Clone)]
pub struct AlignFailure {
    pub title: String,
    pub axis: Axis,
    pub reason: String,
}

/// 对齐结果，所有向量与输入顺序一致
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    pub x_peaks: Vec<Option<f64>>,
    pub y_peaks: Vec<Option<f64>>,
    pub x_fwhm: Vec<Option<f64>>,
    pub y_fwhm: Vec<Option<f64>>,
    pub grids: Vec<Grid>,
    pub failures: Vec<AlignFailure>,
}

/// 对一批谱图执行原点对齐
pub fn align(grids: &[Grid], config: &AlignConfig) -> Result<AlignmentResult> {
    let fits: Vec<(Result<PeakFit>, Result<PeakFit>)> = grids
        .par_iter()
        .map(|grid| {
            (
                profile::fit_grid(grid, Axis::X, config.method, config.shape, &config.fit),
                profile::fit_grid(grid, Axis::Y, config.method, config.shape, &config.fit),
            )
        })
        .collect();

    let mut result = AlignmentResult {
        x_peaks: Vec::with_capacity(grids.len()),
        y_peaks: Vec::with_capacity(grids.len()),
        x_fwhm: Vec::with_capacity(grids.len()),
        y_fwhm: Vec::with_capacity(grids.len()),
        grids: Vec::with_capacity(grids.len()),
        failures: Vec::new(),
    };

    for (grid, (fit_x, fit_y)) in grids.iter().zip(fits) {
        let x = unpack(fit_x, grid, Axis::X, &mut result.failures);
        let y = unpack(fit_y, grid, Axis::Y, &mut result.failures);

        result.x_peaks.push(x.map(|f| f.center_label));
        result.x_fwhm.push(x.map(|f| f.fwhm));
        result.y_peaks.push(y.map(|f| f.center_label));
        result.y_fwhm.push(y.map(|f| f.fwhm));
        result.grids.push(shift_grid(
            grid,
            x.map(|f| f.center_label),
            y.map(|f| f.center_label),
        )?);
    }

    Ok(result)
}

fn unpack(
    fit: Result<PeakFit>,
    grid: &Grid,
    axis: Axis,
    failures: &mut Vec<AlignFailure>,
) -> Option<PeakFit> {
    match fit {
        Ok(f) => Some(f),
        Err(e) => {
            failures.push(AlignFailure {
                title: grid.title().to_string(),
                axis,
                reason: e.to_string(),
            });
            None
        }
    }
}

/// 按给定峰位平移网格坐标；`None` 表示该方向不平移
pub fn shift_grid(grid: &Grid, x_peak: Option<f64>, y_peak: Option<f64>) -> Result<Grid> {
    let cols = match x_peak {
        Some(p) => shift_labels(grid.col_labels(), p),
        None => grid.col_labels().to_vec(),
    };
    let rows = match y_peak {
        Some(p) => shift_labels(grid.row_labels(), p),
        None => grid.row_labels().to_vec(),
    };

    grid.relabeled(rows, cols)
}

/// 标签减去峰位
///
/// 若存在非数值标签，则在首末有限标签之间重新生成等间距标签，
/// 两端同样减去峰位。
pub fn shift_labels(labels: &[f64], peak: f64) -> Vec<f64> {
    if labels.iter().all(|v| v.is_finite()) {
        return labels.iter().map(|v| v - peak).collect();
    }

    let first = labels.iter().copied().find(|v| v.is_finite());
    let last = labels.iter().rev().copied().find(|v| v.is_finite());

    match (first, last) {
        (Some(a), Some(b)) if labels.len() > 1 => linspace(a - peak, b - peak, labels.len()),
        _ => labels.to_vec(),
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::lineshape::gaussian;
    use approx::assert_abs_diff_eq;

    /// 50×50 网格，列方向峰位于中心偏移 `offset` 处，行方向峰位于第 20 行
    fn peaked_grid(title: &str, offset: f64) -> Grid {
        let n = 50;
        let values = (0..n)
            .flat_map(|r| {
                (0..n).map(move |c| {
                    gaussian(c as f64, 1.0, 25.0 + offset, 3.0)
                        * gaussian(r as f64, 1.0, 20.0, 4.0)
                })
            })
            .collect();
        let labels: Vec<f64> = (0..n).map(|i| i as f64 - 25.0).collect();
        Grid::new(title, labels.clone(), labels, values).unwrap()
    }

    #[test]
    fn test_align_three_grids_to_origin() {
        let grids = vec![
            peaked_grid("a", -5.0),
            peaked_grid("b", 0.0),
            peaked_grid("c", 5.0),
        ];
        let config = AlignConfig::default();
        let result = align(&grids, &config).unwrap();

        assert!(result.failures.is_empty());
        assert_abs_diff_eq!(result.x_peaks[0].unwrap(), -5.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.x_peaks[1].unwrap(), 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.x_peaks[2].unwrap(), 5.0, epsilon = 1e-3);

        // 对齐后重新拟合，峰位应在 0 附近
        for grid in &result.grids {
            let refit = profile::fit_grid(
                grid,
                Axis::X,
                ReduceMethod::Mean,
                LineShape::Gaussian,
                &config.fit,
            )
            .unwrap();
            assert_abs_diff_eq!(refit.center_label, 0.0, epsilon = 1e-3);

            let refit_y = profile::fit_grid(
                grid,
                Axis::Y,
                ReduceMethod::Mean,
                LineShape::Gaussian,
                &config.fit,
            )
            .unwrap();
            assert_abs_diff_eq!(refit_y.center_label, 0.0, epsilon = 1e-3);
        }

        // 输入不被修改
        assert_eq!(grids[0].col_labels()[0], -25.0);
    }

    #[test]
    fn test_failed_fit_passes_labels_through() {
        let flat = Grid::from_rows(
            "flat",
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![vec![1.0, 1.0], vec![1.0, 1.0]],
        )
        .unwrap();
        let grids = vec![flat.clone(), peaked_grid("ok", 0.0)];
        let result = align(&grids, &AlignConfig::default()).unwrap();

        assert_eq!(result.x_peaks[0], None);
        assert_eq!(result.y_peaks[0], None);
        assert_eq!(result.grids[0].col_labels(), flat.col_labels());
        assert_eq!(result.grids[0].row_labels(), flat.row_labels());
        assert_eq!(result.failures.len(), 2);
        assert!(result.x_peaks[1].is_some());
    }

    #[test]
    fn test_shift_labels_fallback() {
        let labels = vec![1.0, f64::NAN, 3.0, 4.0, 5.0];
        let shifted = shift_labels(&labels, 1.0);
        assert_eq!(shifted, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        assert_eq!(shift_labels(&[2.0, 3.0], 2.0), vec![0.0, 1.0]);
    }
}
