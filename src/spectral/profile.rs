//! # 剖面提取与峰拟合
//!
//! 将网格沿某一方向压缩为一维剖面（mean/median），
//! 再对剖面拟合 Gaussian 或 Lorentzian 峰，得到峰位与半高全宽。
//!
//! ## 算法概述
//! 1. 剖面横坐标取索引 `0..n-1`，丢弃非有限值
//! 2. 初值：幅度 = 最大值，中心 = 最大值索引，宽度 = n/10 (Gaussian) 或 n/20 (Lorentzian)
//! 3. LM 最小二乘拟合；宽度塌缩到一个采样点以内时从宽度 1 重拟合
//! 4. 中心索引映射回原坐标轴标签；FWHM 乘以标签间距
//!
//! ## 依赖关系
//! - 被 `spectral/align.rs`、`commands/profile.rs` 调用
//! - 使用 `spectral/optimizer.rs` 求解
//! - 使用 `models/grid.rs` 的 Grid

use crate::error::{QlossError, Result};
use crate::models::{Axis, Grid};
use crate::spectral::lineshape::LineShape;
use crate::spectral::optimizer::{self, FitOptions};

use rayon::prelude::*;
use std::str::FromStr;

/// 拟合所需的最少有限采样点
pub const MIN_FIT_SAMPLES: usize = 3;

/// 拟合宽度低于此值（索引单位）时从单位宽度重拟合
const REFIT_WIDTH: f64 = 0.5;

/// 峰在中心 ±1 处的相对高度低于此值视为塌缩
const SPIKE_RATIO: f64 = 1e-6;

/// 剖面压缩方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReduceMethod {
    #[default]
    Mean,
    Median,
}

impl FromStr for ReduceMethod {
    type Err = QlossError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(ReduceMethod::Mean),
            "median" => Ok(ReduceMethod::Median),
            other => Err(QlossError::InvalidParameter(format!(
                "method must be 'mean' or 'median', got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ReduceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReduceMethod::Mean => write!(f, "mean"),
            ReduceMethod::Median => write!(f, "median"),
        }
    }
}

impl ReduceMethod {
    /// 对有限值做聚合；无有限值时返回 NaN
    pub fn aggregate<I: IntoIterator<Item = f64>>(&self, values: I) -> f64 {
        let mut finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return f64::NAN;
        }
        match self {
            ReduceMethod::Mean => finite.iter().sum::<f64>() / finite.len() as f64,
            ReduceMethod::Median => {
                finite.sort_by(|a, b| a.total_cmp(b));
                let mid = finite.len() / 2;
                if finite.len() % 2 == 0 {
                    (finite[mid - 1] + finite[mid]) / 2.0
                } else {
                    finite[mid]
                }
            }
        }
    }
}

/// 一维剖面
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub labels: Vec<f64>,
    pub values: Vec<f64>,
}

/// 峰拟合结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakFit {
    pub shape: LineShape,
    pub amplitude: f64,
    /// 峰中心（索引单位）
    pub center: f64,
    /// σ (Gaussian) 或 γ (Lorentzian)，索引单位
    pub width: f64,
    /// 峰中心对应的坐标轴数值
    pub center_label: f64,
    /// 半高全宽（坐标轴单位）
    pub fwhm: f64,
    pub iterations: usize,
}

impl PeakFit {
    /// 在剖面的每个索引处计算拟合曲线
    pub fn curve(&self, profile: &Profile) -> Vec<(f64, f64)> {
        let params = [self.amplitude, self.center, self.width];
        profile
            .labels
            .iter()
            .enumerate()
            .map(|(i, &label)| (label, self.shape.eval(i as f64, &params)))
            .collect()
    }
}

/// 沿指定方向压缩网格
///
/// `Axis::X` 对每一列在所有行上聚合，结果以列标签为横坐标；
/// `Axis::Y` 对每一行在所有列上聚合，结果以行标签为横坐标。
pub fn reduce(grid: &Grid, axis: Axis, method: ReduceMethod) -> Profile {
    let values = match axis {
        Axis::X => (0..grid.cols())
            .map(|c| method.aggregate((0..grid.rows()).map(|r| grid.get(r, c))))
            .collect(),
        Axis::Y => (0..grid.rows())
            .map(|r| method.aggregate(grid.row(r).iter().copied()))
            .collect(),
    };

    Profile {
        labels: grid.labels(axis).to_vec(),
        values,
    }
}

/// 以字符串指定压缩方式（未知方式返回 `InvalidParameter`）
pub fn reduce_by_name(grid: &Grid, axis: Axis, method: &str) -> Result<Profile> {
    Ok(reduce(grid, axis, method.parse()?))
}

/// 对剖面拟合峰形
pub fn fit(profile: &Profile, shape: LineShape, options: &FitOptions) -> Result<PeakFit> {
    let n = profile.values.len();
    if profile.labels.len() != n {
        return Err(QlossError::ShapeMismatch(format!(
            "profile has {} labels for {} values",
            profile.labels.len(),
            n
        )));
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = profile
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &v)| (i as f64, v))
        .unzip();

    if xs.len() < MIN_FIT_SAMPLES {
        return Err(QlossError::InsufficientData {
            found: xs.len(),
            required: MIN_FIT_SAMPLES,
        });
    }

    let (max_pos, max_value) = ys
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        });

    let initial = [max_value, xs[max_pos], shape.initial_width(ys.len())];
    let mut solution = optimizer::levenberg_marquardt(shape, &xs, &ys, initial, options)?;

    // 宽初值可能塌缩到中心采样点上的尖峰；从单位宽度重拟合并取残差较小者
    if solution.params[2].abs() < REFIT_WIDTH {
        let retry = [max_value, xs[max_pos], 1.0];
        if let Ok(refit) = optimizer::levenberg_marquardt(shape, &xs, &ys, retry, options) {
            if refit.cost < solution.cost {
                solution = refit;
            }
        }
    }
    if is_collapsed(shape, &solution.params) {
        return Err(QlossError::FitDivergence(format!(
            "peak collapsed below sample spacing (width {:.3e})",
            solution.params[2].abs()
        )));
    }

    let [amplitude, center, width] = solution.params;

    if solution.params.iter().any(|p| !p.is_finite()) {
        return Err(QlossError::FitDivergence(
            "non-finite fitted parameters".to_string(),
        ));
    }

    let center_index = center.round();
    if center_index < 0.0 || center_index > (n - 1) as f64 {
        return Err(QlossError::FitDivergence(format!(
            "center index {:.2} outside [0, {}]",
            center,
            n - 1
        )));
    }

    let center_label = interpolate_label(&profile.labels, center);
    if !center_label.is_finite() {
        return Err(QlossError::FitDivergence(
            "center falls on a non-numeric label".to_string(),
        ));
    }

    let scale = if n > 1 {
        profile.labels[1] - profile.labels[0]
    } else {
        1.0
    };

    Ok(PeakFit {
        shape,
        amplitude,
        center,
        width: width.abs(),
        center_label,
        fwhm: shape.fwhm(width, scale),
        iterations: solution.iterations,
    })
}

/// 压缩并拟合单个网格
pub fn fit_grid(
    grid: &Grid,
    axis: Axis,
    method: ReduceMethod,
    shape: LineShape,
    options: &FitOptions,
) -> Result<PeakFit> {
    fit(&reduce(grid, axis, method), shape, options)
}

/// 并行拟合一批网格，输出顺序与输入一致
pub fn fit_batch(
    grids: &[Grid],
    axis: Axis,
    method: ReduceMethod,
    shape: LineShape,
    options: &FitOptions,
) -> Vec<Result<PeakFit>> {
    grids
        .par_iter()
        .map(|grid| fit_grid(grid, axis, method, shape, options))
        .collect()
}

/// 拟合峰在相邻采样点处已不可见时视为塌缩
fn is_collapsed(shape: LineShape, params: &[f64; 3]) -> bool {
    let [amplitude, center, width] = *params;
    if width == 0.0 || amplitude == 0.0 {
        return true;
    }
    (shape.eval(center + 1.0, params) / amplitude).abs() < SPIKE_RATIO
}

/// 将小数索引线性插值为标签值（索引夹在 [0, n-1] 内）
fn interpolate_label(labels: &[f64], index: f64) -> f64 {
    let last = labels.len() - 1;
    let index = index.clamp(0.0, last as f64);
    let lo = index.floor() as usize;
    let hi = (lo + 1).min(last);
    let frac = index - lo as f64;
    labels[lo] + frac * (labels[hi] - labels[lo])
}
