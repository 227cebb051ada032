//! # 线切（强度剖面）
//!
//! 在给定坐标处（或其窗口内）提取一维强度曲线：
//! - `Axis::X`：固定角度/q，得到强度随能量损失的变化
//! - `Axis::Y`：固定能量损失，得到强度随角度/q 的变化
//!
//! ## 依赖关系
//! - 被 `commands/slice.rs` 调用
//! - 使用 `spectral/profile.rs` 的 ReduceMethod

use crate::error::{QlossError, Result};
use crate::models::{Axis, Grid};
use crate::spectral::profile::ReduceMethod;

/// 线切结果
#[derive(Debug, Clone, PartialEq)]
pub struct LineCut {
    pub title: String,
    pub axis: Axis,
    /// 离请求值最近的标签
    pub center: f64,
    pub window: f64,
    /// 参与聚合的切片个数
    pub slices: usize,
    /// 结果曲线的横坐标（另一轴的标签）
    pub labels: Vec<f64>,
    pub values: Vec<f64>,
}

/// 最近标签的索引
pub fn nearest_index(labels: &[f64], value: f64) -> Option<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, l)| l.is_finite())
        .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
        .map(|(i, _)| i)
}

/// 提取线切
pub fn line_cut(
    grid: &Grid,
    axis: Axis,
    value: f64,
    window: f64,
    method: ReduceMethod,
) -> Result<LineCut> {
    if !value.is_finite() || !window.is_finite() || window < 0.0 {
        return Err(QlossError::InvalidArgument(format!(
            "line cut needs a finite value and window >= 0 (value = {}, window = {})",
            value, window
        )));
    }

    let axis_labels = grid.labels(axis);
    let nearest = nearest_index(axis_labels, value).ok_or_else(|| QlossError::EmptyGrid {
        title: grid.title().to_string(),
        rows: grid.rows(),
        cols: grid.cols(),
    })?;
    let center = axis_labels[nearest];

    let selected: Vec<usize> = if window > 0.0 {
        let (lo, hi) = (center - window / 2.0, center + window / 2.0);
        (0..axis_labels.len())
            .filter(|&i| axis_labels[i] >= lo && axis_labels[i] <= hi)
            .collect()
    } else {
        vec![nearest]
    };

    let (labels, values) = match axis {
        Axis::X => (
            grid.row_labels().to_vec(),
            (0..grid.rows())
                .map(|r| method.aggregate(selected.iter().map(|&c| grid.get(r, c))))
                .collect(),
        ),
        Axis::Y => (
            grid.col_labels().to_vec(),
            (0..grid.cols())
                .map(|c| method.aggregate(selected.iter().map(|&r| grid.get(r, c))))
                .collect(),
        ),
    };

    Ok(LineCut {
        title: grid.title().to_string(),
        axis,
        center,
        window,
        slices: selected.len(),
        labels,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_rows(
            "s",
            vec![0.0, 1.0],
            vec![0.0, 0.5, 1.0, 1.5],
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_single_column_cut() {
        let cut = line_cut(&sample(), Axis::X, 0.6, 0.0, ReduceMethod::Mean).unwrap();
        assert_eq!(cut.center, 0.5);
        assert_eq!(cut.slices, 1);
        assert_eq!(cut.labels, vec![0.0, 1.0]);
        assert_eq!(cut.values, vec![2.0, 6.0]);
    }

    #[test]
    fn test_windowed_cut() {
        let cut = line_cut(&sample(), Axis::X, 0.9, 1.0, ReduceMethod::Mean).unwrap();
        assert_eq!(cut.center, 1.0);
        assert_eq!(cut.slices, 3);
        assert_eq!(cut.values, vec![3.0, 7.0]);
    }

    #[test]
    fn test_row_cut() {
        let cut = line_cut(&sample(), Axis::Y, 0.8, 0.0, ReduceMethod::Median).unwrap();
        assert_eq!(cut.center, 1.0);
        assert_eq!(cut.labels, sample().col_labels());
        assert_eq!(cut.values, vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_negative_window_rejected() {
        let err = line_cut(&sample(), Axis::X, 0.0, -1.0, ReduceMethod::Mean).unwrap_err();
        assert!(matches!(err, QlossError::InvalidArgument(_)));
    }
}
