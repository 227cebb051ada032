//! # 谱图网格数据模型
//!
//! 二维强度表：行为能量损失，列为散射角（或 q）。
//! 各处理阶段总是生成新的 `Grid`，从不原地修改输入。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`spectral/` 和 `commands/` 使用
//! - 无外部模块依赖

use crate::error::{QlossError, Result};

use serde::{Deserialize, Serialize};

/// 坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// 列方向（角度或 q），剖面沿行取平均
    X,
    /// 行方向（能量损失），剖面沿列取平均
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// 标签闭区间，两端均可省略
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl LabelRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// 是否未设置任何边界
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |m| value >= m) && self.max.map_or(true, |m| value <= m)
    }
}

/// 二维谱图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    title: String,
    row_labels: Vec<f64>,
    col_labels: Vec<f64>,
    /// 行主序强度，长度 rows * cols
    values: Vec<f64>,
}

impl Grid {
    /// 由行主序数据创建网格，校验形状
    pub fn new(
        title: impl Into<String>,
        row_labels: Vec<f64>,
        col_labels: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self> {
        let title = title.into();
        let (rows, cols) = (row_labels.len(), col_labels.len());

        if rows == 0 || cols == 0 {
            return Err(QlossError::EmptyGrid { title, rows, cols });
        }
        if values.len() != rows * cols {
            return Err(QlossError::ShapeMismatch(format!(
                "'{}': {} values for {} rows x {} cols",
                title,
                values.len(),
                rows,
                cols
            )));
        }

        Ok(Self {
            title,
            row_labels,
            col_labels,
            values,
        })
    }

    /// 由逐行数据创建网格
    pub fn from_rows(
        title: impl Into<String>,
        row_labels: Vec<f64>,
        col_labels: Vec<f64>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let title = title.into();
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != col_labels.len())
        {
            return Err(QlossError::ShapeMismatch(format!(
                "'{}': row {} has {} values, expected {}",
                title,
                i,
                row.len(),
                col_labels.len()
            )));
        }
        let values = rows.into_iter().flatten().collect();
        Self::new(title, row_labels, col_labels, values)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn row_labels(&self) -> &[f64] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[f64] {
        &self.col_labels
    }

    /// 某轴的标签
    pub fn labels(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.col_labels,
            Axis::Y => &self.row_labels,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols() + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let cols = self.cols();
        &self.values[row * cols..(row + 1) * cols]
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows()).map(|r| self.get(r, col)).collect()
    }

    /// 有限值的最小/最大强度
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// 更换标题
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// 以新的标签生成网格，强度不变
    pub fn relabeled(&self, row_labels: Vec<f64>, col_labels: Vec<f64>) -> Result<Self> {
        Self::new(
            self.title.clone(),
            row_labels,
            col_labels,
            self.values.clone(),
        )
    }

    /// 转置（行列互换，标签随之交换）
    pub fn transposed(&self) -> Self {
        let (rows, cols) = (self.rows(), self.cols());
        let mut values = Vec::with_capacity(rows * cols);
        for c in 0..cols {
            for r in 0..rows {
                values.push(self.get(r, c));
            }
        }
        Self {
            title: self.title.clone(),
            row_labels: self.col_labels.clone(),
            col_labels: self.row_labels.clone(),
            values,
        }
    }

    /// 行顺序反转
    pub fn reversed_rows(&self) -> Self {
        let values = (0..self.rows())
            .rev()
            .flat_map(|r| self.row(r).iter().copied())
            .collect();
        Self {
            title: self.title.clone(),
            row_labels: self.row_labels.iter().rev().copied().collect(),
            col_labels: self.col_labels.clone(),
            values,
        }
    }

    /// 列顺序反转
    pub fn reversed_cols(&self) -> Self {
        let values = (0..self.rows())
            .flat_map(|r| self.row(r).iter().rev().copied())
            .collect();
        Self {
            title: self.title.clone(),
            row_labels: self.row_labels.clone(),
            col_labels: self.col_labels.iter().rev().copied().collect(),
            values,
        }
    }

    /// 按标签范围裁剪
    pub fn crop(&self, x_range: LabelRange, y_range: LabelRange) -> Result<Self> {
        if x_range.is_unbounded() && y_range.is_unbounded() {
            return Ok(self.clone());
        }

        let keep_cols: Vec<usize> = (0..self.cols())
            .filter(|&c| x_range.contains(self.col_labels[c]))
            .collect();
        let keep_rows: Vec<usize> = (0..self.rows())
            .filter(|&r| y_range.contains(self.row_labels[r]))
            .collect();

        if keep_rows.is_empty() || keep_cols.is_empty() {
            return Err(QlossError::EmptyGrid {
                title: self.title.clone(),
                rows: keep_rows.len(),
                cols: keep_cols.len(),
            });
        }

        let values = keep_rows
            .iter()
            .flat_map(|&r| keep_cols.iter().map(move |&c| (r, c)))
            .map(|(r, c)| self.get(r, c))
            .collect();

        Self::new(
            self.title.clone(),
            keep_rows.iter().map(|&r| self.row_labels[r]).collect(),
            keep_cols.iter().map(|&c| self.col_labels[c]).collect(),
            values,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_rows(
            "s",
            vec![0.0, 1.0],
            vec![10.0, 20.0, 30.0],
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_validation() {
        let err = Grid::new("bad", vec![0.0, 1.0], vec![0.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, QlossError::ShapeMismatch(_)));

        let err = Grid::new("empty", vec![], vec![0.0], vec![]).unwrap_err();
        assert!(matches!(err, QlossError::EmptyGrid { .. }));
    }

    #[test]
    fn test_transpose() {
        let t = sample().transposed();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        assert_eq!(t.row(0), &[1.0, 4.0]);
        assert_eq!(t.row_labels(), &[10.0, 20.0, 30.0]);
        assert_eq!(t.col_labels(), &[0.0, 1.0]);
    }

    #[test]
    fn test_reverse() {
        let g = sample();
        assert_eq!(g.reversed_rows().row(0), &[4.0, 5.0, 6.0]);
        assert_eq!(g.reversed_cols().row(0), &[3.0, 2.0, 1.0]);
        assert_eq!(g.reversed_cols().col_labels(), &[30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_crop() {
        let g = sample();
        let c = g
            .crop(LabelRange::new(Some(15.0), None), LabelRange::new(None, Some(0.5)))
            .unwrap();
        assert_eq!(c.col_labels(), &[20.0, 30.0]);
        assert_eq!(c.row_labels(), &[0.0]);
        assert_eq!(c.values(), &[2.0, 3.0]);

        let err = g
            .crop(LabelRange::new(Some(100.0), None), LabelRange::default())
            .unwrap_err();
        assert!(matches!(err, QlossError::EmptyGrid { .. }));
    }
}
