//! # 网格方向变换
//!
//! 上下翻转、左右翻转、90° 旋转。
//! 物理约定：翻转某一轴的数据时该轴标签取反。
//!
//! ## 依赖关系
//! - 被 `commands/transform.rs`、`commands/pipeline.rs` 调用
//! - 使用 `models/grid.rs` 的 Grid

use crate::error::QlossError;
use crate::models::Grid;

use std::str::FromStr;

/// 旋转方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    Ccw,
    Cw,
}

/// 变换动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    FlipVertical,
    FlipHorizontal,
    Rotate(RotateDirection),
    /// 不做变换
    Reset,
}

impl Transform {
    /// 用作输出目录名
    pub fn name(&self) -> &'static str {
        match self {
            Transform::FlipVertical => "flip-ud",
            Transform::FlipHorizontal => "flip-lr",
            Transform::Rotate(RotateDirection::Ccw) => "rotate-ccw",
            Transform::Rotate(RotateDirection::Cw) => "rotate-cw",
            Transform::Reset => "reset",
        }
    }
}

impl FromStr for Transform {
    type Err = QlossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "flip-ud" | "flip-vertical" => Ok(Transform::FlipVertical),
            "flip-lr" | "flip-horizontal" => Ok(Transform::FlipHorizontal),
            "rotate-ccw" | "rotate-ccw90" => Ok(Transform::Rotate(RotateDirection::Ccw)),
            "rotate-cw" | "rotate-cw90" => Ok(Transform::Rotate(RotateDirection::Cw)),
            "reset" => Ok(Transform::Reset),
            other => Err(QlossError::InvalidParameter(format!(
                "unknown transform '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 变换选项
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions {
    /// 数据翻转时对应坐标轴标签是否取反
    pub negate_labels: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            negate_labels: true,
        }
    }
}

/// 执行变换，总是返回新网格
pub fn apply(grid: &Grid, transform: Transform, options: TransformOptions) -> Grid {
    let (out, negate_rows, negate_cols) = match transform {
        Transform::FlipVertical => (grid.reversed_rows(), true, false),
        Transform::FlipHorizontal => (grid.reversed_cols(), false, true),
        Transform::Rotate(RotateDirection::Ccw) => (grid.transposed().reversed_rows(), true, true),
        Transform::Rotate(RotateDirection::Cw) => (grid.transposed().reversed_cols(), true, true),
        Transform::Reset => return grid.clone(),
    };

    if !options.negate_labels {
        return out;
    }

    let rows = negate_if(out.row_labels(), negate_rows);
    let cols = negate_if(out.col_labels(), negate_cols);
    out.relabeled(rows, cols).unwrap_or(out)
}

fn negate_if(labels: &[f64], negate: bool) -> Vec<f64> {
    if negate {
        labels.iter().map(|v| -v).collect()
    } else {
        labels.to_vec()
    }
}

/// 上下翻转（行顺序反转，能量损失取反）
pub fn flip_vertical(grid: &Grid) -> Grid {
    apply(grid, Transform::FlipVertical, TransformOptions::default())
}

/// 左右翻转（列顺序反转，角度取反）
pub fn flip_horizontal(grid: &Grid) -> Grid {
    apply(grid, Transform::FlipHorizontal, TransformOptions::default())
}

/// 90° 旋转
pub fn rotate(grid: &Grid, direction: RotateDirection) -> Grid {
    apply(grid, Transform::Rotate(direction), TransformOptions::default())
}

/// 对一批谱图执行同一变换
pub fn apply_batch(grids: &[Grid], transform: Transform, options: TransformOptions) -> Vec<Grid> {
    grids.iter().map(|g| apply(g, transform, options)).collect()
}
