//! # 数据模型模块
//!
//! 定义谱图网格与流水线状态。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`spectral/` 和 `commands/` 使用
//! - 子模块: grid, state

pub mod grid;
pub mod state;

pub use grid::{Axis, Grid, LabelRange};
pub use state::{PipelineState, Stage};
