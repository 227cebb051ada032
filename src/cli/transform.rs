//! # transform / slice 子命令 CLI 定义
//!
//! - `transform`: 翻转或旋转谱图
//! - `slice`: 在给定标签处提取线切
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/transform.rs`、`commands/slice.rs`

use crate::cli::common::{AxisArg, InputArgs, MethodArg, PlotArgs, TransformAction};

use clap::Args;
use std::path::PathBuf;

/// transform 子命令参数
#[derive(Args, Debug)]
pub struct TransformArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Orientation change to apply
    #[arg(short, long, value_enum)]
    pub action: TransformAction,

    /// Keep label signs instead of negating the affected axes
    #[arg(long, default_value_t = false)]
    pub keep_labels: bool,

    /// Output directory
    #[arg(short, long, default_value = "qloss_transformed")]
    pub output: PathBuf,

    #[command(flatten)]
    pub plot: PlotArgs,
}

/// slice 子命令参数
#[derive(Args, Debug)]
pub struct SliceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Axis whose label is fixed by the cut (x: fixed column, y: fixed row)
    #[arg(long, value_enum)]
    pub axis: AxisArg,

    /// Label value at which the cut is taken
    #[arg(long, allow_hyphen_values = true)]
    pub value: f64,

    /// Full width of the label window aggregated around the cut (0 = nearest line only)
    #[arg(long, default_value_t = 0.0)]
    pub window: f64,

    /// How lines inside the window are combined
    #[arg(long, value_enum, default_value = "mean")]
    pub method: MethodArg,

    /// Output directory
    #[arg(short, long, default_value = "qloss_slice")]
    pub output: PathBuf,

    #[command(flatten)]
    pub plot: PlotArgs,
}
