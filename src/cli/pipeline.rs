//! # pipeline 子命令 CLI 定义
//!
//! 依次执行原点对齐、q 转换和可选的方向变换，阶段间显式传递状态。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/pipeline.rs`

use crate::cli::common::{FitArgs, InputArgs, PlotArgs, TransformAction};

use clap::Args;
use std::path::PathBuf;

/// pipeline 子命令参数
#[derive(Args, Debug)]
pub struct PipelineArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory
    #[arg(short, long, default_value = "qloss_pipeline")]
    pub output: PathBuf,

    /// Override the fitted E0 (eV): one value for all grids or a comma separated list
    #[arg(long, value_delimiter = ',')]
    pub e0: Vec<f64>,

    /// Orientation change applied after q conversion
    #[arg(short, long, value_enum)]
    pub action: Option<TransformAction>,

    /// Keep label signs instead of negating the affected axes
    #[arg(long, default_value_t = false)]
    pub keep_labels: bool,

    #[command(flatten)]
    pub fit: FitArgs,

    #[command(flatten)]
    pub plot: PlotArgs,
}
