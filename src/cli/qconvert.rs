//! # qconvert 子命令 CLI 定义
//!
//! 将列标签由散射角（度）转换为动量转移 q (Å⁻¹)。
//! E0 由 `--e0` 直接给出，或由 `--fit-e0` 从 Y 剖面拟合得到。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/qconvert.rs`

use crate::cli::common::{FitArgs, InputArgs, PlotArgs};

use clap::Args;
use std::path::PathBuf;

/// qconvert 子命令参数
#[derive(Args, Debug)]
pub struct QConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Elastic energy E0 in eV, one value for all grids or a comma separated list in file order
    #[arg(
        long,
        value_delimiter = ',',
        required_unless_present = "fit_e0",
        conflicts_with = "fit_e0"
    )]
    pub e0: Vec<f64>,

    /// Take E0 of each grid from a peak fit of its row profile
    #[arg(long, default_value_t = false)]
    pub fit_e0: bool,

    /// Output directory
    #[arg(short, long, default_value = "qloss_q")]
    pub output: PathBuf,

    #[command(flatten)]
    pub fit: FitArgs,

    #[command(flatten)]
    pub plot: PlotArgs,
}
