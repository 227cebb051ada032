//! # align / profile 子命令 CLI 定义
//!
//! - `align`: 拟合每个谱图的 X/Y 剖面峰位，并将原点移到峰位
//! - `profile`: 只做剖面拟合并报告峰位与半高全宽
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/align.rs`、`commands/profile.rs`

use crate::cli::common::{AxisArg, FitArgs, InputArgs, PlotArgs};

use clap::Args;
use std::path::PathBuf;

/// align 子命令参数
#[derive(Args, Debug)]
pub struct AlignArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory
    #[arg(short, long, default_value = "qloss_aligned")]
    pub output: PathBuf,

    #[command(flatten)]
    pub fit: FitArgs,

    #[command(flatten)]
    pub plot: PlotArgs,
}

/// profile 子命令参数
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Axis along which the profile is taken
    #[arg(long, value_enum, default_value = "x")]
    pub axis: AxisArg,

    /// Output directory
    #[arg(short, long, default_value = "qloss_profile")]
    pub output: PathBuf,

    #[command(flatten)]
    pub fit: FitArgs,

    #[command(flatten)]
    pub plot: PlotArgs,
}
