//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `align`: 原点对齐
//! - `profile`: 剖面峰拟合
//! - `qconvert`: 角度到 q 的转换
//! - `transform`: 翻转 / 旋转
//! - `slice`: 线切
//! - `pipeline`: 对齐 → q 转换 → 变换
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: common, align, qconvert, transform, pipeline

pub mod align;
pub mod common;
pub mod pipeline;
pub mod qconvert;
pub mod transform;

use clap::{Parser, Subcommand};

/// qloss - 角分辨能量损失谱图处理工具
#[derive(Parser)]
#[command(name = "qloss")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Origin alignment and momentum-transfer conversion for angle-resolved energy-loss maps",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Fit X/Y profile peaks and shift every grid so the peak sits at the origin
    Align(align::AlignArgs),

    /// Fit the peak of one profile per grid and report center and FWHM
    Profile(align::ProfileArgs),

    /// Convert column labels from scattering angle (degrees) to momentum transfer q (1/Å)
    #[command(name = "qconvert")]
    QConvert(qconvert::QConvertArgs),

    /// Flip or rotate grids
    Transform(transform::TransformArgs),

    /// Extract a line cut at a fixed label value
    Slice(transform::SliceArgs),

    /// Align, convert to q and optionally transform in one run
    Pipeline(pipeline::PipelineArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::common::{AxisArg, TransformAction};
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["qloss", "qconvert", "data", "--e0", "15,15.5"]).unwrap();
        match cli.command {
            Commands::QConvert(args) => {
                assert_eq!(args.e0, vec![15.0, 15.5]);
                assert!(!args.fit_e0);
            }
            _ => panic!("expected qconvert"),
        }

        assert!(Cli::try_parse_from(["qloss", "qconvert", "data"]).is_err());

        let cli = Cli::try_parse_from([
            "qloss", "slice", "data", "--axis", "y", "--value", "-0.5", "--x-range", "-5:5",
        ])
        .unwrap();
        match cli.command {
            Commands::Slice(args) => {
                assert_eq!(args.axis, AxisArg::Y);
                assert_eq!(args.value, -0.5);
                assert_eq!(args.plot.x_range.and_then(|r| r.min), Some(-5.0));
            }
            _ => panic!("expected slice"),
        }

        let cli =
            Cli::try_parse_from(["qloss", "transform", "data", "--action", "rotate-ccw"]).unwrap();
        match cli.command {
            Commands::Transform(args) => assert_eq!(args.action, TransformAction::RotateCcw),
            _ => panic!("expected transform"),
        }
    }
}
