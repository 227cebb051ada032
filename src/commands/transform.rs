//! # transform 子命令实现
//!
//! 对批次中的每个谱图执行翻转或旋转。
//!
//! ## 输出
//! - `<out>/<action>/<title>.csv`
//! - `<out>/<action>.png`
//!
//! ## 依赖关系
//! - 使用 `cli/transform.rs` 定义的 TransformArgs
//! - 使用 `spectral/transform.rs`

use crate::cli::transform::TransformArgs;
use crate::commands::common;
use crate::error::Result;
use crate::models::Grid;
use crate::spectral::plot::{self, AxisDesc, PlotOptions};
use crate::spectral::{transform, Transform, TransformOptions};
use crate::utils::output;

use std::path::Path;

/// 执行方向变换
pub fn execute(args: TransformArgs) -> Result<()> {
    output::print_header("Grid Transformation");

    let grids = common::load_batch(&args.input)?;
    let plot_options = common::plot_options(&args.plot)?;
    let action: Transform = args.action.into();
    let options = TransformOptions {
        negate_labels: !args.keep_labels,
    };

    output::print_info(&format!(
        "Applying '{}' to {} grids{}",
        action,
        grids.len(),
        if options.negate_labels {
            ""
        } else {
            " (label signs kept)"
        }
    ));

    let transformed = transform::apply_batch(&grids, action, options);
    write_transformed(
        &transformed,
        action,
        &args.output,
        (!args.plot.no_plot).then_some(&plot_options),
    )?;

    output::print_done(&format!("Results saved to '{}'", args.output.display()));
    Ok(())
}

/// 写出变换结果；`plot` 为 None 时跳过绘图
pub fn write_transformed(
    grids: &[Grid],
    action: Transform,
    out_dir: &Path,
    plot: Option<&PlotOptions>,
) -> Result<()> {
    common::ensure_dir(out_dir)?;
    common::write_grids(grids, &out_dir.join(action.name()))?;

    if let Some(options) = plot {
        let plot_path = out_dir.join(format!("{}.{}", action.name(), options.extension()));
        plot::plot_grids(
            grids,
            &plot_path,
            AxisDesc {
                x: "Column label",
                y: "Row label",
            },
            options,
        )?;
        output::print_success(&format!("Heatmap saved to '{}'", plot_path.display()));
    }

    Ok(())
}
