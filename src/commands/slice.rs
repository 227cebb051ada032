//! # slice 子命令实现
//!
//! 在固定的列标签（`--axis x`）或行标签（`--axis y`）处提取线切，
//! 可在窗口内聚合多条相邻的线。
//!
//! ## 输出
//! - `<out>/slice_<axis>.csv`: 长表格式的线切数据
//! - `<out>/slice_<axis>.png`: 线切对比图
//!
//! ## 依赖关系
//! - 使用 `cli/transform.rs` 定义的 SliceArgs
//! - 使用 `spectral/slice.rs`

use crate::cli::transform::SliceArgs;
use crate::commands::common;
use crate::error::Result;
use crate::models::Axis;
use crate::spectral::{export, plot, slice};
use crate::utils::output;

/// 执行线切
pub fn execute(args: SliceArgs) -> Result<()> {
    output::print_header("Line Cuts");

    let grids = common::load_batch(&args.input)?;
    let plot_options = common::plot_options(&args.plot)?;
    let axis: Axis = args.axis.into();

    let mut cuts = Vec::with_capacity(grids.len());
    for grid in &grids {
        match slice::line_cut(grid, axis, args.value, args.window, args.method.into()) {
            Ok(cut) => {
                output::print_info(&format!(
                    "{}: cut at {} = {:.4} ({} lines)",
                    cut.title, axis, cut.center, cut.slices
                ));
                cuts.push(cut);
            }
            Err(e) if e.is_per_grid() => {
                output::print_grid_warning(grid.title(), e);
            }
            Err(e) => return Err(e),
        }
    }

    common::ensure_dir(&args.output)?;
    let csv_path = args.output.join(format!("slice_{}.csv", axis));
    export::line_cuts_to_csv(&cuts, &csv_path)?;
    output::print_success(&format!("Line cuts saved to '{}'", csv_path.display()));

    if !args.plot.no_plot && !cuts.is_empty() {
        let plot_path = args
            .output
            .join(format!("slice_{}.{}", axis, plot_options.extension()));
        let x_desc = match axis {
            Axis::X => "Energy loss (eV)",
            Axis::Y => "Angle / q",
        };
        plot::plot_line_cuts(
            &cuts,
            &plot_path,
            &format!("Cut at {} = {}", axis, args.value),
            x_desc,
            &plot_options,
        )?;
        output::print_success(&format!("Plot saved to '{}'", plot_path.display()));
    }

    output::print_done(&format!("{} of {} grids cut", cuts.len(), grids.len()));
    Ok(())
}
