//! # align 子命令实现
//!
//! 拟合每个谱图的 X/Y 剖面峰位，将坐标原点移到峰位。
//!
//! ## 输出
//! - `<out>/origin/<title>.csv`: 对齐后的谱图
//! - `<out>/peaks.csv`: 峰位与半高全宽
//! - `<out>/aligned.png`: 对齐后的热图
//!
//! ## 依赖关系
//! - 使用 `cli/align.rs` 定义的 AlignArgs
//! - 使用 `spectral/align.rs` 进行对齐
//! - 使用 `commands/common.rs` 读取批次

use crate::cli::align::AlignArgs;
use crate::commands::common;
use crate::error::Result;
use crate::spectral::plot::{self, AxisDesc, PlotOptions};
use crate::spectral::{align, export, AlignmentResult};
use crate::utils::{output, progress};

use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct PeakRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "X peak")]
    x_peak: String,
    #[tabled(rename = "X FWHM")]
    x_fwhm: String,
    #[tabled(rename = "Y peak")]
    y_peak: String,
    #[tabled(rename = "Y FWHM")]
    y_fwhm: String,
}

/// 执行原点对齐
pub fn execute(args: AlignArgs) -> Result<()> {
    output::print_header("Origin Alignment");

    let grids = common::load_batch(&args.input)?;
    let config = common::align_config(&args.fit)?;
    let plot_options = common::plot_options(&args.plot)?;

    output::print_info(&format!(
        "Fitting {} profiles ({} reduction, {} peaks)",
        grids.len() * 2,
        config.method,
        config.shape
    ));

    let spinner = progress::create_spinner("Fitting profiles");
    let result = align::align(&grids, &config)?;
    spinner.finish_and_clear();

    report_alignment(&result);
    write_alignment(&result, &args.output, (!args.plot.no_plot).then_some(&plot_options))?;

    output::print_done(&format!("Results saved to '{}'", args.output.display()));
    Ok(())
}

/// 打印峰位表与逐谱图失败警告
pub fn report_alignment(result: &AlignmentResult) {
    for failure in &result.failures {
        output::print_grid_warning(
            &failure.title,
            format!("{} fit failed, axis left unshifted ({})", failure.axis, failure.reason),
        );
    }

    let rows: Vec<PeakRow> = result
        .grids
        .iter()
        .enumerate()
        .map(|(i, grid)| PeakRow {
            title: grid.title().to_string(),
            x_peak: output::fmt_cell(result.x_peaks[i]),
            x_fwhm: output::fmt_cell(result.x_fwhm[i]),
            y_peak: output::fmt_cell(result.y_peaks[i]),
            y_fwhm: output::fmt_cell(result.y_fwhm[i]),
        })
        .collect();

    output::print_header(&format!("Fitted Peaks ({} grids)", rows.len()));
    println!("{}", Table::new(&rows));

    let aligned = result.grids.len() * 2 - result.failures.len();
    output::print_success(&format!(
        "Aligned {} of {} axes",
        aligned,
        result.grids.len() * 2
    ));
}

/// 写出对齐结果；`plot` 为 None 时跳过绘图
pub fn write_alignment(
    result: &AlignmentResult,
    out_dir: &Path,
    plot: Option<&PlotOptions>,
) -> Result<()> {
    common::ensure_dir(out_dir)?;
    common::write_grids(&result.grids, &out_dir.join("origin"))?;

    let peaks_path = out_dir.join("peaks.csv");
    export::peaks_to_csv(result, &peaks_path)?;
    output::print_success(&format!("Peak table saved to '{}'", peaks_path.display()));

    if let Some(options) = plot {
        let plot_path = out_dir.join(format!("aligned.{}", options.extension()));
        plot::plot_grids(
            &result.grids,
            &plot_path,
            AxisDesc {
                x: "Angle (°)",
                y: "Energy loss (eV)",
            },
            options,
        )?;
        output::print_success(&format!("Heatmap saved to '{}'", plot_path.display()));
    }

    Ok(())
}
