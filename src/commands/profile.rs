//! # profile 子命令实现
//!
//! 沿指定方向压缩每个谱图并拟合峰形，报告峰位与半高全宽。
//!
//! ## 输出
//! - `<out>/<axis>_peaks.csv`: 拟合表
//! - `<out>/<axis>/<title>.csv`: 剖面与拟合曲线
//! - `<out>/<axis>/<title>.png`: 剖面拟合图
//!
//! ## 依赖关系
//! - 使用 `cli/align.rs` 定义的 ProfileArgs
//! - 使用 `spectral/profile.rs` 进行拟合

use crate::cli::align::ProfileArgs;
use crate::commands::common;
use crate::error::Result;
use crate::models::Axis;
use crate::spectral::{export, plot, profile, LineShape, ReduceMethod};
use crate::utils::{output, progress};

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct FitRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Center")]
    center: String,
    #[tabled(rename = "FWHM")]
    fwhm: String,
    #[tabled(rename = "Amplitude")]
    amplitude: String,
    #[tabled(rename = "Iter")]
    iterations: String,
}

/// 执行剖面拟合
pub fn execute(args: ProfileArgs) -> Result<()> {
    output::print_header("Profile Peak Fitting");

    let grids = common::load_batch(&args.input)?;
    let axis: Axis = args.axis.into();
    let method: ReduceMethod = args.fit.method.into();
    let shape: LineShape = args.fit.shape.into();
    let options = common::fit_options(&args.fit)?;
    let plot_options = common::plot_options(&args.plot)?;

    output::print_info(&format!(
        "Fitting {} profiles along {} ({} reduction, {} peak)",
        grids.len(),
        axis,
        method,
        shape
    ));

    let spinner = progress::create_spinner("Fitting profiles");
    let fits = profile::fit_batch(&grids, axis, method, shape, &options);
    spinner.finish_and_clear();

    let mut rows = Vec::with_capacity(grids.len());
    for (grid, fit) in grids.iter().zip(&fits) {
        match fit {
            Ok(f) => rows.push(FitRow {
                title: grid.title().to_string(),
                center: format!("{:.4}", f.center_label),
                fwhm: format!("{:.4}", f.fwhm),
                amplitude: format!("{:.4e}", f.amplitude),
                iterations: f.iterations.to_string(),
            }),
            Err(e) => output::print_grid_warning(grid.title(), e),
        }
    }

    if !rows.is_empty() {
        output::print_header(&format!("Fitted {} Peaks ({} of {})", axis, rows.len(), grids.len()));
        println!("{}", Table::new(&rows));
    }

    let axis_name = axis.to_string();
    let detail_dir = args.output.join(&axis_name);
    common::ensure_dir(&detail_dir)?;

    let table_path = args.output.join(format!("{}_peaks.csv", axis_name));
    export::fits_to_csv(&grids, &fits, &table_path)?;
    output::print_success(&format!("Fit table saved to '{}'", table_path.display()));

    let x_desc = match axis {
        Axis::X => "Angle (°)",
        Axis::Y => "Energy loss (eV)",
    };

    for (grid, fit) in grids.iter().zip(&fits) {
        let reduced = profile::reduce(grid, axis, method);
        let fit = fit.as_ref().ok();
        export::profile_to_csv(&reduced, fit, &common::grid_path(&detail_dir, grid, "csv"))?;

        if !args.plot.no_plot {
            plot::plot_profile(
                &reduced,
                fit,
                &common::grid_path(&detail_dir, grid, plot_options.extension()),
                grid.title(),
                x_desc,
                &plot_options,
            )?;
        }
    }

    output::print_done(&format!(
        "Profiles saved to '{}'",
        detail_dir.display()
    ));
    Ok(())
}
