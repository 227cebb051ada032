//! # qconvert 子命令实现
//!
//! 用给定或拟合得到的弹性峰能量 E0，把列标签由角度转换为 q。
//!
//! ## 输出
//! - `<out>/q/<title>.csv`: 转换后的谱图
//! - `<out>/q_summary.csv`: 每个谱图的 E0 与 q 范围
//! - `<out>/q_map.png`: q 空间热图
//!
//! ## 依赖关系
//! - 使用 `cli/qconvert.rs` 定义的 QConvertArgs
//! - 使用 `spectral/pipeline.rs` 的 q 转换阶段

use crate::cli::qconvert::QConvertArgs;
use crate::commands::common;
use crate::error::Result;
use crate::models::{Axis, Grid, PipelineState};
use crate::spectral::pipeline::{self, QStepReport};
use crate::spectral::plot::{self, AxisDesc, PlotOptions};
use crate::spectral::{export, profile};
use crate::utils::{output, progress};

use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct QRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "E0 (eV)")]
    e0: String,
    #[tabled(rename = "q min (1/Å)")]
    q_min: String,
    #[tabled(rename = "q max (1/Å)")]
    q_max: String,
    #[tabled(rename = "Valid")]
    valid: String,
}

/// 执行 q 转换
pub fn execute(args: QConvertArgs) -> Result<()> {
    output::print_header("Momentum Transfer Conversion");

    let grids = common::load_batch(&args.input)?;
    let plot_options = common::plot_options(&args.plot)?;

    let energies = if args.fit_e0 {
        fit_elastic_energies(&grids, &args)?
    } else {
        common::expand_e0(&args.e0, grids.len())?
    };

    let mut state = PipelineState::new(grids);
    state.elastic_energies = energies;

    let (state, reports) = pipeline::qconvert_step(state);
    report_qconversion(&reports);
    write_qconversion(
        &state.grids,
        &reports,
        &args.output,
        (!args.plot.no_plot).then_some(&plot_options),
    )?;

    output::print_done(&format!("Results saved to '{}'", args.output.display()));
    Ok(())
}

/// 以 Y 剖面峰位作为 E0
fn fit_elastic_energies(grids: &[Grid], args: &QConvertArgs) -> Result<Vec<Option<f64>>> {
    let options = common::fit_options(&args.fit)?;

    let spinner = progress::create_spinner("Fitting elastic peaks");
    let fits = profile::fit_batch(
        grids,
        Axis::Y,
        args.fit.method.into(),
        args.fit.shape.into(),
        &options,
    );
    spinner.finish_and_clear();

    Ok(grids
        .iter()
        .zip(fits)
        .map(|(grid, fit)| match fit {
            Ok(f) => Some(f.center_label),
            Err(e) => {
                output::print_grid_warning(grid.title(), format!("no elastic peak ({})", e));
                None
            }
        })
        .collect())
}

/// 打印 q 转换摘要表；跳过的谱图给出警告
pub fn report_qconversion(reports: &[QStepReport]) {
    let mut rows = Vec::with_capacity(reports.len());

    for report in reports {
        match (&report.axis, &report.error) {
            (Some(axis), _) => {
                if !axis.valid {
                    output::print_grid_warning(
                        &report.title,
                        "no positive q on the axis, labels left as computed",
                    );
                }
                rows.push(QRow {
                    title: report.title.clone(),
                    e0: output::fmt_cell(report.e0),
                    q_min: output::fmt_cell(axis.q_values.first().copied()),
                    q_max: output::fmt_cell(axis.q_values.last().copied()),
                    valid: (if axis.valid { "yes" } else { "no" }).to_string(),
                });
            }
            (None, Some(err)) => {
                output::print_skip(&format!("{}: {}", report.title, err));
            }
            (None, None) => {}
        }
    }

    if !rows.is_empty() {
        output::print_header(&format!(
            "q Conversion ({} of {} grids)",
            rows.len(),
            reports.len()
        ));
        println!("{}", Table::new(&rows));
    }
}

/// 写出 q 转换结果；`plot` 为 None 时跳过绘图
pub fn write_qconversion(
    grids: &[Grid],
    reports: &[QStepReport],
    out_dir: &Path,
    plot: Option<&PlotOptions>,
) -> Result<()> {
    common::ensure_dir(out_dir)?;
    common::write_grids(grids, &out_dir.join("q"))?;

    let summary_path = out_dir.join("q_summary.csv");
    export::q_summary_to_csv(reports, &summary_path)?;
    output::print_success(&format!("Summary saved to '{}'", summary_path.display()));

    if let Some(options) = plot {
        if grids.is_empty() {
            output::print_warning("No converted grids to plot");
            return Ok(());
        }
        let plot_path = out_dir.join(format!("q_map.{}", options.extension()));
        plot::plot_grids(
            grids,
            &plot_path,
            AxisDesc {
                x: "q (1/Å)",
                y: "Energy loss (eV)",
            },
            options,
        )?;
        output::print_success(&format!("Heatmap saved to '{}'", plot_path.display()));
    }

    Ok(())
}
