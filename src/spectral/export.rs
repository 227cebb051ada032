//! # 结果导出
//!
//! 将处理后的谱图与拟合结果写为 CSV。
//!
//! ## 支持格式
//! - 谱图 CSV：左上角为空，首行为列标签，首列为行标签（可被 `parsers/grid_csv.rs` 读回）
//! - 峰位表：每个谱图一行，X/Y 峰位与半高全宽
//! - 拟合表：单轴剖面拟合结果
//! - 剖面与线切：长表格式
//! - q 转换摘要：E0 与 q 轴范围
//!
//! ## 依赖关系
//! - 被 `commands/` 模块调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{QlossError, Result};
use crate::models::Grid;
use crate::spectral::align::AlignmentResult;
use crate::spectral::pipeline::QStepReport;
use crate::spectral::profile::{PeakFit, Profile};
use crate::spectral::slice::LineCut;

use std::path::Path;

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

fn finish(mut wtr: csv::Writer<std::fs::File>, output_path: &Path) -> Result<()> {
    wtr.flush().map_err(|e| QlossError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}

/// 导出单个谱图
pub fn grid_to_csv(grid: &Grid, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    let mut header = Vec::with_capacity(grid.cols() + 1);
    header.push(String::new());
    header.extend(grid.col_labels().iter().map(|l| l.to_string()));
    wtr.write_record(&header)?;

    for (r, label) in grid.row_labels().iter().enumerate() {
        let mut record = Vec::with_capacity(grid.cols() + 1);
        record.push(label.to_string());
        record.extend(grid.row(r).iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }

    finish(wtr, output_path)
}

/// 导出对齐峰位表
pub fn peaks_to_csv(result: &AlignmentResult, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["title", "x_peak", "x_fwhm", "y_peak", "y_fwhm"])?;

    for (i, grid) in result.grids.iter().enumerate() {
        wtr.write_record(&[
            grid.title().to_string(),
            fmt_opt(result.x_peaks[i]),
            fmt_opt(result.x_fwhm[i]),
            fmt_opt(result.y_peaks[i]),
            fmt_opt(result.y_fwhm[i]),
        ])?;
    }

    finish(wtr, output_path)
}

/// 导出单轴剖面拟合表；失败的谱图保留空单元格与原因
pub fn fits_to_csv(grids: &[Grid], fits: &[Result<PeakFit>], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "title",
        "shape",
        "center",
        "fwhm",
        "amplitude",
        "iterations",
        "error",
    ])?;

    for (grid, fit) in grids.iter().zip(fits) {
        let record = match fit {
            Ok(f) => [
                grid.title().to_string(),
                f.shape.to_string(),
                format!("{:.6}", f.center_label),
                format!("{:.6}", f.fwhm),
                format!("{:.6}", f.amplitude),
                f.iterations.to_string(),
                String::new(),
            ],
            Err(e) => [
                grid.title().to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                e.to_string(),
            ],
        };
        wtr.write_record(&record)?;
    }

    finish(wtr, output_path)
}

/// 导出剖面及其拟合曲线
pub fn profile_to_csv(profile: &Profile, fit: Option<&PeakFit>, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["label", "value", "fit"])?;

    let curve = fit.map(|f| f.curve(profile));
    for (i, (label, value)) in profile.labels.iter().zip(&profile.values).enumerate() {
        let fitted = curve.as_ref().map(|c| c[i].1);
        wtr.write_record(&[label.to_string(), value.to_string(), fmt_opt(fitted)])?;
    }

    finish(wtr, output_path)
}

/// 导出一组线切（长表：title, label, value）
pub fn line_cuts_to_csv(cuts: &[LineCut], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["title", "axis", "center", "label", "value"])?;

    for cut in cuts {
        for (label, value) in cut.labels.iter().zip(&cut.values) {
            wtr.write_record(&[
                cut.title.clone(),
                cut.axis.to_string(),
                format!("{:.6}", cut.center),
                label.to_string(),
                value.to_string(),
            ])?;
        }
    }

    finish(wtr, output_path)
}

/// 导出 q 转换摘要
pub fn q_summary_to_csv(reports: &[QStepReport], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["title", "e0", "q_min", "q_max", "valid", "error"])?;

    for report in reports {
        let (q_min, q_max, valid) = match &report.axis {
            Some(axis) => (
                axis.q_values.first().copied(),
                axis.q_values.last().copied(),
                axis.valid.to_string(),
            ),
            None => (None, None, String::new()),
        };
        wtr.write_record(&[
            report.title.clone(),
            fmt_opt(report.e0),
            fmt_opt(q_min),
            fmt_opt(q_max),
            valid,
            report.error.clone().unwrap_or_default(),
        ])?;
    }

    finish(wtr, output_path)
}
