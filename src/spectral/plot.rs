//! # 图表生成
//!
//! 使用 `plotters` 库绘制谱图批次的热图、剖面拟合图和线切图。
//!
//! ## 功能
//! - 多个谱图按子图网格排列，共用一张画布
//! - 可选 log(1 + I) 强度缩放，可按标签范围裁剪视图
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/` 模块调用
//! - 使用 `models/grid.rs` 的 Grid
//! - 使用 `spectral/profile.rs`、`spectral/slice.rs` 的结果结构
//! - 使用 `plotters` 渲染图表

use crate::error::{QlossError, Result};
use crate::models::{Grid, LabelRange};
use crate::spectral::profile::{PeakFit, Profile};
use crate::spectral::slice::LineCut;

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// 绘图选项
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    /// 子图列数
    pub columns: usize,
    /// 使用 log(1 + I) 着色
    pub log_scale: bool,
    pub x_range: LabelRange,
    pub y_range: LabelRange,
    pub svg: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1000,
            columns: 3,
            log_scale: true,
            x_range: LabelRange::default(),
            y_range: LabelRange::default(),
            svg: false,
        }
    }
}

impl PlotOptions {
    /// 输出文件扩展名
    pub fn extension(&self) -> &'static str {
        if self.svg {
            "svg"
        } else {
            "png"
        }
    }
}

/// 坐标轴说明文字
#[derive(Debug, Clone, Copy)]
pub struct AxisDesc<'a> {
    pub x: &'a str,
    pub y: &'a str,
}

fn plot_err<E: std::fmt::Debug>(e: E) -> QlossError {
    QlossError::PlotError(format!("{:?}", e))
}

// inferno 色图的采样点
const INFERNO: [(u8, u8, u8); 9] = [
    (0, 0, 4),
    (31, 12, 72),
    (85, 15, 109),
    (136, 34, 106),
    (186, 54, 85),
    (227, 89, 51),
    (249, 140, 10),
    (249, 201, 50),
    (252, 255, 164),
];

/// 将 [0, 1] 映射到色图颜色
pub fn colormap(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (INFERNO.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(INFERNO.len() - 2);
    let frac = scaled - lo as f64;
    let (a, b) = (INFERNO[lo], INFERNO[lo + 1]);
    let mix = |x: u8, y: u8| (x as f64 + frac * (y as f64 - x as f64)).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn scale_intensity(value: f64, log_scale: bool) -> f64 {
    if log_scale {
        value.max(0.0).ln_1p()
    } else {
        value
    }
}

/// 每个标签所占单元格的边界（取与相邻标签的中点）
fn cell_edges(labels: &[f64]) -> Vec<(f64, f64)> {
    let n = labels.len();
    (0..n)
        .map(|i| {
            let half_left = if i > 0 {
                (labels[i] - labels[i - 1]) / 2.0
            } else if n > 1 {
                (labels[1] - labels[0]) / 2.0
            } else {
                0.5
            };
            let half_right = if i + 1 < n {
                (labels[i + 1] - labels[i]) / 2.0
            } else {
                half_left
            };
            (labels[i] - half_left, labels[i] + half_right)
        })
        .collect()
}

fn edge_span(edges: &[(f64, f64)]) -> (f64, f64) {
    let (lo, hi) = edges
        .iter()
        .flat_map(|&(a, b)| [a, b])
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo < hi {
        (lo, hi)
    } else if lo.is_finite() {
        (lo - 0.5, lo + 0.5)
    } else {
        (0.0, 1.0)
    }
}

/// 生成谱图批次热图
pub fn plot_grids(
    grids: &[Grid],
    output_path: &Path,
    desc: AxisDesc<'_>,
    options: &PlotOptions,
) -> Result<()> {
    if options.svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_grid_panels(&root, grids, desc, options)?;
        root.present()
            .map_err(|e| QlossError::PlotError(e.to_string()))?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_grid_panels(&root, grids, desc, options)?;
        root.present()
            .map_err(|e| QlossError::PlotError(e.to_string()))?;
    }
    Ok(())
}

fn draw_grid_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    grids: &[Grid],
    desc: AxisDesc<'_>,
    options: &PlotOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    if grids.is_empty() {
        return Ok(());
    }

    let columns = options.columns.clamp(1, grids.len());
    let rows = grids.len().div_ceil(columns);
    let panels = root.split_evenly((rows, columns));

    for (grid, panel) in grids.iter().zip(panels.iter()) {
        match grid.crop(options.x_range, options.y_range) {
            Ok(view) => draw_heatmap(panel, &view, desc, options.log_scale)?,
            Err(_) => {
                panel
                    .titled(
                        &format!("{} (no data in range)", grid.title()),
                        ("sans-serif", 18),
                    )
                    .map_err(plot_err)?;
            }
        }
    }

    Ok(())
}

/// 绘制单个热图面板
fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    grid: &Grid,
    desc: AxisDesc<'_>,
    log_scale: bool,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let x_edges = cell_edges(grid.col_labels());
    let y_edges = cell_edges(grid.row_labels());
    let (x_min, x_max) = edge_span(&x_edges);
    let (y_min, y_max) = edge_span(&y_edges);

    let (v_min, v_max) = grid
        .value_range()
        .map(|(lo, hi)| (scale_intensity(lo, log_scale), scale_intensity(hi, log_scale)))
        .unwrap_or((0.0, 1.0));
    let span = if v_max > v_min { v_max - v_min } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption(grid.title(), ("sans-serif", 18).into_font())
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(desc.x)
        .y_desc(desc.y)
        .x_label_style(("sans-serif", 12))
        .y_label_style(("sans-serif", 12))
        .axis_desc_style(("sans-serif", 14))
        .draw()
        .map_err(plot_err)?;

    let cells = (0..grid.rows()).flat_map(|r| {
        let x_edges = &x_edges;
        let (y0, y1) = y_edges[r];
        (0..grid.cols()).filter_map(move |c| {
            let value = grid.get(r, c);
            if !value.is_finite() {
                return None;
            }
            let t = (scale_intensity(value, log_scale) - v_min) / span;
            let (x0, x1) = x_edges[c];
            Some(Rectangle::new([(x0, y0), (x1, y1)], colormap(t).filled()))
        })
    });

    chart.draw_series(cells).map_err(plot_err)?;

    Ok(())
}

/// 生成剖面拟合图：数据点、拟合曲线与半高全宽标记
pub fn plot_profile(
    profile: &Profile,
    fit: Option<&PeakFit>,
    output_path: &Path,
    title: &str,
    x_desc: &str,
    options: &PlotOptions,
) -> Result<()> {
    if options.svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_profile_chart(&root, profile, fit, title, x_desc)?;
        root.present()
            .map_err(|e| QlossError::PlotError(e.to_string()))?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_profile_chart(&root, profile, fit, title, x_desc)?;
        root.present()
            .map_err(|e| QlossError::PlotError(e.to_string()))?;
    }
    Ok(())
}

fn finite_span<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo < hi {
        (lo, hi)
    } else if lo.is_finite() {
        (lo - 0.5, lo + 0.5)
    } else {
        (0.0, 1.0)
    }
}

fn draw_profile_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    profile: &Profile,
    fit: Option<&PeakFit>,
    title: &str,
    x_desc: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let curve = fit.map(|f| f.curve(profile)).unwrap_or_default();

    let (x_min, x_max) = finite_span(profile.labels.iter().copied());
    let (y_lo, y_hi) = finite_span(
        profile
            .values
            .iter()
            .copied()
            .chain(curve.iter().map(|&(_, y)| y)),
    );
    let pad = (y_hi - y_lo) * 0.05;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, (y_lo - pad)..(y_hi + pad))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Intensity")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_err)?;

    let point_color = RGBColor(0, 102, 204);
    chart
        .draw_series(
            profile
                .labels
                .iter()
                .zip(&profile.values)
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .map(|(&x, &y)| Circle::new((x, y), 3, point_color.filled())),
        )
        .map_err(plot_err)?
        .label("data")
        .legend(move |(x, y)| Circle::new((x + 10, y), 3, point_color.filled()));

    if let Some(fit) = fit {
        let fit_color = RGBColor(204, 51, 0);
        chart
            .draw_series(LineSeries::new(
                curve.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite()),
                fit_color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label(format!("{} fit", fit.shape))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], fit_color));

        // 半高全宽位置（标签单位）
        let half = fit.amplitude / 2.0;
        let half_width = fit.fwhm / 2.0;
        if half.is_finite() && half_width.is_finite() {
            let marker = BLACK.mix(0.6);
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![
                        (fit.center_label - half_width, half),
                        (fit.center_label + half_width, half),
                    ],
                    marker.stroke_width(2),
                )))
                .map_err(plot_err)?
                .label(format!("FWHM = {:.4}", fit.fwhm))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], marker));
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

const PALETTE: [RGBColor; 6] = [
    RGBColor(0, 102, 204),
    RGBColor(204, 51, 0),
    RGBColor(0, 153, 76),
    RGBColor(153, 51, 204),
    RGBColor(230, 140, 0),
    RGBColor(64, 64, 64),
];

/// 生成线切对比图
pub fn plot_line_cuts(
    cuts: &[LineCut],
    output_path: &Path,
    title: &str,
    x_desc: &str,
    options: &PlotOptions,
) -> Result<()> {
    if options.svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_line_cuts(&root, cuts, title, x_desc)?;
        root.present()
            .map_err(|e| QlossError::PlotError(e.to_string()))?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_line_cuts(&root, cuts, title, x_desc)?;
        root.present()
            .map_err(|e| QlossError::PlotError(e.to_string()))?;
    }
    Ok(())
}

fn draw_line_cuts<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    cuts: &[LineCut],
    title: &str,
    x_desc: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let (x_min, x_max) = finite_span(cuts.iter().flat_map(|c| c.labels.iter().copied()));
    let (y_lo, y_hi) = finite_span(cuts.iter().flat_map(|c| c.values.iter().copied()));
    let pad = (y_hi - y_lo) * 0.05;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, (y_lo - pad)..(y_hi + pad))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Intensity")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_err)?;

    for (i, cut) in cuts.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(
                cut.labels
                    .iter()
                    .zip(&cut.values)
                    .filter(|(x, y)| x.is_finite() && y.is_finite())
                    .map(|(&x, &y)| (x, y)),
                color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label(cut.title.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(colormap(0.0), RGBColor(0, 0, 4));
        assert_eq!(colormap(1.0), RGBColor(252, 255, 164));
        assert_eq!(colormap(f64::NAN), RGBColor(0, 0, 4));
        assert_eq!(colormap(7.0), RGBColor(252, 255, 164));
    }

    #[test]
    fn test_cell_edges_descending() {
        let edges = cell_edges(&[2.0, 1.0, 0.0]);
        assert_eq!(edges[0], (2.5, 1.5));
        assert_eq!(edges[1], (1.5, 0.5));
        assert_eq!(edges[2], (0.5, -0.5));
        assert_eq!(edge_span(&edges), (-0.5, 2.5));
    }

    #[test]
    fn test_svg_heatmap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg");
        let grid = Grid::new(
            "10 K",
            vec![0.0, 1.0],
            vec![-1.0, 0.0, 1.0],
            vec![1.0, 4.0, 1.0, 2.0, 8.0, f64::NAN],
        )
        .unwrap();
        let options = PlotOptions {
            width: 400,
            height: 300,
            svg: true,
            ..Default::default()
        };
        plot_grids(
            &[grid.clone(), grid.with_title("20 K")],
            &path,
            AxisDesc { x: "angle", y: "E" },
            &options,
        )
        .unwrap();
        assert!(path.exists());
    }
}
