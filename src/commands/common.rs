//! # 命令公共逻辑
//!
//! 读取谱图批次、把 CLI 参数转换为配置结构、写出谱图目录。
//!
//! ## 依赖关系
//! - 被 `commands/` 下各子命令使用
//! - 使用 `batch/` 收集并并行读取文件
//! - 使用 `parsers/` 解析谱图与生成标题

use crate::batch::{BatchRunner, FileCollector};
use crate::cli::common::{
    AxisArg, FitArgs, InputArgs, MethodArg, PlotArgs, PlotFormat, ShapeArg, TransformAction,
};
use crate::error::{QlossError, Result};
use crate::models::{Axis, Grid};
use crate::parsers::{self, naming, TitleOptions};
use crate::spectral::plot::PlotOptions;
use crate::spectral::transform::RotateDirection;
use crate::spectral::{AlignConfig, FitOptions, LineShape, ReduceMethod, Transform};
use crate::utils::output;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────
// 参数转换
// ─────────────────────────────────────────────────────────────

impl From<MethodArg> for ReduceMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Mean => ReduceMethod::Mean,
            MethodArg::Median => ReduceMethod::Median,
        }
    }
}

impl From<ShapeArg> for LineShape {
    fn from(arg: ShapeArg) -> Self {
        match arg {
            ShapeArg::Gaussian => LineShape::Gaussian,
            ShapeArg::Lorentzian => LineShape::Lorentzian,
        }
    }
}

impl From<AxisArg> for Axis {
    fn from(arg: AxisArg) -> Self {
        match arg {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
        }
    }
}

impl From<TransformAction> for Transform {
    fn from(arg: TransformAction) -> Self {
        match arg {
            TransformAction::FlipUd => Transform::FlipVertical,
            TransformAction::FlipLr => Transform::FlipHorizontal,
            TransformAction::RotateCcw => Transform::Rotate(RotateDirection::Ccw),
            TransformAction::RotateCw => Transform::Rotate(RotateDirection::Cw),
            TransformAction::Reset => Transform::Reset,
        }
    }
}

/// 拟合选项
pub fn fit_options(args: &FitArgs) -> Result<FitOptions> {
    if !args.fit_timeout.is_finite() || args.fit_timeout < 0.0 {
        return Err(QlossError::InvalidArgument(format!(
            "--fit-timeout must be >= 0 seconds, got {}",
            args.fit_timeout
        )));
    }
    if args.max_iter == 0 {
        return Err(QlossError::InvalidArgument(
            "--max-iter must be at least 1".to_string(),
        ));
    }

    let timeout = if args.fit_timeout == 0.0 {
        None
    } else {
        Some(Duration::try_from_secs_f64(args.fit_timeout).map_err(|e| {
            QlossError::InvalidArgument(format!(
                "--fit-timeout {} is out of range: {}",
                args.fit_timeout, e
            ))
        })?)
    };

    Ok(FitOptions {
        max_iterations: args.max_iter,
        timeout,
        ..FitOptions::default()
    })
}

/// 对齐配置
pub fn align_config(args: &FitArgs) -> Result<AlignConfig> {
    Ok(AlignConfig {
        method: args.method.into(),
        shape: args.shape.into(),
        fit: fit_options(args)?,
    })
}

/// 绘图选项
pub fn plot_options(args: &PlotArgs) -> Result<PlotOptions> {
    if args.width == 0 || args.height == 0 {
        return Err(QlossError::InvalidArgument(
            "figure width and height must be positive".to_string(),
        ));
    }

    Ok(PlotOptions {
        width: args.width,
        height: args.height,
        columns: args.columns.max(1),
        log_scale: !args.no_log,
        x_range: args.x_range.unwrap_or_default(),
        y_range: args.y_range.unwrap_or_default(),
        svg: args.format == PlotFormat::Svg,
    })
}

/// 将 `--e0` 列表展开为每个谱图一个值：单值广播到全部谱图，
/// 列表较短时其余谱图没有 E0
pub fn expand_e0(values: &[f64], count: usize) -> Result<Vec<Option<f64>>> {
    if values.len() > count {
        return Err(QlossError::InvalidArgument(format!(
            "{} E0 values given for {} grids",
            values.len(),
            count
        )));
    }

    if values.len() == 1 {
        return Ok(vec![Some(values[0]); count]);
    }

    Ok((0..count).map(|i| values.get(i).copied()).collect())
}

// ─────────────────────────────────────────────────────────────
// 输入
// ─────────────────────────────────────────────────────────────

fn title_options(args: &InputArgs) -> TitleOptions {
    TitleOptions {
        prefix: args.title_prefix.clone(),
        suffix: args.title_suffix.clone(),
        raw: args.raw_titles,
    }
}

/// 设置全局并行度（拟合使用 rayon 全局线程池）
fn configure_threads(jobs: usize) {
    let num_threads = if jobs == 0 { num_cpus::get() } else { jobs };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok();
}

/// 重复标题追加序号，保证输出文件名互不覆盖
fn dedupe_titles(grids: Vec<Grid>) -> Vec<Grid> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    grids
        .into_iter()
        .map(|grid| {
            let count = seen.entry(grid.title().to_string()).or_insert(0);
            *count += 1;
            if *count == 1 {
                grid
            } else {
                let title = format!("{} #{}", grid.title(), count);
                grid.with_title(title)
            }
        })
        .collect()
}

/// 收集、排序并并行读取谱图；读取失败的文件给出警告后跳过
pub fn load_batch(args: &InputArgs) -> Result<Vec<Grid>> {
    configure_threads(args.jobs);

    if !args.input.exists() {
        return Err(QlossError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()?;
    let files: Vec<PathBuf> = naming::sort_by_number(files);

    if args.input.is_dir() {
        output::print_info(&format!(
            "Batch mode: {} files in '{}'",
            files.len(),
            args.input.display()
        ));
    } else {
        output::print_info(&format!("Single file mode: '{}'", args.input.display()));
    }

    let titles = title_options(args);
    let runner = BatchRunner::new(args.jobs);
    let batch = runner.run(
        &files,
        "Reading",
        |path| path.display().to_string(),
        |path| parsers::load_grid(path, &titles),
    )?;

    for (path, err) in &batch.failures {
        output::print_warning(&format!("Skipping '{}': {}", path, err));
    }

    if batch.items.is_empty() {
        let (path, reason) = batch.failures.into_iter().next().unwrap_or_default();
        return Err(QlossError::ParseError { path, reason });
    }

    output::print_info(&format!(
        "Loaded {} of {} grids",
        batch.items.len(),
        batch.total()
    ));

    Ok(dedupe_titles(batch.items))
}

// ─────────────────────────────────────────────────────────────
// 输出
// ─────────────────────────────────────────────────────────────

/// 确保输出目录存在
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| QlossError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 谱图对应的输出文件路径
pub fn grid_path(dir: &Path, grid: &Grid, extension: &str) -> PathBuf {
    dir.join(format!(
        "{}.{}",
        naming::file_stem_for_title(grid.title()),
        extension
    ))
}

/// 把每个谱图写为 `<dir>/<title>.csv`
pub fn write_grids(grids: &[Grid], dir: &Path) -> Result<()> {
    ensure_dir(dir)?;
    for grid in grids {
        crate::spectral::export::grid_to_csv(grid, &grid_path(dir, grid, "csv"))?;
    }
    output::print_success(&format!(
        "Wrote {} grid files to '{}'",
        grids.len(),
        dir.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_e0() {
        assert_eq!(expand_e0(&[15.0], 3).unwrap(), vec![Some(15.0); 3]);
        assert_eq!(
            expand_e0(&[1.0, 2.0], 3).unwrap(),
            vec![Some(1.0), Some(2.0), None]
        );
        assert_eq!(expand_e0(&[], 2).unwrap(), vec![None, None]);
        assert!(expand_e0(&[1.0, 2.0, 3.0], 2).is_err());
    }

    #[test]
    fn test_dedupe_titles() {
        let g = Grid::new("10 K", vec![0.0], vec![0.0], vec![1.0]).unwrap();
        let out = dedupe_titles(vec![g.clone(), g.clone(), g]);
        let titles: Vec<&str> = out.iter().map(|g| g.title()).collect();
        assert_eq!(titles, vec!["10 K", "10 K #2", "10 K #3"]);
    }

    #[test]
    fn test_load_batch_orders_by_number() {
        let dir = tempfile::tempdir().unwrap();
        for (name, v) in [("s_300K.csv", 3), ("s_20K.csv", 1), ("s_100K.csv", 2)] {
            fs::write(dir.path().join(name), format!(",0,1\n0,{v},{v}\n1,{v},{v}\n")).unwrap();
        }
        fs::write(dir.path().join("broken.csv"), "no numbers here\n").unwrap();

        let args = InputArgs {
            input: dir.path().to_path_buf(),
            pattern: "*.csv".to_string(),
            recursive: false,
            jobs: 2,
            title_prefix: String::new(),
            title_suffix: " K".to_string(),
            raw_titles: false,
        };
        let grids = load_batch(&args).unwrap();
        let titles: Vec<&str> = grids.iter().map(|g| g.title()).collect();
        assert_eq!(titles, vec!["20 K", "100 K", "300 K"]);
        assert_eq!(grids[2].get(0, 0), 3.0);
    }

    #[test]
    fn test_fit_options_timeout() {
        let args = FitArgs {
            method: MethodArg::Median,
            shape: ShapeArg::Lorentzian,
            max_iter: 50,
            fit_timeout: 0.0,
        };
        let opts = fit_options(&args).unwrap();
        assert!(opts.timeout.is_none());
        assert_eq!(opts.max_iterations, 50);

        let config = align_config(&args).unwrap();
        assert_eq!(config.method, ReduceMethod::Median);
        assert_eq!(config.shape, LineShape::Lorentzian);

        let bad = FitArgs {
            fit_timeout: -1.0,
            ..args
        };
        assert!(fit_options(&bad).is_err());
    }

    #[test]
    fn test_fit_options_timeout_overflow() {
        let args = FitArgs {
            method: MethodArg::Mean,
            shape: ShapeArg::Gaussian,
            max_iter: 200,
            fit_timeout: 1e20,
        };
        let err = fit_options(&args).unwrap_err();
        assert!(matches!(err, QlossError::InvalidArgument(_)));
    }
}
