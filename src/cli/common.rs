//! # 公共 CLI 参数
//!
//! 各子命令共享的输入、拟合和绘图参数，以及取值枚举与解析函数。
//!
//! ## 依赖关系
//! - 被 `cli/` 下各子命令参数使用
//! - 由 `commands/common.rs` 转换为配置结构

use crate::models::LabelRange;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// 取值枚举
// ─────────────────────────────────────────────────────────────

/// 剖面压缩方式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum MethodArg {
    /// Arithmetic mean of finite cells
    Mean,
    /// Median of finite cells
    Median,
}

/// 峰形
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ShapeArg {
    /// Gaussian peak
    Gaussian,
    /// Lorentzian peak
    Lorentzian,
}

/// 坐标轴
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum AxisArg {
    /// Column axis (angle or q)
    X,
    /// Row axis (energy loss)
    Y,
}

/// 方向变换
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TransformAction {
    /// Reverse row order, negate row labels
    FlipUd,
    /// Reverse column order, negate column labels
    FlipLr,
    /// Rotate 90° counter-clockwise
    RotateCcw,
    /// Rotate 90° clockwise
    RotateCw,
    /// Return the input unchanged
    Reset,
}

/// 图像输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlotFormat {
    /// PNG bitmap
    Png,
    /// SVG vector image
    Svg,
}

// ─────────────────────────────────────────────────────────────
// 参数组
// ─────────────────────────────────────────────────────────────

/// 输入文件参数
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Input: grid CSV file or directory containing grid files
    pub input: PathBuf,

    /// Glob pattern(s) for input files in directory mode, comma separated
    #[arg(short, long, default_value = "*.csv")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Text placed before the number taken from each file name
    #[arg(long, default_value = "")]
    pub title_prefix: String,

    /// Text placed after the number taken from each file name
    #[arg(long, default_value = " K")]
    pub title_suffix: String,

    /// Use the file stem as title instead of the numbered title
    #[arg(long, default_value_t = false)]
    pub raw_titles: bool,
}

/// 剖面拟合参数
#[derive(Args, Debug, Clone)]
pub struct FitArgs {
    /// How profiles are reduced from the grid
    #[arg(long, value_enum, default_value = "mean")]
    pub method: MethodArg,

    /// Peak shape used for fitting
    #[arg(long, value_enum, default_value = "gaussian")]
    pub shape: ShapeArg,

    /// Maximum optimizer iterations per fit
    #[arg(long, default_value_t = 200)]
    pub max_iter: usize,

    /// Time budget per fit in seconds (0 = unlimited)
    #[arg(long, default_value_t = 2.0)]
    pub fit_timeout: f64,
}

/// 绘图参数
#[derive(Args, Debug, Clone)]
pub struct PlotArgs {
    /// Skip plot generation
    #[arg(long, default_value_t = false)]
    pub no_plot: bool,

    /// Image format
    #[arg(long, value_enum, default_value = "png")]
    pub format: PlotFormat,

    /// Color by raw intensity instead of log(1 + I)
    #[arg(long, default_value_t = false)]
    pub no_log: bool,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1600)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1000)]
    pub height: u32,

    /// Visible column-label range, e.g. "-5:5", ":5" or "0:"
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    pub x_range: Option<LabelRange>,

    /// Visible row-label range, e.g. "-0.2:1.5"
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    pub y_range: Option<LabelRange>,

    /// Number of subplot columns
    #[arg(long, default_value_t = 3)]
    pub columns: usize,
}

// ─────────────────────────────────────────────────────────────
// 解析函数
// ─────────────────────────────────────────────────────────────

/// 解析 `a:b` 形式的标签范围，任一端可省略
pub fn parse_range(input: &str) -> Result<LabelRange, String> {
    let (lo, hi) = input
        .split_once(':')
        .ok_or_else(|| format!("Invalid range '{}'. Use 'min:max', ':max' or 'min:'", input))?;

    let bound = |s: &str| -> Result<Option<f64>, String> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| format!("Invalid range bound '{}' in '{}'", s, input))
    };

    let range = LabelRange::new(bound(lo)?, bound(hi)?);
    if let (Some(a), Some(b)) = (range.min, range.max) {
        if a > b {
            return Err(format!("Range '{}' has min > max", input));
        }
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_range("-5:5").unwrap(),
            LabelRange::new(Some(-5.0), Some(5.0))
        );
        assert_eq!(parse_range(":2.5").unwrap(), LabelRange::new(None, Some(2.5)));
        assert_eq!(parse_range("1:").unwrap(), LabelRange::new(Some(1.0), None));
        assert!(parse_range("5").is_err());
        assert!(parse_range("3:1").is_err());
        assert!(parse_range("a:1").is_err());
    }
}
