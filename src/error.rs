//! # 统一错误处理模块
//!
//! 定义 qloss 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误策略
//! - 单个谱图的拟合/转换失败（`InsufficientData`、`FitDivergence`、
//!   `InvalidElasticEnergy`）在批处理层被捕获，记录为该谱图的缺失结果
//! - `InvalidParameter` 属于调用错误，立即向上传播
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// qloss 统一错误类型
#[derive(Error, Debug)]
pub enum QlossError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse grid file: {path}\nReason: {reason}")]
    ParseError { path: String, reason: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 网格形状错误
    // ─────────────────────────────────────────────────────────────
    #[error("Grid shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Grid '{title}' has no data left (rows: {rows}, cols: {cols})")]
    EmptyGrid {
        title: String,
        rows: usize,
        cols: usize,
    },

    // ─────────────────────────────────────────────────────────────
    // 拟合与转换错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Not enough finite samples for fitting: found {found}, need at least {required}")]
    InsufficientData { found: usize, required: usize },

    #[error("Peak fit diverged: {0}")]
    FitDivergence(String),

    #[error("Invalid elastic energy E0 = {value:?} for '{title}' (must be finite and > 0)")]
    InvalidElasticEnergy { title: String, value: Option<f64> },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    // ─────────────────────────────────────────────────────────────
    // 绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("Plot error: {0}")]
    PlotError(String),
}

impl QlossError {
    /// 是否为单个谱图可跳过的错误（批处理中不中断整体流程）
    pub fn is_per_grid(&self) -> bool {
        matches!(
            self,
            QlossError::InsufficientData { .. }
                | QlossError::FitDivergence(_)
                | QlossError::InvalidElasticEnergy { .. }
                | QlossError::EmptyGrid { .. }
        )
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, QlossError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_grid_classification() {
        assert!(QlossError::FitDivergence("x".into()).is_per_grid());
        assert!(QlossError::InsufficientData {
            found: 1,
            required: 3
        }
        .is_per_grid());
        assert!(!QlossError::InvalidParameter("bogus".into()).is_per_grid());
    }
}
