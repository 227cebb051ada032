//! # 批量处理模块
//!
//! 提供谱图文件的批量收集与并行读取。
//!
//! ## 功能
//! - 自动检测输入类型（文件/目录）
//! - 收集匹配文件列表
//! - 并行处理，结果保持输入顺序
//! - 进度反馈与失败汇总
//!
//! ## 依赖关系
//! - 被 `commands/common.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner};
