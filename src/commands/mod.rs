//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `parsers/`, `spectral/`, `utils/`
//! - 子模块: common, align, profile, qconvert, transform, slice, pipeline

pub mod align;
pub mod common;
pub mod pipeline;
pub mod profile;
pub mod qconvert;
pub mod slice;
pub mod transform;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Align(args) => align::execute(args),
        Commands::Profile(args) => profile::execute(args),
        Commands::QConvert(args) => qconvert::execute(args),
        Commands::Transform(args) => transform::execute(args),
        Commands::Slice(args) => slice::execute(args),
        Commands::Pipeline(args) => pipeline::execute(args),
    }
}
