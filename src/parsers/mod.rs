//! # 解析器模块
//!
//! 读取谱图 CSV 文件，并为测量序列排序、生成标题。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: grid_csv, naming

pub mod grid_csv;
pub mod naming;

pub use grid_csv::{parse_grid_content, parse_grid_file};
pub use naming::{sort_by_number, title_for, TitleOptions};

use crate::error::Result;
use crate::models::Grid;
use std::path::Path;

/// 读取单个谱图文件并按命名规则赋予标题
pub fn load_grid(path: &Path, titles: &TitleOptions) -> Result<Grid> {
    parse_grid_file(path, &title_for(path, titles))
}
