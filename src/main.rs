//! # qloss - 角分辨能量损失谱图处理工具
//!
//! 将电子能量损失谱图（行：能量损失，列：散射角）批量对齐到峰位原点，
//! 并把散射角转换为动量转移 q。
//!
//! ## 子命令
//! - `align`     - 原点对齐
//! - `profile`   - 剖面峰拟合
//! - `qconvert`  - 角度 → q 转换
//! - `transform` - 翻转 / 旋转
//! - `slice`     - 线切
//! - `pipeline`  - 对齐 → q 转换 → 变换
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (文件收集与并行读取)
//!   │     ├── parsers/   (谱图 CSV 解析与标题)
//!   │     ├── spectral/  (拟合、对齐、q 转换、变换、绘图、导出)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod spectral;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
