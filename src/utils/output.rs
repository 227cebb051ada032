//! # 美化输出工具
//!
//! 提供统一的终端输出样式，替代日志框架：
//! 逐谱图的失败以 `[WARN]` / `[SKIP]` 报告，致命错误以 `[ERR]` 报告。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块与 `main.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印单个谱图的可跳过失败
pub fn print_grid_warning(title: &str, reason: impl std::fmt::Display) {
    println!("{} {}: {}", "[WARN]".yellow().bold(), title.bold(), reason);
}

/// 打印跳过消息
pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// 表格单元格：缺失值显示为 `-`
pub fn fmt_cell(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_cell() {
        assert_eq!(fmt_cell(Some(1.23456)), "1.2346");
        assert_eq!(fmt_cell(None), "-");
    }
}
