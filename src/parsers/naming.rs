//! # 文件排序与标题
//!
//! 测量序列的文件名通常带有温度等编号（如 `scan_150K.csv`），
//! 按文件名中第一个整数排序，并据此生成谱图标题（如 `150 K`）。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `regex` crate

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 标题生成选项
#[derive(Debug, Clone)]
pub struct TitleOptions {
    pub prefix: String,
    pub suffix: String,
    /// 直接使用文件名（不含扩展名）作为标题
    pub raw: bool,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: " K".to_string(),
            raw: false,
        }
    }
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// 文件名中第一个整数
pub fn first_number(name: &str) -> Option<u64> {
    number_regex()
        .find(name)
        .and_then(|m| m.as_str().parse().ok())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 按文件名中的第一个整数升序排序；无数字的文件排在最后
pub fn sort_by_number(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by(|a, b| {
        let (na, nb) = (file_name(a), file_name(b));
        match (first_number(&na), first_number(&nb)) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| na.cmp(&nb)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => na.cmp(&nb),
        }
    });
    paths
}

/// 根据文件名生成谱图标题
pub fn title_for(path: &Path, options: &TitleOptions) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    if options.raw {
        return stem;
    }

    let number = number_regex()
        .find(&stem)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "K0000".to_string());

    format!("{}{}{}", options.prefix, number, options.suffix)
}

/// 由标题生成安全的文件名（去掉空白与路径分隔符）
pub fn file_stem_for_title(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "grid".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_number() {
        let paths = vec![
            PathBuf::from("data/scan_300K.csv"),
            PathBuf::from("data/notes.csv"),
            PathBuf::from("data/scan_20K.csv"),
            PathBuf::from("data/scan_100K.csv"),
        ];
        let sorted = sort_by_number(paths);
        let names: Vec<String> = sorted.iter().map(|p| file_name(p)).collect();
        assert_eq!(
            names,
            vec!["scan_20K.csv", "scan_100K.csv", "scan_300K.csv", "notes.csv"]
        );
    }

    #[test]
    fn test_titles() {
        let opts = TitleOptions::default();
        assert_eq!(title_for(Path::new("x/run150_a.csv"), &opts), "150 K");
        assert_eq!(title_for(Path::new("x/ref.csv"), &opts), "K0000 K");

        let raw = TitleOptions {
            raw: true,
            ..Default::default()
        };
        assert_eq!(title_for(Path::new("x/run150_a.csv"), &raw), "run150_a");
    }

    #[test]
    fn test_file_stem_for_title() {
        assert_eq!(file_stem_for_title("150 K"), "150_K");
        assert_eq!(file_stem_for_title("a/b"), "a_b");
        assert_eq!(file_stem_for_title("  "), "grid");
    }
}
