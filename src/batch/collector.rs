//! # 文件收集器
//!
//! 根据输入路径和模式收集待处理的谱图文件。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - 逗号分隔的多个 glob 模式
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/common.rs` 调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `glob` 匹配文件名

use crate::error::{QlossError, Result};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认匹配模式
pub const DEFAULT_PATTERN: &str = "*.csv";

/// 文件收集器
pub struct FileCollector {
    input: PathBuf,
    patterns: Vec<glob::Pattern>,
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器（默认匹配 `*.csv`）
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec![glob::Pattern::new(DEFAULT_PATTERN).expect("valid default pattern")],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                glob::Pattern::new(s).map_err(|e| {
                    QlossError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if !patterns.is_empty() {
            self.patterns = patterns;
        }
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（未排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        if !self.input.is_dir() {
            return Err(QlossError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        if files.is_empty() {
            return Err(QlossError::NoFilesFound {
                pattern: self
                    .patterns
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }

        Ok(files)
    }

    /// 检查文件名是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.patterns.iter().any(|p| p.matches(name)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_with_patterns() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a_10K.csv", "b_20K.csv", "notes.txt", "c.dat"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("d_5K.csv"), "x").unwrap();

        let flat = FileCollector::new(dir.path().to_path_buf()).collect().unwrap();
        assert_eq!(flat.len(), 2);

        let deep = FileCollector::new(dir.path().to_path_buf())
            .recursive(true)
            .collect()
            .unwrap();
        assert_eq!(deep.len(), 3);

        let multi = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.csv, *.dat")
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(multi.len(), 3);
    }

    #[test]
    fn test_no_match_and_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let err = FileCollector::new(dir.path().to_path_buf()).collect().unwrap_err();
        assert!(matches!(err, QlossError::NoFilesFound { .. }));

        let err = FileCollector::new(dir.path().join("missing")).collect().unwrap_err();
        assert!(matches!(err, QlossError::DirectoryNotFound { .. }));

        assert!(FileCollector::new(dir.path().to_path_buf())
            .with_pattern("[")
            .is_err());
    }
}
