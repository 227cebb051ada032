//! # 谱图 CSV 解析器
//!
//! 解析以首行作列标签、首列作行标签的强度表。
//!
//! ## 格式
//! ```text
//! E_loss,-10.0,-9.5,...,10.0
//! -0.5,12,15,...,9
//! -0.49,13,14,...,11
//! ```
//! - 列标签 / 行标签无法解析为有限数值时，整列 / 整行丢弃
//! - 强度单元格无法解析时记为 NaN
//! - 行长度不足补 NaN，超出表头宽度的单元格忽略
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/grid.rs` 的 Grid
//! - 使用 `csv` crate

use crate::error::{QlossError, Result};
use crate::models::Grid;

use std::fs;
use std::path::Path;

/// 解析数值标签，仅接受有限值
fn parse_label(field: &str) -> Option<f64> {
    field
        .trim()
        .trim_matches('"')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_value(field: &str) -> f64 {
    field.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// 从文件读取网格
pub fn parse_grid_file(path: &Path, title: &str) -> Result<Grid> {
    let content = fs::read_to_string(path).map_err(|e| QlossError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_grid_content(&content, title).map_err(|e| match e {
        QlossError::ParseError { reason, .. } => QlossError::ParseError {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 从文本内容解析网格
pub fn parse_grid_content(content: &str, title: &str) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(QlossError::ParseError {
                path: title.to_string(),
                reason: "empty file".to_string(),
            })
        }
    };

    // (原始列位置, 标签)
    let columns: Vec<(usize, f64)> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(i, field)| parse_label(field).map(|v| (i, v)))
        .collect();

    if columns.is_empty() {
        return Err(QlossError::ParseError {
            path: title.to_string(),
            reason: "no numeric column labels in header".to_string(),
        });
    }

    let mut row_labels = Vec::new();
    let mut values = Vec::new();

    for record in records {
        let record = record?;
        let label = match record.get(0).and_then(parse_label) {
            Some(v) => v,
            None => continue,
        };

        row_labels.push(label);
        values.extend(
            columns
                .iter()
                .map(|&(i, _)| record.get(i).map_or(f64::NAN, parse_value)),
        );
    }

    if row_labels.is_empty() {
        return Err(QlossError::ParseError {
            path: title.to_string(),
            reason: "no rows with numeric labels".to_string(),
        });
    }

    Grid::new(
        title,
        row_labels,
        columns.into_iter().map(|(_, v)| v).collect(),
        values,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic() {
        let content = "\
E,-1.0,0.0,1.0
0.0,1,2,3
0.5,4,5,6
";
        let grid = parse_grid_content(content, "basic").unwrap();
        assert_eq!(grid.title(), "basic");
        assert_eq!(grid.row_labels(), &[0.0, 0.5]);
        assert_eq!(grid.col_labels(), &[-1.0, 0.0, 1.0]);
        assert_eq!(grid.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_drops_non_numeric_labels() {
        let content = "\
,10,note,20,
0.1,1,x,2,9
total,5,5,5,5
0.2,3,y,bad
,7,7,7,7
";
        let grid = parse_grid_content(content, "dirty").unwrap();
        assert_eq!(grid.col_labels(), &[10.0, 20.0]);
        assert_eq!(grid.row_labels(), &[0.1, 0.2]);
        assert_eq!(grid.row(0), &[1.0, 2.0]);
        assert!(grid.get(1, 1).is_nan());
        assert_eq!(grid.get(1, 0), 3.0);
    }

    #[test]
    fn test_short_rows_padded() {
        let content = "i,1,2,3\n0,1\n";
        let grid = parse_grid_content(content, "short").unwrap();
        assert_eq!(grid.get(0, 0), 1.0);
        assert!(grid.get(0, 1).is_nan());
        assert!(grid.get(0, 2).is_nan());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            parse_grid_content("", "e"),
            Err(QlossError::ParseError { .. })
        ));
        assert!(matches!(
            parse_grid_content("a,b,c\n1,2,3\n", "e"),
            Err(QlossError::ParseError { .. })
        ));
        assert!(matches!(
            parse_grid_content("a,1,2\nx,2,3\n", "e"),
            Err(QlossError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "E,0.5,1.5").unwrap();
        writeln!(file, "2.0,7,8").unwrap();
        let grid = parse_grid_file(file.path(), "from-file").unwrap();
        assert_eq!(grid.values(), &[7.0, 8.0]);
    }
}
