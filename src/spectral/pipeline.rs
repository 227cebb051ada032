//! # 处理流水线
//!
//! 将对齐、q 转换、方向变换串联为显式状态传递的阶段函数：
//! 每个阶段消费一个 `PipelineState`，返回新的状态与本阶段的详细结果。
//!
//! ## 依赖关系
//! - 被 `commands/pipeline.rs` 调用
//! - 使用 `spectral/align.rs`、`spectral/qconvert.rs`、`spectral/transform.rs`

use crate::error::Result;
use crate::models::{PipelineState, Stage};
use crate::spectral::align::{self, AlignConfig, AlignmentResult};
use crate::spectral::qconvert::{self, AxisConversionResult};
use crate::spectral::transform::{self, Transform, TransformOptions};

/// q 转换阶段中单个谱图的摘要
#[derive(Debug, Clone)]
pub struct QStepReport {
    pub title: String,
    pub e0: Option<f64>,
    pub axis: Option<AxisConversionResult>,
    pub error: Option<String>,
}

/// 原点对齐；拟合得到的 Y 峰位作为各谱图的弹性峰能量
pub fn align_step(
    state: PipelineState,
    config: &AlignConfig,
) -> Result<(PipelineState, AlignmentResult)> {
    let result = align::align(&state.grids, config)?;

    let next = PipelineState {
        stage: Stage::Aligned,
        grids: result.grids.clone(),
        elastic_energies: result.y_peaks.clone(),
        skipped: state.skipped,
    };

    Ok((next, result))
}

/// q 转换；失败的谱图移出状态并记入 `skipped`
pub fn qconvert_step(state: PipelineState) -> (PipelineState, Vec<QStepReport>) {
    let results = qconvert::convert(&state.grids, &state.elastic_energies);

    let mut grids = Vec::with_capacity(results.len());
    let mut energies = Vec::with_capacity(results.len());
    let mut skipped = state.skipped;
    let mut reports = Vec::with_capacity(results.len());

    for ((grid, e0), result) in state
        .grids
        .iter()
        .zip(state.elastic_energies.iter())
        .zip(results)
    {
        match result {
            Ok(conv) => {
                reports.push(QStepReport {
                    title: grid.title().to_string(),
                    e0: Some(conv.e0),
                    axis: Some(conv.axis),
                    error: None,
                });
                energies.push(Some(conv.e0));
                grids.push(conv.grid);
            }
            Err(e) => {
                skipped.push((grid.title().to_string(), e.to_string()));
                reports.push(QStepReport {
                    title: grid.title().to_string(),
                    e0: *e0,
                    axis: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let next = PipelineState {
        stage: Stage::QConverted,
        grids,
        elastic_energies: energies,
        skipped,
    };

    (next, reports)
}

/// 方向变换
pub fn transform_step(
    state: PipelineState,
    action: Transform,
    options: TransformOptions,
) -> PipelineState {
    PipelineState {
        stage: Stage::Transformed,
        grids: transform::apply_batch(&state.grids, action, options),
        elastic_energies: state.elastic_energies,
        skipped: state.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grid;
    use crate::spectral::lineshape::gaussian;

    fn measurement(title: &str, e0: f64) -> Grid {
        // 行：绝对能量，弹性峰位于 e0；列：角度 -10°..10°
        let rows: Vec<f64> = (0..41).map(|i| e0 - 2.0 + 0.1 * i as f64).collect();
        let cols: Vec<f64> = (0..41).map(|i| -10.0 + 0.5 * i as f64 + 1.0).collect();
        let values = rows
            .iter()
            .flat_map(|&e| {
                cols.iter()
                    .map(move |&a| gaussian(e, 100.0, e0, 0.3) * gaussian(a, 1.0, 1.0, 3.0))
            })
            .collect();
        Grid::new(title, rows, cols, values).unwrap()
    }

    #[test]
    fn test_align_then_convert() {
        let state = PipelineState::new(vec![measurement("20 K", 15.0), measurement("40 K", 15.5)]);
        let (aligned, result) = align_step(state, &AlignConfig::default()).unwrap();

        assert_eq!(aligned.stage, Stage::Aligned);
        assert!(result.failures.is_empty());
        let e0 = aligned.elastic_energies[1].unwrap();
        assert!((e0 - 15.5).abs() < 1e-3);

        let (converted, reports) = qconvert_step(aligned);
        assert_eq!(converted.stage, Stage::QConverted);
        assert_eq!(converted.len(), 2);
        assert!(reports.iter().all(|r| r.error.is_none()));
        for grid in &converted.grids {
            assert!(grid.col_labels().windows(2).all(|w| w[0] <= w[1]));
        }

        let flipped = transform_step(
            converted,
            Transform::FlipVertical,
            TransformOptions::default(),
        );
        assert_eq!(flipped.stage, Stage::Transformed);
        assert_eq!(flipped.len(), 2);
    }

    #[test]
    fn test_missing_energy_is_skipped() {
        let state = PipelineState::new(vec![measurement("a", 10.0), measurement("b", 12.0)])
            .with_elastic_energies(&[10.0]);
        let (next, reports) = qconvert_step(state);
        assert_eq!(next.len(), 1);
        assert_eq!(next.skipped.len(), 1);
        assert_eq!(next.skipped[0].0, "b");
        assert!(reports[1].error.is_some());
    }
}
