//! # 流水线状态
//!
//! 显式保存"最近一次处理结果"，由调用者在各阶段之间传递，
//! 不使用任何进程级全局缓存。
//!
//! ## 依赖关系
//! - 被 `spectral/pipeline.rs`、`commands/pipeline.rs` 使用
//! - 使用 `models/grid.rs` 的 Grid

use crate::models::Grid;

/// 当前所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    Aligned,
    QConverted,
    Transformed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Raw => write!(f, "raw"),
            Stage::Aligned => write!(f, "aligned"),
            Stage::QConverted => write!(f, "q-converted"),
            Stage::Transformed => write!(f, "transformed"),
        }
    }
}

/// 流水线状态
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub stage: Stage,
    pub grids: Vec<Grid>,
    /// 每个谱图的弹性峰能量 E0 (eV)，与 `grids` 一一对应
    pub elastic_energies: Vec<Option<f64>>,
    /// 被跳过的谱图及原因
    pub skipped: Vec<(String, String)>,
}

impl PipelineState {
    /// 由原始谱图创建
    pub fn new(grids: Vec<Grid>) -> Self {
        let n = grids.len();
        Self {
            stage: Stage::Raw,
            grids,
            elastic_energies: vec![None; n],
            skipped: Vec::new(),
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.grids.iter().map(|g| g.title().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// 用外部给定的 E0 覆盖（长度不足时其余保持原值）
    pub fn with_elastic_energies(mut self, energies: &[f64]) -> Self {
        for (slot, &e0) in self.elastic_energies.iter_mut().zip(energies) {
            *slot = Some(e0);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_energies() {
        let g = Grid::new("a", vec![0.0], vec![0.0], vec![1.0]).unwrap();
        let state = PipelineState::new(vec![g.clone(), g.with_title("b")]).with_elastic_energies(&[7.5]);
        assert_eq!(state.elastic_energies, vec![Some(7.5), None]);
        assert_eq!(state.titles(), vec!["a", "b"]);
        assert_eq!(state.stage, Stage::Raw);
    }
}
