//! # 谱图处理模块
//!
//! 提供能量损失谱图的剖面拟合、原点对齐、q 转换、方向变换和线切。
//!
//! ## 子模块
//! - `lineshape`: 高斯 / 洛伦兹峰形
//! - `optimizer`: Levenberg–Marquardt 最小二乘
//! - `profile`: 剖面压缩与峰拟合
//! - `align`: 原点对齐
//! - `qconvert`: 角度到动量转移 q 的转换
//! - `transform`: 翻转与旋转
//! - `slice`: 线切
//! - `pipeline`: 显式状态的阶段串联
//! - `plot`: 图表生成
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型

pub mod align;
pub mod export;
pub mod lineshape;
pub mod optimizer;
pub mod pipeline;
pub mod plot;
pub mod profile;
pub mod qconvert;
pub mod slice;
pub mod transform;

pub use align::{AlignConfig, AlignmentResult};
pub use lineshape::LineShape;
pub use optimizer::FitOptions;
pub use profile::{PeakFit, Profile, ReduceMethod};
pub use transform::{Transform, TransformOptions};
