//! # pipeline 子命令实现
//!
//! 对齐 → q 转换 → 可选变换，各阶段之间显式传递 `PipelineState`。
//! 对齐得到的 Y 峰位作为 E0，可由 `--e0` 覆盖。
//!
//! ## 输出
//! - `<out>/origin/`、`<out>/peaks.csv`、`<out>/aligned.png`
//! - `<out>/q/`、`<out>/q_summary.csv`、`<out>/q_map.png`
//! - `<out>/<action>/`、`<out>/<action>.png`（指定 `--action` 时）
//!
//! ## 依赖关系
//! - 使用 `cli/pipeline.rs` 定义的 PipelineArgs
//! - 使用 `spectral/pipeline.rs` 的阶段函数
//! - 复用 `commands/align.rs`、`commands/qconvert.rs`、`commands/transform.rs` 的输出逻辑

use crate::cli::pipeline::PipelineArgs;
use crate::commands::{align, common, qconvert, transform};
use crate::error::Result;
use crate::models::PipelineState;
use crate::spectral::{pipeline, Transform, TransformOptions};
use crate::utils::{output, progress};

/// 执行完整流水线
pub fn execute(args: PipelineArgs) -> Result<()> {
    output::print_header("Alignment and q Conversion Pipeline");

    let grids = common::load_batch(&args.input)?;
    let config = common::align_config(&args.fit)?;
    let plot_options = common::plot_options(&args.plot)?;
    let plot = (!args.plot.no_plot).then_some(&plot_options);

    let state = PipelineState::new(grids);
    let overrides = common::expand_e0(&args.e0, state.len())?;

    // 阶段 1: 原点对齐
    output::print_info(&format!("Stage 1: aligning {} grids", state.len()));
    let spinner = progress::create_spinner("Fitting profiles");
    let (mut state, alignment) = pipeline::align_step(state, &config)?;
    spinner.finish_and_clear();

    align::report_alignment(&alignment);
    align::write_alignment(&alignment, &args.output, plot)?;

    for (slot, e0) in state.elastic_energies.iter_mut().zip(overrides) {
        if e0.is_some() {
            *slot = e0;
        }
    }

    // 阶段 2: q 转换
    output::print_info(&format!("Stage 2: converting {} grids to q", state.len()));
    let (state, reports) = pipeline::qconvert_step(state);
    qconvert::report_qconversion(&reports);
    qconvert::write_qconversion(&state.grids, &reports, &args.output, plot)?;

    // 阶段 3: 方向变换
    let state = match args.action {
        Some(action) => {
            let action: Transform = action.into();
            output::print_info(&format!("Stage 3: applying '{}'", action));
            let state = pipeline::transform_step(
                state,
                action,
                TransformOptions {
                    negate_labels: !args.keep_labels,
                },
            );
            transform::write_transformed(&state.grids, action, &args.output, plot)?;
            state
        }
        None => state,
    };

    if !state.skipped.is_empty() {
        output::print_separator();
        output::print_warning(&format!("{} grids skipped:", state.skipped.len()));
        for (title, reason) in &state.skipped {
            output::print_skip(&format!("  {}: {}", title, reason));
        }
    }

    output::print_done(&format!(
        "{} grids finished at stage '{}', results in '{}'",
        state.len(),
        state.stage,
        args.output.display()
    ));
    Ok(())
}
