//! # Levenberg–Marquardt 非线性最小二乘
//!
//! 针对三参数峰形 (a, x0, width) 的 LM 求解器，
//! 使用解析 Jacobian，法方程为 3×3，借助 `nalgebra` 的 LU 分解求解。
//!
//! ## 依赖关系
//! - 被 `spectral/profile.rs` 调用
//! - 使用 `spectral/lineshape.rs` 的峰形与梯度

use crate::error::{QlossError, Result};
use crate::spectral::lineshape::LineShape;

use nalgebra::{Matrix3, Vector3};
use std::time::{Duration, Instant};

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MAX: f64 = 1e16;

/// 拟合选项
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// 最大外层迭代次数
    pub max_iterations: usize,
    /// 相对残差平方和变化的收敛阈值
    pub tolerance: f64,
    /// 单次拟合的时间上限
    pub timeout: Option<Duration>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
            timeout: Some(Duration::from_secs(2)),
        }
    }
}

/// LM 求解结果
#[derive(Debug, Clone, Copy)]
pub struct LmSolution {
    pub params: [f64; 3],
    /// 残差平方和
    pub cost: f64,
    pub iterations: usize,
}

fn cost_of(shape: LineShape, xs: &[f64], ys: &[f64], p: &[f64; 3]) -> f64 {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let r = y - shape.eval(x, p);
            r * r
        })
        .sum()
}

/// 以 LM 方法拟合峰形
pub fn levenberg_marquardt(
    shape: LineShape,
    xs: &[f64],
    ys: &[f64],
    initial: [f64; 3],
    options: &FitOptions,
) -> Result<LmSolution> {
    if xs.len() != ys.len() {
        return Err(QlossError::ShapeMismatch(format!(
            "{} abscissae for {} samples",
            xs.len(),
            ys.len()
        )));
    }

    let started = Instant::now();
    let mut params = initial;
    let mut cost = cost_of(shape, xs, ys, &params);
    let mut lambda = LAMBDA_INIT;

    if !cost.is_finite() {
        return Err(QlossError::FitDivergence(
            "non-finite residual at initial guess".to_string(),
        ));
    }

    for iteration in 1..=options.max_iterations {
        if let Some(limit) = options.timeout {
            if started.elapsed() >= limit {
                return Err(QlossError::FitDivergence(format!(
                    "timed out after {} iterations ({:?})",
                    iteration - 1,
                    limit
                )));
            }
        }

        if cost == 0.0 {
            return Ok(LmSolution {
                params,
                cost,
                iterations: iteration - 1,
            });
        }

        // 法方程 JᵀJ δ = Jᵀr
        let mut jtj = Matrix3::<f64>::zeros();
        let mut jtr = Vector3::<f64>::zeros();
        for (&x, &y) in xs.iter().zip(ys) {
            let j = Vector3::from(shape.gradient(x, &params));
            let r = y - shape.eval(x, &params);
            jtj += j * j.transpose();
            jtr += j * r;
        }

        loop {
            let mut damped = jtj;
            for k in 0..3 {
                damped[(k, k)] += lambda * jtj[(k, k)].max(1e-12);
            }

            let step = damped.lu().solve(&jtr).ok_or_else(|| {
                QlossError::FitDivergence("singular normal equations".to_string())
            })?;

            if step.iter().any(|v| !v.is_finite()) {
                return Err(QlossError::FitDivergence(
                    "non-finite parameter step".to_string(),
                ));
            }

            let candidate = [
                params[0] + step[0],
                params[1] + step[1],
                params[2] + step[2],
            ];
            let candidate_cost = cost_of(shape, xs, ys, &candidate);

            if candidate_cost.is_finite() && candidate_cost < cost {
                let improvement = (cost - candidate_cost) / cost;
                params = candidate;
                cost = candidate_cost;
                lambda = (lambda / 10.0).max(1e-12);

                let step_norm = step.norm();
                let param_norm = Vector3::from(params).norm();
                if improvement < options.tolerance
                    || step_norm <= options.tolerance * (param_norm + options.tolerance)
                {
                    return Ok(LmSolution {
                        params,
                        cost,
                        iterations: iteration,
                    });
                }
                break;
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // 无法再下降：已位于驻点
                return Ok(LmSolution {
                    params,
                    cost,
                    iterations: iteration,
                });
            }
        }
    }

    Err(QlossError::FitDivergence(format!(
        "no convergence within {} iterations",
        options.max_iterations
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_recovers_gaussian() {
        let truth = [3.0, 21.3, 4.2];
        let xs: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| LineShape::Gaussian.eval(x, &truth))
            .collect();

        let sol = levenberg_marquardt(
            LineShape::Gaussian,
            &xs,
            &ys,
            [3.0, 21.0, 5.0],
            &FitOptions::default(),
        )
        .unwrap();

        assert_relative_eq!(sol.params[1], truth[1], max_relative = 1e-6);
        assert_relative_eq!(sol.params[2].abs(), truth[2], max_relative = 1e-6);
    }

    #[test]
    fn test_recovers_lorentzian() {
        let truth = [10.0, 30.0, 2.5];
        let xs: Vec<f64> = (0..64).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| LineShape::Lorentzian.eval(x, &truth))
            .collect();

        let sol = levenberg_marquardt(
            LineShape::Lorentzian,
            &xs,
            &ys,
            [10.0, 30.0, 3.2],
            &FitOptions::default(),
        )
        .unwrap();

        assert_relative_eq!(sol.params[1], truth[1], max_relative = 1e-6);
        assert_relative_eq!(sol.params[2].abs(), truth[2], max_relative = 1e-6);
    }

    #[test]
    fn test_iteration_budget() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| (x * 0.7).sin() + 2.0).collect();
        let options = FitOptions {
            max_iterations: 1,
            tolerance: 0.0,
            timeout: None,
        };
        let result = levenberg_marquardt(LineShape::Gaussian, &xs, &ys, [1.0, 3.0, 2.0], &options);
        assert!(matches!(result, Err(QlossError::FitDivergence(_))));
    }

    #[test]
    fn test_timeout_budget() {
        let xs: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| LineShape::Gaussian.eval(x, &[2.0, 20.0, 3.0]))
            .collect();
        let options = FitOptions {
            timeout: Some(Duration::ZERO),
            ..FitOptions::default()
        };
        let err = levenberg_marquardt(LineShape::Gaussian, &xs, &ys, [2.0, 18.0, 6.0], &options)
            .unwrap_err();
        match err {
            QlossError::FitDivergence(msg) => assert!(msg.contains("timed out")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
