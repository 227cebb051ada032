//! # 峰形函数
//!
//! Gaussian 与 Lorentzian 峰形及其对参数的解析偏导数。
//!
//! - Gaussian:   f(x) = a·exp(−(x−x0)²/(2σ²))
//! - Lorentzian: f(x) = a·γ²/((x−x0)²+γ²)
//!
//! ## 依赖关系
//! - 被 `spectral/optimizer.rs`、`spectral/profile.rs` 使用
//! - 无外部模块依赖

use crate::error::QlossError;

use std::str::FromStr;

/// 2·sqrt(2·ln2)
pub const GAUSSIAN_FWHM_FACTOR: f64 = 2.354_820_045_030_949_3;

/// 峰形类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineShape {
    #[default]
    Gaussian,
    Lorentzian,
}

impl LineShape {
    /// 在 x 处求值，`params = [a, x0, width]`
    pub fn eval(&self, x: f64, params: &[f64; 3]) -> f64 {
        match self {
            LineShape::Gaussian => gaussian(x, params[0], params[1], params[2]),
            LineShape::Lorentzian => lorentzian(x, params[0], params[1], params[2]),
        }
    }

    /// 对 (a, x0, width) 的偏导数
    pub fn gradient(&self, x: f64, params: &[f64; 3]) -> [f64; 3] {
        let [a, x0, w] = *params;
        let dx = x - x0;
        match self {
            LineShape::Gaussian => {
                let e = (-dx * dx / (2.0 * w * w)).exp();
                [e, a * e * dx / (w * w), a * e * dx * dx / (w * w * w)]
            }
            LineShape::Lorentzian => {
                let denom = dx * dx + w * w;
                let denom2 = denom * denom;
                [
                    w * w / denom,
                    2.0 * a * w * w * dx / denom2,
                    2.0 * a * w * dx * dx / denom2,
                ]
            }
        }
    }

    /// 初始宽度猜测（以索引为单位）
    pub fn initial_width(&self, n: usize) -> f64 {
        let n = n as f64;
        let w = match self {
            LineShape::Gaussian => n / 10.0,
            LineShape::Lorentzian => n / 20.0,
        };
        w.max(0.5)
    }

    /// 半高全宽；`scale` 为相邻标签间距
    pub fn fwhm(&self, width: f64, scale: f64) -> f64 {
        let w = width.abs();
        let fwhm = match self {
            LineShape::Gaussian => GAUSSIAN_FWHM_FACTOR * w * scale,
            LineShape::Lorentzian => 2.0 * w * scale,
        };
        fwhm.abs()
    }
}

impl FromStr for LineShape {
    type Err = QlossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gaussian" | "gauss" => Ok(LineShape::Gaussian),
            "lorentzian" | "lorentz" => Ok(LineShape::Lorentzian),
            other => Err(QlossError::InvalidParameter(format!(
                "unknown line shape '{}' (expected 'gaussian' or 'lorentzian')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LineShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineShape::Gaussian => write!(f, "gaussian"),
            LineShape::Lorentzian => write!(f, "lorentzian"),
        }
    }
}

pub fn gaussian(x: f64, a: f64, x0: f64, sigma: f64) -> f64 {
    a * (-(x - x0).powi(2) / (2.0 * sigma * sigma)).exp()
}

pub fn lorentzian(x: f64, a: f64, x0: f64, gamma: f64) -> f64 {
    a * gamma * gamma / ((x - x0).powi(2) + gamma * gamma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_peak_values() {
        assert_relative_eq!(gaussian(3.0, 2.0, 3.0, 1.5), 2.0);
        assert_relative_eq!(lorentzian(3.0, 2.0, 3.0, 1.5), 2.0);
        // 半高处
        assert_relative_eq!(lorentzian(4.5, 2.0, 3.0, 1.5), 1.0);
        let half = GAUSSIAN_FWHM_FACTOR * 1.5 / 2.0;
        assert_relative_eq!(gaussian(3.0 + half, 2.0, 3.0, 1.5), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let h = 1e-6;
        for shape in [LineShape::Gaussian, LineShape::Lorentzian] {
            let p = [1.7, 4.2, 2.3];
            let x = 5.1;
            let g = shape.gradient(x, &p);
            for k in 0..3 {
                let mut hi = p;
                let mut lo = p;
                hi[k] += h;
                lo[k] -= h;
                let fd = (shape.eval(x, &hi) - shape.eval(x, &lo)) / (2.0 * h);
                assert_relative_eq!(g[k], fd, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!("Gaussian".parse::<LineShape>().unwrap(), LineShape::Gaussian);
        assert_eq!("lorentz".parse::<LineShape>().unwrap(), LineShape::Lorentzian);
        assert!(matches!(
            "voigt".parse::<LineShape>(),
            Err(QlossError::InvalidParameter(_))
        ));
    }
}
