use crate::error::{NucDataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interpolation law between two consecutive grid points.
///
/// The numeric codes follow the ENDF convention used by every supported
/// exchange format:
///
/// | code | law | rule |
/// |------|-----|------|
/// | 1 | `Histogram` | y is constant and equal to the left value |
/// | 2 | `LinearLinear` | y linear in x |
/// | 3 | `LinearLog` | y linear in ln(x) |
/// | 4 | `LogLinear` | ln(y) linear in x |
/// | 5 | `LogLog` | ln(y) linear in ln(x) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationLaw {
    #[serde(rename = "histogram")]
    Histogram,
    #[serde(rename = "linear-linear")]
    LinearLinear,
    #[serde(rename = "linear-log")]
    LinearLog,
    #[serde(rename = "log-linear")]
    LogLinear,
    #[serde(rename = "log-log")]
    LogLog,
}

// Below this magnitude an exponent is treated as zero in the closed-form integrals
const EXPONENT_EPSILON: f64 = 1e-12;

impl InterpolationLaw {
    /// ENDF interpolation code (1..=5).
    pub fn code(self) -> i64 {
        match self {
            InterpolationLaw::Histogram => 1,
            InterpolationLaw::LinearLinear => 2,
            InterpolationLaw::LinearLog => 3,
            InterpolationLaw::LogLinear => 4,
            InterpolationLaw::LogLog => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InterpolationLaw::Histogram => "histogram",
            InterpolationLaw::LinearLinear => "linear-linear",
            InterpolationLaw::LinearLog => "linear-log",
            InterpolationLaw::LogLinear => "log-linear",
            InterpolationLaw::LogLog => "log-log",
        }
    }

    /// True if the law takes the logarithm of the x axis.
    pub fn is_log_x(self) -> bool {
        matches!(self, InterpolationLaw::LinearLog | InterpolationLaw::LogLog)
    }

    /// True if the law takes the logarithm of the y axis.
    pub fn is_log_y(self) -> bool {
        matches!(self, InterpolationLaw::LogLinear | InterpolationLaw::LogLog)
    }

    /// Check that a segment can be handled by this law.
    fn check_segment(self, x1: f64, x2: f64, y1: f64, y2: f64) -> Result<()> {
        if self.is_log_x() {
            positive(self, "x", x1)?;
            positive(self, "x", x2)?;
        }
        if self.is_log_y() {
            positive(self, "y", y1)?;
            positive(self, "y", y2)?;
        }
        Ok(())
    }

    /// Interpolate the value at `x` on the segment `[x1, x2]` with end values
    /// `y1` and `y2`.
    ///
    /// The caller is responsible for `x1 < x2` and `x1 <= x <= x2`.
    pub fn interpolate(self, x: f64, x1: f64, x2: f64, y1: f64, y2: f64) -> Result<f64> {
        self.check_segment(x1, x2, y1, y2)?;
        let value = match self {
            InterpolationLaw::Histogram => y1,
            InterpolationLaw::LinearLinear => y1 + (x - x1) * (y2 - y1) / (x2 - x1),
            InterpolationLaw::LinearLog => y1 + (y2 - y1) * (x / x1).ln() / (x2 / x1).ln(),
            InterpolationLaw::LogLinear => y1 * ((y2 / y1).ln() * (x - x1) / (x2 - x1)).exp(),
            InterpolationLaw::LogLog => {
                y1 * ((y2 / y1).ln() * (x / x1).ln() / (x2 / x1).ln()).exp()
            }
        };
        Ok(value)
    }

    /// Definite integral over the segment `[x1, x2]`, exact for this law.
    ///
    /// Histogram and linear-linear segments use the rectangle and trapezoid
    /// rules. The logarithmic laws use the antiderivative of the interpolant:
    ///
    /// * linear-log: `y1 dx + (y2 - y1) (x2 L - dx) / L` with `L = ln(x2/x1)`
    /// * log-linear: `(y2 - y1) / b` with `b = ln(y2/y1) / dx`
    /// * log-log: `y1 x1 ((x2/x1)^(a+1) - 1) / (a + 1)` with `a = ln(y2/y1) / L`,
    ///   or `y1 x1 L` when `a = -1`
    pub fn integrate(self, x1: f64, x2: f64, y1: f64, y2: f64) -> Result<f64> {
        self.check_segment(x1, x2, y1, y2)?;
        let dx = x2 - x1;
        let value = match self {
            InterpolationLaw::Histogram => y1 * dx,
            InterpolationLaw::LinearLinear => 0.5 * (y1 + y2) * dx,
            InterpolationLaw::LinearLog => {
                let log_ratio = (x2 / x1).ln();
                y1 * dx + (y2 - y1) * (x2 * log_ratio - dx) / log_ratio
            }
            InterpolationLaw::LogLinear => {
                let log_ratio = (y2 / y1).ln();
                if log_ratio.abs() < EXPONENT_EPSILON {
                    y1 * dx
                } else {
                    (y2 - y1) * dx / log_ratio
                }
            }
            InterpolationLaw::LogLog => {
                let log_x = (x2 / x1).ln();
                let exponent = (y2 / y1).ln() / log_x + 1.0;
                if exponent.abs() < EXPONENT_EPSILON {
                    y1 * x1 * log_x
                } else {
                    y1 * x1 * ((x2 / x1).powf(exponent) - 1.0) / exponent
                }
            }
        };
        Ok(value)
    }
}

fn positive(law: InterpolationLaw, axis: &'static str, value: f64) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(NucDataError::DomainError {
            law: law.name(),
            axis,
            value,
        })
    }
}

impl TryFrom<i64> for InterpolationLaw {
    type Error = NucDataError;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            1 => Ok(InterpolationLaw::Histogram),
            2 => Ok(InterpolationLaw::LinearLinear),
            3 => Ok(InterpolationLaw::LinearLog),
            4 => Ok(InterpolationLaw::LogLinear),
            5 => Ok(InterpolationLaw::LogLog),
            other => Err(NucDataError::UnsupportedLaw(other)),
        }
    }
}

impl fmt::Display for InterpolationLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
