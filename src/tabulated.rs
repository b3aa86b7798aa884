// Region-partitioned tabulated functions
use crate::config::{Config, DEFAULT_LINEARISATION_TOLERANCE};
use crate::error::{NucDataError, Result};
use crate::interpolation::InterpolationLaw;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Maximum bisection depth used when linearising a single segment.
pub const MAX_LINEARISATION_DEPTH: u32 = 20;

// Fraction of a histogram segment left before the jump when it is linearised
const HISTOGRAM_JUMP_FRACTION: f64 = 1e-9;

/// A tabulated function `y(x)` made of one or more interpolation regions.
///
/// `boundaries[k]` is the 0-based index of the last grid point of region `k`,
/// so the final boundary is always `x.len() - 1` and consecutive regions share
/// their boundary point. Every region uses a single [`InterpolationLaw`].
///
/// Values are validated once on construction and never change afterwards;
/// [`linearise`](Self::linearise) and the arithmetic helpers return new
/// functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TabulatedFunctionData")]
pub struct TabulatedFunction {
    x: Vec<f64>,
    y: Vec<f64>,
    boundaries: Vec<usize>,
    laws: Vec<InterpolationLaw>,
}

/// Unvalidated mirror of [`TabulatedFunction`] used for deserialisation.
#[derive(Debug, Clone, Deserialize)]
struct TabulatedFunctionData {
    x: Vec<f64>,
    y: Vec<f64>,
    boundaries: Vec<usize>,
    laws: Vec<InterpolationLaw>,
}

impl TryFrom<TabulatedFunctionData> for TabulatedFunction {
    type Error = NucDataError;

    fn try_from(data: TabulatedFunctionData) -> Result<Self> {
        TabulatedFunction::new(data.x, data.y, data.boundaries, data.laws)
    }
}

/// A contiguous run of grid points sharing one interpolation law.
///
/// `start` and `end` are inclusive indices into the owning function's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub law: InterpolationLaw,
    pub start: usize,
    pub end: usize,
}

impl TabulatedFunction {
    /// Create a tabulated function from typed data.
    ///
    /// Fails with [`NucDataError::InvalidGrid`] when `x` and `y` differ in
    /// length, hold fewer than two points, contain non-finite numbers or `x`
    /// is not strictly increasing, and with
    /// [`NucDataError::InvalidRegionStructure`] when the boundaries are
    /// empty, non-monotonic, out of range or do not match the laws.
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        boundaries: Vec<usize>,
        laws: Vec<InterpolationLaw>,
    ) -> Result<Self> {
        validate_grid(&x, &y)?;
        validate_regions(x.len(), &boundaries, laws.len())?;
        Ok(Self {
            x,
            y,
            boundaries,
            laws,
        })
    }

    /// Create a single-region linear-linear function.
    pub fn linear(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        let last = x.len().saturating_sub(1);
        Self::new(x, y, vec![last], vec![InterpolationLaw::LinearLinear])
    }

    /// Create a tabulated function from the raw integer arrays handed over by
    /// a format adapter.
    ///
    /// `boundaries` are 0-based point indices and `law_codes` ENDF
    /// interpolation codes.
    pub fn from_raw(
        x: Vec<f64>,
        y: Vec<f64>,
        boundaries: &[i64],
        law_codes: &[i64],
    ) -> Result<Self> {
        let boundaries = boundaries
            .iter()
            .map(|&b| {
                usize::try_from(b).map_err(|_| {
                    NucDataError::InvalidRegionStructure(format!("negative boundary index {}", b))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        let laws = law_codes
            .iter()
            .map(|&code| InterpolationLaw::try_from(code))
            .collect::<Result<Vec<_>>>()?;
        Self::new(x, y, boundaries, laws)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn laws(&self) -> &[InterpolationLaw] {
        &self.laws
    }

    pub fn number_points(&self) -> usize {
        self.x.len()
    }

    pub fn number_regions(&self) -> usize {
        self.boundaries.len()
    }

    /// Lowest grid value (start of the domain).
    pub fn lower_limit(&self) -> f64 {
        self.x[0]
    }

    /// Highest grid value (end of the domain).
    pub fn upper_limit(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// True if every region interpolates linear-linear.
    pub fn is_linearised(&self) -> bool {
        self.laws
            .iter()
            .all(|&law| law == InterpolationLaw::LinearLinear)
    }

    /// Iterate over the interpolation regions in grid order.
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        let starts = std::iter::once(0).chain(self.boundaries.iter().copied());
        starts
            .zip(self.boundaries.iter().copied())
            .zip(self.laws.iter().copied())
            .map(|((start, end), law)| Region { law, start, end })
    }

    /// Interpolation law of the segment between points `i` and `i + 1`.
    fn segment_law(&self, i: usize) -> InterpolationLaw {
        let region = self.boundaries.partition_point(|&b| b < i + 1);
        self.laws[region]
    }

    /// Evaluate the function at `x`.
    ///
    /// Grid points (region boundaries included) return the tabulated value
    /// exactly. Between grid points the law of the owning region is used.
    /// Outside `[lower_limit, upper_limit]` the function is zero.
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        if x.is_nan() {
            return Err(NucDataError::InvalidGrid(
                "cannot evaluate a tabulated function at NaN".to_string(),
            ));
        }
        if x < self.lower_limit() || x > self.upper_limit() {
            return Ok(0.0);
        }
        let i = self.x.partition_point(|&v| v < x);
        if self.x[i] == x {
            return Ok(self.y[i]);
        }
        let lo = i - 1;
        self.segment_law(lo)
            .interpolate(x, self.x[lo], self.x[i], self.y[lo], self.y[i])
    }

    /// Definite integral over the whole domain, exact for every region law.
    pub fn integral(&self) -> Result<f64> {
        let mut total = 0.0;
        for region in self.regions() {
            for i in region.start..region.end {
                total += region.law.integrate(
                    self.x[i],
                    self.x[i + 1],
                    self.y[i],
                    self.y[i + 1],
                )?;
            }
        }
        Ok(total)
    }

    /// Collapse adjacent regions that share the same law.
    pub fn merge_regions_if_degenerate(&self) -> Self {
        let mut boundaries: Vec<usize> = Vec::with_capacity(self.boundaries.len());
        let mut laws: Vec<InterpolationLaw> = Vec::with_capacity(self.laws.len());
        for (&boundary, &law) in self.boundaries.iter().zip(&self.laws) {
            if laws.last() == Some(&law) {
                if let Some(last) = boundaries.last_mut() {
                    *last = boundary;
                }
            } else {
                boundaries.push(boundary);
                laws.push(law);
            }
        }
        Self {
            x: self.x.clone(),
            y: self.y.clone(),
            boundaries,
            laws,
        }
    }

    /// Approximate the function by a single linear-linear region.
    ///
    /// Every segment of a non-linear region is bisected while the exact value
    /// at the midpoint differs from the linear estimate by more than
    /// `tolerance` relative to the exact value. Logarithmic-x laws are
    /// bisected at the geometric midpoint, the others at the arithmetic one.
    /// Recursion stops at [`MAX_LINEARISATION_DEPTH`]. Histogram segments get
    /// one extra point just below their right end carrying the left value.
    /// A function that is already linearised is returned with its regions
    /// merged, so linearising twice gives the same result.
    pub fn linearise(&self, tolerance: f64) -> Result<Self> {
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(NucDataError::InvalidTolerance(tolerance));
        }
        if self.is_linearised() {
            return Ok(self.merge_regions_if_degenerate());
        }

        let mut x = vec![self.x[0]];
        let mut y = vec![self.y[0]];
        for region in self.regions() {
            for i in region.start..region.end {
                let (x1, x2, y1, y2) = (self.x[i], self.x[i + 1], self.y[i], self.y[i + 1]);
                match region.law {
                    InterpolationLaw::LinearLinear => {}
                    InterpolationLaw::Histogram => {
                        let mut jump = x2 - HISTOGRAM_JUMP_FRACTION * (x2 - x1);
                        if jump >= x2 {
                            jump = next_below(x2);
                        }
                        if y1 != y2 && jump > x1 {
                            x.push(jump);
                            y.push(y1);
                        }
                    }
                    law => {
                        let mut segment = Segment {
                            law,
                            tolerance,
                            x: &mut x,
                            y: &mut y,
                        };
                        segment.bisect(x1, x2, y1, y2, 0)?;
                    }
                }
                x.push(x2);
                y.push(y2);
            }
        }

        tracing::debug!(
            points_in = self.x.len(),
            points_out = x.len(),
            tolerance,
            "linearised tabulated function"
        );
        Self::linear(x, y)
    }

    /// Linearise with the tolerance taken from a [`Config`].
    pub fn linearise_with(&self, config: &Config) -> Result<Self> {
        self.linearise(config.linearisation_tolerance)
    }

    /// Pointwise sum on the union of both grids.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a + b)
    }

    /// Pointwise difference `self - other` on the union of both grids.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a - b)
    }

    // Non-linear operands are linearised first so the result is linear-linear
    // on the merged grid.
    fn combine(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Result<Self> {
        let left = linear_view(self)?;
        let right = linear_view(other)?;

        let mut grid: Vec<f64> = left.x.iter().chain(&right.x).copied().collect();
        grid.sort_by(|a, b| a.total_cmp(b));
        grid.dedup();

        let values = grid
            .iter()
            .map(|&x| Ok(op(left.evaluate(x)?, right.evaluate(x)?)))
            .collect::<Result<Vec<f64>>>()?;
        Self::linear(grid, values)
    }

    /// Multiply every value by `factor`.
    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x.clone(),
            y: self.y.iter().map(|v| v * factor).collect(),
            boundaries: self.boundaries.clone(),
            laws: self.laws.clone(),
        }
    }
}

fn linear_view(function: &TabulatedFunction) -> Result<Cow<'_, TabulatedFunction>> {
    if function.is_linearised() {
        Ok(Cow::Borrowed(function))
    } else {
        Ok(Cow::Owned(function.linearise(DEFAULT_LINEARISATION_TOLERANCE)?))
    }
}

// Largest representable value strictly below a finite `x`
fn next_below(x: f64) -> f64 {
    if x == 0.0 {
        -f64::from_bits(1)
    } else if x > 0.0 {
        f64::from_bits(x.to_bits() - 1)
    } else {
        f64::from_bits(x.to_bits() + 1)
    }
}

/// Output buffers and settings for bisecting one non-linear segment.
struct Segment<'a> {
    law: InterpolationLaw,
    tolerance: f64,
    x: &'a mut Vec<f64>,
    y: &'a mut Vec<f64>,
}

impl Segment<'_> {
    /// Push the interior points needed between `(x1, y1)` and `(x2, y2)`.
    fn bisect(&mut self, x1: f64, x2: f64, y1: f64, y2: f64, depth: u32) -> Result<()> {
        let xm = if self.law.is_log_x() {
            (x1 * x2).sqrt()
        } else {
            0.5 * (x1 + x2)
        };
        let exact = self.law.interpolate(xm, x1, x2, y1, y2)?;
        let estimate = y1 + (xm - x1) * (y2 - y1) / (x2 - x1);
        if (exact - estimate).abs() <= self.tolerance * exact.abs() || !(xm > x1 && xm < x2) {
            return Ok(());
        }
        if depth >= MAX_LINEARISATION_DEPTH {
            tracing::warn!(x1, x2, depth, "linearisation depth limit reached");
            return Ok(());
        }
        self.bisect(x1, xm, y1, exact, depth + 1)?;
        self.x.push(xm);
        self.y.push(exact);
        self.bisect(xm, x2, exact, y2, depth + 1)
    }
}

fn validate_grid(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(NucDataError::InvalidGrid(format!(
            "x has {} values but y has {}",
            x.len(),
            y.len()
        )));
    }
    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        return Err(NucDataError::InvalidGrid(format!(
            "non-finite y value at index {}",
            i
        )));
    }
    validate_axis(x)
}

/// Check that an axis holds at least two finite, strictly increasing values.
pub(crate) fn validate_axis(x: &[f64]) -> Result<()> {
    if x.len() < 2 {
        return Err(NucDataError::InvalidGrid(format!(
            "at least two points are required, got {}",
            x.len()
        )));
    }
    if let Some(i) = x.iter().position(|v| !v.is_finite()) {
        return Err(NucDataError::InvalidGrid(format!(
            "non-finite x value at index {}",
            i
        )));
    }
    if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
        return Err(NucDataError::InvalidGrid(format!(
            "x is not strictly increasing at index {} ({} -> {})",
            i + 1,
            x[i],
            x[i + 1]
        )));
    }
    Ok(())
}

pub(crate) fn validate_regions(points: usize, boundaries: &[usize], laws: usize) -> Result<()> {
    if boundaries.is_empty() {
        return Err(NucDataError::InvalidRegionStructure(
            "at least one region is required".to_string(),
        ));
    }
    if boundaries.len() != laws {
        return Err(NucDataError::InvalidRegionStructure(format!(
            "{} boundaries but {} interpolation laws",
            boundaries.len(),
            laws
        )));
    }
    if boundaries[0] == 0 {
        return Err(NucDataError::InvalidRegionStructure(
            "first region has no segment (boundary index 0)".to_string(),
        ));
    }
    if let Some(i) = boundaries.windows(2).position(|w| w[1] <= w[0]) {
        return Err(NucDataError::InvalidRegionStructure(format!(
            "boundaries are not strictly increasing at position {}",
            i + 1
        )));
    }
    let last = boundaries[boundaries.len() - 1];
    if last != points - 1 {
        return Err(NucDataError::InvalidRegionStructure(format!(
            "last boundary is {} but the grid ends at index {}",
            last,
            points - 1
        )));
    }
    Ok(())
}

/// Convert 1-based ENDF `NBT` point counts into 0-based boundary indices.
pub fn boundaries_from_nbt(nbt: &[i64]) -> Result<Vec<usize>> {
    nbt.iter()
        .map(|&n| {
            usize::try_from(n)
                .ok()
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(|| {
                    NucDataError::InvalidRegionStructure(format!("invalid NBT value {}", n))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use InterpolationLaw::*;

    fn two_region() -> TabulatedFunction {
        TabulatedFunction::new(
            vec![1e-5, 1e4, 2e7],
            vec![100.0, 2.0, 1.0],
            vec![1, 2],
            vec![LogLog, LinearLinear],
        )
        .unwrap()
    }

    #[test]
    fn test_shared_boundary_returns_grid_value() {
        let f = two_region();
        assert_eq!(f.evaluate(1e4).unwrap(), 2.0);
        assert_eq!(f.evaluate(1e-5).unwrap(), 100.0);
        assert_eq!(f.evaluate(2e7).unwrap(), 1.0);
    }

    #[test]
    fn test_evaluate_uses_region_law() {
        let f = two_region();
        // log-log region: y = 100 * (x / 1e-5)^a with a = ln(0.02) / ln(1e9)
        let a = (0.02f64).ln() / (1e9f64).ln();
        let expected = 100.0 * (1e-1f64 / 1e-5).powf(a);
        let value = f.evaluate(1e-1).unwrap();
        assert!((value - expected).abs() < 1e-10 * expected);
        // linear-linear region
        let mid = 0.5 * (1e4 + 2e7);
        assert!((f.evaluate(mid).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_outside_domain_is_zero() {
        let f = two_region();
        assert_eq!(f.evaluate(1e-6).unwrap(), 0.0);
        assert_eq!(f.evaluate(3e7).unwrap(), 0.0);
        assert!(f.evaluate(f64::NAN).is_err());
    }

    #[test]
    fn test_histogram_holds_left_value() {
        let f = TabulatedFunction::new(vec![0.0, 1.0, 2.0], vec![3.0, 5.0, 7.0], vec![2], vec![Histogram])
            .unwrap();
        assert_eq!(f.evaluate(0.5).unwrap(), 3.0);
        assert_eq!(f.evaluate(1.0).unwrap(), 5.0);
        assert_eq!(f.evaluate(1.999).unwrap(), 5.0);
    }

    #[test]
    fn test_rejects_malformed_regions() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![1.0, 1.0, 1.0, 1.0];
        let cases: Vec<(Vec<usize>, Vec<InterpolationLaw>)> = vec![
            (vec![], vec![]),
            (vec![3], vec![LinearLinear, LogLog]),
            (vec![2], vec![LinearLinear]),
            (vec![4], vec![LinearLinear]),
            (vec![2, 1, 3], vec![LinearLinear, LinearLinear, LinearLinear]),
            (vec![0, 3], vec![LinearLinear, LinearLinear]),
        ];
        for (boundaries, laws) in cases {
            let result = TabulatedFunction::new(x.clone(), y.clone(), boundaries.clone(), laws);
            assert!(
                matches!(result, Err(NucDataError::InvalidRegionStructure(_))),
                "boundaries {:?} should be rejected",
                boundaries
            );
        }
    }

    #[test]
    fn test_rejects_malformed_grid() {
        assert!(matches!(
            TabulatedFunction::linear(vec![1.0, 2.0], vec![1.0]),
            Err(NucDataError::InvalidGrid(_))
        ));
        assert!(matches!(
            TabulatedFunction::linear(vec![1.0], vec![1.0]),
            Err(NucDataError::InvalidGrid(_))
        ));
        assert!(matches!(
            TabulatedFunction::linear(vec![1.0, 1.0], vec![1.0, 2.0]),
            Err(NucDataError::InvalidGrid(_))
        ));
        assert!(matches!(
            TabulatedFunction::linear(vec![1.0, 2.0], vec![1.0, f64::INFINITY]),
            Err(NucDataError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_from_raw_converts_codes() {
        let f = TabulatedFunction::from_raw(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0], &[1, 2], &[1, 5])
            .unwrap();
        assert_eq!(f.laws(), &[Histogram, LogLog]);
        assert_eq!(
            TabulatedFunction::from_raw(vec![1.0, 2.0], vec![1.0, 2.0], &[1], &[7]),
            Err(NucDataError::UnsupportedLaw(7))
        );
        assert!(matches!(
            TabulatedFunction::from_raw(vec![1.0, 2.0], vec![1.0, 2.0], &[-1], &[2]),
            Err(NucDataError::InvalidRegionStructure(_))
        ));
    }

    #[test]
    fn test_merge_regions_if_degenerate() {
        let f = TabulatedFunction::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![1, 2, 3, 4],
            vec![LinearLinear, LinearLinear, LogLog, LogLog],
        )
        .unwrap();
        let merged = f.merge_regions_if_degenerate();
        assert_eq!(merged.boundaries(), &[2, 4]);
        assert_eq!(merged.laws(), &[LinearLinear, LogLog]);
        assert_eq!(merged.x(), f.x());
    }

    #[test]
    fn test_linearise_log_log_within_tolerance() {
        let f = TabulatedFunction::new(vec![1.0, 1000.0], vec![1.0, 1e6], vec![1], vec![LogLog]).unwrap();
        let tolerance = 1e-3;
        let linear = f.linearise(tolerance).unwrap();
        assert!(linear.is_linearised());
        assert_eq!(linear.number_regions(), 1);
        assert!(linear.number_points() > 2);
        // check accuracy at the midpoints of the new segments
        for w in linear.x().windows(2) {
            let xm = (w[0] * w[1]).sqrt();
            let exact = xm * xm;
            let approx = linear.evaluate(xm).unwrap();
            assert!(
                ((approx - exact) / exact).abs() < 50.0 * tolerance,
                "poor approximation at {}: {} vs {}",
                xm,
                approx,
                exact
            );
        }
    }

    #[test]
    fn test_linearise_histogram_inserts_jump() {
        let f = TabulatedFunction::new(vec![0.0, 1.0, 2.0], vec![3.0, 5.0, 5.0], vec![2], vec![Histogram])
            .unwrap();
        let linear = f.linearise(1e-3).unwrap();
        // one jump for the first segment, none for the flat second one
        assert_eq!(linear.number_points(), 4);
        assert_eq!(linear.evaluate(0.5).unwrap(), 3.0);
        assert_eq!(linear.evaluate(1.0).unwrap(), 5.0);
    }

    #[test]
    fn test_linearise_histogram_keeps_jump_on_narrow_segment() {
        let x1: f64 = 1e8;
        let x2 = f64::from_bits(x1.to_bits() + 4);
        let f = TabulatedFunction::new(vec![x1, x2, x2 + 1.0], vec![3.0, 5.0, 5.0], vec![2], vec![Histogram])
            .unwrap();
        let linear = f.linearise(1e-3).unwrap();
        assert_eq!(linear.number_points(), 4);
        let jump = linear.x()[1];
        assert!(jump > x1 && jump < x2);
        assert_eq!(jump, next_below(x2));
        assert_eq!(linear.y()[1], 3.0);

        assert_eq!(next_below(0.0), -f64::from_bits(1));
        assert!(next_below(-1.0) < -1.0);
    }

    #[test]
    fn test_linearise_stops_at_depth_limit() {
        // y linear in ln(x) over ten decades; no tolerance can be met before the cap
        let f = TabulatedFunction::new(vec![1.0, 1e10], vec![1.0, 11.0], vec![1], vec![LinearLog]).unwrap();
        let linear = f.linearise(1e-300).unwrap();
        let per_segment = 1usize << MAX_LINEARISATION_DEPTH;
        assert!(linear.number_points() <= per_segment + 1);
        assert!(linear.number_points() > per_segment / 2);
        assert!(linear.is_linearised());
        assert_eq!(linear.x()[0], 1.0);
        assert_eq!(*linear.x().last().unwrap(), 1e10);
    }

    #[test]
    fn test_linearise_is_a_fixed_point_on_linear_input() {
        let f = TabulatedFunction::new(
            vec![1.0, 2.0, 3.0],
            vec![1.0, 4.0, 9.0],
            vec![1, 2],
            vec![LinearLinear, LinearLinear],
        )
        .unwrap();
        let once = f.linearise(1e-3).unwrap();
        assert_eq!(once.x(), f.x());
        assert_eq!(once.boundaries(), &[2]);
        assert_eq!(once.linearise(1e-3).unwrap(), once);
    }

    #[test]
    fn test_linearise_rejects_bad_tolerance() {
        let f = two_region();
        assert_eq!(f.linearise(0.0), Err(NucDataError::InvalidTolerance(0.0)));
        assert!(f.linearise(f64::NAN).is_err());
    }

    #[test]
    fn test_linearise_propagates_domain_errors() {
        let f = TabulatedFunction::new(vec![1.0, 2.0], vec![0.0, 1.0], vec![1], vec![LogLog]).unwrap();
        assert!(matches!(
            f.linearise(1e-3),
            Err(NucDataError::DomainError { axis: "y", .. })
        ));
    }

    #[test]
    fn test_subtract_on_union_grid() {
        let a = TabulatedFunction::linear(vec![1.0, 3.0], vec![10.0, 10.0]).unwrap();
        let b = TabulatedFunction::linear(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]).unwrap();
        let diff = a.subtract(&b).unwrap();
        assert_eq!(diff.x(), &[1.0, 2.0, 3.0]);
        assert_eq!(diff.y(), &[6.0, 5.0, 4.0]);
        let sum = diff.add(&b).unwrap();
        assert_eq!(sum.y(), &[10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_integral_spans_regions() {
        let f = TabulatedFunction::new(
            vec![0.0, 1.0, 2.0],
            vec![2.0, 2.0, 4.0],
            vec![1, 2],
            vec![Histogram, LinearLinear],
        )
        .unwrap();
        assert!((f.integral().unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_regions_iterator() {
        let regions: Vec<Region> = two_region().regions().collect();
        assert_eq!(
            regions,
            vec![
                Region { law: LogLog, start: 0, end: 1 },
                Region { law: LinearLinear, start: 1, end: 2 },
            ]
        );
    }

    #[test]
    fn test_boundaries_from_nbt() {
        assert_eq!(boundaries_from_nbt(&[3, 10]).unwrap(), vec![2, 9]);
        assert!(boundaries_from_nbt(&[0]).is_err());
    }

    #[test]
    fn test_deserialise_validates() {
        let json = r#"{"x":[1.0,2.0],"y":[3.0,4.0],"boundaries":[1],"laws":["log-log"]}"#;
        let f: TabulatedFunction = serde_json::from_str(json).unwrap();
        assert_eq!(f.laws(), &[LogLog]);

        let bad = r#"{"x":[1.0,2.0],"y":[3.0,4.0],"boundaries":[0],"laws":["log-log"]}"#;
        assert!(serde_json::from_str::<TabulatedFunction>(bad).is_err());
    }
}
