use crate::config::DEFAULT_NORMALISATION_TOLERANCE;
use crate::error::{NucDataError, Result};
use crate::interpolation::InterpolationLaw;
use crate::tabulated::{validate_axis, validate_regions, TabulatedFunction};
use serde::{Deserialize, Serialize};

/// Rescale a tabulated function so that its integral over its domain is one.
///
/// The integral is evaluated exactly for the law of every region (see
/// [`InterpolationLaw::integrate`]). A function whose integral is already
/// within [`DEFAULT_NORMALISATION_TOLERANCE`] of one is returned unchanged,
/// which makes normalisation idempotent. A zero or non-finite integral fails
/// with [`NucDataError::DegenerateDistribution`].
pub fn normalise(function: &TabulatedFunction) -> Result<TabulatedFunction> {
    let integral = function.integral()?;
    if integral == 0.0 || !integral.is_finite() {
        return Err(NucDataError::DegenerateDistribution { integral });
    }
    if (integral - 1.0).abs() <= DEFAULT_NORMALISATION_TOLERANCE {
        return Ok(function.clone());
    }
    tracing::trace!(integral, "normalising distribution");
    Ok(function.scaled(1.0 / integral))
}

/// A tabulated probability density.
///
/// Construction always normalises the data, so a `TabulatedDistribution`
/// integrates to one over its domain. Negative densities are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TabulatedFunction", into = "TabulatedFunction")]
pub struct TabulatedDistribution {
    function: TabulatedFunction,
}

impl TryFrom<TabulatedFunction> for TabulatedDistribution {
    type Error = NucDataError;

    fn try_from(function: TabulatedFunction) -> Result<Self> {
        TabulatedDistribution::new(function)
    }
}

impl From<TabulatedDistribution> for TabulatedFunction {
    fn from(distribution: TabulatedDistribution) -> Self {
        distribution.function
    }
}

impl TabulatedDistribution {
    /// Build a density from a tabulated function, normalising it.
    pub fn new(function: TabulatedFunction) -> Result<Self> {
        if let Some(i) = function.y().iter().position(|&v| v < 0.0) {
            return Err(NucDataError::InvalidGrid(format!(
                "negative probability density {} at index {}",
                function.y()[i],
                i
            )));
        }
        let function = normalise(&function)?;
        Ok(Self { function })
    }

    /// Build a density from raw adapter arrays, normalising it.
    pub fn from_raw(
        x: Vec<f64>,
        y: Vec<f64>,
        boundaries: &[i64],
        law_codes: &[i64],
    ) -> Result<Self> {
        Self::new(TabulatedFunction::from_raw(x, y, boundaries, law_codes)?)
    }

    pub fn function(&self) -> &TabulatedFunction {
        &self.function
    }

    /// Probability density at `x` (zero outside the domain).
    pub fn pdf(&self, x: f64) -> Result<f64> {
        self.function.evaluate(x)
    }

    pub fn integral(&self) -> Result<f64> {
        self.function.integral()
    }

    /// Normalise again.
    ///
    /// A constructed distribution is already normalised, so this returns an
    /// identical value; it exists for callers that want the explicit step.
    pub fn normalise(&self) -> Result<Self> {
        Ok(Self {
            function: normalise(&self.function)?,
        })
    }

    /// True if the integral is within `tolerance` of one.
    pub fn is_normalised(&self, tolerance: f64) -> Result<bool> {
        Ok((self.integral()? - 1.0).abs() <= tolerance)
    }
}

/// Values tabulated on an incident-energy grid with their own interpolation
/// regions, e.g. one outgoing-angle density per incident energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IncidentEnergyTableData<T>")]
pub struct IncidentEnergyTable<T> {
    energies: Vec<f64>,
    boundaries: Vec<usize>,
    laws: Vec<InterpolationLaw>,
    values: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
struct IncidentEnergyTableData<T> {
    energies: Vec<f64>,
    boundaries: Vec<usize>,
    laws: Vec<InterpolationLaw>,
    values: Vec<T>,
}

impl<T> TryFrom<IncidentEnergyTableData<T>> for IncidentEnergyTable<T> {
    type Error = NucDataError;

    fn try_from(data: IncidentEnergyTableData<T>) -> Result<Self> {
        IncidentEnergyTable::new(data.energies, data.boundaries, data.laws, data.values)
    }
}

impl<T> IncidentEnergyTable<T> {
    /// Create a table, validating the incident-energy grid and regions the
    /// same way as [`TabulatedFunction::new`].
    pub fn new(
        energies: Vec<f64>,
        boundaries: Vec<usize>,
        laws: Vec<InterpolationLaw>,
        values: Vec<T>,
    ) -> Result<Self> {
        if energies.len() != values.len() {
            return Err(NucDataError::InvalidGrid(format!(
                "{} incident energies but {} tabulated values",
                energies.len(),
                values.len()
            )));
        }
        validate_axis(&energies)?;
        validate_regions(energies.len(), &boundaries, laws.len())?;
        Ok(Self {
            energies,
            boundaries,
            laws,
            values,
        })
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn laws(&self) -> &[InterpolationLaw] {
        &self.laws
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn number_energies(&self) -> usize {
        self.energies.len()
    }

    pub fn lower_energy_limit(&self) -> f64 {
        self.energies[0]
    }

    pub fn upper_energy_limit(&self) -> f64 {
        self.energies[self.energies.len() - 1]
    }

    /// Iterate over `(incident energy, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> + '_ {
        self.energies.iter().copied().zip(self.values.iter())
    }

    /// Interpolate a scalar derived from the tabulated values at `energy`.
    ///
    /// `f` is applied to the values at both ends of the bracketing interval
    /// and the results are combined with that interval's law. Outside the
    /// incident-energy grid the nearest tabulated value is used.
    pub fn interpolate<F>(&self, energy: f64, f: F) -> Result<f64>
    where
        F: Fn(&T) -> Result<f64>,
    {
        let n = self.energies.len();
        if energy <= self.energies[0] {
            return f(&self.values[0]);
        }
        if energy >= self.energies[n - 1] {
            return f(&self.values[n - 1]);
        }
        let i = self.energies.partition_point(|&e| e < energy);
        if self.energies[i] == energy {
            return f(&self.values[i]);
        }
        let lo = i - 1;
        let law = self.laws[self.boundaries.partition_point(|&b| b < i)];
        law.interpolate(
            energy,
            self.energies[lo],
            self.energies[i],
            f(&self.values[lo])?,
            f(&self.values[i])?,
        )
    }
}
