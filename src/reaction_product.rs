use crate::distribution::{IncidentEnergyTable, TabulatedDistribution};
use crate::error::{NucDataError, Result};
use crate::reaction_id::ParticleId;
use crate::tabulated::TabulatedFunction;
use serde::{Deserialize, Serialize};

/// Frame in which outgoing angles and energies are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceFrame {
    #[serde(rename = "lab")]
    Lab,
    #[serde(rename = "centre-of-mass")]
    CentreOfMass,
}

/// Number of particles of one kind emitted per reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Multiplicity {
    Integer(u32),
    /// Multiplicity as a function of incident energy.
    Tabulated(TabulatedFunction),
}

impl Multiplicity {
    /// Multiplicity at the given incident energy.
    pub fn value_at(&self, energy: f64) -> Result<f64> {
        match self {
            Multiplicity::Integer(n) => Ok(f64::from(*n)),
            Multiplicity::Tabulated(function) => function.evaluate(energy),
        }
    }
}

/// Outgoing cosine distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AngularDistributions {
    Isotropic,
    /// One cosine density per incident energy.
    Tabulated {
        table: IncidentEnergyTable<TabulatedDistribution>,
    },
}

impl AngularDistributions {
    /// Wrap a table of cosine densities, checking that every density lives
    /// inside `[-1, 1]`.
    pub fn tabulated(table: IncidentEnergyTable<TabulatedDistribution>) -> Result<Self> {
        for (energy, density) in table.iter() {
            let f = density.function();
            if f.lower_limit() < -1.0 || f.upper_limit() > 1.0 {
                return Err(NucDataError::InvalidGrid(format!(
                    "cosine grid [{}, {}] at incident energy {} is outside [-1, 1]",
                    f.lower_limit(),
                    f.upper_limit(),
                    energy
                )));
            }
        }
        Ok(AngularDistributions::Tabulated { table })
    }

    pub fn is_isotropic(&self) -> bool {
        matches!(self, AngularDistributions::Isotropic)
    }

    /// Probability density of the outgoing cosine `mu` at an incident energy.
    pub fn pdf(&self, energy: f64, mu: f64) -> Result<f64> {
        match self {
            AngularDistributions::Isotropic => Ok(if (-1.0..=1.0).contains(&mu) { 0.5 } else { 0.0 }),
            AngularDistributions::Tabulated { table } => {
                table.interpolate(energy, |density| density.pdf(mu))
            }
        }
    }
}

/// Outgoing energy distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EnergyDistributions {
    /// One outgoing-energy density per incident energy.
    Tabulated {
        table: IncidentEnergyTable<TabulatedDistribution>,
    },
    /// Evaporation spectrum `E' exp(-E'/T(E))` on `[0, E - U]`.
    Evaporation {
        temperature: TabulatedFunction,
        restriction_energy: f64,
    },
}

impl EnergyDistributions {
    /// Build an evaporation spectrum from its nuclear temperature `T(E)` and
    /// restriction energy `U`.
    pub fn evaporation(temperature: TabulatedFunction, restriction_energy: f64) -> Result<Self> {
        if !restriction_energy.is_finite() {
            return Err(NucDataError::InvalidGrid(format!(
                "restriction energy {} is not finite",
                restriction_energy
            )));
        }
        if let Some(t) = temperature.y().iter().find(|&&t| t <= 0.0) {
            return Err(NucDataError::InvalidGrid(format!(
                "nuclear temperature {} is not positive",
                t
            )));
        }
        Ok(EnergyDistributions::Evaporation {
            temperature,
            restriction_energy,
        })
    }

    /// Probability density of outgoing energy `energy_out` at incident
    /// energy `energy`.
    pub fn pdf(&self, energy: f64, energy_out: f64) -> Result<f64> {
        match self {
            EnergyDistributions::Tabulated { table } => {
                table.interpolate(energy, |density| density.pdf(energy_out))
            }
            EnergyDistributions::Evaporation {
                temperature,
                restriction_energy,
            } => {
                let upper = energy - restriction_energy;
                if upper <= 0.0 || energy_out < 0.0 || energy_out > upper {
                    return Ok(0.0);
                }
                let t = temperature.evaluate(energy)?;
                if t <= 0.0 {
                    return Ok(0.0);
                }
                let ratio = upper / t;
                let norm = t * t * (1.0 - (-ratio).exp() * (1.0 + ratio));
                if norm <= 0.0 || !norm.is_finite() {
                    return Err(NucDataError::DegenerateDistribution { integral: norm });
                }
                Ok(energy_out * (-energy_out / t).exp() / norm)
            }
        }
    }
}

/// How the outgoing angle and energy of a product are described.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProductDistribution {
    /// Two-body kinematics: only the angle is tabulated.
    TwoBody {
        frame: ReferenceFrame,
        angular: AngularDistributions,
    },
    /// Independent angle and energy distributions.
    Uncorrelated {
        frame: ReferenceFrame,
        angular: AngularDistributions,
        energy: EnergyDistributions,
    },
    /// Photon coherent scattering: form factor and optional anomalous factors.
    CoherentScattering {
        scattering_function: TabulatedFunction,
        real_anomalous: Option<TabulatedFunction>,
        imaginary_anomalous: Option<TabulatedFunction>,
    },
    /// Photon incoherent scattering function.
    IncoherentScattering { scattering_function: TabulatedFunction },
}

impl ProductDistribution {
    /// Frame of the kinematic forms. Photo-atomic forms have none.
    pub fn frame(&self) -> Option<ReferenceFrame> {
        match self {
            ProductDistribution::TwoBody { frame, .. }
            | ProductDistribution::Uncorrelated { frame, .. } => Some(*frame),
            ProductDistribution::CoherentScattering { .. }
            | ProductDistribution::IncoherentScattering { .. } => None,
        }
    }

    pub fn angular(&self) -> Option<&AngularDistributions> {
        match self {
            ProductDistribution::TwoBody { angular, .. }
            | ProductDistribution::Uncorrelated { angular, .. } => Some(angular),
            _ => None,
        }
    }
}

/// A particle emitted by a reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionProduct {
    /// Identifier of the emitted particle, e.g. `n` or `g`.
    particle: ParticleId,
    multiplicity: Multiplicity,
    /// Average outgoing energy as a function of incident energy.
    #[serde(default)]
    average_energy: Option<TabulatedFunction>,
    #[serde(default)]
    distribution: Option<ProductDistribution>,
}

impl ReactionProduct {
    pub fn new(particle: ParticleId, multiplicity: Multiplicity) -> Self {
        Self {
            particle,
            multiplicity,
            average_energy: None,
            distribution: None,
        }
    }

    pub fn with_average_energy(mut self, average_energy: TabulatedFunction) -> Self {
        self.average_energy = Some(average_energy);
        self
    }

    pub fn with_distribution(mut self, distribution: ProductDistribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    pub fn particle(&self) -> &ParticleId {
        &self.particle
    }

    pub fn multiplicity(&self) -> &Multiplicity {
        &self.multiplicity
    }

    pub fn average_energy(&self) -> Option<&TabulatedFunction> {
        self.average_energy.as_ref()
    }

    pub fn distribution(&self) -> Option<&ProductDistribution> {
        self.distribution.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::InterpolationLaw::LinearLinear;

    fn flat_cosines() -> TabulatedDistribution {
        TabulatedDistribution::from_raw(vec![-1.0, 1.0], vec![1.0, 1.0], &[1], &[2]).unwrap()
    }

    fn forward_peaked() -> TabulatedDistribution {
        TabulatedDistribution::from_raw(vec![-1.0, 1.0], vec![0.0, 1.0], &[1], &[2]).unwrap()
    }

    #[test]
    fn test_multiplicity() {
        assert_eq!(Multiplicity::Integer(2).value_at(1e6).unwrap(), 2.0);
        let nubar = TabulatedFunction::linear(vec![1e-5, 2e7], vec![2.4, 5.0]).unwrap();
        let m = Multiplicity::Tabulated(nubar);
        assert_eq!(m.value_at(1e-5).unwrap(), 2.4);
    }

    #[test]
    fn test_isotropic_pdf() {
        let angular = AngularDistributions::Isotropic;
        assert!(angular.is_isotropic());
        assert_eq!(angular.pdf(1e6, 0.3).unwrap(), 0.5);
        assert_eq!(angular.pdf(1e6, 1.5).unwrap(), 0.0);
    }

    #[test]
    fn test_tabulated_angular_interpolates_in_energy() {
        let table = IncidentEnergyTable::new(
            vec![1.0, 3.0],
            vec![1],
            vec![LinearLinear],
            vec![flat_cosines(), forward_peaked()],
        )
        .unwrap();
        let angular = AngularDistributions::tabulated(table).unwrap();
        // forward_peaked is (1 + mu) / 2, so at mu = 1 the two tables give 0.5 and 1.0
        assert!((angular.pdf(1.0, 1.0).unwrap() - 0.5).abs() < 1e-12);
        assert!((angular.pdf(3.0, 1.0).unwrap() - 1.0).abs() < 1e-12);
        assert!((angular.pdf(2.0, 1.0).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_domain_is_checked() {
        let wide = TabulatedDistribution::from_raw(vec![-2.0, 1.0], vec![1.0, 1.0], &[1], &[2]).unwrap();
        let table = IncidentEnergyTable::new(vec![1.0, 2.0], vec![1], vec![LinearLinear], vec![flat_cosines(), wide]).unwrap();
        assert!(matches!(
            AngularDistributions::tabulated(table),
            Err(NucDataError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_evaporation_is_normalised() {
        let temperature = TabulatedFunction::linear(vec![1e5, 2e7], vec![1e6, 1e6]).unwrap();
        let spectrum = EnergyDistributions::evaporation(temperature, 1e6).unwrap();
        let energy = 1.4e7;
        let upper = energy - 1e6;
        let steps = 20_000;
        let h = upper / steps as f64;
        let mut integral = 0.0;
        for k in 0..steps {
            let a = spectrum.pdf(energy, k as f64 * h).unwrap();
            let b = spectrum.pdf(energy, (k + 1) as f64 * h).unwrap();
            integral += 0.5 * h * (a + b);
        }
        assert!((integral - 1.0).abs() < 1e-4, "integral was {}", integral);
        assert_eq!(spectrum.pdf(energy, upper * 1.01).unwrap(), 0.0);
        assert_eq!(spectrum.pdf(5e5, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_evaporation_rejects_bad_temperature() {
        let temperature = TabulatedFunction::linear(vec![1e5, 2e7], vec![0.0, 1e6]).unwrap();
        assert!(EnergyDistributions::evaporation(temperature, 0.0).is_err());
    }

    #[test]
    fn test_product_builder_and_serde() {
        let neutron = ParticleId::new("n").unwrap();
        let product = ReactionProduct::new(neutron, Multiplicity::Integer(1)).with_distribution(
            ProductDistribution::TwoBody {
                frame: ReferenceFrame::CentreOfMass,
                angular: AngularDistributions::Isotropic,
            },
        );
        assert_eq!(product.particle().as_str(), "n");
        assert!(product.average_energy().is_none());
        let distribution = product.distribution().unwrap();
        assert_eq!(distribution.frame(), Some(ReferenceFrame::CentreOfMass));
        assert!(distribution.angular().unwrap().is_isotropic());

        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains(r#""type":"TwoBody""#));
        let back: ReactionProduct = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_photoatomic_forms_have_no_frame() {
        let form_factor = TabulatedFunction::linear(vec![0.0, 1e9], vec![26.0, 0.0]).unwrap();
        let coherent = ProductDistribution::CoherentScattering {
            scattering_function: form_factor,
            real_anomalous: None,
            imaginary_anomalous: None,
        };
        assert_eq!(coherent.frame(), None);
        assert!(coherent.angular().is_none());
    }
}
