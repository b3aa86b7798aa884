use crate::config::{Config, DEFAULT_NORMALISATION_TOLERANCE};
use crate::data::{FIRST_SUBSHELL_CODE, SUBSHELLS};
use crate::error::{NucDataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An electron subshell designator such as `K`, `L1` or `M5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubshellId(usize);

impl SubshellId {
    pub fn new(designator: &str) -> Result<Self> {
        SUBSHELLS
            .iter()
            .position(|&s| s == designator)
            .map(SubshellId)
            .ok_or_else(|| NucDataError::MalformedIdentifier(designator.to_string()))
    }

    /// Subshell whose ionisation reaction has the given code.
    pub fn from_ionisation_code(code: i32) -> Option<Self> {
        let index = usize::try_from(code - FIRST_SUBSHELL_CODE).ok()?;
        (index < SUBSHELLS.len()).then_some(SubshellId(index))
    }

    pub fn designator(&self) -> &'static str {
        SUBSHELLS[self.0]
    }

    /// Code of the ionisation (photoelectric) reaction of this subshell.
    pub fn ionisation_code(&self) -> i32 {
        FIRST_SUBSHELL_CODE + self.0 as i32
    }
}

impl FromStr for SubshellId {
    type Err = NucDataError;

    fn from_str(s: &str) -> Result<Self> {
        SubshellId::new(s)
    }
}

impl TryFrom<String> for SubshellId {
    type Error = NucDataError;

    fn try_from(s: String) -> Result<Self> {
        SubshellId::new(&s)
    }
}

impl From<SubshellId> for String {
    fn from(id: SubshellId) -> Self {
        id.designator().to_string()
    }
}

impl fmt::Display for SubshellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.designator())
    }
}

/// Filling of a vacancy by an electron from another subshell with emission
/// of a photon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiativeTransition {
    pub originating_shell: SubshellId,
    pub probability: f64,
    /// Photon energy in eV.
    #[serde(default)]
    pub energy: Option<f64>,
}

/// Filling of a vacancy with emission of an electron from a third subshell
/// (Auger or Coster-Kronig transition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonRadiativeTransition {
    pub originating_shell: SubshellId,
    pub emitting_shell: SubshellId,
    pub probability: f64,
    /// Electron energy in eV.
    #[serde(default)]
    pub energy: Option<f64>,
}

/// Binding energy, occupation and vacancy-filling transitions of one subshell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectronSubshellConfiguration {
    identifier: SubshellId,
    /// Binding energy in eV.
    binding_energy: f64,
    /// Number of electrons in the subshell of the neutral atom.
    population: f64,
    radiative: Vec<RadiativeTransition>,
    non_radiative: Vec<NonRadiativeTransition>,
}

impl ElectronSubshellConfiguration {
    pub fn new(
        identifier: SubshellId,
        binding_energy: f64,
        population: f64,
        radiative: Vec<RadiativeTransition>,
        non_radiative: Vec<NonRadiativeTransition>,
    ) -> Result<Self> {
        let invalid = |reason: String| NucDataError::InvalidTransition {
            subshell: identifier.to_string(),
            reason,
        };
        if !(binding_energy.is_finite() && binding_energy >= 0.0) {
            return Err(invalid(format!("binding energy {} is invalid", binding_energy)));
        }
        if !(population.is_finite() && population >= 0.0) {
            return Err(invalid(format!("population {} is invalid", population)));
        }
        let probabilities = radiative
            .iter()
            .map(|t| (t.originating_shell, t.probability))
            .chain(non_radiative.iter().map(|t| (t.originating_shell, t.probability)));
        for (shell, probability) in probabilities {
            if !(probability.is_finite() && probability >= 0.0) {
                return Err(invalid(format!(
                    "transition from {} has probability {}",
                    shell, probability
                )));
            }
        }
        Ok(Self {
            identifier,
            binding_energy,
            population,
            radiative,
            non_radiative,
        })
    }

    pub fn identifier(&self) -> SubshellId {
        self.identifier
    }

    pub fn binding_energy(&self) -> f64 {
        self.binding_energy
    }

    pub fn population(&self) -> f64 {
        self.population
    }

    pub fn radiative_transitions(&self) -> &[RadiativeTransition] {
        &self.radiative
    }

    pub fn non_radiative_transitions(&self) -> &[NonRadiativeTransition] {
        &self.non_radiative
    }

    pub fn number_transitions(&self) -> usize {
        self.radiative.len() + self.non_radiative.len()
    }

    pub fn has_transitions(&self) -> bool {
        self.number_transitions() > 0
    }

    pub fn total_radiative_probability(&self) -> f64 {
        self.radiative.iter().map(|t| t.probability).sum()
    }

    pub fn total_non_radiative_probability(&self) -> f64 {
        self.non_radiative.iter().map(|t| t.probability).sum()
    }

    pub fn total_probability(&self) -> f64 {
        self.total_radiative_probability() + self.total_non_radiative_probability()
    }

    pub fn is_normalised(&self, tolerance: f64) -> bool {
        (self.total_probability() - 1.0).abs() <= tolerance
    }

    /// [`is_normalised`](Self::is_normalised) with the probability tolerance
    /// of a [`Config`].
    pub fn is_normalised_with(&self, config: &Config) -> bool {
        self.is_normalised(config.probability_tolerance)
    }

    /// Rescale every transition probability so that they sum to one.
    ///
    /// A subshell without transitions is returned as is. A zero or
    /// non-finite total fails with `DegenerateDistribution`.
    pub fn normalise(&self) -> Result<Self> {
        if !self.has_transitions() {
            return Ok(self.clone());
        }
        let total = self.total_probability();
        if total == 0.0 || !total.is_finite() {
            return Err(NucDataError::DegenerateDistribution { integral: total });
        }
        if (total - 1.0).abs() <= DEFAULT_NORMALISATION_TOLERANCE {
            return Ok(self.clone());
        }
        tracing::trace!(subshell = %self.identifier, total, "normalising transition probabilities");
        let mut normalised = self.clone();
        for t in &mut normalised.radiative {
            t.probability /= total;
        }
        for t in &mut normalised.non_radiative {
            t.probability /= total;
        }
        Ok(normalised)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(designator: &str) -> SubshellId {
        SubshellId::new(designator).unwrap()
    }

    fn k_shell(radiative: f64, auger: f64) -> ElectronSubshellConfiguration {
        ElectronSubshellConfiguration::new(
            shell("K"),
            7112.0,
            2.0,
            vec![RadiativeTransition {
                originating_shell: shell("L3"),
                probability: radiative,
                energy: Some(6404.0),
            }],
            vec![NonRadiativeTransition {
                originating_shell: shell("L1"),
                emitting_shell: shell("L1"),
                probability: auger,
                energy: None,
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_subshell_codes() {
        assert_eq!(shell("K").ionisation_code(), 534);
        assert_eq!(shell("L3").ionisation_code(), 537);
        assert_eq!(SubshellId::from_ionisation_code(572), Some(shell("Q3")));
        assert_eq!(SubshellId::from_ionisation_code(533), None);
        assert_eq!(SubshellId::from_ionisation_code(573), None);
        assert!(SubshellId::new("X1").is_err());
        assert_eq!("M5".parse::<SubshellId>().unwrap().to_string(), "M5");
    }

    #[test]
    fn test_normalise() {
        let k = k_shell(0.3, 0.3);
        assert!(!k.is_normalised(1e-12));
        let n = k.normalise().unwrap();
        assert!(n.is_normalised(1e-12));
        assert!(n.is_normalised_with(&Config::default()));
        assert!((n.total_radiative_probability() - 0.5).abs() < 1e-15);
        assert!((n.total_non_radiative_probability() - 0.5).abs() < 1e-15);
        assert_eq!(n.normalise().unwrap(), n);
        assert_eq!(n.binding_energy(), 7112.0);
    }

    #[test]
    fn test_zero_total_is_degenerate() {
        let k = k_shell(0.0, 0.0);
        assert_eq!(
            k.normalise(),
            Err(NucDataError::DegenerateDistribution { integral: 0.0 })
        );
    }

    #[test]
    fn test_no_transitions() {
        let m5 = ElectronSubshellConfiguration::new(shell("M5"), 10.0, 4.0, vec![], vec![]).unwrap();
        assert_eq!(m5.normalise().unwrap(), m5);
        assert_eq!(m5.number_transitions(), 0);
    }

    #[test]
    fn test_invalid_values() {
        let negative = ElectronSubshellConfiguration::new(
            shell("K"),
            7112.0,
            2.0,
            vec![RadiativeTransition {
                originating_shell: shell("L2"),
                probability: -0.1,
                energy: None,
            }],
            vec![],
        );
        assert!(matches!(
            negative,
            Err(NucDataError::InvalidTransition { .. })
        ));
        assert!(ElectronSubshellConfiguration::new(shell("K"), 7112.0, -1.0, vec![], vec![]).is_err());
    }

    #[test]
    fn test_serde_uses_designators() {
        let t = RadiativeTransition {
            originating_shell: shell("L2"),
            probability: 1.0,
            energy: None,
        };
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"originating_shell":"L2","probability":1.0,"energy":null}"#);
    }
}
