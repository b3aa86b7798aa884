use crate::error::{NucDataError, Result};
use crate::reaction_id::ReactionId;
use crate::reaction_product::ReactionProduct;
use crate::tabulated::TabulatedFunction;
use crate::taxonomy::{self, PresenceQuery, ReactionCategory};
use serde::{Deserialize, Serialize};

/// Identifier and Q-values of a reaction as read by a format adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionMetadata {
    pub id: ReactionId,
    /// Q-value from the rest masses of the entrance and exit channels (eV).
    #[serde(default)]
    pub mass_difference_qvalue: Option<f64>,
    /// Q-value of the reaction including the residual excitation (eV).
    #[serde(default)]
    pub reaction_qvalue: Option<f64>,
}

impl ReactionMetadata {
    pub fn new(id: impl Into<ReactionId>) -> Self {
        Self {
            id: id.into(),
            mass_difference_qvalue: None,
            reaction_qvalue: None,
        }
    }

    pub fn with_qvalues(mut self, mass_difference: f64, reaction: f64) -> Self {
        self.mass_difference_qvalue = Some(mass_difference);
        self.reaction_qvalue = Some(reaction);
        self
    }
}

/// A single reaction channel of a projectile-target pair.
///
/// Reactions are classified on construction. A summation reaction carries
/// the identifiers of the partial reactions whose cross sections add up to
/// its own; primary and derived reactions carry none. Reactions are
/// immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reaction {
    id: ReactionId,
    category: ReactionCategory,
    /// Cross section in barns as a function of incident energy in eV.
    cross_section: TabulatedFunction,
    mass_difference_qvalue: Option<f64>,
    reaction_qvalue: Option<f64>,
    partials: Option<Vec<ReactionId>>,
    /// Products emitted by this reaction (e.g. neutrons, photons, electrons).
    products: Vec<ReactionProduct>,
}

impl Reaction {
    /// Classify a reaction and resolve its partials against the dataset.
    ///
    /// Fails with `UnrecognisedReactionCode` when the identifier has no code
    /// the taxonomy knows (deficit identifiers included: those only come from
    /// [`Reaction::deficit`]), and with `EmptyPartialSet` when a summation
    /// resolves to no partial reaction.
    pub fn build(
        metadata: ReactionMetadata,
        cross_section: TabulatedFunction,
        products: Vec<ReactionProduct>,
        presence: &impl PresenceQuery,
    ) -> Result<Self> {
        let code = match metadata.id.code() {
            Some(code) if code > 0 => code,
            _ => return Err(NucDataError::UnrecognisedReactionCode(metadata.id.to_string())),
        };
        let category = taxonomy::classify(code, presence)?;
        let partials = match category {
            ReactionCategory::Summation => {
                let partials = taxonomy::partials(code, presence)?;
                if partials.is_empty() {
                    return Err(NucDataError::EmptyPartialSet(metadata.id.to_string()));
                }
                Some(partials)
            }
            ReactionCategory::Primary | ReactionCategory::Derived => None,
        };
        tracing::debug!(
            reaction = %metadata.id,
            %category,
            partials = partials.as_ref().map_or(0, Vec::len),
            "built reaction"
        );
        Ok(Self {
            id: metadata.id,
            category,
            cross_section,
            mass_difference_qvalue: metadata.mass_difference_qvalue,
            reaction_qvalue: metadata.reaction_qvalue,
            partials,
            products,
        })
    }

    /// Synthesize the deficit partial of `total` as `total - known`.
    ///
    /// `total` must be a summation listing the deficit of its own code, and
    /// `known` is the large-angle partial with an explicit section. The
    /// result is a derived reaction without products that takes its Q-values
    /// from `known`.
    pub fn deficit(total: &Reaction, known: &Reaction) -> Result<Self> {
        let total_code = total
            .id
            .code()
            .ok_or_else(|| NucDataError::UnrecognisedReactionCode(total.id.to_string()))?;
        let id = ReactionId::deficit(total_code);
        let listed = total
            .partials()
            .is_some_and(|partials| partials.contains(&id));
        if !listed {
            return Err(NucDataError::MissingPartial {
                summation: total.id.to_string(),
                partial: id.to_string(),
            });
        }
        let cross_section = total.cross_section.subtract(&known.cross_section)?;
        tracing::debug!(total = %total.id, known = %known.id, "synthesized deficit reaction");
        Ok(Self {
            id,
            category: ReactionCategory::Derived,
            cross_section,
            mass_difference_qvalue: known.mass_difference_qvalue,
            reaction_qvalue: known.reaction_qvalue,
            partials: None,
            products: Vec::new(),
        })
    }

    pub fn id(&self) -> &ReactionId {
        &self.id
    }

    pub fn category(&self) -> ReactionCategory {
        self.category
    }

    pub fn cross_section(&self) -> &TabulatedFunction {
        &self.cross_section
    }

    /// Cross section at the given incident energy (zero outside the grid).
    pub fn cross_section_at(&self, energy: f64) -> Result<f64> {
        self.cross_section.evaluate(energy)
    }

    pub fn mass_difference_qvalue(&self) -> Option<f64> {
        self.mass_difference_qvalue
    }

    pub fn reaction_qvalue(&self) -> Option<f64> {
        self.reaction_qvalue
    }

    /// Partial reactions; `Some` exactly when the reaction is a summation.
    pub fn partials(&self) -> Option<&[ReactionId]> {
        self.partials.as_deref()
    }

    pub fn products(&self) -> &[ReactionProduct] {
        &self.products
    }

    pub fn is_primary(&self) -> bool {
        self.category == ReactionCategory::Primary
    }

    pub fn is_summation(&self) -> bool {
        self.category == ReactionCategory::Summation
    }

    pub fn is_derived(&self) -> bool {
        self.category == ReactionCategory::Derived
    }
}
