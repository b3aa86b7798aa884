use crate::error::{NucDataError, Result};
use crate::reaction::Reaction;
use crate::reaction_id::{ParticleId, ReactionId};
use crate::tabulated::TabulatedFunction;
use crate::taxonomy::DEFICIT_RULES;
use serde::Serialize;
use std::collections::BTreeSet;

/// The reactions of a projectile incident on a target, e.g. neutrons on
/// Fe56 or electrons on hydrogen.
///
/// Construction checks that identifiers are unique and that every partial
/// listed by a summation is available. Deficit partials that the source
/// data does not supply are synthesized from their summation and its
/// large-angle partial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileTarget {
    projectile: ParticleId,
    target: ParticleId,
    /// Sorted by reaction identifier.
    reactions: Vec<Reaction>,
}

impl ProjectileTarget {
    pub fn new(projectile: ParticleId, target: ParticleId, mut reactions: Vec<Reaction>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for reaction in &reactions {
            if !seen.insert(reaction.id().clone()) {
                return Err(NucDataError::DuplicateReaction(reaction.id().to_string()));
            }
        }

        let synthesized = synthesize_deficits(&reactions, &seen)?;
        reactions.extend(synthesized);
        reactions.sort_by(|a, b| a.id().cmp(b.id()));

        let set = Self {
            projectile,
            target,
            reactions,
        };
        set.check_partials()?;
        tracing::debug!(
            projectile = %set.projectile,
            target = %set.target,
            reactions = set.reactions.len(),
            "assembled projectile-target data"
        );
        Ok(set)
    }

    fn check_partials(&self) -> Result<()> {
        for summation in self.summation_reactions() {
            for partial in summation.partials().unwrap_or_default() {
                if !self.has_reaction(partial) {
                    return Err(NucDataError::MissingPartial {
                        summation: summation.id().to_string(),
                        partial: partial.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn projectile(&self) -> &ParticleId {
        &self.projectile
    }

    pub fn target(&self) -> &ParticleId {
        &self.target
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn number_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn reaction(&self, id: &ReactionId) -> Option<&Reaction> {
        self.reactions
            .binary_search_by(|r| r.id().cmp(id))
            .ok()
            .map(|i| &self.reactions[i])
    }

    pub fn has_reaction(&self, id: &ReactionId) -> bool {
        self.reaction(id).is_some()
    }

    pub fn summation_reactions(&self) -> impl Iterator<Item = &Reaction> + '_ {
        self.reactions.iter().filter(|r| r.is_summation())
    }

    /// Sum of the partial cross sections of a summation reaction, on the
    /// union of the partial grids.
    pub fn partial_sum(&self, id: &ReactionId) -> Result<TabulatedFunction> {
        let summation = self
            .reaction(id)
            .ok_or_else(|| NucDataError::UnrecognisedReactionCode(id.to_string()))?;
        let partials = summation
            .partials()
            .ok_or_else(|| NucDataError::EmptyPartialSet(id.to_string()))?;
        let mut cross_sections = partials.iter().map(|partial| {
            self.reaction(partial)
                .map(Reaction::cross_section)
                .ok_or_else(|| NucDataError::MissingPartial {
                    summation: id.to_string(),
                    partial: partial.to_string(),
                })
        });
        let first = cross_sections
            .next()
            .ok_or_else(|| NucDataError::EmptyPartialSet(id.to_string()))??
            .clone();
        cross_sections.try_fold(first, |sum, xs| sum.add(xs?))
    }

    /// Summation cross section minus the sum of its partials.
    ///
    /// A consistent dataset gives a residual that vanishes at every grid
    /// point (to linearisation accuracy).
    pub fn summation_residual(&self, id: &ReactionId) -> Result<TabulatedFunction> {
        let sum = self.partial_sum(id)?;
        let summation = self
            .reaction(id)
            .ok_or_else(|| NucDataError::UnrecognisedReactionCode(id.to_string()))?;
        summation.cross_section().subtract(&sum)
    }
}

fn synthesize_deficits(reactions: &[Reaction], available: &BTreeSet<ReactionId>) -> Result<Vec<Reaction>> {
    let find = |id: &ReactionId| reactions.iter().find(|r| r.id() == id);
    let mut synthesized = Vec::new();
    for rule in DEFICIT_RULES {
        let id = ReactionId::deficit(rule.total);
        if available.contains(&id) {
            continue;
        }
        let listing = reactions
            .iter()
            .filter(|r| r.is_summation())
            .find(|r| r.partials().is_some_and(|partials| partials.contains(&id)));
        let Some(listing) = listing else {
            continue;
        };
        let total_id = ReactionId::from_code(rule.total);
        let total = find(&total_id).ok_or_else(|| NucDataError::MissingPartial {
            summation: listing.id().to_string(),
            partial: total_id.to_string(),
        })?;
        let large_angle = ReactionId::from_code(rule.large_angle);
        let known = find(&large_angle).ok_or_else(|| NucDataError::MissingPartial {
            summation: total_id.to_string(),
            partial: large_angle.to_string(),
        })?;
        synthesized.push(Reaction::deficit(total, known)?);
    }
    Ok(synthesized)
}
