pub mod data;
// Core modules; types are re-exported at the crate root
mod atomic;
mod config;
mod covariance;
mod distribution;
mod error;
mod interpolation;
mod projectile_target;
mod reaction;
mod reaction_id;
mod reaction_product;
mod tabulated;
pub mod taxonomy;

pub use atomic::{
    ElectronSubshellConfiguration, NonRadiativeTransition, RadiativeTransition, SubshellId,
};
pub use config::{
    Config, DEFAULT_LINEARISATION_TOLERANCE, DEFAULT_NORMALISATION_TOLERANCE,
    DEFAULT_PROBABILITY_TOLERANCE,
};
pub use covariance::{CovarianceBlock, CovarianceMetadata, RawMatrix, ScalingKind, VarianceScaling};
pub use distribution::{normalise, IncidentEnergyTable, TabulatedDistribution};
pub use error::{NucDataError, Result};
pub use interpolation::InterpolationLaw;
pub use projectile_target::ProjectileTarget;
pub use reaction::{Reaction, ReactionMetadata};
pub use reaction_id::{ParticleId, ReactionId, ReactionSymbol};
pub use reaction_product::{
    AngularDistributions, EnergyDistributions, Multiplicity, ProductDistribution,
    ReactionProduct, ReferenceFrame,
};
pub use tabulated::{boundaries_from_nbt, Region, TabulatedFunction, MAX_LINEARISATION_DEPTH};
pub use taxonomy::{PresenceQuery, ReactionCategory, SectionIndex};
