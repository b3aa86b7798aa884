// Reaction classification tables and the partial-reaction graph
use crate::error::{NucDataError, Result};
use crate::reaction_id::ReactionId;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::RangeInclusive;

/// Container holding general information (fission neutron yields, energy release).
pub const GENERAL_INFORMATION: i32 = 1;
/// Container holding incident-particle reaction cross sections.
pub const NUCLEAR_CROSS_SECTIONS: i32 = 3;
/// Container holding fission product yields.
pub const FISSION_PRODUCT_YIELDS: i32 = 8;
/// Container holding photo- and electro-atomic cross sections.
pub const ATOMIC_CROSS_SECTIONS: i32 = 23;

/// Valid range of legacy reaction codes.
pub const VALID_CODES: RangeInclusive<i32> = 1..=999;

/// Place of a reaction in the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionCategory {
    /// Independently tabulated cross section.
    Primary,
    /// Cross section equal to the sum of its partial reactions.
    Summation,
    /// Quantity computed from other data (difference or composition).
    Derived,
}

impl fmt::Display for ReactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReactionCategory::Primary => "primary",
            ReactionCategory::Summation => "summation",
            ReactionCategory::Derived => "derived",
        };
        f.write_str(name)
    }
}

/// Answers whether the source dataset holds a section.
///
/// Format adapters supply this capability; the taxonomy never looks at a
/// format's tree itself. `container_kind` is the file/container the section
/// lives in (see [`container_kind`]) and `probe_code` the reaction code.
pub trait PresenceQuery {
    fn contains(&self, container_kind: i32, probe_code: i32) -> bool;
}

impl<F> PresenceQuery for F
where
    F: Fn(i32, i32) -> bool,
{
    fn contains(&self, container_kind: i32, probe_code: i32) -> bool {
        self(container_kind, probe_code)
    }
}

/// A set of `(container, code)` pairs describing which sections exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionIndex {
    sections: BTreeSet<(i32, i32)>,
}

impl SectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the given reaction codes, each in its natural container.
    pub fn from_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        let sections = codes
            .into_iter()
            .map(|code| (container_kind(code), code))
            .collect();
        Self { sections }
    }

    pub fn insert(&mut self, container_kind: i32, code: i32) {
        self.sections.insert((container_kind, code));
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl PresenceQuery for SectionIndex {
    fn contains(&self, container_kind: i32, probe_code: i32) -> bool {
        self.sections.contains(&(container_kind, probe_code))
    }
}

/// Container in which the section of a reaction code lives.
pub fn container_kind(code: i32) -> i32 {
    match code {
        452 | 455 | 456 | 458 => GENERAL_INFORMATION,
        454 | 459 => FISSION_PRODUCT_YIELDS,
        501..=572 => ATOMIC_CROSS_SECTIONS,
        _ => NUCLEAR_CROSS_SECTIONS,
    }
}

// Codes whose data is computed from other data
const DERIVED: &[RangeInclusive<i32>] = &[10..=10, 251..=253, 452..=452, 454..=456, 458..=459];

// Codes that are always the sum of other reactions
const SUMMATION_ONLY: &[RangeInclusive<i32>] = &[
    1..=1,
    3..=4,
    16..=16,
    27..=27,
    101..=101,
    501..=501,
    516..=516,
    522..=522,
    526..=526,
];

// Codes that always carry their own cross section
const PRIMARY_ONLY: &[RangeInclusive<i32>] = &[
    2..=2,
    5..=5,
    11..=11,
    17..=17,
    19..=25,
    28..=30,
    32..=38,
    41..=42,
    44..=45,
    50..=91,
    102..=102,
    108..=109,
    111..=117,
    152..=200,
    502..=502,
    504..=504,
    515..=515,
    517..=517,
    525..=525,
    527..=528,
    534..=572,
    600..=849,
    875..=891,
];

/// Codes whose category depends on the dataset, with the probe code whose
/// presence makes them a summation.
///
/// Fission is a summation when first-chance fission is given separately; the
/// charged-particle productions are summations when their discrete levels
/// are given.
const CONTEXT_DEPENDENT: &[(i32, i32)] = &[
    (18, 19),
    (103, 600),
    (104, 650),
    (105, 700),
    (106, 750),
    (107, 800),
];

/// How the candidate partials of a summation code are obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidatePartials {
    /// A fixed, ordered list of codes.
    Codes(Vec<i32>),
    /// Every primary code present in the same container, except those listed.
    AllPrimary { exclude: &'static [i32] },
}

/// Candidate partial codes for every summation and context-dependent code.
pub static CANDIDATE_PARTIALS: Lazy<HashMap<i32, CandidatePartials>> = Lazy::new(|| {
    use CandidatePartials::*;
    let mut disappearance: Vec<i32> = (102..=117).filter(|&c| c != 110).collect();
    disappearance.extend([155, 182, 191, 192, 193, 197]);
    [
        (1, AllPrimary { exclude: &[] }),
        (3, AllPrimary { exclude: &[2] }),
        (4, Codes((50..=91).collect())),
        (16, Codes((875..=891).collect())),
        (18, Codes(vec![19, 20, 21, 38])),
        (27, Codes(vec![18, 101])),
        (101, Codes(disappearance)),
        (103, Codes((600..=649).collect())),
        (104, Codes((650..=699).collect())),
        (105, Codes((700..=749).collect())),
        (106, Codes((750..=799).collect())),
        (107, Codes((800..=849).collect())),
        (501, AllPrimary { exclude: &[] }),
        (516, Codes(vec![515, 517])),
        (522, Codes((534..=572).collect())),
        (526, Codes(vec![525])),
    ]
    .into_iter()
    .collect()
});

/// A summation made of a large-angle piece with its own section and a
/// deficit piece that is only known as the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeficitRule {
    /// The summation (total) code.
    pub total: i32,
    /// The large-angle partial that has an explicit section.
    pub large_angle: i32,
}

/// Every summation with a documented deficit partial.
///
/// Electro-atomic total elastic scattering (526) is large-angle elastic
/// scattering (525) plus the elastic deficit (-526).
pub const DEFICIT_RULES: &[DeficitRule] = &[DeficitRule {
    total: 526,
    large_angle: 525,
}];

fn in_ranges(ranges: &[RangeInclusive<i32>], code: i32) -> bool {
    ranges.iter().any(|r| r.contains(&code))
}

fn context_probe(code: i32) -> Option<i32> {
    CONTEXT_DEPENDENT
        .iter()
        .find(|&&(c, _)| c == code)
        .map(|&(_, probe)| probe)
}

/// True if the code lies in the valid range and the taxonomy classifies it.
pub fn is_known(code: i32) -> bool {
    VALID_CODES.contains(&code)
        && (in_ranges(DERIVED, code)
            || in_ranges(SUMMATION_ONLY, code)
            || in_ranges(PRIMARY_ONLY, code)
            || context_probe(code).is_some())
}

/// The deficit rule whose summation is `total`, if any.
pub fn deficit_rule(total: i32) -> Option<&'static DeficitRule> {
    DEFICIT_RULES.iter().find(|rule| rule.total == total)
}

/// Classify a reaction code.
///
/// Context-dependent codes consult the presence query for their probe code:
/// present means Summation, absent means Primary. Every other code is
/// answered from the static tables without touching the query.
pub fn classify(code: i32, presence: &impl PresenceQuery) -> Result<ReactionCategory> {
    if !VALID_CODES.contains(&code) {
        return Err(NucDataError::UnrecognisedReactionCode(code.to_string()));
    }
    let category = if in_ranges(DERIVED, code) {
        ReactionCategory::Derived
    } else if in_ranges(SUMMATION_ONLY, code) {
        ReactionCategory::Summation
    } else if in_ranges(PRIMARY_ONLY, code) {
        ReactionCategory::Primary
    } else if let Some(probe) = context_probe(code) {
        if presence.contains(container_kind(probe), probe) {
            ReactionCategory::Summation
        } else {
            ReactionCategory::Primary
        }
    } else {
        return Err(NucDataError::UnrecognisedReactionCode(code.to_string()));
    };
    tracing::trace!(code, %category, "classified reaction code");
    Ok(category)
}

/// Classify a reaction identifier. Deficit identifiers are Derived when a
/// deficit rule exists for their summation.
pub fn classify_id(id: &ReactionId, presence: &impl PresenceQuery) -> Result<ReactionCategory> {
    match id.code() {
        Some(code) if code < 0 => deficit_rule(-code)
            .map(|_| ReactionCategory::Derived)
            .ok_or_else(|| NucDataError::UnrecognisedReactionCode(id.to_string())),
        Some(code) => classify(code, presence),
        None => Err(NucDataError::UnrecognisedReactionCode(id.to_string())),
    }
}

/// Resolve the partial reactions of a code against the dataset.
///
/// Candidates are filtered down to the codes whose sections are present,
/// keeping candidate order. Totals defined as "every primary present" are
/// computed by walking every known code of the same container in ascending
/// order. Deficit rules then insert the deficit identifier right after its
/// large-angle partial. Codes that are not summations resolve to an empty
/// list.
pub fn partials(code: i32, presence: &impl PresenceQuery) -> Result<Vec<ReactionId>> {
    if classify(code, presence)? != ReactionCategory::Summation {
        return Ok(Vec::new());
    }
    let resolved: Vec<i32> = match CANDIDATE_PARTIALS.get(&code) {
        Some(CandidatePartials::Codes(candidates)) => candidates
            .iter()
            .copied()
            .filter(|&c| presence.contains(container_kind(c), c))
            .collect(),
        Some(CandidatePartials::AllPrimary { exclude }) => {
            all_present_primaries(container_kind(code), exclude, presence)
        }
        None => Vec::new(),
    };

    let mut ids: Vec<ReactionId> = resolved.into_iter().map(ReactionId::from_code).collect();
    insert_deficits(code, &mut ids, presence);
    Ok(ids)
}

fn all_present_primaries(
    container: i32,
    exclude: &[i32],
    presence: &impl PresenceQuery,
) -> Vec<i32> {
    VALID_CODES
        .filter(|&c| container_kind(c) == container && !exclude.contains(&c))
        .filter(|&c| presence.contains(container, c))
        .filter(|&c| matches!(classify(c, presence), Ok(ReactionCategory::Primary)))
        .collect()
}

fn insert_deficits(code: i32, ids: &mut Vec<ReactionId>, presence: &impl PresenceQuery) {
    for rule in DEFICIT_RULES {
        let applies = code == rule.total
            || presence.contains(container_kind(rule.total), rule.total);
        if !applies {
            continue;
        }
        if let Some(position) = ids.iter().position(|id| id.code() == Some(rule.large_angle)) {
            tracing::debug!(
                summation = code,
                total = rule.total,
                large_angle = rule.large_angle,
                "inserting deficit partial"
            );
            ids.insert(position + 1, ReactionId::deficit(rule.total));
        }
    }
}
