use crate::data::{reaction_code, reaction_name};
use crate::error::{NucDataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Characters reserved by the textual reaction symbol
const RESERVED: &[char] = &[',', '>', '[', ']'];

/// Identifier of a particle or target, e.g. `n`, `g`, `e-` or `Fe56`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticleId(String);

impl ParticleId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id.contains(RESERVED) || id.contains(char::is_whitespace) {
            return Err(NucDataError::MalformedIdentifier(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ParticleId {
    type Error = NucDataError;

    fn try_from(id: String) -> Result<Self> {
        ParticleId::new(id)
    }
}

impl From<ParticleId> for String {
    fn from(id: ParticleId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured description of a reaction:
/// `projectile,target->products[tag]`, e.g. `n,Fe56->2n,Fe55` or
/// `e-,H->e-,H[deficit]`. The tag is optional.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReactionSymbol {
    projectile: ParticleId,
    target: ParticleId,
    products: String,
    tag: Option<String>,
}

impl ReactionSymbol {
    pub fn new(
        projectile: ParticleId,
        target: ParticleId,
        products: impl Into<String>,
        tag: Option<String>,
    ) -> Result<Self> {
        let products = products.into();
        let bad_products = products.is_empty() || products.contains(&['>', '[', ']'][..]);
        let bad_tag = tag
            .as_deref()
            .is_some_and(|t| t.is_empty() || t.contains(RESERVED));
        if bad_products || bad_tag {
            return Err(NucDataError::MalformedIdentifier(format!(
                "{},{}->{}",
                projectile, target, products
            )));
        }
        Ok(Self {
            projectile,
            target,
            products,
            tag,
        })
    }

    pub fn projectile(&self) -> &ParticleId {
        &self.projectile
    }

    pub fn target(&self) -> &ParticleId {
        &self.target
    }

    pub fn products(&self) -> &str {
        &self.products
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

impl FromStr for ReactionSymbol {
    type Err = NucDataError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || NucDataError::MalformedIdentifier(s.to_string());
        let (incident, outgoing) = s.split_once("->").ok_or_else(malformed)?;
        let (projectile, target) = incident.split_once(',').ok_or_else(malformed)?;
        let (products, tag) = match outgoing.strip_suffix(']') {
            Some(rest) => {
                let (products, tag) = rest.split_once('[').ok_or_else(malformed)?;
                (products, Some(tag.to_string()))
            }
            None => (outgoing, None),
        };
        ReactionSymbol::new(
            ParticleId::new(projectile).map_err(|_| malformed())?,
            ParticleId::new(target).map_err(|_| malformed())?,
            products,
            tag,
        )
        .map_err(|_| malformed())
    }
}

impl TryFrom<String> for ReactionSymbol {
    type Error = NucDataError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ReactionSymbol> for String {
    fn from(symbol: ReactionSymbol) -> Self {
        symbol.to_string()
    }
}

impl fmt::Display for ReactionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}->{}", self.projectile, self.target, self.products)?;
        if let Some(tag) = &self.tag {
            write!(f, "[{}]", tag)?;
        }
        Ok(())
    }
}

/// Key that distinguishes a reaction from every other reaction.
///
/// A reaction is known by its legacy numeric code (ENDF MT number), by a
/// structured [`ReactionSymbol`], or by both. A negative code marks the
/// deficit partial of the summation whose code is its absolute value.
///
/// Equality and ordering compare the code first and the symbol second.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "ReactionIdData")]
pub struct ReactionId {
    code: Option<i32>,
    symbol: Option<ReactionSymbol>,
}

#[derive(Debug, Clone, Deserialize)]
struct ReactionIdData {
    code: Option<i32>,
    symbol: Option<ReactionSymbol>,
}

impl TryFrom<ReactionIdData> for ReactionId {
    type Error = NucDataError;

    fn try_from(data: ReactionIdData) -> Result<Self> {
        match (data.code, data.symbol) {
            (None, None) => Err(NucDataError::MalformedIdentifier(
                "reaction identifier without code or symbol".to_string(),
            )),
            (code, symbol) => Ok(ReactionId { code, symbol }),
        }
    }
}

impl ReactionId {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            symbol: None,
        }
    }

    pub fn from_symbol(symbol: ReactionSymbol) -> Self {
        Self {
            code: None,
            symbol: Some(symbol),
        }
    }

    pub fn with_code_and_symbol(code: i32, symbol: ReactionSymbol) -> Self {
        Self {
            code: Some(code),
            symbol: Some(symbol),
        }
    }

    /// Identifier of the deficit partial of the summation `total_code`.
    pub fn deficit(total_code: i32) -> Self {
        Self::from_code(-total_code.abs())
    }

    /// Look up a reaction by its conventional name, e.g. `(z,2n)`.
    pub fn from_name(name: &str) -> Result<Self> {
        reaction_code(name)
            .map(Self::from_code)
            .ok_or_else(|| NucDataError::MalformedIdentifier(name.to_string()))
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn symbol(&self) -> Option<&ReactionSymbol> {
        self.symbol.as_ref()
    }

    pub fn is_deficit(&self) -> bool {
        self.code.is_some_and(|c| c < 0)
    }

    /// Conventional name of the reaction code, if any.
    pub fn name(&self) -> Option<&'static str> {
        self.code.filter(|&c| c > 0).and_then(reaction_name)
    }
}

impl From<i32> for ReactionId {
    fn from(code: i32) -> Self {
        ReactionId::from_code(code)
    }
}

impl From<ReactionSymbol> for ReactionId {
    fn from(symbol: ReactionSymbol) -> Self {
        ReactionId::from_symbol(symbol)
    }
}

/// Parses either a (possibly negative) integer code or a structured symbol.
impl FromStr for ReactionId {
    type Err = NucDataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().parse::<i32>() {
            Ok(code) => Ok(ReactionId::from_code(code)),
            Err(_) => Ok(ReactionId::from_symbol(s.trim().parse()?)),
        }
    }
}

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.symbol, self.code) {
            (Some(symbol), _) => write!(f, "{}", symbol),
            (None, Some(code)) => write!(f, "{}", code),
            (None, None) => f.write_str("?"),
        }
    }
}
