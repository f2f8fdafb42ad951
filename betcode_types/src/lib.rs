//! Bet-code Types - Level 1 Foundation Types
//!
//! Pure data structures for the reference catalogs consumed by the bet-code
//! engine: stations grouped into regions, bet types with their aliases and
//! payout rates, and symbolic number combinations.
//!
//! ## Architecture Level: LEVEL 1 (Foundation)
//!
//! The engine crate depends on this crate; this crate depends on nothing
//! else in the workspace. Catalogs are authored elsewhere (a station
//! directory, a bet-type configuration store) and handed to the engine as
//! read-only snapshots.
//!
//! ## Critical Rules
//!
//! 1. **NO PARSING LOGIC** - expansion, matching and pricing live in `betcode`
//! 2. **SERIALIZABLE** - every type round-trips through serde (YAML/JSON)
//! 3. **IMMUTABLE DURING A PARSE** - nothing here carries interior mutability

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// REGIONS
// ============================================================================

/// One of the three draw groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionCode {
    North,
    Central,
    South,
}

impl RegionCode {
    /// All regions, in the fallback order used for keyed payout tables.
    pub const FALLBACK_ORDER: [RegionCode; 3] =
        [RegionCode::South, RegionCode::Central, RegionCode::North];

    /// Key used in keyed payout tables and serialized catalogs
    pub fn key(&self) -> &'static str {
        match self {
            RegionCode::North => "north",
            RegionCode::Central => "central",
            RegionCode::South => "south",
        }
    }

    /// Two-letter shorthand used in bet-code headers (`mb`, `mt`, `mn`)
    pub fn shorthand(&self) -> &'static str {
        match self {
            RegionCode::North => "mb",
            RegionCode::Central => "mt",
            RegionCode::South => "mn",
        }
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when a region code string is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown region code '{0}'")]
pub struct RegionParseError(pub String);

impl FromStr for RegionCode {
    type Err = RegionParseError;

    /// Accepts the table keys (`north`) and the header shorthands (`mb`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "mb" => Ok(RegionCode::North),
            "central" | "mt" => Ok(RegionCode::Central),
            "south" | "mn" => Ok(RegionCode::South),
            other => Err(RegionParseError(other.to_string())),
        }
    }
}

/// Region metadata carried by every station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    /// Display name, e.g. "Miền Nam"
    pub name: String,
    pub code: RegionCode,
}

// ============================================================================
// STATIONS
// ============================================================================

/// A single lottery draw location.
///
/// Identity is `id`; `name` and `aliases` are case-insensitive lookup keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub region: Region,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Station {
    /// Name followed by every alias
    pub fn lookup_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn region_code(&self) -> RegionCode {
        self.region.code
    }
}

// ============================================================================
// BET TYPES
// ============================================================================

/// Payout multiplier, either flat or keyed.
///
/// Keyed tables use region keys (`north`/`central`/`south`) and/or digit
/// count keys (`"2"`, `"3"`, `"4"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayoutRate {
    Flat(Decimal),
    Table(BTreeMap<String, Decimal>),
}

impl PayoutRate {
    /// Entry for a table key; `None` for flat rates
    pub fn entry(&self, key: &str) -> Option<Decimal> {
        match self {
            PayoutRate::Flat(_) => None,
            PayoutRate::Table(table) => table.get(key).copied(),
        }
    }

    pub fn flat(&self) -> Option<Decimal> {
        match self {
            PayoutRate::Flat(rate) => Some(*rate),
            PayoutRate::Table(_) => None,
        }
    }
}

/// A named wagering rule with the aliases used in shorthand notation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetType {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Regions this bet type may be placed on; empty means every region.
    #[serde(default)]
    pub applicable_regions: Vec<RegionCode>,
    #[serde(default)]
    pub is_permutation: bool,
    #[serde(default)]
    pub payout_rate: Option<PayoutRate>,
    /// Per-admin/per-user override merged in by the caller
    #[serde(default)]
    pub custom_payout_rate: Option<Decimal>,
}

impl BetType {
    pub fn applies_to(&self, region: RegionCode) -> bool {
        self.applicable_regions.is_empty() || self.applicable_regions.contains(&region)
    }
}

// ============================================================================
// NUMBER COMBINATIONS
// ============================================================================

/// Closed set of symbolic number-set generators.
///
/// `Custom` records an authored `calculation_method` string. It is carried
/// through so catalogs load, but it is never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CombinationRule {
    /// Two-digit numbers 50..=99
    Big,
    /// Two-digit numbers 00..=49
    Small,
    Even,
    Odd,
    /// Both digits even
    EvenEven,
    /// Both digits odd
    OddOdd,
    /// Even tens digit, odd units digit
    EvenOdd,
    /// Odd tens digit, even units digit
    OddEven,
    /// 00, 11, .., 99
    Doubles,
    /// Every number whose tens digit is `digit`
    Head { digit: u8 },
    /// Every number whose units digit is `digit`
    Tail { digit: u8 },
    Custom { calculation_method: String },
}

impl CombinationRule {
    pub fn is_supported(&self) -> bool {
        match self {
            CombinationRule::Custom { .. } => false,
            CombinationRule::Head { digit } | CombinationRule::Tail { digit } => *digit <= 9,
            _ => true,
        }
    }
}

/// A named symbolic number set, e.g. "Tài" for all numbers from 50 to 99.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberCombination {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub generator: CombinationRule,
}

impl NumberCombination {
    pub fn lookup_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

// ============================================================================
// TESTS
// ============================================================================
