//! Configuration types
//!
//! `settings.yaml` carries the commission rate and parser options; the
//! three catalog files carry the reference data.

use betcode_types::{BetType, NumberCombination, Station};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::numbers::DEFAULT_MAX_EXPANDED_NUMBERS;
use crate::payout::DEFAULT_PAYOUT_RATE;

/// Entered amounts are in thousands
pub const DEFAULT_STAKE_MULTIPLIER: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Parser behavior switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Fail lines that reference an unsupported combination with
    /// `UnsupportedCombinationRule` instead of `NoValidNumbers`
    pub strict_combinations: bool,
    /// Upper bound on numbers produced by one `keo` sequence
    pub max_expanded_numbers: usize,
    /// Multiplier applied to the entered stake amount
    pub stake_multiplier: Decimal,
    /// Payout rate used when a bet type resolves to none
    pub default_payout_rate: Decimal,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            strict_combinations: false,
            max_expanded_numbers: DEFAULT_MAX_EXPANDED_NUMBERS,
            stake_multiplier: DEFAULT_STAKE_MULTIPLIER,
            default_payout_rate: DEFAULT_PAYOUT_RATE,
        }
    }
}

/// Contents of `settings.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Commission multiplier applied to every stake
    pub price_rate: Decimal,
    #[serde(default)]
    pub options: ParserOptions,
    /// Per-deployment payout overrides, bet type id → rate
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub payout_overrides: HashMap<i64, Decimal>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            price_rate: Decimal::ONE,
            options: ParserOptions::default(),
            payout_overrides: HashMap::new(),
        }
    }
}

/// Loaded reference catalogs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogs {
    pub stations: Vec<Station>,
    pub bet_types: Vec<BetType>,
    pub combinations: Vec<NumberCombination>,
}

impl Catalogs {
    /// Merge per-user payout overrides (bet type id → rate) into the
    /// bet-type catalog. Unknown ids are ignored.
    pub fn apply_payout_overrides(&mut self, overrides: &HashMap<i64, Decimal>) {
        for bet_type in &mut self.bet_types {
            if let Some(rate) = overrides.get(&bet_type.id) {
                bet_type.custom_payout_rate = Some(*rate);
            }
        }
    }

    /// Stations whose id is listed; all stations when `ids` is empty
    pub fn stations_with_ids(&self, ids: &[i64]) -> Vec<Station> {
        self.stations
            .iter()
            .filter(|s| ids.is_empty() || ids.contains(&s.id))
            .cloned()
            .collect()
    }
}
