//! Bet line parsing and pricing
//!
//! One body line carries a numbers segment, a bet-type alias and a stake
//! amount in thousands:
//!
//! ```text
//! 23.45.67dd10     numbers 23, 45, 67 · alias dd · 10 (= 10 000)
//! tai b5           combination "tai" · alias b · 5
//! 10/12keo20xc2.5  sequence 10..20 step 2 · alias xc · 2.5
//! ```
//!
//! Pricing:
//!
//! ```text
//! stake           = unit × tickets × station_count × price_rate
//! potential_prize = unit × tickets × payout_rate
//! ```

use betcode_types::{BetType, NumberCombination, RegionCode};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use tracing::debug;

use crate::alias::AliasIndex;
use crate::config::ParserOptions;
use crate::diagnostics::{self, Diagnostic};
use crate::error::LineError;
use crate::numbers::{self, Expansion};
use crate::payout::resolve_payout_rate;
use crate::station::StationSelection;

/// Bet type a line was priced under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetTypeRef {
    pub id: i64,
    pub name: String,
    /// Alias as declared in the catalog
    pub alias: String,
}

/// One parsed body line.
///
/// Either `error` is set and every monetary field is zero, or `error` is
/// `None` and `numbers` is non-empty with a uniform digit count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedLine {
    /// 1-based line number in the submission
    pub line_number: usize,
    pub original_text: String,
    /// Numbers as entered (after expansion)
    pub numbers: Vec<String>,
    /// Priced number set; digit permutations for permutation bet types
    pub tickets: Vec<String>,
    pub bet_type: Option<BetTypeRef>,
    /// Amount as entered, in thousands
    pub amount: Decimal,
    pub stake_unit_amount: Decimal,
    pub payout_rate: Decimal,
    pub stake: Decimal,
    pub potential_prize: Decimal,
    pub error: Option<LineError>,
}

impl ParsedLine {
    /// A recorded-but-invalid line
    pub fn rejected(line_number: usize, original_text: &str, error: LineError) -> Self {
        Self {
            line_number,
            original_text: original_text.trim().to_string(),
            numbers: vec![],
            tickets: vec![],
            bet_type: None,
            amount: Decimal::ZERO,
            stake_unit_amount: Decimal::ZERO,
            payout_rate: Decimal::ZERO,
            stake: Decimal::ZERO,
            potential_prize: Decimal::ZERO,
            error: Some(error),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Canonical display form of the line
    pub fn render(&self) -> String {
        match (&self.error, &self.bet_type) {
            (Some(error), _) => format!("{} — Error: {}", self.original_text, error),
            (None, Some(bet_type)) => format!(
                "{}{}{}",
                self.numbers.join("."),
                bet_type.alias,
                self.amount.normalize()
            ),
            (None, None) => self.original_text.clone(),
        }
    }
}

/// Station-derived inputs shared by every line of a submission
#[derive(Debug, Clone, PartialEq)]
pub struct LineContext {
    pub station_count: usize,
    /// Regions of the resolved stations; empty when unknown
    pub regions: Vec<RegionCode>,
    pub pricing_region: Option<RegionCode>,
    pub price_rate: Decimal,
}

impl LineContext {
    /// Context without region information
    pub fn new(station_count: usize, price_rate: Decimal) -> Self {
        Self {
            station_count,
            regions: vec![],
            pricing_region: None,
            price_rate,
        }
    }

    pub fn for_selection(selection: &StationSelection, price_rate: Decimal) -> Self {
        Self {
            station_count: selection.station_count(),
            regions: selection.regions(),
            pricing_region: selection.pricing_region(),
            price_rate,
        }
    }
}

/// Monetary fields of one line
struct Pricing {
    unit: Decimal,
    stake: Decimal,
    potential_prize: Decimal,
}

impl Pricing {
    /// `None` when any product leaves the `Decimal` range
    fn compute(
        amount: Decimal,
        multiplier: Decimal,
        tickets: usize,
        ctx: &LineContext,
        payout_rate: Decimal,
    ) -> Option<Self> {
        let unit = amount.checked_mul(multiplier)?;
        let per_set = unit.checked_mul(Decimal::from(tickets))?;
        let stake = per_set
            .checked_mul(Decimal::from(ctx.station_count))?
            .checked_mul(ctx.price_rate)?;
        let potential_prize = per_set.checked_mul(payout_rate)?;
        Some(Self {
            unit,
            stake,
            potential_prize,
        })
    }
}

/// Parses body lines against one bet-type and combination catalog
pub struct BetLineParser<'a> {
    bet_types: &'a [BetType],
    combos: &'a [NumberCombination],
    aliases: &'a AliasIndex,
    options: &'a ParserOptions,
}

impl<'a> BetLineParser<'a> {
    pub fn new(
        bet_types: &'a [BetType],
        combos: &'a [NumberCombination],
        aliases: &'a AliasIndex,
        options: &'a ParserOptions,
    ) -> Self {
        Self {
            bet_types,
            combos,
            aliases,
            options,
        }
    }

    /// Parse and price one line. Non-fatal findings go to `warnings`.
    pub fn parse_line(
        &self,
        line: &str,
        line_number: usize,
        ctx: &LineContext,
        warnings: &mut Vec<Diagnostic>,
    ) -> Result<ParsedLine, LineError> {
        let hit = self.aliases.find(line).ok_or(LineError::NoValidBetType)?;
        let bet_type = self.applicable_bet_type(hit.bet_types, &ctx.regions)?;

        let numbers = match numbers::expand_token(
            &hit.numbers_segment,
            self.combos,
            self.options.max_expanded_numbers,
        ) {
            Expansion::Unsupported { name, method } => {
                warnings.push(diagnostics::unsupported_combination_warning(&name, &method));
                return Err(if self.options.strict_combinations {
                    LineError::UnsupportedCombinationRule { combination: name }
                } else {
                    LineError::NoValidNumbers
                });
            }
            Expansion::SequenceTooLong { limit } => {
                warnings.push(diagnostics::sequence_too_long_warning(
                    hit.numbers_segment.trim(),
                    limit,
                ));
                return Err(LineError::NoValidNumbers);
            }
            expansion => expansion.into_numbers(),
        };

        let digits = match numbers.first() {
            Some(first) => first.len(),
            None => return Err(LineError::NoValidNumbers),
        };
        if numbers.iter().any(|n| n.len() != digits) {
            return Err(LineError::InconsistentNumberLength { numbers });
        }

        let amount = Decimal::from_str(&hit.amount)
            .ok()
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| LineError::InvalidStakeAmount {
                amount: hit.amount.clone(),
            })?;
        let tickets = numbers::tickets(
            &numbers,
            bet_type.is_permutation,
            self.options.max_expanded_numbers,
        )
        .ok_or_else(|| {
            warnings.push(diagnostics::too_many_tickets_warning(
                &numbers.join("."),
                self.options.max_expanded_numbers,
            ));
            LineError::NoValidNumbers
        })?;
        let payout_rate = resolve_payout_rate(
            bet_type,
            ctx.pricing_region,
            digits,
            self.options.default_payout_rate,
        );

        let Pricing {
            unit,
            stake,
            potential_prize,
        } = Pricing::compute(
            amount,
            self.options.stake_multiplier,
            tickets.len(),
            ctx,
            payout_rate,
        )
        .ok_or_else(|| LineError::InvalidStakeAmount {
            amount: hit.amount.clone(),
        })?;

        debug!(
            "Line {}: {} numbers under '{}' stake={} prize={}",
            line_number,
            tickets.len(),
            bet_type.name,
            stake,
            potential_prize
        );

        Ok(ParsedLine {
            line_number,
            original_text: line.trim().to_string(),
            numbers,
            tickets,
            bet_type: Some(BetTypeRef {
                id: bet_type.id,
                name: bet_type.name.clone(),
                alias: hit.alias.to_string(),
            }),
            amount,
            stake_unit_amount: unit,
            payout_rate,
            stake,
            potential_prize,
            error: None,
        })
    }

    /// First candidate (catalog order) that covers every selected region
    fn applicable_bet_type(
        &self,
        candidates: &[usize],
        regions: &[RegionCode],
    ) -> Result<&'a BetType, LineError> {
        let bet_types = self.bet_types;
        let mut resolved = candidates.iter().filter_map(move |idx| bet_types.get(*idx));

        if let Some(bet_type) = resolved
            .clone()
            .find(|bt| regions.iter().all(|r| bt.applies_to(*r)))
        {
            return Ok(bet_type);
        }

        match resolved.next() {
            Some(first) => {
                let region = regions
                    .iter()
                    .copied()
                    .find(|r| !first.applies_to(*r))
                    .unwrap_or(RegionCode::South);
                Err(LineError::BetTypeNotApplicable {
                    bet_type: first.name.clone(),
                    region,
                })
            }
            None => Err(LineError::NoValidBetType),
        }
    }
}

/// Parse one line with default options and no region information.
pub fn parse_line(
    line: &str,
    bet_types: &[BetType],
    station_count: usize,
    price_rate: Decimal,
    combos: &[NumberCombination],
) -> Result<ParsedLine, LineError> {
    let aliases = AliasIndex::new(bet_types);
    let options = ParserOptions::default();
    let parser = BetLineParser::new(bet_types, combos, &aliases, &options);
    parser.parse_line(
        line,
        1,
        &LineContext::new(station_count, price_rate),
        &mut Vec::new(),
    )
}

// ============================================================================
// Tests
// ============================================================================
