//! Payout-rate resolution
//!
//! Resolution order for a bet type:
//!
//! ```text
//! 1. custom_payout_rate                      (per-admin/per-user override)
//! 2. table entry for the selection's region  (north | central | south)
//! 3. table entry keyed by digit count        ("2", "3", "4")
//! 4. table entry south, then central, then north
//! 5. flat rate
//! 6. fallback constant
//! ```

use betcode_types::{BetType, PayoutRate, RegionCode};
use rust_decimal::Decimal;

/// Fallback payout multiplier when a bet type carries no usable rate
pub const DEFAULT_PAYOUT_RATE: Decimal = Decimal::from_parts(70, 0, 0, false, 0);

pub fn resolve_payout_rate(
    bet_type: &BetType,
    region: Option<RegionCode>,
    digits: usize,
    fallback: Decimal,
) -> Decimal {
    if let Some(custom) = bet_type.custom_payout_rate {
        return custom;
    }

    match &bet_type.payout_rate {
        Some(PayoutRate::Flat(rate)) => *rate,
        Some(table @ PayoutRate::Table(_)) => region
            .and_then(|r| table.entry(r.key()))
            .or_else(|| table.entry(&digits.to_string()))
            .or_else(|| {
                RegionCode::FALLBACK_ORDER
                    .iter()
                    .find_map(|r| table.entry(r.key()))
            })
            .unwrap_or(fallback),
        None => fallback,
    }
}
