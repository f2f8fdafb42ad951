//! betcode: bet-code parsing and settlement for Vietnamese regional lotteries
//!
//! Turns a free-text betting submission into a priced, validated structure:
//! - Station header resolution (regional quota or named stations)
//! - Number-set expansion (combinations, `keo` sequences, literal lists)
//! - Longest-match bet-type alias lookup
//! - Region-aware payout resolution and stake pricing
//! - Per-line failure isolation with submission-level totals
//! - YAML catalog and settings loader
//!
//! The engine is pure: catalogs, accessible stations and the price rate are
//! supplied by the caller, and nothing is mutated during a parse.
//!
//! ```
//! use betcode::parse_submission;
//! use betcode_types::{BetType, PayoutRate, Region, RegionCode, Station};
//! use rust_decimal::Decimal;
//!
//! let stations = vec![Station {
//!     id: 1,
//!     name: "Miền Bắc".into(),
//!     region: Region { id: 1, name: "Miền Bắc".into(), code: RegionCode::North },
//!     aliases: vec!["mb".into()],
//! }];
//! let bet_types = vec![BetType {
//!     id: 1,
//!     name: "Đầu đuôi".into(),
//!     aliases: vec!["dd".into()],
//!     applicable_regions: vec![],
//!     is_permutation: false,
//!     payout_rate: Some(PayoutRate::Flat(Decimal::from(75))),
//!     custom_payout_rate: None,
//! }];
//!
//! let result = parse_submission(
//!     "mb\n23.45.67dd10",
//!     &stations,
//!     &stations,
//!     &bet_types,
//!     Decimal::new(8, 1),
//!     &[],
//! )
//! .unwrap();
//!
//! assert_eq!(result.total_stake, Decimal::from(24_000));
//! assert_eq!(result.total_potential_prize, Decimal::from(2_250_000));
//! ```

pub mod alias;
pub mod assembler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod line;
pub mod normalize;
pub mod numbers;
pub mod payout;
pub mod station;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use alias::{AliasHit, AliasIndex};
pub use assembler::{format_submission, parse_submission, BetCodeAssembler, ParsedSubmission};
pub use config::{CatalogLoader, Catalogs, ParserOptions, Settings};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use error::{ErrorKind, LineError, ParseError, ParseResult};
pub use line::{parse_line, BetLineParser, BetTypeRef, LineContext, ParsedLine};
pub use numbers::{expand, Expansion};
pub use payout::{resolve_payout_rate, DEFAULT_PAYOUT_RATE};
pub use station::{resolve, resolve_implicit, SelectionKind, StationSelection};
