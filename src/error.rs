//! Typed error model for bet-code parsing.
//!
//! Two levels, matching how failures propagate:
//!
//! ```text
//! ParseError  → submission-level, returned as Err, nothing is priced
//!               (structural + authorization failures)
//! LineError   → recorded on one ParsedLine, siblings keep parsing
//! ```
//!
//! `thiserror` for every enum, no manual `Display` impls.

use betcode_types::RegionCode;
use serde::Serialize;

/// Coarse classification of a submission-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The submission cannot be parsed at all
    Structural,
    /// Station selection is unknown or not permitted for the caller
    Authorization,
}

/// Submission-level failure. Aborts the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ParseError {
    #[error("Submission is empty")]
    EmptySubmission,

    #[error("Missing station header")]
    MissingStationHeader,

    #[error("Unknown station '{token}'{}", .suggestion.as_ref().map(|s| format!(" (did you mean '{}'?)", s)).unwrap_or_default())]
    UnknownStation {
        token: String,
        suggestion: Option<String>,
    },

    #[error("Station '{token}' is ambiguous: {}", .candidates.join(", "))]
    AmbiguousStation {
        token: String,
        candidates: Vec<String>,
    },

    #[error("No access to station '{station}'")]
    StationAccessDenied { station: String },

    #[error("Requested {requested} stations in {region} but only {available} are accessible")]
    InsufficientRegionalAccess {
        region: RegionCode,
        requested: usize,
        available: usize,
    },

    #[error("No station is registered for region {region}")]
    UnknownRegion { region: RegionCode },
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::EmptySubmission | ParseError::MissingStationHeader => {
                ErrorKind::Structural
            }
            ParseError::UnknownStation { .. }
            | ParseError::AmbiguousStation { .. }
            | ParseError::StationAccessDenied { .. }
            | ParseError::InsufficientRegionalAccess { .. }
            | ParseError::UnknownRegion { .. } => ErrorKind::Authorization,
        }
    }
}

/// Per-line validation failure. Recorded on the line, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum LineError {
    #[error("No valid bet type found")]
    NoValidBetType,

    #[error("No valid numbers found")]
    NoValidNumbers,

    #[error("Numbers must all have the same number of digits: {}", .numbers.join(", "))]
    InconsistentNumberLength { numbers: Vec<String> },

    #[error("Combination '{combination}' uses an unsupported calculation rule")]
    UnsupportedCombinationRule { combination: String },

    #[error("Bet type '{bet_type}' is not available in {region}")]
    BetTypeNotApplicable { bet_type: String, region: RegionCode },

    #[error("Invalid stake amount '{amount}'")]
    InvalidStakeAmount { amount: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ParseError::EmptySubmission.kind(), ErrorKind::Structural);
        assert_eq!(ParseError::MissingStationHeader.kind(), ErrorKind::Structural);
        assert_eq!(
            ParseError::UnknownRegion {
                region: RegionCode::South
            }
            .kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            ParseError::StationAccessDenied {
                station: "Cà Mau".into()
            }
            .kind(),
            ErrorKind::Authorization
        );
    }

    #[test]
    fn test_unknown_station_message_with_suggestion() {
        let err = ParseError::UnknownStation {
            token: "dong thap".into(),
            suggestion: Some("Đồng Tháp".into()),
        };
        assert_eq!(
            err.to_string(),
            "Unknown station 'dong thap' (did you mean 'Đồng Tháp'?)"
        );

        let bare = ParseError::UnknownStation {
            token: "xyz".into(),
            suggestion: None,
        };
        assert_eq!(bare.to_string(), "Unknown station 'xyz'");
    }

    #[test]
    fn test_line_error_messages() {
        let err = LineError::InconsistentNumberLength {
            numbers: vec!["12".into(), "345".into()],
        };
        assert_eq!(
            err.to_string(),
            "Numbers must all have the same number of digits: 12, 345"
        );

        let json = serde_json::to_value(&LineError::NoValidBetType).unwrap();
        assert_eq!(json["error"], "no_valid_bet_type");
    }
}
