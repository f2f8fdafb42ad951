//! Submission diagnostics
//!
//! Non-fatal findings attached to a `ParsedSubmission`: things the caller
//! should show the bettor but that did not fail the submission or a line
//! on their own.

use serde::Serialize;

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
}

/// Diagnostic codes for categorizing findings
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// A combination whose rule is not evaluated was referenced
    UnsupportedCombinationRule,
    /// A station appeared more than once in a named header
    DuplicateStation,
    /// A `keo` sequence exceeded the configured expansion bound
    SequenceTooLong,
    /// Digit permutations of a permutation bet exceeded the expansion bound
    TooManyTickets,
    /// Header and body shared a single line
    ImplicitHeader,
}

/// A diagnostic message with an optional 1-based source line
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            line: None,
        }
    }

    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
            line: None,
        }
    }

    /// Attach the 1-based line number
    pub fn on_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

// =============================================================================
// Convenience Builders
// =============================================================================

pub fn unsupported_combination_warning(combination: &str, method: &str) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::UnsupportedCombinationRule,
        format!(
            "combination '{}' uses calculation method '{}' which is not evaluated",
            combination, method
        ),
    )
}

pub fn duplicate_station_warning(station: &str) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::DuplicateStation,
        format!("station '{}' listed more than once; counted once", station),
    )
}

pub fn sequence_too_long_warning(token: &str, limit: usize) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::SequenceTooLong,
        format!("sequence '{}' expands past {} numbers", token, limit),
    )
}

pub fn too_many_tickets_warning(numbers: &str, limit: usize) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticCode::TooManyTickets,
        format!("permutations of '{}' exceed {} tickets", numbers, limit),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_with_line() {
        let diag = duplicate_station_warning("Cà Mau").on_line(1);
        assert!(diag.is_warning());
        assert_eq!(diag.line, Some(1));
        assert!(diag.message.contains("Cà Mau"));
    }

    #[test]
    fn test_info_not_warning() {
        let diag = Diagnostic::info(DiagnosticCode::ImplicitHeader, "split header");
        assert!(!diag.is_warning());
        assert_eq!(diag.line, None);
    }

    #[test]
    fn test_serialized_code_is_snake_case() {
        let diag = unsupported_combination_warning("Lucky", "n % 7");
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["code"], "unsupported_combination_rule");
        assert_eq!(json["severity"], "warning");
    }
}
