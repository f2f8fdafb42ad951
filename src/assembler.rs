//! Submission assembly
//!
//! Orchestrates one submission end to end:
//!
//! ```text
//! text ──► header / body split ──► station::resolve ──► BetLineParser per line
//!                                         │                     │
//!                                    ParseError            ParsedLine (ok | error)
//!                                   (aborts all)                │
//!                                                   totals over error-free lines
//!                                                               │
//!                                                       formatted_text
//! ```
//!
//! Station failures abort the submission. Line failures are recorded on the
//! line and never stop sibling lines from being parsed.

use betcode_types::{BetType, NumberCombination, Station};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::alias::AliasIndex;
use crate::config::{Catalogs, ParserOptions};
use crate::diagnostics::{self, Diagnostic, DiagnosticCode};
use crate::error::{ParseError, ParseResult};
use crate::line::{BetLineParser, LineContext, ParsedLine};
use crate::station::{self, StationSelection};

/// Parser output for one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSubmission {
    pub original_text: String,
    pub station_selection: StationSelection,
    pub lines: Vec<ParsedLine>,
    pub total_stake: Decimal,
    pub total_potential_prize: Decimal,
    pub formatted_text: String,
    /// Non-fatal findings, in the order they were raised
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Diagnostic>,
}

impl ParsedSubmission {
    pub fn valid_lines(&self) -> impl Iterator<Item = &ParsedLine> {
        self.lines.iter().filter(|l| l.is_valid())
    }

    pub fn error_lines(&self) -> impl Iterator<Item = &ParsedLine> {
        self.lines.iter().filter(|l| !l.is_valid())
    }

    pub fn has_errors(&self) -> bool {
        self.lines.iter().any(|l| !l.is_valid())
    }
}

/// Parses submissions against one set of catalogs.
///
/// Holds only borrowed catalogs and a precompiled alias index, so one
/// assembler can serve any number of concurrent parses.
pub struct BetCodeAssembler<'a> {
    stations: &'a [Station],
    bet_types: &'a [BetType],
    combos: &'a [NumberCombination],
    aliases: AliasIndex,
    options: ParserOptions,
}

impl<'a> BetCodeAssembler<'a> {
    pub fn new(
        stations: &'a [Station],
        bet_types: &'a [BetType],
        combos: &'a [NumberCombination],
    ) -> Self {
        Self {
            stations,
            bet_types,
            combos,
            aliases: AliasIndex::new(bet_types),
            options: ParserOptions::default(),
        }
    }

    pub fn from_catalogs(catalogs: &'a Catalogs) -> Self {
        Self::new(
            &catalogs.stations,
            &catalogs.bet_types,
            &catalogs.combinations,
        )
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a full submission.
    pub fn parse_submission(
        &self,
        text: &str,
        accessible: &[Station],
        price_rate: Decimal,
    ) -> ParseResult<ParsedSubmission> {
        let mut warnings = Vec::new();

        let numbered: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        let (header_line, selection, body) = match numbered.as_slice() {
            [] => return Err(ParseError::EmptySubmission),
            [(line_number, only)] => {
                let (selection, body) = self.resolve_single_line(only, accessible)?;
                if !body.is_empty() {
                    warnings.push(
                        Diagnostic::info(
                            DiagnosticCode::ImplicitHeader,
                            format!("header '{}' read from the bet line", selection.describe()),
                        )
                        .on_line(*line_number),
                    );
                }
                let body = if body.is_empty() {
                    vec![]
                } else {
                    vec![(*line_number, body)]
                };
                (*line_number, selection, body)
            }
            [(line_number, header), rest @ ..] => (
                *line_number,
                station::resolve(header, self.stations, accessible)?,
                rest.to_vec(),
            ),
        };

        for name in &selection.collapsed_duplicates {
            warnings.push(diagnostics::duplicate_station_warning(name).on_line(header_line));
        }

        let ctx = LineContext::for_selection(&selection, price_rate);
        let parser = BetLineParser::new(self.bet_types, self.combos, &self.aliases, &self.options);

        let mut lines = Vec::with_capacity(body.len());
        for (line_number, raw) in body {
            let mut line_warnings = Vec::new();
            let parsed = parser
                .parse_line(raw, line_number, &ctx, &mut line_warnings)
                .unwrap_or_else(|err| {
                    debug!("Line {} rejected: {}", line_number, err);
                    ParsedLine::rejected(line_number, raw, err)
                });
            warnings.extend(line_warnings.into_iter().map(|w| w.on_line(line_number)));
            lines.push(parsed);
        }

        let (total_stake, total_potential_prize) = lines
            .iter()
            .filter(|l| l.is_valid())
            .fold((Decimal::ZERO, Decimal::ZERO), |(stake, prize), l| {
                (stake + l.stake, prize + l.potential_prize)
            });

        let formatted_text = format_submission(&selection, &lines);

        info!(
            "Parsed submission: {} stations, {} lines ({} rejected), stake={}",
            selection.station_count(),
            lines.len(),
            lines.iter().filter(|l| !l.is_valid()).count(),
            total_stake
        );

        Ok(ParsedSubmission {
            original_text: text.to_string(),
            station_selection: selection,
            lines,
            total_stake,
            total_potential_prize,
            formatted_text,
            warnings,
        })
    }

    /// A lone header with no bets, or header and body on one line.
    fn resolve_single_line<'t>(
        &self,
        line: &'t str,
        accessible: &[Station],
    ) -> ParseResult<(StationSelection, &'t str)> {
        match station::resolve(line, self.stations, accessible) {
            Ok(selection) => return Ok((selection, "")),
            Err(
                err @ (ParseError::StationAccessDenied { .. }
                | ParseError::InsufficientRegionalAccess { .. }
                | ParseError::UnknownRegion { .. }),
            ) => return Err(err),
            Err(_) => {}
        }
        station::resolve_implicit(line, self.stations, accessible)
    }
}

/// Station description followed by one rendered line per parsed line
pub fn format_submission(selection: &StationSelection, lines: &[ParsedLine]) -> String {
    std::iter::once(selection.describe())
        .chain(lines.iter().map(ParsedLine::render))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a submission with default options.
pub fn parse_submission(
    text: &str,
    catalog: &[Station],
    accessible: &[Station],
    bet_types: &[BetType],
    price_rate: Decimal,
    combos: &[NumberCombination],
) -> ParseResult<ParsedSubmission> {
    BetCodeAssembler::new(catalog, bet_types, combos).parse_submission(text, accessible, price_rate)
}

// ============================================================================
// Tests
// ============================================================================
