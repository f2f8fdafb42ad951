//! Station selector resolution
//!
//! The first line of a submission names the stations every bet line is
//! placed on. Two mutually exclusive forms, tried in order:
//!
//! ```text
//! 3dmn                    regional quota: <count>d<region>, region ∈ mn|mt|mb|n|t|b
//! 3 stations in Miền Nam  regional quota as rendered by `describe`
//! tp.dt, cm               named stations: tokens split on '.' or ','
//! ```
//!
//! Named tokens match a station name or alias exactly (folded), then by
//! substring containment. Every resolved station must be in the caller's
//! accessible set.

use betcode_types::{RegionCode, Station};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{digit1, multispace1},
    combinator::{all_consuming, value},
    error::ParseError as NomParseError,
    sequence::delimited,
    IResult,
};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::normalize::fold_key;

/// Minimum Jaro-Winkler score for an "unknown station" suggestion
const SUGGESTION_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Regional,
    Named,
}

/// Stations a submission is placed on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSelection {
    pub kind: SelectionKind,
    /// Set for regional quotas only
    pub region: Option<RegionCode>,
    pub requested_count: usize,
    pub resolved_stations: Vec<Station>,
    /// Names of stations listed more than once in a named header
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collapsed_duplicates: Vec<String>,
}

impl StationSelection {
    pub fn station_count(&self) -> usize {
        self.resolved_stations.len()
    }

    /// Distinct regions covered by the resolved stations, sorted
    pub fn regions(&self) -> Vec<RegionCode> {
        let mut regions: Vec<RegionCode> = self
            .resolved_stations
            .iter()
            .map(Station::region_code)
            .collect();
        regions.sort();
        regions.dedup();
        regions
    }

    /// Region used to pick a keyed payout rate; `None` when stations span
    /// several regions.
    pub fn pricing_region(&self) -> Option<RegionCode> {
        if let Some(region) = self.region {
            return Some(region);
        }
        match self.regions().as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    /// Human-readable station line for the formatted submission
    pub fn describe(&self) -> String {
        match self.kind {
            SelectionKind::Named => self
                .resolved_stations
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            SelectionKind::Regional => {
                let region_name = self
                    .resolved_stations
                    .first()
                    .map(|s| s.region.name.clone())
                    .or_else(|| self.region.map(|r| r.to_string()))
                    .unwrap_or_default();
                format!("{} stations in {}", self.requested_count, region_name)
            }
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Resolve a header line into a station selection.
pub fn resolve(
    header: &str,
    catalog: &[Station],
    accessible: &[Station],
) -> ParseResult<StationSelection> {
    let header = header.trim();
    if header.is_empty() {
        return Err(ParseError::MissingStationHeader);
    }

    if let Some((count, region)) = parse_regional_quota(header)
        .or_else(|| parse_regional_description(header, catalog))
    {
        return resolve_regional(count, region, catalog, accessible);
    }

    resolve_named(header, catalog, accessible)
}

/// Resolve a single-line submission whose header and body share a line.
///
/// The line is split at whitespace boundaries; the longest prefix that
/// resolves is the header. Access failures on a recognized
/// station are returned as-is; if no prefix names a station the result is
/// `MissingStationHeader`.
pub fn resolve_implicit<'a>(
    line: &'a str,
    catalog: &[Station],
    accessible: &[Station],
) -> ParseResult<(StationSelection, &'a str)> {
    let line = line.trim();
    let boundaries: Vec<usize> = line
        .char_indices()
        .filter(|(_, ch)| ch.is_whitespace())
        .map(|(idx, _)| idx)
        .collect();

    // Longest prefix first so multi-word station names win over their
    // first word.
    for idx in boundaries.into_iter().rev() {
        let (header, body) = line.split_at(idx);
        let body = body.trim();
        if header.trim().is_empty() || body.is_empty() {
            continue;
        }
        match resolve(header, catalog, accessible) {
            Ok(selection) => {
                debug!("Implicit header '{}' resolved", header);
                return Ok((selection, body));
            }
            Err(
                err @ (ParseError::StationAccessDenied { .. }
                | ParseError::InsufficientRegionalAccess { .. }
                | ParseError::UnknownRegion { .. }),
            ) => return Err(err),
            Err(_) => continue,
        }
    }

    Err(ParseError::MissingStationHeader)
}

/// Recognize `<count>d<region>`; zero counts are not a quota.
pub fn parse_regional_quota(header: &str) -> Option<(usize, RegionCode)> {
    let (_, (digits, region)) =
        all_consuming(regional_quota::<nom::error::Error<&str>>)(header.trim()).ok()?;
    digits
        .parse::<usize>()
        .ok()
        .filter(|count| *count > 0)
        .map(|count| (count, region))
}

/// Recognize `<count> stations in <region>`, the rendered form of a quota.
///
/// The region is a catalog region name or a region code, compared folded.
pub fn parse_regional_description(
    header: &str,
    catalog: &[Station],
) -> Option<(usize, RegionCode)> {
    let folded = fold_key(header);
    let (region_text, digits) =
        regional_description::<nom::error::Error<&str>>(folded.as_str()).ok()?;
    let count = digits.parse::<usize>().ok().filter(|count| *count > 0)?;

    let region = catalog
        .iter()
        .find(|s| fold_key(&s.region.name) == region_text)
        .map(Station::region_code)
        .or_else(|| region_text.parse::<RegionCode>().ok())?;
    Some((count, region))
}

// ============================================================================
// Internal Parsers
// ============================================================================

/// `<count> stations in ` on folded text; the remainder is the region
fn regional_description<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, &'a str, E> {
    let (input, count) = digit1(input)?;
    let (input, _) = delimited(
        multispace1,
        alt((tag("stations"), tag("station"))),
        multispace1,
    )(input)?;
    let (input, _) = tag("in")(input)?;
    let (input, _) = multispace1(input)?;
    Ok((input, count))
}

fn regional_quota<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (&'a str, RegionCode), E> {
    let (input, count) = digit1(input)?;
    let (input, _) = tag_no_case("d")(input)?;
    // Two-letter shorthands first so "mn" is not read as "m" + "n"
    let (input, region) = alt((
        value(RegionCode::South, tag_no_case("mn")),
        value(RegionCode::Central, tag_no_case("mt")),
        value(RegionCode::North, tag_no_case("mb")),
        value(RegionCode::South, tag_no_case("n")),
        value(RegionCode::Central, tag_no_case("t")),
        value(RegionCode::North, tag_no_case("b")),
    ))(input)?;
    Ok((input, (count, region)))
}

// ============================================================================
// Resolution
// ============================================================================

fn resolve_regional(
    count: usize,
    region: RegionCode,
    catalog: &[Station],
    accessible: &[Station],
) -> ParseResult<StationSelection> {
    if !catalog.iter().any(|s| s.region_code() == region) {
        return Err(ParseError::UnknownRegion { region });
    }

    let in_region: Vec<&Station> = accessible
        .iter()
        .filter(|s| s.region_code() == region)
        .collect();

    if in_region.len() < count {
        return Err(ParseError::InsufficientRegionalAccess {
            region,
            requested: count,
            available: in_region.len(),
        });
    }

    debug!("Regional quota {} in {} resolved", count, region);

    Ok(StationSelection {
        kind: SelectionKind::Regional,
        region: Some(region),
        requested_count: count,
        resolved_stations: in_region.into_iter().take(count).cloned().collect(),
        collapsed_duplicates: vec![],
    })
}

/// Folded lookup keys for one catalog station
struct StationKeys<'a> {
    station: &'a Station,
    keys: Vec<String>,
}

fn resolve_named(
    header: &str,
    catalog: &[Station],
    accessible: &[Station],
) -> ParseResult<StationSelection> {
    let tokens: Vec<&str> = header
        .split(['.', ','])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(ParseError::MissingStationHeader);
    }

    let index: Vec<StationKeys> = catalog
        .iter()
        .map(|station| StationKeys {
            station,
            keys: station.lookup_keys().map(fold_key).collect(),
        })
        .collect();
    let accessible_ids: HashSet<i64> = accessible.iter().map(|s| s.id).collect();

    let mut resolved: Vec<Station> = Vec::with_capacity(tokens.len());
    let mut duplicates = Vec::new();

    for token in tokens {
        let station = resolve_token(token, &index, &accessible_ids)?;
        if !accessible_ids.contains(&station.id) {
            return Err(ParseError::StationAccessDenied {
                station: station.name.clone(),
            });
        }
        if resolved.iter().any(|s| s.id == station.id) {
            duplicates.push(station.name.clone());
            continue;
        }
        resolved.push(station.clone());
    }

    Ok(StationSelection {
        kind: SelectionKind::Named,
        region: None,
        requested_count: resolved.len(),
        resolved_stations: resolved,
        collapsed_duplicates: duplicates,
    })
}

fn resolve_token<'a>(
    token: &str,
    index: &[StationKeys<'a>],
    accessible_ids: &HashSet<i64>,
) -> ParseResult<&'a Station> {
    let key = fold_key(token);

    let exact: Vec<&Station> = index
        .iter()
        .filter(|entry| entry.keys.iter().any(|k| *k == key))
        .map(|entry| entry.station)
        .collect();
    if let Some(station) = pick_unique(token, exact, accessible_ids)? {
        return Ok(station);
    }

    let containing: Vec<&Station> = index
        .iter()
        .filter(|entry| entry.keys.iter().any(|k| k.contains(&key)))
        .map(|entry| entry.station)
        .collect();
    if let Some(station) = pick_unique(token, containing, accessible_ids)? {
        return Ok(station);
    }

    Err(ParseError::UnknownStation {
        token: token.to_string(),
        suggestion: suggest(&key, index),
    })
}

/// One candidate wins outright; several are narrowed to the accessible ones.
fn pick_unique<'a>(
    token: &str,
    candidates: Vec<&'a Station>,
    accessible_ids: &HashSet<i64>,
) -> ParseResult<Option<&'a Station>> {
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.first().copied()),
        _ => {
            let reachable: Vec<&Station> = candidates
                .iter()
                .copied()
                .filter(|s| accessible_ids.contains(&s.id))
                .collect();
            if let [only] = reachable.as_slice() {
                return Ok(Some(*only));
            }
            Err(ParseError::AmbiguousStation {
                token: token.to_string(),
                candidates: candidates.iter().map(|s| s.name.clone()).collect(),
            })
        }
    }
}

fn suggest(key: &str, index: &[StationKeys]) -> Option<String> {
    index
        .iter()
        .flat_map(|entry| {
            entry
                .keys
                .iter()
                .map(move |k| (strsim::jaro_winkler(key, k), entry.station))
        })
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, station)| station.name.clone())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_parse_regional_quota_forms() {
        assert_eq!(parse_regional_quota("3dmn"), Some((3, RegionCode::South)));
        assert_eq!(parse_regional_quota("2DMT"), Some((2, RegionCode::Central)));
        assert_eq!(parse_regional_quota("1db"), Some((1, RegionCode::North)));
        assert_eq!(parse_regional_quota("4dn"), Some((4, RegionCode::South)));
        assert_eq!(parse_regional_quota("2dt"), Some((2, RegionCode::Central)));
        assert_eq!(parse_regional_quota("0dmn"), None);
        assert_eq!(parse_regional_quota("dmn"), None);
        assert_eq!(parse_regional_quota("3dmnx"), None);
        assert_eq!(parse_regional_quota("mb"), None);
    }

    #[test]
    fn test_regional_quota_boundary() {
        let catalog = fixtures::stations();
        let three_south = fixtures::stations_by_id(&[20, 21, 22]);
        let selection = resolve("3dmn", &catalog, &three_south).unwrap();
        assert_eq!(selection.kind, SelectionKind::Regional);
        assert_eq!(selection.resolved_stations.len(), 3);
        assert_eq!(selection.pricing_region(), Some(RegionCode::South));

        let two_south = fixtures::stations_by_id(&[20, 21]);
        let err = resolve("3dmn", &catalog, &two_south).unwrap_err();
        assert_eq!(
            err,
            ParseError::InsufficientRegionalAccess {
                region: RegionCode::South,
                requested: 3,
                available: 2,
            }
        );
    }

    #[test]
    fn test_regional_takes_first_accessible_in_order() {
        let catalog = fixtures::stations();
        let accessible = fixtures::stations_by_id(&[1, 20, 21, 22, 23]);
        let selection = resolve("2dn", &catalog, &accessible).unwrap();
        let ids: Vec<i64> = selection.resolved_stations.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![20, 21]);
        assert_eq!(selection.describe(), "2 stations in Miền Nam");
    }

    #[test]
    fn test_regional_description_resolves_as_quota() {
        let catalog = fixtures::stations();
        let selection = resolve("3dmn", &catalog, &catalog).unwrap();
        let described = selection.describe();
        assert_eq!(described, "3 stations in Miền Nam");

        let reparsed = resolve(&described, &catalog, &catalog).unwrap();
        assert_eq!(reparsed, selection);

        assert_eq!(
            parse_regional_description("2 STATIONS IN mien trung", &catalog),
            Some((2, RegionCode::Central))
        );
        assert_eq!(
            parse_regional_description("1 station in north", &catalog),
            Some((1, RegionCode::North))
        );
        assert_eq!(parse_regional_description("0 stations in Miền Nam", &catalog), None);
        assert_eq!(parse_regional_description("3 stations in Atlantis", &catalog), None);
    }

    #[test]
    fn test_regional_description_checks_access() {
        let catalog = fixtures::stations();
        let two_south = fixtures::stations_by_id(&[20, 21]);
        assert_eq!(
            resolve("3 stations in Miền Nam", &catalog, &two_south).unwrap_err(),
            ParseError::InsufficientRegionalAccess {
                region: RegionCode::South,
                requested: 3,
                available: 2,
            }
        );
    }

    #[test]
    fn test_unknown_region() {
        let catalog: Vec<Station> = fixtures::stations()
            .into_iter()
            .filter(|s| s.region_code() != RegionCode::Central)
            .collect();
        let err = resolve("1dmt", &catalog, &catalog).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownRegion {
                region: RegionCode::Central
            }
        );
    }

    #[test]
    fn test_named_by_alias_and_folded_name() {
        let catalog = fixtures::stations();
        let selection = resolve("tp. dong thap, CM", &catalog, &catalog).unwrap();
        let names: Vec<&str> = selection
            .resolved_stations
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["TP. Hồ Chí Minh", "Đồng Tháp", "Cà Mau"]);
        assert_eq!(selection.station_count(), 3);
        assert_eq!(selection.describe(), "TP. Hồ Chí Minh, Đồng Tháp, Cà Mau");
    }

    #[test]
    fn test_named_substring_fallback() {
        let catalog = fixtures::stations();
        let selection = resolve("khanh", &catalog, &catalog).unwrap();
        assert_eq!(selection.resolved_stations[0].name, "Khánh Hòa");
    }

    #[test]
    fn test_named_ambiguous_substring() {
        let catalog = fixtures::stations();
        // "n" appears in several names and aliases
        let err = resolve("n", &catalog, &catalog).unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousStation { .. }));
    }

    #[test]
    fn test_ambiguity_narrowed_by_access() {
        let catalog = fixtures::stations();
        // "an" is contained in both "Đà Nẵng" and "Khánh Hòa"
        assert!(matches!(
            resolve("an", &catalog, &catalog).unwrap_err(),
            ParseError::AmbiguousStation { .. }
        ));

        let accessible = fixtures::stations_by_id(&[11]);
        let selection = resolve("an", &catalog, &accessible).unwrap();
        assert_eq!(selection.resolved_stations[0].name, "Khánh Hòa");
    }

    #[test]
    fn test_named_access_denied() {
        let catalog = fixtures::stations();
        let accessible = fixtures::stations_by_id(&[20]);
        let err = resolve("tp.cm", &catalog, &accessible).unwrap_err();
        assert_eq!(
            err,
            ParseError::StationAccessDenied {
                station: "Cà Mau".into()
            }
        );
    }

    #[test]
    fn test_unknown_station_with_suggestion() {
        let catalog = fixtures::stations();
        let err = resolve("ben tro", &catalog, &catalog).unwrap_err();
        match err {
            ParseError::UnknownStation { token, suggestion } => {
                assert_eq!(token, "ben tro");
                assert_eq!(suggestion.as_deref(), Some("Bến Tre"));
            }
            other => panic!("Expected UnknownStation, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_stations_collapsed() {
        let catalog = fixtures::stations();
        let selection = resolve("tp.hcm.dt", &catalog, &catalog).unwrap();
        assert_eq!(selection.station_count(), 2);
        assert_eq!(selection.collapsed_duplicates, vec!["TP. Hồ Chí Minh"]);
    }

    #[test]
    fn test_mixed_regions_have_no_pricing_region() {
        let catalog = fixtures::stations();
        let selection = resolve("mb.tp", &catalog, &catalog).unwrap();
        assert_eq!(
            selection.regions(),
            vec![RegionCode::North, RegionCode::South]
        );
        assert_eq!(selection.pricing_region(), None);
    }

    #[test]
    fn test_empty_header() {
        let catalog = fixtures::stations();
        assert_eq!(
            resolve("  ", &catalog, &catalog).unwrap_err(),
            ParseError::MissingStationHeader
        );
        assert_eq!(
            resolve(". ,", &catalog, &catalog).unwrap_err(),
            ParseError::MissingStationHeader
        );
    }

    #[test]
    fn test_resolve_implicit_header() {
        let catalog = fixtures::stations();
        let (selection, body) = resolve_implicit("mb 23.45dd10", &catalog, &catalog).unwrap();
        assert_eq!(selection.resolved_stations[0].name, "Miền Bắc");
        assert_eq!(body, "23.45dd10");

        // Multi-word station name without alias
        let (selection, body) =
            resolve_implicit("Khánh Hòa 12dd5", &catalog, &catalog).unwrap();
        assert_eq!(selection.resolved_stations[0].name, "Khánh Hòa");
        assert_eq!(body, "12dd5");
    }

    #[test]
    fn test_resolve_implicit_failures() {
        let catalog = fixtures::stations();
        assert_eq!(
            resolve_implicit("23.45dd10", &catalog, &catalog).unwrap_err(),
            ParseError::MissingStationHeader
        );

        let accessible = fixtures::stations_by_id(&[1]);
        assert_eq!(
            resolve_implicit("cm 12dd5", &catalog, &accessible).unwrap_err(),
            ParseError::StationAccessDenied {
                station: "Cà Mau".into()
            }
        );
    }
}
