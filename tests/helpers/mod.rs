//! Shared setup for integration tests: the shipped `config/` catalogs.

#![allow(dead_code)]

use betcode::{BetCodeAssembler, CatalogLoader, Catalogs, ParseResult, ParsedSubmission, Settings};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

pub fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

pub fn loader() -> CatalogLoader {
    CatalogLoader::new(config_dir())
}

pub fn catalogs() -> Catalogs {
    loader().load_catalogs().expect("load shipped catalogs")
}

pub fn settings() -> Settings {
    loader().load_settings().expect("load shipped settings")
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("decimal literal")
}

/// Parse against the shipped catalogs; empty `accessible` means every station.
pub fn parse(
    catalogs: &Catalogs,
    text: &str,
    accessible: &[i64],
    price_rate: &str,
) -> ParseResult<ParsedSubmission> {
    let accessible = catalogs.stations_with_ids(accessible);
    BetCodeAssembler::from_catalogs(catalogs).parse_submission(text, &accessible, dec(price_rate))
}

pub fn station_id(catalogs: &Catalogs, name: &str) -> i64 {
    catalogs
        .stations
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.id)
        .unwrap_or_else(|| panic!("station '{}' not in shipped catalog", name))
}
