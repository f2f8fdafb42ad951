//! Configuration loader
//!
//! Loads and validates the YAML catalogs and settings.

use anyhow::{anyhow, Context, Result};
use betcode_types::{BetType, NumberCombination, Station};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use super::types::{Catalogs, Settings};

const STATIONS_FILE: &str = "stations.yaml";
const BET_TYPES_FILE: &str = "bet_types.yaml";
const COMBINATIONS_FILE: &str = "combinations.yaml";
const SETTINGS_FILE: &str = "settings.yaml";

#[derive(Deserialize)]
struct StationsFile {
    stations: Vec<Station>,
}

#[derive(Deserialize)]
struct BetTypesFile {
    bet_types: Vec<BetType>,
}

#[derive(Deserialize)]
struct CombinationsFile {
    #[serde(default)]
    combinations: Vec<NumberCombination>,
}

pub struct CatalogLoader {
    config_dir: PathBuf,
}

impl CatalogLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Create loader from BETCODE_CONFIG_DIR or the nearest `config` directory
    ///
    /// Path resolution order:
    /// 1. BETCODE_CONFIG_DIR environment variable
    /// 2. Relative "config" path
    /// 3. Runtime CARGO_MANIFEST_DIR/config
    /// 4. Compile-time crate config (for test binaries)
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var("BETCODE_CONFIG_DIR") {
            return Self::new(dir);
        }

        if Path::new("config").join(STATIONS_FILE).exists() {
            return Self::new("config");
        }

        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let config_path = Path::new(&manifest_dir).join("config");
            if config_path.join(STATIONS_FILE).exists() {
                return Self::new(config_path);
            }
        }

        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn load_stations(&self) -> Result<Vec<Station>> {
        let file: StationsFile = self.read_yaml(STATIONS_FILE)?;
        validate_stations(&file.stations)?;
        info!("Loaded {} stations", file.stations.len());
        Ok(file.stations)
    }

    pub fn load_bet_types(&self) -> Result<Vec<BetType>> {
        let file: BetTypesFile = self.read_yaml(BET_TYPES_FILE)?;
        validate_bet_types(&file.bet_types)?;
        info!(
            "Loaded {} bet types with {} aliases",
            file.bet_types.len(),
            file.bet_types.iter().map(|b| b.aliases.len()).sum::<usize>()
        );
        Ok(file.bet_types)
    }

    /// Missing file means no combinations
    pub fn load_combinations(&self) -> Result<Vec<NumberCombination>> {
        if !self.config_dir.join(COMBINATIONS_FILE).exists() {
            return Ok(vec![]);
        }
        let file: CombinationsFile = self.read_yaml(COMBINATIONS_FILE)?;
        validate_combinations(&file.combinations)?;

        let unsupported = file
            .combinations
            .iter()
            .filter(|c| !c.generator.is_supported())
            .count();
        info!(
            "Loaded {} number combinations ({} unsupported)",
            file.combinations.len(),
            unsupported
        );
        Ok(file.combinations)
    }

    /// Missing file means default settings
    pub fn load_settings(&self) -> Result<Settings> {
        if !self.config_dir.join(SETTINGS_FILE).exists() {
            return Ok(Settings::default());
        }
        let settings: Settings = self.read_yaml(SETTINGS_FILE)?;
        if settings.price_rate.is_sign_negative() {
            return Err(anyhow!(
                "{}: price_rate must not be negative",
                SETTINGS_FILE
            ));
        }
        if settings.options.max_expanded_numbers == 0 {
            return Err(anyhow!(
                "{}: max_expanded_numbers must be positive",
                SETTINGS_FILE
            ));
        }
        Ok(settings)
    }

    pub fn load_catalogs(&self) -> Result<Catalogs> {
        info!("Loading catalogs from {}", self.config_dir.display());
        Ok(Catalogs {
            stations: self.load_stations()?,
            bet_types: self.load_bet_types()?,
            combinations: self.load_combinations()?,
        })
    }

    fn read_yaml<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.config_dir.join(name);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

fn validate_stations(stations: &[Station]) -> Result<()> {
    let mut ids = HashSet::new();
    for station in stations {
        if !ids.insert(station.id) {
            return Err(anyhow!("Duplicate station ID: {}", station.id));
        }
        if station.name.trim().is_empty() {
            return Err(anyhow!("Station {} has an empty name", station.id));
        }
    }
    Ok(())
}

fn validate_bet_types(bet_types: &[BetType]) -> Result<()> {
    let mut ids = HashSet::new();
    for bet_type in bet_types {
        if !ids.insert(bet_type.id) {
            return Err(anyhow!("Duplicate bet type ID: {}", bet_type.id));
        }
        if !bet_type.aliases.iter().any(|a| !a.trim().is_empty()) {
            return Err(anyhow!(
                "Bet type '{}' ({}) declares no alias",
                bet_type.name,
                bet_type.id
            ));
        }
    }
    Ok(())
}

fn validate_combinations(combinations: &[NumberCombination]) -> Result<()> {
    let mut names = HashSet::new();
    for combination in combinations {
        if !names.insert(combination.name.as_str()) {
            return Err(anyhow!("Duplicate combination: {}", combination.name));
        }
    }
    Ok(())
}
