use crate::core::metrics::{DEFAULT_MONITORED, condition_source};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Orderbook id marking a manually priced instrument with no live quote.
pub const MANUAL_INSTRUMENT_ID: u32 = 0;

const DEFAULT_BASE_URL: &str = "https://www.avanza.se";
const DEFAULT_REFRESH_MINUTES: u64 = 60;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InstrumentConfig {
    pub id: u32,
    pub name: Option<String>,
    pub shares: Option<f64>,
    pub purchase_date: Option<String>,
    pub purchase_price: Option<f64>,
    pub conversion_id: Option<u32>,
    #[serde(default)]
    pub invert_conversion: bool,
    pub currency: Option<String>,
    #[serde(default = "default_monitored")]
    pub monitored: Vec<String>,
    #[serde(default)]
    pub show_trend_icon: bool,
}

fn default_monitored() -> Vec<String> {
    DEFAULT_MONITORED.iter().map(|s| s.to_string()).collect()
}

impl InstrumentConfig {
    pub fn is_manual(&self) -> bool {
        self.id == MANUAL_INSTRUMENT_ID
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Avanza Stock {}", self.id))
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(shares) = self.shares
            && shares <= 0.0
        {
            bail!("Instrument {}: shares must be positive", self.id);
        }
        if let Some(price) = self.purchase_price
            && price <= 0.0
        {
            bail!("Instrument {}: purchase_price must be positive", self.id);
        }
        if let Some(date) = &self.purchase_date
            && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err()
        {
            bail!(
                "Instrument {}: purchase_date '{date}' is not an ISO date",
                self.id
            );
        }
        if self.is_manual() {
            if self.purchase_price.is_none() {
                bail!("Manual instrument (id 0) requires purchase_price");
            }
            if self.currency.is_none() {
                bail!("Manual instrument (id 0) requires currency");
            }
        }
        if self.conversion_id == Some(self.id) {
            bail!(
                "Instrument {}: conversion cannot reference the instrument itself",
                self.id
            );
        }
        for condition in &self.monitored {
            if condition_source(condition).is_none() {
                bail!(
                    "Instrument {}: unknown monitored condition '{condition}'",
                    self.id
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub instruments: Vec<InstrumentConfig>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,
}

fn default_refresh_minutes() -> u64 {
    DEFAULT_REFRESH_MINUTES
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("se", "kursvakt", "kursvakt")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        for instrument in &config.instruments {
            instrument.validate()?;
        }
        debug!("Successfully loaded config");
        Ok(config)
    }
}
