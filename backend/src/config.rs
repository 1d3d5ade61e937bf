//! # Split Configuration
//!
//! Settings for the allocation engine, read from a YAML file owned by the
//! embedding app. Every field has a default so a partial file is fine.
//!
//! ## YAML Format
//!
//! ```yaml
//! currency_symbol: "₦"
//! minor_unit_digits: 2
//! minimum_contribution: "100"
//! max_participants: 50
//! max_title_length: 256
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::domain::models::{Amount, CurrencyFormat};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub currency_symbol: String,
    pub minor_unit_digits: u32,
    /// Smallest share a payer may owe, written like a text input value
    pub minimum_contribution: String,
    pub max_participants: usize,
    pub max_title_length: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₦".to_string(),
            minor_unit_digits: 2,
            minimum_contribution: "100".to_string(),
            max_participants: 50,
            max_title_length: 256,
        }
    }
}

impl SplitConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SplitConfig =
            serde_yaml::from_str(yaml).context("Failed to parse split config YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Read config from disk
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read split config from {}", path.display()))?;
        let config = Self::from_yaml_str(&yaml)?;
        info!("Loaded split config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.currency()?;
        self.minimum_contribution_amount()?;
        if self.max_participants < 2 {
            bail!("max_participants must allow a creditor and at least one payer");
        }
        Ok(())
    }

    pub fn currency(&self) -> Result<CurrencyFormat> {
        CurrencyFormat::new(self.currency_symbol.clone(), self.minor_unit_digits)
            .context("Invalid currency settings")
    }

    pub fn minimum_contribution_amount(&self) -> Result<Amount> {
        Amount::parse(&self.minimum_contribution, &self.currency()?).with_context(|| {
            format!("Invalid minimum_contribution '{}'", self.minimum_contribution)
        })
    }
}
