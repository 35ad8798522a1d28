//! Engine configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Engine configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    /// Spreadsheet ingestion configuration.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Balance validation configuration.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Account catalog configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Report building configuration.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Spreadsheet ingestion configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// How many leading rows to scan when locating the header row.
    #[serde(default = "default_header_scan_rows")]
    pub header_scan_rows: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: default_header_scan_rows(),
        }
    }
}

fn default_header_scan_rows() -> usize {
    10
}

/// Balance validation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Tolerance for the accounting identity, absorbs rounding noise.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
    /// Mismatches above this gap are Medium severity.
    #[serde(default = "default_medium_threshold")]
    pub medium_severity_threshold: Decimal,
    /// Mismatches above this gap are High severity.
    #[serde(default = "default_high_threshold")]
    pub high_severity_threshold: Decimal,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
            medium_severity_threshold: default_medium_threshold(),
            high_severity_threshold: default_high_threshold(),
        }
    }
}

fn default_balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_medium_threshold() -> Decimal {
    Decimal::new(100, 0)
}

fn default_high_threshold() -> Decimal {
    Decimal::new(1000, 0)
}

/// Account catalog configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Days without a sighting before an Active account is archived.
    #[serde(default = "default_archive_after_days")]
    pub archive_after_days: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            archive_after_days: default_archive_after_days(),
        }
    }
}

fn default_archive_after_days() -> i64 {
    90
}

/// Report building configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Account-name keywords forcing a negative value for zero-balance leaves.
    #[serde(default = "default_negative_keywords")]
    pub negative_keywords: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            negative_keywords: default_negative_keywords(),
        }
    }
}

fn default_negative_keywords() -> Vec<String> {
    ["(-)", "DEDUÇÃO", "DEDUÇÕES", "CUSTO", "DESPESA"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SALDO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
