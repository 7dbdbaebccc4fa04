use crate::constants;
use crate::error::{Result, ScrapeError};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub pacing: PacingConfig,
    pub failure: FailureConfig,
    pub ledger: LedgerConfig,
    pub export: ExportConfig,
    pub server: ServerConfig,
    pub scheduler: SchedulerConfig,
}

/// Search endpoint, form selectors and the keyword corpus.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub url: String,
    pub jurisdiction_dropdown: String,
    pub subject_dropdown: String,
    pub subject_filter_value: String,
    pub keyword_input: String,
    pub submit_button: String,
    pub listing_links: String,
    pub keywords: Vec<String>,
    pub detail: DetailSelectors,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: constants::SEARCH_URL.to_string(),
            jurisdiction_dropdown: constants::JURISDICTION_DROPDOWN.to_string(),
            subject_dropdown: constants::SUBJECT_DROPDOWN.to_string(),
            subject_filter_value: constants::SUBJECT_FILTER_VALUE.to_string(),
            keyword_input: constants::KEYWORD_INPUT.to_string(),
            submit_button: constants::SUBMIT_BUTTON.to_string(),
            listing_links: constants::LISTING_LINKS.to_string(),
            keywords: constants::DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            detail: DetailSelectors::default(),
        }
    }
}

/// Fixed-position cells on the announcement detail page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    pub court_info: String,
    pub publication_info: String,
    pub registration_date: String,
    pub registration_details: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            court_info: constants::COURT_INFO_CELL.to_string(),
            publication_info: constants::PUBLICATION_INFO_CELL.to_string(),
            registration_date: constants::REGISTRATION_DATE_CELL.to_string(),
            registration_details: constants::REGISTRATION_DETAILS_CELL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_ms: constants::DEFAULT_PACING_MIN_MS,
            max_ms: constants::DEFAULT_PACING_MAX_MS,
        }
    }
}

/// What to do when a single search task fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFailureMode {
    /// Bounded attempts with exponential backoff, then record and continue.
    Retry,
    /// Log the failure and move on to the next task.
    Skip,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FailureConfig {
    pub on_task_error: TaskFailureMode,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            on_task_error: TaskFailureMode::Retry,
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub spreadsheet_id: String,
    pub table: String,
    pub id_column_range: String,
    /// Environment variable holding the bearer token for the ledger API.
    pub token_env: String,
    /// Optional file holding the bearer token; takes precedence over the
    /// environment variable when set.
    pub token_file: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            table: constants::DEFAULT_LEDGER_TABLE.to_string(),
            id_column_range: constants::DEFAULT_ID_COLUMN_RANGE.to_string(),
            token_env: constants::DEFAULT_TOKEN_ENV.to_string(),
            token_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { output_dir: "output".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Recurring trigger at a fixed minute of every hour. Disabled by default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub minute_of_hour: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: false, minute_of_hour: 24 }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(config_path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ScrapeError::Config(format!("Failed to read config file '{config_path}': {e}"))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults, used when no config file is present.
    pub fn defaults() -> Self {
        Config::default()
    }

    fn validate(&self) -> Result<()> {
        if self.pacing.min_ms > self.pacing.max_ms {
            return Err(ScrapeError::Config(format!(
                "pacing.min_ms ({}) must not exceed pacing.max_ms ({})",
                self.pacing.min_ms, self.pacing.max_ms
            )));
        }
        if self.failure.max_attempts == 0 {
            return Err(ScrapeError::Config(
                "failure.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.scheduler.minute_of_hour > 59 {
            return Err(ScrapeError::Config(format!(
                "scheduler.minute_of_hour ({}) must be in 0..=59",
                self.scheduler.minute_of_hour
            )));
        }
        if self.search.keywords.is_empty() {
            return Err(ScrapeError::Config(
                "search.keywords must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_fixed_corpus() {
        let config = Config::defaults();
        assert_eq!(config.search.keywords.len(), 15);
        assert_eq!(config.search.keywords[0], "gastro");
        assert_eq!(config.pacing.min_ms, 1000);
        assert_eq!(config.pacing.max_ms, 4000);
        assert!(!config.scheduler.enabled);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [pacing]
            min_ms = 10
            max_ms = 20

            [failure]
            on_task_error = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(config.pacing.min_ms, 10);
        assert_eq!(config.failure.on_task_error, TaskFailureMode::Skip);
        assert_eq!(config.search.url, crate::constants::SEARCH_URL);
        assert_eq!(config.ledger.table, "handelregisterDaten");
    }

    #[test]
    fn inverted_pacing_bounds_are_rejected() {
        let config: Config = toml::from_str(
            r#"
            [pacing]
            min_ms = 50
            max_ms = 10
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
