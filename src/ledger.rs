use crate::config::LedgerConfig;
use crate::error::{Result, ScrapeError};
use crate::types::{IngestedIdSet, ProfileId};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// Persisted ledger of previously ingested announcements: read the id
/// column once per run, append one ordered row per new record.
///
/// `append_row` is at-least-once — the store keeps no idempotency key, so
/// duplicate suppression is entirely the caller's (the Dedup Gate's)
/// responsibility.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn read_column(&self, table: &str, column_range: &str) -> Result<Vec<String>>;
    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<()>;
}

/// Source of the bearer token used against the ledger API. Injected so
/// alternate credential sources can be substituted without code change.
pub trait CredentialsProvider: Send + Sync {
    fn bearer_token(&self) -> Result<SecretString>;
}

/// Reads the token from an environment variable.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialsProvider for EnvTokenProvider {
    fn bearer_token(&self) -> Result<SecretString> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(SecretString::from(token)),
            _ => Err(ScrapeError::Authentication(format!(
                "environment variable '{}' is not set",
                self.var
            ))),
        }
    }
}

/// Reads the token from a file.
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialsProvider for FileTokenProvider {
    fn bearer_token(&self) -> Result<SecretString> {
        let token = std::fs::read_to_string(&self.path).map_err(|e| {
            ScrapeError::Authentication(format!(
                "cannot read token file '{}': {e}",
                self.path.display()
            ))
        })?;
        Ok(SecretString::from(token.trim().to_string()))
    }
}

/// Picks the provider the configuration asks for.
pub fn credentials_from_config(config: &LedgerConfig) -> Arc<dyn CredentialsProvider> {
    match &config.token_file {
        Some(path) => Arc::new(FileTokenProvider::new(path.clone())),
        None => Arc::new(EnvTokenProvider::new(config.token_env.clone())),
    }
}

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Google-Sheets-backed ledger via the v4 values REST endpoints.
pub struct SheetsLedger {
    client: reqwest::Client,
    spreadsheet_id: String,
    credentials: Arc<dyn CredentialsProvider>,
}

impl SheetsLedger {
    pub fn new(spreadsheet_id: impl Into<String>, credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            credentials,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.spreadsheet_id.clone(), credentials_from_config(config))
    }

    fn status_error(status: reqwest::StatusCode, body: String) -> ScrapeError {
        match status.as_u16() {
            401 | 403 => ScrapeError::Authentication(format!("status {}: {body}", status.as_u16())),
            429 | 500..=599 => {
                ScrapeError::TransientNetwork(format!("status {}: {body}", status.as_u16()))
            }
            _ => ScrapeError::Ledger {
                message: format!("status {}: {body}", status.as_u16()),
            },
        }
    }
}

#[async_trait]
impl LedgerStore for SheetsLedger {
    #[instrument(skip(self))]
    async fn read_column(&self, table: &str, column_range: &str) -> Result<Vec<String>> {
        let token = self.credentials.bearer_token()?;
        let url = format!(
            "{SHEETS_API_BASE}/{}/values/{table}!{column_range}",
            self.spreadsheet_id
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, body));
        }

        let payload: serde_json::Value = response.json().await?;
        let values = payload
            .get("values")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        // Each entry is a one-cell row of the requested column.
        let cells = values
            .iter()
            .filter_map(|row| row.as_array())
            .flatten()
            .filter_map(|cell| cell.as_str())
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        debug!("read {} cells from ledger column {table}!{column_range}", cells.len());
        Ok(cells)
    }

    #[instrument(skip(self, row))]
    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<()> {
        let token = self.credentials.bearer_token()?;
        let url = format!(
            "{SHEETS_API_BASE}/{}/values/{table}:append?valueInputOption=USER_ENTERED",
            self.spreadsheet_id
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, body));
        }
        Ok(())
    }
}

/// In-memory ledger for tests and offline export runs.
pub struct InMemoryLedger {
    column: Mutex<Vec<String>>,
    rows: Mutex<Vec<Vec<String>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            column: Mutex::new(Vec::new()),
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Seeds the id column returned by `read_column`.
    pub fn with_ingested_ids(ids: &[&str]) -> Self {
        let ledger = Self::new();
        *ledger.column.lock().unwrap() = ids.iter().map(|s| s.to_string()).collect();
        ledger
    }

    pub fn appended_rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn read_column(&self, _table: &str, _column_range: &str) -> Result<Vec<String>> {
        Ok(self.column.lock().unwrap().clone())
    }

    async fn append_row(&self, _table: &str, row: Vec<String>) -> Result<()> {
        self.rows.lock().unwrap().push(row);
        Ok(())
    }
}

/// Reads the ledger's id column into the run's dedup snapshot. Called once
/// per run, before crawling begins.
pub async fn load_ingested_ids(
    store: &dyn LedgerStore,
    table: &str,
    column_range: &str,
) -> Result<IngestedIdSet> {
    let cells = store.read_column(table, column_range).await?;
    Ok(cells.into_iter().map(ProfileId).collect())
}
