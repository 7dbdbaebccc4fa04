use crate::error::Result;
use crate::export;
use crate::ledger::LedgerStore;
use crate::types::ProfileRecord;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

/// Where finished records go. The two modes are mutually exclusive per run.
pub enum IngestionSink {
    /// Append one ordered row per record to the ledger table. At-least-once:
    /// duplicate suppression happens upstream in the Dedup Gate.
    Ledger {
        store: Arc<dyn LedgerStore>,
        table: String,
    },
    /// Write one local CSV file for the whole batch.
    LocalExport { output_dir: String },
}

/// What the sink did with the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows_appended: usize,
    pub output_file: Option<String>,
}

impl IngestionSink {
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn ingest(
        &self,
        records: &[ProfileRecord],
        started_at: DateTime<Utc>,
    ) -> Result<IngestSummary> {
        match self {
            IngestionSink::Ledger { store, table } => {
                for record in records {
                    store.append_row(table, record.to_row()).await?;
                }
                info!("appended {} rows to ledger table '{}'", records.len(), table);
                Ok(IngestSummary { rows_appended: records.len(), output_file: None })
            }
            IngestionSink::LocalExport { output_dir } => {
                let output_file = export::export_batch(records, output_dir, started_at)?;
                Ok(IngestSummary { rows_appended: 0, output_file: Some(output_file) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use crate::types::ProfileId;

    fn record(id: &str) -> ProfileRecord {
        ProfileRecord {
            keyword: "gastro".to_string(),
            profile_id: ProfileId::from(id),
            detail_url: format!("https://example.test/hrb.php?{id}"),
            jurisdiction: "Bayern".to_string(),
            court_info: "Amtsgericht München".to_string(),
            publication_info: "bekannt gemacht am 01.02.2023".to_string(),
            registration_date: "01.02.2023".to_string(),
            registration_details: "Neueintragung".to_string(),
        }
    }

    #[tokio::test]
    async fn ledger_mode_appends_one_row_per_record() {
        let ledger = Arc::new(InMemoryLedger::new());
        let sink = IngestionSink::Ledger {
            store: ledger.clone(),
            table: "handelregisterDaten".to_string(),
        };
        let summary = sink
            .ingest(&[record("rb_id=1"), record("rb_id=2")], Utc::now())
            .await
            .unwrap();
        assert_eq!(summary.rows_appended, 2);
        assert_eq!(summary.output_file, None);

        let rows = ledger.appended_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "rb_id=1");
        assert_eq!(rows[1][1], "rb_id=2");
    }

    #[tokio::test]
    async fn identical_records_are_stored_twice() {
        let ledger = Arc::new(InMemoryLedger::new());
        let sink = IngestionSink::Ledger {
            store: ledger.clone(),
            table: "handelregisterDaten".to_string(),
        };
        // No idempotency key on the ledger side: two calls, two rows.
        sink.ingest(&[record("rb_id=1")], Utc::now()).await.unwrap();
        sink.ingest(&[record("rb_id=1")], Utc::now()).await.unwrap();
        assert_eq!(ledger.appended_rows().len(), 2);
    }

    #[tokio::test]
    async fn export_mode_writes_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = IngestionSink::LocalExport {
            output_dir: dir.path().to_str().unwrap().to_string(),
        };
        let summary = sink.ingest(&[record("rb_id=1")], Utc::now()).await.unwrap();
        assert_eq!(summary.rows_appended, 0);
        let path = summary.output_file.unwrap();
        assert!(std::path::Path::new(&path).exists());
    }
}
