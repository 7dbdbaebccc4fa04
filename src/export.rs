use crate::error::Result;
use crate::types::ProfileRecord;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::info;

/// Writes one CSV file for the run: header row in `ProfileRecord` field
/// order, one data row per record. Returns the file path.
pub fn export_batch(
    records: &[ProfileRecord],
    output_dir: &str,
    started_at: DateTime<Utc>,
) -> Result<String> {
    fs::create_dir_all(output_dir)?;

    let timestamp = started_at.format("%Y_%m_%d_%H_%M_%S");
    let filename = format!("handelsregister_{timestamp}.csv");
    let filepath = Path::new(output_dir).join(&filename);

    let mut out = String::new();
    out.push_str(&csv_line(
        &ProfileRecord::FIELD_NAMES.map(|name| name.to_string()),
    ));
    for record in records {
        out.push_str(&csv_line(&record.to_row()));
    }
    fs::write(&filepath, out)?;

    info!("exported {} records to {}", records.len(), filepath.display());
    Ok(filepath.to_string_lossy().to_string())
}

fn csv_line(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
