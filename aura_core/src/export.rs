//! CSV export of the mood journal.

use crate::{LogEntry, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: i64,
    date: String,
    mood: &'a str,
    notes: &'a str,
}

impl<'a> From<&'a LogEntry> for CsvRow<'a> {
    fn from(entry: &'a LogEntry) -> Self {
        CsvRow {
            id: entry.id,
            date: entry.date.to_rfc3339(),
            mood: entry.mood.as_str(),
            notes: &entry.notes,
        }
    }
}

/// Write the journal to `path` as CSV, newest entry first
///
/// Replaces any existing file. Returns the number of rows written.
pub fn export_logs_csv(logs: &[LogEntry], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    if logs.is_empty() {
        // serialize() only emits headers alongside the first row
        writer.write_record(["id", "date", "mood", "notes"])?;
    }
    for entry in logs {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} journal entries to {:?}", logs.len(), path);
    Ok(logs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mood;
    use chrono::{TimeZone, Utc};

    fn entry(id: i64, mood: Mood, notes: &str) -> LogEntry {
        LogEntry {
            id,
            date: Utc.with_ymd_and_hms(2024, 3, id as u32, 9, 0, 0).unwrap(),
            mood,
            notes: notes.into(),
        }
    }

    #[test]
    fn test_export_writes_rows_in_stored_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("journal.csv");
        let logs = vec![
            entry(2, Mood::Good, "felt fine, slept well"),
            entry(1, Mood::Other("wired".into()), "line one\nline two"),
        ];

        let count = export_logs_csv(&logs, &path).unwrap();
        assert_eq!(count, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["id", "date", "mood", "notes"]);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "2");
        assert_eq!(&records[0][2], "good");
        assert_eq!(&records[0][3], "felt fine, slept well");
        assert_eq!(&records[1][2], "wired");
        assert_eq!(&records[1][3], "line one\nline two");
    }

    #[test]
    fn test_export_empty_journal_has_headers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("journal.csv");

        assert_eq!(export_logs_csv(&[], &path).unwrap(), 0);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "id,date,mood,notes");
    }
}
