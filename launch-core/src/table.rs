//! Launch table storage: CSV with a header row.
//!
//! Reading validates the schema up front. A missing required column or a row
//! that cannot be turned into a [`LaunchRecord`] fails the whole load; there is
//! no partial table.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::models::LaunchRecord;

pub const ID_COLUMN: &str = "id";
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "name",
    "date_utc",
    "success",
    "rocket",
    "payloads",
    "launchpad",
];

/// Cell values treated as a missing outcome.
const MISSING_MARKERS: [&str; 5] = ["", "nan", "none", "null", "na"];

#[derive(Debug, Serialize)]
struct TableRow<'a> {
    id: &'a str,
    name: &'a str,
    date_utc: String,
    success: Option<bool>,
    rocket: &'a str,
    payloads: &'a str,
    launchpad: &'a str,
}

impl<'a> From<&'a LaunchRecord> for TableRow<'a> {
    fn from(record: &'a LaunchRecord) -> Self {
        Self {
            id: &record.id,
            name: &record.name,
            date_utc: record
                .launched_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            success: record.outcome,
            rocket: &record.rocket,
            payloads: &record.payloads,
            launchpad: &record.launchpad,
        }
    }
}

/// Load and validate the table at `path`.
pub fn read_table(path: impl AsRef<Path>) -> Result<Vec<LaunchRecord>> {
    let path = path.as_ref();
    let records = read_from(File::open(path)?)?;
    tracing::info!(path = %path.display(), rows = records.len(), "Loaded launch table");
    Ok(records)
}

/// Load and validate a table from any reader. Row numbers in errors are
/// 1-based and count data rows only.
pub fn read_from<R: Read>(reader: R) -> Result<Vec<LaunchRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim(), i))
        .collect();

    let mut columns = [0usize; 6];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = *index
            .get(name)
            .ok_or_else(|| CoreError::MissingColumn(name.to_string()))?;
    }
    let [name_col, date_col, success_col, rocket_col, payloads_col, pad_col] = columns;
    let id_col = index.get(ID_COLUMN).copied();

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row_no = i + 1;
        let row = row?;
        let cell = |col: usize| row.get(col).unwrap_or("").trim();

        let launched_at = parse_timestamp(cell(date_col))
            .map_err(|message| CoreError::schema(row_no, message))?;
        let outcome =
            parse_outcome(cell(success_col)).map_err(|message| CoreError::schema(row_no, message))?;
        let launchpad = cell(pad_col);
        if launchpad.is_empty() {
            return Err(CoreError::schema(row_no, "launchpad is empty"));
        }
        let id = id_col
            .map(cell)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("row-{row_no}"));

        records.push(LaunchRecord {
            id,
            name: cell(name_col).to_string(),
            launched_at,
            outcome,
            rocket: cell(rocket_col).to_string(),
            payloads: cell(payloads_col).to_string(),
            launchpad: launchpad.to_string(),
        });
    }

    Ok(records)
}

/// Write `records` to `path`, creating parent directories as needed.
///
/// The table is replaced atomically: a failed write leaves any previous
/// table at `path` untouched.
pub fn write_table(path: impl AsRef<Path>, records: &[LaunchRecord]) -> Result<()> {
    let path = path.as_ref();
    replace_file(path, |file| write_to(file, records))?;
    tracing::info!(path = %path.display(), rows = records.len(), "Wrote launch table");
    Ok(())
}

/// Run `write` against a sibling temp file, then rename it over `path`.
fn replace_file(path: &Path, write: impl FnOnce(&mut File) -> Result<()>) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;
    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("table"),
        std::process::id()
    ));

    let written = File::create(&tmp)
        .map_err(CoreError::from)
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all()?;
            Ok(())
        })
        .and_then(|()| std::fs::rename(&tmp, path).map_err(CoreError::from));
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    written
}

pub fn write_to<W: Write>(writer: W, records: &[LaunchRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(TableRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid date_utc {raw:?}: {e}"))
}

fn parse_outcome(raw: &str) -> std::result::Result<Option<bool>, String> {
    let lowered = raw.to_ascii_lowercase();
    if MISSING_MARKERS.contains(&lowered.as_str()) {
        return Ok(None);
    }
    match lowered.as_str() {
        "true" | "1" | "1.0" => Ok(Some(true)),
        "false" | "0" | "0.0" => Ok(Some(false)),
        _ => Err(format!("invalid success value {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    const SAMPLE: &str = "\
name,date_utc,success,rocket,payloads,launchpad
FalconSat,2006-03-24T22:30:00.000Z,False,rocket1,['p1'],pad1
Starlink-1,2019-11-11T14:56:00.000Z,True,rocket2,\"['p2', 'p3']\",pad2
Crew-9,2024-09-28T17:17:00.000Z,,rocket2,,pad2
";

    #[test]
    fn reads_pandas_style_table() {
        let records = read_from(SAMPLE.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "FalconSat");
        assert_eq!(records[0].outcome, Some(false));
        assert_eq!(records[0].year(), 2006);
        assert_eq!(records[0].id, "row-1");
        assert_eq!(records[1].outcome, Some(true));
        assert_eq!(records[1].payload_count(), 2);
        assert_eq!(records[2].outcome, None);
        assert_eq!(records[2].payload_count(), 1);
    }

    #[test]
    fn failed_write_keeps_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launches.csv");
        write_table(&path, &read_from(SAMPLE.as_bytes()).unwrap()).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = replace_file(&path, |file| {
            file.write_all(b"id,name,date_utc\nx,Partial,")?;
            Err(CoreError::invalid_input("interrupted"))
        })
        .unwrap_err();

        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_replaces_existing_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("launches.csv");
        let records = read_from(SAMPLE.as_bytes()).unwrap();

        write_table(&path, &records).unwrap();
        write_table(&path, &records[..1]).unwrap();

        assert_eq!(read_table(&path).unwrap(), records[..1].to_vec());
    }

    #[test]
    fn missing_column_is_named() {
        let csv = "name,date_utc,success,rocket,payloads\nA,2020-01-01T00:00:00Z,true,r,p\n";
        let err = read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::MissingColumn(ref c) if c == "launchpad"));
    }

    #[test]
    fn malformed_date_reports_row() {
        let csv = "name,date_utc,success,rocket,payloads,launchpad\n\
                   A,2020-01-01T00:00:00Z,true,r,p,pad\n\
                   B,yesterday,true,r,p,pad\n";
        let err = read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::Schema { row: 2, .. }));
    }

    #[test]
    fn malformed_success_is_a_schema_error() {
        let csv = "name,date_utc,success,rocket,payloads,launchpad\n\
                   A,2020-01-01T00:00:00Z,maybe,r,p,pad\n";
        let err = read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::Schema { row: 1, .. }));
    }

    #[test]
    fn empty_launchpad_is_a_schema_error() {
        let csv = "name,date_utc,success,rocket,payloads,launchpad\n\
                   A,2020-01-01T00:00:00Z,true,r,p,\n";
        assert!(read_from(csv.as_bytes()).is_err());
    }

    #[test]
    fn extra_columns_are_ignored_and_id_is_used() {
        let csv = "id,flight_number,name,date_utc,success,rocket,payloads,launchpad\n\
                   abc,1,A,2020-01-01T00:00:00Z,true,r,p,pad\n";
        let records = read_from(csv.as_bytes()).unwrap();
        assert_eq!(records[0].id, "abc");
    }

    #[test]
    fn written_table_reads_back() {
        let record = LaunchRecord {
            id: "5eb87cd9".to_string(),
            name: "Demo, \"quoted\"".to_string(),
            launched_at: Utc.with_ymd_and_hms(2021, 5, 4, 19, 1, 0).unwrap(),
            outcome: None,
            rocket: "falcon9".to_string(),
            payloads: "a,b,c".to_string(),
            launchpad: "slc40".to_string(),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("launches.csv");

        write_table(&path, std::slice::from_ref(&record)).unwrap();
        let back = read_table(&path).unwrap();

        assert_eq!(back, vec![record]);
        assert_eq!(back[0].launched_at.year(), 2021);
    }
}
