use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;

use crate::preprocess::{
    clean_agent_name, detect_role, optional_field, parse_log_time, DEFAULT_DESIGNATION,
};
use crate::record::{EmploymentStatus, RosterRecord};

/// Summary of one parsed upload.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source_file: String,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

pub struct CsvRosterReader;

impl CsvRosterReader {
    /// Parse a roster export. `Agent name` and `Log Time` are required
    /// columns; assignment columns are optional and empty cells mean
    /// unassigned. Rows with unparsable timestamps are skipped, not
    /// fatal.
    pub fn parse(data: &[u8], source_file: &str) -> Result<(Vec<RosterRecord>, IngestReport)> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data);

        let headers = reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();

        let columns = Columns::resolve(&headers)?;

        let mut records = Vec::new();
        let mut rows_read = 0;
        let mut rows_skipped = 0;

        for row in reader.records() {
            let row = row.context("Failed to read CSV row")?;
            rows_read += 1;

            match Self::parse_row(&row, &columns, source_file) {
                Some(record) => records.push(record),
                None => {
                    rows_skipped += 1;
                    tracing::warn!(
                        source_file,
                        row = rows_read,
                        "Skipping row with missing name or unparsable timestamp"
                    );
                }
            }
        }

        let date_range = Self::date_range(&records);
        let report = IngestReport {
            source_file: source_file.to_string(),
            rows_read,
            rows_kept: records.len(),
            rows_skipped,
            date_range,
        };

        Ok((records, report))
    }

    fn parse_row(row: &StringRecord, columns: &Columns, source_file: &str) -> Option<RosterRecord> {
        let raw_name = row.get(columns.agent_name)?;
        let agent_name = clean_agent_name(raw_name);
        if agent_name.is_empty() {
            return None;
        }

        let log_time = parse_log_time(row.get(columns.log_time)?)?;

        let get_opt = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(|v| optional_field(v));

        Some(RosterRecord {
            agent_name,
            log_time,
            designation: get_opt(columns.designation)
                .or_else(|| Some(DEFAULT_DESIGNATION.to_string())),
            role: get_opt(columns.role).or_else(|| Some(detect_role(raw_name).to_string())),
            group_name: get_opt(columns.group_name),
            tm_name: get_opt(columns.tm_name),
            tl_name: get_opt(columns.tl_name),
            status: columns
                .status
                .and_then(|i| row.get(i))
                .map(EmploymentStatus::parse)
                .unwrap_or_default(),
            profile_id: get_opt(columns.profile_id),
            call_log_id: get_opt(columns.call_log_id),
            source_file: source_file.to_string(),
        })
    }

    fn date_range(records: &[RosterRecord]) -> Option<(NaiveDate, NaiveDate)> {
        let first = records.first()?.log_time.date();
        let mut min = first;
        let mut max = first;
        for record in records {
            let day = record.log_time.date();
            if day < min {
                min = day;
            }
            if day > max {
                max = day;
            }
        }
        Some((min, max))
    }
}

/// Header indices, resolved once per file.
struct Columns {
    agent_name: usize,
    log_time: usize,
    designation: Option<usize>,
    role: Option<usize>,
    group_name: Option<usize>,
    tm_name: Option<usize>,
    tl_name: Option<usize>,
    status: Option<usize>,
    profile_id: Option<usize>,
    call_log_id: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let agent_name = find("Agent name")
            .context("CSV missing required column: Agent name")?;
        let log_time = find("Log Time")
            .context("CSV missing required column: Log Time")?;

        Ok(Self {
            agent_name,
            log_time,
            designation: find("Designation"),
            role: find("Role"),
            group_name: find("Group Name"),
            tm_name: find("TM Name"),
            tl_name: find("TL Name"),
            status: find("Status"),
            profile_id: find("Profile ID"),
            call_log_id: find("Call Log ID"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Agent name,Profile ID,Call Log ID,Log Time
John Smith-P,101,9001,2024-01-05 09:00:00
Jane Doe,102,9002,2024-01-06 08:00:00
Broken Row,103,9003,not a time
";

    #[test]
    fn test_parse_sample() {
        let (records, report) = CsvRosterReader::parse(SAMPLE.as_bytes(), "jan.csv").unwrap();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_kept, 2);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].agent_name, "John Smith");
        assert_eq!(records[0].role.as_deref(), Some("Part timer"));
        assert_eq!(records[0].designation.as_deref(), Some("Agent"));
        assert_eq!(records[1].agent_name, "Jane Doe");
        assert_eq!(records[1].role.as_deref(), Some("Full timer"));

        let (min, max) = report.date_range.unwrap();
        assert_eq!(min, chrono::NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(max, chrono::NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
    }

    #[test]
    fn test_missing_required_column() {
        let bad = "Agent name,Something\nJohn,1\n";
        assert!(CsvRosterReader::parse(bad.as_bytes(), "bad.csv").is_err());
    }

    #[test]
    fn test_assignment_columns_respected() {
        let csv = "\
Agent name,Log Time,Group Name,TM Name,Status
John Smith,2024-01-05 09:00:00,Group A,TM One,Long Leave
";
        let (records, _) = CsvRosterReader::parse(csv.as_bytes(), "x.csv").unwrap();
        assert_eq!(records[0].group_name.as_deref(), Some("Group A"));
        assert_eq!(records[0].tm_name.as_deref(), Some("TM One"));
        assert_eq!(records[0].status, EmploymentStatus::LongLeave);
        assert_eq!(records[0].tl_name, None);
    }
}
