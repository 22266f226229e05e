//! Day-bucket deduplication for agent history records.
//!
//! The record lookup can return several snapshots for the same calendar
//! day; the display only wants the latest one per day, newest day first.

use std::collections::HashMap;

use chrono::NaiveDate;
use ingest::RosterRecord;

/// Collapse records to at most one per calendar day, keeping the record
/// with the greatest timestamp in each day. Ties keep the record seen
/// first (the comparison is strictly greater-than). Output is sorted by
/// descending timestamp. Input is not mutated.
pub fn deduplicate_and_sort(records: &[RosterRecord]) -> Vec<RosterRecord> {
    let mut latest_per_day: HashMap<NaiveDate, RosterRecord> = HashMap::new();

    for record in records {
        // Calendar-day bucket, in whatever timezone the timestamp is
        // already expressed in
        let day = record.log_time.date();
        let replace = match latest_per_day.get(&day) {
            Some(existing) => record.log_time > existing.log_time,
            None => true,
        };
        if replace {
            latest_per_day.insert(day, record.clone());
        }
    }

    let mut result: Vec<RosterRecord> = latest_per_day.into_values().collect();
    // Distinct days never share a timestamp, so this order is total
    result.sort_by(|a, b| b.log_time.cmp(&a.log_time));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use ingest::EmploymentStatus;

    fn record(day: u32, hour: u32, tl: &str) -> RosterRecord {
        RosterRecord {
            agent_name: "John Smith".to_string(),
            log_time: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            designation: Some("Agent".to_string()),
            role: Some("Full timer".to_string()),
            group_name: Some("Group A".to_string()),
            tm_name: Some("TM One".to_string()),
            tl_name: Some(tl.to_string()),
            status: EmploymentStatus::Employee,
            profile_id: None,
            call_log_id: None,
            source_file: "jan.csv".to_string(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(deduplicate_and_sort(&[]).is_empty());
    }

    #[test]
    fn test_collapses_same_day_to_latest() {
        let records = vec![record(5, 9, "TL Morning"), record(5, 17, "TL Evening"), record(6, 8, "TL Next")];

        let result = deduplicate_and_sort(&records);

        assert_eq!(result.len(), 2);
        // Newest day first
        assert_eq!(result[0].log_time.date(), NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        // The surviving Jan 5 record is the 17:00 one
        assert_eq!(result[1].tl_name.as_deref(), Some("TL Evening"));
        assert_eq!(result[1].log_time.time().hour(), 17);
    }

    #[test]
    fn test_idempotent() {
        let records = vec![record(5, 9, "a"), record(5, 17, "b"), record(6, 8, "c")];

        let once = deduplicate_and_sort(&records);
        let twice = deduplicate_and_sort(&once);

        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.log_time, b.log_time);
            assert_eq!(a.tl_name, b.tl_name);
        }
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        // Identical timestamps in the same bucket: strictly-greater-than
        // comparison keeps the earlier entry
        let records = vec![record(5, 9, "first"), record(5, 9, "second")];

        let result = deduplicate_and_sort(&records);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].tl_name.as_deref(), Some("first"));
    }

    #[test]
    fn test_input_not_mutated() {
        let records = vec![record(5, 9, "a"), record(5, 17, "b")];
        let before = records.len();

        let _ = deduplicate_and_sort(&records);

        assert_eq!(records.len(), before);
        assert_eq!(records[0].tl_name.as_deref(), Some("a"));
    }
}
