use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use dashmap::DashMap;
use ingest::RosterRecord;
use serde::Serialize;

/// Roster history: every record ever ingested, grouped per agent.
///
/// Keys are lowercased agent names; records keep their original casing
/// for display. Per-agent vectors are kept sorted by timestamp
/// ascending.
pub struct RosterIndex {
    records: DashMap<String, Vec<RosterRecord>>,
    display_names: DashMap<String, String>,
    sources: DashMap<String, SourceFileInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFileInfo {
    pub filename: String,
    pub source_id: String,
    pub uploaded_at: NaiveDateTime,
    pub records: usize,
}

impl RosterIndex {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            display_names: DashMap::new(),
            sources: DashMap::new(),
        }
    }

    /// Insert a parsed batch. Records missing assignment fields inherit
    /// them from the latest record already known for that agent, so a
    /// bare telephony export doesn't wipe hierarchy data.
    pub fn insert_batch(&self, mut batch: Vec<RosterRecord>) -> usize {
        // Process oldest-first so inheritance flows forward in time
        batch.sort_by(|a, b| a.log_time.cmp(&b.log_time));
        let inserted = batch.len();

        for mut record in batch {
            let key = record.agent_name.to_lowercase();

            self.display_names
                .entry(key.clone())
                .or_insert_with(|| record.agent_name.clone());

            let mut history = self.records.entry(key).or_default();

            if let Some(previous) = history.last() {
                if record.group_name.is_none() {
                    record.group_name = previous.group_name.clone();
                }
                if record.tm_name.is_none() {
                    record.tm_name = previous.tm_name.clone();
                }
                if record.tl_name.is_none() {
                    record.tl_name = previous.tl_name.clone();
                }
            }

            if let Some(source) = self.sources.get_mut(&record.source_file).as_deref_mut() {
                source.records += 1;
            } else {
                self.sources.insert(
                    record.source_file.clone(),
                    SourceFileInfo {
                        filename: record.source_file.clone(),
                        source_id: ingest::generate_source_id(&record.source_file),
                        uploaded_at: Utc::now().naive_utc(),
                        records: 1,
                    },
                );
            }

            // Keep the history sorted; uploads usually arrive in order,
            // so this is a cheap append in the common case
            let out_of_order = history
                .last()
                .is_some_and(|last| last.log_time > record.log_time);
            if out_of_order {
                let position = history
                    .iter()
                    .position(|r| r.log_time > record.log_time)
                    .unwrap_or(history.len());
                history.insert(position, record);
            } else {
                history.push(record);
            }
        }

        inserted
    }

    /// All known agent display names, sorted case-insensitively. This is
    /// the candidate pool for fuzzy matching.
    pub fn agent_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .display_names
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
        names
    }

    /// Full history for one agent (case-insensitive exact name), oldest
    /// first.
    pub fn records_for(&self, agent_name: &str) -> Vec<RosterRecord> {
        self.records
            .get(&agent_name.to_lowercase())
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// History for every agent whose name contains `fragment`
    /// (case-insensitive), newest first.
    pub fn records_matching(&self, fragment: &str) -> Vec<RosterRecord> {
        let fragment = fragment.to_lowercase();
        if fragment.is_empty() {
            return Vec::new();
        }

        let mut matched = Vec::new();
        for entry in self.records.iter() {
            if entry.key().contains(&fragment) {
                matched.extend(entry.value().iter().cloned());
            }
        }
        matched.sort_by(|a, b| b.log_time.cmp(&a.log_time));
        matched
    }

    /// Latest record per agent, optionally bounded to records on or
    /// before `up_to`. Keyed by lowercased agent name.
    pub fn latest_record_map(&self, up_to: Option<NaiveDate>) -> HashMap<String, RosterRecord> {
        let mut latest = HashMap::new();

        for entry in self.records.iter() {
            let candidate = match up_to {
                Some(bound) => entry
                    .value()
                    .iter()
                    .filter(|r| r.log_time.date() <= bound)
                    .last(),
                None => entry.value().last(),
            };
            if let Some(record) = candidate {
                latest.insert(entry.key().clone(), record.clone());
            }
        }

        latest
    }

    /// Distinct record dates for a source file, newest first.
    pub fn source_dates(&self, filename: &str) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = Vec::new();
        for entry in self.records.iter() {
            for record in entry.value() {
                if record.source_file == filename {
                    let day = record.log_time.date();
                    if !dates.contains(&day) {
                        dates.push(day);
                    }
                }
            }
        }
        dates.sort_by(|a, b| b.cmp(a));
        dates
    }

    pub fn source_files(&self) -> Vec<SourceFileInfo> {
        let mut files: Vec<SourceFileInfo> =
            self.sources.iter().map(|entry| entry.value().clone()).collect();
        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        files
    }

    /// Remove every record from `filename`. Returns how many were
    /// removed.
    pub fn delete_source(&self, filename: &str) -> usize {
        self.delete_where(|record| record.source_file == filename)
    }

    /// Remove records from `filename` on the given calendar days.
    pub fn delete_source_dates(&self, filename: &str, dates: &[NaiveDate]) -> usize {
        self.delete_where(|record| {
            record.source_file == filename && dates.contains(&record.log_time.date())
        })
    }

    fn delete_where<F: Fn(&RosterRecord) -> bool>(&self, predicate: F) -> usize {
        let mut removed = 0;
        let mut emptied = Vec::new();

        for mut entry in self.records.iter_mut() {
            let before = entry.value().len();
            entry.value_mut().retain(|record| !predicate(record));
            removed += before - entry.value().len();
            if entry.value().is_empty() {
                emptied.push(entry.key().clone());
            }
        }

        // Drop emptied agents from the directory too
        for key in emptied {
            self.records.remove(&key);
            self.display_names.remove(&key);
        }

        if removed > 0 {
            self.recount_sources();
        }
        removed
    }

    fn recount_sources(&self) {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for entry in self.records.iter() {
            for record in entry.value() {
                *counts.entry(record.source_file.clone()).or_default() += 1;
            }
        }

        self.sources
            .retain(|filename, _| counts.contains_key(filename));
        for mut entry in self.sources.iter_mut() {
            if let Some(count) = counts.get(entry.key()) {
                entry.value_mut().records = *count;
            }
        }
    }

    pub fn agent_count(&self) -> usize {
        self.records.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    /// Apply an in-place update to every record of one agent. Returns
    /// the number of records touched.
    pub fn update_agent_records<F>(&self, agent_name: &str, mut update: F) -> usize
    where
        F: FnMut(&mut RosterRecord) -> bool,
    {
        let mut touched = 0;
        if let Some(mut entry) = self.records.get_mut(&agent_name.to_lowercase()) {
            for record in entry.value_mut().iter_mut() {
                if update(record) {
                    touched += 1;
                }
            }
        }
        touched
    }
}

impl Default for RosterIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest::EmploymentStatus;

    fn record(name: &str, day: u32, hour: u32, source: &str, tm: Option<&str>) -> RosterRecord {
        RosterRecord {
            agent_name: name.to_string(),
            log_time: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            designation: Some("Agent".to_string()),
            role: Some("Full timer".to_string()),
            group_name: None,
            tm_name: tm.map(|s| s.to_string()),
            tl_name: None,
            status: EmploymentStatus::Employee,
            profile_id: None,
            call_log_id: None,
            source_file: source.to_string(),
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let index = RosterIndex::new();
        index.insert_batch(vec![
            record("John Smith", 5, 9, "jan.csv", Some("TM One")),
            record("Jane Doe", 5, 9, "jan.csv", Some("TM Two")),
        ]);

        assert_eq!(index.agent_count(), 2);
        assert_eq!(index.record_count(), 2);
        assert_eq!(index.records_for("john smith").len(), 1);
        assert_eq!(index.agent_names(), vec!["Jane Doe", "John Smith"]);
    }

    #[test]
    fn test_inheritance_fills_missing_assignment() {
        let index = RosterIndex::new();
        index.insert_batch(vec![record("John Smith", 5, 9, "jan.csv", Some("TM One"))]);
        // Second upload has no TM column
        index.insert_batch(vec![record("John Smith", 6, 9, "feb.csv", None)]);

        let history = index.records_for("John Smith");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].tm_name.as_deref(), Some("TM One"));
    }

    #[test]
    fn test_latest_record_map_bound() {
        let index = RosterIndex::new();
        index.insert_batch(vec![
            record("John Smith", 5, 9, "jan.csv", Some("TM One")),
            record("John Smith", 8, 9, "jan.csv", Some("TM Two")),
        ]);

        let unbounded = index.latest_record_map(None);
        assert_eq!(
            unbounded["john smith"].tm_name.as_deref(),
            Some("TM Two")
        );

        let bounded = index.latest_record_map(NaiveDate::from_ymd_opt(2024, 1, 6));
        assert_eq!(bounded["john smith"].tm_name.as_deref(), Some("TM One"));
    }

    #[test]
    fn test_records_matching_substring() {
        let index = RosterIndex::new();
        index.insert_batch(vec![
            record("John Smith", 5, 9, "jan.csv", None),
            record("Jon Smyth", 5, 10, "jan.csv", None),
            record("Jane Doe", 5, 11, "jan.csv", None),
        ]);

        let matched = index.records_matching("smith");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].agent_name, "John Smith");

        // Newest first across agents
        let all = index.records_matching("j");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].agent_name, "Jane Doe");
    }

    #[test]
    fn test_delete_source_and_dates() {
        let index = RosterIndex::new();
        index.insert_batch(vec![
            record("John Smith", 5, 9, "jan.csv", None),
            record("John Smith", 6, 9, "jan.csv", None),
            record("Jane Doe", 7, 9, "feb.csv", None),
        ]);

        let removed =
            index.delete_source_dates("jan.csv", &[NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()]);
        assert_eq!(removed, 1);
        assert_eq!(index.records_for("John Smith").len(), 1);

        let removed = index.delete_source("jan.csv");
        assert_eq!(removed, 1);
        // John Smith has no records left and drops out of the directory
        assert_eq!(index.agent_names(), vec!["Jane Doe"]);
        assert_eq!(index.source_files().len(), 1);
    }

    #[test]
    fn test_source_dates_listing() {
        let index = RosterIndex::new();
        index.insert_batch(vec![
            record("John Smith", 5, 9, "jan.csv", None),
            record("John Smith", 5, 17, "jan.csv", None),
            record("John Smith", 6, 9, "jan.csv", None),
        ]);

        let dates = index.source_dates("jan.csv");
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            ]
        );
    }
}
