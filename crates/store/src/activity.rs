use std::sync::RwLock;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub user: String,
    pub message: String,
    pub at: NaiveDateTime,
}

/// Append-only audit trail of admin actions.
pub struct ActivityLog {
    entries: RwLock<Vec<ActivityEntry>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn log(&self, user: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(user, %message, "activity");
        self.entries.write().unwrap().push(ActivityEntry {
            user: user.to_string(),
            message,
            at: Utc::now().naive_utc(),
        });
    }

    /// Entries newest first, optionally filtered by day and/or user.
    pub fn entries(&self, date: Option<NaiveDate>, user: Option<&str>) -> Vec<ActivityEntry> {
        let mut entries: Vec<ActivityEntry> = self
            .entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| date.is_none_or(|d| e.at.date() == d))
            .filter(|e| user.is_none_or(|u| e.user.eq_ignore_ascii_case(u)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.at.cmp(&a.at));
        entries
    }

    /// Distinct days with activity, newest first. Feeds the log filter
    /// dropdown.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = Vec::new();
        for entry in self.entries.read().unwrap().iter() {
            let day = entry.at.date();
            if !dates.contains(&day) {
                dates.push(day);
            }
        }
        dates.sort_by(|a, b| b.cmp(a));
        dates
    }

    /// Distinct users that produced activity, sorted.
    pub fn available_users(&self) -> Vec<String> {
        let mut users: Vec<String> = Vec::new();
        for entry in self.entries.read().unwrap().iter() {
            if !users.iter().any(|u| u.eq_ignore_ascii_case(&entry.user)) {
                users.push(entry.user.clone());
            }
        }
        users.sort();
        users
    }

    /// Drop everything; returns how many entries were cleared.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap();
        let cleared = entries.len();
        entries.clear();
        cleared
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_filter() {
        let log = ActivityLog::new();
        log.log("alice", "uploaded jan.csv");
        log.log("bob", "approved deletion");

        assert_eq!(log.entries(None, None).len(), 2);
        assert_eq!(log.entries(None, Some("alice")).len(), 1);
        assert_eq!(log.entries(None, Some("ALICE")).len(), 1);
        assert_eq!(log.available_users(), vec!["alice", "bob"]);

        assert_eq!(log.clear(), 2);
        assert!(log.entries(None, None).is_empty());
    }
}
