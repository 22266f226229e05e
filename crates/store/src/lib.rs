pub mod activity;
pub mod admin;
pub mod progress;
pub mod requests;
pub mod roster;

pub use activity::{ActivityEntry, ActivityLog};
pub use admin::{AdminRegistry, Role, TeamLeader, TeamManager, User};
pub use progress::{IngestionProgress, ProgressRegistry};
pub use requests::{DeleteRequest, DeleteRequestRegistry, RequestStatus};
pub use roster::{RosterIndex, SourceFileInfo};

use anyhow::Result;
use uuid::Uuid;

/// Everything the service knows, in one place. All sub-registries are
/// internally synchronized, so the store is shared via `Arc` without an
/// outer lock.
pub struct RosterStore {
    pub roster: RosterIndex,
    pub delete_requests: DeleteRequestRegistry,
    pub activity: ActivityLog,
    pub progress: ProgressRegistry,
    pub admin: AdminRegistry,
}

impl RosterStore {
    pub fn new() -> Self {
        Self {
            roster: RosterIndex::new(),
            delete_requests: DeleteRequestRegistry::new(),
            activity: ActivityLog::new(),
            progress: ProgressRegistry::new(),
            admin: AdminRegistry::new(),
        }
    }

    /// Approve a pending delete request and execute the deletion it
    /// describes. Returns how many records were removed.
    pub fn approve_delete_request(&self, id: Uuid, processed_by: &str) -> Result<usize> {
        let request = self.delete_requests.decide(id, true, processed_by)?;

        let removed = if request.dates.is_empty() {
            self.roster.delete_source(&request.filename)
        } else {
            self.roster
                .delete_source_dates(&request.filename, &request.dates)
        };

        self.activity.log(
            processed_by,
            format!(
                "Approved deletion of '{}' ({} records removed)",
                request.filename, removed
            ),
        );
        Ok(removed)
    }

    pub fn deny_delete_request(&self, id: Uuid, processed_by: &str) -> Result<()> {
        let request = self.delete_requests.decide(id, false, processed_by)?;
        self.activity.log(
            processed_by,
            format!("Denied deletion request for '{}'", request.filename),
        );
        Ok(())
    }
}

impl Default for RosterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ingest::{EmploymentStatus, RosterRecord};

    fn record(day: u32) -> RosterRecord {
        RosterRecord {
            agent_name: "John Smith".to_string(),
            log_time: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            designation: Some("Agent".to_string()),
            role: None,
            group_name: None,
            tm_name: None,
            tl_name: None,
            status: EmploymentStatus::Employee,
            profile_id: None,
            call_log_id: None,
            source_file: "jan.csv".to_string(),
        }
    }

    #[test]
    fn test_approved_request_executes_deletion() {
        let store = RosterStore::new();
        store.roster.insert_batch(vec![record(5), record(6)]);

        let request = store
            .delete_requests
            .create("jan.csv", Vec::new(), None, "alice");
        let removed = store.approve_delete_request(request.id, "admin").unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.roster.record_count(), 0);
        assert_eq!(store.activity.entries(None, Some("admin")).len(), 1);
    }

    #[test]
    fn test_denied_request_leaves_data() {
        let store = RosterStore::new();
        store.roster.insert_batch(vec![record(5)]);

        let request = store
            .delete_requests
            .create("jan.csv", Vec::new(), None, "alice");
        store.deny_delete_request(request.id, "admin").unwrap();

        assert_eq!(store.roster.record_count(), 1);
        assert_eq!(store.delete_requests.pending_count(), 0);
    }
}
