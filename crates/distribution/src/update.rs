use anyhow::{Result, bail};
use chrono::NaiveDate;
use ingest::EmploymentStatus;
use ingest::preprocess::optional_field;
use store::RosterStore;

/// Set an agent's employment status on every record from
/// `effective_date` onward. Returns how many records changed.
pub fn update_status(
    store: &RosterStore,
    agent_name: &str,
    status: EmploymentStatus,
    effective_date: NaiveDate,
    actor: &str,
) -> Result<usize> {
    let agent_name = agent_name.trim();
    if agent_name.is_empty() {
        bail!("Agent name is required");
    }
    if store.roster.records_for(agent_name).is_empty() {
        bail!("No records found for {}", agent_name);
    }

    let touched = store.roster.update_agent_records(agent_name, |record| {
        if record.log_time.date() >= effective_date {
            record.status = status;
            true
        } else {
            false
        }
    });

    store.activity.log(
        actor,
        format!(
            "Status update: '{}' set to '{}' effective from {}. Rows affected: {}.",
            agent_name, status, effective_date, touched
        ),
    );

    Ok(touched)
}

/// Fields to apply in an assignment update. `None` leaves a field
/// untouched; an empty or whitespace-only `Some` clears the field back
/// to unassigned.
#[derive(Debug, Default, Clone)]
pub struct AssignmentUpdate {
    pub designation: Option<String>,
    pub role: Option<String>,
    pub group_name: Option<String>,
    pub tm_name: Option<String>,
    pub tl_name: Option<String>,
}

impl AssignmentUpdate {
    pub fn is_empty(&self) -> bool {
        self.designation.is_none()
            && self.role.is_none()
            && self.group_name.is_none()
            && self.tm_name.is_none()
            && self.tl_name.is_none()
    }
}

/// The admin update path: rewrite assignment fields on an agent's
/// records from `from_date` onward.
pub fn update_assignment(
    store: &RosterStore,
    agent_name: &str,
    update: AssignmentUpdate,
    from_date: NaiveDate,
    actor: &str,
) -> Result<usize> {
    let agent_name = agent_name.trim();
    if agent_name.is_empty() {
        bail!("Agent name is required");
    }
    if update.is_empty() {
        bail!("Nothing to update");
    }
    if store.roster.records_for(agent_name).is_empty() {
        bail!("No records found for {}", agent_name);
    }

    let touched = store.roster.update_agent_records(agent_name, |record| {
        if record.log_time.date() < from_date {
            return false;
        }
        if let Some(designation) = &update.designation {
            record.designation = optional_field(designation);
        }
        if let Some(role) = &update.role {
            record.role = optional_field(role);
        }
        if let Some(group) = &update.group_name {
            record.group_name = optional_field(group);
        }
        if let Some(tm) = &update.tm_name {
            record.tm_name = optional_field(tm);
        }
        if let Some(tl) = &update.tl_name {
            record.tl_name = optional_field(tl);
        }
        true
    });

    store.activity.log(
        actor,
        format!(
            "Assignment update for '{}' from {} ({} records)",
            agent_name, from_date, touched
        ),
    );

    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest::RosterRecord;

    fn record(day: u32) -> RosterRecord {
        RosterRecord {
            agent_name: "John Smith".to_string(),
            log_time: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            designation: Some("Agent".to_string()),
            role: Some("Full timer".to_string()),
            group_name: Some("Group A".to_string()),
            tm_name: Some("TM One".to_string()),
            tl_name: None,
            status: EmploymentStatus::Employee,
            profile_id: None,
            call_log_id: None,
            source_file: "jan.csv".to_string(),
        }
    }

    #[test]
    fn test_update_status_from_date() {
        let store = RosterStore::new();
        store.roster.insert_batch(vec![record(3), record(5), record(8)]);

        let touched = update_status(
            &store,
            "John Smith",
            EmploymentStatus::LongLeave,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            "admin",
        )
        .unwrap();

        assert_eq!(touched, 2);
        let history = store.roster.records_for("John Smith");
        assert_eq!(history[0].status, EmploymentStatus::Employee);
        assert_eq!(history[1].status, EmploymentStatus::LongLeave);
        assert_eq!(history[2].status, EmploymentStatus::LongLeave);
    }

    #[test]
    fn test_update_status_unknown_agent() {
        let store = RosterStore::new();
        let result = update_status(
            &store,
            "Nobody",
            EmploymentStatus::Resigned,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "admin",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_assignment() {
        let store = RosterStore::new();
        store.roster.insert_batch(vec![record(3), record(8)]);

        let update = AssignmentUpdate {
            tm_name: Some("TM Two".to_string()),
            ..Default::default()
        };
        let touched = update_assignment(
            &store,
            "John Smith",
            update,
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            "admin",
        )
        .unwrap();

        assert_eq!(touched, 1);
        let history = store.roster.records_for("John Smith");
        assert_eq!(history[0].tm_name.as_deref(), Some("TM One"));
        assert_eq!(history[1].tm_name.as_deref(), Some("TM Two"));
        // Untouched fields survive
        assert_eq!(history[1].group_name.as_deref(), Some("Group A"));
    }

    #[test]
    fn test_blank_value_clears_field() {
        let store = RosterStore::new();
        store.roster.insert_batch(vec![record(3)]);

        let update = AssignmentUpdate {
            tl_name: Some("TL One".to_string()),
            ..Default::default()
        };
        update_assignment(
            &store,
            "John Smith",
            update,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "admin",
        )
        .unwrap();
        assert_eq!(
            store.roster.records_for("John Smith")[0].tl_name.as_deref(),
            Some("TL One")
        );

        // An explicit blank unassigns
        let clear = AssignmentUpdate {
            tl_name: Some("  ".to_string()),
            ..Default::default()
        };
        update_assignment(
            &store,
            "John Smith",
            clear,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "admin",
        )
        .unwrap();
        assert_eq!(store.roster.records_for("John Smith")[0].tl_name, None);
    }

    #[test]
    fn test_empty_update_refused() {
        let store = RosterStore::new();
        store.roster.insert_batch(vec![record(3)]);

        let result = update_assignment(
            &store,
            "John Smith",
            AssignmentUpdate::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "admin",
        );
        assert!(result.is_err());
    }
}
