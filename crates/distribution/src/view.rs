use chrono::{NaiveDate, NaiveDateTime};
use ingest::{EmploymentStatus, RosterRecord};
use serde::Serialize;
use store::RosterIndex;

/// Which axis a distribution view groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKey {
    TeamManager,
    TeamLeader,
    Group,
}

impl ViewKey {
    fn field<'a>(&self, record: &'a RosterRecord) -> Option<&'a str> {
        match self {
            Self::TeamManager => record.tm_name.as_deref(),
            Self::TeamLeader => record.tl_name.as_deref(),
            Self::Group => record.group_name.as_deref(),
        }
    }
}

/// One agent card in a distribution view.
#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    pub agent_name: String,
    pub designation: Option<String>,
    pub role: Option<String>,
    pub status: EmploymentStatus,
    pub group_name: Option<String>,
    pub tm_name: Option<String>,
    pub tl_name: Option<String>,
    pub log_time: NaiveDateTime,
    /// Set when the agent's latest global record points somewhere else,
    /// e.g. "(Moved on 2024-01-08 to TM Two)"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_tm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_tl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_group: Option<String>,
    pub joined_date: NaiveDate,
}

pub fn agents_by_tm(roster: &RosterIndex, tm_name: &str) -> Vec<AgentView> {
    agents_by(roster, ViewKey::TeamManager, tm_name)
}

pub fn agents_by_tl(roster: &RosterIndex, tl_name: &str) -> Vec<AgentView> {
    agents_by(roster, ViewKey::TeamLeader, tl_name)
}

pub fn agents_by_group(roster: &RosterIndex, group_name: &str) -> Vec<AgentView> {
    agents_by(roster, ViewKey::Group, group_name)
}

/// Build the agent cards for one TM/TL/Group: every agent ever recorded
/// under the key, annotated with where they came from, when they joined
/// this key, and whether they have since moved elsewhere.
fn agents_by(roster: &RosterIndex, key: ViewKey, value: &str) -> Vec<AgentView> {
    let latest_global = roster.latest_record_map(None);
    let mut views = Vec::new();

    for name in roster.agent_names() {
        let history = roster.records_for(&name);

        // Records under this key, oldest first (history is sorted)
        let mut under_key = history
            .iter()
            .filter(|r| key.field(r).is_some_and(|v| v.eq_ignore_ascii_case(value)));

        let Some(first_here) = under_key.next() else {
            continue;
        };
        let display = under_key.last().unwrap_or(first_here);

        // Moved elsewhere since?
        let moved_note = latest_global.get(&name.to_lowercase()).and_then(|latest| {
            match key.field(latest) {
                Some(current) if current.eq_ignore_ascii_case(value) => None,
                _ => Some(format!(
                    "(Moved on {} to {})",
                    latest.log_time.date().format("%Y-%m-%d"),
                    key.field(latest).unwrap_or("Unassigned"),
                )),
            }
        });

        // Most recent earlier record under a different key value
        let from = history
            .iter()
            .rev()
            .filter(|r| r.log_time < display.log_time)
            .find_map(|r| match key.field(r) {
                Some(other) if !other.eq_ignore_ascii_case(value) => Some(other.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "N/A".to_string());

        let mut view = AgentView {
            agent_name: display.agent_name.clone(),
            designation: display.designation.clone(),
            role: display.role.clone(),
            status: display.status,
            group_name: display.group_name.clone(),
            tm_name: display.tm_name.clone(),
            tl_name: display.tl_name.clone(),
            log_time: display.log_time,
            moved_note,
            from_tm: None,
            from_tl: None,
            from_group: None,
            joined_date: first_here.log_time.date(),
        };
        match key {
            ViewKey::TeamManager => view.from_tm = Some(from),
            ViewKey::TeamLeader => view.from_tl = Some(from),
            ViewKey::Group => view.from_group = Some(from),
        }
        views.push(view);
    }

    views.sort_by(|a, b| {
        a.agent_name
            .to_lowercase()
            .cmp(&b.agent_name.to_lowercase())
    });
    views
}

/// The Active/All toggle: active means employed and not moved away.
pub fn filter_active(views: Vec<AgentView>) -> Vec<AgentView> {
    views
        .into_iter()
        .filter(|v| v.status == EmploymentStatus::Employee && v.moved_note.is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, day: u32, tm: &str, status: EmploymentStatus) -> RosterRecord {
        RosterRecord {
            agent_name: name.to_string(),
            log_time: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            designation: Some("Agent".to_string()),
            role: Some("Full timer".to_string()),
            group_name: Some("Group A".to_string()),
            tm_name: Some(tm.to_string()),
            tl_name: None,
            status,
            profile_id: None,
            call_log_id: None,
            source_file: "jan.csv".to_string(),
        }
    }

    fn seeded() -> RosterIndex {
        let roster = RosterIndex::new();
        roster.insert_batch(vec![
            // John: TM One, then moved to TM Two
            record("John Smith", 3, "TM One", EmploymentStatus::Employee),
            record("John Smith", 5, "TM One", EmploymentStatus::Employee),
            record("John Smith", 8, "TM Two", EmploymentStatus::Employee),
            // Jane: always TM One
            record("Jane Doe", 4, "TM One", EmploymentStatus::Employee),
            // Bob: laid off under TM One
            record("Bob Ray", 5, "TM One", EmploymentStatus::LayOff),
        ]);
        roster
    }

    #[test]
    fn test_agents_by_tm_annotations() {
        let roster = seeded();
        let views = agents_by_tm(&roster, "TM One");

        // Sorted by name
        let names: Vec<&str> = views.iter().map(|v| v.agent_name.as_str()).collect();
        assert_eq!(names, vec!["Bob Ray", "Jane Doe", "John Smith"]);

        let john = &views[2];
        assert_eq!(
            john.moved_note.as_deref(),
            Some("(Moved on 2024-01-08 to TM Two)")
        );
        assert_eq!(john.joined_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        // Latest record under TM One is the Jan 5 one
        assert_eq!(john.log_time.date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(john.from_tm.as_deref(), Some("N/A"));

        let jane = &views[1];
        assert!(jane.moved_note.is_none());
    }

    #[test]
    fn test_from_field_tracks_previous_tm() {
        let roster = seeded();
        let views = agents_by_tm(&roster, "TM Two");

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].agent_name, "John Smith");
        assert_eq!(views[0].from_tm.as_deref(), Some("TM One"));
        assert!(views[0].moved_note.is_none());
        assert_eq!(
            views[0].joined_date,
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
        );
    }

    #[test]
    fn test_filter_active() {
        let roster = seeded();
        let views = agents_by_tm(&roster, "TM One");
        let active = filter_active(views);

        // Bob is laid off, John has moved; only Jane remains
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].agent_name, "Jane Doe");
    }

    #[test]
    fn test_group_view_uses_group_field() {
        let roster = seeded();
        let views = agents_by_group(&roster, "Group A");

        assert_eq!(views.len(), 3);
        assert!(views.iter().all(|v| v.from_group.is_some()));
        assert!(views.iter().all(|v| v.from_tm.is_none()));
    }
}
