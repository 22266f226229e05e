use chrono::NaiveDate;
use ingest::RosterRecord;
use serde::Serialize;
use store::RosterIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Default,
    DateFilter,
    Error,
}

/// What the agent search returns: either the latest + last-changed
/// records (default mode), or everything on one chosen day.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRecordHistory {
    pub mode: SearchMode,
    pub records: Vec<RosterRecord>,
    pub dates: Vec<NaiveDate>,
}

impl AgentRecordHistory {
    pub fn empty(mode: SearchMode) -> Self {
        Self {
            mode,
            records: Vec::new(),
            dates: Vec::new(),
        }
    }
}

/// Look up history records for a (partial) agent name.
///
/// Without a date: the latest record, plus the most recent earlier
/// record whose assignment differs (so the display can show what
/// changed), plus the list of distinct record dates. With a date: every
/// record on that day, newest first.
pub fn search_agent_records(
    roster: &RosterIndex,
    agent_name: &str,
    date: Option<NaiveDate>,
) -> AgentRecordHistory {
    let name = agent_name.trim();
    if name.is_empty() {
        return AgentRecordHistory::empty(SearchMode::Error);
    }

    // ilike-style containment match, newest first
    let records = roster.records_matching(name);

    if let Some(day) = date {
        let on_day: Vec<RosterRecord> = records
            .into_iter()
            .filter(|r| r.log_time.date() == day)
            .collect();
        return AgentRecordHistory {
            mode: SearchMode::DateFilter,
            records: on_day,
            dates: Vec::new(),
        };
    }

    if records.is_empty() {
        return AgentRecordHistory::empty(SearchMode::Default);
    }

    let mut dates: Vec<NaiveDate> = Vec::new();
    for record in &records {
        let day = record.log_time.date();
        if !dates.contains(&day) {
            dates.push(day);
        }
    }
    dates.sort_by(|a, b| b.cmp(a));

    let latest = records[0].clone();
    let previous = records[1..]
        .iter()
        .find(|r| r.assignment_differs(&latest))
        .cloned();

    let mut selected = vec![latest];
    selected.extend(previous);

    AgentRecordHistory {
        mode: SearchMode::Default,
        records: selected,
        dates,
    }
}
