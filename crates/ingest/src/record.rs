use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One logged snapshot of an agent's assignment state.
///
/// Assignment fields are `None` when unassigned; the presentation layer
/// decides what placeholder to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRecord {
    pub agent_name: String,
    pub log_time: NaiveDateTime,
    pub designation: Option<String>,
    pub role: Option<String>,
    pub group_name: Option<String>,
    pub tm_name: Option<String>,
    pub tl_name: Option<String>,
    pub status: EmploymentStatus,
    pub profile_id: Option<String>,
    pub call_log_id: Option<String>,
    pub source_file: String,
}

impl RosterRecord {
    /// True when any assignment field differs from `other`. Used to find
    /// the "previous record" worth showing next to the latest one.
    pub fn assignment_differs(&self, other: &RosterRecord) -> bool {
        self.designation != other.designation
            || self.role != other.role
            || self.group_name != other.group_name
            || self.tm_name != other.tm_name
            || self.tl_name != other.tl_name
    }
}

/// Employment status carried on every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Employee,
    #[serde(rename = "Long Leave")]
    LongLeave,
    #[serde(rename = "Lay Off")]
    LayOff,
    Resigned,
}

impl EmploymentStatus {
    /// Lenient parse from CSV/form text. Unknown or empty input means
    /// the agent is a regular employee, matching the upstream default.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "long leave" => Self::LongLeave,
            "lay off" | "layoff" => Self::LayOff,
            "resigned" => Self::Resigned,
            _ => Self::Employee,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::LongLeave => "Long Leave",
            Self::LayOff => "Lay Off",
            Self::Resigned => "Resigned",
        }
    }
}

impl Default for EmploymentStatus {
    fn default() -> Self {
        Self::Employee
    }
}

impl std::fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(tm: Option<&str>, tl: Option<&str>) -> RosterRecord {
        RosterRecord {
            agent_name: "Test Agent".to_string(),
            log_time: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            designation: Some("Agent".to_string()),
            role: Some("Full timer".to_string()),
            group_name: Some("Group A".to_string()),
            tm_name: tm.map(|s| s.to_string()),
            tl_name: tl.map(|s| s.to_string()),
            status: EmploymentStatus::Employee,
            profile_id: None,
            call_log_id: None,
            source_file: "test.csv".to_string(),
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(EmploymentStatus::parse("Employee"), EmploymentStatus::Employee);
        assert_eq!(EmploymentStatus::parse("long leave"), EmploymentStatus::LongLeave);
        assert_eq!(EmploymentStatus::parse("LAY OFF"), EmploymentStatus::LayOff);
        assert_eq!(EmploymentStatus::parse("resigned"), EmploymentStatus::Resigned);
        assert_eq!(EmploymentStatus::parse(""), EmploymentStatus::Employee);
        assert_eq!(EmploymentStatus::parse("whatever"), EmploymentStatus::Employee);
    }

    #[test]
    fn test_assignment_differs() {
        let a = record(Some("TM One"), Some("TL One"));
        let same = record(Some("TM One"), Some("TL One"));
        let moved = record(Some("TM Two"), Some("TL One"));

        assert!(!a.assignment_differs(&same));
        assert!(a.assignment_differs(&moved));
    }
}
