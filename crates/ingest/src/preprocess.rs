use chrono::NaiveDateTime;
use regex::Regex;

pub const DEFAULT_DESIGNATION: &str = "Agent";

/// Strip the part-timer suffix and normalize whitespace.
pub fn clean_agent_name(name: &str) -> String {
    // -P / -p marks part-timers in the upstream export
    let re = Regex::new(r"-[Pp]$").unwrap();
    let cleaned = re.replace(name.trim(), "");

    // Collapse internal whitespace runs
    let re = Regex::new(r"\s+").unwrap();
    re.replace_all(cleaned.trim(), " ").to_string()
}

/// Role is derived from the raw (uncleaned) name.
pub fn detect_role(raw_name: &str) -> &'static str {
    if raw_name.trim().ends_with("-P") || raw_name.trim().ends_with("-p") {
        "Part timer"
    } else {
        "Full timer"
    }
}

/// Parse the export's timestamp column. The upstream files carry either
/// ISO-ish or day-first shapes depending on which tool produced them.
pub fn parse_log_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];

    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }
    None
}

/// Empty or whitespace-only form/CSV fields mean "unassigned".
pub fn optional_field(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
