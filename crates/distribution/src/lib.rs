pub mod history;
pub mod update;
pub mod view;

pub use history::{AgentRecordHistory, SearchMode, search_agent_records};
pub use update::{AssignmentUpdate, update_assignment, update_status};
pub use view::{AgentView, ViewKey, agents_by_group, agents_by_tl, agents_by_tm, filter_active};
