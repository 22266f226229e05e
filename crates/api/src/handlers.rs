use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use distribution::{AgentRecordHistory, AgentView, SearchMode};
use ingest::{EmploymentStatus, RosterRecord};
use store::{ActivityEntry, DeleteRequest, Role, SourceFileInfo, TeamLeader, TeamManager, User};

use crate::AppState;
use crate::metrics::TimedOperation;

type ApiError = (StatusCode, String);

fn bad_request(error: anyhow::Error) -> ApiError {
    (StatusCode::BAD_REQUEST, error.to_string())
}

fn actor_from(headers: &HeaderMap) -> String {
    headers
        .get("X-Acting-User")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("system")
        .to_string()
}

// ==================== HEALTH / STATS ==================== //

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    agents: usize,
    records: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        agents: state.store.roster.agent_count(),
        records: state.store.roster.record_count(),
    })
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<crate::metrics::MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

// ==================== AGENT SEARCH ==================== //

#[derive(Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    suggestions: Vec<String>,
}

/// Autocomplete for the agent search box.
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestParams>,
) -> Json<SuggestResponse> {
    let timer = TimedOperation::start();

    let names = state.store.roster.agent_names();
    let mut suggestions = search::search(
        params.q.trim(),
        &names,
        state.config.search.suggest_threshold,
    );
    suggestions.truncate(state.config.search.max_suggestions);

    state.metrics.record_search(timer.elapsed());
    state.metrics.record_request(true);
    Json(SuggestResponse { suggestions })
}

#[derive(Deserialize)]
pub struct SearchAgentParams {
    #[serde(default)]
    name: String,
    date: Option<String>,
}

#[derive(Serialize)]
pub struct SearchAgentResponse {
    mode: SearchMode,
    /// The name records were actually fetched for
    matched_name: Option<String>,
    /// Set when the match came from the "did you mean" fallback
    suggestion: Option<String>,
    records: Vec<RosterRecord>,
    dates: Vec<NaiveDate>,
}

/// Agent record lookup.
///
/// Tries the entered name first; when nothing matches, falls back to
/// the fuzzy matcher over the directory and fetches the best
/// suggestion's records instead. Results are collapsed to one record
/// per calendar day, newest first.
pub async fn search_agent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchAgentParams>,
) -> Json<SearchAgentResponse> {
    let timer = TimedOperation::start();

    let name = params.name.trim().to_string();
    if name.is_empty() {
        state.metrics.record_request(true);
        return Json(SearchAgentResponse {
            mode: SearchMode::Error,
            matched_name: None,
            suggestion: None,
            records: Vec::new(),
            dates: Vec::new(),
        });
    }

    // An unparsable date filter is ignored rather than rejected
    let date = params
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

    let mut matched_name = name.clone();
    let mut suggestion = None;
    let mut history = distribution::search_agent_records(&state.store.roster, &name, date);

    // "Did you mean" fallback over the directory
    if history.records.is_empty() && date.is_none() {
        let names = state.store.roster.agent_names();
        let candidates = search::search(&name, &names, state.config.search.fallback_threshold);
        if let Some(best) = candidates.first() {
            tracing::info!(query = %name, matched = %best, "Fuzzy fallback match");
            history = distribution::search_agent_records(&state.store.roster, best, None);
            matched_name = best.clone();
            suggestion = Some(best.clone());
        }
    }

    let AgentRecordHistory {
        mode,
        records,
        dates,
    } = history;
    let records = search::deduplicate_and_sort(&records);

    state.metrics.record_search(timer.elapsed());
    state.metrics.record_request(true);
    Json(SearchAgentResponse {
        mode,
        matched_name: Some(matched_name),
        suggestion,
        records,
        dates,
    })
}

// ==================== DISTRIBUTION VIEWS ==================== //

#[derive(Deserialize)]
pub struct ViewFilter {
    filter: Option<String>,
}

fn apply_filter(views: Vec<AgentView>, filter: Option<&str>) -> Vec<AgentView> {
    match filter {
        Some("active") => distribution::filter_active(views),
        _ => views,
    }
}

pub async fn get_tm_agents(
    State(state): State<Arc<AppState>>,
    Path(tm_name): Path<String>,
    Query(params): Query<ViewFilter>,
) -> Json<Vec<AgentView>> {
    let views = distribution::agents_by_tm(&state.store.roster, &tm_name);
    state.metrics.record_request(true);
    Json(apply_filter(views, params.filter.as_deref()))
}

pub async fn get_tl_agents(
    State(state): State<Arc<AppState>>,
    Path(tl_name): Path<String>,
    Query(params): Query<ViewFilter>,
) -> Json<Vec<AgentView>> {
    let views = distribution::agents_by_tl(&state.store.roster, &tl_name);
    state.metrics.record_request(true);
    Json(apply_filter(views, params.filter.as_deref()))
}

pub async fn get_group_agents(
    State(state): State<Arc<AppState>>,
    Path(group_name): Path<String>,
    Query(params): Query<ViewFilter>,
) -> Json<Vec<AgentView>> {
    let views = distribution::agents_by_group(&state.store.roster, &group_name);
    state.metrics.record_request(true);
    Json(apply_filter(views, params.filter.as_deref()))
}

// ==================== UPLOAD / FILES ==================== //

#[derive(Serialize)]
pub struct UploadResponse {
    ingestion_id: Uuid,
    source_id: String,
    rows_read: usize,
    rows_kept: usize,
    rows_skipped: usize,
    date_range: Option<(NaiveDate, NaiveDate)>,
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let timer = TimedOperation::start();
    let actor = actor_from(&headers);

    let source_file = headers
        .get("X-Source-Filename")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("upload.csv")
        .to_string();

    let ingestion_id = Uuid::new_v4();
    state.store.progress.start(ingestion_id, 0);
    state
        .store
        .progress
        .update(ingestion_id, "Parsing CSV", 10, "Reading rows", 0);

    let (records, report) = match ingest::ingest_bytes(&body, &source_file) {
        Ok(parsed) => parsed,
        Err(error) => {
            state
                .store
                .progress
                .finish(ingestion_id, &format!("Ingestion failed: {}", error));
            state.metrics.record_request(false);
            return Err(bad_request(error));
        }
    };

    state.store.progress.update(
        ingestion_id,
        "Inserting records",
        60,
        "Updating roster history",
        report.rows_kept,
    );
    state.store.roster.insert_batch(records);

    state.store.progress.finish(
        ingestion_id,
        &format!("Ingested {} rows from '{}'", report.rows_kept, source_file),
    );
    state.store.activity.log(
        &actor,
        format!(
            "Uploaded '{}' ({} rows kept, {} skipped)",
            source_file, report.rows_kept, report.rows_skipped
        ),
    );
    state.metrics.record_ingest(timer.elapsed(), report.rows_kept);
    state.metrics.record_request(true);

    tracing::info!(
        source_file,
        rows = report.rows_kept,
        skipped = report.rows_skipped,
        "Upload ingested"
    );

    Ok(Json(UploadResponse {
        ingestion_id,
        source_id: ingest::generate_source_id(&source_file),
        rows_read: report.rows_read,
        rows_kept: report.rows_kept,
        rows_skipped: report.rows_skipped,
        date_range: report.date_range,
    }))
}

pub async fn upload_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<store::IngestionProgress>, ApiError> {
    state
        .store
        .progress
        .get(id)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown ingestion: {}", id)))
}

pub async fn list_files(State(state): State<Arc<AppState>>) -> Json<Vec<SourceFileInfo>> {
    Json(state.store.roster.source_files())
}

#[derive(Serialize)]
pub struct FileDatesResponse {
    filename: String,
    dates: Vec<NaiveDate>,
}

pub async fn file_dates(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Json<FileDatesResponse> {
    Json(FileDatesResponse {
        dates: state.store.roster.source_dates(&filename),
        filename,
    })
}

// ==================== DELETE REQUESTS ==================== //

#[derive(Deserialize)]
pub struct CreateDeleteRequest {
    filename: String,
    #[serde(default)]
    dates: Vec<NaiveDate>,
    reason: Option<String>,
}

pub async fn create_delete_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateDeleteRequest>,
) -> Result<Json<DeleteRequest>, ApiError> {
    if body.filename.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Filename is required".to_string()));
    }

    let actor = actor_from(&headers);
    let request =
        state
            .store
            .delete_requests
            .create(body.filename.trim(), body.dates, body.reason, &actor);
    state.store.activity.log(
        &actor,
        format!("Requested deletion of '{}'", request.filename),
    );
    state.metrics.record_request(true);
    Ok(Json(request))
}

pub async fn pending_delete_requests(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<DeleteRequest>> {
    Json(state.store.delete_requests.pending())
}

#[derive(Serialize)]
pub struct DecisionResponse {
    success: bool,
    message: String,
}

pub async fn approve_delete_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<DecisionResponse>, ApiError> {
    let actor = actor_from(&headers);
    let removed = state
        .store
        .approve_delete_request(id, &actor)
        .map_err(bad_request)?;
    state.metrics.record_request(true);
    Ok(Json(DecisionResponse {
        success: true,
        message: format!("Deletion approved and executed ({} records)", removed),
    }))
}

pub async fn deny_delete_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<DecisionResponse>, ApiError> {
    let actor = actor_from(&headers);
    state
        .store
        .deny_delete_request(id, &actor)
        .map_err(bad_request)?;
    state.metrics.record_request(true);
    Ok(Json(DecisionResponse {
        success: true,
        message: "Deletion request denied".to_string(),
    }))
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pending_count: usize,
    requests: Vec<DeleteRequest>,
}

/// Feeds the approval badge/dropdown.
pub async fn notifications(State(state): State<Arc<AppState>>) -> Json<NotificationsResponse> {
    let requests = state.store.delete_requests.pending();
    Json(NotificationsResponse {
        pending_count: requests.len(),
        requests,
    })
}

// ==================== AGENT UPDATES ==================== //

#[derive(Deserialize)]
pub struct StatusUpdateBody {
    agent_name: String,
    status: String,
    effective_date: NaiveDate,
}

pub async fn update_agent_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<StatusUpdateBody>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let actor = actor_from(&headers);
    let status = EmploymentStatus::parse(&body.status);

    let touched = distribution::update_status(
        &state.store,
        &body.agent_name,
        status,
        body.effective_date,
        &actor,
    )
    .map_err(bad_request)?;

    state.metrics.record_request(true);
    Ok(Json(DecisionResponse {
        success: true,
        message: format!(
            "Status for {} updated to {} from {} onwards ({} records)",
            body.agent_name.trim(),
            status,
            body.effective_date,
            touched
        ),
    }))
}

#[derive(Deserialize)]
pub struct AssignmentUpdateBody {
    agent_name: String,
    from_date: NaiveDate,
    designation: Option<String>,
    role: Option<String>,
    group_name: Option<String>,
    tm_name: Option<String>,
    tl_name: Option<String>,
}

pub async fn update_agent(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AssignmentUpdateBody>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let actor = actor_from(&headers);

    let update = distribution::AssignmentUpdate {
        designation: body.designation,
        role: body.role,
        group_name: body.group_name,
        tm_name: body.tm_name,
        tl_name: body.tl_name,
    };

    let touched = distribution::update_assignment(
        &state.store,
        &body.agent_name,
        update,
        body.from_date,
        &actor,
    )
    .map_err(bad_request)?;

    state.metrics.record_request(true);
    Ok(Json(DecisionResponse {
        success: true,
        message: format!("{} updated ({} records)", body.agent_name.trim(), touched),
    }))
}

// ==================== ACTIVITY LOG ==================== //

#[derive(Deserialize)]
pub struct LogsParams {
    date: Option<String>,
    user: Option<String>,
}

#[derive(Serialize)]
pub struct LogsResponse {
    entries: Vec<ActivityEntry>,
    available_dates: Vec<NaiveDate>,
    available_users: Vec<String>,
}

pub async fn view_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogsParams>,
) -> Json<LogsResponse> {
    let date = params
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

    Json(LogsResponse {
        entries: state.store.activity.entries(date, params.user.as_deref()),
        available_dates: state.store.activity.available_dates(),
        available_users: state.store.activity.available_users(),
    })
}

pub async fn clear_logs(State(state): State<Arc<AppState>>) -> Json<DecisionResponse> {
    let cleared = state.store.activity.clear();
    Json(DecisionResponse {
        success: true,
        message: format!("Cleared {} log entries successfully.", cleared),
    })
}

// ==================== ADMIN PANEL ==================== //

pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    Json(state.store.admin.users())
}

#[derive(Deserialize)]
pub struct CreateUserBody {
    username: String,
    role: String,
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateUserBody>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .admin
        .create_user(&body.username, &body.role)
        .map_err(bad_request)?;
    state.store.activity.log(
        &actor_from(&headers),
        format!("Created user '{}' with role '{}'", user.username, body.role),
    );
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<DecisionResponse>, ApiError> {
    let actor = actor_from(&headers);
    let user = state
        .store
        .admin
        .delete_user(id, &actor)
        .map_err(bad_request)?;
    state
        .store
        .activity
        .log(&actor, format!("Deleted user '{}'", user.username));
    Ok(Json(DecisionResponse {
        success: true,
        message: format!("User {} deleted", user.username),
    }))
}

pub async fn list_roles(State(state): State<Arc<AppState>>) -> Json<Vec<Role>> {
    Json(state.store.admin.roles().to_vec())
}

#[derive(Deserialize)]
pub struct CreateTeamManagerBody {
    name: String,
    group_name: String,
}

pub async fn create_team_manager(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateTeamManagerBody>,
) -> Result<Json<TeamManager>, ApiError> {
    let manager = state
        .store
        .admin
        .create_team_manager(&body.name, &body.group_name)
        .map_err(bad_request)?;
    state.store.activity.log(
        &actor_from(&headers),
        format!("Created team manager '{}'", manager.name),
    );
    Ok(Json(manager))
}

pub async fn list_team_managers(State(state): State<Arc<AppState>>) -> Json<Vec<TeamManager>> {
    Json(state.store.admin.team_managers())
}

pub async fn deactivate_team_manager(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DecisionResponse>, ApiError> {
    let actor = actor_from(&headers);
    state
        .store
        .admin
        .deactivate_team_manager(&name)
        .map_err(bad_request)?;
    state
        .store
        .activity
        .log(&actor, format!("Deactivated team manager '{}'", name));
    Ok(Json(DecisionResponse {
        success: true,
        message: format!("Team manager {} deactivated", name),
    }))
}

#[derive(Deserialize)]
pub struct CreateTeamLeaderBody {
    name: String,
    tm_name: String,
}

pub async fn create_team_leader(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateTeamLeaderBody>,
) -> Result<Json<TeamLeader>, ApiError> {
    let leader = state
        .store
        .admin
        .create_team_leader(&body.name, &body.tm_name)
        .map_err(bad_request)?;
    state.store.activity.log(
        &actor_from(&headers),
        format!(
            "Created team leader '{}' under '{}'",
            leader.name, leader.tm_name
        ),
    );
    Ok(Json(leader))
}

pub async fn list_team_leaders(State(state): State<Arc<AppState>>) -> Json<Vec<TeamLeader>> {
    Json(state.store.admin.team_leaders())
}
