use std::sync::RwLock;

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A request to delete ingested data, pending admin approval.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteRequest {
    pub id: Uuid,
    pub filename: String,
    /// Empty means the whole file
    pub dates: Vec<NaiveDate>,
    pub reason: Option<String>,
    pub requested_by: String,
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
    pub processed_by: Option<String>,
    pub processed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

pub struct DeleteRequestRegistry {
    requests: RwLock<Vec<DeleteRequest>>,
}

impl DeleteRequestRegistry {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(Vec::new()),
        }
    }

    pub fn create(
        &self,
        filename: &str,
        dates: Vec<NaiveDate>,
        reason: Option<String>,
        requested_by: &str,
    ) -> DeleteRequest {
        let request = DeleteRequest {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            dates,
            reason,
            requested_by: requested_by.to_string(),
            status: RequestStatus::Pending,
            created_at: Utc::now().naive_utc(),
            processed_by: None,
            processed_at: None,
        };

        self.requests.write().unwrap().push(request.clone());
        request
    }

    /// Pending requests, newest first.
    pub fn pending(&self) -> Vec<DeleteRequest> {
        let mut pending: Vec<DeleteRequest> = self
            .requests
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        pending
    }

    pub fn pending_count(&self) -> usize {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count()
    }

    /// Mark a pending request approved or denied. Returns the updated
    /// request so the caller can execute the deletion on approval.
    pub fn decide(&self, id: Uuid, approve: bool, processed_by: &str) -> Result<DeleteRequest> {
        let mut requests = self.requests.write().unwrap();
        let Some(request) = requests.iter_mut().find(|r| r.id == id) else {
            bail!("Delete request not found: {}", id);
        };
        if request.status != RequestStatus::Pending {
            bail!("Delete request already processed: {}", id);
        }

        request.status = if approve {
            RequestStatus::Approved
        } else {
            RequestStatus::Denied
        };
        request.processed_by = Some(processed_by.to_string());
        request.processed_at = Some(Utc::now().naive_utc());

        Ok(request.clone())
    }
}

impl Default for DeleteRequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}
