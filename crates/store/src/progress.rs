use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

/// Live state of one ingestion job, polled by the upload page.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionProgress {
    pub current_step: String,
    /// 0-100
    pub progress: u8,
    pub message: String,
    pub rows_processed: usize,
    pub total_rows: usize,
    pub done: bool,
}

/// Explicit registry of in-flight ingestion jobs. Passed around by
/// reference; never a process-wide singleton.
pub struct ProgressRegistry {
    jobs: DashMap<Uuid, IngestionProgress>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    pub fn start(&self, id: Uuid, total_rows: usize) {
        self.jobs.insert(
            id,
            IngestionProgress {
                current_step: "Reading file".to_string(),
                progress: 0,
                message: "Starting ingestion".to_string(),
                rows_processed: 0,
                total_rows,
                done: false,
            },
        );
    }

    pub fn update(
        &self,
        id: Uuid,
        step: &str,
        progress: u8,
        message: &str,
        rows_processed: usize,
    ) {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.current_step = step.to_string();
            job.progress = progress.min(100);
            job.message = message.to_string();
            job.rows_processed = rows_processed;
        }
    }

    pub fn finish(&self, id: Uuid, message: &str) {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.current_step = "Done".to_string();
            job.progress = 100;
            job.message = message.to_string();
            job.done = true;
        }
    }

    pub fn get(&self, id: Uuid) -> Option<IngestionProgress> {
        self.jobs.get(&id).map(|job| job.clone())
    }
}

impl Default for ProgressRegistry {
    fn default() -> Self {
        Self::new()
    }
}
