//! In-memory implementation of the access log repository.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::AccessLogRepository;
use crate::error::AppError;

/// Collects decision records in memory so tests can assert on them.
pub struct MemoryAccessLogRepository {
    records: Mutex<Vec<AccessEvent>>,
}

impl MemoryAccessLogRepository {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of everything recorded so far.
    pub fn recorded(&self) -> Vec<AccessEvent> {
        self.records.lock().expect("access log lock poisoned").clone()
    }
}

impl Default for MemoryAccessLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccessLogRepository for MemoryAccessLogRepository {
    async fn insert(&self, event: &AccessEvent) -> Result<(), AppError> {
        self.records
            .lock()
            .expect("access log lock poisoned")
            .push(event.clone());
        Ok(())
    }
}
