//! Background worker persisting redirect decisions.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_retry::{Retry, strategy::FixedInterval};

use crate::domain::access_event::{AccessEvent, AccessOutcome};
use crate::domain::repositories::{AccessLogRepository, LinkRepository};

/// Drains the access event channel until every sender is dropped.
///
/// Each event is inserted with a short bounded retry; a target outcome also
/// bumps the link's advisory hit counter. Failures are logged and the event
/// discarded, so a broken store never backs up the redirect path.
pub async fn run_access_worker(
    mut rx: mpsc::Receiver<AccessEvent>,
    access_logs: Arc<dyn AccessLogRepository>,
    links: Arc<dyn LinkRepository>,
) {
    while let Some(event) = rx.recv().await {
        let strategy = FixedInterval::from_millis(200).take(3);
        let insert = Retry::spawn(strategy, || access_logs.insert(&event)).await;

        match insert {
            Ok(()) => {
                metrics::counter!("access_log_written_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("access_log_failed_total").increment(1);
                tracing::error!(link_id = event.link_id, "Failed to persist access log: {e}");
            }
        }

        if event.outcome == AccessOutcome::Target
            && let Err(e) = links.record_link_hit(event.link_id).await
        {
            tracing::warn!(link_id = event.link_id, "Failed to bump link hits: {e}");
        }
    }
}
