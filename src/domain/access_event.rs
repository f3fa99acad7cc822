//! Access event model for asynchronous decision logging.

/// How a decision was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// A target was selected (fresh or sticky) and its URL served.
    Target,
    /// No target was eligible; the link's backup URL was served.
    Backup,
}

impl AccessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Backup => "backup",
        }
    }
}

/// An in-memory record of one redirect decision, queued for async persistence.
///
/// Created in the redirect handler and sent to a bounded channel; the
/// background worker turns it into an access-log row. If the queue is full
/// the event is dropped and counted, never blocking the redirect.
#[derive(Debug, Clone)]
pub struct AccessEvent {
    pub link_id: i64,
    /// `None` when the request fell back to the backup URL.
    pub target_id: Option<i64>,
    pub outcome: AccessOutcome,
    pub ip: String,
    pub country: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl AccessEvent {
    pub fn new(
        link_id: i64,
        target_id: Option<i64>,
        outcome: AccessOutcome,
        ip: String,
        country: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            target_id,
            outcome,
            ip,
            country,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_event_creation() {
        let event = AccessEvent::new(
            7,
            Some(42),
            AccessOutcome::Target,
            "203.0.113.9".to_string(),
            Some("DE".to_string()),
            Some("Mozilla/5.0"),
            Some("https://google.com"),
        );

        assert_eq!(event.link_id, 7);
        assert_eq!(event.target_id, Some(42));
        assert_eq!(event.outcome, AccessOutcome::Target);
        assert_eq!(event.country.as_deref(), Some("DE"));
        assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_backup_event_has_no_target() {
        let event = AccessEvent::new(
            7,
            None,
            AccessOutcome::Backup,
            "203.0.113.9".to_string(),
            None,
            None,
            None,
        );

        assert!(event.target_id.is_none());
        assert_eq!(event.outcome.as_str(), "backup");
    }
}
