//! Local notifiers: one that records events and one that logs them.

use async_trait::async_trait;
use parking_lot::Mutex;

use csw_validation::{NotificationEvent, NotifyError, WebhookNotifier};

/// Keeps every dispatched event in memory. A failing recorder still
/// records, then reports a transport error.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose every dispatch fails.
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().clone()
    }

    /// Event types in dispatch order.
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl WebhookNotifier for RecordingNotifier {
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        self.events.lock().push(event.clone());
        if self.fail {
            return Err(NotifyError::Transport("recording notifier set to fail".into()));
        }
        Ok(())
    }
}

/// Writes each event to the `tracing` pipeline at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl WebhookNotifier for TracingNotifier {
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        tracing::info!(
            event_type = %event.event_type,
            occurred_at = %event.occurred_at,
            payload = %event.payload,
            "notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csw_core::Timestamp;

    fn event(kind: &str) -> NotificationEvent {
        NotificationEvent {
            event_type: kind.into(),
            payload: serde_json::json!({ "n": 1 }),
            occurred_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn records_in_order() {
        let n = RecordingNotifier::new();
        n.dispatch(&event("a")).await.unwrap();
        n.dispatch(&event("b")).await.unwrap();
        assert_eq!(n.event_types(), vec!["a", "b"]);
        n.clear();
        assert!(n.events().is_empty());
    }

    #[tokio::test]
    async fn failing_recorder_still_records() {
        let n = RecordingNotifier::failing();
        assert!(matches!(
            n.dispatch(&event("a")).await,
            Err(NotifyError::Transport(_))
        ));
        assert_eq!(n.events().len(), 1);
    }

    #[tokio::test]
    async fn tracing_notifier_never_fails() {
        TracingNotifier.dispatch(&event("a")).await.unwrap();
    }
}
