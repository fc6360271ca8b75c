//! # HTTP Webhook Notifier
//!
//! POSTs each [`NotificationEvent`] as JSON to the configured endpoint.
//! The bearer token, when configured, is sent on every request. The event
//! type is repeated in the `X-Csw-Event` header so receivers can route
//! without parsing the body.
//!
//! No retries: the engine dispatches best-effort and logs failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use csw_validation::{NotificationEvent, NotifyError, WebhookConfig, WebhookNotifier};

/// Header carrying the event type.
pub const EVENT_HEADER: &str = "x-csw-event";

const BODY_EXCERPT_CHARS: usize = 512;

/// [`WebhookNotifier`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpWebhookNotifier {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpWebhookNotifier {
    /// Build a notifier from configuration.
    pub fn new(config: &WebhookConfig) -> Result<Self, NotifyError> {
        let url = reqwest::Url::parse(config.url.trim())
            .map_err(|e| NotifyError::NotConfigured(format!("webhook url {:?}: {e}", config.url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                NotifyError::NotConfigured("invalid auth token characters".into())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| NotifyError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, url })
    }

    /// Endpoint events are posted to.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[async_trait]
impl WebhookNotifier for HttpWebhookNotifier {
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(event)?;
        let event_header = HeaderValue::from_str(&event.event_type)
            .map_err(|_| NotifyError::NotConfigured("event type is not a valid header".into()))?;

        let resp = self
            .client
            .post(self.url.clone())
            .header(EVENT_HEADER, event_header)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Transport(format!("timed out posting to {}", self.url))
                } else {
                    NotifyError::Transport(format!("POST {}: {e}", self.url))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }

        tracing::debug!(
            event_type = %event.event_type,
            status = status.as_u16(),
            "webhook delivered"
        );
        Ok(())
    }
}
