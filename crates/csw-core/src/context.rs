//! # Validation Context
//!
//! Per-call correlation and actor information. The context is created by
//! the caller (API handler, batch job, test) and passed by reference
//! through every engine entry point. Nothing in the engine reads ambient
//! thread- or task-local state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation id and acting user for one engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationContext {
    /// Correlates log lines, notifications and audit records of one request.
    pub correlation_id: Uuid,
    /// The user on whose behalf the call runs, if known.
    pub user: Option<String>,
}

impl ValidationContext {
    /// A context with a fresh correlation id and no user.
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            user: None,
        }
    }

    /// A context with a fresh correlation id acting for `user`.
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            user: Some(user.into()),
        }
    }

    /// Reuse an upstream correlation id.
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// The user, or `"system"` when none was supplied.
    pub fn actor(&self) -> &str {
        self.user.as_deref().unwrap_or("system")
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}
