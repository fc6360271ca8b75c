//! # Override Decision State Machine
//!
//! Tracks whether a failed transaction is waiting for, or has received, a
//! human override decision.
//!
//! ## States
//!
//! ```text
//! None ──▶ Pending ──▶ Approved (terminal)
//!   ▲         │
//!   │         └──────▶ Rejected (terminal)
//!   │
//!   └── reset (re-validation; from any state)
//! ```
//!
//! `Pending` is entered by the orchestrator when validation fails with only
//! overridable violations. `approve` and `reject` are one-shot: once the
//! decision has left `Pending`, a second call fails and leaves the record
//! unchanged. Only a full re-validation (`reset`) starts the cycle again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use csw_core::Timestamp;

// ─── Override Status ─────────────────────────────────────────────────

/// The state of a transaction's override decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideStatus {
    /// No override is needed or requested.
    #[default]
    None,
    /// Awaiting a human decision.
    Pending,
    /// Override granted (terminal).
    Approved,
    /// Override refused (terminal).
    Rejected,
}

impl OverrideStatus {
    /// Whether a decision has been taken.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Whether a decision is awaited.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for OverrideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by override-decision transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverrideStateError {
    /// The transition is not allowed from the current state.
    #[error("invalid override transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: OverrideStatus,
        /// Attempted target state.
        to: OverrideStatus,
    },

    /// A decision has already been recorded.
    #[error("override already decided: {state}")]
    TerminalState {
        /// The terminal state.
        state: OverrideStatus,
    },

    /// The approver or rejecter was blank.
    #[error("override decision requires an actor")]
    MissingActor,

    /// The justification (approval) or reason (rejection) was blank.
    #[error("override decision requires a non-empty justification")]
    MissingJustification,
}

// ─── Evidence ────────────────────────────────────────────────────────

/// Who decided, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEvidence {
    actor: String,
    justification: String,
}

impl OverrideEvidence {
    /// Build evidence, rejecting a blank actor or justification.
    pub fn new(
        actor: impl Into<String>,
        justification: impl Into<String>,
    ) -> Result<Self, OverrideStateError> {
        let actor = actor.into();
        let justification = justification.into();
        if actor.trim().is_empty() {
            return Err(OverrideStateError::MissingActor);
        }
        if justification.trim().is_empty() {
            return Err(OverrideStateError::MissingJustification);
        }
        Ok(Self {
            actor: actor.trim().to_string(),
            justification: justification.trim().to_string(),
        })
    }

    /// The deciding user.
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// The recorded justification or reason.
    pub fn justification(&self) -> &str {
        &self.justification
    }
}

/// One entry of the decision's transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTransitionRecord {
    /// State before the transition.
    pub from_state: OverrideStatus,
    /// State after the transition.
    pub to_state: OverrideStatus,
    /// When the transition occurred.
    pub timestamp: Timestamp,
    /// Who caused it; `None` for engine-initiated transitions.
    pub actor: Option<String>,
    /// Why.
    pub reason: String,
}

// ─── Override Decision ───────────────────────────────────────────────

/// The override decision attached to a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideDecision {
    /// Current state.
    pub status: OverrideStatus,
    /// When the override was requested (entered `Pending`).
    pub requested_at: Option<Timestamp>,
    /// Who approved or rejected.
    pub decided_by: Option<String>,
    /// When the decision was taken.
    pub decided_at: Option<Timestamp>,
    /// Approval justification or rejection reason.
    pub justification: Option<String>,
    /// Ordered log of every transition.
    pub transitions: Vec<OverrideTransitionRecord>,
}

impl OverrideDecision {
    /// A decision in state `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a human decision (NONE → PENDING).
    pub fn request(&mut self, reason: &str) -> Result<(), OverrideStateError> {
        self.require_state(OverrideStatus::None, OverrideStatus::Pending)?;
        self.requested_at = Some(Timestamp::now());
        self.do_transition(OverrideStatus::Pending, None, reason);
        Ok(())
    }

    /// Grant the override (PENDING → APPROVED).
    pub fn approve(&mut self, evidence: &OverrideEvidence) -> Result<(), OverrideStateError> {
        self.decide(OverrideStatus::Approved, evidence)
    }

    /// Refuse the override (PENDING → REJECTED).
    pub fn reject(&mut self, evidence: &OverrideEvidence) -> Result<(), OverrideStateError> {
        self.decide(OverrideStatus::Rejected, evidence)
    }

    /// Discard any request or decision ahead of a full re-validation.
    ///
    /// Allowed from every state. The transition log is kept; a reset from
    /// `None` records nothing.
    pub fn reset(&mut self, reason: &str) {
        if self.status == OverrideStatus::None {
            return;
        }
        self.requested_at = None;
        self.decided_by = None;
        self.decided_at = None;
        self.justification = None;
        self.do_transition(OverrideStatus::None, None, reason);
    }

    /// Whether a decision is awaited.
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    fn decide(
        &mut self,
        to: OverrideStatus,
        evidence: &OverrideEvidence,
    ) -> Result<(), OverrideStateError> {
        self.require_state(OverrideStatus::Pending, to)?;
        let now = Timestamp::now();
        self.decided_by = Some(evidence.actor().to_string());
        self.decided_at = Some(now);
        self.justification = Some(evidence.justification().to_string());
        self.do_transition(to, Some(evidence.actor()), evidence.justification());
        Ok(())
    }

    fn require_state(
        &self,
        expected: OverrideStatus,
        target: OverrideStatus,
    ) -> Result<(), OverrideStateError> {
        if self.status.is_terminal() {
            return Err(OverrideStateError::TerminalState { state: self.status });
        }
        if self.status != expected {
            return Err(OverrideStateError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: OverrideStatus, actor: Option<&str>, reason: &str) {
        self.transitions.push(OverrideTransitionRecord {
            from_state: self.status,
            to_state: to,
            timestamp: Timestamp::now(),
            actor: actor.map(str::to_string),
            reason: reason.to_string(),
        });
        self.status = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
