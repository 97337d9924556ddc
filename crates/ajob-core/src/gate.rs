//! Security gate evaluated before any network call is made.
//!
//! Rules, in order (first failure wins):
//! 1. repository is private, otherwise [`RejectionKind::SecurityViolation`];
//! 2. repository is not a fork, otherwise [`RejectionKind::SecurityViolation`];
//! 3. action is `queued`, otherwise [`RejectionKind::NonTarget`];
//! 4. labels carry the capability marker (case-insensitive), otherwise [`RejectionKind::NonTarget`].
use std::{fmt, ops::Deref};

use ajob_model::{Action, CAPABILITY_LABEL, InboundEvent};

/// Why an event was not acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Policy rejection; surfaced to the sender as a client error.
    SecurityViolation,
    /// The event does not qualify; acknowledged without action.
    NonTarget,
}

impl RejectionKind {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            RejectionKind::SecurityViolation => "security_violation",
            RejectionKind::NonTarget => "non_target",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub reason: String,
}

impl Rejection {
    pub fn security(reason: impl Into<String>) -> Self {
        Self {
            kind: RejectionKind::SecurityViolation,
            reason: reason.into(),
        }
    }

    pub fn non_target(reason: impl Into<String>) -> Self {
        Self {
            kind: RejectionKind::NonTarget,
            reason: reason.into(),
        }
    }

    pub fn is_security_violation(&self) -> bool {
        self.kind == RejectionKind::SecurityViolation
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_label(), self.reason)
    }
}

/// Event that passed the gate.
#[derive(Debug, Clone, Copy)]
pub struct AdmittedEvent<'a>(&'a InboundEvent);

impl<'a> AdmittedEvent<'a> {
    pub fn event(&self) -> &'a InboundEvent {
        self.0
    }
}

impl Deref for AdmittedEvent<'_> {
    type Target = InboundEvent;

    fn deref(&self) -> &InboundEvent {
        self.0
    }
}

/// Pure admission predicate.
#[derive(Debug, Clone)]
pub struct SecurityGate {
    capability: String,
}

impl Default for SecurityGate {
    fn default() -> Self {
        Self::new(CAPABILITY_LABEL)
    }
}

impl SecurityGate {
    /// Create a gate requiring the given capability label.
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
        }
    }

    pub fn admit<'a>(&self, event: &'a InboundEvent) -> Result<AdmittedEvent<'a>, Rejection> {
        let repo = &event.repository;
        if !repo.private {
            return Err(Rejection::security(format!(
                "repository {} is public; self-hosted jobs only run for private repositories",
                repo.full_name
            )));
        }
        if repo.fork {
            return Err(Rejection::security(format!(
                "repository {} is a fork; self-hosted jobs never run for forks",
                repo.full_name
            )));
        }
        if event.action != Action::Queued {
            return Err(Rejection::non_target(format!(
                "action {:?} is not queued",
                event.action.as_str()
            )));
        }
        if !event.labels.contains_ignore_case(&self.capability) {
            return Err(Rejection::non_target(format!(
                "label {:?} not found in [{}]",
                self.capability, event.labels
            )));
        }
        Ok(AdmittedEvent(event))
    }
}
