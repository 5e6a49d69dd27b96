//! Connection session state machine.
//!
//! ```text
//! Connecting ──► Authenticated ──► Joined ──► Closed
//!      │               │                        ▲
//!      └───────────────┴────────────────────────┘
//! ```
//!
//! A session is Joined exactly as long as its transport connection is alive.

use super::error::SessionStateError;

/// Lifecycle state of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport accepted, identity not yet verified
    Connecting,
    /// Identity verified, room not yet authorized
    Authenticated,
    /// Registered in the room registry, accepting inbound events
    Joined,
    /// Terminal
    Closed,
}

impl SessionState {
    /// State name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Authenticated => "authenticated",
            Self::Joined => "joined",
            Self::Closed => "closed",
        }
    }

    /// Whether inbound chat events may be processed in this state
    pub fn accepts_events(&self) -> bool {
        matches!(self, Self::Joined)
    }

    /// Move to `next`, rejecting edges the state machine does not have.
    ///
    /// Closing is allowed from every state and is idempotent.
    pub fn transition(self, next: SessionState) -> Result<SessionState, SessionStateError> {
        use SessionState::*;

        match (self, next) {
            (Connecting, Authenticated) | (Authenticated, Joined) | (_, Closed) => Ok(next),
            (from, to) => Err(SessionStateError {
                from: from.name(),
                to: to.name(),
            }),
        }
    }
}
