//! The per-connection state machine is `handshake -> AuthPending -> Active
//! -> Closed`; [`connection::accept`](crate::connection::accept) is
//! AUTH_PENDING, [`connection`]'s internal run loop is ACTIVE, and every
//! path into CLOSED carries one of these reasons.

/// Why a session ended. Each reason maps onto a fixed WebSocket close code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    AuthFailed,
    Graceful,
    Superseded,
    LivenessLost,
}

impl CloseReason {
    pub fn code(self) -> u16 {
        match self {
            Self::AuthFailed => 1008,
            Self::Graceful => 1001,
            Self::Superseded => 4000,
            Self::LivenessLost => 4001,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthFailed => "auth_failed",
            Self::Graceful => "graceful",
            Self::Superseded => "superseded",
            Self::LivenessLost => "liveness_lost",
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
