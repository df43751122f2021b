use std::sync::{PoisonError, RwLock};

use serde::Serialize;

/// Default message while voting is open.
pub const DEFAULT_OPEN_MESSAGE: &str = "Voting is open.";
/// Default message after an admin closes voting.
pub const DEFAULT_CLOSED_MESSAGE: &str = "Voting closed by admin.";

/// Whether new votes are accepted, with a message for voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollMode {
    /// Votes are relayed only while this is true
    pub open: bool,
    /// Human-readable status
    pub message: String,
}

/// Owns the open/closed state for the lifetime of the process.
///
/// Starts open. The only transition is [`ModeController::toggle`].
#[derive(Debug)]
pub struct ModeController {
    state: RwLock<PollMode>,
    open_message: String,
    closed_message: String,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_MESSAGE, DEFAULT_CLOSED_MESSAGE)
    }
}

impl ModeController {
    /// Create an open controller with custom messages
    pub fn new(open_message: impl Into<String>, closed_message: impl Into<String>) -> Self {
        let open_message = open_message.into();
        Self {
            state: RwLock::new(PollMode {
                open: true,
                message: open_message.clone(),
            }),
            open_message,
            closed_message: closed_message.into(),
        }
    }

    /// Consistent copy of the current mode
    pub fn current(&self) -> PollMode {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Flip open/closed and return the new mode
    pub fn toggle(&self) -> PollMode {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.open = !state.open;
        state.message = if state.open {
            self.open_message.clone()
        } else {
            self.closed_message.clone()
        };
        log::info!("Voting is now {}", if state.open { "open" } else { "closed" });
        state.clone()
    }
}
