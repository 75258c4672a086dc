//! Per-UI generation session
//!
//! `Idle -> Busy -> (Success | Error) -> Idle` on the next submission.
//! At most one request is in flight per session.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::warn;

use super::{ClientError, RelayClient};
use crate::relay::InlineImage;

/// Observable session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Busy,
    Success(InlineImage),
    Error(String),
}

/// Returned when a submission is attempted while a request is in flight
#[derive(Debug, Error, PartialEq, Eq)]
#[error("a generation request is already in flight")]
pub struct SessionBusy;

/// Generation state machine for one UI instance
#[derive(Debug, Clone)]
pub struct GeneratorSession {
    client: RelayClient,
    state: Arc<Mutex<SessionState>>,
}

/// Returns the session to Idle if the call is abandoned mid-flight
struct BusyGuard {
    state: Arc<Mutex<SessionState>>,
    done: bool,
}

impl BusyGuard {
    fn finish(mut self, next: SessionState) {
        *self.state.lock() = next;
        self.done = true;
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if !self.done {
            *self.state.lock() = SessionState::Idle;
        }
    }
}

impl GeneratorSession {
    /// Create an idle session
    pub fn new(client: RelayClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(SessionState::Idle)),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Whether a request is in flight
    pub fn is_busy(&self) -> bool {
        matches!(*self.state.lock(), SessionState::Busy)
    }

    /// Drop any displayed image or error
    pub fn clear(&self) {
        let mut state = self.state.lock();
        if !matches!(*state, SessionState::Busy) {
            *state = SessionState::Idle;
        }
    }

    /// Submit a prompt and wait for the outcome
    ///
    /// Refused while another submission is in flight. A blank prompt moves
    /// straight to `Error` without contacting the relay.
    pub async fn submit(&self, prompt: &str) -> Result<SessionState, SessionBusy> {
        let guard = {
            let mut state = self.state.lock();
            if matches!(*state, SessionState::Busy) {
                return Err(SessionBusy);
            }

            if prompt.trim().is_empty() {
                *state = SessionState::Error(ClientError::EmptyPrompt.to_string());
                return Ok(state.clone());
            }

            *state = SessionState::Busy;
            BusyGuard {
                state: self.state.clone(),
                done: false,
            }
        };

        let next = match self.client.generate(prompt).await {
            Ok(image) => SessionState::Success(image),
            Err(e) => {
                warn!("Generation failed: {}", e);
                SessionState::Error(e.to_string())
            }
        };

        guard.finish(next.clone());
        Ok(next)
    }
}
