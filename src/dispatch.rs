//! Hand-off from provider callbacks to the thread that owns the UI state.
//!
//! Provider callbacks only ever hold a [`UiSender`]. Whatever they learn is
//! posted as a [`UiMessage`] and applied later by the controller on its own
//! thread, so the event list and the create flag have a single writer.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::debug;

use crate::calendar::{CalendarError, EditorAction};

#[derive(Debug)]
pub enum UiMessage {
    AccessResolved {
        granted: bool,
        error: Option<CalendarError>,
    },
    EditorCompleted(EditorAction),
}

#[derive(Debug, Clone)]
pub struct UiSender {
    tx: Sender<UiMessage>,
}

impl UiSender {
    /// Fire-and-forget; a message for a dropped queue is discarded.
    pub fn post(&self, message: UiMessage) {
        if let Err(mpsc::SendError(message)) = self.tx.send(message) {
            debug!(?message, "ui queue closed, dropping message");
        }
    }
}

#[derive(Debug)]
pub struct UiQueue {
    rx: Receiver<UiMessage>,
    tx: Sender<UiMessage>,
}

impl UiQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    pub fn sender(&self) -> UiSender {
        UiSender {
            tx: self.tx.clone(),
        }
    }

    /// Everything posted so far, without blocking.
    pub fn drain(&self) -> Vec<UiMessage> {
        self.rx.try_iter().collect()
    }

    /// Blocks for the next message, up to `timeout`.
    pub fn wait(&self, timeout: Duration) -> Option<UiMessage> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) => None,
            // The queue keeps its own sender, so this cannot happen while it lives.
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Default for UiQueue {
    fn default() -> Self {
        Self::new()
    }
}
