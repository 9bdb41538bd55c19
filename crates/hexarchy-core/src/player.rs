//! Players - the binding between a civilization and a message transport.
//!
//! The core never touches sockets; each connected player exposes a
//! [`MessageSink`] the orchestrator writes serialized updates into. AI
//! players (and disconnected humans, which become AI) have no sink, and
//! sends to them are dropped.

use crate::types::CivId;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Outbound message sink for one connected player.
///
/// Implemented for plain `FnMut(String)` closures, which covers both tests
/// and channel-backed transports.
pub trait MessageSink: Send {
    fn send(&mut self, message: String);
}

impl<F> MessageSink for F
where
    F: FnMut(String) + Send,
{
    fn send(&mut self, message: String) {
        self(message)
    }
}

/// One seat at the game: a civ, optionally driven by a connected human.
#[derive(Serialize, Deserialize)]
pub struct Player {
    /// Display name.
    pub name: String,
    /// The civilization this player controls.
    pub civ_id: CivId,
    /// AI players receive no messages.
    pub is_ai: bool,
    /// Transport for a connected human; never serialized.
    #[serde(skip)]
    pub sink: Option<Box<dyn MessageSink>>,
}

impl Player {
    /// Create a connected human player.
    pub fn human(name: String, civ_id: CivId, sink: Box<dyn MessageSink>) -> Self {
        Self {
            name,
            civ_id,
            is_ai: false,
            sink: Some(sink),
        }
    }

    /// Create an AI player.
    pub fn ai(name: String, civ_id: CivId) -> Self {
        Self {
            name,
            civ_id,
            is_ai: true,
            sink: None,
        }
    }

    /// Convert to AI after a disconnect; the civ keeps ticking.
    pub fn disconnect(&mut self) {
        self.is_ai = true;
        self.sink = None;
    }

    /// Attach a transport, turning an AI seat back into a human one.
    pub fn connect(&mut self, sink: Box<dyn MessageSink>) {
        self.is_ai = false;
        self.sink = Some(sink);
    }

    /// Send a message to this player. AI seats drop silently; a human seat
    /// without a transport is logged and skipped.
    pub fn send(&mut self, message: String) {
        if self.is_ai {
            return;
        }
        match self.sink.as_mut() {
            Some(sink) => sink.send(message),
            None => warn!(civ = self.civ_id, "no transport for human player, dropping message"),
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("civ_id", &self.civ_id)
            .field("is_ai", &self.is_ai)
            .field("connected", &self.sink.is_some())
            .finish()
    }
}
