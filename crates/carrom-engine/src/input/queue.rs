use glam::Vec2;

use crate::api::types::{PieceId, PocketId};
use crate::bridge::protocol::RemoteMessage;

/// Everything that can reach the match between two updates.
/// Callbacks (physics, pointer input, the peer connection) only enqueue;
/// the match applies events on its next `update`.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    /// The physics board saw `piece` drop into `pocket`.
    Pocketed { piece: PieceId, pocket: PocketId },
    /// A shot from pointer input on this device.
    LocalShot { striker_x: f32, velocity: Vec2 },
    /// A decoded message from the peer.
    Remote(RemoteMessage),
    /// The peer connection dropped.
    PeerDisconnected,
    /// Leave the match without a winner.
    Abort,
}

/// Pending match events, drained once per update.
pub struct EventQueue {
    events: Vec<MatchEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: MatchEvent) {
        self.events.push(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
