use crate::api::config::NetworkRole;
use crate::bridge::protocol::{decode, encode, RemoteMessage};

/// Remote sync adapter. Turns raw peer messages into match events and
/// collects outgoing messages for the transport to send. Holds no match
/// state of its own.
#[derive(Debug, Clone)]
pub struct RemoteSync {
    role: NetworkRole,
    outbox: Vec<String>,
}

impl RemoteSync {
    pub fn new(role: NetworkRole) -> Self {
        Self {
            role,
            outbox: Vec::new(),
        }
    }

    pub fn role(&self) -> NetworkRole {
        self.role
    }

    pub fn is_networked(&self) -> bool {
        self.role != NetworkRole::Offline
    }

    /// Whether this device decides strike outcomes.
    pub fn is_authority(&self) -> bool {
        self.role != NetworkRole::Guest
    }

    /// Decode a message from the peer. Malformed messages are logged and dropped.
    pub fn receive(&self, raw: &str) -> Option<RemoteMessage> {
        if !self.is_networked() {
            log::warn!("offline match, dropping remote message");
            return None;
        }
        match decode(raw) {
            Ok(message) => Some(message),
            Err(e) => {
                log::warn!("ignoring remote message: {}", e);
                None
            }
        }
    }

    /// Queue a message for the peer. No-op offline.
    pub fn send(&mut self, message: &RemoteMessage) {
        if !self.is_networked() {
            return;
        }
        match encode(message) {
            Ok(raw) => self.outbox.push(raw),
            Err(e) => log::warn!("could not encode {:?}: {}", message, e),
        }
    }

    /// Messages waiting for the transport, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Player;
    use crate::bridge::protocol::TurnEnd;
    use glam::Vec2;

    #[test]
    fn offline_sync_sends_and_receives_nothing() {
        let mut sync = RemoteSync::new(NetworkRole::Offline);
        sync.send(&RemoteMessage::TurnEnd(TurnEnd::to(Player::Black)));
        assert!(sync.take_outgoing().is_empty());
        assert_eq!(sync.receive(r#"{"type":"turnEnd","nextPlayer":1}"#), None);
    }

    #[test]
    fn outbox_drains_in_order() {
        let mut sync = RemoteSync::new(NetworkRole::Host);
        sync.send(&RemoteMessage::Shot { striker_x: 10.0, velocity: Vec2::new(0.0, -5.0) });
        sync.send(&RemoteMessage::TurnEnd(TurnEnd::to(Player::White)));
        let out = sync.take_outgoing();
        assert_eq!(out.len(), 2);
        assert!(out[0].contains("\"type\":\"shot\""));
        assert!(out[1].contains("\"type\":\"turnEnd\""));
        assert!(sync.take_outgoing().is_empty());
    }

    #[test]
    fn malformed_messages_are_dropped() {
        let sync = RemoteSync::new(NetworkRole::Guest);
        assert_eq!(sync.receive("{}"), None);
        assert_eq!(sync.receive(r#"{"type":"shot","strikerX":"left"}"#), None);
        assert!(sync.receive(r#"{"type":"turnEnd","nextPlayer":0}"#).is_some());
    }

    #[test]
    fn only_the_guest_defers_to_the_peer() {
        assert!(RemoteSync::new(NetworkRole::Host).is_authority());
        assert!(RemoteSync::new(NetworkRole::Offline).is_authority());
        assert!(!RemoteSync::new(NetworkRole::Guest).is_authority());
    }
}
