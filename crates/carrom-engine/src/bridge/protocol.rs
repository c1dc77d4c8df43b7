//! Peer-to-peer message format.
//! Must stay in sync with the TypeScript side of the peer connection.
//!
//! JSON objects tagged by `type`, camelCase fields:
//! ```text
//! { "type": "shot", "strikerX": 370, "velocityX": 0, "velocityY": -1800 }
//! { "type": "turnEnd", "nextPlayer": 1, "scores": [2, 0], ... }
//! ```
//!
//! Players travel as indices (0 = white, 1 = black).

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::Player;
use crate::rules::outcome::{Outcome, Placement};
use crate::rules::state::QueenState;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed remote message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown player index {0}")]
    UnknownPlayer(u8),
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}

/// The host's verdict on a strike, as the guest applies it.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnEnd {
    pub next_player: Player,
    pub scores: Option<[u32; 2]>,
    pub queen: Option<QueenState>,
    /// Discs the host put back on the board (penalty return, failed cover).
    pub placements: Vec<Placement>,
    pub outcome: Option<Outcome>,
    pub winner: Option<Player>,
}

impl TurnEnd {
    /// A bare turn change with nothing else attached.
    pub fn to(next_player: Player) -> Self {
        Self {
            next_player,
            scores: None,
            queen: None,
            placements: Vec::new(),
            outcome: None,
            winner: None,
        }
    }
}

/// A validated message from or to the peer.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteMessage {
    Shot { striker_x: f32, velocity: Vec2 },
    TurnEnd(TurnEnd),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Wire {
    #[serde(rename_all = "camelCase")]
    Shot {
        striker_x: f32,
        velocity_x: f32,
        velocity_y: f32,
    },
    #[serde(rename_all = "camelCase")]
    TurnEnd {
        next_player: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scores: Option<[u32; 2]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        queen: Option<QueenState>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        placements: Vec<Placement>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<Outcome>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<u8>,
    },
}

fn player(index: u8) -> Result<Player, ProtocolError> {
    Player::from_index(index as usize).ok_or(ProtocolError::UnknownPlayer(index))
}

fn finite(name: &'static str, value: f32) -> Result<f32, ProtocolError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProtocolError::NonFinite(name))
    }
}

/// Parse and validate a message. Nothing is applied on failure.
pub fn decode(raw: &str) -> Result<RemoteMessage, ProtocolError> {
    match serde_json::from_str::<Wire>(raw)? {
        Wire::Shot { striker_x, velocity_x, velocity_y } => Ok(RemoteMessage::Shot {
            striker_x: finite("strikerX", striker_x)?,
            velocity: Vec2::new(finite("velocityX", velocity_x)?, finite("velocityY", velocity_y)?),
        }),
        Wire::TurnEnd { next_player, scores, queen, placements, outcome, winner } => {
            for p in &placements {
                if !p.pos.is_finite() {
                    return Err(ProtocolError::NonFinite("placement"));
                }
            }
            Ok(RemoteMessage::TurnEnd(TurnEnd {
                next_player: player(next_player)?,
                scores,
                queen,
                placements,
                outcome,
                winner: winner.map(player).transpose()?,
            }))
        }
    }
}

pub fn encode(message: &RemoteMessage) -> Result<String, ProtocolError> {
    let wire = match message {
        RemoteMessage::Shot { striker_x, velocity } => Wire::Shot {
            striker_x: *striker_x,
            velocity_x: velocity.x,
            velocity_y: velocity.y,
        },
        RemoteMessage::TurnEnd(end) => Wire::TurnEnd {
            next_player: end.next_player.index() as u8,
            scores: end.scores,
            queen: end.queen,
            placements: end.placements.clone(),
            outcome: end.outcome,
            winner: end.winner.map(|w| w.index() as u8),
        },
    };
    Ok(serde_json::to_string(&wire)?)
}
