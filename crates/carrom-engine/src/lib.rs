pub mod ai;
pub mod api;
pub mod board;
pub mod bridge;
pub mod core;
pub mod input;
pub mod rules;
#[cfg(feature = "physics")]
pub mod physics;

// Re-export key types at crate root for convenience
pub use ai::{Candidate, Difficulty, PlannedShot, Shot, ShotEvaluator, ShotKind, ShotPlanner};
pub use api::config::{BoardMaterial, ConfigError, Controller, MatchConfig, NetworkRole};
pub use api::game::{CarromMatch, TurnSummary};
pub use api::physics::BoardPhysics;
pub use api::types::{PieceId, PieceKind, Player, PocketId};
pub use board::pieces::{Piece, Pieces};
pub use board::table::Table;
pub use bridge::protocol::{ProtocolError, RemoteMessage, TurnEnd};
pub use bridge::sync::RemoteSync;
pub use core::time::StepClock;
pub use input::queue::{EventQueue, MatchEvent};
pub use rules::outcome::{Outcome, Placement, Verdict, Win};
pub use rules::state::{MatchState, QueenState};
pub use rules::turn::{TurnMachine, TurnPhase};

#[cfg(feature = "physics")]
pub use physics::RapierBoard;
