use serde::{Deserialize, Serialize};

/// Stable handle for a disc on the board. Index into the match's piece table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl PieceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of one of the four corner pockets.
pub type PocketId = usize;

/// What a disc is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    White,
    Black,
    Queen,
    Striker,
}

/// One of the two sides. Each side owns the pieces of its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::White, Player::Black];

    pub fn other(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// The piece colour this player scores with.
    pub fn color(self) -> PieceKind {
        match self {
            Player::White => PieceKind::White,
            Player::Black => PieceKind::Black,
        }
    }

    /// Slot in per-player arrays (scores, controllers).
    pub fn index(self) -> usize {
        match self {
            Player::White => 0,
            Player::Black => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Player> {
        match index {
            0 => Some(Player::White),
            1 => Some(Player::Black),
            _ => None,
        }
    }
}

impl PieceKind {
    /// The player who owns pieces of this kind, if any.
    pub fn owner(self) -> Option<Player> {
        match self {
            PieceKind::White => Some(Player::White),
            PieceKind::Black => Some(Player::Black),
            PieceKind::Queen | PieceKind::Striker => None,
        }
    }
}
