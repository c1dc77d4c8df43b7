use serde::{Deserialize, Serialize};

use crate::api::types::Player;

/// Where the queen stands in the covering rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueenState {
    /// On the board, not yet pocketed (or returned after a failed cover).
    #[default]
    OnBoard,
    /// Pocketed by `owner`, who must cover it on the same or the next strike.
    Uncovered { owner: Player },
    /// Covered by `by`. Permanent for the rest of the match.
    Covered { by: Player },
}

/// Scores, whose turn it is and the queen's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    current: Player,
    scores: [u32; 2],
    queen: QueenState,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(Player::White)
    }
}

impl MatchState {
    pub fn new(first: Player) -> Self {
        Self {
            current: first,
            scores: [0, 0],
            queen: QueenState::OnBoard,
        }
    }

    pub fn current(&self) -> Player {
        self.current
    }

    pub fn set_current(&mut self, player: Player) {
        self.current = player;
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    /// Overwrite both scores. Used when the host's totals arrive with a turn change.
    pub fn set_scores(&mut self, scores: [u32; 2]) {
        self.scores = scores;
    }

    pub fn add_score(&mut self, player: Player, points: u32) {
        let s = &mut self.scores[player.index()];
        *s = s.saturating_add(points);
    }

    /// Deduct up to `points`, never below zero. Returns what was actually taken.
    pub fn deduct_score(&mut self, player: Player, points: u32) -> u32 {
        let s = &mut self.scores[player.index()];
        let taken = points.min(*s);
        *s -= taken;
        taken
    }

    pub fn queen(&self) -> QueenState {
        self.queen
    }

    /// True only while the queen is pocketed and not yet covered.
    pub fn needs_cover(&self) -> bool {
        matches!(self.queen, QueenState::Uncovered { .. })
    }

    pub fn queen_covered(&self) -> bool {
        matches!(self.queen, QueenState::Covered { .. })
    }

    /// The queen drops in for `owner`. Ignored once covered.
    pub fn pocket_queen(&mut self, owner: Player) {
        if self.queen_covered() {
            log::warn!("queen already covered, ignoring pocket by {:?}", owner);
            return;
        }
        self.queen = QueenState::Uncovered { owner };
    }

    /// Cover the queen for `by`. Returns `false` if it was not uncovered.
    pub fn cover_queen(&mut self, by: Player) -> bool {
        if !self.needs_cover() {
            return false;
        }
        self.queen = QueenState::Covered { by };
        true
    }

    /// Failed cover: the queen goes back on the board. Never undoes a cover.
    pub fn return_queen(&mut self) -> bool {
        if self.queen_covered() {
            return false;
        }
        self.queen = QueenState::OnBoard;
        true
    }

    /// Adopt the host's queen state. A covered queen still never reverts.
    pub fn sync_queen(&mut self, queen: QueenState) {
        if self.queen_covered() && queen != self.queen {
            log::warn!("ignoring queen state {:?}, already {:?}", queen, self.queen);
            return;
        }
        self.queen = queen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduction_floors_at_zero() {
        let mut s = MatchState::new(Player::White);
        assert_eq!(s.deduct_score(Player::White, 1), 0);
        assert_eq!(s.score(Player::White), 0);
        s.add_score(Player::White, 2);
        assert_eq!(s.deduct_score(Player::White, 1), 1);
        assert_eq!(s.score(Player::White), 1);
    }

    #[test]
    fn needs_cover_tracks_uncovered_state() {
        let mut s = MatchState::default();
        assert!(!s.needs_cover());
        s.pocket_queen(Player::Black);
        assert!(s.needs_cover());
        assert_eq!(s.queen(), QueenState::Uncovered { owner: Player::Black });
        assert!(s.cover_queen(Player::Black));
        assert!(!s.needs_cover());
        assert!(s.queen_covered());
    }

    #[test]
    fn covered_queen_is_permanent() {
        let mut s = MatchState::default();
        s.pocket_queen(Player::White);
        s.cover_queen(Player::White);
        assert!(!s.return_queen());
        s.pocket_queen(Player::Black);
        s.sync_queen(QueenState::OnBoard);
        assert_eq!(s.queen(), QueenState::Covered { by: Player::White });
    }

    #[test]
    fn cover_requires_pocketed_queen() {
        let mut s = MatchState::default();
        assert!(!s.cover_queen(Player::White));
        assert_eq!(s.queen(), QueenState::OnBoard);
    }

    #[test]
    fn failed_cover_returns_queen() {
        let mut s = MatchState::default();
        s.pocket_queen(Player::White);
        assert!(s.return_queen());
        assert_eq!(s.queen(), QueenState::OnBoard);
        assert!(!s.needs_cover());
    }
}
