//! Turn outcome resolution: turns the pockets of one finished strike into
//! score changes, piece returns, queen transitions and the continue decision.
//!
//! Order of precedence:
//! 1. striker pocketed (foul)
//! 2. queen pocketed on this strike
//! 3. queen pending cover from the previous strike
//! 4. plain pocketing

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{PieceId, PieceKind, Player};
use crate::board::pieces::Pieces;
use crate::board::table::Table;
use crate::core::rng::Rng;
use crate::rules::state::{MatchState, QueenState};

/// Points for covering the queen.
pub const QUEEN_BONUS: u32 = 3;
/// Points lost for pocketing the striker.
pub const FOUL_PENALTY: u32 = 1;

/// What went into the pockets during one strike. Built up from pocket events
/// while the discs move, consumed once they stop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnResult {
    pieces: Vec<(PieceId, PieceKind)>,
    striker_pocketed: bool,
    queen_pocketed: bool,
}

impl TurnResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pocketing. A piece reported twice in one strike counts once.
    pub fn record(&mut self, id: PieceId, kind: PieceKind) -> bool {
        if self.pieces.iter().any(|(seen, _)| *seen == id) {
            return false;
        }
        self.pieces.push((id, kind));
        match kind {
            PieceKind::Striker => self.striker_pocketed = true,
            PieceKind::Queen => self.queen_pocketed = true,
            PieceKind::White | PieceKind::Black => {}
        }
        true
    }

    pub fn striker_pocketed(&self) -> bool {
        self.striker_pocketed
    }

    pub fn queen_pocketed(&self) -> bool {
        self.queen_pocketed
    }

    /// Colours pocketed this strike, in pocketing order.
    pub fn colors(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.pieces
            .iter()
            .map(|(_, kind)| *kind)
            .filter(|k| matches!(k, PieceKind::White | PieceKind::Black))
    }

    pub fn own_count(&self, player: Player) -> u32 {
        self.colors().filter(|k| *k == player.color()).count() as u32
    }

    pub fn opponent_count(&self, player: Player) -> u32 {
        self.colors().filter(|k| *k == player.other().color()).count() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

/// Kind of outcome, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Striker pocketed. `returned` is the own piece put back, if there was one.
    Foul { returned: Option<PieceId> },
    /// Queen pocketed without a cover yet; the player shoots again to cover.
    QueenPocketed,
    /// Queen covered, on the same strike or the next one.
    QueenCovered,
    /// No own piece on the strike after pocketing the queen; queen goes back.
    CoverFailed,
    /// Only own pieces pocketed.
    Scored { count: u32 },
    /// At least one opponent piece pocketed; turn passes, no points.
    OpponentPocketed { count: u32 },
    /// Nothing pocketed.
    Miss,
}

/// A disc the engine moved back onto the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub piece: PieceId,
    pub pos: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Win {
    pub winner: Player,
    /// The loser's on-board pieces, credited to the winner.
    pub bonus: u32,
}

/// Everything decided about one strike.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub player: Player,
    pub outcome: Outcome,
    pub score_delta: i32,
    pub continues: bool,
    pub placements: Vec<Placement>,
    pub win: Option<Win>,
}

/// Applies one finished strike to the match state and the piece table.
pub struct Resolver<'a> {
    pub pieces: &'a mut Pieces,
    pub table: &'a Table,
    pub rng: &'a mut Rng,
}

impl Resolver<'_> {
    pub fn resolve(&mut self, result: &TurnResult, state: &mut MatchState) -> Verdict {
        let player = state.current();
        let before = state.score(player) as i32;
        let mut placements = Vec::new();

        let (outcome, continues) = if result.striker_pocketed() {
            self.foul(result, state, &mut placements)
        } else if result.queen_pocketed() && !state.queen_covered() {
            state.pocket_queen(player);
            let own = result.own_count(player);
            if own > 0 {
                state.cover_queen(player);
                state.add_score(player, own + QUEEN_BONUS);
                (Outcome::QueenCovered, true)
            } else {
                (Outcome::QueenPocketed, true)
            }
        } else if state.queen() == (QueenState::Uncovered { owner: player }) {
            let own = result.own_count(player);
            if own > 0 {
                state.cover_queen(player);
                state.add_score(player, own + QUEEN_BONUS);
                (Outcome::QueenCovered, true)
            } else {
                state.return_queen();
                self.return_queen(&mut placements);
                (Outcome::CoverFailed, false)
            }
        } else {
            let own = result.own_count(player);
            let opponent = result.opponent_count(player);
            if opponent > 0 {
                (Outcome::OpponentPocketed { count: opponent }, false)
            } else if own > 0 {
                state.add_score(player, own);
                (Outcome::Scored { count: own }, true)
            } else {
                (Outcome::Miss, false)
            }
        };

        let win = self.check_win(state);
        let score_delta = state.score(player) as i32 - before;
        log::info!(
            "{:?}: {:?} (delta {}, continues {}, win {:?})",
            player,
            outcome,
            score_delta,
            continues,
            win
        );

        Verdict {
            player,
            outcome,
            score_delta,
            continues: continues && win.is_none(),
            placements,
            win,
        }
    }

    fn foul(
        &mut self,
        result: &TurnResult,
        state: &mut MatchState,
        placements: &mut Vec<Placement>,
    ) -> (Outcome, bool) {
        let player = state.current();
        state.deduct_score(player, FOUL_PENALTY);

        let returned = self.pieces.returnable(player.color());
        if let Some(id) = returned {
            let radius = self.pieces.get(id).map(|p| p.radius).unwrap_or(0.0);
            let pos = self.pieces.free_spot_near(
                self.table.center(),
                radius,
                self.table.return_radius(),
                Some(id),
                self.rng,
            );
            if let Some(piece) = self.pieces.get_mut(id) {
                piece.pocketed = false;
                piece.returned = true;
                piece.pos = pos;
            }
            placements.push(Placement { piece: id, pos });
        }

        // A queen this player pocketed but never covered does not survive a foul.
        let owns_uncovered = state.queen() == (QueenState::Uncovered { owner: player });
        let queen_now = result.queen_pocketed() && !state.queen_covered();
        if owns_uncovered || queen_now {
            state.return_queen();
            self.return_queen(placements);
        }

        (Outcome::Foul { returned }, false)
    }

    fn return_queen(&mut self, placements: &mut Vec<Placement>) {
        let Some(id) = self.pieces.queen_id() else {
            return;
        };
        let radius = self.pieces.get(id).map(|p| p.radius).unwrap_or(0.0);
        let pos = self.pieces.free_spot_near(
            self.table.center(),
            radius,
            self.table.return_radius(),
            Some(id),
            self.rng,
        );
        if let Some(queen) = self.pieces.get_mut(id) {
            queen.pocketed = false;
            queen.pos = pos;
        }
        placements.push(Placement { piece: id, pos });
    }

    /// A side wins with all its pieces pocketed, unless the queen is still
    /// waiting for a cover. The striking player is checked first.
    fn check_win(&self, state: &mut MatchState) -> Option<Win> {
        if state.needs_cover() {
            return None;
        }
        let current = state.current();
        let winner = [current, current.other()]
            .into_iter()
            .find(|p| self.pieces.remaining(p.color()) == 0)?;
        let bonus = self.pieces.remaining(winner.other().color()) as u32;
        state.add_score(winner, bonus);
        Some(Win { winner, bonus })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::MatchConfig;

    struct Fixture {
        pieces: Pieces,
        table: Table,
        rng: Rng,
        state: MatchState,
    }

    impl Fixture {
        fn new() -> Self {
            let config = MatchConfig::default();
            let table = Table::new(&config);
            let pieces = Pieces::rack(&config, &table);
            Self {
                pieces,
                table,
                rng: Rng::new(11),
                state: MatchState::new(Player::White),
            }
        }

        fn ids(&self, kind: PieceKind) -> Vec<PieceId> {
            self.pieces.iter().filter(|p| p.kind == kind).map(|p| p.id).collect()
        }

        /// Pocket the given pieces as one strike and resolve it.
        fn strike(&mut self, ids: &[PieceId]) -> Verdict {
            let mut result = TurnResult::new();
            for id in ids {
                let piece = self.pieces.get_mut(*id).unwrap();
                piece.pocketed = true;
                result.record(*id, piece.kind);
            }
            let mut resolver = Resolver {
                pieces: &mut self.pieces,
                table: &self.table,
                rng: &mut self.rng,
            };
            resolver.resolve(&result, &mut self.state)
        }
    }

    #[test]
    fn own_piece_scores_and_continues() {
        let mut f = Fixture::new();
        let white = f.ids(PieceKind::White);
        let v = f.strike(&white[..1]);
        assert_eq!(v.outcome, Outcome::Scored { count: 1 });
        assert_eq!(v.score_delta, 1);
        assert!(v.continues);
        assert_eq!(f.state.score(Player::White), 1);
    }

    #[test]
    fn several_own_pieces_score_their_count() {
        let mut f = Fixture::new();
        let white = f.ids(PieceKind::White);
        let v = f.strike(&white[..3]);
        assert_eq!(v.score_delta, 3);
        assert!(v.continues);
    }

    #[test]
    fn opponent_piece_ends_turn_without_points() {
        let mut f = Fixture::new();
        let white = f.ids(PieceKind::White);
        let black = f.ids(PieceKind::Black);
        let v = f.strike(&[white[0], black[0]]);
        assert_eq!(v.outcome, Outcome::OpponentPocketed { count: 1 });
        assert_eq!(v.score_delta, 0);
        assert!(!v.continues);
        assert_eq!(f.state.score(Player::Black), 0);
    }

    #[test]
    fn empty_strike_is_a_miss() {
        let mut f = Fixture::new();
        let v = f.strike(&[]);
        assert_eq!(v.outcome, Outcome::Miss);
        assert!(!v.continues);
    }

    #[test]
    fn foul_return_lands_clear_of_the_rack() {
        for seed in 1..50 {
            let mut f = Fixture::new();
            f.rng = Rng::new(seed);
            let outer_white = *f.ids(PieceKind::White).last().unwrap();
            f.strike(&[outer_white]);

            let striker = f.pieces.striker_id().unwrap();
            let v = f.strike(&[striker]);
            assert_eq!(v.outcome, Outcome::Foul { returned: Some(outer_white) });
            let placed = v.placements[0];
            let radius = f.pieces.get(outer_white).unwrap().radius;
            assert!(
                !f.pieces.is_occupied(placed.pos, radius, Some(outer_white)),
                "seed {seed}: return at {:?} overlaps",
                placed.pos
            );
            assert!(placed.pos.distance(f.table.center()) <= f.table.return_radius());
        }
    }

    #[test]
    fn foul_returns_one_own_piece_and_deducts() {
        let mut f = Fixture::new();
        let white = f.ids(PieceKind::White);
        f.strike(&white[..2]);
        assert_eq!(f.state.score(Player::White), 2);

        let striker = f.pieces.striker_id().unwrap();
        let black = f.ids(PieceKind::Black);
        let v = f.strike(&[striker, white[2], black[0]]);
        assert_eq!(v.outcome, Outcome::Foul { returned: Some(white[0]) });
        assert_eq!(v.score_delta, -1);
        assert!(!v.continues);
        assert_eq!(v.placements.len(), 1);
        let back = f.pieces.get(white[0]).unwrap();
        assert!(!back.pocketed);
        assert!(back.returned);
        assert_eq!(back.pos, v.placements[0].pos);
    }

    #[test]
    fn foul_on_zero_score_floors() {
        let mut f = Fixture::new();
        let striker = f.pieces.striker_id().unwrap();
        let v = f.strike(&[striker]);
        assert_eq!(v.outcome, Outcome::Foul { returned: None });
        assert_eq!(v.score_delta, 0);
        assert_eq!(f.state.score(Player::White), 0);
        assert!(v.placements.is_empty());
    }

    #[test]
    fn queen_without_own_piece_waits_for_cover() {
        let mut f = Fixture::new();
        let queen = f.pieces.queen_id().unwrap();
        let v = f.strike(&[queen]);
        assert_eq!(v.outcome, Outcome::QueenPocketed);
        assert!(v.continues);
        assert_eq!(v.score_delta, 0);
        assert!(f.state.needs_cover());
        assert_eq!(f.state.queen(), QueenState::Uncovered { owner: Player::White });
    }

    #[test]
    fn queen_with_own_piece_is_covered_at_once() {
        let mut f = Fixture::new();
        let queen = f.pieces.queen_id().unwrap();
        let white = f.ids(PieceKind::White);
        let v = f.strike(&[queen, white[0]]);
        assert_eq!(v.outcome, Outcome::QueenCovered);
        assert_eq!(v.score_delta, 1 + QUEEN_BONUS as i32);
        assert!(v.continues);
        assert!(f.state.queen_covered());
        assert!(f.pieces.queen().unwrap().pocketed);
    }

    #[test]
    fn cover_on_next_strike() {
        let mut f = Fixture::new();
        let queen = f.pieces.queen_id().unwrap();
        let white = f.ids(PieceKind::White);
        f.strike(&[queen]);
        let v = f.strike(&[white[0]]);
        assert_eq!(v.outcome, Outcome::QueenCovered);
        assert_eq!(f.state.queen(), QueenState::Covered { by: Player::White });
        assert_eq!(f.state.score(Player::White), 1 + QUEEN_BONUS);
    }

    #[test]
    fn failed_cover_returns_queen_and_ends_turn() {
        let mut f = Fixture::new();
        let queen = f.pieces.queen_id().unwrap();
        f.strike(&[queen]);
        let v = f.strike(&[]);
        assert_eq!(v.outcome, Outcome::CoverFailed);
        assert!(!v.continues);
        assert!(!f.state.needs_cover());
        assert_eq!(f.state.queen(), QueenState::OnBoard);
        let q = f.pieces.queen().unwrap();
        assert!(!q.pocketed);
        assert_eq!(v.placements, vec![Placement { piece: queen, pos: q.pos }]);
        // The centre was free once the queen left it.
        assert_eq!(q.pos, f.table.center());
    }

    #[test]
    fn foul_while_cover_pending_returns_queen() {
        let mut f = Fixture::new();
        let queen = f.pieces.queen_id().unwrap();
        f.strike(&[queen]);
        let striker = f.pieces.striker_id().unwrap();
        let v = f.strike(&[striker]);
        assert!(matches!(v.outcome, Outcome::Foul { .. }));
        assert_eq!(f.state.queen(), QueenState::OnBoard);
        assert!(!f.pieces.queen().unwrap().pocketed);
    }

    #[test]
    fn win_needs_every_piece_and_no_pending_queen() {
        let mut f = Fixture::new();
        let white = f.ids(PieceKind::White);
        let queen = f.pieces.queen_id().unwrap();
        f.strike(&white[..17]);
        f.strike(&[queen]);
        // Last white piece in the cover strike: covered, then the win.
        let v = f.strike(&white[17..]);
        assert_eq!(v.outcome, Outcome::QueenCovered);
        let win = v.win.expect("white should have won");
        assert_eq!(win.winner, Player::White);
        assert_eq!(win.bonus, 18);
        assert!(!v.continues);
        assert_eq!(f.state.score(Player::White), 17 + 1 + QUEEN_BONUS + 18);
    }

    #[test]
    fn uncovered_queen_blocks_the_win() {
        let mut f = Fixture::new();
        let white = f.ids(PieceKind::White);
        let queen = f.pieces.queen_id().unwrap();
        for id in &white {
            f.pieces.get_mut(*id).unwrap().pocketed = true;
        }
        let v = f.strike(&[queen]);
        assert_eq!(f.pieces.remaining(PieceKind::White), 0);
        assert!(f.state.needs_cover());
        assert_eq!(v.win, None);
    }

    #[test]
    fn pocketing_opponents_last_piece_wins_for_them() {
        let mut f = Fixture::new();
        let black = f.ids(PieceKind::Black);
        for id in &black[..17] {
            f.pieces.get_mut(*id).unwrap().pocketed = true;
        }
        let v = f.strike(&black[17..]);
        assert_eq!(v.win.map(|w| w.winner), Some(Player::Black));
    }

    #[test]
    fn duplicate_pocket_events_count_once() {
        let mut result = TurnResult::new();
        assert!(result.record(PieceId(3), PieceKind::White));
        assert!(!result.record(PieceId(3), PieceKind::White));
        assert_eq!(result.own_count(Player::White), 1);
        assert_eq!(result.opponent_count(Player::Black), 1);
    }
}
