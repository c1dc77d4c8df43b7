use proptest::prelude::*;

use crate::api::config::MatchConfig;
use crate::api::types::{PieceId, PieceKind, Player};
use crate::board::pieces::{Pieces, PIECES_PER_COLOR};
use crate::board::table::Table;
use crate::core::rng::Rng;
use crate::rules::outcome::{Outcome, Resolver, TurnResult, FOUL_PENALTY};
use crate::rules::state::{MatchState, QueenState};

/// One simulated strike: table indices to pocket, plus whether the striker
/// goes in too.
fn strikes() -> impl Strategy<Value = Vec<(Vec<usize>, bool)>> {
    prop::collection::vec((prop::collection::vec(0usize..64, 0..4), any::<bool>()), 1..60)
}

proptest! {
    #[test]
    fn resolution_keeps_match_invariants(seq in strikes(), seed in any::<u64>()) {
        let config = MatchConfig::default();
        let table = Table::new(&config);
        let mut pieces = Pieces::rack(&config, &table);
        let mut rng = Rng::new(seed);
        let mut state = MatchState::new(Player::White);
        let striker = pieces.striker_id().unwrap();
        let mut covered_by: Option<Player> = None;

        for (picks, foul) in seq {
            let mut result = TurnResult::new();
            for pick in picks {
                let id = PieceId((pick % pieces.len()) as u32);
                if id == striker {
                    continue;
                }
                let piece = pieces.get_mut(id).unwrap();
                if piece.pocketed {
                    continue;
                }
                piece.pocketed = true;
                result.record(id, piece.kind);
            }
            if foul {
                result.record(striker, PieceKind::Striker);
            }

            let player = state.current();
            let before = state.score(player);
            let verdict = Resolver { pieces: &mut pieces, table: &table, rng: &mut rng }
                .resolve(&result, &mut state);

            // Fouls cost at most the penalty and never push a score below zero.
            if let Outcome::Foul { .. } = verdict.outcome {
                let lost = before - state.score(player).min(before);
                prop_assert!(lost <= FOUL_PENALTY);
                prop_assert!(!verdict.continues);
            }
            prop_assert_eq!(verdict.score_delta, state.score(player) as i32 - before as i32);

            // A cover is permanent.
            if let Some(by) = covered_by {
                prop_assert_eq!(state.queen(), QueenState::Covered { by });
            } else if let QueenState::Covered { by } = state.queen() {
                covered_by = Some(by);
            }

            // Every disc is either on the board or in a pocket.
            for kind in [PieceKind::White, PieceKind::Black] {
                prop_assert_eq!(pieces.remaining(kind) + pieces.pocketed(kind), PIECES_PER_COLOR);
            }
            // A queen on the board is never waiting for a cover.
            if state.needs_cover() {
                prop_assert!(pieces.queen().unwrap().pocketed);
            }

            if verdict.win.is_some() {
                prop_assert!(!verdict.continues);
                break;
            }
            if !verdict.continues {
                state.set_current(player.other());
            }
        }
    }

    #[test]
    fn deduction_never_underflows(start in 0u32..5, fouls in 0u32..10) {
        let mut state = MatchState::new(Player::Black);
        state.add_score(Player::Black, start);
        for _ in 0..fouls {
            state.deduct_score(Player::Black, FOUL_PENALTY);
        }
        prop_assert_eq!(state.score(Player::Black), start.saturating_sub(fouls));
    }
}
