use serde::{Deserialize, Serialize};

use crate::api::types::Player;
use crate::rules::outcome::Verdict;

/// Where the match is in the strike cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TurnPhase {
    /// Striker sits on `player`'s baseline, waiting for a shot.
    AwaitingStrike { player: Player },
    /// Discs are moving after `player`'s shot.
    StrikeInFlight { player: Player },
    /// Discs have stopped; the strike is being resolved (or, on a guest,
    /// the host's verdict is awaited).
    ResolvingOutcome { player: Player },
    MatchOver { winner: Player },
    /// Abandoned before a winner was decided.
    Aborted,
}

impl TurnPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TurnPhase::MatchOver { .. } | TurnPhase::Aborted)
    }

    /// The player whose strike this phase belongs to.
    pub fn player(self) -> Option<Player> {
        match self {
            TurnPhase::AwaitingStrike { player }
            | TurnPhase::StrikeInFlight { player }
            | TurnPhase::ResolvingOutcome { player } => Some(player),
            TurnPhase::MatchOver { .. } | TurnPhase::Aborted => None,
        }
    }
}

/// Guards the phase transitions. Every method returns whether the transition
/// was legal; illegal ones leave the phase untouched.
#[derive(Debug, Clone)]
pub struct TurnMachine {
    phase: TurnPhase,
    strikes: u32,
}

impl TurnMachine {
    pub fn new(first: Player) -> Self {
        Self {
            phase: TurnPhase::AwaitingStrike { player: first },
            strikes: 0,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Strikes launched so far.
    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    /// `AwaitingStrike` → `StrikeInFlight`.
    pub fn launch(&mut self) -> bool {
        match self.phase {
            TurnPhase::AwaitingStrike { player } => {
                self.phase = TurnPhase::StrikeInFlight { player };
                self.strikes += 1;
                true
            }
            _ => false,
        }
    }

    /// `StrikeInFlight` → `ResolvingOutcome`, once the discs are still.
    pub fn settle(&mut self) -> bool {
        match self.phase {
            TurnPhase::StrikeInFlight { player } => {
                self.phase = TurnPhase::ResolvingOutcome { player };
                true
            }
            _ => false,
        }
    }

    /// Apply a verdict: `ResolvingOutcome` → `AwaitingStrike(next)` or
    /// `MatchOver`. Returns the next phase on success.
    pub fn apply(&mut self, verdict: &Verdict) -> Option<TurnPhase> {
        let TurnPhase::ResolvingOutcome { player } = self.phase else {
            return None;
        };
        self.phase = if let Some(win) = verdict.win {
            TurnPhase::MatchOver { winner: win.winner }
        } else if verdict.continues {
            TurnPhase::AwaitingStrike { player }
        } else {
            TurnPhase::AwaitingStrike { player: player.other() }
        };
        Some(self.phase)
    }

    /// Authoritative turn change from the host. Accepted after the local
    /// discs settle, or while waiting for a strike.
    pub fn hand_over(&mut self, next: Player) -> bool {
        match self.phase {
            TurnPhase::ResolvingOutcome { .. } | TurnPhase::AwaitingStrike { .. } => {
                self.phase = TurnPhase::AwaitingStrike { player: next };
                true
            }
            _ => false,
        }
    }

    /// The host declared a winner.
    pub fn finish(&mut self, winner: Player) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = TurnPhase::MatchOver { winner };
        true
    }

    /// Abandon the match from any live phase.
    pub fn abort(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = TurnPhase::Aborted;
        true
    }
}
