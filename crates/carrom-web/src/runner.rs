use std::collections::VecDeque;

use bytemuck::{Pod, Zeroable};
use carrom_engine::core::geometry::angle_to;
use carrom_engine::{
    BoardPhysics, CarromMatch, ConfigError, MatchConfig, MatchEvent, Outcome, PieceKind, Player,
    RapierBoard, Shot, StepClock, TurnPhase, TurnSummary,
};
use glam::Vec2;

/// Event kinds written into the game event buffer.
pub mod event_kinds {
    /// a = striking player, b = outcome code, c = score delta.
    pub const OUTCOME: f32 = 1.0;
    /// a = phase code, b = player index (-1 when none).
    pub const PHASE: f32 = 2.0;
    /// a = winner, b = bonus.
    pub const WIN: f32 = 3.0;
    /// a = piece id, b = pocket id.
    pub const POCKET: f32 = 4.0;
}

/// A game event communicated from Rust to TypeScript: `kind` identifies the
/// event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;
}

/// One disc for the renderer: centre, kind code, and 1.0 while on the board.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DiscInstance {
    pub x: f32,
    pub y: f32,
    pub kind: f32,
    pub visible: f32,
}

pub fn outcome_code(outcome: Option<Outcome>) -> f32 {
    match outcome {
        None => 0.0,
        Some(Outcome::Foul { .. }) => 1.0,
        Some(Outcome::QueenPocketed) => 2.0,
        Some(Outcome::QueenCovered) => 3.0,
        Some(Outcome::CoverFailed) => 4.0,
        Some(Outcome::Scored { .. }) => 5.0,
        Some(Outcome::OpponentPocketed { .. }) => 6.0,
        Some(Outcome::Miss) => 7.0,
    }
}

pub fn phase_code(phase: TurnPhase) -> f32 {
    match phase {
        TurnPhase::AwaitingStrike { .. } => 1.0,
        TurnPhase::StrikeInFlight { .. } => 2.0,
        TurnPhase::ResolvingOutcome { .. } => 3.0,
        TurnPhase::MatchOver { .. } => 4.0,
        TurnPhase::Aborted => 5.0,
    }
}

fn kind_code(kind: PieceKind) -> f32 {
    match kind {
        PieceKind::White => 0.0,
        PieceKind::Black => 1.0,
        PieceKind::Queen => 2.0,
        PieceKind::Striker => 3.0,
    }
}

fn summary_events(summary: &TurnSummary) -> impl Iterator<Item = GameEvent> {
    let outcome = GameEvent {
        kind: event_kinds::OUTCOME,
        a: summary.player.index() as f32,
        b: outcome_code(summary.outcome),
        c: summary.score_delta as f32,
    };
    let win = summary.win.map(|w| GameEvent {
        kind: event_kinds::WIN,
        a: w.winner.index() as f32,
        b: w.bonus as f32,
        c: 0.0,
    });
    std::iter::once(outcome).chain(win)
}

/// Drives one match and its Rapier board on a fixed timestep.
///
/// Lives in a `thread_local!` behind the free `#[wasm_bindgen]` functions in
/// `lib.rs`; JavaScript reads the event and disc buffers through raw
/// pointers after each tick.
pub struct MatchRunner {
    game: CarromMatch,
    board: RapierBoard,
    clock: StepClock,
    last_phase: Option<TurnPhase>,
    events: Vec<GameEvent>,
    discs: Vec<DiscInstance>,
    outgoing: VecDeque<String>,
}

impl MatchRunner {
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        let clock = StepClock::new(config.fixed_dt);
        let game = CarromMatch::new(config)?;
        let board = RapierBoard::new(game.config(), game.pieces());
        let mut runner = Self {
            discs: Vec::with_capacity(game.pieces().len()),
            game,
            board,
            clock,
            last_phase: None,
            events: Vec::with_capacity(16),
            outgoing: VecDeque::new(),
        };
        runner.rebuild_discs();
        Ok(runner)
    }

    /// Empty or blank JSON means the default config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            Self::new(MatchConfig::default())
        } else {
            Self::new(MatchConfig::from_json(json)?)
        }
    }

    /// Run one frame: step the board, feed pockets to the match, update it,
    /// then repack the buffers.
    pub fn tick(&mut self, dt: f32) {
        self.events.clear();

        let steps = self.clock.advance(dt);
        for _ in 0..steps {
            for (piece, pocket) in self.board.step() {
                self.events.push(GameEvent {
                    kind: event_kinds::POCKET,
                    a: piece.0 as f32,
                    b: pocket as f32,
                    c: 0.0,
                });
                self.game.push(MatchEvent::Pocketed { piece, pocket });
            }
            self.game.update(self.clock.dt(), &mut self.board);
        }

        for summary in self.game.drain_summaries() {
            self.events.extend(summary_events(&summary));
        }
        let phase = self.game.phase();
        if self.last_phase != Some(phase) {
            self.last_phase = Some(phase);
            self.events.push(GameEvent {
                kind: event_kinds::PHASE,
                a: phase_code(phase),
                b: phase.player().map_or(-1.0, |p| p.index() as f32),
                c: 0.0,
            });
        }
        self.outgoing.extend(self.game.take_outgoing());
        self.rebuild_discs();
    }

    fn rebuild_discs(&mut self) {
        self.discs.clear();
        for piece in self.game.pieces().iter() {
            let pos = self.board.body_position(piece.id).unwrap_or(piece.pos);
            self.discs.push(DiscInstance {
                x: pos.x,
                y: pos.y,
                kind: kind_code(piece.kind),
                visible: if piece.pocketed { 0.0 } else { 1.0 },
            });
        }
    }

    // ---- Inputs ----

    /// Local shot from the pointer. `power` is 0..1 of the maximum speed.
    pub fn shoot(&mut self, striker_x: f32, angle: f32, power: f32) -> bool {
        self.game.strike(striker_x, Shot { angle, power })
    }

    /// Local shot aimed at a point on the board, e.g. where a drag ended.
    pub fn shoot_at(&mut self, striker_x: f32, target: Vec2, power: f32) -> bool {
        let Some(player) = self.game.phase().player() else {
            return false;
        };
        let from = self.game.table().striker_spot(player, striker_x);
        self.shoot(striker_x, angle_to(from, target), power)
    }

    pub fn receive(&mut self, raw: &str) -> bool {
        self.game.receive(raw)
    }

    pub fn disconnect(&mut self) {
        self.game.push(MatchEvent::PeerDisconnected);
    }

    pub fn abort(&mut self) -> bool {
        self.game.abort()
    }

    /// Next serialized message for the peer, oldest first.
    pub fn next_outgoing(&mut self) -> Option<String> {
        self.outgoing.pop_front()
    }

    // ---- Pointer accessors for buffer reads ----

    pub fn game_events_ptr(&self) -> *const f32 {
        self.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.events.len() as u32
    }

    pub fn discs_ptr(&self) -> *const f32 {
        self.discs.as_ptr() as *const f32
    }

    pub fn disc_count(&self) -> u32 {
        self.discs.len() as u32
    }

    // ---- State accessors ----

    pub fn game(&self) -> &CarromMatch {
        &self.game
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn discs(&self) -> &[DiscInstance] {
        &self.discs
    }

    pub fn phase(&self) -> f32 {
        phase_code(self.game.phase())
    }

    /// Player to strike, or -1 once the match is over.
    pub fn current_player(&self) -> i32 {
        self.game.phase().player().map_or(-1, |p| p.index() as i32)
    }

    pub fn score(&self, player: u32) -> u32 {
        Player::from_index(player as usize).map_or(0, |p| self.game.state().score(p))
    }

    pub fn winner(&self) -> i32 {
        self.game.winner().map_or(-1, |p| p.index() as i32)
    }

    pub fn awaiting_local_shot(&self) -> bool {
        self.game.awaiting_local_shot()
    }

    pub fn board_size(&self) -> f32 {
        self.game.config().board_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrom_engine::{Controller, Win};

    fn local_runner() -> MatchRunner {
        MatchRunner::from_json(r#"{ "white": { "type": "local" }, "black": { "type": "local" } }"#).unwrap()
    }

    #[test]
    fn buffers_are_tightly_packed_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
        assert_eq!(std::mem::size_of::<DiscInstance>(), 16);
        let events = [GameEvent { kind: 1.0, a: 2.0, b: 3.0, c: 4.0 }];
        let floats: &[f32] = bytemuck::cast_slice(&events);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn blank_config_uses_defaults() {
        let runner = MatchRunner::from_json("  ").unwrap();
        assert_eq!(runner.board_size(), MatchConfig::default().board_size);
        assert_eq!(runner.game().config().black, MatchConfig::default().black);
        assert!(MatchRunner::from_json("{ broken").is_err());
    }

    #[test]
    fn first_tick_reports_the_opening_phase() {
        let mut runner = local_runner();
        runner.tick(1.0 / 60.0);
        let phase = runner
            .events()
            .iter()
            .find(|e| e.kind == event_kinds::PHASE)
            .copied()
            .unwrap();
        assert_eq!(phase.a, 1.0);
        assert_eq!(phase.b, 0.0);
        assert_eq!(runner.current_player(), 0);
        assert_eq!(runner.disc_count() as usize, runner.game().pieces().len());
    }

    #[test]
    fn local_shot_sets_discs_moving() {
        let mut runner = local_runner();
        runner.tick(1.0 / 60.0);
        assert!(runner.awaiting_local_shot());
        assert!(runner.shoot_at(370.0, Vec2::new(370.0, 370.0), 0.8));
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.phase(), phase_code(TurnPhase::StrikeInFlight { player: Player::White }));
        assert!(!runner.awaiting_local_shot());
    }

    #[test]
    fn match_over_packs_outcome_and_win() {
        let summary = TurnSummary {
            player: Player::Black,
            outcome: Some(Outcome::Scored { count: 2 }),
            score_delta: 2,
            continues: false,
            win: Some(Win { winner: Player::Black, bonus: 5 }),
        };
        let events: Vec<GameEvent> = summary_events(&summary).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], GameEvent { kind: event_kinds::OUTCOME, a: 1.0, b: 5.0, c: 2.0 });
        assert_eq!(events[1], GameEvent { kind: event_kinds::WIN, a: 1.0, b: 5.0, c: 0.0 });
    }

    #[test]
    fn host_queues_messages_for_the_peer() {
        let config = MatchConfig {
            white: Controller::Local,
            black: Controller::Remote,
            role: carrom_engine::NetworkRole::Host,
            ..MatchConfig::default()
        };
        let mut runner = MatchRunner::new(config).unwrap();
        runner.tick(1.0 / 60.0);
        assert!(runner.shoot(370.0, -std::f32::consts::FRAC_PI_2, 0.5));
        runner.tick(1.0 / 60.0);
        let first = runner.next_outgoing().unwrap();
        assert!(first.contains("\"type\":\"shot\""));
    }

    #[test]
    fn abort_ends_the_match_without_a_winner() {
        let mut runner = local_runner();
        runner.tick(1.0 / 60.0);
        assert!(runner.abort());
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.phase(), phase_code(TurnPhase::Aborted));
        assert_eq!(runner.winner(), -1);
        assert_eq!(runner.current_player(), -1);
        assert_eq!(runner.score(7), 0);
    }
}
