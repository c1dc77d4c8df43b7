use glam::Vec2;
use serde::Serialize;

use crate::ai::evaluator::Shot;
use crate::ai::planner::ShotPlanner;
use crate::api::config::{ConfigError, Controller, MatchConfig, NetworkRole};
use crate::api::physics::BoardPhysics;
use crate::api::types::{PieceId, PieceKind, Player};
use crate::board::pieces::Pieces;
use crate::board::table::Table;
use crate::bridge::protocol::{RemoteMessage, TurnEnd};
use crate::bridge::sync::RemoteSync;
use crate::core::rng::Rng;
use crate::core::time::Countdown;
use crate::input::queue::{EventQueue, MatchEvent};
use crate::rules::outcome::{Outcome, Resolver, TurnResult, Win};
use crate::rules::state::MatchState;
use crate::rules::turn::{TurnMachine, TurnPhase};

/// Striker positions tried along the baseline when the middle is covered.
const HOME_SAMPLES: usize = 17;

/// What the presentation layer needs to announce one finished strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurnSummary {
    pub player: Player,
    /// `None` when a peer's verdict arrived without one.
    pub outcome: Option<Outcome>,
    pub score_delta: i32,
    pub continues: bool,
    pub win: Option<Win>,
}

/// One carrom match: rules, turn order, AI and remote play, on top of an
/// external physics board.
///
/// Single-threaded. Callbacks only `push` events; everything is applied
/// during `update`, which the host calls once per frame after stepping
/// the board.
pub struct CarromMatch {
    config: MatchConfig,
    table: Table,
    pieces: Pieces,
    state: MatchState,
    turn: TurnMachine,
    strike: TurnResult,
    rng: Rng,
    planner: ShotPlanner,
    events: EventQueue,
    sync: RemoteSync,
    /// Peer messages that arrived before the match could take them.
    held: Vec<RemoteMessage>,
    think: Countdown,
    /// The striker has been set up for the current `AwaitingStrike`.
    turn_ready: bool,
    summaries: Vec<TurnSummary>,
}

impl CarromMatch {
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = Table::new(&config);
        let pieces = Pieces::rack(&config, &table);
        let first = Player::White;
        log::info!(
            "new match: white {:?}, black {:?}, {:?}",
            config.white,
            config.black,
            config.role
        );
        Ok(Self {
            planner: ShotPlanner::new(&config),
            rng: Rng::new(config.seed),
            sync: RemoteSync::new(config.role),
            table,
            pieces,
            state: MatchState::new(first),
            turn: TurnMachine::new(first),
            strike: TurnResult::new(),
            events: EventQueue::new(),
            held: Vec::new(),
            think: Countdown::default(),
            turn_ready: false,
            summaries: Vec::new(),
            config,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::new(MatchConfig::from_json(json)?)
    }

    // -- Inputs --

    pub fn push(&mut self, event: MatchEvent) {
        self.events.push(event);
    }

    /// Hand a raw message from the peer to the match. Returns whether it
    /// was well-formed; malformed messages are dropped.
    pub fn receive(&mut self, raw: &str) -> bool {
        match self.sync.receive(raw) {
            Some(message) => {
                self.events.push(MatchEvent::Remote(message));
                true
            }
            None => false,
        }
    }

    /// Queue a shot from pointer input. Accepted only while a local player
    /// is waiting to strike.
    pub fn strike(&mut self, striker_x: f32, shot: Shot) -> bool {
        if !self.awaiting_local_shot() {
            return false;
        }
        self.events.push(MatchEvent::LocalShot {
            striker_x,
            velocity: shot.velocity(self.config.max_shot_speed),
        });
        true
    }

    /// Abandon the match immediately, from any phase.
    pub fn abort(&mut self) -> bool {
        if !self.turn.abort() {
            return false;
        }
        self.think.cancel();
        self.held.clear();
        log::info!("match aborted after {} strikes", self.turn.strikes());
        true
    }

    // -- Frame --

    pub fn update(&mut self, dt: f32, physics: &mut dyn BoardPhysics) {
        if self.turn.phase().is_terminal() {
            let dropped = self.events.drain();
            if !dropped.is_empty() {
                log::debug!("match over, dropped {} events", dropped.len());
            }
            return;
        }
        self.sync_positions(physics);

        for message in std::mem::take(&mut self.held) {
            self.apply_remote(message, physics);
        }
        for event in self.events.drain() {
            if self.turn.phase().is_terminal() {
                break;
            }
            self.apply_event(event, physics);
        }

        match self.turn.phase() {
            TurnPhase::StrikeInFlight { .. } if physics.is_settled() => self.settle(physics),
            TurnPhase::AwaitingStrike { player } => self.prepare_turn(player, dt, physics),
            _ => {}
        }
    }

    fn sync_positions(&mut self, physics: &dyn BoardPhysics) {
        for piece in self.pieces.iter_mut().filter(|p| p.on_board()) {
            if let Some(pos) = physics.body_position(piece.id) {
                piece.pos = pos;
            }
        }
    }

    fn apply_event(&mut self, event: MatchEvent, physics: &mut dyn BoardPhysics) {
        match event {
            MatchEvent::Pocketed { piece, pocket } => {
                if !matches!(self.turn.phase(), TurnPhase::StrikeInFlight { .. }) {
                    self.respot(piece, physics);
                    return;
                }
                let Some(p) = self.pieces.get_mut(piece) else {
                    log::warn!("pocket event for unknown {:?}", piece);
                    return;
                };
                p.pocketed = true;
                let kind = p.kind;
                if self.strike.record(piece, kind) {
                    log::info!("{:?} {:?} into pocket {}", kind, piece, pocket);
                }
            }
            MatchEvent::LocalShot { striker_x, velocity } => {
                if let Some(player) = self.awaiting(Controller::Local) {
                    self.launch(player, striker_x, velocity, physics);
                } else {
                    log::warn!("local shot out of turn, ignored");
                }
            }
            MatchEvent::Remote(message) => self.apply_remote(message, physics),
            MatchEvent::PeerDisconnected => {
                if self.sync.is_networked() {
                    log::warn!("peer disconnected");
                    self.abort();
                }
            }
            MatchEvent::Abort => {
                self.abort();
            }
        }
    }

    /// A disc that crept into a pocket after its strike was settled goes
    /// back on the board: the striker to the baseline, anything else to a
    /// free spot near the centre.
    fn respot(&mut self, id: PieceId, physics: &mut dyn BoardPhysics) {
        let Some(piece) = self.pieces.get(id) else {
            log::warn!("pocket event for unknown {:?}", id);
            return;
        };
        let pos = match (piece.kind, self.turn.phase().player()) {
            (PieceKind::Striker, Some(player)) => self.home(player),
            _ => self.pieces.free_spot_near(
                self.table.center(),
                piece.radius,
                self.table.return_radius(),
                Some(id),
                &mut self.rng,
            ),
        };
        if let Some(piece) = self.pieces.get_mut(id) {
            piece.pocketed = false;
            piece.pos = pos;
        }
        physics.place(id, pos);
        log::info!("{:?} dropped after the strike settled, respotted at {:?}", id, pos);
    }

    /// Peer messages apply in arrival order. One that comes too early (a
    /// verdict while our discs still move, a shot before we have settled)
    /// is held, along with everything after it.
    fn apply_remote(&mut self, message: RemoteMessage, physics: &mut dyn BoardPhysics) {
        let phase = self.turn.phase();
        let ready = match &message {
            RemoteMessage::Shot { .. } => matches!(phase, TurnPhase::AwaitingStrike { .. }),
            RemoteMessage::TurnEnd(_) => !matches!(phase, TurnPhase::StrikeInFlight { .. }),
        };
        if !self.held.is_empty() || !ready {
            self.held.push(message);
            return;
        }

        match message {
            RemoteMessage::Shot { striker_x, velocity } => {
                if let Some(player) = self.awaiting(Controller::Remote) {
                    self.launch(player, striker_x, velocity, physics);
                } else {
                    log::warn!("remote shot out of turn, ignored");
                }
            }
            RemoteMessage::TurnEnd(end) => {
                if self.sync.role() == NetworkRole::Guest {
                    self.apply_turn_end(end, physics);
                } else {
                    log::warn!("turn end from a guest, ignored");
                }
            }
        }
    }

    /// The player to strike, if their side is driven by `controller`.
    fn awaiting(&self, controller: Controller) -> Option<Player> {
        match self.turn.phase() {
            TurnPhase::AwaitingStrike { player } if self.config.controller(player) == controller => {
                Some(player)
            }
            _ => None,
        }
    }

    fn prepare_turn(&mut self, player: Player, dt: f32, physics: &mut dyn BoardPhysics) {
        if !self.turn_ready {
            self.begin_turn(player, physics);
        }
        if let Controller::Ai { difficulty } = self.config.controller(player) {
            if self.think.tick(dt) {
                let striker_pos = self.pieces.striker().map(|s| s.pos).unwrap_or_else(|| self.home(player));
                let plan = self.planner.plan_shot(
                    striker_pos,
                    self.pieces.as_slice(),
                    player,
                    difficulty,
                    &mut self.rng,
                );
                let velocity = plan.shot.velocity(self.config.max_shot_speed);
                self.launch(player, plan.striker_pos.x, velocity, physics);
            }
        }
    }

    /// Put the striker back on `player`'s baseline and start the AI timer.
    fn begin_turn(&mut self, player: Player, physics: &mut dyn BoardPhysics) {
        let home = self.home(player);
        if let Some(id) = self.pieces.striker_id() {
            if let Some(striker) = self.pieces.get_mut(id) {
                striker.pocketed = false;
                striker.pos = home;
            }
            physics.place(id, home);
        }
        self.state.set_current(player);
        self.turn_ready = true;

        let controller = self.config.controller(player);
        if let Controller::Ai { .. } = controller {
            self.think.start(self.config.ai_think_delay);
        }
        log::info!("{:?} to strike ({:?})", player, controller);
    }

    /// Middle of the baseline, or the nearest free spot along it.
    fn home(&self, player: Player) -> Vec2 {
        let center = self.table.striker_spot(player, self.table.center().x);
        let striker = self.pieces.striker_id();
        let free = |pos: &Vec2| !self.pieces.is_occupied(*pos, self.config.striker_radius, striker);
        if free(&center) {
            return center;
        }
        let mut samples = self.table.baseline_samples(player, HOME_SAMPLES);
        samples.sort_by(|a, b| a.distance(center).total_cmp(&b.distance(center)));
        samples.into_iter().find(free).unwrap_or(center)
    }

    fn launch(&mut self, player: Player, striker_x: f32, velocity: Vec2, physics: &mut dyn BoardPhysics) {
        if !velocity.is_finite() {
            log::warn!("non-finite shot velocity, ignored");
            return;
        }
        let Some(id) = self.pieces.striker_id() else {
            return;
        };
        let velocity = velocity.clamp_length_max(self.config.max_shot_speed);
        let pos = self.table.striker_spot(player, striker_x);
        if let Some(striker) = self.pieces.get_mut(id) {
            striker.pocketed = false;
            striker.pos = pos;
        }
        physics.place(id, pos);
        physics.launch(id, velocity);

        self.state.set_current(player);
        self.strike = TurnResult::new();
        self.think.cancel();
        self.turn.launch();
        self.turn_ready = false;
        log::info!("{:?} strikes from x={:.1} at {:?}", player, pos.x, velocity);

        if self.config.controller(player) != Controller::Remote {
            self.sync.send(&RemoteMessage::Shot { striker_x: pos.x, velocity });
        }
    }

    fn settle(&mut self, physics: &mut dyn BoardPhysics) {
        self.turn.settle();
        if self.sync.is_authority() {
            self.resolve(physics);
        } else {
            log::debug!("discs settled, waiting for the host's verdict");
        }
    }

    fn resolve(&mut self, physics: &mut dyn BoardPhysics) {
        let verdict = Resolver {
            pieces: &mut self.pieces,
            table: &self.table,
            rng: &mut self.rng,
        }
        .resolve(&self.strike, &mut self.state);

        for placement in &verdict.placements {
            physics.place(placement.piece, placement.pos);
        }
        if let Some(TurnPhase::AwaitingStrike { player }) = self.turn.apply(&verdict) {
            self.state.set_current(player);
        }
        self.turn_ready = false;

        self.summaries.push(TurnSummary {
            player: verdict.player,
            outcome: Some(verdict.outcome),
            score_delta: verdict.score_delta,
            continues: verdict.continues,
            win: verdict.win,
        });

        if self.sync.role() == NetworkRole::Host {
            self.sync.send(&RemoteMessage::TurnEnd(TurnEnd {
                next_player: self.state.current(),
                scores: Some(self.state.scores()),
                queen: Some(self.state.queen()),
                placements: verdict.placements,
                outcome: Some(verdict.outcome),
                winner: verdict.win.map(|w| w.winner),
            }));
        }
    }

    /// Adopt the host's verdict for the strike that just settled.
    fn apply_turn_end(&mut self, end: TurnEnd, physics: &mut dyn BoardPhysics) {
        let player = self.turn.phase().player().unwrap_or(self.state.current());
        let before = self.state.score(player) as i32;

        if let Some(scores) = end.scores {
            self.state.set_scores(scores);
        }
        if let Some(queen) = end.queen {
            self.state.sync_queen(queen);
        }
        for placement in &end.placements {
            if let Some(piece) = self.pieces.get_mut(placement.piece) {
                piece.pocketed = false;
                piece.pos = placement.pos;
                if matches!(piece.kind, PieceKind::White | PieceKind::Black) {
                    piece.returned = true;
                }
            }
            physics.place(placement.piece, placement.pos);
        }

        let win = end.winner.map(|winner| Win {
            winner,
            bonus: self.pieces.remaining(winner.other().color()) as u32,
        });
        match end.winner {
            Some(winner) => {
                self.turn.finish(winner);
            }
            None => {
                self.turn.hand_over(end.next_player);
                self.state.set_current(end.next_player);
            }
        }
        self.turn_ready = false;
        log::info!("host verdict: {:?}, {:?} to strike", end.outcome, end.next_player);

        self.summaries.push(TurnSummary {
            player,
            outcome: end.outcome,
            score_delta: self.state.score(player) as i32 - before,
            continues: win.is_none() && end.next_player == player,
            win,
        });
    }

    // -- Outputs --

    /// Summaries of strikes resolved since the last call.
    pub fn drain_summaries(&mut self) -> Vec<TurnSummary> {
        std::mem::take(&mut self.summaries)
    }

    /// Serialized messages for the peer, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<String> {
        self.sync.take_outgoing()
    }

    // -- Accessors --

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn pieces(&self) -> &Pieces {
        &self.pieces
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn phase(&self) -> TurnPhase {
        self.turn.phase()
    }

    pub fn strikes(&self) -> u32 {
        self.turn.strikes()
    }

    pub fn winner(&self) -> Option<Player> {
        match self.turn.phase() {
            TurnPhase::MatchOver { winner } => Some(winner),
            _ => None,
        }
    }

    /// True while pointer input on this device may take a shot.
    pub fn awaiting_local_shot(&self) -> bool {
        self.awaiting(Controller::Local).is_some()
    }
}
