//! Shot planning for computer-controlled sides.
//!
//! Enumerates every (striker position, target, pocket) combination, scores it
//! with the evaluator, then picks among the best according to difficulty and
//! perturbs the pick so weaker opponents miss more often.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ai::evaluator::{Candidate, Shot, ShotEvaluator};
use crate::api::config::MatchConfig;
use crate::api::types::{PieceKind, Player};
use crate::board::pieces::Piece;
use crate::board::table::Table;
use crate::core::geometry::{angle_to, discs_overlap, normalize_angle};
use crate::core::rng::Rng;

/// Striker positions tried along the baseline, besides the current one.
pub const BASELINE_SAMPLES: usize = 9;
/// Below this many offensive options, defensive shots are considered too.
pub const MIN_OFFENSIVE_SHOTS: usize = 3;
/// Queen candidates are scaled by this.
pub const QUEEN_PRIORITY: f32 = 0.8;
/// Power of the blind shot used when nothing is viable.
pub const FALLBACK_POWER: f32 = 0.6;
/// Final power is clamped to this range.
pub const POWER_RANGE: (f32, f32) = (0.3, 1.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// How many of the best candidates the pick is drawn from.
    fn pool(self, available: usize) -> usize {
        let pool = match self {
            Difficulty::Easy => available.div_ceil(2),
            Difficulty::Medium => 3,
            Difficulty::Hard => 1,
        };
        pool.clamp(1, available.max(1))
    }

    /// Maximum angle error in radians, either way.
    pub fn angle_spread(self) -> f32 {
        match self {
            Difficulty::Easy => 0.15,
            Difficulty::Medium => 0.075,
            Difficulty::Hard => 0.025,
        }
    }

    /// Range the candidate's power is multiplied by.
    pub fn power_scale(self) -> (f32, f32) {
        match self {
            Difficulty::Easy => (0.7, 1.1),
            Difficulty::Medium => (0.85, 1.05),
            Difficulty::Hard => (0.95, 1.05),
        }
    }
}

/// The planner's decision: where to put the striker and how to hit it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedShot {
    pub striker_pos: Vec2,
    pub shot: Shot,
    /// The candidate the shot was derived from; `None` for the fallback.
    pub candidate: Option<Candidate>,
}

#[derive(Debug, Clone)]
pub struct ShotPlanner {
    evaluator: ShotEvaluator,
    table: Table,
    striker_radius: f32,
    samples: usize,
}

impl ShotPlanner {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            evaluator: ShotEvaluator::new(config),
            table: Table::new(config),
            striker_radius: config.striker_radius,
            samples: BASELINE_SAMPLES,
        }
    }

    /// Override how many baseline positions are tried. Zero keeps the
    /// striker where it is.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Striker positions to try: the current one first, then the baseline
    /// samples at the same height. Positions where the striker would sit on
    /// a disc are dropped.
    fn striker_positions(&self, striker_pos: Vec2, ai: Player, pieces: &[Piece]) -> Vec<Vec2> {
        let mut positions = vec![striker_pos];
        for sample in self.table.baseline_samples(ai, self.samples) {
            let pos = Vec2::new(sample.x, striker_pos.y);
            if pos.distance(striker_pos) > f32::EPSILON {
                positions.push(pos);
            }
        }
        positions.retain(|pos| {
            !pieces.iter().any(|p| {
                p.on_board()
                    && p.kind != PieceKind::Striker
                    && discs_overlap(p.pos, p.radius, *pos, self.striker_radius)
            })
        });
        positions
    }

    /// Every viable candidate for `ai`, best first. Ties keep enumeration order.
    pub fn candidates(&self, striker_pos: Vec2, pieces: &[Piece], ai: Player) -> Vec<Candidate> {
        let positions = self.striker_positions(striker_pos, ai, pieces);

        let mut candidates = Vec::new();
        for target in pieces.iter().filter(|p| p.on_board()) {
            let scale = match target.kind {
                k if k == ai.color() => 1.0,
                PieceKind::Queen => QUEEN_PRIORITY,
                _ => continue,
            };
            for &pos in &positions {
                for (id, pocket) in self.table.pockets().iter().enumerate() {
                    if let Some(mut c) = self.evaluator.evaluate(pos, target, (id, *pocket), pieces) {
                        c.score *= scale;
                        candidates.push(c);
                    }
                }
            }
        }

        let offensive = candidates.len();
        if offensive < MIN_OFFENSIVE_SHOTS {
            for target in pieces.iter().filter(|p| p.on_board() && p.kind == ai.other().color()) {
                for &pos in &positions {
                    if let Some(c) = self.evaluator.evaluate_defensive(pos, target, &self.table, pieces) {
                        candidates.push(c);
                    }
                }
            }
        }
        log::debug!(
            "{:?} planner: {} offensive, {} defensive from {} positions",
            ai,
            offensive,
            candidates.len() - offensive,
            positions.len()
        );

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    /// Choose the shot for `ai`. `pieces` is the full table including the
    /// striker, whose own entry is ignored.
    pub fn plan_shot(
        &self,
        striker_pos: Vec2,
        pieces: &[Piece],
        ai: Player,
        difficulty: Difficulty,
        rng: &mut Rng,
    ) -> PlannedShot {
        let candidates = self.candidates(striker_pos, pieces, ai);
        if candidates.is_empty() {
            log::info!("{:?} planner: no viable shot, aiming at the centre", ai);
            return PlannedShot {
                striker_pos,
                shot: Shot {
                    angle: angle_to(striker_pos, self.table.center()),
                    power: FALLBACK_POWER,
                },
                candidate: None,
            };
        }

        let pick = candidates[rng.next_index(difficulty.pool(candidates.len()))];
        let (lo, hi) = difficulty.power_scale();
        let shot = Shot {
            angle: normalize_angle(pick.shot.angle + rng.jitter(difficulty.angle_spread())),
            power: (pick.shot.power * rng.range(lo, hi)).clamp(POWER_RANGE.0, POWER_RANGE.1),
        };
        log::info!(
            "{:?} planner ({:?}): {:?} {:?} into pocket {} (score {:.1})",
            ai,
            difficulty,
            pick.kind,
            pick.target,
            pick.pocket,
            pick.score
        );
        PlannedShot {
            striker_pos: pick.striker_pos,
            shot,
            candidate: Some(pick),
        }
    }
}
