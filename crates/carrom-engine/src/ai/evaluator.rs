//! Geometric scoring of a single candidate strike.
//!
//! A shot is built backwards from the pocket: the target must travel along
//! the target→pocket line, so the striker has to arrive at the "hit point"
//! one striker+piece radius behind the target on that line. The evaluator
//! checks the striker's path to the hit point is clear and scores how easy
//! the whole shot is. No randomness: same inputs, same answer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::config::MatchConfig;
use crate::api::types::{PieceId, PieceKind, PocketId};
use crate::board::pieces::Piece;
use crate::board::table::Table;
use crate::core::geometry::{angle_between, angle_to, direction, interior_distance};

/// Starting score before penalties.
pub const BASE_SCORE: f32 = 100.0;
/// Shots below this are considered too difficult.
pub const MIN_SCORE: f32 = 20.0;
/// Penalty per unit of striker travel.
pub const STRIKE_DISTANCE_WEIGHT: f32 = 0.04;
/// Penalty per unit of target travel; larger, as target travel is what misses.
pub const POCKET_DISTANCE_WEIGHT: f32 = 0.12;
/// Penalty per radian between the strike direction and the target's path.
pub const CUT_ANGLE_WEIGHT: f32 = 30.0;

/// Opponent pieces this close to a pocket are worth knocking away.
pub const DEFENSE_THRESHOLD: f32 = 150.0;
/// Defensive shots start lower so they only win when offence is poor.
pub const DEFENSE_BASE_SCORE: f32 = 70.0;
/// Reward per unit the threatened piece is inside the threshold.
pub const DEFENSE_URGENCY_WEIGHT: f32 = 0.2;

/// Power fraction for a zero-length strike.
const MIN_POWER: f32 = 0.25;

/// Aim and strength of a strike. `power` is a fraction of the maximum speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub angle: f32,
    pub power: f32,
}

impl Shot {
    /// Striker velocity for this shot.
    pub fn velocity(&self, max_speed: f32) -> Vec2 {
        direction(self.angle) * self.power.clamp(0.0, 1.0) * max_speed
    }

    /// Recover a shot from a striker velocity.
    pub fn from_velocity(velocity: Vec2, max_speed: f32) -> Self {
        Self {
            angle: velocity.y.atan2(velocity.x),
            power: (velocity.length() / max_speed).clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotKind {
    /// Own piece into a pocket.
    Offense,
    /// The queen into a pocket.
    Queen,
    /// Opponent piece away from the pocket it threatens.
    Defense,
}

/// A scored strike the planner can choose from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub shot: Shot,
    pub striker_pos: Vec2,
    pub hit_point: Vec2,
    pub target: PieceId,
    pub pocket: PocketId,
    pub kind: ShotKind,
    pub score: f32,
}

impl Candidate {
    pub fn is_offensive(&self) -> bool {
        matches!(self.kind, ShotKind::Offense | ShotKind::Queen)
    }
}

#[derive(Debug, Clone)]
pub struct ShotEvaluator {
    striker_radius: f32,
    margin: f32,
    /// Striker travel that needs full power on top of `MIN_POWER`.
    power_range: f32,
}

impl ShotEvaluator {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            striker_radius: config.striker_radius,
            margin: config.obstruction_margin,
            power_range: config.board_size,
        }
    }

    /// Offensive shot driving `target` into `pocket`.
    pub fn evaluate(
        &self,
        striker_pos: Vec2,
        target: &Piece,
        pocket: (PocketId, Vec2),
        others: &[Piece],
    ) -> Option<Candidate> {
        let (pocket_id, pocket_pos) = pocket;
        let path_angle = angle_to(target.pos, pocket_pos);
        let hit_point = self.hit_point(target, path_angle);
        if !self.path_clear(striker_pos, hit_point, target.id, others) {
            return None;
        }

        let strike_angle = angle_to(striker_pos, hit_point);
        let strike_distance = striker_pos.distance(hit_point);
        let score = BASE_SCORE
            - STRIKE_DISTANCE_WEIGHT * strike_distance
            - POCKET_DISTANCE_WEIGHT * target.pos.distance(pocket_pos)
            - CUT_ANGLE_WEIGHT * angle_between(strike_angle, path_angle);
        if score < MIN_SCORE {
            return None;
        }

        let kind = if target.kind == PieceKind::Queen { ShotKind::Queen } else { ShotKind::Offense };
        Some(Candidate {
            shot: Shot { angle: strike_angle, power: self.power_for(strike_distance) },
            striker_pos,
            hit_point,
            target: target.id,
            pocket: pocket_id,
            kind,
            score,
        })
    }

    /// Defensive shot knocking an opponent piece away from the pocket it sits
    /// near. `None` if the piece is not close enough to any pocket to matter.
    pub fn evaluate_defensive(
        &self,
        striker_pos: Vec2,
        target: &Piece,
        table: &Table,
        others: &[Piece],
    ) -> Option<Candidate> {
        let (pocket_id, pocket_distance) = table.nearest_pocket(target.pos);
        if pocket_distance > DEFENSE_THRESHOLD {
            return None;
        }
        let pocket_pos = table.pocket(pocket_id)?;

        // Reversed: drive the piece from the pocket towards the open board.
        let path_angle = angle_to(pocket_pos, target.pos);
        let hit_point = self.hit_point(target, path_angle);
        if !self.path_clear(striker_pos, hit_point, target.id, others) {
            return None;
        }

        let strike_angle = angle_to(striker_pos, hit_point);
        let strike_distance = striker_pos.distance(hit_point);
        let score = DEFENSE_BASE_SCORE
            - STRIKE_DISTANCE_WEIGHT * strike_distance
            - CUT_ANGLE_WEIGHT * angle_between(strike_angle, path_angle)
            + DEFENSE_URGENCY_WEIGHT * (DEFENSE_THRESHOLD - pocket_distance);
        if score < MIN_SCORE {
            return None;
        }

        Some(Candidate {
            shot: Shot { angle: strike_angle, power: self.power_for(strike_distance) },
            striker_pos,
            hit_point,
            target: target.id,
            pocket: pocket_id,
            kind: ShotKind::Defense,
            score,
        })
    }

    /// Line-of-sight test for the striker travelling `from` → `to`. A disc
    /// blocks when it projects strictly inside the segment and sits closer
    /// than striker radius + its radius + margin. Pocketed discs, the striker
    /// itself and the target are ignored.
    pub fn path_clear(&self, from: Vec2, to: Vec2, target: PieceId, others: &[Piece]) -> bool {
        others
            .iter()
            .filter(|p| p.on_board() && p.id != target && p.kind != PieceKind::Striker)
            .all(|p| match interior_distance(from, to, p.pos) {
                Some(d) => d >= self.striker_radius + p.radius + self.margin,
                None => true,
            })
    }

    fn hit_point(&self, target: &Piece, path_angle: f32) -> Vec2 {
        target.pos - direction(path_angle) * (self.striker_radius + target.radius)
    }

    /// Power fraction: grows with striker travel, capped at full power.
    fn power_for(&self, strike_distance: f32) -> f32 {
        (MIN_POWER + strike_distance / self.power_range).min(1.0)
    }
}
