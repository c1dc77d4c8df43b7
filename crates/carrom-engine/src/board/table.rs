//! Fixed board geometry: pockets, centre and the two baselines.

use glam::Vec2;

use crate::api::config::MatchConfig;
use crate::api::types::{Player, PocketId};

/// Board geometry derived from the match config. Immutable for a match.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    size: f32,
    pockets: [Vec2; 4],
    baseline_inset: f32,
    baseline_half_width: f32,
    return_radius: f32,
}

impl Table {
    pub fn new(config: &MatchConfig) -> Self {
        let s = config.board_size;
        let i = config.pocket_inset;
        Self {
            size: s,
            pockets: [
                Vec2::new(i, i),
                Vec2::new(s - i, i),
                Vec2::new(i, s - i),
                Vec2::new(s - i, s - i),
            ],
            baseline_inset: config.baseline_inset,
            baseline_half_width: config.baseline_half_width,
            return_radius: config.return_radius,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn center(&self) -> Vec2 {
        Vec2::splat(self.size / 2.0)
    }

    /// How far from the centre returned pieces may be placed.
    pub fn return_radius(&self) -> f32 {
        self.return_radius
    }

    pub fn pockets(&self) -> &[Vec2; 4] {
        &self.pockets
    }

    pub fn pocket(&self, id: PocketId) -> Option<Vec2> {
        self.pockets.get(id).copied()
    }

    /// Pocket closest to `pos`, with its distance.
    pub fn nearest_pocket(&self, pos: Vec2) -> (PocketId, f32) {
        let mut best = (0, f32::INFINITY);
        for (id, pocket) in self.pockets.iter().enumerate() {
            let d = pocket.distance(pos);
            if d < best.1 {
                best = (id, d);
            }
        }
        best
    }

    /// Y coordinate of a player's baseline. White shoots from the bottom edge
    /// (large y), black from the top.
    pub fn baseline_y(&self, player: Player) -> f32 {
        match player {
            Player::White => self.size - self.baseline_inset,
            Player::Black => self.baseline_inset,
        }
    }

    /// Legal x range of the striker on a baseline.
    pub fn baseline_span(&self) -> (f32, f32) {
        let c = self.size / 2.0;
        (c - self.baseline_half_width, c + self.baseline_half_width)
    }

    /// Striker position on `player`'s baseline, x clamped to the legal span.
    pub fn striker_spot(&self, player: Player, x: f32) -> Vec2 {
        let (lo, hi) = self.baseline_span();
        let x = if x.is_finite() { x.clamp(lo, hi) } else { self.size / 2.0 };
        Vec2::new(x, self.baseline_y(player))
    }

    /// `count` evenly spaced striker positions along a baseline, ends included.
    pub fn baseline_samples(&self, player: Player, count: usize) -> Vec<Vec2> {
        let (lo, hi) = self.baseline_span();
        let y = self.baseline_y(player);
        match count {
            0 => Vec::new(),
            1 => vec![Vec2::new(self.size / 2.0, y)],
            n => (0..n)
                .map(|k| Vec2::new(lo + (hi - lo) * k as f32 / (n - 1) as f32, y))
                .collect(),
        }
    }

    pub fn contains(&self, pos: Vec2, radius: f32) -> bool {
        pos.x >= radius && pos.y >= radius && pos.x <= self.size - radius && pos.y <= self.size - radius
    }
}
