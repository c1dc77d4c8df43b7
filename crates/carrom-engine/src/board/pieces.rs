use glam::Vec2;

use crate::api::config::MatchConfig;
use crate::api::types::{PieceId, PieceKind, Player};
use crate::board::table::Table;
use crate::core::geometry::discs_overlap;
use crate::core::rng::Rng;

/// Number of pieces of each colour in the opening rack.
pub const PIECES_PER_COLOR: usize = 18;

/// Slots in each hexagonal ring of the rack (rings 1, 2, 3 around the queen).
const RING_SLOTS: [usize; 3] = [6, 12, 18];


/// A disc tracked by the rules engine. Position is mirrored from the physics
/// board each update; the engine owns identity and pocketed state.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub pos: Vec2,
    pub radius: f32,
    pub pocketed: bool,
    /// Set once the piece has been brought back after a penalty. It can only
    /// be brought back once.
    pub returned: bool,
}

impl Piece {
    fn new(id: u32, kind: PieceKind, pos: Vec2, radius: f32) -> Self {
        Self {
            id: PieceId(id),
            kind,
            pos,
            radius,
            pocketed: false,
            returned: false,
        }
    }

    pub fn on_board(&self) -> bool {
        !self.pocketed
    }
}

/// Flat piece table indexed by `PieceId`. Queen is id 0, the striker is last.
#[derive(Debug, Clone)]
pub struct Pieces {
    pieces: Vec<Piece>,
}

impl Pieces {
    /// Opening position: queen at the centre, three hexagonal rings around it
    /// with colours alternating along each ring, striker on white's baseline.
    pub fn rack(config: &MatchConfig, table: &Table) -> Self {
        let center = table.center();
        let spacing = config.rack_spacing();
        let mut pieces = Vec::with_capacity(2 * PIECES_PER_COLOR + 2);
        pieces.push(Piece::new(0, PieceKind::Queen, center, config.piece_radius));

        let mut next_id = 1u32;
        for (ring, slots) in RING_SLOTS.iter().enumerate() {
            for (slot, pos) in hex_ring(center, ring + 1, spacing).into_iter().enumerate() {
                debug_assert!(slot < *slots);
                let kind = if slot % 2 == 0 { PieceKind::White } else { PieceKind::Black };
                pieces.push(Piece::new(next_id, kind, pos, config.piece_radius));
                next_id += 1;
            }
        }

        let striker_pos = table.striker_spot(Player::White, center.x);
        pieces.push(Piece::new(next_id, PieceKind::Striker, striker_pos, config.striker_radius));
        Self { pieces }
    }

    pub fn from_vec(pieces: Vec<Piece>) -> Self {
        Self { pieces }
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.pieces.iter_mut()
    }

    pub fn as_slice(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn striker(&self) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.kind == PieceKind::Striker)
    }

    pub fn striker_id(&self) -> Option<PieceId> {
        self.striker().map(|p| p.id)
    }

    pub fn queen(&self) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.kind == PieceKind::Queen)
    }

    pub fn queen_id(&self) -> Option<PieceId> {
        self.queen().map(|p| p.id)
    }

    /// Pieces of `kind` still on the board.
    pub fn remaining(&self, kind: PieceKind) -> usize {
        self.pieces.iter().filter(|p| p.kind == kind && !p.pocketed).count()
    }

    /// Pieces of `kind` that have been pocketed.
    pub fn pocketed(&self, kind: PieceKind) -> usize {
        self.pieces.iter().filter(|p| p.kind == kind && p.pocketed).count()
    }

    /// First pocketed piece of `kind` that has not already been returned once.
    pub fn returnable(&self, kind: PieceKind) -> Option<PieceId> {
        self.pieces
            .iter()
            .find(|p| p.kind == kind && p.pocketed && !p.returned)
            .map(|p| p.id)
    }

    /// Whether a disc of `radius` at `pos` would overlap any on-board disc
    /// other than `ignore`.
    pub fn is_occupied(&self, pos: Vec2, radius: f32, ignore: Option<PieceId>) -> bool {
        self.pieces
            .iter()
            .filter(|p| p.on_board() && Some(p.id) != ignore)
            .any(|p| discs_overlap(p.pos, p.radius, pos, radius))
    }

    /// A free spot for a disc of `radius` near `center`: the centre itself if
    /// clear, otherwise the first free slot on rings growing outwards by one
    /// radius at a time, up to `reach`. Each ring starts at a random angle so
    /// returns scatter. Falls back to the centre only when every ring is full.
    pub fn free_spot_near(
        &self,
        center: Vec2,
        radius: f32,
        reach: f32,
        ignore: Option<PieceId>,
        rng: &mut Rng,
    ) -> Vec2 {
        if !self.is_occupied(center, radius, ignore) {
            return center;
        }
        let step = radius.max(f32::EPSILON);
        let mut dist = step;
        while dist <= reach {
            // Neighbouring slots one radius apart along the ring.
            let slots = ((std::f32::consts::TAU * dist / step).ceil() as usize).max(6);
            let offset = rng.range(0.0, std::f32::consts::TAU);
            for k in 0..slots {
                let angle = offset + std::f32::consts::TAU * k as f32 / slots as f32;
                let candidate = center + Vec2::new(angle.cos(), angle.sin()) * dist;
                if !self.is_occupied(candidate, radius, ignore) {
                    return candidate;
                }
            }
            dist += step;
        }
        log::warn!("no free spot within {} of {:?}, stacking on centre", reach, center);
        center
    }
}

/// Slot centres of hexagonal ring `ring` (1-based) around `center`.
/// Ring k has 6k slots.
fn hex_ring(center: Vec2, ring: usize, spacing: f32) -> Vec<Vec2> {
    let corners: Vec<Vec2> = (0..6)
        .map(|k| {
            let a = std::f32::consts::FRAC_PI_3 * k as f32;
            Vec2::new(a.cos(), a.sin()) * spacing
        })
        .collect();
    let mut slots = Vec::with_capacity(6 * ring);
    for side in 0..6 {
        let start = corners[side] * ring as f32;
        let step = corners[(side + 2) % 6];
        for i in 0..ring {
            slots.push(center + start + step * i as f32);
        }
    }
    slots
}
