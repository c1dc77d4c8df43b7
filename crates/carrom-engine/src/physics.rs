use glam::Vec2;
use rapier2d::prelude::*;

use crate::api::config::{BoardMaterial, MatchConfig};
use crate::api::physics::BoardPhysics;
use crate::api::types::{PieceId, PocketId};
use crate::board::pieces::Pieces;
use crate::core::geometry::segment_point_distance;

/// Thickness of the cushions around the playing surface.
const WALL_THICKNESS: f32 = 40.0;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam to nalgebra and back
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// One disc in the simulation.
#[derive(Debug, Clone, Copy)]
struct Disc {
    id: PieceId,
    handle: RigidBodyHandle,
    /// Position after the previous step, for swept pocket checks.
    prev_pos: Vec2,
    /// False once the disc has dropped into a pocket.
    active: bool,
}

/// Rapier-backed carrom board: four cushions, one dynamic ball per disc,
/// no gravity (top-down view). Pockets are not colliders; a disc whose path
/// during a step passes within the capture radius of a pocket centre is
/// taken out of the simulation and reported.
pub struct RapierBoard {
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    /// Indexed by `PieceId`.
    discs: Vec<Disc>,
    pockets: [Vec2; 4],
    capture_radius: f32,
    settle_speed: f32,
}

impl RapierBoard {
    /// Build the board and one body per piece at its current position.
    pub fn new(config: &MatchConfig, pieces: &Pieces) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.fixed_dt;

        let s = config.board_size;
        let i = config.pocket_inset;
        let mut board = Self {
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            discs: Vec::with_capacity(pieces.len()),
            pockets: [
                Vec2::new(i, i),
                Vec2::new(s - i, i),
                Vec2::new(i, s - i),
                Vec2::new(s - i, s - i),
            ],
            capture_radius: config.pocket_radius,
            settle_speed: config.material.settle_speed,
        };
        board.build_walls(s, &config.material);
        for piece in pieces.iter() {
            board.add_disc(piece.id, piece.pos, piece.radius, !piece.pocketed, &config.material);
        }
        log::info!("rapier board: {} discs, size {}", board.discs.len(), s);
        board
    }

    fn build_walls(&mut self, size: f32, material: &BoardMaterial) {
        let half = size / 2.0;
        let t = WALL_THICKNESS / 2.0;
        // (centre, half extents)
        let walls = [
            (Vec2::new(half, -t), Vec2::new(half + WALL_THICKNESS, t)),
            (Vec2::new(half, size + t), Vec2::new(half + WALL_THICKNESS, t)),
            (Vec2::new(-t, half), Vec2::new(t, half + WALL_THICKNESS)),
            (Vec2::new(size + t, half), Vec2::new(t, half + WALL_THICKNESS)),
        ];
        for (center, extents) in walls {
            let body = RigidBodyBuilder::fixed().translation(vec2_to_na(center)).build();
            let handle = self.bodies.insert(body);
            let collider = ColliderBuilder::cuboid(extents.x, extents.y)
                .restitution(material.restitution)
                .friction(material.friction)
                .build();
            self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        }
    }

    fn add_disc(&mut self, id: PieceId, pos: Vec2, radius: f32, active: bool, material: &BoardMaterial) {
        let rb = RigidBodyBuilder::dynamic()
            .translation(vec2_to_na(pos))
            .linear_damping(material.linear_damping)
            .locked_axes(LockedAxes::ROTATION_LOCKED)
            .ccd_enabled(true)
            .enabled(active)
            .user_data(id.0 as u128)
            .build();
        let handle = self.bodies.insert(rb);
        let collider = ColliderBuilder::ball(radius)
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        self.discs.push(Disc {
            id,
            handle,
            prev_pos: pos,
            active,
        });
    }

    /// Advance one fixed step. Returns the discs that dropped in during it.
    pub fn step(&mut self) -> Vec<(PieceId, PocketId)> {
        self.physics_pipeline.step(
            &vector![0.0, 0.0],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        let mut pocketed = Vec::new();
        for disc in self.discs.iter_mut().filter(|d| d.active) {
            let Some(rb) = self.bodies.get_mut(disc.handle) else {
                continue;
            };
            let pos = na_to_vec2(rb.translation());
            // Swept check so fast discs cannot skip over a pocket.
            let hit = self
                .pockets
                .iter()
                .position(|p| segment_point_distance(disc.prev_pos, pos, *p) < self.capture_radius);
            disc.prev_pos = pos;
            if let Some(pocket) = hit {
                rb.set_linvel(vector![0.0, 0.0], false);
                rb.set_enabled(false);
                disc.active = false;
                pocketed.push((disc.id, pocket));
            }
        }
        pocketed
    }

    pub fn velocity(&self, id: PieceId) -> Vec2 {
        self.discs
            .get(id.index())
            .and_then(|d| self.bodies.get(d.handle))
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Whether the disc is still in play (not dropped into a pocket).
    pub fn is_active(&self, id: PieceId) -> bool {
        self.discs.get(id.index()).is_some_and(|d| d.active)
    }

    pub fn disc_count(&self) -> usize {
        self.discs.len()
    }

    fn body_mut(&mut self, id: PieceId) -> Option<(&mut Disc, &mut RigidBody)> {
        let disc = self.discs.get_mut(id.index())?;
        let rb = self.bodies.get_mut(disc.handle)?;
        Some((disc, rb))
    }
}

impl BoardPhysics for RapierBoard {
    fn body_position(&self, id: PieceId) -> Option<Vec2> {
        let disc = self.discs.get(id.index())?;
        self.bodies.get(disc.handle).map(|rb| na_to_vec2(rb.translation()))
    }

    fn is_settled(&self) -> bool {
        self.discs
            .iter()
            .filter(|d| d.active)
            .filter_map(|d| self.bodies.get(d.handle))
            .all(|rb| na_to_vec2(rb.linvel()).length() <= self.settle_speed)
    }

    fn place(&mut self, id: PieceId, pos: Vec2) {
        let Some((disc, rb)) = self.body_mut(id) else {
            log::warn!("place: no body for {:?}", id);
            return;
        };
        rb.set_enabled(true);
        rb.set_translation(vec2_to_na(pos), true);
        rb.set_linvel(vector![0.0, 0.0], true);
        disc.prev_pos = pos;
        disc.active = true;
    }

    fn launch(&mut self, id: PieceId, velocity: Vec2) {
        let Some((_, rb)) = self.body_mut(id) else {
            log::warn!("launch: no body for {:?}", id);
            return;
        };
        rb.set_linvel(vec2_to_na(velocity), true);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
