use glam::Vec2;

use crate::api::types::PieceId;

/// The rigid-body simulation the match runs on top of.
///
/// The match never integrates motion itself. It reads positions back, asks
/// whether everything has stopped, and moves or launches bodies at turn
/// boundaries. Pocket detection is the board's job; it reports drops through
/// `MatchEvent::Pocketed`.
pub trait BoardPhysics {
    /// Current centre of a disc, or `None` if the body is unknown.
    fn body_position(&self, id: PieceId) -> Option<Vec2>;

    /// True once every body has come to rest.
    fn is_settled(&self) -> bool;

    /// Put a disc at `pos` with zero velocity and make it part of the
    /// simulation again (after a pocketing, for returns and the striker).
    fn place(&mut self, id: PieceId, pos: Vec2);

    /// Give a disc an initial velocity.
    fn launch(&mut self, id: PieceId, velocity: Vec2);
}
