use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::planner::Difficulty;
use crate::api::types::Player;

/// Who decides the shots for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Controller {
    /// Shots arrive through `CarromMatch::strike` (pointer input on this device).
    Local,
    /// Shots come from the shot planner.
    Ai { difficulty: Difficulty },
    /// Shots arrive as `shot` messages from the peer.
    Remote,
}

/// This device's part in a networked match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkRole {
    /// No peer; every strike is resolved locally.
    #[default]
    Offline,
    /// Resolves every strike and announces each turn change.
    Host,
    /// Mirrors strikes and takes turn changes from the host.
    Guest,
}

/// Physical material of the discs and the board, handed to the physics board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardMaterial {
    /// Felt friction (higher = discs stop sooner).
    pub linear_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
    /// Every disc slower than this counts as stopped.
    pub settle_speed: f32,
}

impl Default for BoardMaterial {
    fn default() -> Self {
        Self {
            linear_damping: 1.6,
            restitution: 0.85,
            friction: 0.15,
            density: 0.01,
            settle_speed: 4.0,
        }
    }
}

/// Match configuration. Every field has a default, so a host can send a
/// partial JSON object and only override what it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Side length of the square playing surface, in world units.
    pub board_size: f32,
    pub piece_radius: f32,
    pub striker_radius: f32,
    /// Distance of each pocket centre from its corner, along both axes.
    pub pocket_inset: f32,
    /// A disc whose path passes this close to a pocket centre drops in.
    pub pocket_radius: f32,
    /// Distance from a board edge to that side's baseline.
    pub baseline_inset: f32,
    /// Half the usable length of a baseline, measured from its midpoint.
    pub baseline_half_width: f32,
    /// Gap between neighbouring discs in the opening rack.
    pub rack_gap: f32,
    /// Striker speed at full power.
    pub max_shot_speed: f32,
    /// Extra clearance required around the striker's path by the shot evaluator.
    pub obstruction_margin: f32,
    /// Farthest from the centre a penalty piece or the queen is put back.
    pub return_radius: f32,
    pub white: Controller,
    pub black: Controller,
    pub role: NetworkRole,
    /// Seconds the AI waits before launching its shot.
    pub ai_think_delay: f32,
    pub seed: u64,
    /// Physics step in seconds.
    pub fixed_dt: f32,
    pub material: BoardMaterial,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board_size: 740.0,
            piece_radius: 12.0,
            striker_radius: 16.0,
            pocket_inset: 32.0,
            pocket_radius: 24.0,
            baseline_inset: 110.0,
            baseline_half_width: 220.0,
            rack_gap: 0.5,
            max_shot_speed: 2400.0,
            obstruction_margin: 2.0,
            return_radius: 240.0,
            white: Controller::Local,
            black: Controller::Ai { difficulty: Difficulty::Medium },
            role: NetworkRole::Offline,
            ai_think_delay: 0.8,
            seed: 0x00C0_FFEE,
            fixed_dt: 1.0 / 60.0,
            material: BoardMaterial::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid match config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} must be positive and finite")]
    NotPositive(&'static str),
    #[error("board of size {board} cannot hold the rack and both baselines")]
    BoardTooSmall { board: f32 },
    #[error("{0:?} is remote-controlled but the match is offline")]
    RemoteWhileOffline(Player),
    #[error("a networked match needs exactly one remote side")]
    NoRemoteSide,
    #[error("return_radius {0} reaches past the board edge")]
    ReturnRadiusTooLarge(f32),
}

impl MatchConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn controller(&self, player: Player) -> Controller {
        match player {
            Player::White => self.white,
            Player::Black => self.black,
        }
    }

    /// Centre-to-centre spacing of neighbouring rack slots.
    pub fn rack_spacing(&self) -> f32 {
        2.0 * self.piece_radius + self.rack_gap
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("board_size", self.board_size),
            ("piece_radius", self.piece_radius),
            ("striker_radius", self.striker_radius),
            ("pocket_radius", self.pocket_radius),
            ("pocket_inset", self.pocket_inset),
            ("baseline_inset", self.baseline_inset),
            ("baseline_half_width", self.baseline_half_width),
            ("max_shot_speed", self.max_shot_speed),
            ("return_radius", self.return_radius),
            ("fixed_dt", self.fixed_dt),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive(name));
            }
        }

        // Outer ring of the rack must stay clear of both baselines.
        let rack_extent = 3.0 * self.rack_spacing() + self.piece_radius;
        let baseline_offset = self.board_size / 2.0 - self.baseline_inset;
        if baseline_offset - self.striker_radius <= rack_extent
            || self.baseline_inset <= self.striker_radius
            || self.baseline_half_width + self.striker_radius >= self.board_size / 2.0
        {
            return Err(ConfigError::BoardTooSmall { board: self.board_size });
        }

        if self.return_radius + self.piece_radius >= self.board_size / 2.0 {
            return Err(ConfigError::ReturnRadiusTooLarge(self.return_radius));
        }

        let remote_sides: Vec<Player> = Player::ALL
            .into_iter()
            .filter(|p| self.controller(*p) == Controller::Remote)
            .collect();
        match self.role {
            NetworkRole::Offline => {
                if let Some(p) = remote_sides.first() {
                    return Err(ConfigError::RemoteWhileOffline(*p));
                }
            }
            NetworkRole::Host | NetworkRole::Guest => {
                if remote_sides.len() != 1 {
                    return Err(ConfigError::NoRemoteSide);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        MatchConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "seed": 9,
            "white": { "type": "ai", "difficulty": "hard" },
            "black": { "type": "local" }
        }"#;
        let config = MatchConfig::from_json(json).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.white, Controller::Ai { difficulty: Difficulty::Hard });
        assert_eq!(config.black, Controller::Local);
        assert_eq!(config.board_size, MatchConfig::default().board_size);
    }

    #[test]
    fn rejects_tiny_board() {
        let config = MatchConfig { board_size: 200.0, ..MatchConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::BoardTooSmall { .. })));
    }

    #[test]
    fn rejects_non_positive_radius() {
        let config = MatchConfig { piece_radius: 0.0, ..MatchConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive("piece_radius"))));
    }

    #[test]
    fn remote_side_requires_network_role() {
        let config = MatchConfig { black: Controller::Remote, ..MatchConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RemoteWhileOffline(Player::Black))
        ));

        let host = MatchConfig { role: NetworkRole::Host, ..config };
        host.validate().unwrap();

        let no_remote = MatchConfig { role: NetworkRole::Guest, ..MatchConfig::default() };
        assert!(matches!(no_remote.validate(), Err(ConfigError::NoRemoteSide)));
    }

    #[test]
    fn rejects_return_radius_past_the_edge() {
        let config = MatchConfig { return_radius: 365.0, ..MatchConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ReturnRadiusTooLarge(_))));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(MatchConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }
}
