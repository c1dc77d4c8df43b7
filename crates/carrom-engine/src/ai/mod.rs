pub mod evaluator;
pub mod planner;

pub use evaluator::{Candidate, Shot, ShotEvaluator, ShotKind};
pub use planner::{Difficulty, PlannedShot, ShotPlanner};
