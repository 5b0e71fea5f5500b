//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per rendered frame, driven by a caller-supplied clock
//! - Seeded RNG only, one named stream per concern
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod pause;
pub mod pose;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod track;

pub use collision::{circles_overlap, sweep_player_hits};
pub use difficulty::{Difficulty, Rgb};
pub use pause::{Challenge, ChallengeView};
pub use pose::{Keypoint, PoseFrame, PoseName, TrackedJoint, ValidationReport, validate};
pub use rng::RngStreams;
pub use snapshot::{RenderSnapshot, snapshot};
pub use state::{Decoration, GameState, Obstacle, Player};
pub use tick::{TickInput, tick};
pub use track::{Lane, Side, Track};
