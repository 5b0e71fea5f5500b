//! Pose Runner - a perspective lane-runner with webcam pose challenges
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track geometry, spawning, collisions,
//!   difficulty, the pose-challenge state machine)
//! - `providers`: Capability traits for assets and pose input
//! - `tuning`: Data-driven game balance
//! - `highscores`: Best-survival-time table

pub mod highscores;
pub mod providers;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use providers::{AssetProvider, NullAssets, NullPoseSource, PoseSource, SpriteHandle};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Horizon line as a fraction of viewport height
    pub const HORIZON_FRACTION: f32 = 1.0 / 3.0;
    /// Track width at the bottom edge as a fraction of viewport width
    pub const TRACK_BOTTOM_FRACTION: f32 = 0.4;
    /// Track width at the horizon relative to the bottom width
    pub const TRACK_TOP_RATIO: f32 = 0.2;
    /// Number of lanes on the track
    pub const LANE_COUNT: usize = 3;

    /// Sprite scale at the horizon
    pub const MIN_SCALE: f32 = 0.25;
    /// Sprite scale at the bottom edge
    pub const MAX_SCALE: f32 = 1.0;
    /// Decoration scale range (off-track sprites loom larger up close)
    pub const DECOR_MIN_SCALE: f32 = 0.2;
    pub const DECOR_MAX_SCALE: f32 = 1.5;
    /// Outward drift multiplier for decorations at the bottom edge
    pub const DECOR_SPREAD: f32 = 4.0;
    /// Decorations keep at least this fraction of the top track width
    /// between themselves and the screen center at the horizon
    pub const DECOR_MIN_OFFSET_RATIO: f32 = 0.8;

    /// Obstacles spawn this many pixels above the horizon
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Unscaled obstacle diameter
    pub const OBSTACLE_BASE_SIZE: f32 = 100.0;
    /// Unscaled decoration diameter
    pub const DECOR_BASE_SIZE: f32 = 60.0;

    /// Player row as a fraction of viewport height
    pub const PLAYER_ROW_FRACTION: f32 = 0.8;
    /// Unscaled player diameter (matches obstacles so collision is symmetric)
    pub const PLAYER_BASE_SIZE: f32 = 100.0;
    /// Per-tick easing factor for lane changes
    pub const PLAYER_EASE: f32 = 0.15;

    /// Lives at run start
    pub const STARTING_LIVES: u8 = 3;

    /// Pose zone radius in display pixels
    pub const HIT_ZONE_RADIUS: f32 = 80.0;
    /// Keypoints below this confidence are scored as misses
    pub const MIN_CONFIDENCE: f32 = 0.3;
    /// Fraction of tracked joints that must land in their zones
    pub const MATCH_THRESHOLD: f32 = 0.75;
}

/// Linear interpolation between a and b
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
