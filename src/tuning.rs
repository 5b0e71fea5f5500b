//! Data-driven game balance
//!
//! Every timing and pacing number that designers iterate on lives here, with
//! defaults matching the shipped balance. The host page may override any
//! subset via JSON at startup; structural geometry (lane counts, projection
//! fractions) stays in `consts` because changing it is a code change.

use serde::{Deserialize, Serialize};

/// Balance values for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Obstacle spawning ===
    /// Delay before the first obstacle of a run (ms)
    pub obstacle_first_delay_ms: f64,
    /// Re-rolled spawn interval bounds after each obstacle (ms)
    pub obstacle_interval_min_ms: f64,
    pub obstacle_interval_max_ms: f64,
    /// Uniform jitter added on top of the base speed at spawn (px/tick)
    pub speed_jitter_max: f32,

    // === Decoration spawning ===
    /// Re-rolled spawn interval bounds for decorations (ms)
    pub decor_interval_min_ms: f64,
    pub decor_interval_max_ms: f64,
    /// Decorations scroll at a fixed speed (px/tick)
    pub decor_speed: f32,

    // === Difficulty ramp ===
    /// Base obstacle speed at run start (px/tick)
    pub initial_base_speed: f32,
    /// Speed added per ramp step
    pub difficulty_step: f32,
    /// Elapsed seconds between ramp steps
    pub difficulty_interval_secs: u64,
    /// Speed increase over which the obstacle color sweeps blue to red
    pub difficulty_color_span: f32,

    // === Pose challenges ===
    /// Running time before the next challenge fires (ms)
    pub idle_before_challenge_ms: f64,
    /// Time the player has to strike the pose (ms)
    pub countdown_ms: f64,
    /// Time the pass/fail result stays on screen (ms)
    pub result_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            obstacle_first_delay_ms: 2000.0,
            obstacle_interval_min_ms: 1500.0,
            obstacle_interval_max_ms: 3000.0,
            speed_jitter_max: 1.0,

            decor_interval_min_ms: 800.0,
            decor_interval_max_ms: 2000.0,
            decor_speed: 2.0,

            initial_base_speed: 3.0,
            difficulty_step: 1.0,
            difficulty_interval_secs: 5,
            difficulty_color_span: 10.0,

            idle_before_challenge_ms: 3000.0,
            countdown_ms: 5000.0,
            result_ms: 2000.0,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON. Unknown or missing fields fall back
    /// to the defaults; a malformed document is ignored entirely.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring malformed tuning JSON: {e}");
                Self::default()
            }
        }
    }
}
