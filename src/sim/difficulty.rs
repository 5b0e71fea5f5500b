//! Difficulty ramp
//!
//! The base obstacle speed climbs by a fixed step on a fixed cadence of
//! elapsed whole seconds, and every live obstacle is carried along so a ramp
//! is felt immediately. Obstacle color tracks the base speed from blue
//! (starting speed) to red (starting speed plus the full color span).

use serde::Serialize;

use crate::lerp;
use crate::tuning::Tuning;

/// sRGB color triple for snapshot consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Current difficulty state
#[derive(Debug, Clone)]
pub struct Difficulty {
    /// Speed newly spawned obstacles start from, before per-obstacle jitter
    pub base_speed: f32,
    /// Elapsed second the last bump landed on
    pub last_increase_secs: u64,
}

impl Difficulty {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            base_speed: tuning.initial_base_speed,
            last_increase_secs: 0,
        }
    }

    /// True once enough elapsed seconds have passed for the next bump
    pub fn due(&self, elapsed_secs: u64, tuning: &Tuning) -> bool {
        elapsed_secs >= self.last_increase_secs + tuning.difficulty_interval_secs
    }

    /// Apply one bump. Returns the speed delta the caller must propagate to
    /// live obstacles so their jitter offsets survive the ramp.
    pub fn bump(&mut self, elapsed_secs: u64, tuning: &Tuning) -> f32 {
        self.base_speed += tuning.difficulty_step;
        self.last_increase_secs = elapsed_secs;
        tuning.difficulty_step
    }

    /// Color for the current base speed
    pub fn color(&self, tuning: &Tuning) -> Rgb {
        speed_color(self.base_speed, tuning)
    }
}

/// Map a base speed onto the blue-to-red ramp. Pure and idempotent: the same
/// base speed always yields the same color, regardless of how many bumps led
/// there.
pub fn speed_color(base_speed: f32, tuning: &Tuning) -> Rgb {
    let t = ((base_speed - tuning.initial_base_speed) / tuning.difficulty_color_span)
        .clamp(0.0, 1.0);
    Rgb {
        r: lerp(0.0, 255.0, t).round() as u8,
        g: 0,
        b: lerp(255.0, 0.0, t).round() as u8,
    }
}
