//! Named RNG streams
//!
//! Every random decision in the sim draws from its own PCG stream, all derived
//! from the single run seed. Streams keep concerns decoupled: drawing an extra
//! decoration can never shift which lane the next obstacle lands in, so tests
//! can pin down one subsystem without replaying the others.

use rand_pcg::Pcg32;

/// Stream selectors, one per consumer
const LANES: u64 = 0;
const OBSTACLES: u64 = 1;
const DECOR_TIMER: u64 = 2;
const DECOR_PLACE: u64 = 3;
const POSES: u64 = 4;

/// All RNG streams for one run
#[derive(Debug, Clone)]
pub struct RngStreams {
    /// Run seed the streams were derived from
    pub seed: u64,
    /// Lane choice for obstacle spawns
    pub lanes: Pcg32,
    /// Obstacle spawn intervals and speed jitter
    pub obstacles: Pcg32,
    /// Decoration spawn intervals
    pub decor_timer: Pcg32,
    /// Decoration side and horizon offset
    pub decor_place: Pcg32,
    /// Challenge pose selection
    pub poses: Pcg32,
}

impl RngStreams {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            lanes: Pcg32::new(seed, LANES),
            obstacles: Pcg32::new(seed, OBSTACLES),
            decor_timer: Pcg32::new(seed, DECOR_TIMER),
            decor_place: Pcg32::new(seed, DECOR_PLACE),
            poses: Pcg32::new(seed, POSES),
        }
    }
}
