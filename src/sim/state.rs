//! Game state and core simulation types
//!
//! Everything the tick loop advances lives here. Entity screen positions and
//! sizes are derived from lane/depth through the Track every frame; `depth`
//! (screen y in pixels) is the only motion state an entity carries.

use glam::Vec2;

use super::difficulty::{Difficulty, Rgb};
use super::pause::Challenge;
use super::rng::RngStreams;
use super::track::{Lane, Side, Track};
use crate::consts::*;
use crate::lerp;
use crate::providers::SpriteHandle;
use crate::tuning::Tuning;

/// Fallback tint for decorations
pub const DECOR_COLOR: Rgb = Rgb {
    r: 255,
    g: 165,
    b: 0,
};

/// The player avatar. Lane changes are discrete; the drawn x eases toward
/// the lane center so the avatar never teleports.
#[derive(Debug, Clone)]
pub struct Player {
    pub lane: Lane,
    /// Smoothed screen x
    pub x: f32,
    /// Scaled diameter at the player row
    pub size: f32,
}

impl Player {
    pub fn new(track: &Track) -> Self {
        let t = track.player_t();
        Self {
            lane: Lane::Center,
            x: track.lane_center_x(Lane::Center, t),
            size: PLAYER_BASE_SIZE * track.scale_at(t),
        }
    }

    /// One easing step toward the current lane center
    pub fn ease_toward_lane(&mut self, track: &Track) {
        let t = track.player_t();
        let target = track.lane_center_x(self.lane, t);
        self.x = lerp(self.x, target, PLAYER_EASE);
        self.size = PLAYER_BASE_SIZE * track.scale_at(t);
    }

    pub fn pos(&self, track: &Track) -> Vec2 {
        Vec2::new(self.x, track.player_y())
    }
}

/// An obstacle sliding down one lane
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub lane: Lane,
    /// World y in screen pixels, advanced by `speed` each tick
    pub depth: f32,
    pub base_size: f32,
    /// Scaled diameter, derived from depth
    pub size: f32,
    /// Pixels per tick
    pub speed: f32,
    /// Difficulty tint at spawn, refreshed on every ramp step
    pub color: Rgb,
    /// Sprite to draw with; None falls back to the tint and is retried
    /// while the host is still loading images
    pub sprite: Option<SpriteHandle>,
}

impl Obstacle {
    /// Screen position derived from lane and depth
    pub fn pos(&self, track: &Track) -> Vec2 {
        let t = track.depth_fraction(self.depth);
        Vec2::new(track.lane_center_x(self.lane, t), self.depth)
    }

    /// Advance one tick and refresh the derived size
    pub fn advance(&mut self, track: &Track) {
        self.depth += self.speed;
        self.size = self.base_size * track.scale_at(track.depth_fraction(self.depth));
    }

    /// Fully past the bottom edge
    pub fn off_screen(&self, track: &Track) -> bool {
        self.depth - self.size > track.view_h
    }
}

/// Scenery drifting past on either side of the track
#[derive(Debug, Clone)]
pub struct Decoration {
    pub id: u32,
    pub side: Side,
    /// Distance from the screen centerline at the horizon
    pub horizon_offset: f32,
    pub depth: f32,
    pub base_size: f32,
    pub size: f32,
    pub speed: f32,
    pub color: Rgb,
}

impl Decoration {
    pub fn pos(&self, track: &Track) -> Vec2 {
        let t = track.depth_fraction(self.depth);
        Vec2::new(track.side_offset_x(self.side, self.horizon_offset, t), self.depth)
    }

    pub fn advance(&mut self, track: &Track) {
        self.depth += self.speed;
        self.size = self.base_size * track.decor_scale_at(track.depth_fraction(self.depth));
    }

    pub fn off_screen(&self, track: &Track) -> bool {
        self.depth - self.size > track.view_h
    }
}

/// Complete game state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Balance values this run was started with
    pub tuning: Tuning,
    /// Projection for the current viewport
    pub track: Track,
    /// Named RNG streams derived from the run seed
    pub rng: RngStreams,
    pub player: Player,
    /// Live obstacles, in spawn (id) order
    pub obstacles: Vec<Obstacle>,
    /// Live decorations, in spawn (id) order
    pub decorations: Vec<Decoration>,
    pub lives: u8,
    /// Timestamp the run started at
    pub start_ms: f64,
    /// Whole seconds survived so far; frozen once the run ends
    pub elapsed_secs: u64,
    /// Terminal latch
    pub over: bool,
    /// Survival time recorded at the moment the run ended
    pub final_secs: u64,
    pub difficulty: Difficulty,
    /// Deadline for the next obstacle spawn
    pub next_obstacle_at_ms: f64,
    /// Deadline for the next decoration spawn
    pub next_decor_at_ms: f64,
    /// Pose challenge state machine
    pub challenge: Challenge,
    next_id: u32,
}

impl GameState {
    /// Start a fresh run
    pub fn new(seed: u64, view_w: f32, view_h: f32, now_ms: f64, tuning: Tuning) -> Self {
        let track = Track::new(view_w, view_h);
        let player = Player::new(&track);
        let difficulty = Difficulty::new(&tuning);
        let next_obstacle_at_ms = now_ms + tuning.obstacle_first_delay_ms;
        Self {
            tuning,
            track,
            rng: RngStreams::new(seed),
            player,
            obstacles: Vec::new(),
            decorations: Vec::new(),
            lives: STARTING_LIVES,
            start_ms: now_ms,
            elapsed_secs: 0,
            over: false,
            final_secs: 0,
            difficulty,
            next_obstacle_at_ms,
            // First decoration lands on the first tick
            next_decor_at_ms: now_ms,
            challenge: Challenge::running(now_ms),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Refresh the survival clock. Frozen once the run is over so the
    /// recorded time stops moving under the game-over screen.
    pub fn update_elapsed(&mut self, now_ms: f64) {
        if !self.over {
            self.elapsed_secs = (((now_ms - self.start_ms) / 1000.0).floor()).max(0.0) as u64;
        }
    }

    /// Take one life. Latches the terminal state exactly once when the last
    /// life goes; further calls after that are no-ops.
    pub fn lose_life(&mut self) {
        if self.over {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.over = true;
            self.final_secs = self.elapsed_secs;
        }
    }

    /// Reset to a fresh run. RNG streams keep advancing; a restart is a new
    /// run, not a replay of the old one.
    pub fn restart(&mut self, now_ms: f64) {
        self.obstacles.clear();
        self.decorations.clear();
        self.player = Player::new(&self.track);
        self.lives = STARTING_LIVES;
        self.start_ms = now_ms;
        self.elapsed_secs = 0;
        self.over = false;
        self.final_secs = 0;
        self.difficulty = Difficulty::new(&self.tuning);
        self.next_obstacle_at_ms = now_ms + self.tuning.obstacle_first_delay_ms;
        self.next_decor_at_ms = now_ms;
        self.challenge = Challenge::running(now_ms);
    }
}
