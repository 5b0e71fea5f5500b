//! Render snapshot
//!
//! A flat, serializable description of one frame: track geometry in screen
//! pixels, every entity at its projected position, HUD numbers, and the
//! challenge overlay when one is up. The host draws from this and nothing
//! else, so the simulation never touches a canvas.

use serde::Serialize;

use super::difficulty::Rgb;
use super::pause::ChallengeView;
use super::state::GameState;
use crate::consts::LANE_COUNT;

/// One lane boundary, from the horizon down to the bottom edge
#[derive(Debug, Clone, Serialize)]
pub struct LaneLine {
    pub top_x: f32,
    pub top_y: f32,
    pub bottom_x: f32,
    pub bottom_y: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Rgb,
    /// Host-side sprite index, None while the image is still loading
    pub sprite: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecorView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Serialize)]
pub struct HudView {
    pub lives: u8,
    pub elapsed_secs: u64,
    pub over: bool,
    /// Survival time to show on the game-over screen
    pub final_secs: u64,
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub view_w: f32,
    pub view_h: f32,
    pub horizon_y: f32,
    /// Four boundaries for three lanes, ordered left to right
    pub lane_lines: Vec<LaneLine>,
    pub player: PlayerView,
    /// Back to front, the order they were spawned in
    pub obstacles: Vec<ObstacleView>,
    pub decorations: Vec<DecorView>,
    pub hud: HudView,
    /// Present only while a challenge is up
    pub challenge: Option<ChallengeView>,
}

/// Project the current state for the host renderer
pub fn snapshot(state: &GameState, now_ms: f64) -> RenderSnapshot {
    let track = &state.track;

    let lane_lines = (0..=LANE_COUNT)
        .map(|i| LaneLine {
            top_x: track.lane_edge_x(i, 0.0),
            top_y: track.horizon_y,
            bottom_x: track.lane_edge_x(i, 1.0),
            bottom_y: track.view_h,
        })
        .collect();

    let obstacles = state
        .obstacles
        .iter()
        .map(|o| {
            let p = o.pos(track);
            ObstacleView {
                x: p.x,
                y: p.y,
                size: o.size,
                color: o.color,
                sprite: o.sprite.map(|s| s.0),
            }
        })
        .collect();

    let decorations = state
        .decorations
        .iter()
        .map(|d| {
            let p = d.pos(track);
            DecorView {
                x: p.x,
                y: p.y,
                size: d.size,
                color: d.color,
            }
        })
        .collect();

    RenderSnapshot {
        view_w: track.view_w,
        view_h: track.view_h,
        horizon_y: track.horizon_y,
        lane_lines,
        player: PlayerView {
            x: state.player.x,
            y: track.player_y(),
            size: state.player.size,
        },
        obstacles,
        decorations,
        hud: HudView {
            lives: state.lives,
            elapsed_secs: state.elapsed_secs,
            over: state.over,
            final_secs: state.final_secs,
        },
        challenge: state.challenge.view(now_ms, track, &state.tuning),
    }
}
