//! Perspective track geometry
//!
//! The track is a trapezoid: a narrow edge at the horizon widening toward the
//! bottom of the screen. Everything that moves "into" the scene shares one
//! depth parameter t in [0, 1] (0 = horizon, 1 = bottom edge), and all screen
//! positions and sprite scales are derived from t here. The player, obstacles,
//! decorations, and the lane divider lines must all consult this struct so the
//! projection never drifts apart.

use crate::consts::*;
use crate::lerp;

/// One of the three lanes, left to right from the player's view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Left,
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::Left, Lane::Center, Lane::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Center => 1,
            Lane::Right => 2,
        }
    }

    /// Lane for a spawner roll in 0..LANE_COUNT
    pub fn from_index(index: usize) -> Lane {
        match index {
            0 => Lane::Left,
            1 => Lane::Center,
            _ => Lane::Right,
        }
    }

    /// One lane toward the left, stopping at the edge
    pub fn shifted_left(self) -> Lane {
        match self {
            Lane::Left | Lane::Center => Lane::Left,
            Lane::Right => Lane::Center,
        }
    }

    /// One lane toward the right, stopping at the edge
    pub fn shifted_right(self) -> Lane {
        match self {
            Lane::Left => Lane::Center,
            Lane::Center | Lane::Right => Lane::Right,
        }
    }
}

/// Which side of the track an off-track decoration lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Projection parameters for one viewport size
#[derive(Debug, Clone)]
pub struct Track {
    /// Viewport width in pixels
    pub view_w: f32,
    /// Viewport height in pixels
    pub view_h: f32,
    /// Screen y of the horizon line
    pub horizon_y: f32,
    /// Track width at the bottom edge
    pub bottom_width: f32,
    /// Track width at the horizon
    pub top_width: f32,
}

impl Track {
    pub fn new(view_w: f32, view_h: f32) -> Self {
        let bottom_width = view_w * TRACK_BOTTOM_FRACTION;
        Self {
            view_w,
            view_h,
            horizon_y: view_h * HORIZON_FRACTION,
            bottom_width,
            top_width: bottom_width * TRACK_TOP_RATIO,
        }
    }

    /// Depth parameter for a screen y: 0 at the horizon, 1 at the bottom edge.
    /// Positions above the horizon (spawn area) clamp to 0.
    #[inline]
    pub fn depth_fraction(&self, y: f32) -> f32 {
        ((y - self.horizon_y) / (self.view_h - self.horizon_y)).clamp(0.0, 1.0)
    }

    /// Center x of a lane at depth t
    pub fn lane_center_x(&self, lane: Lane, t: f32) -> f32 {
        let i = lane.index() as f32 + 0.5;
        let top = self.track_left(self.top_width) + self.top_width / LANE_COUNT as f32 * i;
        let bottom = self.track_left(self.bottom_width) + self.bottom_width / LANE_COUNT as f32 * i;
        lerp(top, bottom, t)
    }

    /// X of lane boundary `i` (0..=LANE_COUNT) at depth t. Boundary 0 is the
    /// left edge of the track, boundary LANE_COUNT the right edge.
    pub fn lane_edge_x(&self, i: usize, t: f32) -> f32 {
        let i = i.min(LANE_COUNT) as f32;
        let top = self.track_left(self.top_width) + self.top_width / LANE_COUNT as f32 * i;
        let bottom = self.track_left(self.bottom_width) + self.bottom_width / LANE_COUNT as f32 * i;
        lerp(top, bottom, t)
    }

    /// Sprite scale for on-track entities at depth t
    #[inline]
    pub fn scale_at(&self, t: f32) -> f32 {
        lerp(MIN_SCALE, MAX_SCALE, t)
    }

    /// Sprite scale for off-track decorations at depth t
    #[inline]
    pub fn decor_scale_at(&self, t: f32) -> f32 {
        lerp(DECOR_MIN_SCALE, DECOR_MAX_SCALE, t)
    }

    /// Screen x of a decoration that sits `offset` pixels from the screen
    /// center at the horizon. Decorations sweep outward super-linearly so
    /// they clear the widening track.
    pub fn side_offset_x(&self, side: Side, offset: f32, t: f32) -> f32 {
        self.view_w / 2.0 + side.sign() * offset * lerp(1.0, DECOR_SPREAD, t)
    }

    /// Horizon offsets decorations may spawn at: far enough out to never
    /// drift over the track, at most half the viewport
    pub fn decor_offset_range(&self) -> (f32, f32) {
        (self.top_width * DECOR_MIN_OFFSET_RATIO, self.view_w / 2.0)
    }

    /// Screen y of the player row
    #[inline]
    pub fn player_y(&self) -> f32 {
        self.view_h * PLAYER_ROW_FRACTION
    }

    /// Depth parameter of the player row
    #[inline]
    pub fn player_t(&self) -> f32 {
        self.depth_fraction(self.player_y())
    }

    /// Screen y where obstacles enter, above the horizon
    #[inline]
    pub fn spawn_y(&self) -> f32 {
        self.horizon_y - SPAWN_MARGIN
    }

    fn track_left(&self, width: f32) -> f32 {
        (self.view_w - width) / 2.0
    }
}
