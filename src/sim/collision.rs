//! Collision detection
//!
//! Player versus obstacles is plain circle against circle in screen space:
//! a hit when the center distance drops under the sum of the radii. Entity
//! sizes are diameters, so radii are size/2. A hit removes the obstacle on
//! the spot, which is what makes double-counting impossible.

use glam::Vec2;

use super::state::GameState;

/// Circle overlap test on diameters, matching how entity sizes are stored
#[inline]
pub fn circles_overlap(a: Vec2, a_size: f32, b: Vec2, b_size: f32) -> bool {
    a.distance(b) < a_size / 2.0 + b_size / 2.0
}

/// Remove every obstacle overlapping the player and take one life per hit.
/// Returns the number of hits this tick.
pub fn sweep_player_hits(state: &mut GameState) -> usize {
    let player_pos = state.player.pos(&state.track);
    let player_size = state.player.size;
    let track = &state.track;

    let hit_ids: Vec<u32> = state
        .obstacles
        .iter()
        .filter(|o| circles_overlap(player_pos, player_size, o.pos(track), o.size))
        .map(|o| o.id)
        .collect();

    if hit_ids.is_empty() {
        return 0;
    }

    state.obstacles.retain(|o| !hit_ids.contains(&o.id));
    for _ in &hit_ids {
        state.lose_life();
    }
    hit_ids.len()
}
