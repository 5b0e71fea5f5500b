//! Per-frame simulation tick
//!
//! One tick per rendered frame, driven by the host's monotonic millisecond
//! clock. Entity motion is per-tick; the timers (spawn cadence, difficulty
//! cadence, challenge phases, the survival clock) are all
//! timestamp-difference based.
//!
//! Order within a tick: survival clock, challenge machine, then (only while
//! running) input, difficulty, spawning, motion, collision. The challenge
//! machine goes first so a freeze takes hold the same frame it fires.

use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::sweep_player_hits;
use super::pause::advance_challenge;
use super::state::{DECOR_COLOR, Decoration, GameState, Obstacle};
use super::track::{Lane, Side};
use crate::consts::*;
use crate::providers::{AssetProvider, PoseSource};

/// Input commands for a single tick. One-shot flags; the platform layer
/// clears them after each tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Shift one lane toward the left
    pub move_left: bool,
    /// Shift one lane toward the right
    pub move_right: bool,
    /// Restart from the game-over screen
    pub restart: bool,
}

/// Advance the game state by one frame
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    now_ms: f64,
    assets: &mut dyn AssetProvider,
    pose_source: &dyn PoseSource,
) {
    // Restart is only honored on the game-over screen
    if input.restart && state.over {
        state.restart(now_ms);
        return;
    }

    state.update_elapsed(now_ms);

    advance_challenge(state, now_ms, assets, pose_source);

    // The terminal screen and challenge freezes hold the world still; the
    // survival clock above is the only thing that keeps moving
    if state.over || state.challenge.is_frozen() {
        return;
    }

    // Lane changes are discrete; easing runs every running tick
    if input.move_left {
        state.player.lane = state.player.lane.shifted_left();
    }
    if input.move_right {
        state.player.lane = state.player.lane.shifted_right();
    }
    state.player.ease_toward_lane(&state.track);

    // Difficulty step is carried to every live obstacle so per-obstacle
    // jitter offsets survive the ramp
    if state.difficulty.due(state.elapsed_secs, &state.tuning) {
        let delta = state.difficulty.bump(state.elapsed_secs, &state.tuning);
        let color = state.difficulty.color(&state.tuning);
        for o in &mut state.obstacles {
            o.speed += delta;
            o.color = color;
        }
    }

    // Spawners, each on its own deadline and RNG stream
    if now_ms > state.next_obstacle_at_ms {
        spawn_obstacle(state, assets);
        let interval = roll_interval(
            &mut state.rng.obstacles,
            state.tuning.obstacle_interval_min_ms,
            state.tuning.obstacle_interval_max_ms,
        );
        state.next_obstacle_at_ms = now_ms + interval;
    }
    if now_ms > state.next_decor_at_ms {
        spawn_decoration(state);
        let interval = roll_interval(
            &mut state.rng.decor_timer,
            state.tuning.decor_interval_min_ms,
            state.tuning.decor_interval_max_ms,
        );
        state.next_decor_at_ms = now_ms + interval;
    }

    // Motion, late sprite acquisition, culling
    for o in &mut state.obstacles {
        o.advance(&state.track);
        if o.sprite.is_none() {
            o.sprite = assets.random_obstacle();
        }
    }
    state.obstacles.retain(|o| !o.off_screen(&state.track));

    for d in &mut state.decorations {
        d.advance(&state.track);
    }
    state.decorations.retain(|d| !d.off_screen(&state.track));

    sweep_player_hits(state);
}

fn roll_interval(rng: &mut Pcg32, min_ms: f64, max_ms: f64) -> f64 {
    if max_ms > min_ms {
        rng.random_range(min_ms..max_ms)
    } else {
        min_ms
    }
}

fn spawn_obstacle(state: &mut GameState, assets: &mut dyn AssetProvider) {
    let id = state.next_entity_id();
    let lane = Lane::from_index(state.rng.lanes.random_range(0..LANE_COUNT));
    let depth = state.track.spawn_y();
    let jitter = if state.tuning.speed_jitter_max > 0.0 {
        state
            .rng
            .obstacles
            .random_range(0.0..state.tuning.speed_jitter_max)
    } else {
        0.0
    };
    let size = OBSTACLE_BASE_SIZE * state.track.scale_at(state.track.depth_fraction(depth));
    state.obstacles.push(Obstacle {
        id,
        lane,
        depth,
        base_size: OBSTACLE_BASE_SIZE,
        size,
        speed: state.difficulty.base_speed + jitter,
        color: state.difficulty.color(&state.tuning),
        sprite: assets.random_obstacle(),
    });
}

fn spawn_decoration(state: &mut GameState) {
    let id = state.next_entity_id();
    let side = if state.rng.decor_place.random_bool(0.5) {
        Side::Left
    } else {
        Side::Right
    };
    let (min_offset, max_offset) = state.track.decor_offset_range();
    let horizon_offset = state.rng.decor_place.random_range(min_offset..max_offset);
    state.decorations.push(Decoration {
        id,
        side,
        horizon_offset,
        // Decorations enter exactly at the horizon line
        depth: state.track.horizon_y,
        base_size: DECOR_BASE_SIZE,
        size: DECOR_BASE_SIZE * DECOR_MIN_SCALE,
        speed: state.tuning.decor_speed,
        color: DECOR_COLOR,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{NullAssets, NullPoseSource, SpriteHandle};
    use crate::tuning::Tuning;

    const W: f32 = 1200.0;
    const H: f32 = 900.0;
    const FRAME_MS: f64 = 16.0;

    /// Tuning with challenges pushed out of the way, for world-only tests
    fn no_challenge_tuning() -> Tuning {
        Tuning {
            idle_before_challenge_ms: 1e12,
            ..Tuning::default()
        }
    }

    /// Step empty-input frames from `from_ms` up to and including `to_ms`
    fn run(state: &mut GameState, from_ms: f64, to_ms: f64) {
        let mut assets = NullAssets;
        let mut t = from_ms;
        while t <= to_ms {
            tick(state, &TickInput::default(), t, &mut assets, &NullPoseSource);
            t += FRAME_MS;
        }
    }

    /// Obstacle planted directly on the player for collision scenarios
    fn plant_obstacle_on_player(state: &mut GameState) {
        let id = state.next_entity_id();
        let depth = state.track.player_y();
        let size = OBSTACLE_BASE_SIZE * state.track.scale_at(state.track.depth_fraction(depth));
        let lane = state.player.lane;
        state.obstacles.push(Obstacle {
            id,
            lane,
            depth,
            base_size: OBSTACLE_BASE_SIZE,
            size,
            speed: 3.0,
            color: DECOR_COLOR,
            sprite: None,
        });
    }

    #[test]
    fn test_first_spawn_timing() {
        let mut s = GameState::new(11, W, H, 0.0, no_challenge_tuning());
        // The first decoration lands immediately, the first obstacle only
        // after the fixed initial delay
        run(&mut s, 0.0, 1900.0);
        assert!(s.obstacles.is_empty());
        assert!(!s.decorations.is_empty());

        run(&mut s, 1904.0, 2100.0);
        assert_eq!(s.obstacles.len(), 1);
        // Fresh obstacles are blue and carry bounded speed jitter
        let o = &s.obstacles[0];
        assert_eq!(o.color.b, 255);
        assert!(o.speed >= s.tuning.initial_base_speed);
        assert!(o.speed < s.tuning.initial_base_speed + s.tuning.speed_jitter_max);
    }

    #[test]
    fn test_spawn_deadline_rearmed_in_window() {
        let mut s = GameState::new(12, W, H, 0.0, no_challenge_tuning());
        run(&mut s, 0.0, 2100.0);
        assert_eq!(s.obstacles.len(), 1);
        // The next deadline sits one configured interval past the spawn tick
        assert!(s.next_obstacle_at_ms > 2000.0 + s.tuning.obstacle_interval_min_ms);
        assert!(s.next_obstacle_at_ms < 2100.0 + s.tuning.obstacle_interval_max_ms);
    }

    #[test]
    fn test_determinism_same_seed_same_world() {
        let mut a = GameState::new(77, W, H, 0.0, no_challenge_tuning());
        let mut b = GameState::new(77, W, H, 0.0, no_challenge_tuning());
        run(&mut a, 0.0, 12_000.0);
        run(&mut b, 0.0, 12_000.0);

        assert!(!a.obstacles.is_empty());
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        for (x, y) in a.obstacles.iter().zip(&b.obstacles) {
            assert_eq!(x.lane, y.lane);
            assert_eq!(x.depth, y.depth);
            assert_eq!(x.speed, y.speed);
        }
        assert_eq!(a.decorations.len(), b.decorations.len());
    }

    #[test]
    fn test_difficulty_ramp_recolors_live_obstacles() {
        let mut s = GameState::new(13, W, H, 0.0, no_challenge_tuning());
        run(&mut s, 0.0, 4800.0);
        assert_eq!(s.difficulty.base_speed, 3.0);
        let before: Vec<(u32, f32)> = s.obstacles.iter().map(|o| (o.id, o.speed)).collect();
        assert!(!before.is_empty());

        run(&mut s, 4816.0, 5100.0);
        assert_eq!(s.difficulty.base_speed, 4.0);
        let ramp_color = s.difficulty.color(&s.tuning);
        for o in &s.obstacles {
            assert_eq!(o.color, ramp_color);
            // Survivors keep their per-obstacle jitter, shifted by the step
            if let Some((_, old_speed)) = before.iter().find(|(id, _)| *id == o.id) {
                assert!((o.speed - old_speed - 1.0).abs() < 0.001);
            }
        }
    }

    #[test]
    fn test_collision_takes_life_and_obstacle() {
        let mut s = GameState::new(14, W, H, 0.0, no_challenge_tuning());
        plant_obstacle_on_player(&mut s);
        let mut assets = NullAssets;
        tick(
            &mut s,
            &TickInput::default(),
            16.0,
            &mut assets,
            &NullPoseSource,
        );
        assert_eq!(s.lives, STARTING_LIVES - 1);
        assert!(s.obstacles.is_empty());
        assert!(!s.over);
    }

    #[test]
    fn test_three_collisions_end_the_run() {
        let mut s = GameState::new(15, W, H, 0.0, no_challenge_tuning());
        let mut assets = NullAssets;
        for i in 0..3u32 {
            plant_obstacle_on_player(&mut s);
            let t = 7000.0 + f64::from(i) * FRAME_MS;
            tick(&mut s, &TickInput::default(), t, &mut assets, &NullPoseSource);
        }
        assert_eq!(s.lives, 0);
        assert!(s.over);
        assert_eq!(s.final_secs, 7);

        // The terminal screen is frozen: clock, spawning, and motion all
        // stop. Start from a lone parked obstacle so a stray spawn or move
        // would show up in the count or the depth.
        s.obstacles.clear();
        plant_obstacle_on_player(&mut s);
        let parked_depth = s.obstacles[0].depth;
        run(&mut s, 8000.0, 20_000.0);
        assert_eq!(s.elapsed_secs, 7);
        assert_eq!(s.obstacles.len(), 1);
        assert_eq!(s.obstacles[0].depth, parked_depth);
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let mut s = GameState::new(16, W, H, 0.0, no_challenge_tuning());
        let mut assets = NullAssets;
        let restart = TickInput {
            restart: true,
            ..TickInput::default()
        };

        // Ignored during normal play
        run(&mut s, 0.0, 2500.0);
        tick(&mut s, &restart, 2516.0, &mut assets, &NullPoseSource);
        assert!(!s.obstacles.is_empty());
        assert_eq!(s.lives, STARTING_LIVES);
        assert_eq!(s.elapsed_secs, 2);

        // End the run, then restart
        s.lives = 1;
        plant_obstacle_on_player(&mut s);
        tick(
            &mut s,
            &TickInput::default(),
            2532.0,
            &mut assets,
            &NullPoseSource,
        );
        assert!(s.over);

        tick(&mut s, &restart, 9000.0, &mut assets, &NullPoseSource);
        assert!(!s.over);
        assert_eq!(s.lives, STARTING_LIVES);
        assert!(s.obstacles.is_empty());
        assert_eq!(s.elapsed_secs, 0);
        assert_eq!(s.difficulty.base_speed, s.tuning.initial_base_speed);

        // The fresh run spawns on the fresh schedule
        run(&mut s, 9016.0, 11_016.0);
        assert_eq!(s.obstacles.len(), 1);
    }

    #[test]
    fn test_lane_input_moves_player() {
        let mut s = GameState::new(17, W, H, 0.0, no_challenge_tuning());
        let mut assets = NullAssets;
        let right = TickInput {
            move_right: true,
            ..TickInput::default()
        };

        tick(&mut s, &right, 16.0, &mut assets, &NullPoseSource);
        assert_eq!(s.player.lane, Lane::Right);
        // Saturates at the edge lane
        tick(&mut s, &right, 32.0, &mut assets, &NullPoseSource);
        assert_eq!(s.player.lane, Lane::Right);

        // Easing moves x toward the new lane without teleporting
        let target = s.track.lane_center_x(Lane::Right, s.track.player_t());
        assert!(s.player.x < target);
        run(&mut s, 48.0, 2000.0);
        assert!((s.player.x - target).abs() < 1.0);
    }

    #[test]
    fn test_challenge_freeze_halts_world_but_not_clock() {
        let mut s = GameState::new(18, W, H, 0.0, Tuning::default());
        // Challenge fires at 3000; one obstacle is live by then
        run(&mut s, 0.0, 3008.0);
        assert!(s.challenge.is_frozen());
        assert_eq!(s.obstacles.len(), 1);
        let frozen_depth = s.obstacles[0].depth;
        let frozen_count = s.decorations.len();

        run(&mut s, 3024.0, 7990.0);
        assert!(s.challenge.is_frozen());
        assert_eq!(s.obstacles[0].depth, frozen_depth);
        assert_eq!(s.decorations.len(), frozen_count);
        // The survival clock keeps running through the freeze
        assert_eq!(s.elapsed_secs, 7);
        // The ramp is held back while frozen
        assert_eq!(s.difficulty.base_speed, 3.0);
    }

    #[test]
    fn test_challenge_cycle_resumes_world() {
        let mut s = GameState::new(18, W, H, 0.0, Tuning::default());
        run(&mut s, 0.0, 3008.0);
        let frozen_depth = s.obstacles[0].depth;

        // Past the countdown deadline: validation fails (no camera), one
        // life goes, the result dwells, then play resumes
        run(&mut s, 3024.0, 8032.0);
        assert_eq!(s.lives, STARTING_LIVES - 1);
        run(&mut s, 8048.0, 10_064.0);
        assert!(!s.challenge.is_frozen());

        // The world moves again and the deferred ramp lands on resume
        run(&mut s, 10_080.0, 10_112.0);
        assert!(s.obstacles.iter().all(|o| o.depth != frozen_depth));
        assert_eq!(s.difficulty.base_speed, 4.0);
    }

    #[test]
    fn test_sprite_acquired_late() {
        /// Assets that come online after a few calls, like images still
        /// decoding in the host page
        struct LateAssets {
            calls: u32,
            ready_after: u32,
        }

        impl AssetProvider for LateAssets {
            fn random_obstacle(&mut self) -> Option<SpriteHandle> {
                self.calls += 1;
                (self.calls > self.ready_after).then_some(SpriteHandle(7))
            }

            fn advance_theme(&mut self) {}
        }

        let mut s = GameState::new(19, W, H, 0.0, no_challenge_tuning());
        let mut assets = LateAssets {
            calls: 0,
            ready_after: 3,
        };

        let mut t = 0.0;
        while s.obstacles.is_empty() {
            tick(&mut s, &TickInput::default(), t, &mut assets, &NullPoseSource);
            t += FRAME_MS;
        }
        assert!(s.obstacles[0].sprite.is_none());

        for _ in 0..4 {
            tick(&mut s, &TickInput::default(), t, &mut assets, &NullPoseSource);
            t += FRAME_MS;
        }
        assert_eq!(s.obstacles[0].sprite, Some(SpriteHandle(7)));
    }

    #[test]
    fn test_obstacles_cull_off_screen() {
        let mut s = GameState::new(20, W, H, 0.0, no_challenge_tuning());
        let id = s.next_entity_id();
        s.obstacles.push(Obstacle {
            id,
            lane: Lane::Center,
            depth: H - 1.0,
            base_size: OBSTACLE_BASE_SIZE,
            size: OBSTACLE_BASE_SIZE,
            speed: 200.0,
            color: DECOR_COLOR,
            sprite: None,
        });
        let mut assets = NullAssets;
        tick(
            &mut s,
            &TickInput::default(),
            16.0,
            &mut assets,
            &NullPoseSource,
        );
        tick(
            &mut s,
            &TickInput::default(),
            32.0,
            &mut assets,
            &NullPoseSource,
        );
        assert!(s.obstacles.is_empty());
    }
}
