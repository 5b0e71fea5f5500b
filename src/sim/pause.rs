//! Pose challenge state machine
//!
//! Play is periodically interrupted by a frozen-world challenge: a target
//! pose is drawn, the player gets a countdown to strike it in front of the
//! webcam, validation runs exactly once at the deadline, and the verdict
//! dwells on screen before play resumes. A failed pose costs a life through
//! the same latch as a collision, so a challenge can end the run.
//!
//! There is no cancel path. The only way out of a challenge is through
//! validation (or the run ending mid-freeze).

use rand::Rng;
use serde::Serialize;

use super::pose::{PoseName, TrackedJoint, ValidationReport, validate, zone_centers};
use super::state::GameState;
use super::track::Track;
use crate::consts::HIT_ZONE_RADIUS;
use crate::providers::{AssetProvider, PoseSource};
use crate::tuning::Tuning;

/// Where the challenge machine is
#[derive(Debug, Clone)]
pub enum Challenge {
    /// Normal play. The next challenge fires once the idle window passes.
    Running { resumed_at_ms: f64 },
    /// World frozen, player striking the pose before the deadline
    Countdown { target: PoseName, started_ms: f64 },
    /// Verdict on screen before play resumes
    Result {
        target: PoseName,
        report: ValidationReport,
        shown_at_ms: f64,
    },
}

impl Challenge {
    pub fn running(now_ms: f64) -> Self {
        Challenge::Running {
            resumed_at_ms: now_ms,
        }
    }

    /// True while the world (motion, spawning, difficulty) is held still
    pub fn is_frozen(&self) -> bool {
        !matches!(self, Challenge::Running { .. })
    }

    /// Overlay data for the current frame, None during normal play
    pub fn view(&self, now_ms: f64, track: &Track, tuning: &Tuning) -> Option<ChallengeView> {
        match self {
            Challenge::Running { .. } => None,
            Challenge::Countdown { target, started_ms } => Some(ChallengeView {
                pose: *target,
                countdown: countdown_display(now_ms - started_ms, tuning),
                zones: zone_views(*target, track),
                result: None,
            }),
            Challenge::Result { target, report, .. } => Some(ChallengeView {
                pose: *target,
                countdown: 0,
                zones: zone_views(*target, track),
                result: Some(report.clone()),
            }),
        }
    }
}

/// Whole seconds left on the countdown, floored at zero
fn countdown_display(elapsed_ms: f64, tuning: &Tuning) -> u32 {
    ((tuning.countdown_ms - elapsed_ms) / 1000.0).ceil().max(0.0) as u32
}

/// One zone circle for the overlay
#[derive(Debug, Clone, Serialize)]
pub struct ZoneView {
    pub joint: TrackedJoint,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

fn zone_views(pose: PoseName, track: &Track) -> Vec<ZoneView> {
    zone_centers(pose, track.view_w, track.view_h)
        .into_iter()
        .map(|(joint, center)| ZoneView {
            joint,
            x: center.x,
            y: center.y,
            radius: HIT_ZONE_RADIUS,
        })
        .collect()
}

/// Challenge overlay for one frame
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeView {
    pub pose: PoseName,
    /// Whole seconds left to strike the pose
    pub countdown: u32,
    /// Zone circles in display pixels
    pub zones: Vec<ZoneView>,
    /// Verdict, present during the result dwell
    pub result: Option<ValidationReport>,
}

/// Drive the challenge machine one step. Runs every tick, before any world
/// update, so a freeze takes hold the same frame it fires.
pub fn advance_challenge(
    state: &mut GameState,
    now_ms: f64,
    assets: &mut dyn AssetProvider,
    pose_source: &dyn PoseSource,
) {
    if state.over {
        // A run that ends mid-challenge drops straight to the terminal
        // screen; no countdown or verdict lingers over it
        if state.challenge.is_frozen() {
            state.challenge = Challenge::running(now_ms);
        }
        return;
    }

    match state.challenge {
        Challenge::Running { resumed_at_ms } => {
            if now_ms - resumed_at_ms >= state.tuning.idle_before_challenge_ms {
                let target =
                    PoseName::ALL[state.rng.poses.random_range(0..PoseName::ALL.len())];
                state.challenge = Challenge::Countdown {
                    target,
                    started_ms: now_ms,
                };
            }
        }
        Challenge::Countdown { target, started_ms } => {
            if now_ms - started_ms > state.tuning.countdown_ms {
                // The one and only validation for this challenge
                let frame = pose_source.current();
                let report = validate(
                    frame.as_ref(),
                    target.as_str(),
                    state.track.view_w,
                    state.track.view_h,
                );
                if !report.valid {
                    state.lose_life();
                }
                // Theme rotates after every challenge, pass or fail
                assets.advance_theme();

                if state.over {
                    state.challenge = Challenge::running(now_ms);
                } else {
                    state.challenge = Challenge::Result {
                        target,
                        report,
                        shown_at_ms: now_ms,
                    };
                }
            }
        }
        Challenge::Result { shown_at_ms, .. } => {
            if now_ms - shown_at_ms >= state.tuning.result_ms {
                // Resuming restarts the idle window
                state.challenge = Challenge::running(now_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::STARTING_LIVES;
    use crate::providers::NullPoseSource;
    use crate::sim::pose::{Keypoint, PoseFrame};

    /// Pose source returning a fixed frame
    struct FixedPose(Option<PoseFrame>);

    impl PoseSource for FixedPose {
        fn current(&self) -> Option<PoseFrame> {
            self.0.clone()
        }
    }

    /// Asset provider that counts theme rotations
    #[derive(Default)]
    struct CountingAssets {
        theme_advances: u32,
    }

    impl AssetProvider for CountingAssets {
        fn random_obstacle(&mut self) -> Option<crate::providers::SpriteHandle> {
            None
        }

        fn advance_theme(&mut self) {
            self.theme_advances += 1;
        }
    }

    const W: f32 = 1200.0;
    const H: f32 = 900.0;

    fn state_at(now_ms: f64) -> GameState {
        GameState::new(3, W, H, now_ms, Tuning::default())
    }

    /// A frame whose joints sit exactly on the target zones
    fn matching_frame(pose: PoseName) -> PoseFrame {
        let mut keypoints = vec![
            Keypoint {
                x: 0.0,
                y: 0.0,
                confidence: 0.0,
            };
            17
        ];
        for (joint, center) in zone_centers(pose, W, H) {
            keypoints[joint.coco_index()] = Keypoint {
                x: W - center.x,
                y: center.y,
                confidence: 0.9,
            };
        }
        PoseFrame {
            keypoints,
            capture_w: W,
            capture_h: H,
        }
    }

    fn target_of(state: &GameState) -> PoseName {
        match state.challenge {
            Challenge::Countdown { target, .. } => target,
            _ => panic!("not in countdown"),
        }
    }

    #[test]
    fn test_fires_after_idle_window() {
        let mut s = state_at(0.0);
        let mut assets = CountingAssets::default();

        advance_challenge(&mut s, 2999.0, &mut assets, &NullPoseSource);
        assert!(!s.challenge.is_frozen());

        advance_challenge(&mut s, 3000.0, &mut assets, &NullPoseSource);
        assert!(s.challenge.is_frozen());
        assert!(matches!(s.challenge, Challenge::Countdown { .. }));
    }

    #[test]
    fn test_countdown_display_values() {
        let tuning = Tuning::default();
        assert_eq!(countdown_display(0.0, &tuning), 5);
        assert_eq!(countdown_display(999.0, &tuning), 5);
        assert_eq!(countdown_display(1000.0, &tuning), 4);
        assert_eq!(countdown_display(4999.0, &tuning), 1);
        assert_eq!(countdown_display(5000.0, &tuning), 0);
        assert_eq!(countdown_display(9000.0, &tuning), 0);
    }

    #[test]
    fn test_failed_validation_costs_a_life() {
        let mut s = state_at(0.0);
        let mut assets = CountingAssets::default();

        advance_challenge(&mut s, 3000.0, &mut assets, &NullPoseSource);
        // Deadline not yet passed: still counting, no validation
        advance_challenge(&mut s, 8000.0, &mut assets, &NullPoseSource);
        assert!(matches!(s.challenge, Challenge::Countdown { .. }));
        assert_eq!(s.lives, STARTING_LIVES);

        advance_challenge(&mut s, 8001.0, &mut assets, &NullPoseSource);
        assert_eq!(s.lives, STARTING_LIVES - 1);
        match &s.challenge {
            Challenge::Result { report, .. } => {
                assert!(!report.valid);
                assert_eq!(report.message, "No person detected");
            }
            other => panic!("expected result, got {other:?}"),
        }
        assert_eq!(assets.theme_advances, 1);
    }

    #[test]
    fn test_passed_validation_keeps_lives() {
        let mut s = state_at(0.0);
        let mut assets = CountingAssets::default();

        advance_challenge(&mut s, 3000.0, &mut assets, &NullPoseSource);
        let pose = FixedPose(Some(matching_frame(target_of(&s))));

        advance_challenge(&mut s, 8001.0, &mut assets, &pose);
        assert_eq!(s.lives, STARTING_LIVES);
        match &s.challenge {
            Challenge::Result { report, .. } => {
                assert!(report.valid);
                assert_eq!(report.matched, 6);
            }
            other => panic!("expected result, got {other:?}"),
        }
        // Theme rotates on success too
        assert_eq!(assets.theme_advances, 1);
    }

    #[test]
    fn test_result_dwell_then_resume() {
        let mut s = state_at(0.0);
        let mut assets = CountingAssets::default();

        advance_challenge(&mut s, 3000.0, &mut assets, &NullPoseSource);
        advance_challenge(&mut s, 8001.0, &mut assets, &NullPoseSource);

        advance_challenge(&mut s, 10_000.0, &mut assets, &NullPoseSource);
        assert!(matches!(s.challenge, Challenge::Result { .. }));

        advance_challenge(&mut s, 10_001.0, &mut assets, &NullPoseSource);
        match s.challenge {
            Challenge::Running { resumed_at_ms } => assert_eq!(resumed_at_ms, 10_001.0),
            ref other => panic!("expected running, got {other:?}"),
        }

        // Idle window restarts from the resume, not from run start
        advance_challenge(&mut s, 13_000.0, &mut assets, &NullPoseSource);
        assert!(!s.challenge.is_frozen());
        advance_challenge(&mut s, 13_001.0, &mut assets, &NullPoseSource);
        assert!(s.challenge.is_frozen());
    }

    #[test]
    fn test_validation_runs_exactly_once() {
        let mut s = state_at(0.0);
        let mut assets = CountingAssets::default();

        advance_challenge(&mut s, 3000.0, &mut assets, &NullPoseSource);
        advance_challenge(&mut s, 8001.0, &mut assets, &NullPoseSource);
        let lives_after = s.lives;

        // Extra ticks inside the result dwell never re-validate
        for t in [8002.0, 8500.0, 9000.0, 9999.0] {
            advance_challenge(&mut s, t, &mut assets, &NullPoseSource);
        }
        assert_eq!(s.lives, lives_after);
        assert_eq!(assets.theme_advances, 1);
    }

    #[test]
    fn test_last_life_short_circuits_to_terminal() {
        let mut s = state_at(0.0);
        let mut assets = CountingAssets::default();
        s.lives = 1;

        advance_challenge(&mut s, 3000.0, &mut assets, &NullPoseSource);
        advance_challenge(&mut s, 8001.0, &mut assets, &NullPoseSource);

        assert!(s.over);
        // No result dwell over the game-over screen
        assert!(!s.challenge.is_frozen());
    }

    #[test]
    fn test_no_challenge_fires_when_over() {
        let mut s = state_at(0.0);
        let mut assets = CountingAssets::default();
        s.lives = 1;
        s.lose_life();

        advance_challenge(&mut s, 50_000.0, &mut assets, &NullPoseSource);
        assert!(!s.challenge.is_frozen());
        assert_eq!(assets.theme_advances, 0);
    }

    #[test]
    fn test_view_carries_zones_and_result() {
        let mut s = state_at(0.0);
        let mut assets = CountingAssets::default();
        let tuning = Tuning::default();

        assert!(s.challenge.view(0.0, &s.track, &tuning).is_none());

        advance_challenge(&mut s, 3000.0, &mut assets, &NullPoseSource);
        let view = s.challenge.view(4000.0, &s.track, &tuning).unwrap();
        assert_eq!(view.countdown, 4);
        assert_eq!(view.zones.len(), 6);
        assert!(view.result.is_none());
        assert!(view.zones.iter().all(|z| z.radius == HIT_ZONE_RADIUS));

        advance_challenge(&mut s, 8001.0, &mut assets, &NullPoseSource);
        let view = s.challenge.view(8500.0, &s.track, &tuning).unwrap();
        assert_eq!(view.countdown, 0);
        assert!(view.result.is_some());
    }
}
