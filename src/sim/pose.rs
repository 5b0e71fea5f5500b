//! Pose validation
//!
//! Challenges ask the player to strike one of three letter poses (T, Y, L)
//! in front of the webcam. The host feeds us raw keypoints from its pose
//! estimation model in COCO order and capture-pixel coordinates; we mirror
//! them into display space (webcams are selfie-mirrored) and score each
//! tracked joint against a fixed circular zone. Validation is a pure
//! function: same frame, same verdict, no side effects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{HIT_ZONE_RADIUS, MATCH_THRESHOLD, MIN_CONFIDENCE};

/// The six upper-body joints challenges track. COCO indices 5 through 10;
/// the head and lower body are ignored so players can sit at a desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackedJoint {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
}

impl TrackedJoint {
    /// Index into a COCO 17-keypoint array
    #[inline]
    pub fn coco_index(self) -> usize {
        match self {
            TrackedJoint::LeftShoulder => 5,
            TrackedJoint::RightShoulder => 6,
            TrackedJoint::LeftElbow => 7,
            TrackedJoint::RightElbow => 8,
            TrackedJoint::LeftWrist => 9,
            TrackedJoint::RightWrist => 10,
        }
    }
}

/// One detected keypoint in capture-pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Model confidence in [0, 1]. MoveNet calls this `score`.
    #[serde(alias = "score")]
    pub confidence: f32,
}

/// One detection frame from the pose source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Keypoints in COCO order; may be shorter than 17 if the model dropped
    /// joints
    pub keypoints: Vec<Keypoint>,
    /// Webcam capture size the keypoint coordinates are relative to
    pub capture_w: f32,
    pub capture_h: f32,
}

/// The poses a challenge can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PoseName {
    T,
    Y,
    L,
}

impl PoseName {
    pub const ALL: [PoseName; 3] = [PoseName::T, PoseName::Y, PoseName::L];

    pub fn as_str(self) -> &'static str {
        match self {
            PoseName::T => "T",
            PoseName::Y => "Y",
            PoseName::L => "L",
        }
    }

    pub fn from_str(s: &str) -> Option<PoseName> {
        match s {
            "T" => Some(PoseName::T),
            "Y" => Some(PoseName::Y),
            "L" => Some(PoseName::L),
            _ => None,
        }
    }
}

/// Zone centers as fractions of the viewport, per pose
fn template(pose: PoseName) -> [(TrackedJoint, f32, f32); 6] {
    use TrackedJoint::*;
    match pose {
        // Arms straight out to the sides
        PoseName::T => [
            (LeftWrist, 0.2, 0.67),
            (LeftElbow, 0.3, 0.67),
            (LeftShoulder, 0.4, 0.67),
            (RightShoulder, 0.6, 0.67),
            (RightElbow, 0.7, 0.67),
            (RightWrist, 0.8, 0.67),
        ],
        // Arms raised diagonally
        PoseName::Y => [
            (LeftWrist, 0.25, 0.47),
            (LeftElbow, 0.35, 0.57),
            (LeftShoulder, 0.43, 0.67),
            (RightShoulder, 0.57, 0.67),
            (RightElbow, 0.65, 0.57),
            (RightWrist, 0.75, 0.47),
        ],
        // Left arm out, right arm straight up
        PoseName::L => [
            (LeftWrist, 0.2, 0.67),
            (LeftElbow, 0.3, 0.67),
            (LeftShoulder, 0.43, 0.67),
            (RightShoulder, 0.57, 0.67),
            (RightElbow, 0.57, 0.42),
            (RightWrist, 0.57, 0.17),
        ],
    }
}

/// Zone centers in display pixels for overlay rendering and validation
pub fn zone_centers(pose: PoseName, view_w: f32, view_h: f32) -> [(TrackedJoint, Vec2); 6] {
    template(pose).map(|(joint, fx, fy)| (joint, Vec2::new(fx * view_w, fy * view_h)))
}

/// Outcome of scoring one frame against one pose
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Whether enough joints landed in their zones
    pub valid: bool,
    /// Joints inside their zones
    pub matched: usize,
    /// Joints that were scored (zero when no person was in frame)
    pub total: usize,
    /// Player-facing verdict line
    pub message: String,
}

/// Map a capture-space keypoint to display space. X is mirrored so the
/// overlay behaves like a mirror; Y scales straight through.
fn to_display(kp: &Keypoint, frame: &PoseFrame, view_w: f32, view_h: f32) -> Vec2 {
    Vec2::new(
        view_w - kp.x * (view_w / frame.capture_w),
        kp.y * (view_h / frame.capture_h),
    )
}

/// Score a detection frame against a pose. Fails closed: a missing frame, an
/// empty detection, or an unrecognized pose name all come back invalid.
pub fn validate(
    frame: Option<&PoseFrame>,
    pose_name: &str,
    view_w: f32,
    view_h: f32,
) -> ValidationReport {
    let frame = match frame {
        Some(f) if !f.keypoints.is_empty() => f,
        _ => {
            return ValidationReport {
                valid: false,
                matched: 0,
                total: 0,
                message: "No person detected".to_string(),
            };
        }
    };

    let Some(pose) = PoseName::from_str(pose_name) else {
        return ValidationReport {
            valid: false,
            matched: 0,
            total: 0,
            message: "Unknown pose".to_string(),
        };
    };

    let zones = zone_centers(pose, view_w, view_h);
    let total = zones.len();
    let mut matched = 0;

    for (joint, center) in zones {
        // A dropped or low-confidence joint still counts toward the total,
        // scored as a miss
        let Some(kp) = frame.keypoints.get(joint.coco_index()) else {
            continue;
        };
        if kp.confidence < MIN_CONFIDENCE {
            continue;
        }
        let display = to_display(kp, frame, view_w, view_h);
        if display.distance(center) <= HIT_ZONE_RADIUS {
            matched += 1;
        }
    }

    let valid = matched as f32 >= MATCH_THRESHOLD * total as f32;
    let message = if valid {
        format!("Perfect! {matched}/{total} joints")
    } else {
        format!("Too far! {matched}/{total} joints")
    };

    ValidationReport {
        valid,
        matched,
        total,
        message,
    }
}
