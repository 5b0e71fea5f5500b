//! Capability traits at the platform seams
//!
//! The sim never draws, never touches the camera, never loads files. Assets
//! and pose input are injected at construction behind these traits; the no-op
//! implementations keep tests and the native build running headless with the
//! documented fallbacks (flat-color obstacles, every challenge failing as
//! "no person detected").

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::sim::pose::PoseFrame;

/// Opaque host-side sprite id. The sim only routes handles into the render
/// snapshot; what they index into is the host's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpriteHandle(pub u32);

/// Visual assets the sim asks for during a run
pub trait AssetProvider {
    /// A random obstacle sprite from the current theme. None while the host
    /// is still loading images; callers fall back to flat color and retry.
    fn random_obstacle(&mut self) -> Option<SpriteHandle>;

    /// Rotate to the next visual theme. Called after every pose challenge.
    fn advance_theme(&mut self);
}

/// Latest webcam pose detection
pub trait PoseSource {
    /// The most recent detection frame, None when no person is tracked
    fn current(&self) -> Option<PoseFrame>;
}

/// Asset provider with nothing in it: obstacles render as colored circles
#[derive(Debug, Default)]
pub struct NullAssets;

impl AssetProvider for NullAssets {
    fn random_obstacle(&mut self) -> Option<SpriteHandle> {
        None
    }

    fn advance_theme(&mut self) {}
}

/// Pose source with nobody on camera: every challenge fails closed
#[derive(Debug, Default)]
pub struct NullPoseSource;

impl PoseSource for NullPoseSource {
    fn current(&self) -> Option<PoseFrame> {
        None
    }
}

/// Host-registered sprite pool, grouped into themes that rotate after each
/// challenge. Handles are global indices into the host's sprite list, in
/// registration order.
#[derive(Debug)]
pub struct PooledAssets {
    /// Sprite count per registered theme
    theme_sizes: Vec<u32>,
    current_theme: usize,
    rng: Pcg32,
}

impl PooledAssets {
    pub fn new(seed: u64) -> Self {
        Self {
            theme_sizes: Vec::new(),
            current_theme: 0,
            rng: Pcg32::new(seed, 0xa55e75),
        }
    }

    /// Register the next theme's sprite count. Handles for this theme start
    /// right after the previous theme's.
    pub fn register_theme(&mut self, sprite_count: u32) {
        log::debug!(
            "registered theme {} with {sprite_count} sprites",
            self.theme_sizes.len()
        );
        self.theme_sizes.push(sprite_count);
    }

    fn theme_base(&self, theme: usize) -> u32 {
        self.theme_sizes[..theme].iter().sum()
    }
}

impl AssetProvider for PooledAssets {
    fn random_obstacle(&mut self) -> Option<SpriteHandle> {
        let count = *self.theme_sizes.get(self.current_theme)?;
        if count == 0 {
            return None;
        }
        let index = self.rng.random_range(0..count);
        Some(SpriteHandle(self.theme_base(self.current_theme) + index))
    }

    fn advance_theme(&mut self) {
        if !self.theme_sizes.is_empty() {
            self.current_theme = (self.current_theme + 1) % self.theme_sizes.len();
        }
    }
}

/// Shared cell the platform layer fills from its detection callback. The sim
/// only reads it at validation time; stale frames are the source's problem,
/// absent frames fail closed.
#[derive(Debug, Clone, Default)]
pub struct SharedPoseCell {
    inner: Rc<RefCell<Option<PoseFrame>>>,
}

impl SharedPoseCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, frame: Option<PoseFrame>) {
        *self.inner.borrow_mut() = frame;
    }
}

impl PoseSource for SharedPoseCell {
    fn current(&self) -> Option<PoseFrame> {
        self.inner.borrow().clone()
    }
}
