// Shared records and JS-facing configuration. Serde defaults mirror the
// documented defaults so a partial JSON config is always valid.

use serde::{Deserialize, Serialize};

/// Raw progress signal driving all effects.
///
/// Pointer/orientation input writes normalized `[0,1]` coordinates; the
/// scroll measure writes raw pixel offsets. `vx`/`vy` carry the clamped,
/// sign-preserving velocity estimate when velocity tracking is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Progress {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
}

impl Progress {
    pub fn new(x: f64, y: f64) -> Self {
        Progress {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

/// Base engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Smooth the raw progress with a per-frame interpolation step.
    #[serde(default)]
    pub animation_active: bool,
    /// Interpolation friction in `[0, 1)`. 0 converges in one tick; values
    /// approaching 1 approach a static signal.
    #[serde(default = "default_friction")]
    pub animation_friction: f64,
    /// Derive a velocity estimate from the per-tick progress delta.
    #[serde(default)]
    pub velocity_active: bool,
    /// Velocity clamp, in the raw progress unit per tick. The reported
    /// velocity is normalized by this value into `[-1, 1]`.
    #[serde(default = "default_velocity_max")]
    pub velocity_max: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            animation_active: false,
            animation_friction: default_friction(),
            velocity_active: false,
            velocity_max: default_velocity_max(),
        }
    }
}

fn default_friction() -> f64 {
    0.4
}

fn default_velocity_max() -> f64 {
    1.0
}

/// One snap interval on the real scroll axis, as configured. Exactly one of
/// `end` / `duration` may be omitted; `end = start + duration` is computed
/// once at setup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SnapConfig {
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// One scene's timing configuration. Any one of `start`/`end`/`duration` may
/// be omitted and is computed from the other two (missing `start` defaults
/// to 0 when only `duration` is given).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    /// Drive this scene with the virtual (snap-remapped) position so its
    /// progress freezes while the scroll traverses a snap interval.
    #[serde(default)]
    pub pause_during_snap: bool,
    /// Identifier of the viewport element gating this scene, if any. The
    /// host wires one IntersectionObserver per distinct viewport and relays
    /// changes through `viewport_changed`.
    #[serde(default)]
    pub viewport: Option<usize>,
}

/// Scroll controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollOptions {
    /// Drive scenes from the x axis instead of y.
    #[serde(default)]
    pub horizontal: bool,
    /// Pinned-container ("smooth scroll") mode: the scroll handler receives
    /// the virtual position each frame and the host translates the container.
    #[serde(default)]
    pub container: bool,
    /// Re-apply the body sizing whenever the container resizes.
    #[serde(default)]
    pub observe_size: bool,
    /// Gate scenes by viewport intersection.
    #[serde(default)]
    pub observe_viewport: bool,
    /// Root margin for the host's IntersectionObserver, CSS margin syntax.
    #[serde(default = "default_root_margin")]
    pub viewport_root_margin: String,
    #[serde(default)]
    pub snaps: Vec<SnapConfig>,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        ScrollOptions {
            horizontal: false,
            container: false,
            observe_size: false,
            observe_viewport: false,
            viewport_root_margin: default_root_margin(),
            snaps: Vec::new(),
        }
    }
}

fn default_root_margin() -> String {
    "7% 7%".to_string()
}

/// Round to one decimal place. Scroll positions are compared at this
/// resolution to suppress sub-pixel noise and redundant effect runs.
pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Round to four decimal places, used for velocity.
pub(crate) fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
