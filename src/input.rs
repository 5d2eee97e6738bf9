// Input mapping: pointer coordinates and device orientation into normalized
// [0,1] progress, plus the per-tick scroll measure. Event listeners live in
// the host; these are the pure mappers behind them.

use serde::{Deserialize, Serialize};

use crate::engine::Measure;

/// Maps client coordinates into `[0,1]` relative to a target rect (an
/// element's bounding box, or the whole viewport).
#[derive(Debug, Clone, Copy)]
pub struct PointerMapper {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PointerMapper {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        PointerMapper {
            left,
            top,
            width,
            height,
        }
    }

    pub fn viewport(width: f64, height: f64) -> Self {
        PointerMapper::new(0.0, 0.0, width, height)
    }

    pub fn map(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        (
            map_axis(client_x - self.left, self.width),
            map_axis(client_y - self.top, self.height),
        )
    }
}

fn map_axis(offset: f64, size: f64) -> f64 {
    if size <= 0.0 {
        // Degenerate rect: report the center rather than a clamp artifact.
        return 0.5;
    }
    (offset / size).clamp(0.0, 1.0)
}

/// Device-orientation configuration. `supported` is the host's feature
/// detection verdict (`DeviceOrientationEvent` plus touch support).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrientationOptions {
    /// Number of initial readings folded into the calibration zero-point.
    #[serde(default = "default_samples")]
    pub samples: u32,
    /// Half-range of front-to-back tilt (beta), degrees.
    #[serde(default = "default_max_tilt")]
    pub max_beta: f64,
    /// Half-range of left-to-right tilt (gamma), degrees.
    #[serde(default = "default_max_tilt")]
    pub max_gamma: f64,
    #[serde(default)]
    pub supported: bool,
}

impl Default for OrientationOptions {
    fn default() -> Self {
        OrientationOptions {
            samples: default_samples(),
            max_beta: default_max_tilt(),
            max_gamma: default_max_tilt(),
            supported: false,
        }
    }
}

fn default_samples() -> u32 {
    3
}

fn default_max_tilt() -> f64 {
    15.0
}

/// Maps `(beta, gamma)` orientation readings into `[0,1]` around a rolling
/// calibrated zero-point. Construction yields `None` on unsupported hosts
/// so callers fall back to the pointer mapper.
pub struct OrientationTracker {
    options: OrientationOptions,
    zero_beta: f64,
    zero_gamma: f64,
    seen: u32,
}

impl OrientationTracker {
    pub fn new(options: OrientationOptions) -> Option<OrientationTracker> {
        if !options.supported {
            return None;
        }
        Some(OrientationTracker {
            options,
            zero_beta: 0.0,
            zero_gamma: 0.0,
            seen: 0,
        })
    }

    /// Feed one reading; returns the normalized `(x, y)` pair. The first
    /// `samples` readings refine the zero-point by averaging each new
    /// reading with the current zero.
    pub fn sample(&mut self, beta: f64, gamma: f64) -> (f64, f64) {
        if self.seen < self.options.samples {
            if self.seen == 0 {
                self.zero_beta = beta;
                self.zero_gamma = gamma;
            } else {
                self.zero_beta = (self.zero_beta + beta) / 2.0;
                self.zero_gamma = (self.zero_gamma + gamma) / 2.0;
            }
            self.seen += 1;
        }

        (
            map_tilt(gamma - self.zero_gamma, self.options.max_gamma),
            map_tilt(beta - self.zero_beta, self.options.max_beta),
        )
    }
}

fn map_tilt(deviation: f64, half_range: f64) -> f64 {
    if half_range <= 0.0 {
        return 0.5;
    }
    ((deviation + half_range) / (2.0 * half_range)).clamp(0.0, 1.0)
}

/// Adapt a host scroll-offset reader into an engine measure. Sampling runs
/// on the frame tick, keeping geometry reads off the scroll event's own
/// call stack.
pub fn scroll_measure(reader: impl Fn() -> (f64, f64) + 'static) -> Measure {
    Box::new(move |progress| {
        let (x, y) = reader();
        progress.x = x;
        progress.y = y;
    })
}
