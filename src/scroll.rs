// Scroll controller: remaps real scroll position through the snap map,
// gates scenes by viewport intersection, and computes per-scene progress
// and velocity. Constructed once per activation; scene ranges and the snap
// list are normalized at construction and immutable afterwards.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::EngineError;
use crate::snap::SnapMap;
use crate::types::{round1, round4, Progress, SceneConfig, ScrollOptions};

/// Per-scene effect: `(progress in [0,1], velocity in [-1,1])`. Any payload
/// (colors, filter radii, target elements) is captured by the closure; the
/// controller passes nothing else through.
pub type SceneEffect = Box<dyn FnMut(f64, f64)>;

/// One independently timed animation unit within the scroll sequence.
pub struct Scene {
    start: f64,
    end: f64,
    duration: f64,
    pause_during_snap: bool,
    viewport: Option<usize>,
    disabled: bool,
    effect: Option<SceneEffect>,
}

impl Scene {
    pub fn new(start: f64, end: f64) -> Result<Scene, EngineError> {
        Scene::from_config(&SceneConfig {
            start: Some(start),
            end: Some(end),
            duration: None,
            pause_during_snap: false,
            viewport: None,
        })
    }

    /// Normalize the three range fields: any missing one is computed from
    /// the other two (a lone `duration` starts at 0). Fewer than two fields
    /// or an inverted range is a construction error.
    pub fn from_config(config: &SceneConfig) -> Result<Scene, EngineError> {
        let (start, end) = match (config.start, config.end, config.duration) {
            (Some(start), Some(end), _) => (start, end),
            (Some(start), None, Some(duration)) => (start, start + duration),
            (None, Some(end), Some(duration)) => (end - duration, end),
            (None, None, Some(duration)) => (0.0, duration),
            _ => return Err(EngineError::SceneUnderspecified),
        };
        if end < start {
            return Err(EngineError::SceneInverted { start, end });
        }
        Ok(Scene {
            start,
            end,
            duration: end - start,
            pause_during_snap: config.pause_during_snap,
            viewport: config.viewport,
            disabled: false,
            effect: None,
        })
    }

    /// Drive this scene with the virtual position so it freezes while the
    /// scroll traverses a snap interval.
    pub fn pause_during_snap(mut self, pause: bool) -> Self {
        self.pause_during_snap = pause;
        self
    }

    /// Gate this scene on the given viewport id (see
    /// [`ScrollController::viewport_changed`]).
    pub fn viewport(mut self, id: usize) -> Self {
        self.viewport = Some(id);
        self
    }

    pub fn on_progress(mut self, effect: impl FnMut(f64, f64) + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    pub fn range(&self) -> (f64, f64) {
        (self.start, self.end)
    }
}

/// Scene progress at driving coordinate `t`: 0 before `start`, a linear
/// ramp across `[start, end]`, 1 past `end`. A zero-duration scene jumps to
/// 1 the moment `t` reaches `start`.
pub fn calc_progress(t: f64, start: f64, end: f64, duration: f64) -> f64 {
    if t < start {
        return 0.0;
    }
    if t > end || duration == 0.0 {
        return 1.0;
    }
    ((t - start) / duration).clamp(0.0, 1.0)
}

/// Progress/velocity computed for one scene during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneUpdate {
    pub index: usize,
    pub progress: f64,
    pub velocity: f64,
}

/// Result of one controller pass: the virtual position and the updates of
/// every enabled scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameResult {
    pub x: f64,
    pub y: f64,
    pub scenes: Vec<SceneUpdate>,
}

pub struct ScrollController {
    options: ScrollOptions,
    snaps: SnapMap,
    scenes: Vec<Scene>,
    last: Option<(f64, f64)>,
    scroll_handler: Option<Box<dyn FnMut(f64, f64)>>,
    scroll_clear: Option<Box<dyn FnMut()>>,
    reset_progress: Option<Box<dyn FnMut(f64, f64)>>,
    destroyed: bool,
}

impl ScrollController {
    pub fn new(options: ScrollOptions) -> Result<ScrollController, EngineError> {
        let snaps = SnapMap::new(options.snaps.clone())?;
        Ok(ScrollController {
            options,
            snaps,
            scenes: Vec::new(),
            last: None,
            scroll_handler: None,
            scroll_clear: None,
            reset_progress: None,
            destroyed: false,
        })
    }

    /// Register a scene; returns its index in update results.
    pub fn add_scene(&mut self, scene: Scene) -> usize {
        self.scenes.push(scene);
        self.scenes.len() - 1
    }

    /// Receives the virtual position once per changed frame when the
    /// pinned-container mode is on. The web host's default applies
    /// `translate3d(-x, -y, 0)` to the container.
    pub fn set_scroll_handler(&mut self, handler: impl FnMut(f64, f64) + 'static) {
        self.scroll_handler = Some(Box::new(handler));
    }

    /// Invoked once by `destroy()` so the host can drop the inline
    /// transform it applied through the scroll handler.
    pub fn set_scroll_clear(&mut self, clear: impl FnMut() + 'static) {
        self.scroll_clear = Some(Box::new(clear));
    }

    /// Receives the snap-shifted scroll offset from `reset()` so the host
    /// can move the real scrollbar to match.
    pub fn set_reset_progress(&mut self, reset: impl FnMut(f64, f64) + 'static) {
        self.reset_progress = Some(Box::new(reset));
    }

    pub fn options(&self) -> &ScrollOptions {
        &self.options
    }

    /// Total snap length: the extra scroll-axis size the host reserves on
    /// the document body (container size + extra) so the real scrollbar has
    /// room to traverse every snap interval.
    pub fn extra_scroll(&self) -> f64 {
        self.snaps.total_len()
    }

    /// Relayed from the host's IntersectionObserver: every scene registered
    /// against `viewport` is disabled while it is out of view. Scenes
    /// without a viewport are never auto-disabled.
    pub fn viewport_changed(&mut self, viewport: usize, is_intersecting: bool) {
        for scene in &mut self.scenes {
            if scene.viewport == Some(viewport) {
                scene.disabled = !is_intersecting;
            }
        }
    }

    /// Shift a real scroll position forward past every snap interval lying
    /// wholly before it, report the shifted offset through the configured
    /// reset callback, then render once at that position with zero velocity.
    /// Used when a pinned wrapper attaches mid-scroll.
    pub fn reset(&mut self, x: f64, y: f64) -> Option<FrameResult> {
        let (sx, sy) = if self.options.horizontal {
            (x + self.snaps.traversed_len(x), y)
        } else {
            (x, y + self.snaps.traversed_len(y))
        };
        if let Some(reset) = &mut self.reset_progress {
            reset(sx, sy);
        }
        self.last = None;
        self.update(Progress::new(sx, sy))
    }

    /// One controller pass with the latest scroll sample. Returns `None`
    /// without touching any scene when the rounded position is unchanged
    /// from the previous call (effects are never re-invoked spuriously).
    pub fn update(&mut self, progress: Progress) -> Option<FrameResult> {
        if self.destroyed {
            return None;
        }

        let x = round1(progress.x);
        let y = round1(progress.y);
        if self.last == Some((x, y)) {
            return None;
        }
        let vx = round4(progress.vx);
        let vy = round4(progress.vy);

        // Snap remapping applies along the scroll axis; the cross axis
        // passes through untouched.
        let (virtual_x, virtual_y) = if self.options.horizontal {
            (self.snaps.remap(x), y)
        } else {
            (x, self.snaps.remap(y))
        };

        if self.options.container {
            if let Some(handler) = &mut self.scroll_handler {
                handler(virtual_x, virtual_y);
            }
        }

        let (raw_t, virtual_t, velocity) = if self.options.horizontal {
            (x, virtual_x, vx)
        } else {
            (y, virtual_y, vy)
        };

        let mut updates = Vec::with_capacity(self.scenes.len());
        for (index, scene) in self.scenes.iter_mut().enumerate() {
            if scene.disabled {
                continue;
            }
            let t = if scene.pause_during_snap {
                virtual_t
            } else {
                raw_t
            };
            let progress = calc_progress(t, scene.start, scene.end, scene.duration);
            if let Some(effect) = &mut scene.effect {
                effect(progress, velocity);
            }
            updates.push(SceneUpdate {
                index,
                progress,
                velocity,
            });
        }

        self.last = Some((x, y));
        Some(FrameResult {
            x: virtual_x,
            y: virtual_y,
            scenes: updates,
        })
    }

    /// Release every side effect: run the scroll-clear callback once and
    /// drop all callbacks. The controller is inert afterwards; a second
    /// call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Some(mut clear) = self.scroll_clear.take() {
            clear();
        }
        self.scroll_handler = None;
        self.reset_progress = None;
        for scene in &mut self.scenes {
            scene.effect = None;
        }
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// Configuration for creating a scroll controller from JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollControllerConfig {
    #[serde(default)]
    pub options: ScrollOptions,
    #[serde(default)]
    pub scenes: Vec<SceneConfig>,
}

/// WASM-exposed scroll controller. One `update` call per frame; the result
/// is a JSON batch the host applies to the DOM, keeping JS↔WASM crossings
/// to one per tick.
///
/// # Example JSON Config
/// ```json
/// {
///   "options": {
///     "container": true,
///     "snaps": [{ "start": 1000, "end": 2500 }]
///   },
///   "scenes": [
///     { "start": 0, "end": 3000, "pause_during_snap": true, "viewport": 0 }
///   ]
/// }
/// ```
#[wasm_bindgen]
pub struct WasmScrollController {
    inner: ScrollController,
    scroll_handler: Option<js_sys::Function>,
}

/// Serialized result of one `update` call. `changed` is false when the
/// rounded position was unchanged and nothing ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasmFrame {
    pub changed: bool,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub scenes: Vec<SceneUpdate>,
}

#[wasm_bindgen]
impl WasmScrollController {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmScrollController, JsValue> {
        let config: ScrollControllerConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid controller config: {}", e)))?;

        let mut inner = ScrollController::new(config.options)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        for scene_config in &config.scenes {
            let scene = Scene::from_config(scene_config)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            inner.add_scene(scene);
        }

        Ok(WasmScrollController {
            inner,
            scroll_handler: None,
        })
    }

    /// Install a JS scroll handler, called with the virtual position on
    /// every changed frame while the pinned-container mode is on.
    pub fn set_scroll_handler(&mut self, handler: js_sys::Function) {
        self.scroll_handler = Some(handler);
    }

    /// Feed the latest scroll sample. Returns the frame batch as JSON.
    pub fn update(&mut self, x: f64, y: f64, vx: f64, vy: f64) -> Result<String, JsValue> {
        let result = self.inner.update(Progress { x, y, vx, vy });
        self.render(result)
    }

    /// Relay one IntersectionObserver change for a viewport id.
    pub fn viewport_changed(&mut self, viewport: usize, is_intersecting: bool) {
        self.inner.viewport_changed(viewport, is_intersecting);
    }

    /// Extra scroll-axis size to reserve on the document body.
    pub fn extra_scroll(&self) -> f64 {
        self.inner.extra_scroll()
    }

    /// Root margin for the host's IntersectionObserver, CSS margin syntax.
    pub fn viewport_root_margin(&self) -> String {
        self.inner.options().viewport_root_margin.clone()
    }

    /// Shift past already-traversed snaps and render once, zero velocity.
    /// Returns the shifted offset and frame batch as JSON.
    pub fn reset(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        let result = self.inner.reset(x, y);
        self.render(result)
    }

    pub fn destroy(&mut self) {
        self.scroll_handler = None;
        self.inner.destroy();
    }

    fn render(&self, result: Option<FrameResult>) -> Result<String, JsValue> {
        let frame = match result {
            Some(frame) => {
                if self.inner.options().container {
                    if let Some(handler) = &self.scroll_handler {
                        let _ = handler.call2(
                            &JsValue::NULL,
                            &JsValue::from_f64(frame.x),
                            &JsValue::from_f64(frame.y),
                        );
                    }
                }
                WasmFrame {
                    changed: true,
                    x: frame.x,
                    y: frame.y,
                    scenes: frame.scenes,
                }
            }
            None => WasmFrame {
                changed: false,
                x: 0.0,
                y: 0.0,
                scenes: Vec::new(),
            },
        };

        serde_json::to_string(&frame)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}
