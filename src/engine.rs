// Base animation engine: owns the raw and smoothed progress records and
// orchestrates measure -> velocity -> smoothing -> effects once per tick.
// Event wiring lives in the host; input handlers write through the narrow
// ProgressSetter capability instead of touching the engine directly.

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::{Rc, Weak};

use crate::ticker::{Tick, Ticker};
use crate::types::{EngineConfig, Progress};

/// Per-tick sampling callback. Measures pull fresh input each frame (e.g.
/// the scroll offset), decoupling the sampling rate from the event rate.
pub type Measure = Box<dyn FnMut(&mut Progress)>;

/// Registered effect. Receives the smoothed record when smoothing is active,
/// the raw record otherwise. Must tolerate redundant calls with an unchanged
/// value.
pub type Effect = Box<dyn FnMut(Progress)>;

pub struct Engine {
    config: EngineConfig,
    progress: Cell<Progress>,
    current: Cell<Progress>,
    measures: RefCell<Vec<Measure>>,
    effects: RefCell<Vec<Effect>>,
    destroyed: Cell<bool>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Rc<Engine> {
        Rc::new(Engine {
            config,
            progress: Cell::new(Progress::default()),
            current: Cell::new(Progress::default()),
            measures: RefCell::new(Vec::new()),
            effects: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        })
    }

    /// Register with the ticker. Idempotent.
    pub fn start(self: &Rc<Self>, ticker: &Ticker) {
        ticker.add(self.clone() as Rc<dyn Tick>);
    }

    /// Unregister from the ticker. A frame already in flight still completes
    /// its current pass.
    pub fn stop(self: &Rc<Self>, ticker: &Ticker) {
        let member: Rc<dyn Tick> = self.clone();
        ticker.remove(&member);
    }

    /// Stop and clear the effect list. Safe to call from within one of this
    /// engine's own effects.
    pub fn destroy(self: &Rc<Self>, ticker: &Ticker) {
        self.stop(ticker);
        self.destroyed.set(true);
        // Mid-tick the list is checked out of the cell; the destroyed flag
        // stops it from being merged back.
        if let Ok(mut effects) = self.effects.try_borrow_mut() {
            effects.clear();
        }
    }

    pub fn add_measure(&self, measure: Measure) {
        self.measures.borrow_mut().push(measure);
    }

    /// Append an effect to the end of the ordered effect list.
    pub fn add_effect(&self, effect: Effect) {
        self.effects.borrow_mut().push(effect);
    }

    /// Prepend an effect, so it runs before every existing one. Collaborators
    /// use this to wrap instrumentation around the effect pass.
    pub fn unshift_effect(&self, effect: Effect) {
        self.effects.borrow_mut().insert(0, effect);
    }

    /// Narrow write capability for pointer/orientation input. Coordinates
    /// are clamped to `[0, 1]` on both axes; the capability goes inert once
    /// the engine is dropped.
    pub fn setter(self: &Rc<Self>) -> ProgressSetter {
        ProgressSetter {
            engine: Rc::downgrade(self),
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress.get()
    }

    /// The smoothed record. Tracks `progress` exactly when smoothing is off.
    pub fn current(&self) -> Progress {
        self.current.get()
    }

    fn run(&self, _time: f64) {
        if self.destroyed.get() {
            return;
        }

        // Measures first: sample raw input for this frame.
        let mut measures = mem::take(&mut *self.measures.borrow_mut());
        let prev = self.progress.get();
        let mut raw = prev;
        for measure in &mut measures {
            measure(&mut raw);
        }
        restore(&self.measures, measures);

        if self.config.velocity_active {
            raw.vx = clamped_velocity(raw.x - prev.x, self.config.velocity_max);
            raw.vy = clamped_velocity(raw.y - prev.y, self.config.velocity_max);
        }
        self.progress.set(raw);

        // One interpolation step toward the raw record. Frame-count-based
        // decay: the step is deliberately not delta-time-compensated.
        let out = if self.config.animation_active {
            let step = 1.0 - self.config.animation_friction;
            let mut current = self.current.get();
            current.x += (raw.x - current.x) * step;
            current.y += (raw.y - current.y) * step;
            current.vx = raw.vx;
            current.vy = raw.vy;
            self.current.set(current);
            current
        } else {
            self.current.set(raw);
            raw
        };

        // Effects run against the checked-out list so one of them may stop
        // or destroy this engine without a reentrant borrow.
        let mut effects = mem::take(&mut *self.effects.borrow_mut());
        for effect in &mut effects {
            effect(out);
        }
        if !self.destroyed.get() {
            restore(&self.effects, effects);
        }
    }
}

impl Tick for Engine {
    fn tick(&self, time: f64) {
        self.run(time);
    }
}

// Merge the checked-out callbacks back in front of any registered during the
// pass, preserving registration order.
fn restore<T>(cell: &RefCell<Vec<T>>, mut taken: Vec<T>) {
    let mut slot = cell.borrow_mut();
    let added = mem::take(&mut *slot);
    taken.extend(added);
    *slot = taken;
}

/// Sign-preserving, clamped velocity estimate normalized into `[-1, 1]`.
fn clamped_velocity(delta: f64, max: f64) -> f64 {
    if max <= 0.0 || delta == 0.0 {
        return 0.0;
    }
    delta.signum() * delta.abs().min(max) / max
}

/// Write capability handed to input handlers.
pub struct ProgressSetter {
    engine: Weak<Engine>,
}

impl ProgressSetter {
    pub fn set(&self, x: f64, y: f64) {
        if let Some(engine) = self.engine.upgrade() {
            let mut progress = engine.progress.get();
            progress.x = x.clamp(0.0, 1.0);
            progress.y = y.clamp(0.0, 1.0);
            engine.progress.set(progress);
        }
    }
}
