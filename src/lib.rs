// parallax_core: frame scheduling and scroll-progress engine for
// scroll-driven parallax and pointer/gyro tilt effects. The algorithmic
// core is pure Rust; the JS host owns the DOM plumbing (raF wiring,
// observers, event listeners, applying style strings).

mod engine;
mod error;
mod input;
mod scroll;
mod snap;
mod ticker;
mod tilt;
mod types;

use wasm_bindgen::prelude::*;

pub use engine::{Effect, Engine, Measure, ProgressSetter};
pub use error::EngineError;
pub use input::{scroll_measure, OrientationOptions, OrientationTracker, PointerMapper};
pub use scroll::{
    calc_progress, FrameResult, Scene, SceneEffect, SceneUpdate, ScrollController,
    ScrollControllerConfig, WasmFrame, WasmScrollController,
};
pub use snap::{SnapInterval, SnapMap};
pub use ticker::{FrameScheduler, Tick, Ticker};
pub use tilt::{
    compose, perspective_origin, EffectOptions, LayerOptions, LayerSpec, LayerTransform,
    TiltComposer, TiltComposerConfig, WasmTiltComposer,
};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct NoopScheduler;

    impl FrameScheduler for NoopScheduler {
        fn request(&self) {}
        fn cancel(&self) {}
    }

    /// End-to-end: scroll measure -> engine tick -> controller -> scene
    /// effect, with velocity and a snap interval in the path.
    #[test]
    fn scroll_pipeline_drives_scene_effects() {
        let ticker = Ticker::new(Box::new(NoopScheduler));
        let engine = Engine::new(EngineConfig {
            velocity_active: true,
            velocity_max: 400.0,
            ..EngineConfig::default()
        });

        let scroll_y = Rc::new(Cell::new(0.0f64));
        let reader = scroll_y.clone();
        engine.add_measure(scroll_measure(move || (0.0, reader.get())));

        let mut controller = ScrollController::new(ScrollOptions {
            snaps: vec![SnapConfig {
                start: 1000.0,
                end: Some(2500.0),
                duration: None,
            }],
            ..ScrollOptions::default()
        })
        .unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        controller.add_scene(
            Scene::new(0.0, 3000.0)
                .unwrap()
                .pause_during_snap(true)
                .on_progress(move |p, v| sink.borrow_mut().push((p, v))),
        );
        engine.add_effect(Box::new(move |p| {
            controller.update(p);
        }));

        engine.start(&ticker);

        scroll_y.set(300.0);
        ticker.tick(0.0);
        scroll_y.set(1750.0);
        ticker.tick(16.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!((seen[0].0 - 0.1).abs() < 1e-9);
        assert_eq!(seen[0].1, 0.75); // 300px in one tick, clamp 400
        assert!((seen[1].0 - 1.0 / 3.0).abs() < 1e-9); // frozen at the snap
        assert_eq!(seen[1].1, 1.0);
    }

    /// Pointer input through the setter capability with smoothing active.
    #[test]
    fn tilt_pipeline_smooths_pointer_input() {
        let ticker = Ticker::new(Box::new(NoopScheduler));
        let engine = Engine::new(EngineConfig {
            animation_active: true,
            animation_friction: 0.0,
            ..EngineConfig::default()
        });

        let mapper = PointerMapper::viewport(800.0, 600.0);
        let setter = engine.setter();

        let composer = TiltComposer::new(&[LayerSpec::Record(LayerOptions::default())]).unwrap();
        let transforms = Rc::new(RefCell::new(Vec::new()));
        let sink = transforms.clone();
        engine.add_effect(Box::new(move |p| {
            sink.borrow_mut().push(composer.update(p.x, p.y));
        }));

        engine.start(&ticker);
        let (x, y) = mapper.map(800.0, 300.0);
        setter.set(x, y);
        ticker.tick(0.0);

        let transforms = transforms.borrow();
        assert_eq!(
            transforms[0][0].transform,
            "translate3d(50.00px, 0.00px, 0px)"
        );
    }
}
