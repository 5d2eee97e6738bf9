// Tilt/layer transform composition: pure function from normalized pointer
// or orientation coordinates to per-layer CSS transform strings. Effects
// compose in a fixed order: perspective translate scale skew rotate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::EngineError;

/// One axis-pair effect: magnitude clamp plus independent per-axis
/// inversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectOptions {
    pub max: f64,
    #[serde(default)]
    pub invert_x: bool,
    #[serde(default)]
    pub invert_y: bool,
}

impl EffectOptions {
    pub fn with_max(max: f64) -> Self {
        EffectOptions {
            max,
            invert_x: false,
            invert_y: false,
        }
    }
}

/// Normalized per-layer configuration. Translation is on by default; the
/// other effects opt in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerOptions {
    /// Depth weight in `[0, 1]` applied to the translation amount; far
    /// layers (low depth) move less.
    #[serde(default = "default_depth")]
    pub depth: f64,
    /// Perspective distance in px, prepended to the transform when set.
    #[serde(default)]
    pub perspective_z: Option<f64>,
    #[serde(default = "default_translation")]
    pub translation: Option<EffectOptions>,
    #[serde(default)]
    pub rotation: Option<EffectOptions>,
    #[serde(default)]
    pub skew: Option<EffectOptions>,
    #[serde(default)]
    pub scale: Option<EffectOptions>,
}

impl Default for LayerOptions {
    fn default() -> Self {
        LayerOptions {
            depth: default_depth(),
            perspective_z: None,
            translation: default_translation(),
            rotation: None,
            skew: None,
            scale: None,
        }
    }
}

fn default_depth() -> f64 {
    1.0
}

fn default_translation() -> Option<EffectOptions> {
    Some(EffectOptions::with_max(50.0))
}

/// Layer configuration as declared by the caller: either a plain record or
/// a markup-declared layer carrying dataset string overrides. Both resolve
/// into one normalized [`LayerOptions`] at setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSpec {
    Dataset {
        #[serde(default)]
        overrides: HashMap<String, String>,
    },
    Record(LayerOptions),
}

impl LayerSpec {
    /// Resolve into normalized options. Dataset overrides are parsed once;
    /// an unknown key or a malformed value is a configuration error.
    pub fn resolve(&self) -> Result<LayerOptions, EngineError> {
        match self {
            LayerSpec::Record(options) => Ok(options.clone()),
            LayerSpec::Dataset { overrides } => {
                let mut options = LayerOptions::default();
                for (key, value) in overrides {
                    apply_override(&mut options, key, value)?;
                }
                Ok(options)
            }
        }
    }
}

fn apply_override(
    options: &mut LayerOptions,
    key: &str,
    value: &str,
) -> Result<(), EngineError> {
    let number = || {
        value.parse::<f64>().map_err(|_| {
            EngineError::InvalidConfig(format!("layer override {key}: not a number: {value:?}"))
        })
    };
    let flag = || {
        value.parse::<bool>().map_err(|_| {
            EngineError::InvalidConfig(format!("layer override {key}: not a boolean: {value:?}"))
        })
    };

    match key {
        "depth" => options.depth = number()?,
        "perspectiveZ" => options.perspective_z = Some(number()?),
        "translationMax" => effect(&mut options.translation, 50.0).max = number()?,
        "translationInvertX" => effect(&mut options.translation, 50.0).invert_x = flag()?,
        "translationInvertY" => effect(&mut options.translation, 50.0).invert_y = flag()?,
        "rotationMax" => effect(&mut options.rotation, 25.0).max = number()?,
        "rotationInvertX" => effect(&mut options.rotation, 25.0).invert_x = flag()?,
        "rotationInvertY" => effect(&mut options.rotation, 25.0).invert_y = flag()?,
        "skewMax" => effect(&mut options.skew, 25.0).max = number()?,
        "skewInvertX" => effect(&mut options.skew, 25.0).invert_x = flag()?,
        "skewInvertY" => effect(&mut options.skew, 25.0).invert_y = flag()?,
        "scaleMax" => effect(&mut options.scale, 0.5).max = number()?,
        "scaleInvertX" => effect(&mut options.scale, 0.5).invert_x = flag()?,
        "scaleInvertY" => effect(&mut options.scale, 0.5).invert_y = flag()?,
        _ => {
            return Err(EngineError::InvalidConfig(format!(
                "unknown layer override: {key}"
            )))
        }
    }
    Ok(())
}

fn effect(slot: &mut Option<EffectOptions>, default_max: f64) -> &mut EffectOptions {
    slot.get_or_insert_with(|| EffectOptions::with_max(default_max))
}

/// Composed style strings for one layer at one progress sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerTransform {
    pub transform: String,
}

/// Composes transforms for a set of layers from a normalized `(x, y)`.
pub struct TiltComposer {
    layers: Vec<LayerOptions>,
}

impl TiltComposer {
    pub fn new(specs: &[LayerSpec]) -> Result<TiltComposer, EngineError> {
        let layers = specs
            .iter()
            .map(LayerSpec::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TiltComposer { layers })
    }

    pub fn layers(&self) -> &[LayerOptions] {
        &self.layers
    }

    pub fn update(&self, x: f64, y: f64) -> Vec<LayerTransform> {
        self.layers
            .iter()
            .map(|layer| LayerTransform {
                transform: compose(layer, x, y),
            })
            .collect()
    }
}

/// Compose one layer's transform string at `(x, y) ∈ [0,1]²`. Coordinates
/// are centered to `[-0.5, 0.5]`; each effect scales the centered value by
/// twice its magnitude clamp, so the full pointer range spans `±max`.
pub fn compose(layer: &LayerOptions, x: f64, y: f64) -> String {
    let cx = x - 0.5;
    let cy = y - 0.5;
    let mut parts = Vec::with_capacity(5);

    if let Some(z) = layer.perspective_z {
        parts.push(format!("perspective({z}px)"));
    }
    if let Some(translation) = &layer.translation {
        let tx = amount(cx, translation.max, translation.invert_x) * layer.depth;
        let ty = amount(cy, translation.max, translation.invert_y) * layer.depth;
        parts.push(format!("translate3d({tx:.2}px, {ty:.2}px, 0px)"));
    }
    if let Some(scale) = &layer.scale {
        // Scale grows with distance from center; inversion shrinks instead.
        let sx = 1.0 + amount(cx.abs(), scale.max, scale.invert_x);
        let sy = 1.0 + amount(cy.abs(), scale.max, scale.invert_y);
        parts.push(format!("scale({sx:.3}, {sy:.3})"));
    }
    if let Some(skew) = &layer.skew {
        let ax = amount(cx, skew.max, skew.invert_x);
        let ay = amount(cy, skew.max, skew.invert_y);
        parts.push(format!("skew({ax:.2}deg, {ay:.2}deg)"));
    }
    if let Some(rotation) = &layer.rotation {
        // Horizontal motion turns the layer about the y axis and vice versa.
        let rx = amount(cy, rotation.max, rotation.invert_y);
        let ry = amount(cx, rotation.max, rotation.invert_x);
        parts.push(format!("rotateX({rx:.2}deg) rotateY({ry:.2}deg)"));
    }

    parts.join(" ")
}

fn amount(centered: f64, max: f64, invert: bool) -> f64 {
    let value = centered * 2.0 * max;
    let value = if invert { -value } else { value };
    value.clamp(-max.abs(), max.abs())
}

/// Perspective origin percentages for the layer container.
pub fn perspective_origin(x: f64, y: f64) -> String {
    format!(
        "{:.1}% {:.1}%",
        (x * 100.0).clamp(0.0, 100.0),
        (y * 100.0).clamp(0.0, 100.0),
    )
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// Configuration for creating a tilt composer from JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiltComposerConfig {
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
}

/// WASM-exposed tilt composer: JSON config in, one JSON batch of per-layer
/// transform strings per update.
#[wasm_bindgen]
pub struct WasmTiltComposer {
    inner: TiltComposer,
}

#[wasm_bindgen]
impl WasmTiltComposer {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmTiltComposer, JsValue> {
        let config: TiltComposerConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid composer config: {}", e)))?;
        let inner = TiltComposer::new(&config.layers)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmTiltComposer { inner })
    }

    pub fn update(&self, x: f64, y: f64) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.update(x, y))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn perspective_origin(&self, x: f64, y: f64) -> String {
        perspective_origin(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_pointer_is_neutral() {
        let layer = LayerOptions::default();
        assert_eq!(compose(&layer, 0.5, 0.5), "translate3d(0.00px, 0.00px, 0px)");
    }

    #[test]
    fn full_deflection_reaches_the_configured_max() {
        let layer = LayerOptions::default();
        assert_eq!(
            compose(&layer, 1.0, 0.0),
            "translate3d(50.00px, -50.00px, 0px)"
        );
    }

    #[test]
    fn depth_weights_the_translation() {
        let layer = LayerOptions {
            depth: 0.5,
            ..LayerOptions::default()
        };
        assert_eq!(
            compose(&layer, 1.0, 0.5),
            "translate3d(25.00px, 0.00px, 0px)"
        );
    }

    #[test]
    fn inversion_flips_one_axis_only() {
        let layer = LayerOptions {
            translation: Some(EffectOptions {
                max: 50.0,
                invert_x: true,
                invert_y: false,
            }),
            ..LayerOptions::default()
        };
        assert_eq!(
            compose(&layer, 1.0, 1.0),
            "translate3d(-50.00px, 50.00px, 0px)"
        );
    }

    #[test]
    fn effects_compose_in_fixed_order() {
        let layer = LayerOptions {
            perspective_z: Some(600.0),
            translation: Some(EffectOptions::with_max(10.0)),
            rotation: Some(EffectOptions::with_max(20.0)),
            skew: Some(EffectOptions::with_max(5.0)),
            scale: Some(EffectOptions::with_max(0.5)),
            ..LayerOptions::default()
        };
        let transform = compose(&layer, 1.0, 1.0);
        assert_eq!(
            transform,
            "perspective(600px) translate3d(10.00px, 10.00px, 0px) \
             scale(1.500, 1.500) skew(5.00deg, 5.00deg) \
             rotateX(20.00deg) rotateY(20.00deg)"
        );
    }

    #[test]
    fn scale_inversion_shrinks() {
        let layer = LayerOptions {
            translation: None,
            scale: Some(EffectOptions {
                max: 0.4,
                invert_x: true,
                invert_y: false,
            }),
            ..LayerOptions::default()
        };
        assert_eq!(compose(&layer, 1.0, 1.0), "scale(0.600, 1.400)");
    }

    #[test]
    fn dataset_overrides_are_parsed_once() {
        let spec = LayerSpec::Dataset {
            overrides: [
                ("depth".to_string(), "0.25".to_string()),
                ("rotationMax".to_string(), "30".to_string()),
                ("rotationInvertX".to_string(), "true".to_string()),
            ]
            .into_iter()
            .collect(),
        };
        let options = spec.resolve().unwrap();
        assert_eq!(options.depth, 0.25);
        let rotation = options.rotation.unwrap();
        assert_eq!(rotation.max, 30.0);
        assert!(rotation.invert_x);
        assert!(!rotation.invert_y);
    }

    #[test]
    fn bad_dataset_values_fail_fast() {
        let spec = LayerSpec::Dataset {
            overrides: [("depth".to_string(), "deep".to_string())]
                .into_iter()
                .collect(),
        };
        assert!(matches!(
            spec.resolve(),
            Err(EngineError::InvalidConfig(_))
        ));

        let spec = LayerSpec::Dataset {
            overrides: [("zoomMax".to_string(), "1".to_string())]
                .into_iter()
                .collect(),
        };
        assert!(matches!(
            spec.resolve(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn perspective_origin_percentages() {
        assert_eq!(perspective_origin(0.25, 0.75), "25.0% 75.0%");
        assert_eq!(perspective_origin(-0.5, 1.5), "0.0% 100.0%");
    }

    #[test]
    fn composer_resolves_mixed_specs_from_json() {
        let config_json = r#"{
            "layers": [
                { "kind": "record", "depth": 0.5 },
                { "kind": "dataset", "overrides": { "translationMax": "20" } }
            ]
        }"#;
        let config: TiltComposerConfig = serde_json::from_str(config_json).unwrap();
        let composer = TiltComposer::new(&config.layers).unwrap();
        assert_eq!(composer.layers().len(), 2);
        assert_eq!(composer.layers()[1].translation.unwrap().max, 20.0);

        let transforms = composer.update(1.0, 0.5);
        assert_eq!(transforms[0].transform, "translate3d(25.00px, 0.00px, 0px)");
        assert_eq!(transforms[1].transform, "translate3d(20.00px, 0.00px, 0px)");
    }
}
