//! Engine wrapper handed to the JS renderer.

use crate::flatten_states;
use lorenz_core::{EngineConfig, EngineError, TrajectoryEngine};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmTrajectoryEngine {
    pub(crate) engine: TrajectoryEngine,
}

pub(crate) fn engine_error(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
#[allow(clippy::len_without_is_empty)]
impl WasmTrajectoryEngine {
    /// Builds an engine from a plain JS config object. `undefined` or `null` selects
    /// the defaults (three classic seeds, 10 000 precomputed steps).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmTrajectoryEngine, JsValue> {
        console_error_panic_hook::set_once();

        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid engine config: {}", e)))?
        };
        Self::from_config(&config).map_err(engine_error)
    }

    pub fn divergence_pair(seed: u32) -> Result<WasmTrajectoryEngine, JsValue> {
        console_error_panic_hook::set_once();
        Self::from_config(&EngineConfig::divergence_pair(seed as u64)).map_err(engine_error)
    }

    pub fn random_swarm(count: u32, seed: u32) -> Result<WasmTrajectoryEngine, JsValue> {
        console_error_panic_hook::set_once();
        let config =
            EngineConfig::random_swarm(count as usize, seed as u64).map_err(engine_error)?;
        Self::from_config(&config).map_err(engine_error)
    }

    pub fn count(&self) -> u32 {
        self.engine.count() as u32
    }

    /// Points recorded per trajectory.
    pub fn len(&self) -> u32 {
        self.engine.len() as u32
    }

    pub fn dt(&self) -> f64 {
        self.engine.dt()
    }

    pub fn precompute(&mut self, horizon: u32) -> u32 {
        self.engine.precompute(horizon as usize) as u32
    }

    pub fn extend_to(&mut self, length: u32) -> u32 {
        self.engine.extend_to(length as usize) as u32
    }

    /// One step for every trajectory; returns the new points flattened in trajectory order.
    pub fn advance_all(&mut self) -> Result<Vec<f64>, JsValue> {
        let states = self.engine.advance_all().map_err(engine_error)?;
        Ok(flatten_states(&states))
    }

    pub fn prefix(&self, index: u32, length: u32) -> Result<Vec<f64>, JsValue> {
        let states = self
            .engine
            .prefix(index as usize, length as usize)
            .map_err(engine_error)?;
        Ok(flatten_states(states))
    }

    pub fn full(&self, index: u32) -> Result<Vec<f64>, JsValue> {
        let states = self.engine.full(index as usize).map_err(engine_error)?;
        Ok(flatten_states(states))
    }

    /// The first `length` points of every trajectory, concatenated in trajectory order.
    pub fn frame(&self, length: u32) -> Result<Vec<f64>, JsValue> {
        let prefixes = self.engine.frame(length as usize).map_err(engine_error)?;
        let mut out = Vec::with_capacity(prefixes.len() * length as usize * 3);
        for prefix in prefixes {
            out.extend(flatten_states(prefix));
        }
        Ok(out)
    }

    pub fn tags(&self) -> Result<JsValue, JsValue> {
        let tags: Vec<_> = self
            .engine
            .trajectories()
            .iter()
            .map(|t| t.tag().clone())
            .collect();
        to_value(&tags).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Bounding box of the finite points so far, or `null` before any exist.
    pub fn bounds(&self) -> Result<JsValue, JsValue> {
        to_value(&self.engine.bounds())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

impl WasmTrajectoryEngine {
    pub(crate) fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            engine: config.build()?,
        })
    }
}
