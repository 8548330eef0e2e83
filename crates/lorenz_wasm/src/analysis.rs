//! Divergence and Lyapunov helpers exposed on the engine wrapper.

use crate::engine::{engine_error, WasmTrajectoryEngine};
use js_sys::Float64Array;
use lorenz_core::analysis::{largest_lyapunov_exponent, separation_series, summarize_divergence};
use lorenz_core::EngineError;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
impl WasmTrajectoryEngine {
    /// Distance between trajectories `a` and `b` at every recorded step.
    pub fn separation(&self, a: u32, b: u32) -> Result<Float64Array, JsValue> {
        let series = self.separation_values(a, b).map_err(engine_error)?;
        Ok(Float64Array::from(series.as_slice()))
    }

    pub fn divergence_summary(&self, a: u32, b: u32, threshold: f64) -> Result<JsValue, JsValue> {
        let first = self.engine.full(a as usize).map_err(engine_error)?;
        let second = self.engine.full(b as usize).map_err(engine_error)?;
        let summary = summarize_divergence(first, second, threshold)
            .map_err(|e| JsValue::from_str(&format!("Divergence summary failed: {}", e)))?;
        to_value(&summary).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Largest Lyapunov exponent estimated from the seed of trajectory `index`, using
    /// the engine's parameters and step size.
    pub fn lyapunov_estimate(
        &self,
        index: u32,
        steps: u32,
        renorm_stride: u32,
        initial_separation: f64,
    ) -> Result<f64, JsValue> {
        let seed = self
            .engine
            .trajectory(index as usize)
            .map_err(engine_error)?
            .seed();
        let stride = if renorm_stride == 0 {
            1
        } else {
            renorm_stride as usize
        };
        largest_lyapunov_exponent(
            self.engine.parameters(),
            seed,
            self.engine.dt(),
            steps as usize,
            stride,
            initial_separation,
        )
        .map_err(|e| JsValue::from_str(&format!("Lyapunov estimation failed: {}", e)))
    }
}

impl WasmTrajectoryEngine {
    pub(crate) fn separation_values(&self, a: u32, b: u32) -> Result<Vec<f64>, EngineError> {
        let first = self.engine.full(a as usize)?;
        let second = self.engine.full(b as usize)?;
        Ok(separation_series(first, second))
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::WasmTrajectoryEngine;
    use lorenz_core::{EngineConfig, EngineError};

    #[test]
    fn separation_values_cover_every_step() {
        let config = EngineConfig {
            horizon: 3000,
            ..EngineConfig::divergence_pair(42)
        };
        let wasm = WasmTrajectoryEngine::from_config(&config).expect("engine");
        let series = wasm.separation_values(0, 1).expect("series");
        assert_eq!(series.len(), 3001);
        assert!(series[0] < 1e-9);
        assert!(series.iter().cloned().fold(0.0, f64::max) > series[0]);
    }

    #[test]
    fn separation_values_reject_unknown_trajectory() {
        let wasm = WasmTrajectoryEngine::from_config(&EngineConfig {
            horizon: 0,
            ..EngineConfig::default()
        })
        .expect("engine");
        assert!(matches!(
            wasm.separation_values(0, 3),
            Err(EngineError::OutOfRange(_))
        ));
    }

    #[test]
    fn lyapunov_estimate_uses_engine_settings() {
        let wasm = WasmTrajectoryEngine::from_config(&EngineConfig {
            horizon: 0,
            ..EngineConfig::default()
        })
        .expect("engine");
        let exponent = wasm.lyapunov_estimate(0, 20_000, 0, 1e-8).expect("exponent");
        assert!(exponent > 0.0, "exponent {exponent}");
    }
}
