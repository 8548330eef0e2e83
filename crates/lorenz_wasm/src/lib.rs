//! WASM bindings that let a JS renderer pull Lorenz trajectory data frame by frame.
//!
//! The renderer owns drawing, colours and timing; these bindings only expose the
//! engine's pull contract (`precompute` / `advance_all` / `prefix` / `full`).

mod analysis;
mod engine;

pub use engine::WasmTrajectoryEngine;

use lorenz_core::State;

/// Flattens states into `[x0, y0, z0, x1, y1, z1, ...]` for transfer as a typed array.
pub(crate) fn flatten_states(states: &[State]) -> Vec<f64> {
    let mut out = Vec::with_capacity(states.len() * 3);
    for s in states {
        out.extend_from_slice(&[s.x, s.y, s.z]);
    }
    out
}
