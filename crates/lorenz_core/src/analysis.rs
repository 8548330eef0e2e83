use crate::{
    lorenz::{Parameters, State},
    solvers::ForwardEuler,
    traits::Steppable,
};
use anyhow::{bail, Result};
use serde::Serialize;

/// Pointwise Euclidean distance between two trajectories, up to the shorter length.
pub fn separation_series(a: &[State], b: &[State]) -> Vec<f64> {
    a.iter().zip(b).map(|(p, q)| p.distance(q)).collect()
}

/// First step at which the two trajectories are more than `threshold` apart.
pub fn divergence_onset(a: &[State], b: &[State], threshold: f64) -> Option<usize> {
    a.iter().zip(b).position(|(p, q)| p.distance(q) > threshold)
}

#[derive(Debug, Clone, Serialize)]
pub struct DivergenceSummary {
    pub initial_separation: f64,
    pub max_separation: f64,
    /// Step of the first separation above the threshold, if one occurred.
    pub onset_step: Option<usize>,
}

pub fn summarize_divergence(a: &[State], b: &[State], threshold: f64) -> Result<DivergenceSummary> {
    if a.is_empty() || b.is_empty() {
        bail!("Both trajectories must contain at least one state.");
    }
    if threshold.is_nan() || threshold <= 0.0 {
        bail!("Divergence threshold must be positive.");
    }
    let series = separation_series(a, b);
    let max_separation = series.iter().copied().fold(0.0, f64::max);
    Ok(DivergenceSummary {
        initial_separation: series[0],
        max_separation,
        onset_step: series.iter().position(|&d| d > threshold),
    })
}

/// Largest Lyapunov exponent by the two-trajectory renormalization method.
///
/// A companion state starts `initial_separation` away from `seed`; both are stepped
/// with forward Euler and every `renorm_stride` steps the companion is pulled back
/// to `initial_separation` along the current separation direction, accumulating the
/// log stretch. The result is normalized by total integration time.
pub fn largest_lyapunov_exponent(
    params: &Parameters,
    seed: State,
    dt: f64,
    steps: usize,
    renorm_stride: usize,
    initial_separation: f64,
) -> Result<f64> {
    if !seed.is_finite() {
        bail!("Seed state must be finite.");
    }
    if steps == 0 {
        bail!("Lyapunov estimation requires at least one integration step.");
    }
    if !dt.is_finite() || dt <= 0.0 {
        bail!("Step size dt must be positive.");
    }
    if renorm_stride == 0 {
        bail!("renorm_stride must be at least 1.");
    }
    if !initial_separation.is_finite() || initial_separation <= 0.0 {
        bail!("initial_separation must be positive.");
    }

    let d0 = initial_separation;
    let mut reference = seed.to_array();
    let offset = d0 / 3f64.sqrt();
    let mut companion = seed.offset(offset).to_array();

    let mut ref_stepper = ForwardEuler::<f64>::new(3);
    let mut comp_stepper = ForwardEuler::<f64>::new(3);
    let mut t_ref = 0.0;
    let mut t_comp = 0.0;
    let mut accum = 0.0;
    let mut since_last = 0usize;

    for step in 1..=steps {
        ref_stepper.step(params, &mut t_ref, &mut reference, dt);
        comp_stepper.step(params, &mut t_comp, &mut companion, dt);
        since_last += 1;

        if since_last == renorm_stride || step == steps {
            let r = State::from(reference);
            let delta = State::from(companion) - r;
            let d = delta.norm();
            if !d.is_finite() {
                bail!("Trajectory became non-finite at step {step}; reduce dt.");
            }
            if d <= f64::MIN_POSITIVE {
                bail!("Trajectories collapsed onto each other at step {step}.");
            }
            accum += (d / d0).ln();
            companion = (r + delta * (d0 / d)).to_array();
            since_last = 0;
        }
    }

    Ok(accum / (steps as f64 * dt))
}

#[cfg(test)]
mod tests {
    use super::{
        divergence_onset, largest_lyapunov_exponent, separation_series, summarize_divergence,
    };
    use crate::engine::TrajectoryEngine;
    use crate::lorenz::{Parameters, State};

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn separation_series_truncates_to_shorter_trajectory() {
        let a = [State::default(), State::new(3.0, 4.0, 0.0), State::new(1.0, 1.0, 1.0)];
        let b = [State::default(), State::default()];
        assert_eq!(separation_series(&a, &b), vec![0.0, 5.0]);
        assert_eq!(divergence_onset(&a, &b, 1.0), Some(1));
        assert_eq!(divergence_onset(&a, &b, 10.0), None);
    }

    #[test]
    fn engine_pair_shows_chaotic_divergence() {
        let seed = State::new(0.0, 1.0, 1.05);
        let mut engine = TrajectoryEngine::new(
            Parameters::default(),
            0.01,
            vec![seed, seed.offset(1e-10)],
        )
        .expect("engine");
        engine.precompute(10_000);

        let summary = summarize_divergence(
            engine.full(0).expect("a"),
            engine.full(1).expect("b"),
            1.0,
        )
        .expect("summary");
        assert!(summary.initial_separation < 1e-9);
        let onset = summary.onset_step.expect("trajectories never separated");
        assert!(onset > 100, "diverged suspiciously early at {onset}");
        assert!(summary.max_separation / summary.initial_separation > 1e6);
    }

    #[test]
    fn summarize_rejects_bad_inputs() {
        assert_err_contains(summarize_divergence(&[], &[State::default()], 1.0), "at least one");
        assert_err_contains(
            summarize_divergence(&[State::default()], &[State::default()], 0.0),
            "threshold",
        );
    }

    #[test]
    fn lyapunov_rejects_invalid_inputs() {
        let params = Parameters::default();
        let seed = State::new(1.0, 1.0, 1.0);
        assert_err_contains(largest_lyapunov_exponent(&params, seed, 0.01, 0, 1, 1e-8), "at least one");
        assert_err_contains(largest_lyapunov_exponent(&params, seed, 0.0, 10, 1, 1e-8), "dt");
        assert_err_contains(largest_lyapunov_exponent(&params, seed, 0.01, 10, 0, 1e-8), "renorm_stride");
        assert_err_contains(largest_lyapunov_exponent(&params, seed, 0.01, 10, 1, 0.0), "initial_separation");
        assert_err_contains(
            largest_lyapunov_exponent(&params, State::new(f64::NAN, 0.0, 0.0), 0.01, 10, 1, 1e-8),
            "finite",
        );
    }

    #[test]
    fn lyapunov_is_positive_in_chaotic_regime() {
        let exponent = largest_lyapunov_exponent(
            &Parameters::default(),
            State::new(1.0, 1.0, 1.0),
            0.01,
            50_000,
            10,
            1e-8,
        )
        .expect("exponent");
        assert!(exponent > 0.5 && exponent < 1.5, "exponent {exponent}");
    }

    #[test]
    fn lyapunov_is_negative_below_first_bifurcation() {
        let exponent = largest_lyapunov_exponent(
            &Parameters::new(10.0, 0.5, 8.0 / 3.0),
            State::new(1.0, 1.0, 1.0),
            0.01,
            20_000,
            10,
            1e-8,
        )
        .expect("exponent");
        assert!(exponent < 0.0, "exponent {exponent}");
    }
}
