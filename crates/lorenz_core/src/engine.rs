//! Trajectory engine: owns the trajectory set and drives the stepper over it.
//!
//! Two usage modes share the same storage:
//! - bulk: [`TrajectoryEngine::precompute`] a horizon up front and let the renderer
//!   scrub through it with [`TrajectoryEngine::prefix`];
//! - live: call [`TrajectoryEngine::advance_all`] once per frame.
//!
//! Trajectories are independent, so with the `parallel` feature every batch is
//! integrated across trajectories on the rayon pool. Results are identical either way.

use crate::error::{EngineError, EngineResult};
use crate::lorenz::{Parameters, State};
use crate::seeding::validate_seeds;
use crate::solvers::ForwardEuler;
use crate::traits::Steppable;
use crate::trajectory::{Bounds, Trajectory, TrajectorySet, TrajectoryTag};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Upper bound on the steps integrated per trajectory before the batch is appended.
const BATCH_STEPS: usize = 4096;

#[derive(Debug)]
pub struct TrajectoryEngine<S = ForwardEuler<f64>> {
    params: Parameters,
    dt: f64,
    set: TrajectorySet,
    stepper: S,
    halt_on_non_finite: bool,
    halted: Option<(usize, usize)>,
}

impl TrajectoryEngine<ForwardEuler<f64>> {
    /// Builds an engine integrating each seed with forward Euler.
    pub fn new(params: Parameters, dt: f64, seeds: Vec<State>) -> EngineResult<Self> {
        Self::with_stepper(params, dt, seeds, ForwardEuler::new(3))
    }
}

impl<S> TrajectoryEngine<S>
where
    S: Steppable<f64> + Clone + Send + Sync,
{
    /// Builds an engine around an arbitrary stepper. Each trajectory gets its own clone.
    pub fn with_stepper(
        params: Parameters,
        dt: f64,
        seeds: Vec<State>,
        stepper: S,
    ) -> EngineResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(EngineError::InvalidParameter(format!(
                "Step size dt must be positive and finite, got {dt}."
            )));
        }
        if !params.is_finite() {
            return Err(EngineError::InvalidParameter(format!(
                "Parameters must be finite, got {params:?}."
            )));
        }
        validate_seeds(&seeds)?;

        debug!(trajectories = seeds.len(), dt, ?params, "trajectory engine created");

        Ok(Self {
            params,
            dt,
            set: TrajectorySet::new(seeds, Vec::new()),
            stepper,
            halt_on_non_finite: false,
            halted: None,
        })
    }

    /// Attaches renderer tags. Trajectories without a tag keep the default.
    pub fn with_tags(mut self, tags: Vec<TrajectoryTag>) -> EngineResult<Self> {
        if tags.len() > self.set.len() {
            return Err(EngineError::InvalidParameter(format!(
                "Got {} tags for {} trajectories.",
                tags.len(),
                self.set.len()
            )));
        }
        self.set.retag(tags);
        Ok(self)
    }

    /// Stop integrating once any trajectory produces a non-finite state.
    pub fn halt_on_non_finite(mut self, halt: bool) -> Self {
        self.halt_on_non_finite = halt;
        if halt && self.halted.is_none() {
            self.halted = self
                .set
                .iter()
                .enumerate()
                .find_map(|(index, t)| t.first_non_finite().map(|step| (index, step)));
        }
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of trajectories.
    pub fn count(&self) -> usize {
        self.set.len()
    }

    /// Points recorded per trajectory. All trajectories always share this length.
    pub fn len(&self) -> usize {
        self.set.as_slice()[0].len()
    }

    /// Always false: every trajectory holds at least its seed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Simulated time at point index `step`.
    pub fn time_at(&self, step: usize) -> f64 {
        step as f64 * self.dt
    }

    pub fn trajectories(&self) -> &TrajectorySet {
        &self.set
    }

    pub fn trajectory(&self, index: usize) -> EngineResult<&Trajectory> {
        self.set.get(index).ok_or_else(|| {
            EngineError::OutOfRange(format!(
                "Trajectory index {index} is outside [0, {}).",
                self.set.len()
            ))
        })
    }

    /// `(trajectory, step)` of the state that halted integration, if it has halted.
    pub fn halted_at(&self) -> Option<(usize, usize)> {
        self.halted
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.set.bounds()
    }

    /// Appends `horizon` steps to every trajectory and returns how many were appended.
    ///
    /// Fewer than `horizon` are appended only when halting on non-finite states is
    /// enabled and a trajectory blew up.
    pub fn precompute(&mut self, horizon: usize) -> usize {
        self.run(horizon, None)
    }

    /// Like [`precompute`](Self::precompute), but checks `stop` between steps and
    /// returns early once it is set. Points appended before the stop are the same
    /// ones an uninterrupted run would have produced.
    pub fn precompute_until(&mut self, horizon: usize, stop: &AtomicBool) -> usize {
        self.run(horizon, Some(stop))
    }

    /// Appends exactly one step to every trajectory and returns the new states.
    pub fn advance_all(&mut self) -> EngineResult<Vec<State>> {
        if let Some((trajectory, step)) = self.halted {
            return Err(EngineError::Halted { trajectory, step });
        }
        self.run(1, None);
        Ok(self.set.iter().map(Trajectory::last).collect())
    }

    /// Grows every trajectory to at least `length` points. Returns the steps appended.
    pub fn extend_to(&mut self, length: usize) -> usize {
        let missing = length.saturating_sub(self.len());
        self.run(missing, None)
    }

    /// The first `length` states of trajectory `index`.
    pub fn prefix(&self, index: usize, length: usize) -> EngineResult<&[State]> {
        let trajectory = self.trajectory(index)?;
        trajectory.prefix(length).ok_or_else(|| {
            EngineError::OutOfRange(format!(
                "Requested {length} points of trajectory {index}, only {} recorded.",
                trajectory.len()
            ))
        })
    }

    /// Every state recorded so far for trajectory `index`.
    pub fn full(&self, index: usize) -> EngineResult<&[State]> {
        Ok(self.trajectory(index)?.points())
    }

    /// Prefixes of every trajectory at the same length, in trajectory order.
    pub fn frame(&self, length: usize) -> EngineResult<Vec<&[State]>> {
        (0..self.count())
            .map(|index| self.prefix(index, length))
            .collect()
    }

    fn run(&mut self, steps: usize, stop: Option<&AtomicBool>) -> usize {
        let mut appended = 0;
        while appended < steps && self.halted.is_none() {
            let chunk = (steps - appended).min(BATCH_STEPS);
            let done = self.run_batch(chunk, stop);
            appended += done;
            if done < chunk {
                break;
            }
        }

        if steps > 0 {
            debug!(
                requested = steps,
                appended,
                len = self.len(),
                stopped_early = appended < steps,
                "integration finished"
            );
        }
        appended
    }

    /// Integrates at most `steps` steps for every trajectory and appends the common part.
    fn run_batch(&mut self, steps: usize, stop: Option<&AtomicBool>) -> usize {
        let params = self.params;
        let dt = self.dt;
        let halt = self.halt_on_non_finite;
        let start = self.len();
        let t0 = self.time_at(start - 1);
        let proto = &self.stepper;
        let integrate = |trajectory: &Trajectory| {
            integrate_batch(proto.clone(), &params, trajectory.last(), t0, dt, steps, halt, stop)
        };

        #[cfg(feature = "parallel")]
        let batches: Vec<Vec<State>> = self.set.as_slice().par_iter().map(integrate).collect();
        #[cfg(not(feature = "parallel"))]
        let batches: Vec<Vec<State>> = self.set.as_slice().iter().map(integrate).collect();

        // Trajectories must stay in lockstep, so keep only the steps every batch reached.
        let appended = batches.iter().map(Vec::len).min().unwrap_or(0);

        for (index, (trajectory, batch)) in self
            .set
            .as_mut_slice()
            .iter_mut()
            .zip(&batches)
            .enumerate()
        {
            if let Some(step) = trajectory.append(&batch[..appended]) {
                warn!(
                    trajectory = index,
                    step,
                    state = ?trajectory.points()[step],
                    "trajectory became non-finite"
                );
                if halt && self.halted.is_none() {
                    self.halted = Some((index, step));
                }
            }
        }

        appended
    }
}

#[allow(clippy::too_many_arguments)]
fn integrate_batch<S: Steppable<f64>>(
    mut stepper: S,
    params: &Parameters,
    from: State,
    t0: f64,
    dt: f64,
    steps: usize,
    halt: bool,
    stop: Option<&AtomicBool>,
) -> Vec<State> {
    let mut batch = Vec::with_capacity(steps);
    let mut buf = from.to_array();
    let mut t = t0;

    for _ in 0..steps {
        if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            break;
        }
        stepper.step(params, &mut t, &mut buf, dt);
        let next = State::from(buf);
        batch.push(next);
        if halt && !next.is_finite() {
            break;
        }
    }

    batch
}
