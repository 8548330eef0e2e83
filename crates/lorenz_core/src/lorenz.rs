use crate::traits::{cast, DynamicalSystem, Scalar};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Coefficients of the Lorenz vector field.
///
/// Every trajectory of an engine shares one `Parameters` value; it is fixed at
/// construction and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default = "Parameters::default_sigma")]
    pub sigma: f64,
    #[serde(default = "Parameters::default_rho")]
    pub rho: f64,
    #[serde(default = "Parameters::default_beta")]
    pub beta: f64,
}

impl Parameters {
    pub fn new(sigma: f64, rho: f64, beta: f64) -> Self {
        Self { sigma, rho, beta }
    }

    fn default_sigma() -> f64 {
        10.0
    }
    fn default_rho() -> f64 {
        28.0
    }
    fn default_beta() -> f64 {
        8.0 / 3.0
    }

    pub fn is_finite(&self) -> bool {
        self.sigma.is_finite() && self.rho.is_finite() && self.beta.is_finite()
    }

    /// Evaluates `(dx/dt, dy/dt, dz/dt)` at `state`.
    pub fn derivative(&self, state: State) -> State {
        State {
            x: self.sigma * (state.y - state.x),
            y: state.x * (self.rho - state.z) - state.y,
            z: state.x * state.y - self.beta * state.z,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            sigma: Self::default_sigma(),
            rho: Self::default_rho(),
            beta: Self::default_beta(),
        }
    }
}

impl<T: Scalar> DynamicalSystem<T> for Parameters {
    fn dimension(&self) -> usize {
        3
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        let sigma: T = cast(self.sigma);
        let rho: T = cast(self.rho);
        let beta: T = cast(self.beta);
        out[0] = sigma * (x[1] - x[0]);
        out[1] = x[0] * (rho - x[2]) - x[1];
        out[2] = x[0] * x[1] - beta * x[2];
    }
}

/// A point `(x, y, z)` in phase space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct State {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl State {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &State) -> f64 {
        (*self - *other).norm()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns this state shifted by `offset` along every coordinate.
    pub fn offset(self, offset: f64) -> Self {
        Self::new(self.x + offset, self.y + offset, self.z + offset)
    }
}

impl From<[f64; 3]> for State {
    fn from(value: [f64; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<State> for [f64; 3] {
    fn from(value: State) -> Self {
        value.to_array()
    }
}

impl Add for State {
    type Output = State;

    fn add(self, rhs: State) -> State {
        State::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for State {
    type Output = State;

    fn sub(self, rhs: State) -> State {
        State::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for State {
    type Output = State;

    fn mul(self, rhs: f64) -> State {
        State::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Advances `state` by one forward-Euler step of size `dt`.
///
/// Pure and total: overflow shows up as infinite or NaN coordinates rather than an error.
pub fn step(state: State, params: &Parameters, dt: f64) -> State {
    state + params.derivative(state) * dt
}

#[cfg(test)]
mod tests {
    use super::{step, Parameters, State};
    use crate::solvers::ForwardEuler;
    use crate::traits::{DynamicalSystem, Steppable};

    #[test]
    fn single_step_matches_hand_computed_update() {
        let params = Parameters::default();
        let next = step(State::new(1.0, 1.0, 1.0), &params, 0.01);

        assert_eq!(next.x, 1.0 + (10.0 * (1.0 - 1.0)) * 0.01);
        assert_eq!(next.y, 1.0 + (1.0 * (28.0 - 1.0) - 1.0) * 0.01);
        assert_eq!(next.z, 1.0 + (1.0 * 1.0 - (8.0 / 3.0) * 1.0) * 0.01);
        assert_eq!(next.x, 1.0);
        assert!((next.y - 1.26).abs() < 1e-15);
    }

    #[test]
    fn origin_is_a_fixed_point() {
        let params = Parameters::default();
        let origin = State::default();
        assert_eq!(step(origin, &params, 0.01), origin);
    }

    #[test]
    fn free_step_agrees_with_euler_stepper() {
        let params = Parameters::new(10.0, 28.0, 8.0 / 3.0);
        let mut stepper = ForwardEuler::<f64>::new(3);
        let mut t = 0.0;
        let mut buf = [-3.2, 4.7, 21.0];
        let mut state = State::from(buf);

        for _ in 0..500 {
            stepper.step(&params, &mut t, &mut buf, 0.01);
            state = step(state, &params, 0.01);
        }

        assert_eq!(State::from(buf), state);
    }

    #[test]
    fn vector_field_evaluates_in_single_precision() {
        let params = Parameters::default();
        let mut out = [0.0f32; 3];
        DynamicalSystem::<f32>::apply(&params, 0.0, &[1.0, 2.0, 3.0], &mut out);
        assert_eq!(out[0], 10.0);
        assert_eq!(out[1], 1.0 * (28.0 - 3.0) - 2.0);
        assert!((out[2] - (2.0 - 8.0)).abs() < 1e-5);
    }

    #[test]
    fn blow_up_propagates_without_panicking() {
        let params = Parameters::default();
        let mut state = State::new(1e200, 1e200, 1e200);
        for _ in 0..5 {
            state = step(state, &params, 0.01);
        }
        assert!(!state.is_finite());
    }

    #[test]
    fn parameters_fill_missing_fields_with_classic_values() {
        let params: Parameters = serde_json::from_str(r#"{ "rho": 99.96 }"#).expect("parameters");
        assert_eq!(params.sigma, 10.0);
        assert_eq!(params.rho, 99.96);
        assert_eq!(params.beta, 8.0 / 3.0);
    }
}
