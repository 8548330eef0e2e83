use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Floating-point type the Lorenz field and its steppers run in. `Send + Sync` so
/// trajectories can be integrated on the rayon pool.
pub trait Scalar: Float + FromPrimitive + Debug + Send + Sync + 'static {}

impl<T: Float + FromPrimitive + Debug + Send + Sync + 'static> Scalar for T {}

/// Converts an `f64` coefficient into `T`, yielding NaN when `T` cannot represent it.
pub fn cast<T: Scalar>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// Right-hand side of an autonomous or time-dependent ODE `dx/dt = f(t, x)`.
///
/// [`Parameters`](crate::lorenz::Parameters) is the only field the engine integrates;
/// tests implement others to check steppers in isolation.
pub trait DynamicalSystem<T: Scalar> {
    /// Length of the state slices passed to [`apply`](Self::apply).
    fn dimension(&self) -> usize;

    /// Writes `f(t, x)` into `out`, which has the same length as `x`.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// Fixed-step integration scheme used to grow every trajectory.
///
/// The engine clones one stepper per trajectory, so any scratch space a scheme keeps
/// is never shared between trajectories.
pub trait Steppable<T: Scalar> {
    /// Replaces `state` with its value one step of `dt` later and adds `dt` to `t`.
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}
