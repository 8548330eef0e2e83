use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Explicit first-order Euler: `x_{n+1} = x_n + f(t_n, x_n) * dt`.
#[derive(Debug, Clone)]
pub struct ForwardEuler<T: Scalar> {
    deriv: Vec<T>,
}

impl<T: Scalar> ForwardEuler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            deriv: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for ForwardEuler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        if self.deriv.len() != state.len() {
            self.deriv.resize(state.len(), T::zero());
        }

        system.apply(*t, state, &mut self.deriv);

        for (x, dx) in state.iter_mut().zip(&self.deriv) {
            *x = *x + *dx * dt;
        }

        *t = *t + dt;
    }
}
