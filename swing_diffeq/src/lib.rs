use std::fmt::Debug;

use thiserror::Error;

/// Submodules for core ODE system components.
pub mod result;
pub mod rk;
pub mod state;
pub mod tableau;

pub use result::MemoryResult;
pub use rk::RungeKutta;
pub use state::{Integrable, state_array::StateArray};
pub use tableau::ButcherTableau;

#[derive(Debug, Error)]
pub enum DiffeqErrors {
    #[error("dt must be positive and finite, got {0}")]
    InvalidStep(f64),
    #[error("tspan end {1} precedes tspan start {0}")]
    InvalidSpan(f64, f64),
}

/// Trait for defining a dynamical system model that can be numerically integrated.
///
/// Types implementing this trait must define how to compute the derivative (or RHS function)
/// of the ODE at a given time and state. The model is borrowed immutably, so evaluating
/// a derivative can never change the model or the state being integrated.
pub trait OdeModel: Debug {
    type State: Integrable;
    /// Compute the derivative at time `t` and state `state`, storing the result in `derivative`.
    fn f(&self, t: f64, state: &Self::State, derivative: &mut Self::State);
}
