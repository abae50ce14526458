use std::{
    fmt::Debug,
    ops::{AddAssign, MulAssign},
};

pub mod state_array;

/// Trait representing an integrable state for use in ODE solvers.
///
/// Types implementing this trait must support in-place scaling and accumulation,
/// cloning, and formatting for debugging. The derivative of a state is represented
/// by the same type, which keeps stage accumulation allocation free.
pub trait Integrable:
    Clone + Debug + Default + MulAssign<f64> + for<'a> AddAssign<&'a Self>
{
}

impl<T> Integrable for T where
    T: Clone + Debug + Default + MulAssign<f64> + for<'a> AddAssign<&'a T>
{
}
