//! Deterministic double pendulum simulation.
//!
//! [`DoublePendulum`] owns the angular state and advances it with fixed-step RK4.
//! [`Session`] and [`Scheduler`] drive an engine from a stream of frame timestamps, and
//! [`Viewport`] maps the result onto a drawing surface.

pub mod config;
pub mod model;
pub mod pendulum;
pub mod scheduler;
pub mod session;
pub mod trail;
pub mod viewport;

pub use config::{ConfigErrors, SimulationConfig};
pub use model::{AngularState, Energy, PendulumParameters, Point, Positions};
pub use pendulum::{DoublePendulum, PendulumOptions};
pub use scheduler::{CatchUp, Scheduler, SyncMode, TickOutcome};
pub use session::{Session, SimulationInputs};
pub use trail::{Trail, TrailLimit};
pub use viewport::{Frame, Viewport};
