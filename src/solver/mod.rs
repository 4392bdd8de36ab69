//! Iteration control: one relaxation iteration, the change norms it
//! produces, and the decision of when a run is done.

mod controller;
mod monitor;
mod progress;
mod residual;

pub use controller::*;
pub use monitor::*;
pub use progress::*;
pub use residual::*;
