pub mod boundary;
pub mod build_info;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod grid;
pub mod harness;
pub mod potential;
pub mod relax;
pub mod reynolds;
pub mod solver;
pub mod stencil;
pub mod util;

pub use config::SimulationConfig;
pub use grid::{Grid, Obstacle};
