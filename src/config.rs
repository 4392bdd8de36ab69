//! Run configuration, provided once at startup and immutable thereafter.

use crate::error::ConfigError;
use crate::grid::{Grid, Obstacle};
use crate::relax::SweepOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which equations are relaxed.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FlowModel {
    /// Coupled streamfunction / vorticity relaxation.
    Viscous,
    /// Inviscid limit, vorticity held at zero.
    Potential,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleGeometry {
    /// Column of the front face.
    pub start: i32,
    pub height: i32,
    pub length: i32,
}

impl From<ObstacleGeometry> for Obstacle {
    fn from(g: ObstacleGeometry) -> Self {
        Obstacle::new(g.start, g.height, g.length)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub nx: i32,
    pub ny: i32,
    /// Mesh spacing `h`.
    pub spacing: f64,
    /// Free stream velocity `V0`.
    pub inflow_velocity: f64,
    pub obstacle: ObstacleGeometry,
    /// Nominal tolerance, scaled up per Reynolds regime.
    pub tolerance: f64,
    pub reynolds: Vec<f64>,
    pub max_iterations: usize,
    /// Iterations that must elapse before a plateaued vorticity
    /// residual is accepted as partial convergence.
    pub partial_budget: usize,
    /// Two successive vorticity changes closer than this count as stagnant.
    pub stagnation_epsilon: f64,
    pub sweep_order: SweepOrder,
    /// Columns per rayon task in parallel sweeps.
    pub chunk_size: usize,
    /// Spike smoothing around the beam corners at high Reynolds numbers.
    pub corner_smoothing: bool,
    /// Overrides the per-regime progress interval.
    pub report_interval: Option<usize>,
    pub model: FlowModel,
    /// Tolerance of the potential flow solve.
    pub potential_tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            nx: 160,
            ny: 30,
            spacing: 1.0,
            inflow_velocity: 1.0,
            obstacle: ObstacleGeometry {
                start: 10,
                height: 8,
                length: 8,
            },
            tolerance: 1e-8,
            reynolds: vec![0.5, 1.0, 2.0, 5.0],
            max_iterations: 350_000,
            partial_budget: 50_000,
            stagnation_epsilon: 1e-15,
            sweep_order: SweepOrder::Parallel,
            chunk_size: 8,
            corner_smoothing: true,
            report_interval: None,
            model: FlowModel::Viscous,
            potential_tolerance: 1e-5,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check everything that can be checked before iterating
    /// and build the grid shared by every run.
    pub fn validate(&self) -> Result<Grid, ConfigError> {
        let grid = Grid::new(
            self.nx,
            self.ny,
            self.spacing,
            self.inflow_velocity,
            self.obstacle.into(),
        )?;
        for (name, value) in [
            ("tolerance", self.tolerance),
            ("potential_tolerance", self.potential_tolerance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.reynolds.is_empty() {
            return Err(ConfigError::NoReynolds);
        }
        if let Some(re) = self
            .reynolds
            .iter()
            .find(|re| !(re.is_finite() && **re > 0.0))
        {
            return Err(ConfigError::InvalidReynolds(*re));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(grid)
    }
}
