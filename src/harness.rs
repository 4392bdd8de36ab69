//! Sequences one or several runs: configure, initialize, iterate,
//! normalize, export. Every run gets a fresh [`FlowState`].

use crate::boundary::initialize_edges;
use crate::config::{FlowModel, SimulationConfig};
use crate::domain::*;
use crate::error::ConfigError;
use crate::export::Exporter;
use crate::grid::Grid;
use crate::potential::solve_potential;
use crate::reynolds::ReynoldsParameters;
use crate::solver::*;
use serde::Serialize;

/// Divide the streamfunction by `V0 h`.
pub fn normalize(grid: &Grid, state: &mut FlowState, chunk_size: usize) {
    let scale = grid.inflow_velocity() * grid.spacing();
    state.stream.par_map_values(|u| u / scale, chunk_size);
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct VelocitySample {
    pub i: i32,
    pub j: i32,
    /// `du/dy`
    pub vx: f64,
    /// `-du/dx`
    pub vy: f64,
}

impl VelocitySample {
    pub fn magnitude(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Centered difference velocities for `1 <= i < nx - 1`, `1 <= j < ny - 1`,
/// obstacle nodes skipped.
pub fn velocity_field(grid: &Grid, state: &FlowState) -> Vec<VelocitySample> {
    let two_h = 2.0 * grid.spacing();
    let mut samples = Vec::new();
    for i in 1..grid.nx() - 1 {
        for j in 1..grid.ny() - 1 {
            if grid.is_inside_obstacle(i, j) {
                continue;
            }
            samples.push(VelocitySample {
                i,
                j,
                vx: (state.u(i, j + 1) - state.u(i, j - 1)) / two_h,
                vy: -(state.u(i + 1, j) - state.u(i - 1, j)) / two_h,
            });
        }
    }
    samples
}

/// The accepted, normalized result of one run, handed to exporters.
#[derive(Debug, Clone)]
pub struct FlowSolution {
    /// File name tag, `Re0.5` or `potential`.
    pub tag: String,
    /// `None` for potential flow.
    pub reynolds: Option<f64>,
    pub grid: Grid,
    pub state: FlowState,
    pub velocity: Vec<VelocitySample>,
}

impl FlowSolution {
    pub fn new(
        tag: String,
        reynolds: Option<f64>,
        grid: Grid,
        state: FlowState,
    ) -> Self {
        let velocity = velocity_field(&grid, &state);
        FlowSolution {
            tag,
            reynolds,
            grid,
            state,
            velocity,
        }
    }
}

pub fn reynolds_tag(reynolds: f64) -> String {
    format!("Re{reynolds:.1}")
}

/// What the sweep keeps of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub model: FlowModel,
    pub reynolds: Option<f64>,
    #[serde(flatten)]
    pub termination: Termination,
    pub iterations: usize,
    pub final_changes: ChangeNorms,
    pub effective_tolerance: f64,
    pub success: bool,
}

impl RunReport {
    fn new(model: FlowModel, reynolds: Option<f64>, outcome: &RunOutcome) -> Self {
        RunReport {
            model,
            reynolds,
            termination: outcome.termination,
            iterations: outcome.iterations,
            final_changes: outcome.final_changes,
            effective_tolerance: outcome.effective_tolerance,
            success: outcome.termination.is_accepted(),
        }
    }
}

pub struct RunResult {
    pub report: RunReport,
    /// Present only for accepted runs.
    pub solution: Option<FlowSolution>,
}

/// Run one viscous solve at `reynolds` and export it if accepted.
pub fn run_reynolds<P: ProgressObserver + ?Sized>(
    config: &SimulationConfig,
    grid: &Grid,
    reynolds: f64,
    exporters: &[Box<dyn Exporter>],
    observer: &mut P,
) -> RunResult {
    profiling::scope!("harness::run_reynolds");
    let params = ReynoldsParameters::configure(reynolds, grid);
    let mut state = FlowState::new(*grid.aabb());
    initialize_edges(grid, &mut state, config.chunk_size);

    let mut controller =
        RelaxationController::new(grid, params, &config.into());
    let outcome = controller.run(&mut state, observer);
    let report = RunReport::new(FlowModel::Viscous, Some(reynolds), &outcome);
    let solution = finish_run(
        config,
        grid,
        state,
        &outcome,
        reynolds_tag(reynolds),
        Some(reynolds),
        exporters,
    );
    RunResult { report, solution }
}

/// Run the potential flow solve and export it if accepted.
pub fn run_potential<P: ProgressObserver + ?Sized>(
    config: &SimulationConfig,
    grid: &Grid,
    exporters: &[Box<dyn Exporter>],
    observer: &mut P,
) -> RunResult {
    profiling::scope!("harness::run_potential");
    let mut state = FlowState::new(*grid.aabb());
    initialize_edges(grid, &mut state, config.chunk_size);
    let outcome = solve_potential(
        grid,
        &mut state,
        &config.into(),
        config.potential_tolerance,
        observer,
    );
    let report = RunReport::new(FlowModel::Potential, None, &outcome);
    let solution = finish_run(
        config,
        grid,
        state,
        &outcome,
        "potential".to_string(),
        None,
        exporters,
    );
    RunResult { report, solution }
}

fn finish_run(
    config: &SimulationConfig,
    grid: &Grid,
    mut state: FlowState,
    outcome: &RunOutcome,
    tag: String,
    reynolds: Option<f64>,
    exporters: &[Box<dyn Exporter>],
) -> Option<FlowSolution> {
    if !outcome.termination.is_accepted() {
        tracing::warn!(%tag, "run not accepted, skipping export");
        return None;
    }
    normalize(grid, &mut state, config.chunk_size);
    let solution = FlowSolution::new(tag, reynolds, *grid, state);
    for exporter in exporters {
        if let Err(e) = exporter.export(&solution) {
            tracing::error!(
                exporter = exporter.name(),
                tag = %solution.tag,
                "export failed: {e}"
            );
        }
    }
    Some(solution)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    pub runs: Vec<RunReport>,
}

impl SweepSummary {
    pub fn succeeded(&self) -> usize {
        self.runs.iter().filter(|r| r.success).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.runs.len()
    }
}

/// Validate the configuration and run every requested solve in order.
pub fn sweep<P: ProgressObserver + ?Sized>(
    config: &SimulationConfig,
    exporters: &[Box<dyn Exporter>],
    observer: &mut P,
) -> Result<SweepSummary, ConfigError> {
    let grid = config.validate()?;
    tracing::info!(
        nx = grid.nx(),
        ny = grid.ny(),
        obstacle = %grid.obstacle().aabb(),
        model = ?config.model,
        "starting sweep"
    );

    let runs: Vec<RunReport> = match config.model {
        FlowModel::Viscous => config
            .reynolds
            .iter()
            .map(|&re| {
                run_reynolds(config, &grid, re, exporters, observer).report
            })
            .collect(),
        FlowModel::Potential => {
            vec![run_potential(config, &grid, exporters, observer).report]
        }
    };

    let summary = SweepSummary { runs };
    for run in &summary.runs {
        tracing::info!(
            reynolds = ?run.reynolds,
            status = %run.termination,
            iterations = run.iterations,
            success = run.success,
            "run summary"
        );
    }
    tracing::info!(
        succeeded = summary.succeeded(),
        total = summary.runs.len(),
        "sweep finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::grid::Obstacle;
    use float_cmp::assert_approx_eq;

    #[test]
    fn normalize_test() {
        let grid = Grid::new(20, 8, 0.5, 4.0, Obstacle::new(4, 2, 3)).unwrap();
        let mut state = FlowState::new(*grid.aabb());
        initialize_edges(&grid, &mut state, 8);
        normalize(&grid, &mut state, 8);
        assert_approx_eq!(f64, state.u(15, 3), 3.0 * 4.0 / 2.0);
    }

    #[test]
    fn velocity_field_test() {
        let grid = Grid::new(20, 8, 1.0, 1.0, Obstacle::new(4, 2, 3)).unwrap();
        let mut state = FlowState::new(*grid.aabb());
        state.stream.par_set_values(|c| 2.0 * c[1] as f64 + c[0] as f64, 8);
        let samples = velocity_field(&grid, &state);

        // (1..19) x (1..7) minus the 4 x 2 block of beam nodes in range.
        assert_eq!(samples.len(), 18 * 6 - 4 * 2);
        for s in &samples {
            assert!(!grid.is_inside_obstacle(s.i, s.j));
            assert_approx_eq!(f64, s.vx, 2.0);
            assert_approx_eq!(f64, s.vy, -1.0);
            assert_approx_eq!(f64, s.magnitude(), 5.0f64.sqrt());
        }
    }

    #[test]
    fn reynolds_tag_test() {
        assert_eq!(reynolds_tag(0.5), "Re0.5");
        assert_eq!(reynolds_tag(5.0), "Re5.0");
    }

    #[test]
    fn rejected_run_is_not_exported_test() {
        let config = SimulationConfig {
            nx: 30,
            ny: 10,
            obstacle: crate::config::ObstacleGeometry {
                start: 6,
                height: 3,
                length: 4,
            },
            max_iterations: 3,
            sweep_order: crate::relax::SweepOrder::Sequential,
            ..SimulationConfig::default()
        };
        let grid = config.validate().unwrap();
        let result = run_reynolds(&config, &grid, 1.0, &[], &mut NullProgress);
        assert_eq!(result.report.iterations, 3);
        assert!(!result.report.success);
        assert!(result.solution.is_none());
    }
}
