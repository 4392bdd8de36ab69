use crate::boundary::ObstacleBoundary;
use crate::config::SimulationConfig;
use crate::domain::*;
use crate::grid::Grid;
use crate::relax::{RelaxationStep, SweepOrder};
use crate::reynolds::ReynoldsParameters;
use crate::solver::*;
use rayon::prelude::*;

/// The run level knobs of the controller, independent of the Reynolds number.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerOptions {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub partial_budget: usize,
    pub stagnation_epsilon: f64,
    pub sweep_order: SweepOrder,
    pub chunk_size: usize,
    pub corner_smoothing: bool,
    pub report_interval: Option<usize>,
}

impl From<&SimulationConfig> for ControllerOptions {
    fn from(config: &SimulationConfig) -> Self {
        ControllerOptions {
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            partial_budget: config.partial_budget,
            stagnation_epsilon: config.stagnation_epsilon,
            sweep_order: config.sweep_order,
            chunk_size: config.chunk_size,
            corner_smoothing: config.corner_smoothing,
            report_interval: config.report_interval,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RunOutcome {
    pub termination: Termination,
    pub iterations: usize,
    pub final_changes: ChangeNorms,
    pub effective_tolerance: f64,
}

/// Largest per-node change between `before` and `after` over the
/// interior fluid nodes. NaN anywhere makes the result NaN.
pub fn change_norms(
    grid: &Grid,
    before: &FlowState,
    after: &FlowState,
    order: SweepOrder,
) -> ChangeNorms {
    profiling::scope!("solver::change_norms");
    let (u0, u1) = (before.stream.buffer(), after.stream.buffer());
    let (w0, w1) = (before.vorticity.buffer(), after.vorticity.buffer());
    let column = |i: i32| {
        let mut norms = ChangeNorms::ZERO;
        for j in 1..grid.ny() {
            if grid.is_inside_obstacle(i, j) {
                continue;
            }
            let l = grid.index(i, j);
            norms = norms.max(ChangeNorms {
                stream: (u1[l] - u0[l]).abs(),
                vorticity: (w1[l] - w0[l]).abs(),
            });
        }
        norms
    };
    match order {
        SweepOrder::Sequential => (1..grid.nx())
            .map(column)
            .fold(ChangeNorms::ZERO, ChangeNorms::max),
        SweepOrder::Parallel => (1..grid.nx())
            .into_par_iter()
            .map(column)
            .reduce(|| ChangeNorms::ZERO, ChangeNorms::max),
    }
}

/// Drives one steady solve for one Reynolds number.
///
/// Every iteration is, in order: snapshot, beam conditions, streamfunction
/// sweep, vorticity sweep, beam conditions, change norms. The snapshot
/// buffer is allocated once and reused.
pub struct RelaxationController<'a> {
    grid: &'a Grid,
    params: ReynoldsParameters,
    boundary: ObstacleBoundary,
    step: RelaxationStep<'a>,
    criteria: ConvergenceCriteria,
    report_interval: usize,
    snapshot: FlowState,
}

impl<'a> RelaxationController<'a> {
    pub fn new(
        grid: &'a Grid,
        params: ReynoldsParameters,
        options: &ControllerOptions,
    ) -> Self {
        let criteria = ConvergenceCriteria::for_reynolds(
            &params,
            options.tolerance,
            options.max_iterations,
            options.partial_budget,
            options.stagnation_epsilon,
        );
        RelaxationController {
            grid,
            params,
            boundary: ObstacleBoundary::new(
                &params.stability,
                options.corner_smoothing,
            ),
            step: RelaxationStep::new(grid, options.sweep_order, options.chunk_size),
            criteria,
            report_interval: options
                .report_interval
                .unwrap_or(params.stability.report_interval)
                .max(1),
            snapshot: FlowState::new(*grid.aabb()),
        }
    }

    pub fn params(&self) -> &ReynoldsParameters {
        &self.params
    }

    pub fn criteria(&self) -> &ConvergenceCriteria {
        &self.criteria
    }

    pub fn boundary(&self) -> &ObstacleBoundary {
        &self.boundary
    }

    /// One full iteration, returns the change it made.
    pub fn iterate(&mut self, state: &mut FlowState) -> ChangeNorms {
        profiling::scope!("solver::iterate");
        self.snapshot.copy_from(state);
        self.boundary.enforce(self.grid, state);
        self.step.relax_stream(state, self.params.relaxation);
        self.step.relax_vorticity(state, &self.params);
        self.boundary.enforce(self.grid, state);
        change_norms(self.grid, &self.snapshot, state, self.step.order())
    }

    /// Iterate until the monitor terminates the run.
    /// `state` must already carry the edge conditions.
    pub fn run<P: ProgressObserver + ?Sized>(
        &mut self,
        state: &mut FlowState,
        observer: &mut P,
    ) -> RunOutcome {
        let reynolds = self.params.target;
        tracing::info!(
            reynolds,
            viscosity = self.params.viscosity,
            relaxation = self.params.relaxation,
            tolerance = self.criteria.tolerance,
            "starting run"
        );

        let mut monitor = ConvergenceMonitor::new(self.criteria);
        let (termination, final_changes) = loop {
            let changes = self.iterate(state);
            let iteration = monitor.iteration() + 1;
            if iteration % self.report_interval == 0 {
                observer.report(reynolds, iteration, &changes);
            }
            if let Some(termination) = monitor.observe(changes) {
                break (termination, changes);
            }
        };

        let iterations = monitor.iteration();
        match termination {
            Termination::Converged | Termination::PartiallyConverged => {
                tracing::info!(
                    reynolds,
                    iterations,
                    stream_change = final_changes.stream,
                    vorticity_change = final_changes.vorticity,
                    "{termination}"
                )
            }
            Termination::Diverged => tracing::warn!(
                reynolds,
                iterations,
                stream_change = final_changes.stream,
                vorticity_change = final_changes.vorticity,
                "diverged"
            ),
            Termination::MaxIterationsExceeded { .. } => tracing::warn!(
                reynolds,
                iterations,
                stream_change = final_changes.stream,
                "{termination}"
            ),
        }

        RunOutcome {
            termination,
            iterations,
            final_changes,
            effective_tolerance: self.criteria.tolerance,
        }
    }
}
