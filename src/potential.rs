//! The inviscid limit: vorticity identically zero, so only
//! `lap(u) = 0` is relaxed around the beam.

use crate::boundary::clear_obstacle;
use crate::domain::*;
use crate::grid::Grid;
use crate::relax::RelaxationStep;
use crate::solver::*;

pub const POTENTIAL_RELAXATION: f64 = 0.1;

/// A change above this aborts the solve.
const POTENTIAL_DIVERGENCE: f64 = 1000.0;

/// Multiple of the tolerance under which a capped solve is still accepted.
const POTENTIAL_ACCEPTANCE: f64 = 1000.0;

/// Relax the streamfunction to the potential flow solution.
/// `state` must already carry the edge conditions and zero vorticity.
pub fn solve_potential<P: ProgressObserver + ?Sized>(
    grid: &Grid,
    state: &mut FlowState,
    options: &ControllerOptions,
    tolerance: f64,
    observer: &mut P,
) -> RunOutcome {
    let step =
        RelaxationStep::new(grid, options.sweep_order, options.chunk_size);
    let criteria = ConvergenceCriteria {
        tolerance,
        divergence_threshold: POTENTIAL_DIVERGENCE,
        partial_budget: usize::MAX,
        patience: usize::MAX,
        stagnation_epsilon: 0.0,
        max_iterations: options.max_iterations,
        acceptance_threshold: tolerance * POTENTIAL_ACCEPTANCE,
    };
    let report_interval = options.report_interval.unwrap_or(5000).max(1);
    tracing::info!(
        tolerance,
        relaxation = POTENTIAL_RELAXATION,
        "starting potential flow run"
    );

    let mut monitor = ConvergenceMonitor::new(criteria);
    let mut snapshot = FlowState::new(*grid.aabb());
    let (termination, final_changes) = loop {
        profiling::scope!("potential::iterate");
        snapshot.copy_from(state);
        clear_obstacle(grid, state);
        step.relax_stream(state, POTENTIAL_RELAXATION);
        let changes = change_norms(grid, &snapshot, state, step.order());

        let iteration = monitor.iteration() + 1;
        if iteration % report_interval == 0 {
            observer.report(f64::INFINITY, iteration, &changes);
        }
        if let Some(termination) = monitor.observe(changes) {
            break (termination, changes);
        }
    };

    let iterations = monitor.iteration();
    if termination.is_accepted() {
        tracing::info!(
            iterations,
            stream_change = final_changes.stream,
            "potential flow {termination}"
        );
    } else {
        tracing::warn!(
            iterations,
            stream_change = final_changes.stream,
            "potential flow {termination}"
        );
    }
    RunOutcome {
        termination,
        iterations,
        final_changes,
        effective_tolerance: tolerance,
    }
}
