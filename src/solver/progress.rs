use crate::solver::ChangeNorms;

/// Receives periodic progress while a run iterates.
/// Purely observational, nothing flows back into the solve.
pub trait ProgressObserver {
    fn report(
        &mut self,
        reynolds: f64,
        iteration: usize,
        changes: &ChangeNorms,
    );
}

/// Logs progress through `tracing`.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn report(
        &mut self,
        reynolds: f64,
        iteration: usize,
        changes: &ChangeNorms,
    ) {
        tracing::info!(
            reynolds,
            iteration,
            stream_change = changes.stream,
            vorticity_change = changes.vorticity,
            "relaxing"
        );
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn report(&mut self, _: f64, _: usize, _: &ChangeNorms) {}
}

/// Keeps every report, for tests.
#[derive(Debug, Default, Clone)]
pub struct RecordProgress {
    pub reports: Vec<(usize, ChangeNorms)>,
}

impl ProgressObserver for RecordProgress {
    fn report(&mut self, _: f64, iteration: usize, changes: &ChangeNorms) {
        self.reports.push((iteration, *changes));
    }
}
