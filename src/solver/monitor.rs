use crate::reynolds::ReynoldsParameters;
use serde::Serialize;

/// Largest absolute per-node change of each field over one iteration,
/// measured on the interior fluid nodes.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ChangeNorms {
    pub stream: f64,
    pub vorticity: f64,
}

/// `max` that keeps a NaN instead of discarding it.
#[inline]
pub fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

impl ChangeNorms {
    pub const ZERO: ChangeNorms = ChangeNorms {
        stream: 0.0,
        vorticity: 0.0,
    };

    pub fn max(self, other: ChangeNorms) -> ChangeNorms {
        ChangeNorms {
            stream: nan_max(self.stream, other.stream),
            vorticity: nan_max(self.vorticity, other.vorticity),
        }
    }

    pub fn has_nan(&self) -> bool {
        self.stream.is_nan() || self.vorticity.is_nan()
    }
}

/// How a run ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Termination {
    /// Both changes fell under the effective tolerance.
    Converged,
    /// The streamfunction converged and the vorticity change stopped moving.
    PartiallyConverged,
    /// A change norm blew past the divergence threshold or became NaN.
    Diverged,
    /// Iteration cap reached; `accepted` if the streamfunction change
    /// was within the acceptance multiple of the tolerance.
    MaxIterationsExceeded { accepted: bool },
}

impl Termination {
    /// Whether the fields are worth post-processing.
    pub fn is_accepted(&self) -> bool {
        match self {
            Termination::Converged | Termination::PartiallyConverged => true,
            Termination::Diverged => false,
            Termination::MaxIterationsExceeded { accepted } => *accepted,
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::PartiallyConverged => write!(f, "partially converged"),
            Termination::Diverged => write!(f, "diverged"),
            Termination::MaxIterationsExceeded { accepted: true } => {
                write!(f, "iteration cap reached, accepted")
            }
            Termination::MaxIterationsExceeded { accepted: false } => {
                write!(f, "iteration cap reached, rejected")
            }
        }
    }
}

/// Thresholds of the termination decision for one run.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ConvergenceCriteria {
    /// Effective tolerance, already scaled for the regime.
    pub tolerance: f64,
    pub divergence_threshold: f64,
    /// Iterations before partial convergence may be declared.
    pub partial_budget: usize,
    /// Stagnant iterations needed for partial convergence.
    pub patience: usize,
    pub stagnation_epsilon: f64,
    pub max_iterations: usize,
    /// Streamfunction change under which a capped run is accepted.
    pub acceptance_threshold: f64,
}

impl ConvergenceCriteria {
    pub fn for_reynolds(
        params: &ReynoldsParameters,
        nominal_tolerance: f64,
        max_iterations: usize,
        partial_budget: usize,
        stagnation_epsilon: f64,
    ) -> Self {
        let tolerance = params.effective_tolerance(nominal_tolerance);
        ConvergenceCriteria {
            tolerance,
            divergence_threshold: params.stability.divergence_threshold,
            partial_budget,
            patience: params.stability.patience,
            stagnation_epsilon,
            max_iterations,
            acceptance_threshold: tolerance * params.stability.acceptance_scale,
        }
    }
}

/// Feeds on one [`ChangeNorms`] per iteration and decides when to stop.
/// Holds all the per-run stagnation state, so a fresh monitor per run
/// keeps runs independent of each other.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    criteria: ConvergenceCriteria,
    iteration: usize,
    last_vorticity: Option<f64>,
    stagnant: usize,
}

impl ConvergenceMonitor {
    pub fn new(criteria: ConvergenceCriteria) -> Self {
        ConvergenceMonitor {
            criteria,
            iteration: 0,
            last_vorticity: None,
            stagnant: 0,
        }
    }

    pub fn criteria(&self) -> &ConvergenceCriteria {
        &self.criteria
    }

    /// Iterations observed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Record the changes of the next iteration.
    /// Returns the termination once the run should stop.
    pub fn observe(&mut self, changes: ChangeNorms) -> Option<Termination> {
        self.iteration += 1;
        let c = &self.criteria;

        if changes.has_nan()
            || changes.stream > c.divergence_threshold
            || changes.vorticity > c.divergence_threshold
        {
            return Some(Termination::Diverged);
        }

        if changes.stream < c.tolerance && changes.vorticity < c.tolerance {
            return Some(Termination::Converged);
        }

        if changes.stream < c.tolerance && self.iteration > c.partial_budget {
            match self.last_vorticity {
                Some(last)
                    if (changes.vorticity - last).abs() < c.stagnation_epsilon =>
                {
                    self.stagnant += 1
                }
                _ => self.stagnant = 0,
            }
            self.last_vorticity = Some(changes.vorticity);
            if self.stagnant > c.patience {
                return Some(Termination::PartiallyConverged);
            }
        }

        if self.iteration >= c.max_iterations {
            return Some(Termination::MaxIterationsExceeded {
                accepted: changes.stream < c.acceptance_threshold,
            });
        }
        None
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn criteria() -> ConvergenceCriteria {
        ConvergenceCriteria {
            tolerance: 1e-6,
            divergence_threshold: 1000.0,
            partial_budget: 10,
            patience: 3,
            stagnation_epsilon: 1e-15,
            max_iterations: 100,
            acceptance_threshold: 1e-3,
        }
    }

    fn norms(stream: f64, vorticity: f64) -> ChangeNorms {
        ChangeNorms { stream, vorticity }
    }

    #[test]
    fn nan_max_test() {
        assert_eq!(nan_max(1.0, 2.0), 2.0);
        assert!(nan_max(f64::NAN, 2.0).is_nan());
        assert!(nan_max(1.0, f64::NAN).is_nan());
        assert!(norms(0.0, 1.0).max(norms(f64::NAN, 0.0)).has_nan());
        assert_eq!(norms(3.0, 1.0).max(norms(2.0, 4.0)), norms(3.0, 4.0));
    }

    #[test]
    fn converged_test() {
        let mut m = ConvergenceMonitor::new(criteria());
        assert_eq!(m.observe(norms(1e-3, 1e-3)), None);
        assert_eq!(m.observe(norms(1e-7, 1e-7)), Some(Termination::Converged));
        assert_eq!(m.iteration(), 2);
    }

    #[test]
    fn diverged_test() {
        let mut m = ConvergenceMonitor::new(criteria());
        assert_eq!(m.observe(norms(1e-3, 2000.0)), Some(Termination::Diverged));
        let mut m = ConvergenceMonitor::new(criteria());
        assert_eq!(m.observe(norms(f64::NAN, 0.0)), Some(Termination::Diverged));
        let mut m = ConvergenceMonitor::new(criteria());
        assert_eq!(
            m.observe(norms(0.0, f64::INFINITY)),
            Some(Termination::Diverged)
        );
    }

    #[test]
    fn partial_convergence_test() {
        let mut m = ConvergenceMonitor::new(criteria());
        // Stagnation before the budget does not count.
        for _ in 0..10 {
            assert_eq!(m.observe(norms(1e-7, 0.5)), None);
        }
        // First observation after the budget only seeds the history.
        assert_eq!(m.observe(norms(1e-7, 0.5)), None);
        for _ in 0..3 {
            assert_eq!(m.observe(norms(1e-7, 0.5)), None);
        }
        assert_eq!(
            m.observe(norms(1e-7, 0.5)),
            Some(Termination::PartiallyConverged)
        );
    }

    #[test]
    fn stagnation_resets_on_movement_test() {
        let mut m = ConvergenceMonitor::new(criteria());
        for _ in 0..13 {
            assert_eq!(m.observe(norms(1e-7, 0.5)), None);
        }
        assert_eq!(m.observe(norms(1e-7, 0.4)), None);
        for _ in 0..3 {
            assert_eq!(m.observe(norms(1e-7, 0.4)), None);
        }
        assert_eq!(
            m.observe(norms(1e-7, 0.4)),
            Some(Termination::PartiallyConverged)
        );
    }

    #[test]
    fn max_iterations_test() {
        let mut m = ConvergenceMonitor::new(ConvergenceCriteria {
            max_iterations: 5,
            ..criteria()
        });
        for _ in 0..4 {
            assert_eq!(m.observe(norms(1e-4, 1.0)), None);
        }
        let t = m.observe(norms(1e-4, 1.0)).unwrap();
        assert_eq!(t, Termination::MaxIterationsExceeded { accepted: true });
        assert!(t.is_accepted());

        let mut m = ConvergenceMonitor::new(ConvergenceCriteria {
            max_iterations: 1,
            ..criteria()
        });
        let t = m.observe(norms(1e-2, 1.0)).unwrap();
        assert_eq!(t, Termination::MaxIterationsExceeded { accepted: false });
        assert!(!t.is_accepted());
    }

    #[test]
    fn termination_serialize_test() {
        let s = serde_json::to_string(&Termination::MaxIterationsExceeded {
            accepted: true,
        })
        .unwrap();
        assert_eq!(s, r#"{"status":"max_iterations_exceeded","accepted":true}"#);
        assert_eq!(
            serde_json::to_string(&Termination::Converged).unwrap(),
            r#"{"status":"converged"}"#
        );
    }
}
