//! Mapping from a target Reynolds number to every tuned constant of a run.
//!
//! The constants are empirical: they were tuned by hand so each regime
//! converges on the reference channel. They live in two lookup tables so
//! they can be inspected and tested on their own instead of being
//! scattered through the solver as inline conditionals.

use crate::grid::Grid;

/// Upper end of a Reynolds range. Tables are scanned in order and the
/// first row whose upper end admits the target wins.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReynoldsRange {
    pub upper: f64,
    pub inclusive: bool,
}

impl ReynoldsRange {
    const fn up_to(upper: f64) -> Self {
        ReynoldsRange {
            upper,
            inclusive: true,
        }
    }

    const fn below(upper: f64) -> Self {
        ReynoldsRange {
            upper,
            inclusive: false,
        }
    }

    pub fn admits(&self, re: f64) -> bool {
        re < self.upper || (self.inclusive && re == self.upper)
    }
}

/// Over-relaxation factor per Reynolds range. Stronger convection
/// needs smaller steps.
pub const RELAXATION_TABLE: [(ReynoldsRange, f64); 6] = [
    (ReynoldsRange::up_to(0.5), 0.1),
    (ReynoldsRange::up_to(1.0), 0.08),
    (ReynoldsRange::up_to(2.0), 0.04),
    (ReynoldsRange::up_to(5.0), 0.012),
    (ReynoldsRange::up_to(10.0), 0.008),
    (ReynoldsRange::up_to(f64::INFINITY), 0.005),
];

/// How the vorticity at a top corner of the beam is built
/// from the two single-face estimates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CornerBlend {
    /// Arithmetic mean.
    Equal,
    /// `weight` on the estimate of smaller magnitude, `1 - weight` on the other.
    FavorSmaller { weight: f64 },
}

impl CornerBlend {
    pub fn blend(&self, from_vertical: f64, from_horizontal: f64) -> f64 {
        match *self {
            CornerBlend::Equal => 0.5 * (from_vertical + from_horizontal),
            CornerBlend::FavorSmaller { weight } => {
                if from_vertical.abs() < from_horizontal.abs() {
                    weight * from_vertical + (1.0 - weight) * from_horizontal
                } else {
                    (1.0 - weight) * from_vertical + weight * from_horizontal
                }
            }
        }
    }
}

/// Local smoothing of vorticity spikes near the beam corners.
/// A stabilization heuristic, not a boundary condition.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpikeFilter {
    /// Magnitudes above this are treated as spikes.
    pub threshold: f64,
    /// Share of the spike value kept, the rest comes from the neighbor mean.
    pub keep: f64,
}

/// Every regime dependent constant of the solver.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StabilityProfile {
    /// Scales the convective term of the vorticity update, at most 1.
    pub convection_factor: f64,
    /// Multiplies the nominal tolerance.
    pub tolerance_scale: f64,
    /// Change norms above this abort the run.
    pub divergence_threshold: f64,
    pub corner_blend: CornerBlend,
    pub spike_filter: Option<SpikeFilter>,
    /// Multiple of the effective tolerance the streamfunction change
    /// must stay under for a run that hit the iteration cap to be accepted.
    pub acceptance_scale: f64,
    /// Consecutive stagnant iterations before partial convergence.
    pub patience: usize,
    /// Iterations between progress reports.
    pub report_interval: usize,
}

const LOW_RE: StabilityProfile = StabilityProfile {
    convection_factor: 1.0,
    tolerance_scale: 1.0,
    divergence_threshold: 1000.0,
    corner_blend: CornerBlend::Equal,
    spike_filter: None,
    acceptance_scale: 1000.0,
    patience: 3000,
    report_interval: 5000,
};

pub const STABILITY_TABLE: [(ReynoldsRange, StabilityProfile); 4] = [
    (ReynoldsRange::up_to(1.5), LOW_RE),
    (
        ReynoldsRange::up_to(2.0),
        StabilityProfile {
            convection_factor: 0.8,
            tolerance_scale: 10.0,
            ..LOW_RE
        },
    ),
    (
        ReynoldsRange::below(5.0),
        StabilityProfile {
            convection_factor: 0.7,
            tolerance_scale: 50.0,
            ..LOW_RE
        },
    ),
    (
        ReynoldsRange::up_to(f64::INFINITY),
        StabilityProfile {
            convection_factor: 0.4,
            tolerance_scale: 200.0,
            divergence_threshold: 50.0,
            corner_blend: CornerBlend::FavorSmaller { weight: 0.7 },
            spike_filter: Some(SpikeFilter {
                threshold: 2.0,
                keep: 0.6,
            }),
            acceptance_scale: 20000.0,
            patience: 8000,
            report_interval: 3000,
        },
    ),
];

fn lookup<T: Copy>(table: &[(ReynoldsRange, T)], re: f64) -> T {
    table
        .iter()
        .find(|(range, _)| range.admits(re))
        .map(|(_, value)| *value)
        // Last rows are unbounded, only NaN falls through.
        .unwrap_or(table[table.len() - 1].1)
}

pub fn relaxation_factor(re: f64) -> f64 {
    lookup(&RELAXATION_TABLE, re)
}

pub fn stability_profile(re: f64) -> StabilityProfile {
    lookup(&STABILITY_TABLE, re)
}

/// Derived once per run, never mutated during it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReynoldsParameters {
    pub target: f64,
    /// Kinematic viscosity `nu = V0 h / Re`.
    pub viscosity: f64,
    /// Mesh Reynolds number `R = V0 h / nu`.
    pub mesh_reynolds: f64,
    /// Over-relaxation factor `omega`.
    pub relaxation: f64,
    pub stability: StabilityProfile,
}

impl ReynoldsParameters {
    /// Pure function of the target and the grid scales.
    pub fn configure(target: f64, grid: &Grid) -> Self {
        let v0_h = grid.inflow_velocity() * grid.spacing();
        let viscosity = v0_h / target;
        ReynoldsParameters {
            target,
            viscosity,
            mesh_reynolds: v0_h / viscosity,
            relaxation: relaxation_factor(target),
            stability: stability_profile(target),
        }
    }

    pub fn effective_tolerance(&self, nominal: f64) -> f64 {
        nominal * self.stability.tolerance_scale
    }
}
