//! In-place successive over-relaxation sweeps.
//!
//! Both sweeps visit the interior fluid nodes `1 <= i < nx`, `1 <= j < ny`
//! column by column and skip the beam. An update at one node is visible to
//! every later read of that node within the same sweep.
//!
//! In [`SweepOrder::Parallel`] the interior columns are split into chunks
//! of `chunk_size` and handed to rayon; neighboring chunks read each other's
//! edge columns while they are being written (see [`crate::domain::CellStore`]).

mod stream;
mod vorticity;

use crate::domain::*;
use crate::grid::Grid;
use crate::reynolds::ReynoldsParameters;
use crate::stencil::standard_stencils::neighbor_mean_2d;
use crate::stencil::Stencil;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SweepOrder {
    /// Single thread, plain lexicographic Gauss-Seidel order.
    Sequential,
    /// Column chunks relaxed concurrently.
    #[default]
    Parallel,
}

/// The two sweeps of one run, with their stencil and
/// linear offsets resolved against the grid once.
pub struct RelaxationStep<'a> {
    grid: &'a Grid,
    mean: Stencil<2, 4>,
    offsets: [isize; 4],
    order: SweepOrder,
    chunk_size: usize,
}

impl<'a> RelaxationStep<'a> {
    pub fn new(grid: &'a Grid, order: SweepOrder, chunk_size: usize) -> Self {
        let mean = neighbor_mean_2d();
        let offsets = mean.linear_offsets(grid.aabb());
        RelaxationStep {
            grid,
            mean,
            offsets,
            order,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn order(&self) -> SweepOrder {
        self.order
    }

    /// Relax `lap(u) = -w` with the vorticity held fixed.
    pub fn relax_stream(&self, state: &mut FlowState, relaxation: f64) {
        profiling::scope!("relax::stream");
        let FlowState { stream, vorticity } = state;
        let kernel = stream::StreamKernel {
            grid: self.grid,
            mean: &self.mean,
            offsets: &self.offsets,
            relaxation,
            vorticity: vorticity.buffer(),
        };
        match self.order {
            SweepOrder::Sequential => {
                let u = as_cells(stream.buffer_mut());
                kernel.relax_columns(u, self.columns())
            }
            SweepOrder::Parallel => {
                let u = as_atomic_cells(stream.buffer_mut());
                self.column_chunks()
                    .into_par_iter()
                    .for_each(|columns| kernel.relax_columns(u, columns));
            }
        }
    }

    /// Relax the vorticity transport equation, streamfunction held fixed.
    pub fn relax_vorticity(
        &self,
        state: &mut FlowState,
        params: &ReynoldsParameters,
    ) {
        profiling::scope!("relax::vorticity");
        let FlowState { stream, vorticity } = state;
        let kernel = vorticity::VorticityKernel {
            grid: self.grid,
            mean: &self.mean,
            offsets: &self.offsets,
            relaxation: params.relaxation,
            convection: 0.25
                * params.stability.convection_factor
                * params.mesh_reynolds
                / 4.0,
            stream: stream.buffer(),
        };
        match self.order {
            SweepOrder::Sequential => {
                let w = as_cells(vorticity.buffer_mut());
                kernel.relax_columns(w, self.columns())
            }
            SweepOrder::Parallel => {
                let w = as_atomic_cells(vorticity.buffer_mut());
                self.column_chunks()
                    .into_par_iter()
                    .for_each(|columns| kernel.relax_columns(w, columns));
            }
        }
    }

    fn columns(&self) -> Range<i32> {
        1..self.grid.nx()
    }

    fn column_chunks(&self) -> Vec<Range<i32>> {
        column_chunks(self.columns(), self.chunk_size)
    }
}

/// Split `columns` into consecutive ranges of at most `chunk_size`.
pub fn column_chunks(
    columns: Range<i32>,
    chunk_size: usize,
) -> Vec<Range<i32>> {
    let step = chunk_size.max(1) as i32;
    (columns.start..columns.end)
        .step_by(step as usize)
        .map(|start| start..(start + step).min(columns.end))
        .collect()
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::boundary::initialize_edges;
    use crate::grid::Obstacle;

    #[test]
    fn column_chunks_test() {
        assert_eq!(column_chunks(1..10, 4), vec![1..5, 5..9, 9..10]);
        assert_eq!(column_chunks(1..3, 8), vec![1..3]);
        assert_eq!(column_chunks(1..4, 1), vec![1..2, 2..3, 3..4]);
    }

    #[test]
    fn sweep_order_serde_test() {
        let order: SweepOrder = serde_json::from_str("\"parallel\"").unwrap();
        assert_eq!(order, SweepOrder::Parallel);
        assert_eq!(
            serde_json::to_string(&SweepOrder::Sequential).unwrap(),
            "\"sequential\""
        );
    }

    #[test]
    fn single_chunk_matches_sequential_test() {
        // One chunk spanning every column runs the sequential visiting order.
        let grid = Grid::new(30, 10, 1.0, 1.0, Obstacle::new(6, 3, 4)).unwrap();
        let params = ReynoldsParameters::configure(1.0, &grid);
        let mut seq = FlowState::new(*grid.aabb());
        initialize_edges(&grid, &mut seq, 8);
        seq.set_w(20, 5, 1.0);
        let mut par = seq.clone();

        let s = RelaxationStep::new(&grid, SweepOrder::Sequential, 8);
        let p = RelaxationStep::new(&grid, SweepOrder::Parallel, 1000);
        for _ in 0..5 {
            s.relax_stream(&mut seq, params.relaxation);
            s.relax_vorticity(&mut seq, &params);
            p.relax_stream(&mut par, params.relaxation);
            p.relax_vorticity(&mut par, &params);
        }
        assert_eq!(seq, par);
    }
}
