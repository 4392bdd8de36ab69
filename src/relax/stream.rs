use crate::domain::CellStore;
use crate::grid::Grid;
use crate::stencil::Stencil;
use std::ops::Range;

pub(super) struct StreamKernel<'a> {
    pub grid: &'a Grid,
    pub mean: &'a Stencil<2, 4>,
    pub offsets: &'a [isize; 4],
    pub relaxation: f64,
    pub vorticity: &'a [f64],
}

impl StreamKernel<'_> {
    /// `u* = (sum of neighbors + h^2 w) / 4`, `u += omega (u* - u)`.
    pub fn relax_columns<S: CellStore + ?Sized>(
        &self,
        u: &S,
        columns: Range<i32>,
    ) {
        let ny = self.grid.ny();
        let source = 0.25 * self.grid.spacing() * self.grid.spacing();
        for i in columns {
            for j in 1..ny {
                if self.grid.is_inside_obstacle(i, j) {
                    continue;
                }
                let l = self.grid.index(i, j);
                let old = u.load(l);
                let neighbors =
                    self.mean.gather_apply(self.offsets, l, |n| u.load(n));
                let target = neighbors + source * self.vorticity[l];
                u.store(l, old + self.relaxation * (target - old));
            }
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use crate::boundary::initialize_edges;
    use crate::domain::*;
    use crate::grid::{Grid, Obstacle};
    use crate::relax::*;

    #[test]
    fn shear_flow_is_fixed_point_test() {
        // Without vorticity the inflow profile u = V0 j already solves
        // lap(u) = 0. Only the beam disturbs it, and the disturbance
        // travels downstream from the front face within one sweep.
        let grid = Grid::new(30, 10, 1.0, 1.0, Obstacle::new(6, 3, 4)).unwrap();
        let mut state = FlowState::new(*grid.aabb());
        initialize_edges(&grid, &mut state, 8);
        let before = state.clone();
        RelaxationStep::new(&grid, SweepOrder::Sequential, 4)
            .relax_stream(&mut state, 0.1);

        for (i, j) in grid.fluid_interior().collect::<Vec<_>>() {
            if i < 5 {
                assert_eq!(state.u(i, j), before.u(i, j), "({i}, {j})");
            }
        }
        assert!(state.u(5, 3) < before.u(5, 3));
    }

    #[test]
    fn obstacle_and_edges_untouched_test() {
        let grid = Grid::new(30, 10, 1.0, 1.0, Obstacle::new(6, 3, 4)).unwrap();
        let mut state = FlowState::new(*grid.aabb());
        initialize_edges(&grid, &mut state, 8);
        state.vorticity.par_set_values(|_| 1.0, 8);
        let before = state.clone();
        RelaxationStep::new(&grid, SweepOrder::Parallel, 3)
            .relax_stream(&mut state, 0.5);

        for c in grid.aabb().coord_iter() {
            let (i, j) = (c[0], c[1]);
            let edge = i == 0 || i == 30 || j == 0 || j == 10;
            if edge || grid.is_inside_obstacle(i, j) {
                assert_eq!(state.u(i, j), before.u(i, j));
            }
        }
        assert!(state.u(20, 5) > before.u(20, 5));
    }
}
