use crate::domain::CellStore;
use crate::grid::Grid;
use crate::stencil::Stencil;
use std::ops::Range;

pub(super) struct VorticityKernel<'a> {
    pub grid: &'a Grid,
    pub mean: &'a Stencil<2, 4>,
    pub offsets: &'a [isize; 4],
    pub relaxation: f64,
    /// `factor * R / 16`, the coefficient of the Jacobian term.
    pub convection: f64,
    pub stream: &'a [f64],
}

impl VorticityKernel<'_> {
    /// Nodes one cell in from an edge see diffusion only.
    #[inline]
    fn diffusion_only(&self, i: i32, j: i32) -> bool {
        i == 1 || i == self.grid.nx() - 1 || j == 1 || j == self.grid.ny() - 1
    }

    /// `w* = (a1 - c (R/4) (a2 - a3)) / 4`, `w += omega (w* - w)` with
    ///
    /// ```text
    /// a1 = sum of the four neighbors of w
    /// a2 = (u[i][j+1] - u[i][j-1]) (w[i+1][j] - w[i-1][j])
    /// a3 = (u[i+1][j] - u[i-1][j]) (w[i][j+1] - w[i][j-1])
    /// ```
    pub fn relax_columns<S: CellStore + ?Sized>(
        &self,
        w: &S,
        columns: Range<i32>,
    ) {
        let ny = self.grid.ny();
        let stride = self.grid.stride();
        let u = self.stream;
        for i in columns {
            for j in 1..ny {
                if self.grid.is_inside_obstacle(i, j) {
                    continue;
                }
                let l = self.grid.index(i, j);
                let old = w.load(l);
                let mut target =
                    self.mean.gather_apply(self.offsets, l, |n| w.load(n));
                if !self.diffusion_only(i, j) {
                    let a2 = (u[l + 1] - u[l - 1])
                        * (w.load(l + stride) - w.load(l - stride));
                    let a3 = (u[l + stride] - u[l - stride])
                        * (w.load(l + 1) - w.load(l - 1));
                    target -= self.convection * (a2 - a3);
                }
                w.store(l, old + self.relaxation * (target - old));
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
    use crate::reynolds::ReynoldsParameters;
    use float_cmp::assert_approx_eq;

    fn setup() -> (Grid, FlowState) {
        let grid = Grid::new(30, 10, 1.0, 1.0, Obstacle::new(6, 3, 4)).unwrap();
        let mut state = FlowState::new(*grid.aabb());
        initialize_edges(&grid, &mut state, 8);
        (grid, state)
    }

    #[test]
    fn zero_vorticity_stays_zero_test() {
        let (grid, mut state) = setup();
        let params = ReynoldsParameters::configure(2.0, &grid);
        RelaxationStep::new(&grid, SweepOrder::Parallel, 4)
            .relax_vorticity(&mut state, &params);
        assert!(state.vorticity.buffer().iter().all(|w| *w == 0.0));
    }

    /// Seeds (20, 5) and its east neighbor, runs one sequential sweep at
    /// `re` and checks (20, 5) against the update with convection factor
    /// `factor`.
    fn check_single_node_update(re: f64, factor: f64) {
        let (grid, mut state) = setup();
        let params = ReynoldsParameters::configure(re, &grid);
        assert_eq!(params.stability.convection_factor, factor);
        // By the time the sweep reaches (20, 5) its west and south
        // neighbors have moved, the other two have not.
        state.set_w(20, 5, 2.0);
        state.set_w(21, 5, 1.0);
        RelaxationStep::new(&grid, SweepOrder::Sequential, 4)
            .relax_vorticity(&mut state, &params);

        // u = j, so a2 = 2 * (1 - w[19][5]) and a3 = 0.
        let (w_west, w_south) = (state.w(19, 5), state.w(20, 4));
        assert!(w_west != 0.0 && w_south != 0.0);
        let a2 = 2.0 * (1.0 - w_west);
        let target = 0.25 * (1.0 + w_west + w_south)
            - factor * params.mesh_reynolds / 16.0 * a2;
        let expected = 2.0 + params.relaxation * (target - 2.0);
        assert_approx_eq!(f64, state.w(20, 5), expected, epsilon = 1e-12);
    }

    #[test]
    fn single_node_update_test() {
        check_single_node_update(1.0, 1.0);
    }

    #[test]
    fn damped_convection_test() {
        check_single_node_update(1.8, 0.8);
        check_single_node_update(5.0, 0.4);
    }

    #[test]
    fn diffusion_only_next_to_edges_test() {
        let (grid, mut state) = setup();
        let params = ReynoldsParameters::configure(1.0, &grid);
        state.set_w(1, 5, 1.0);
        state.set_w(2, 5, 3.0);
        RelaxationStep::new(&grid, SweepOrder::Sequential, 4)
            .relax_vorticity(&mut state, &params);
        // (1, 5) is visited before (1, 6) and (2, 5) change. (1, 4) already moved.
        let target = 0.25 * (3.0 + state.w(1, 4));
        assert_approx_eq!(
            f64,
            state.w(1, 5),
            1.0 + params.relaxation * (target - 1.0),
            epsilon = 1e-12
        );
    }
}
