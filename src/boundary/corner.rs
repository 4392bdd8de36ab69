use crate::domain::*;
use crate::grid::Grid;
use crate::reynolds::SpikeFilter;
use crate::util::*;

impl SpikeFilter {
    /// Damp vorticity spikes in the 3 x 3 block around `(ci, cj)`.
    ///
    /// Nodes are visited in place in row-major order, so a smoothed node
    /// feeds into the neighbor mean of the nodes after it.
    pub fn smooth_around(
        &self,
        grid: &Grid,
        state: &mut FlowState,
        ci: i32,
        cj: i32,
    ) {
        let corner = AABB::from_mm(vector![ci, cj], vector![ci, cj]);
        let mut block = corner.grow(1);
        block.trim_to_aabb(&grid.aabb().interior());

        for c in block.coord_iter() {
            let (i, j) = (c[0], c[1]);
            if grid.is_inside_obstacle(i, j) {
                continue;
            }
            let w = state.w(i, j);
            if w.abs() <= self.threshold {
                continue;
            }
            if let Some(mean) = fluid_neighbor_mean(grid, state, i, j) {
                state.set_w(i, j, self.keep * w + (1.0 - self.keep) * mean);
            }
        }
    }
}

/// Mean vorticity of the up to eight surrounding fluid nodes.
fn fluid_neighbor_mean(
    grid: &Grid,
    state: &FlowState,
    i: i32,
    j: i32,
) -> Option<f64> {
    let mut ring = AABB::from_mm(vector![i - 1, j - 1], vector![i + 1, j + 1]);
    ring.trim_to_aabb(grid.aabb());

    let (sum, count) = ring
        .coord_iter()
        .filter(|n| (n[0], n[1]) != (i, j))
        .filter(|n| !grid.is_inside_obstacle(n[0], n[1]))
        .fold((0.0, 0usize), |(sum, count), n| {
            (sum + state.w(n[0], n[1]), count + 1)
        });
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::grid::Obstacle;
    use float_cmp::assert_approx_eq;

    const FILTER: SpikeFilter = SpikeFilter {
        threshold: 2.0,
        keep: 0.6,
    };

    fn grid() -> Grid {
        Grid::new(30, 12, 1.0, 1.0, Obstacle::new(10, 4, 4)).unwrap()
    }

    #[test]
    fn smooths_single_spike_test() {
        let grid = grid();
        let mut state = FlowState::new(*grid.aabb());
        state.set_w(9, 5, 10.0);
        FILTER.smooth_around(&grid, &mut state, 9, 5);
        // All eight neighbors of (9, 5) are fluid and zero.
        assert_approx_eq!(f64, state.w(9, 5), 6.0);
        assert_eq!(state.w(8, 5), 0.0);
    }

    #[test]
    fn skips_beam_neighbors_test() {
        let grid = grid();
        let mut state = FlowState::new(*grid.aabb());
        state.set_w(9, 4, 10.0);
        state.set_w(8, 4, 1.0);
        FILTER.smooth_around(&grid, &mut state, 9, 5);
        // (10, 3) and (10, 4) are beam nodes, the other six sum to 1.0.
        assert_approx_eq!(f64, state.w(9, 4), 6.0 + 0.4 * (1.0 / 6.0));
    }

    #[test]
    fn below_threshold_untouched_test() {
        let grid = grid();
        let mut state = FlowState::new(*grid.aabb());
        state.set_w(9, 5, 2.0);
        state.set_w(10, 5, -1.5);
        let before = state.clone();
        FILTER.smooth_around(&grid, &mut state, 9, 5);
        assert_eq!(before, state);
    }
}
