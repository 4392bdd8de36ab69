use crate::boundary::wall_vorticity;
use crate::domain::*;
use crate::grid::Grid;
use crate::reynolds::{CornerBlend, SpikeFilter, StabilityProfile};

/// The beam surface conditions of one run.
/// Built from the Reynolds regime, fixed for the whole run.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ObstacleBoundary {
    corner_blend: CornerBlend,
    spike_filter: Option<SpikeFilter>,
}

impl ObstacleBoundary {
    pub fn new(profile: &StabilityProfile, corner_smoothing: bool) -> Self {
        ObstacleBoundary {
            corner_blend: profile.corner_blend,
            spike_filter: profile.spike_filter.filter(|_| corner_smoothing),
        }
    }

    pub fn spike_filter(&self) -> Option<&SpikeFilter> {
        self.spike_filter.as_ref()
    }

    /// Impose no-slip vorticity on the wall-adjacent fluid nodes
    /// and clear the beam interior.
    ///
    /// Reads only the streamfunction outside the beam, so without the
    /// spike filter applying it twice is the same as applying it once.
    pub fn enforce(&self, grid: &Grid, state: &mut FlowState) {
        profiling::scope!("boundary::enforce_obstacle");
        clear_obstacle(grid, state);

        let h = grid.spacing();
        let beam = grid.obstacle();
        let (front, back, top) = (beam.front(), beam.back(), beam.top());

        // Front and back faces, centerline excluded.
        for j in 1..=top {
            state.set_w(front - 1, j, wall_vorticity(state.u(front - 2, j), h));
            state.set_w(back + 1, j, wall_vorticity(state.u(back + 2, j), h));
        }

        // Top face
        for i in front..=back {
            state.set_w(i, top + 1, wall_vorticity(state.u(i, top + 2), h));
        }

        let corners = [(front - 1, front - 2), (back + 1, back + 2)];
        for (i, i_outer) in corners {
            let from_vertical = wall_vorticity(state.u(i_outer, top + 1), h);
            let from_horizontal = wall_vorticity(state.u(i, top + 2), h);
            state.set_w(
                i,
                top + 1,
                self.corner_blend.blend(from_vertical, from_horizontal),
            );
        }

        if let Some(filter) = self.spike_filter {
            for (i, _) in corners {
                filter.smooth_around(grid, state, i, top + 1);
            }
        }
    }
}

/// Zero both fields over every beam node.
pub fn clear_obstacle(grid: &Grid, state: &mut FlowState) {
    for c in grid.obstacle().aabb().coord_iter() {
        state.set_u(c[0], c[1], 0.0);
        state.set_w(c[0], c[1], 0.0);
    }
}
