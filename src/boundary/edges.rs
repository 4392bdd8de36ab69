use crate::domain::*;
use crate::grid::Grid;

/// Populate both fields and impose the domain edge conditions.
/// Called once per run, before the first iteration.
pub fn initialize_edges(grid: &Grid, state: &mut FlowState, chunk_size: usize) {
    profiling::scope!("boundary::initialize_edges");
    let (nx, ny) = (grid.nx(), grid.ny());
    let v0 = grid.inflow_velocity();
    let h = grid.spacing();
    let beam = *grid.obstacle();
    let inside = |i, j| grid.is_inside_obstacle(i, j);

    // Uniform shear inflow everywhere, still fluid in the beam.
    state.stream.par_set_values(
        move |c| {
            if beam.contains(c[0], c[1]) {
                0.0
            } else {
                c[1] as f64 * v0
            }
        },
        chunk_size,
    );
    state.vorticity.par_set_values(|_| 0.0, chunk_size);

    // Free surface
    for i in 0..=nx {
        if !inside(i, ny) {
            state.set_u(i, ny, state.u(i, ny - 1) + v0 * h);
            state.set_w(i, ny - 1, 0.0);
        }
    }

    // Inlet
    for j in 0..=ny {
        if !inside(0, j) && !inside(1, j) {
            state.set_u(1, j, state.u(0, j));
            state.set_w(0, j, 0.0);
        }
    }

    // Centerline
    for i in 0..=nx {
        if !inside(i, 0) {
            state.set_u(i, 0, 0.0);
            state.set_w(i, 0, 0.0);
        }
    }

    // Outlet, zero gradient
    for j in 1..ny {
        if !inside(nx, j) && !inside(nx - 1, j) {
            state.set_w(nx, j, state.w(nx - 1, j));
            state.set_u(nx, j, state.u(nx - 1, j));
        }
    }
}
