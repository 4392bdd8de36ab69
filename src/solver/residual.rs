use crate::domain::*;
use crate::grid::Grid;
use crate::stencil::standard_stencils::scaled_laplacian_2d;

/// Largest `|u[i+1,j] + u[i-1,j] + u[i,j+1] + u[i,j-1] - 4 u[i,j] + h^2 w[i,j]|`
/// over the interior fluid nodes.
///
/// Zero at an exact fixed point of the streamfunction sweep. When the
/// sweep change is below `tol` it is bounded by roughly `4 tol / omega`.
pub fn poisson_residual(grid: &Grid, state: &FlowState) -> f64 {
    let laplacian = scaled_laplacian_2d();
    let offsets = laplacian.linear_offsets(grid.aabb());
    let u = state.stream.buffer();
    let w = state.vorticity.buffer();
    let h2 = grid.spacing() * grid.spacing();
    grid.fluid_interior()
        .map(|(i, j)| {
            let l = grid.index(i, j);
            (laplacian.gather_apply(&offsets, l, |n| u[n]) + h2 * w[l]).abs()
        })
        .fold(0.0, crate::solver::nan_max)
}
