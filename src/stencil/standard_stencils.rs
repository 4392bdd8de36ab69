use crate::stencil::*;

/// Four-neighbor offsets shared by every stencil of the flow solve:
/// east, west, north, south.
pub const FIVE_POINT_NEIGHBORS: [[i32; 2]; 4] = [[1, 0], [-1, 0], [0, 1], [0, -1]];

/// Mean of the four neighbors, the Jacobi target of the discrete Laplacian.
pub fn neighbor_mean_2d() -> Stencil<2, 4> {
    Stencil::new(FIVE_POINT_NEIGHBORS, |args: &[f64; 4]| {
        0.25 * (args[0] + args[1] + args[2] + args[3])
    })
}

/// Five point Laplacian scaled by `h^2`: the neighbors minus four times the center.
pub fn scaled_laplacian_2d() -> Stencil<2, 5> {
    Stencil::new(
        [[1, 0], [-1, 0], [0, 1], [0, -1], [0, 0]],
        |args: &[f64; 5]| args[0] + args[1] + args[2] + args[3] - 4.0 * args[4],
    )
}
