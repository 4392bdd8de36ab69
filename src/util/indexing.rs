use crate::util::*;

/// Number of nodes in a lattice with the given exclusive extent.
pub fn real_buffer_size<const DIMENSION: usize>(
    exclusive_bound: &Coord<DIMENSION>,
) -> usize {
    exclusive_bound.iter().map(|d| *d as usize).product()
}

/// Row-major linear index, the last dimension varies fastest.
/// For the 2D flow lattice that means `j` is contiguous and
/// a fixed `i` is one column of the channel.
pub fn coord_to_linear<const GRID_DIMENSION: usize>(
    coord: &Coord<GRID_DIMENSION>,
    exclusive_bounds: &Coord<GRID_DIMENSION>,
) -> usize {
    let mut accumulator = 0;
    for d in 0..GRID_DIMENSION {
        debug_assert!(coord[d] >= 0);
        accumulator = accumulator * exclusive_bounds[d] as usize
            + coord[d] as usize;
    }
    accumulator
}

pub fn linear_to_coord<const GRID_DIMENSION: usize>(
    linear_index: usize,
    exclusive_bounds: &Coord<GRID_DIMENSION>,
) -> Coord<GRID_DIMENSION> {
    let mut result = Coord::zero();
    let mut remaining = linear_index;
    for d in (0..GRID_DIMENSION).rev() {
        let extent = exclusive_bounds[d] as usize;
        result[d] = (remaining % extent) as i32;
        remaining /= extent;
    }
    result
}
