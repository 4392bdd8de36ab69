use crate::util::*;

pub type Values<const NEIGHBORHOOD_SIZE: usize> =
    nalgebra::SVector<f64, { NEIGHBORHOOD_SIZE }>;

/// For linear stencils, we can extract the weight for a neighbor
/// by passing in 1.0 for that neighbor and 0.0 for the others.
pub fn extract_weights<
    const NEIGHBORHOOD_SIZE: usize,
    F: Fn(&[f64; NEIGHBORHOOD_SIZE]) -> f64,
>(
    f: F,
) -> Values<NEIGHBORHOOD_SIZE> {
    let mut weights = Values::zeros();
    let mut arg_buffer = [0.0; NEIGHBORHOOD_SIZE];
    for n in 0..NEIGHBORHOOD_SIZE {
        arg_buffer[n] = 1.0;
        weights[n] = f(&arg_buffer);
        arg_buffer[n] = 0.0;
    }
    weights
}

/// A linear stencil: neighbor offsets and their weights.
/// Used for the linear parts of the relaxation updates,
/// the nonlinear convective terms are written out by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil<const GRID_DIMENSION: usize, const NEIGHBORHOOD_SIZE: usize>
{
    pub weights: Values<NEIGHBORHOOD_SIZE>,
    pub offsets: [Coord<GRID_DIMENSION>; NEIGHBORHOOD_SIZE],
}

impl<const GRID_DIMENSION: usize, const NEIGHBORHOOD_SIZE: usize>
    Stencil<GRID_DIMENSION, NEIGHBORHOOD_SIZE>
{
    pub fn new<F: Fn(&[f64; NEIGHBORHOOD_SIZE]) -> f64>(
        offsets: [[i32; GRID_DIMENSION]; NEIGHBORHOOD_SIZE],
        operation: F,
    ) -> Self {
        let weights = extract_weights(operation);
        Stencil {
            offsets: std::array::from_fn(|i| {
                Coord::from_column_slice(&offsets[i])
            }),
            weights,
        }
    }

    pub fn weights(&self) -> &Values<NEIGHBORHOOD_SIZE> {
        &self.weights
    }

    pub fn offsets(&self) -> &[Coord<GRID_DIMENSION>; NEIGHBORHOOD_SIZE] {
        &self.offsets
    }

    pub fn apply(&self, args: &Values<NEIGHBORHOOD_SIZE>) -> f64 {
        self.weights.component_mul(args).sum()
    }

    /// Offsets translated into linear buffer offsets for `aabb`.
    /// Highest dimension goes the fastest.
    pub fn linear_offsets(
        &self,
        aabb: &AABB<GRID_DIMENSION>,
    ) -> [isize; NEIGHBORHOOD_SIZE] {
        let exclusive_bounds = aabb.exclusive_bounds();
        let mut linear_offsets = [0; NEIGHBORHOOD_SIZE];
        let mut accumulator = 1;
        for d in (0..GRID_DIMENSION).rev() {
            for o in 0..NEIGHBORHOOD_SIZE {
                linear_offsets[o] += self.offsets[o][d] as isize * accumulator;
            }
            accumulator *= exclusive_bounds[d] as isize;
        }
        linear_offsets
    }

    /// Apply the stencil at `linear_index`, reading values through `load`.
    /// The caller guarantees every neighbor is inside the buffer.
    #[inline]
    pub fn gather_apply<F: Fn(usize) -> f64>(
        &self,
        linear_offsets: &[isize; NEIGHBORHOOD_SIZE],
        linear_index: usize,
        load: F,
    ) -> f64 {
        let mut result = 0.0;
        for n in 0..NEIGHBORHOOD_SIZE {
            let neighbor = linear_index.wrapping_add_signed(linear_offsets[n]);
            result += self.weights[n] * load(neighbor);
        }
        result
    }
}
