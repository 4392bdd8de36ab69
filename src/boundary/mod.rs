//! Boundary conditions of the channel and of the beam.
//!
//! Domain edges are imposed once before iterating; the relaxation
//! sweeps never write them again. The beam surface is re-imposed every
//! iteration because the sweeps overwrite the wall-adjacent fluid nodes.
//!
//! Layout, with `f`/`b` the front/back columns and `t` the top row of
//! the beam:
//!
//! ```text
//!   j = ny    free surface, u extrapolated by V0 h
//!   j = ny-1  w = 0
//!             ...
//!   t+1       w from u[.., t+2]   (top face) + two corners
//!   0..=t     [f-1] front face | beam u = w = 0 | [b+1] back face
//!   j = 0     centerline u = w = 0
//!   i = 0     inlet, i = nx zero gradient outlet
//! ```

mod corner;
mod edges;
mod obstacle;

pub use edges::*;
pub use obstacle::*;

/// No-slip vorticity at a wall from the streamfunction next to it.
#[inline]
pub fn wall_vorticity(u_adjacent: f64, spacing: f64) -> f64 {
    -2.0 * u_adjacent / (spacing * spacing)
}
