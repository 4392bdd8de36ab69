//! The fixed lattice, its physical scales and the embedded beam.

use crate::error::ConfigError;
use crate::util::*;

/// Axis aligned beam resting on the centerline `j = 0`.
/// Membership is inclusive on every side.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Obstacle {
    aabb: AABB<2>,
}

impl Obstacle {
    /// Beam spanning `start..=start + length` along the channel
    /// and `0..=height` across it.
    pub fn new(start: i32, height: i32, length: i32) -> Self {
        Obstacle {
            aabb: AABB::new(matrix![start, start + length; 0, height]),
        }
    }

    pub fn aabb(&self) -> &AABB<2> {
        &self.aabb
    }

    /// First column of the beam, the front face.
    pub fn front(&self) -> i32 {
        self.aabb.bounds[(0, 0)]
    }

    /// Last column of the beam, the back face.
    pub fn back(&self) -> i32 {
        self.aabb.bounds[(0, 1)]
    }

    /// Last row of the beam, the top face.
    pub fn top(&self) -> i32 {
        self.aabb.bounds[(1, 1)]
    }

    #[inline]
    pub fn contains(&self, i: i32, j: i32) -> bool {
        i >= self.aabb.bounds[(0, 0)]
            && i <= self.aabb.bounds[(0, 1)]
            && j >= self.aabb.bounds[(1, 0)]
            && j <= self.aabb.bounds[(1, 1)]
    }
}

/// Immutable for the lifetime of a run.
/// Nodes are `(i, j)` with `0 <= i <= nx` and `0 <= j <= ny`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Grid {
    aabb: AABB<2>,
    spacing: f64,
    inflow_velocity: f64,
    obstacle: Obstacle,
}

impl Grid {
    /// Validate the geometry and build the grid.
    ///
    /// The wall vorticity on each exposed face is taken from the node two
    /// cells off the wall, so the beam must leave two fluid columns in front,
    /// two behind and two rows above.
    pub fn new(
        nx: i32,
        ny: i32,
        spacing: f64,
        inflow_velocity: f64,
        obstacle: Obstacle,
    ) -> Result<Self, ConfigError> {
        if nx < 4 || ny < 4 {
            return Err(ConfigError::GridTooSmall { nx, ny });
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "spacing",
                value: spacing,
            });
        }
        if !(inflow_velocity.is_finite() && inflow_velocity > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "inflow_velocity",
                value: inflow_velocity,
            });
        }

        let beam = obstacle.aabb();
        if !beam.check_validity() {
            let extent = beam.bounds.column(1) - beam.bounds.column(0);
            return Err(ConfigError::DegenerateObstacle {
                height: extent[1],
                length: extent[0],
            });
        }

        let allowed = AABB::new(matrix![2, nx - 2; 0, ny - 2]);
        if !allowed.contains_aabb(beam) || beam.bounds[(1, 0)] != 0 {
            return Err(ConfigError::ObstacleOutOfBounds {
                obstacle: *beam,
                allowed,
            });
        }

        Ok(Grid {
            aabb: AABB::new(matrix![0, nx; 0, ny]),
            spacing,
            inflow_velocity,
            obstacle,
        })
    }

    /// Every node of the lattice.
    pub fn aabb(&self) -> &AABB<2> {
        &self.aabb
    }

    pub fn nx(&self) -> i32 {
        self.aabb.bounds[(0, 1)]
    }

    pub fn ny(&self) -> i32 {
        self.aabb.bounds[(1, 1)]
    }

    /// `h`
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// `V0`
    pub fn inflow_velocity(&self) -> f64 {
        self.inflow_velocity
    }

    pub fn obstacle(&self) -> &Obstacle {
        &self.obstacle
    }

    /// Distance between neighboring columns in the linear buffers.
    #[inline]
    pub fn stride(&self) -> usize {
        self.ny() as usize + 1
    }

    #[inline]
    pub fn index(&self, i: i32, j: i32) -> usize {
        debug_assert!(self.aabb.contains(&vector![i, j]));
        i as usize * self.stride() + j as usize
    }

    /// The single obstacle membership test every component goes through.
    #[inline]
    pub fn is_inside_obstacle(&self, i: i32, j: i32) -> bool {
        self.obstacle.contains(i, j)
    }

    /// Interior fluid nodes, the ones the sweeps update and
    /// the change norms are measured over.
    pub fn fluid_interior(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (nx, ny) = (self.nx(), self.ny());
        (1..nx)
            .flat_map(move |i| (1..ny).map(move |j| (i, j)))
            .filter(|&(i, j)| !self.is_inside_obstacle(i, j))
    }
}
