use crate::util::indexing::*;
use crate::util::*;

/// Axis Aligned Bounding Box (AABB) for lattice coordinates.
/// Each instance is inclusive of both corners.
/// Maps between the linear field buffers and `(i, j)` coordinates,
/// and doubles as the obstacle rectangle and the sweep regions.
#[derive(Hash, Debug, Copy, Clone, Eq, PartialEq)]
pub struct AABB<const DIMENSION: usize> {
    pub bounds: Bounds<DIMENSION>,
}

impl<const DIMENSION: usize> std::fmt::Display for AABB<DIMENSION> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> Result<(), std::fmt::Error> {
        write!(f, "[")?;
        for d in 0..DIMENSION {
            if d > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}..={}", self.bounds[(d, 0)], self.bounds[(d, 1)])?;
        }
        write!(f, "]")
    }
}

impl<const DIMENSION: usize> AABB<DIMENSION> {
    /// Create AABB from raw bounds.
    #[inline]
    pub fn new(bounds: Bounds<DIMENSION>) -> Self {
        AABB { bounds }
    }

    /// Create AABB from corners.
    pub fn from_mm(min: Coord<DIMENSION>, max: Coord<DIMENSION>) -> Self {
        AABB {
            bounds: Bounds::from_columns(&[min, max]),
        }
    }

    /// Moving min to the origin, returns the exclusive size in each direction
    /// i.e. [0, 9] would have exclusive size of 10.
    pub fn exclusive_bounds(&self) -> Coord<DIMENSION> {
        (self.bounds.column(1) - self.bounds.column(0)).add_scalar(1)
    }

    /// Return the number of coordinates contained in the instance.
    #[inline]
    pub fn buffer_size(&self) -> usize {
        real_buffer_size(&self.exclusive_bounds())
    }

    /// Return the linear index for a coord in the instance
    pub fn coord_to_linear(&self, coord: &Coord<DIMENSION>) -> usize {
        coord_to_linear(&(coord - self.min()), &self.exclusive_bounds())
    }

    /// Return the coordinate in the instance for a given linear index.
    pub fn linear_to_coord(&self, index: usize) -> Coord<DIMENSION> {
        linear_to_coord(index, &self.exclusive_bounds()) + self.min()
    }

    /// Check whether the instance contains a coordinate.
    pub fn contains(&self, coord: &Coord<DIMENSION>) -> bool {
        (0..DIMENSION).all(|d| {
            coord[d] >= self.bounds[(d, 0)] && coord[d] <= self.bounds[(d, 1)]
        })
    }

    /// Check whether another AABB is contained in the instance.
    pub fn contains_aabb(&self, other: &Self) -> bool {
        (0..DIMENSION).all(|d| {
            other.bounds[(d, 0)] >= self.bounds[(d, 0)]
                && other.bounds[(d, 1)] <= self.bounds[(d, 1)]
        })
    }

    /// Clip the instance to the overlap with `other`.
    /// The result may be invalid when they do not intersect.
    pub fn trim_to_aabb(&mut self, other: &Self) {
        for d in 0..DIMENSION {
            self.bounds[(d, 0)] = self.bounds[(d, 0)].max(other.bounds[(d, 0)]);
            self.bounds[(d, 1)] = self.bounds[(d, 1)].min(other.bounds[(d, 1)]);
        }
    }

    /// Expand every side by `n` nodes, negative `n` shrinks.
    pub fn grow(&self, n: i32) -> Self {
        let mut result = *self;
        for d in 0..DIMENSION {
            result.bounds[(d, 0)] -= n;
            result.bounds[(d, 1)] += n;
        }
        result
    }

    /// The box one node in from every side.
    pub fn interior(&self) -> Self {
        self.grow(-1)
    }

    /// Return min corner.
    pub fn min(&self) -> Coord<DIMENSION> {
        self.bounds.column(0).into()
    }

    /// Return max corner
    pub fn max(&self) -> Coord<DIMENSION> {
        self.bounds.column(1).into()
    }

    /// Check that max >= min
    pub fn check_validity(&self) -> bool {
        (0..DIMENSION).all(|d| self.bounds[(d, 0)] <= self.bounds[(d, 1)])
    }

    /// Return iterator over contained coords
    /// in linear ordering.
    pub fn coord_iter(&self) -> impl Iterator<Item = Coord<DIMENSION>> + '_ {
        (0..self.buffer_size()).map(|i| self.linear_to_coord(i))
    }

    /// Bounds of the cells spanned by the nodes, one less on the max side.
    pub fn cell_bounds(&self) -> Self {
        let mut cell_bounds = *self;
        cell_bounds
            .bounds
            .set_column(1, &cell_bounds.bounds.column(1).add_scalar(-1));
        cell_bounds
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn buffer_size_test() {
        {
            let a = AABB::new(matrix![0, 70; 0, 20]);
            assert_eq!(a.buffer_size(), 71 * 21);
        }

        {
            let a = AABB::new(matrix![10, 18; 0, 8]);
            assert_eq!(a.buffer_size(), 9 * 9);
        }
    }

    #[test]
    fn contains_test() {
        let obstacle = AABB::new(matrix![10, 18; 0, 8]);
        assert!(obstacle.contains(&vector![10, 0]));
        assert!(obstacle.contains(&vector![18, 8]));
        assert!(!obstacle.contains(&vector![9, 0]));
        assert!(!obstacle.contains(&vector![18, 9]));
        assert!(!obstacle.contains(&vector![19, 4]));

        let lattice = AABB::new(matrix![0, 70; 0, 20]);
        assert!(lattice.contains_aabb(&obstacle));
        assert!(!obstacle.contains_aabb(&lattice));
    }

    #[test]
    fn linear_round_trip_test() {
        let a = AABB::new(matrix![3, 6; 2, 9]);
        for (l, c) in a.coord_iter().enumerate() {
            assert!(a.contains(&c));
            assert_eq!(a.coord_to_linear(&c), l);
        }
        assert_eq!(a.coord_iter().count(), a.buffer_size());
    }

    #[test]
    fn grow_trim_test() {
        let lattice = AABB::new(matrix![0, 70; 0, 20]);
        assert_eq!(lattice.interior(), AABB::new(matrix![1, 69; 1, 19]));

        let mut corner = AABB::from_mm(vector![0, 19], vector![0, 19]).grow(1);
        assert_eq!(corner, AABB::new(matrix![-1, 1; 18, 20]));
        corner.trim_to_aabb(&lattice);
        assert_eq!(corner, AABB::new(matrix![0, 1; 18, 20]));
        assert!(corner.check_validity());
    }

    #[test]
    fn cell_bounds_test() {
        let lattice = AABB::new(matrix![0, 4; 0, 2]);
        assert_eq!(lattice.cell_bounds(), AABB::new(matrix![0, 3; 0, 1]));
        assert_eq!(format!("{}", lattice), "[0..=4 x 0..=2]");
    }
}
