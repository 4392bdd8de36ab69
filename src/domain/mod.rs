//! Field storage for the flow solve.
//!
//! Both scalar fields, the streamfunction `u` and the vorticity `w`,
//! live on the same lattice box and share its linear indexing,
//! so a linear index computed once addresses either field.

mod cells;
mod view;

pub use cells::*;
pub use view::*;

use crate::util::*;

/// The mutable state of one run: streamfunction and vorticity.
/// A fresh instance is created for every target Reynolds number.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState {
    pub stream: OwnedDomain<2>,
    pub vorticity: OwnedDomain<2>,
}

impl FlowState {
    /// Zero initialized fields over `aabb`.
    pub fn new(aabb: AABB<2>) -> Self {
        FlowState {
            stream: OwnedDomain::new(aabb),
            vorticity: OwnedDomain::new(aabb),
        }
    }

    pub fn aabb(&self) -> &AABB<2> {
        self.stream.aabb()
    }

    pub fn u(&self, i: i32, j: i32) -> f64 {
        self.stream.view(&vector![i, j])
    }

    pub fn w(&self, i: i32, j: i32) -> f64 {
        self.vorticity.view(&vector![i, j])
    }

    pub fn set_u(&mut self, i: i32, j: i32, value: f64) {
        self.stream.set_coord(&vector![i, j], value);
    }

    pub fn set_w(&mut self, i: i32, j: i32, value: f64) {
        self.vorticity.set_coord(&vector![i, j], value);
    }

    /// Copy both fields from `other` without reallocating.
    pub fn copy_from(&mut self, other: &FlowState) {
        self.stream.copy_from(&other.stream);
        self.vorticity.copy_from(&other.vorticity);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn fields_share_indexing_test() {
        let mut state = FlowState::new(AABB::new(matrix![0, 10; 0, 4]));
        state.set_u(3, 2, 1.5);
        state.set_w(3, 2, -2.0);
        let l = state.aabb().coord_to_linear(&vector![3, 2]);
        assert_eq!(state.stream.buffer()[l], 1.5);
        assert_eq!(state.vorticity.buffer()[l], -2.0);
    }

    #[test]
    fn copy_from_test() {
        let aabb = AABB::new(matrix![0, 4; 0, 4]);
        let mut a = FlowState::new(aabb);
        a.set_u(1, 1, 2.0);
        a.set_w(2, 3, 4.0);
        let mut b = FlowState::new(aabb);
        b.copy_from(&a);
        assert_eq!(a, b);
    }
}
