// Copyright 2026 Nomad Contributors
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Fixed-variable decomposition: restricts a problem to a subset of its
//! variables, holding the rest at fixed values (PSD/SSD-MADS style
//! decomposition). Points are translated between the full space and the
//! reduced free-variable space without any shared mutable state between
//! parent and child subproblem, per the engine's "no back-references"
//! design.

use crate::math::Point;

/// A restriction of the full variable space: each coordinate is either held
/// fixed at a value or left free.
#[derive(Clone, Debug)]
pub struct Subproblem {
    fixed: Vec<Option<f64>>,
}

impl Subproblem {
    pub fn new(fixed: Vec<Option<f64>>) -> Self {
        Subproblem { fixed }
    }

    /// A subproblem with every variable free: the trivial (root) case.
    pub fn full(dimension: usize) -> Self {
        Subproblem { fixed: vec![None; dimension] }
    }

    pub fn dimension(&self) -> usize {
        self.fixed.len()
    }

    pub fn free_indices(&self) -> Vec<usize> {
        self.fixed.iter().enumerate().filter_map(|(i, f)| f.is_none().then_some(i)).collect()
    }

    pub fn is_fixed(&self, index: usize) -> bool {
        self.fixed[index].is_some()
    }

    /// Projects a full-space point down to only its free coordinates.
    pub fn reduce(&self, full: &Point) -> Point {
        let coords = self.free_indices().into_iter().map(|i| full[i]).collect();
        Point::new(coords)
    }

    /// Rebuilds a full-space point from a reduced (free-variables-only)
    /// point, filling fixed coordinates from `self` — the inverse of
    /// [`Subproblem::reduce`].
    pub fn extend(&self, reduced: &Point) -> Point {
        let free = self.free_indices();
        assert_eq!(reduced.size(), free.len());
        let mut free_iter = reduced.coords().iter();
        let coords = self
            .fixed
            .iter()
            .map(|f| match f {
                Some(v) => crate::math::Double::new(*v),
                None => *free_iter.next().expect("reduced point has one coordinate per free index"),
            })
            .collect();
        Point::new(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Double;

    #[test]
    fn reduce_then_extend_round_trips_a_point_consistent_with_the_fixed_values() {
        let sub = Subproblem::new(vec![Some(1.0), None, Some(3.0), None]);
        let full = Point::from_f64(&[1.0, 2.0, 3.0, 4.0]);
        let reduced = sub.reduce(&full);
        assert_eq!(reduced, Point::from_f64(&[2.0, 4.0]));
        let rebuilt = sub.extend(&reduced);
        assert_eq!(rebuilt, full);
    }

    #[test]
    fn a_full_subproblem_has_every_variable_free() {
        let sub = Subproblem::full(3);
        assert_eq!(sub.free_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn extend_overwrites_mismatched_fixed_coordinates_with_the_declared_value() {
        let sub = Subproblem::new(vec![Some(5.0), None]);
        let reduced = Point::from_f64(&[9.0]);
        let rebuilt = sub.extend(&reduced);
        assert_eq!(rebuilt[0], Double::new(5.0));
    }
}
