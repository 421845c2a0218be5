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

//! Fixed-dimension coordinate vectors built from [`Double`].

use std::fmt;
use std::ops::{Add, Index, IndexMut, Sub};

use super::double::Double;

/// A point in the variable space, one [`Double`] per coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    coords: Vec<Double>,
}

impl Point {
    pub fn new(coords: Vec<Double>) -> Self {
        Point { coords }
    }

    /// A point of `n` undefined coordinates.
    pub fn undefined(n: usize) -> Self {
        Point { coords: vec![Double::undefined(); n] }
    }

    pub fn from_f64(values: &[f64]) -> Self {
        Point { coords: values.iter().map(|&v| Double::new(v)).collect() }
    }

    pub fn size(&self) -> usize {
        self.coords.len()
    }

    pub fn coords(&self) -> &[Double] {
        &self.coords
    }

    pub fn is_complete(&self) -> bool {
        self.coords.iter().all(Double::is_defined)
    }

    /// Euclidean norm, `undefined` if any coordinate is undefined.
    pub fn norm(&self) -> Double {
        if !self.is_complete() {
            return Double::undefined();
        }
        let sum: f64 = self.coords.iter().map(|c| c.value_or(0.0).powi(2)).sum();
        Double::new(sum.sqrt())
    }

    /// Quantizes every coordinate to `eps`-sized integer ticks, producing a
    /// hashable key for exact-dedup cache lookups. Undefined coordinates map
    /// to `i64::MIN`.
    pub fn quantize(&self, eps: f64) -> Vec<i64> {
        self.coords
            .iter()
            .map(|c| match c.value() {
                Some(v) => (v / eps).round() as i64,
                None => i64::MIN,
            })
            .collect()
    }

    /// Coordinate-wise projection onto the granular lattice defined by
    /// `granularity` (0.0 means continuous, no rounding for that coordinate).
    pub fn round_to_granularity(&self, granularity: &[f64]) -> Point {
        let coords = self
            .coords
            .iter()
            .zip(granularity.iter())
            .map(|(c, &g)| c.round_to_granularity(g))
            .collect();
        Point::new(coords)
    }
}

impl Index<usize> for Point {
    type Output = Double;
    fn index(&self, idx: usize) -> &Double {
        &self.coords[idx]
    }
}

impl IndexMut<usize> for Point {
    fn index_mut(&mut self, idx: usize) -> &mut Double {
        &mut self.coords[idx]
    }
}

impl Add<&Point> for &Point {
    type Output = Point;
    fn add(self, rhs: &Point) -> Point {
        assert_eq!(self.size(), rhs.size(), "point dimension mismatch");
        let coords = self.coords.iter().zip(rhs.coords.iter()).map(|(a, b)| *a + *b).collect();
        Point::new(coords)
    }
}

impl Sub<&Point> for &Point {
    type Output = Point;
    fn sub(self, rhs: &Point) -> Point {
        assert_eq!(self.size(), rhs.size(), "point dimension mismatch");
        let coords = self.coords.iter().zip(rhs.coords.iter()).map(|(a, b)| *a - *b).collect();
        Point::new(coords)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_is_coordinate_wise() {
        let a = Point::from_f64(&[1.0, 2.0]);
        let b = Point::from_f64(&[0.5, -1.0]);
        let sum = &a + &b;
        assert_eq!(sum, Point::from_f64(&[1.5, 1.0]));
    }

    #[test]
    fn quantize_is_stable_for_nearby_values() {
        let a = Point::from_f64(&[1.0000000001]);
        let b = Point::from_f64(&[1.0000000002]);
        assert_eq!(a.quantize(1e-6), b.quantize(1e-6));
    }

    #[test]
    fn projection_onto_mesh_is_idempotent() {
        let p = Point::from_f64(&[1.23456, 7.89]);
        let g = [0.01, 0.1];
        let once = p.round_to_granularity(&g);
        let twice = once.round_to_granularity(&g);
        assert_eq!(once, twice);
    }

    #[test]
    fn incomplete_point_has_no_norm() {
        let p = Point::undefined(3);
        assert!(!p.norm().is_defined());
    }
}
