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

//! Poll directions: displacement vectors used to generate trial points
//! around a frame center.

use super::double::Double;
use super::point::Point;

/// A direction in variable space, stored as an integer-ratio vector so that
/// positive-basis constructions (Ortho-2n, Ortho-n+1) remain exact under the
/// mesh's granular scaling.
#[derive(Clone, Debug, PartialEq)]
pub struct Direction {
    components: Vec<i64>,
}

impl Direction {
    pub fn new(components: Vec<i64>) -> Self {
        Direction { components }
    }

    pub fn size(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[i64] {
        &self.components
    }

    /// Applies this direction, scaled coordinate-wise by `delta`, to
    /// `center`, returning the resulting trial point (unprojected).
    pub fn apply(&self, center: &Point, delta: &[f64]) -> Point {
        assert_eq!(center.size(), self.components.len());
        let coords: Vec<Double> = center
            .coords()
            .iter()
            .zip(self.components.iter())
            .zip(delta.iter())
            .map(|((c, &d), &step)| *c + Double::new(d as f64 * step))
            .collect();
        Point::new(coords)
    }

    pub fn negate(&self) -> Direction {
        Direction::new(self.components.iter().map(|c| -c).collect())
    }

    /// Cosine of the angle between two directions, used by direction-type
    /// quality checks (a positive spanning set must have angle < 90deg
    /// between some pair of directions and the negative gradient estimate).
    pub fn cosine_angle(&self, other: &Direction) -> f64 {
        let dot: i64 = self.components.iter().zip(other.components.iter()).map(|(a, b)| a * b).sum();
        let na = (self.components.iter().map(|c| c * c).sum::<i64>() as f64).sqrt();
        let nb = (other.components.iter().map(|c| c * c).sum::<i64>() as f64).sqrt();
        if na == 0.0 || nb == 0.0 {
            0.0
        } else {
            dot as f64 / (na * nb)
        }
    }

    /// Builds the 2n "Ortho-2n" positive basis: the identity directions and
    /// their negatives, permuted by a Householder-style transform of `b_l`
    /// so successive polls do not repeat the same basis.
    pub fn ortho_2n(n: usize, b_l: &[i64]) -> Vec<Direction> {
        assert_eq!(b_l.len(), n);
        let h = householder_matrix(b_l);
        let mut dirs = Vec::with_capacity(2 * n);
        for row in &h {
            dirs.push(Direction::new(row.clone()));
        }
        for row in &h {
            dirs.push(Direction::new(row.iter().map(|c| -c).collect()));
        }
        dirs
    }

    /// Builds the "Ortho-n+1" positive basis: `n` Householder directions
    /// plus their negated sum, the minimal positive spanning set.
    pub fn ortho_n_plus_1(n: usize, b_l: &[i64]) -> Vec<Direction> {
        assert_eq!(b_l.len(), n);
        let h = householder_matrix(b_l);
        let mut dirs: Vec<Direction> = h.iter().map(|row| Direction::new(row.clone())).collect();
        let mut last = vec![0i64; n];
        for row in &h {
            for (acc, c) in last.iter_mut().zip(row.iter()) {
                *acc -= c;
            }
        }
        dirs.push(Direction::new(last));
        dirs
    }
}

/// Householder reflection `H = I - 2 b b^T / ||b||^2`, rounded to the
/// nearest integer matrix, as used by NOMAD to build a well-spread positive
/// basis from a single random integer vector `b_l`.
fn householder_matrix(b_l: &[i64]) -> Vec<Vec<i64>> {
    let n = b_l.len();
    let norm_sq: i64 = b_l.iter().map(|b| b * b).sum();
    if norm_sq == 0 {
        return (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1 } else { 0 }).collect())
            .collect();
    }
    let mut h = vec![vec![0i64; n]; n];
    for i in 0..n {
        for j in 0..n {
            let identity = if i == j { 1.0 } else { 0.0 };
            let reflect = 2.0 * (b_l[i] * b_l[j]) as f64 / norm_sq as f64;
            h[i][j] = (identity - reflect).round() as i64;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ortho_2n_has_2n_directions() {
        let dirs = Direction::ortho_2n(3, &[1, 2, 3]);
        assert_eq!(dirs.len(), 6);
    }

    #[test]
    fn ortho_2n_directions_come_in_negated_pairs() {
        let dirs = Direction::ortho_2n(2, &[1, 1]);
        for i in 0..2 {
            assert_eq!(dirs[i].negate(), dirs[i + 2]);
        }
    }

    #[test]
    fn ortho_n_plus_1_sums_to_zero() {
        let dirs = Direction::ortho_n_plus_1(3, &[2, 1, 4]);
        assert_eq!(dirs.len(), 4);
        let mut sum = vec![0i64; 3];
        for d in &dirs {
            for (s, c) in sum.iter_mut().zip(d.components()) {
                *s += c;
            }
        }
        assert_eq!(sum, vec![0, 0, 0]);
    }

    #[test]
    fn apply_displaces_center_by_scaled_components() {
        let dir = Direction::new(vec![1, -1]);
        let center = Point::from_f64(&[0.0, 0.0]);
        let trial = dir.apply(&center, &[0.5, 0.5]);
        assert_eq!(trial, Point::from_f64(&[0.5, -0.5]));
    }
}
