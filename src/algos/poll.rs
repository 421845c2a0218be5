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

//! Poll: generates the positive-basis trial points around a frame center.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::mesh::GMesh;
use crate::math::{Direction, Point};
use crate::params::DirectionType;

const SEED_RANGE: i64 = 4;

/// Builds a fresh positive basis, seeded deterministically by `seed` (e.g.
/// the iteration counter) so repeated runs are reproducible.
pub fn seeded_basis(n: usize, direction_type: DirectionType, seed: u64) -> Vec<Direction> {
    let mut rng = StdRng::seed_from_u64(seed);
    let b_l: Vec<i64> = (0..n).map(|_| rng.gen_range(-SEED_RANGE..=SEED_RANGE)).collect();
    match direction_type {
        DirectionType::Ortho2N => Direction::ortho_2n(n, &b_l),
        DirectionType::OrthoNPlus1 => Direction::ortho_n_plus_1(n, &b_l),
    }
}

/// Generates the poll trial points for one frame center: a fresh positive
/// basis scaled by the mesh's frame size and projected back onto the mesh.
pub fn generate_poll_points(center: &Point, mesh: &GMesh, direction_type: DirectionType, seed: u64) -> Vec<Point> {
    let n = center.size();
    let frame = mesh.frame_size();
    seeded_basis(n, direction_type, seed).iter().map(|d| mesh.project(&d.apply(center, &frame))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ortho_2n_poll_produces_twice_the_dimension_trial_points() {
        let center = Point::from_f64(&[0.0, 0.0]);
        let mesh = GMesh::new(&[0.0, 0.0]);
        let points = generate_poll_points(&center, &mesh, DirectionType::Ortho2N, 42);
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn ortho_n_plus_1_poll_produces_dimension_plus_one_trial_points() {
        let center = Point::from_f64(&[0.0, 0.0, 0.0]);
        let mesh = GMesh::new(&[0.0, 0.0, 0.0]);
        let points = generate_poll_points(&center, &mesh, DirectionType::OrthoNPlus1, 7);
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn the_same_seed_produces_the_same_poll_set() {
        let center = Point::from_f64(&[1.0, -2.0]);
        let mesh = GMesh::new(&[0.0, 0.0]);
        let a = generate_poll_points(&center, &mesh, DirectionType::Ortho2N, 99);
        let b = generate_poll_points(&center, &mesh, DirectionType::Ortho2N, 99);
        assert_eq!(a, b);
    }
}
