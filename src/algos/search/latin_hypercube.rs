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

//! Latin Hypercube search: a stratified random sample of the bounded box,
//! used to seed the barrier with a diverse initial set of trial points
//! before the mesh has enough history to guide poll directions well.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::math::Point;

/// Draws `count` points from the box `[lower_i, upper_i)`, one per stratum
/// per dimension, permuted independently per dimension so no two points
/// share a stratum in any coordinate.
pub fn generate(lower: &[f64], upper: &[f64], count: usize, seed: u64) -> Vec<Point> {
    assert_eq!(lower.len(), upper.len());
    let n = lower.len();
    if count == 0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let strata: Vec<Vec<usize>> = (0..n)
        .map(|_| {
            let mut s: Vec<usize> = (0..count).collect();
            s.shuffle(&mut rng);
            s
        })
        .collect();
    (0..count)
        .map(|k| {
            let coords: Vec<f64> = (0..n)
                .map(|d| {
                    let stratum = strata[d][k];
                    let u: f64 = rng.gen();
                    lower[d] + (stratum as f64 + u) / count as f64 * (upper[d] - lower[d])
                })
                .collect();
            Point::from_f64(&coords)
        })
        .collect()
}
