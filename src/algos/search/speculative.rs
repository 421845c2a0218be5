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

//! Speculative search: right after a successful poll, try one larger step
//! along the direction that just succeeded, before the frame enlarges and
//! the next iteration's poll re-derives directions from scratch.

use crate::math::{Direction, Point};
use crate::mesh::GMesh;

/// Proposes a single trial point obtained by doubling the step along
/// `last_success_direction`.
pub fn generate(center: &Point, mesh: &GMesh, last_success_direction: &Direction) -> Point {
    let doubled: Vec<f64> = mesh.frame_size().iter().map(|f| f * 2.0).collect();
    mesh.project(&last_success_direction.apply(center, &doubled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speculative_point_moves_further_than_a_plain_poll_step() {
        let center = Point::from_f64(&[0.0]);
        let mesh = GMesh::new(&[0.0]);
        let dir = Direction::new(vec![1]);
        let speculative = generate(&center, &mesh, &dir);
        let plain = dir.apply(&center, &mesh.frame_size());
        assert!(speculative[0].value_or(0.0).abs() > plain[0].value_or(0.0).abs());
    }
}
