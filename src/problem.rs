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

//! The contract a caller implements to describe the optimization problem:
//! dimension, bounds, starting point and granularity. The actual blackbox
//! evaluation is a separate concern (see [`crate::evaluator`]) — `Problem`
//! only describes the static shape of the search space, the way the
//! teacher's `Problem` trait describes a DP's state space rather than how
//! to explore it.

use crate::math::Point;
use crate::params::Parameters;

pub trait Problem {
    fn dimension(&self) -> usize;
    fn x0(&self) -> Point;
    fn lower_bound(&self) -> Vec<Option<f64>>;
    fn upper_bound(&self) -> Vec<Option<f64>>;
    fn granularity(&self) -> Vec<f64>;

    /// Whether `point` lies within the declared bounds (extreme-barrier
    /// constraints enforced before ever reaching the blackbox).
    fn is_in_bounds(&self, point: &Point) -> bool {
        let lo = self.lower_bound();
        let hi = self.upper_bound();
        point.coords().iter().enumerate().all(|(i, c)| {
            let v = match c.value() {
                Some(v) => v,
                None => return false,
            };
            lo[i].map(|b| v >= b).unwrap_or(true) && hi[i].map(|b| v <= b).unwrap_or(true)
        })
    }
}

/// A `Problem` implementation backed directly by [`Parameters`], for the
/// common case where the search-space shape is exactly what was configured.
pub struct ParamProblem<'a>(pub &'a Parameters);

impl<'a> Problem for ParamProblem<'a> {
    fn dimension(&self) -> usize {
        self.0.dimension
    }

    fn x0(&self) -> Point {
        Point::from_f64(&self.0.x0)
    }

    fn lower_bound(&self) -> Vec<Option<f64>> {
        self.0.lower_bound.clone()
    }

    fn upper_bound(&self) -> Vec<Option<f64>> {
        self.0.upper_bound.clone()
    }

    fn granularity(&self) -> Vec<f64> {
        self.0.granularity_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Parameters {
        Parameters {
            dimension: 2,
            x0: vec![0.0, 0.0],
            lower_bound: vec![Some(-1.0), None],
            upper_bound: vec![Some(1.0), None],
            granularity: vec![],
            max_bb_eval: None,
            nb_threads_parallel_eval: 1,
            direction_type: crate::params::DirectionType::OrthoNPlus1,
            opportunistic_eval: true,
            bb_max_block_size: 1,
            h_max_0: 0.0,
            quad_model_search: true,
            nm_search: false,
            vns_search: false,
            speculative_search: true,
            constraint_kinds: vec![],
            anisotropic_mesh: false,
            anisotropy_factor: 0.1,
            max_x_feas: 1,
            max_x_inf: 1,
            generate_all_points_before_eval: false,
            cache_file: None,
            solution_file: None,
            history_file: None,
            stats_file: None,
        }
    }

    #[test]
    fn point_within_bounds_is_accepted() {
        let p = params();
        let problem = ParamProblem(&p);
        assert!(problem.is_in_bounds(&Point::from_f64(&[0.5, 1000.0])));
    }

    #[test]
    fn point_outside_a_bound_is_rejected() {
        let p = params();
        let problem = ParamProblem(&p);
        assert!(!problem.is_in_bounds(&Point::from_f64(&[2.0, 0.0])));
    }
}
