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

//! In-process evaluator: wraps a user closure directly, for callers linking
//! NOMAD as a library rather than shelling out to an external executable.

use crate::eval::{Eval, EvalType};
use crate::evaluator::Evaluator;
use crate::math::Point;

/// Evaluates `f`, which returns the objective value and the constraint
/// values (each `> 0` meaning violated), in-process for every point in a
/// block.
pub struct CallbackEvaluator<F>
where
    F: Fn(&Point) -> Option<(f64, Vec<f64>)> + Send + Sync,
{
    f: F,
}

impl<F> CallbackEvaluator<F>
where
    F: Fn(&Point) -> Option<(f64, Vec<f64>)> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        CallbackEvaluator { f }
    }
}

impl<F> Evaluator for CallbackEvaluator<F>
where
    F: Fn(&Point) -> Option<(f64, Vec<f64>)> + Send + Sync,
{
    fn eval_block(&self, points: &[Point], eval_type: EvalType) -> Vec<Eval> {
        points
            .iter()
            .map(|p| match (self.f)(p) {
                Some((f, constraints)) => Eval::ok(eval_type, f, constraints),
                None => Eval::failed(eval_type),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_callback_produces_an_ok_eval() {
        let evaluator = CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![])));
        let evals = evaluator.eval_block(&[Point::from_f64(&[3.0])], EvalType::BbEval);
        assert_eq!(evals[0].f, crate::math::Double::new(9.0));
    }

    #[test]
    fn callback_returning_none_is_a_failed_eval() {
        let evaluator = CallbackEvaluator::new(|_: &Point| None);
        let evals = evaluator.eval_block(&[Point::from_f64(&[1.0])], EvalType::BbEval);
        assert_eq!(evals[0].status, crate::eval::EvalStatus::EvalFailed);
    }
}
