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

//! Evaluators: the thing that turns a point into an [`Eval`], and the
//! worker pool that dispatches blocks of points to it concurrently.

mod blackbox;
mod callback;
mod control;

pub use blackbox::BlackboxEvaluator;
pub use callback::CallbackEvaluator;
pub use control::{ControlStats, EvaluatorControl};

use crate::eval::{Eval, EvalType};
use crate::math::Point;

/// Evaluates one or more points. Implementations decide how to parallelize
/// (or not) across the points within one block; [`EvaluatorControl`] is
/// what parallelizes across *blocks*.
pub trait Evaluator: Send + Sync {
    fn eval_block(&self, points: &[Point], eval_type: EvalType) -> Vec<Eval>;
}
