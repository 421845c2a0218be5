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

//! The MADS algorithm itself: the step tree (mega-iteration -> iteration ->
//! search/poll), fixed-variable subproblems, and the top-level `Algorithm`
//! entry point.

pub mod algorithm;
pub mod iteration;
pub mod mega_iteration;
pub mod poll;
pub mod search;
pub mod subproblem;

use std::sync::Arc;

use crate::eval::{Cache, EvalPoint};
use crate::math::{Direction, Double, Point};
use crate::mesh::GMesh;
use crate::problem::Problem;
use crate::queue::{ComparePriority, EvalQueuePoint};

/// Clips `point` back into the declared bounds, coordinate by coordinate.
/// An undefined coordinate has no bound to clip to and passes through.
fn clip_to_bounds(point: &Point, lower: &[Option<f64>], upper: &[Option<f64>]) -> Point {
    let clipped: Vec<Double> = point
        .coords()
        .iter()
        .enumerate()
        .map(|(i, c)| match c.value() {
            Some(mut v) => {
                if let Some(lo) = lower.get(i).copied().flatten() {
                    v = v.max(lo);
                }
                if let Some(hi) = upper.get(i).copied().flatten() {
                    v = v.min(hi);
                }
                Double::new(v)
            }
            None => *c,
        })
        .collect();
    Point::new(clipped)
}

/// Projects, bound-clips and granularity-snaps `points`, claims each
/// surviving one exactly once via [`Cache::smart_insert`], and submits the
/// winners to `control`. Shared by the search and poll phases so neither
/// one ever double-submits a point the other already claimed.
///
/// A candidate that falls outside the declared bounds is clipped back onto
/// them and re-projected onto the mesh, rather than dropped outright — a
/// poll direction that overshoots a bound should still contribute the
/// boundary point to the frame, not vanish from consideration.
///
/// Each candidate carries the poll direction that generated it, if any
/// (`None` for search-step points). `last_success_direction` is compared
/// against it to set [`EvalQueuePoint::is_last_success_direction`], the
/// dynamic ranking hint the default priority reads.
pub(crate) fn submit_candidates<P: ComparePriority + Send>(
    points: Vec<(Point, Option<Direction>)>,
    problem: &dyn Problem,
    mesh: &GMesh,
    cache: &Arc<dyn Cache + Send + Sync>,
    control: &crate::evaluator::EvaluatorControl<P>,
    order: &mut u64,
    last_success_direction: Option<&Direction>,
) -> Vec<EvalPoint> {
    let granularity = problem.granularity();
    let lower = problem.lower_bound();
    let upper = problem.upper_bound();
    let mut submitted = Vec::new();
    let mut queued = Vec::new();
    for (p, dir) in points {
        let mut projected = mesh.project(&p).round_to_granularity(&granularity);
        if !problem.is_in_bounds(&projected) {
            projected = mesh.project(&clip_to_bounds(&projected, &lower, &upper)).round_to_granularity(&granularity);
            if !problem.is_in_bounds(&projected) {
                continue;
            }
        }
        let ep = EvalPoint::new(projected);
        if cache.smart_insert(ep.clone()) {
            *order += 1;
            let is_last_success_direction = match (&dir, last_success_direction) {
                (Some(d), Some(last)) => d == last,
                _ => false,
            };
            submitted.push(ep.clone());
            queued.push(EvalQueuePoint { eval_point: ep, generation_order: *order, is_last_success_direction, direction: dir });
        }
    }
    control.submit(queued);
    submitted
}
