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

//! Variable neighborhood search: shakes the current incumbent within a
//! neighborhood that grows each time the previous shake failed to improve
//! it, then runs a descent MADS from the shaken point rather than simply
//! handing the raw shake back as a trial point — the shake only picks
//! where to restart the search, the inner poll is what actually looks for
//! an improvement there.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algos::iteration::MadsIteration;
use crate::barrier::Barrier;
use crate::eval::{Cache, EvalPoint};
use crate::evaluator::EvaluatorControl;
use crate::math::Point;
use crate::mesh::GMesh;
use crate::params::Parameters;
use crate::problem::Problem;
use crate::queue::{EvalQueuePoint, LexicographicPriority};
use crate::step::{EvalStopType, IterStopType, Step};

/// Upper bound on how many descent iterations one VNS shake is allowed to
/// spend chasing an improvement before giving up and letting the outer
/// mega-iteration escalate `k` instead.
const MAX_DESCENT_ITERATIONS: usize = 8;

/// Shakes `center` at neighborhood level `k` (`k = 1` is the smallest
/// perturbation, growing with unsuccessful attempts) and returns the
/// perturbed point, still unprojected. The seed should combine the run's
/// iteration counter and `k` so repeated runs are reproducible.
fn shake(center: &Point, mesh: &GMesh, k: usize, seed: u64) -> Point {
    let mut rng = StdRng::seed_from_u64(seed);
    let frame = mesh.frame_size();
    let coords: Vec<f64> = center
        .coords()
        .iter()
        .zip(frame.iter())
        .map(|(c, &f)| {
            let magnitude = f * k as f64;
            c.value_or(0.0) + rng.gen_range(-magnitude..=magnitude)
        })
        .collect();
    Point::from_f64(&coords)
}

/// Shakes `center` at level `k` and projects/bounds-checks the result
/// without evaluating it. Used by `GENERATE_ALL_POINTS_BEFORE_EVAL` mode,
/// which must collect every center's trial points before any of them is
/// evaluated — the full [`generate`] descent cannot be used there since it
/// evaluates as it goes.
pub fn propose(center: &Point, mesh: &GMesh, k: usize, seed: u64, problem: &dyn Problem) -> Option<Point> {
    let shaken = mesh.project(&shake(center, mesh, k, seed)).round_to_granularity(&problem.granularity());
    problem.is_in_bounds(&shaken).then_some(shaken)
}

/// Shakes `center` at level `k`, evaluates the shaken point, then runs a
/// bounded poll-only descent from it on a private copy of the mesh (search
/// methods are disabled for the descent itself, so a VNS shake can never
/// recursively spawn another VNS shake). Returns the best point the descent
/// reached if it improved the barrier's incumbent, `None` otherwise — a
/// shake that goes nowhere contributes no trial point, exactly like a
/// failed poll direction.
#[allow(clippy::too_many_arguments)]
pub fn generate(
    center: &Point,
    mesh: &GMesh,
    k: usize,
    seed: u64,
    problem: &dyn Problem,
    params: &Parameters,
    cache: &Arc<dyn Cache + Send + Sync>,
    barrier: &Arc<dyn Barrier + Send + Sync>,
    control: &EvaluatorControl<LexicographicPriority>,
    order: &mut u64,
) -> Option<Point> {
    let before_tag = barrier.best_feasible().or_else(|| barrier.best_infeasible()).map(|ep| ep.tag);

    let shaken = mesh.project(&shake(center, mesh, k, seed)).round_to_granularity(&problem.granularity());
    if !problem.is_in_bounds(&shaken) {
        return None;
    }

    let mut frame_center = EvalPoint::new(shaken);
    if cache.smart_insert(frame_center.clone()) {
        *order += 1;
        control.submit(vec![EvalQueuePoint {
            eval_point: frame_center.clone(),
            generation_order: *order,
            is_last_success_direction: false,
            direction: None,
        }]);
        let stats = control.run();
        if let Some(EvalStopType::MaxBbEvalReached) = stats.stop_reason {
            return improved_point(before_tag, barrier);
        }
    }
    if let Some(found) = cache.find(&frame_center.point) {
        frame_center = found;
    }
    if !frame_center.is_eval_ok() {
        return improved_point(before_tag, barrier);
    }
    barrier.consider(frame_center.clone());

    let mut descent_params = params.clone();
    descent_params.quad_model_search = false;
    descent_params.nm_search = false;
    descent_params.vns_search = false;
    descent_params.speculative_search = false;

    let mut local_mesh = mesh.clone();
    for _ in 0..MAX_DESCENT_ITERATIONS {
        let mut it = MadsIteration::new(problem, &descent_params, &mut local_mesh, cache, barrier, control, frame_center.clone(), *order, 1, None);
        it.execute();
        *order = it.order();
        let outcome = it.outcome();
        if let Some(best) = barrier.best_feasible().or_else(|| barrier.best_infeasible()) {
            frame_center = best;
        }
        match outcome {
            Some(IterStopType::FullSuccess) | Some(IterStopType::PartialSuccess) => continue,
            _ => break,
        }
    }

    improved_point(before_tag, barrier)
}

fn improved_point(before_tag: Option<u64>, barrier: &Arc<dyn Barrier + Send + Sync>) -> Option<Point> {
    let after = barrier.best_feasible().or_else(|| barrier.best_infeasible())?;
    if Some(after.tag) == before_tag {
        None
    } else {
        Some(after.point.clone())
    }
}
