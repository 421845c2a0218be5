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

//! Nelder-Mead search: runs the classical simplex moves (reflect, expand,
//! inside/outside contract, shrink) against the real objective, starting
//! from the best cached points near the frame center, until the simplex
//! collapses, degenerates, or a move budget is exhausted.

use std::sync::Arc;

use crate::barrier::Barrier;
use crate::eval::{Cache, EvalPoint};
use crate::evaluator::EvaluatorControl;
use crate::math::Point;
use crate::mesh::GMesh;
use crate::problem::Problem;
use crate::queue::{EvalQueuePoint, LexicographicPriority};
use crate::step::NMStopType;

const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// `simplex` must be sorted best-to-worst by objective value. Returns the
/// reflection of the worst vertex through the centroid of the others,
/// scaled by `alpha` (`1.0` is the classical reflection coefficient), with
/// no evaluation performed. Used by `GENERATE_ALL_POINTS_BEFORE_EVAL` batch
/// mode, which must pool every center's candidates before any of them is
/// evaluated — the full [`generate`] loop cannot be used there since it
/// evaluates every move as it decides the next one.
pub fn propose(simplex: &[Point], alpha: f64) -> Option<Point> {
    if simplex.len() < 2 {
        return None;
    }
    let (rest, worst) = simplex.split_at(simplex.len() - 1);
    Some(reflect(&centroid(rest), &worst[0], alpha))
}

fn reflect(centroid: &Point, worst: &Point, factor: f64) -> Point {
    let n = centroid.size();
    let coords: Vec<f64> =
        (0..n).map(|i| centroid[i].value_or(0.0) + factor * (centroid[i].value_or(0.0) - worst[i].value_or(0.0))).collect();
    Point::from_f64(&coords)
}

fn centroid(points: &[Point]) -> Point {
    let n = points[0].size();
    let coords: Vec<f64> =
        (0..n).map(|i| points.iter().map(|p| p[i].value_or(0.0)).sum::<f64>() / points.len() as f64).collect();
    Point::from_f64(&coords)
}

fn simplex_diameter(simplex: &[EvalPoint]) -> f64 {
    let best = &simplex[0].point;
    simplex
        .iter()
        .skip(1)
        .map(|ep| {
            best.coords()
                .iter()
                .zip(ep.point.coords().iter())
                .map(|(a, b)| (a.value_or(0.0) - b.value_or(0.0)).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .fold(0.0_f64, f64::max)
}

fn f_of(ep: &Option<EvalPoint>) -> f64 {
    ep.as_ref().map(|e| e.f().value_or(f64::INFINITY)).unwrap_or(f64::INFINITY)
}

#[allow(clippy::too_many_arguments)]
fn evaluate(
    point: &Point,
    problem: &dyn Problem,
    mesh: &GMesh,
    cache: &Arc<dyn Cache + Send + Sync>,
    control: &EvaluatorControl<LexicographicPriority>,
    order: &mut u64,
) -> Option<EvalPoint> {
    let projected = mesh.project(point).round_to_granularity(&problem.granularity());
    if !problem.is_in_bounds(&projected) {
        return None;
    }
    let ep = EvalPoint::new(projected);
    if cache.smart_insert(ep.clone()) {
        *order += 1;
        control.submit(vec![EvalQueuePoint {
            eval_point: ep.clone(),
            generation_order: *order,
            is_last_success_direction: false,
            direction: None,
        }]);
        control.run();
    }
    cache.find(&ep.point).filter(EvalPoint::is_eval_ok)
}

#[allow(clippy::too_many_arguments)]
fn shrink(
    simplex: &mut [EvalPoint],
    problem: &dyn Problem,
    mesh: &GMesh,
    cache: &Arc<dyn Cache + Send + Sync>,
    control: &EvaluatorControl<LexicographicPriority>,
    order: &mut u64,
) {
    let best = simplex[0].point.clone();
    for i in 1..simplex.len() {
        let moved = reflect(&best, &simplex[i].point.clone(), -SIGMA);
        simplex[i] = evaluate(&moved, problem, mesh, cache, control, order).unwrap_or_else(|| EvalPoint::new(moved));
    }
}

/// Runs the Nelder-Mead loop from `simplex` (the `n+1` best cached points
/// near the frame center, any order) against the real objective, stopping
/// once the simplex's diameter collapses below the mesh size, fewer than
/// two starting vertices were supplied (rank-deficient), or `max_iterations`
/// moves have been spent. Returns the best point found if it improved on
/// the simplex's original best vertex, alongside why the loop stopped.
#[allow(clippy::too_many_arguments)]
pub fn generate(
    simplex: Vec<EvalPoint>,
    max_iterations: usize,
    problem: &dyn Problem,
    mesh: &GMesh,
    cache: &Arc<dyn Cache + Send + Sync>,
    barrier: &Arc<dyn Barrier + Send + Sync>,
    control: &EvaluatorControl<LexicographicPriority>,
    order: &mut u64,
) -> (Option<Point>, NMStopType) {
    let mut simplex = simplex;
    if simplex.len() < 2 {
        return (None, NMStopType::RankDeficient);
    }
    simplex.sort_by(|a, b| a.f().partial_cmp(&b.f()).unwrap_or(std::cmp::Ordering::Equal));
    let initial_best_tag = simplex[0].tag;
    let min_diameter = mesh.mesh_size().into_iter().fold(0.0_f64, f64::max).max(1e-12);

    let mut stop = NMStopType::MaxIterationReached;
    for _ in 0..max_iterations.max(1) {
        if simplex_diameter(&simplex) < min_diameter {
            stop = NMStopType::SimplexTooSmall;
            break;
        }

        let n = simplex.len() - 1;
        let rest: Vec<Point> = simplex[..n].iter().map(|ep| ep.point.clone()).collect();
        let c = centroid(&rest);
        let worst_point = simplex[n].point.clone();
        let worst_f = simplex[n].f().value_or(f64::INFINITY);
        let second_worst_f = simplex[n - 1].f().value_or(f64::INFINITY);
        let best_f = simplex[0].f().value_or(f64::INFINITY);

        let reflected = reflect(&c, &worst_point, ALPHA);
        let reflected_ep = evaluate(&reflected, problem, mesh, cache, control, order);
        let reflected_f = f_of(&reflected_ep);

        if reflected_f < best_f {
            let expanded = reflect(&c, &worst_point, ALPHA * GAMMA);
            let expanded_ep = evaluate(&expanded, problem, mesh, cache, control, order);
            if f_of(&expanded_ep) < reflected_f {
                simplex[n] = expanded_ep.unwrap_or_else(|| EvalPoint::new(expanded));
            } else {
                simplex[n] = reflected_ep.unwrap_or_else(|| EvalPoint::new(reflected));
            }
        } else if reflected_f < second_worst_f {
            simplex[n] = reflected_ep.unwrap_or_else(|| EvalPoint::new(reflected));
        } else if reflected_f < worst_f {
            let contracted = reflect(&c, &worst_point, ALPHA * RHO);
            let contracted_ep = evaluate(&contracted, problem, mesh, cache, control, order);
            if f_of(&contracted_ep) <= reflected_f {
                simplex[n] = contracted_ep.unwrap_or_else(|| EvalPoint::new(contracted));
            } else {
                shrink(&mut simplex, problem, mesh, cache, control, order);
            }
        } else {
            let contracted = reflect(&c, &worst_point, -RHO);
            let contracted_ep = evaluate(&contracted, problem, mesh, cache, control, order);
            if f_of(&contracted_ep) < worst_f {
                simplex[n] = contracted_ep.unwrap_or_else(|| EvalPoint::new(contracted));
            } else {
                shrink(&mut simplex, problem, mesh, cache, control, order);
            }
        }
        simplex.sort_by(|a, b| a.f().partial_cmp(&b.f()).unwrap_or(std::cmp::Ordering::Equal));
    }

    for ep in &simplex {
        if ep.is_eval_ok() {
            barrier.consider(ep.clone());
        }
    }

    let best = &simplex[0];
    if best.is_eval_ok() && best.tag != initial_best_tag {
        (Some(best.point.clone()), stop)
    } else {
        (None, stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrier::ProgressiveBarrier;
    use crate::eval::{Eval, EvalType, SimpleCache};
    use crate::evaluator::CallbackEvaluator;
    use crate::params::DirectionType;
    use crate::problem::ParamProblem;
    use crate::queue::LexicographicPriority;

    fn test_params(dimension: usize) -> crate::params::Parameters {
        crate::params::Parameters {
            dimension,
            x0: vec![0.0; dimension],
            lower_bound: vec![None; dimension],
            upper_bound: vec![None; dimension],
            granularity: vec![],
            max_bb_eval: None,
            nb_threads_parallel_eval: 1,
            direction_type: DirectionType::OrthoNPlus1,
            opportunistic_eval: false,
            bb_max_block_size: 1,
            h_max_0: 0.0,
            quad_model_search: false,
            nm_search: true,
            vns_search: false,
            speculative_search: false,
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
    fn a_single_point_simplex_is_rank_deficient() {
        let ep = EvalPoint::new(Point::from_f64(&[0.0]));
        let cache: Arc<dyn Cache + Send + Sync> = Arc::new(SimpleCache::new(1e-9));
        let barrier: Arc<dyn Barrier + Send + Sync> = Arc::new(ProgressiveBarrier::new(0.0));
        let evaluator: Arc<dyn crate::evaluator::Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0), vec![]))));
        let control = EvaluatorControl::new(evaluator, Arc::clone(&cache), Arc::clone(&barrier), LexicographicPriority, 1, 1, None, false);
        let mut order = 0u64;

        let params = test_params(1);
        let problem = ParamProblem(&params);
        let mesh = GMesh::new(&params.granularity_or_zero());

        let (result, stop) = generate(vec![ep], 10, &problem, &mesh, &cache, &barrier, &control, &mut order);
        assert!(result.is_none());
        assert_eq!(stop, NMStopType::RankDeficient);
    }

    fn point_with_f(x: f64, y: f64, f: f64) -> EvalPoint {
        let mut ep = EvalPoint::new(Point::from_f64(&[x, y]));
        ep.set_eval(Eval::ok(EvalType::BbEval, f, vec![]));
        ep
    }

    #[test]
    fn a_simplex_around_the_minimum_of_a_bowl_never_gets_worse() {
        let params = test_params(2);
        let problem = ParamProblem(&params);
        let mesh = GMesh::new(&params.granularity_or_zero());
        let cache: Arc<dyn Cache + Send + Sync> = Arc::new(SimpleCache::new(1e-9));
        let barrier: Arc<dyn Barrier + Send + Sync> = Arc::new(ProgressiveBarrier::new(0.0));
        let evaluator: Arc<dyn crate::evaluator::Evaluator> =
            Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2) + p[1].value_or(0.0).powi(2), vec![]))));
        let control = EvaluatorControl::new(evaluator, Arc::clone(&cache), Arc::clone(&barrier), LexicographicPriority, 1, 1, None, false);
        let mut order = 0u64;

        let simplex = vec![point_with_f(5.0, 5.0, 50.0), point_with_f(7.0, 5.0, 74.0), point_with_f(5.0, 7.0, 74.0)];
        let worst_f = simplex.iter().map(|ep| ep.f().value_or(0.0)).fold(f64::MIN, f64::max);

        let (result, _) = generate(simplex, 20, &problem, &mesh, &cache, &barrier, &control, &mut order);
        if let Some(p) = result {
            let f = p.coords().iter().map(|c| c.value_or(0.0).powi(2)).sum::<f64>();
            assert!(f < worst_f);
        }
    }

    #[test]
    fn propose_reflects_the_worst_vertex_away_from_the_centroid() {
        let simplex = vec![Point::from_f64(&[0.0]), Point::from_f64(&[1.0]), Point::from_f64(&[10.0])];
        let reflected = propose(&simplex, 1.0).unwrap();
        assert!(reflected[0].value_or(0.0) < 0.5);
    }
}
