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

//! Mega-iteration: repeats [`MadsIteration`] around up to `max_x_feas +
//! max_x_inf` frame centers drawn from the barrier's current incumbents,
//! escalating the VNS neighborhood level after a cycle where none of them
//! improves, until one of them improves, the mesh collapses to its finest
//! resolution, or an evaluation budget fires.
//!
//! Two ways to spend a cycle across several centers are supported. The
//! default runs each center's full search-then-poll to completion before
//! moving to the next, stopping at the first success (matching the single
//! best-incumbent case when only one center is offered). Setting
//! `generate_all_points_before_eval` instead pools every center's search and
//! poll trial points into one batch and evaluates them together
//! (`GENERATE_ALL_POINTS_BEFORE_EVAL`), which changes dispatch order and
//! opportunistic early-stop behavior but not which points are ultimately
//! considered.

use std::sync::Arc;

use tracing::{debug, info};

use crate::algos::iteration::MadsIteration;
use crate::algos::submit_candidates;
use crate::barrier::{Barrier, SuccessType};
use crate::eval::{Cache, EvalPoint};
use crate::evaluator::EvaluatorControl;
use crate::math::Direction;
use crate::mesh::GMesh;
use crate::params::Parameters;
use crate::problem::Problem;
use crate::queue::LexicographicPriority;
use crate::step::{EvalStopType, IterStopType, MadsStopType, Step, StepStatus};

/// Cap on how large the VNS shake neighborhood is allowed to grow within one
/// mega-iteration; the mesh's own `check_stopping` check, not this cap, is
/// what actually ends an unproductive mega-iteration.
const MAX_VNS_LEVEL: usize = 32;

pub struct MadsMegaIteration<'a> {
    problem: &'a dyn Problem,
    params: &'a Parameters,
    mesh: &'a mut GMesh,
    cache: &'a Arc<dyn Cache + Send + Sync>,
    barrier: &'a Arc<dyn Barrier + Send + Sync>,
    control: &'a EvaluatorControl<LexicographicPriority>,
    frame_center: EvalPoint,
    order: u64,
    index: usize,
    last_success_direction: Option<Direction>,
    outcome: Option<MadsStopType>,
}

impl<'a> MadsMegaIteration<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        problem: &'a dyn Problem,
        params: &'a Parameters,
        mesh: &'a mut GMesh,
        cache: &'a Arc<dyn Cache + Send + Sync>,
        barrier: &'a Arc<dyn Barrier + Send + Sync>,
        control: &'a EvaluatorControl<LexicographicPriority>,
        frame_center: EvalPoint,
        order: u64,
        index: usize,
    ) -> Self {
        MadsMegaIteration {
            problem,
            params,
            mesh,
            cache,
            barrier,
            control,
            frame_center,
            order,
            index,
            last_success_direction: None,
            outcome: None,
        }
    }

    /// Set once this mega-iteration stops the whole run rather than simply
    /// handing an improved center back to the algorithm.
    pub fn outcome(&self) -> Option<MadsStopType> {
        self.outcome
    }

    pub fn order(&self) -> u64 {
        self.order
    }

    /// Up to `max_x_feas` feasible and `max_x_inf` infeasible incumbents,
    /// falling back to the last frame center handed to this mega-iteration
    /// if the barrier does not yet hold anything (the very first call).
    fn collect_frame_centers(&self) -> Vec<EvalPoint> {
        let mut centers = self.barrier.feasible_incumbents(self.params.max_x_feas.max(1));
        centers.extend(self.barrier.infeasible_incumbents(self.params.max_x_inf.max(1)));
        if centers.is_empty() {
            centers.push(self.frame_center.clone());
        }
        centers
    }

    /// Runs each center's full search-then-poll in turn, stopping at the
    /// first one that improves rather than spending budget on the rest.
    fn run_sequential_cycle(&mut self, centers: &[EvalPoint], vns_level: usize) -> Result<SuccessType, EvalStopType> {
        let mut overall = SuccessType::Unsuccessful;
        for center in centers {
            let mut it = MadsIteration::new(
                self.problem,
                self.params,
                self.mesh,
                self.cache,
                self.barrier,
                self.control,
                center.clone(),
                self.order,
                vns_level,
                self.last_success_direction.clone(),
            );
            it.execute();
            self.order = it.order();
            if let Some(dir) = it.last_success_direction() {
                self.last_success_direction = Some(dir.clone());
            }
            match it.outcome() {
                Some(IterStopType::Eval(reason)) => return Err(reason),
                Some(IterStopType::FullSuccess) => return Ok(SuccessType::FullSuccess),
                Some(IterStopType::PartialSuccess) => overall = overall.best(SuccessType::PartialSuccess),
                _ => {}
            }
        }
        Ok(overall)
    }

    /// `GENERATE_ALL_POINTS_BEFORE_EVAL`: pools every center's search and
    /// poll candidates into a single batch and evaluates them together,
    /// rather than exhausting one center before generating the next one's
    /// points.
    fn run_batch_cycle(&mut self, centers: &[EvalPoint], vns_level: usize) -> Result<SuccessType, EvalStopType> {
        let mut points = Vec::new();
        for center in centers {
            let it = MadsIteration::new(
                self.problem,
                self.params,
                self.mesh,
                self.cache,
                self.barrier,
                self.control,
                center.clone(),
                self.order,
                vns_level,
                self.last_success_direction.clone(),
            );
            points.extend(it.candidate_points());
        }
        submit_candidates(points, self.problem, &*self.mesh, self.cache, self.control, &mut self.order, self.last_success_direction.as_ref());
        let stats = self.control.run();
        if let Some(EvalStopType::MaxBbEvalReached) = stats.stop_reason {
            return Err(EvalStopType::MaxBbEvalReached);
        }
        Ok(stats.best_success)
    }
}

impl<'a> Step for MadsMegaIteration<'a> {
    fn start(&mut self) {
        debug!(index = self.index, frame_center = %self.frame_center.point, "starting mega iteration");
    }

    fn run(&mut self) -> StepStatus {
        let mut vns_level = 1usize;
        let mut last_was_failure = false;
        loop {
            if self.mesh.check_stopping(last_was_failure) {
                self.outcome = Some(MadsStopType::MinMeshSizeReached);
                return StepStatus::Stopped;
            }

            let centers = self.collect_frame_centers();
            let cycle_result = if self.params.generate_all_points_before_eval {
                self.run_batch_cycle(&centers, vns_level)
            } else {
                self.run_sequential_cycle(&centers, vns_level)
            };

            let success = match cycle_result {
                Err(reason) => {
                    self.outcome = Some(MadsStopType::from(reason));
                    return StepStatus::Stopped;
                }
                Ok(success) => success,
            };

            self.barrier.update_h_max_after_iteration();

            if success != SuccessType::Unsuccessful {
                if let Some(best) = self.barrier.best_feasible().or_else(|| self.barrier.best_infeasible()) {
                    self.frame_center = best;
                }
                info!(index = self.index, order = self.order, "mega iteration improved the incumbent");
                return StepStatus::Completed;
            }
            last_was_failure = true;
            vns_level = (vns_level + 1).min(MAX_VNS_LEVEL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrier::ProgressiveBarrier;
    use crate::eval::{Eval, EvalType, SimpleCache};
    use crate::evaluator::{CallbackEvaluator, Evaluator};
    use crate::math::Point;
    use crate::params::DirectionType;
    use crate::problem::ParamProblem;

    fn params() -> Parameters {
        Parameters {
            dimension: 1,
            x0: vec![10.0],
            lower_bound: vec![None],
            upper_bound: vec![None],
            granularity: vec![],
            max_bb_eval: None,
            nb_threads_parallel_eval: 1,
            direction_type: DirectionType::OrthoNPlus1,
            opportunistic_eval: false,
            bb_max_block_size: 1,
            h_max_0: 0.0,
            quad_model_search: false,
            nm_search: false,
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
    fn a_mega_iteration_drives_the_center_toward_the_minimizer() {
        let params = params();
        let problem = ParamProblem(&params);
        let mut mesh = GMesh::new(&params.granularity_or_zero());
        let cache: Arc<dyn Cache + Send + Sync> = Arc::new(SimpleCache::new(1e-9));
        let barrier: Arc<dyn Barrier + Send + Sync> = Arc::new(ProgressiveBarrier::new(0.0));
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let control = EvaluatorControl::new(evaluator, Arc::clone(&cache), Arc::clone(&barrier), LexicographicPriority, 1, 1, None, false);

        let mut center = EvalPoint::new(problem.x0());
        center.set_eval(Eval::ok(EvalType::BbEval, 100.0, vec![]));
        cache.smart_insert(center.clone());
        barrier.consider(center.clone());

        let mut mega = MadsMegaIteration::new(&problem, &params, &mut mesh, &cache, &barrier, &control, center, 0, 1);
        let status = mega.execute();
        assert_eq!(status, StepStatus::Completed);
        assert!(mega.outcome().is_none());
        let best = barrier.best_feasible().unwrap();
        assert!(best.f().value_or(f64::INFINITY) < 100.0);
    }

    #[test]
    fn a_mega_iteration_stops_once_the_mesh_is_finest() {
        let params = params();
        let problem = ParamProblem(&params);
        let mut mesh = GMesh::new(&params.granularity_or_zero());
        for _ in 0..200 {
            mesh.refine();
        }
        let cache: Arc<dyn Cache + Send + Sync> = Arc::new(SimpleCache::new(1e-9));
        let barrier: Arc<dyn Barrier + Send + Sync> = Arc::new(ProgressiveBarrier::new(0.0));
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let control = EvaluatorControl::new(evaluator, Arc::clone(&cache), Arc::clone(&barrier), LexicographicPriority, 1, 1, None, false);

        let center = EvalPoint::new(problem.x0());
        let mut mega = MadsMegaIteration::new(&problem, &params, &mut mesh, &cache, &barrier, &control, center, 0, 1);
        let status = mega.execute();
        assert_eq!(status, StepStatus::Stopped);
        assert_eq!(mega.outcome(), Some(MadsStopType::MinMeshSizeReached));
    }

    #[test]
    fn a_wider_frame_center_cap_still_converges() {
        let mut params = params();
        params.max_x_feas = 3;
        params.max_x_inf = 2;
        let problem = ParamProblem(&params);
        let mut mesh = GMesh::new(&params.granularity_or_zero());
        let cache: Arc<dyn Cache + Send + Sync> = Arc::new(SimpleCache::new(1e-9));
        let barrier: Arc<dyn Barrier + Send + Sync> = Arc::new(ProgressiveBarrier::new(0.0));
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let control = EvaluatorControl::new(evaluator, Arc::clone(&cache), Arc::clone(&barrier), LexicographicPriority, 1, 1, None, false);

        let mut center = EvalPoint::new(problem.x0());
        center.set_eval(Eval::ok(EvalType::BbEval, 100.0, vec![]));
        cache.smart_insert(center.clone());
        barrier.consider(center.clone());

        let mut mega = MadsMegaIteration::new(&problem, &params, &mut mesh, &cache, &barrier, &control, center, 0, 1);
        let status = mega.execute();
        assert_eq!(status, StepStatus::Completed);
        let best = barrier.best_feasible().unwrap();
        assert!(best.f().value_or(f64::INFINITY) < 100.0);
    }

    #[test]
    fn batch_mode_still_drives_the_center_toward_the_minimizer() {
        let mut params = params();
        params.generate_all_points_before_eval = true;
        let problem = ParamProblem(&params);
        let mut mesh = GMesh::new(&params.granularity_or_zero());
        let cache: Arc<dyn Cache + Send + Sync> = Arc::new(SimpleCache::new(1e-9));
        let barrier: Arc<dyn Barrier + Send + Sync> = Arc::new(ProgressiveBarrier::new(0.0));
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let control = EvaluatorControl::new(evaluator, Arc::clone(&cache), Arc::clone(&barrier), LexicographicPriority, 1, 1, None, false);

        let mut center = EvalPoint::new(problem.x0());
        center.set_eval(Eval::ok(EvalType::BbEval, 100.0, vec![]));
        cache.smart_insert(center.clone());
        barrier.consider(center.clone());

        let mut mega = MadsMegaIteration::new(&problem, &params, &mut mesh, &cache, &barrier, &control, center, 0, 1);
        let status = mega.execute();
        assert_eq!(status, StepStatus::Completed);
        let best = barrier.best_feasible().unwrap();
        assert!(best.f().value_or(f64::INFINITY) < 100.0);
    }
}
