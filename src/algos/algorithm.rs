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

//! The top-level entry point: owns the mesh, cache, barrier and evaluator
//! control for one run, and drives the mega-iteration loop until a
//! [`BaseStopType`] fires.

use std::sync::Arc;

use crate::algos::mega_iteration::MadsMegaIteration;
use crate::algos::search::latin_hypercube;
use crate::barrier::{Barrier, ProgressiveBarrier};
use crate::error::{NomadError, Result};
use crate::eval::{Cache, EvalPoint, SimpleCache};
use crate::evaluator::{Evaluator, EvaluatorControl};
use crate::math::DEFAULT_EPSILON;
use crate::mesh::GMesh;
use crate::params::Parameters;
use crate::problem::{ParamProblem, Problem};
use crate::queue::{EvalQueuePoint, LexicographicPriority};
use crate::report::RunReport;
use crate::step::{BaseStopType, EvalStopType, MadsStopType, Step, StepStatus};

/// Owns every piece of run state that used to be threaded through the
/// teacher's `ParallelSolver` by hand: the mesh, the shared cache and
/// barrier, and the evaluator's worker pool.
pub struct Algorithm {
    params: Parameters,
    mesh: GMesh,
    cache: Arc<dyn Cache + Send + Sync>,
    barrier: Arc<dyn Barrier + Send + Sync>,
    control: EvaluatorControl<LexicographicPriority>,
    order: u64,
    mega_iterations: usize,
}

impl Algorithm {
    pub fn new(mut params: Parameters, evaluator: Arc<dyn Evaluator>) -> Result<Self> {
        if params.x0.is_empty() {
            params.x0 = Self::synthesize_x0(&params)?;
        }
        params.validate()?;
        let mesh = GMesh::new(&params.granularity_or_zero());
        let cache: Arc<dyn Cache + Send + Sync> = Arc::new(SimpleCache::new(DEFAULT_EPSILON));
        if let Some(path) = &params.cache_file {
            cache.load_from_file(path)?;
        }
        let barrier: Arc<dyn Barrier + Send + Sync> = Arc::new(ProgressiveBarrier::new(params.h_max_0));
        let control = EvaluatorControl::with_constraint_kinds(
            evaluator,
            Arc::clone(&cache),
            Arc::clone(&barrier),
            LexicographicPriority,
            params.nb_threads_parallel_eval,
            params.bb_max_block_size,
            params.max_bb_eval,
            params.opportunistic_eval,
            params.constraint_kinds.clone(),
        );
        Ok(Algorithm { params, mesh, cache, barrier, control, order: 0, mega_iterations: 0 })
    }

    /// Draws a single Latin Hypercube sample of the bounded box, used to
    /// synthesize `X0` when the caller did not provide one. Every variable
    /// must have both bounds set — there is no box to sample otherwise.
    fn synthesize_x0(params: &Parameters) -> Result<Vec<f64>> {
        if params.lower_bound.len() != params.dimension || params.upper_bound.len() != params.dimension {
            return Err(NomadError::InvalidParameter(format!(
                "lower_bound/upper_bound must have length {} to synthesize x0",
                params.dimension
            )));
        }
        let lower: Option<Vec<f64>> = params.lower_bound.iter().copied().collect();
        let upper: Option<Vec<f64>> = params.upper_bound.iter().copied().collect();
        let (lower, upper) = match (lower, upper) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => {
                return Err(NomadError::InvalidParameter(
                    "x0 was not given and cannot be synthesized: every variable needs both bounds set".into(),
                ))
            }
        };
        let sample = latin_hypercube::generate(&lower, &upper, 1, 0)
            .pop()
            .ok_or_else(|| NomadError::Internal("latin hypercube synthesis produced no point".into()))?;
        Ok(sample.coords().iter().map(|c| c.value_or(0.0)).collect())
    }

    /// Runs the solver to completion, returning the termination report.
    pub fn run(&mut self) -> RunReport {
        let started = std::time::Instant::now();
        let problem = ParamProblem(&self.params);
        let mut frame_center = EvalPoint::new(problem.x0());

        if self.cache.smart_insert(frame_center.clone()) {
            self.order += 1;
            self.control.submit(vec![EvalQueuePoint {
                eval_point: frame_center.clone(),
                generation_order: self.order,
                is_last_success_direction: false,
                direction: None,
            }]);
            let stats = self.control.run();
            if let Some(found) = self.cache.find(&frame_center.point) {
                frame_center = found;
            }
            self.barrier.consider(frame_center.clone());
            if let Some(reason @ EvalStopType::MaxBbEvalReached) = stats.stop_reason {
                return self.finish(BaseStopType::Mads(MadsStopType::Eval(reason)), started.elapsed());
            }
        } else if let Some(found) = self.cache.find(&frame_center.point) {
            frame_center = found;
        }

        let stop_reason = loop {
            self.mega_iterations += 1;
            let mut mega = MadsMegaIteration::new(
                &problem,
                &self.params,
                &mut self.mesh,
                &self.cache,
                &self.barrier,
                &self.control,
                frame_center.clone(),
                self.order,
                self.mega_iterations,
            );
            let status = mega.execute();
            self.order = mega.order();
            if let Some(best) = self.barrier.best_feasible().or_else(|| self.barrier.best_infeasible()) {
                frame_center = best;
            }
            if status == StepStatus::Stopped {
                break BaseStopType::Mads(mega.outcome().unwrap_or(MadsStopType::MinMeshSizeReached));
            }
        };

        self.finish(stop_reason, started.elapsed())
    }

    fn finish(&self, stop_reason: BaseStopType, elapsed: std::time::Duration) -> RunReport {
        if let Some(path) = &self.params.cache_file {
            if let Err(e) = self.cache.save_to_file(path) {
                tracing::warn!(error = %e, path, "failed to persist cache file");
            }
        }
        RunReport::new(
            stop_reason,
            self.control.bb_eval_count(),
            0,
            self.mega_iterations,
            elapsed,
            self.barrier.best_feasible(),
            self.barrier.best_infeasible(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::CallbackEvaluator;
    use crate::math::Point;
    use crate::params::DirectionType;

    fn params(x0: f64, max_bb_eval: Option<usize>) -> Parameters {
        Parameters {
            dimension: 1,
            x0: vec![x0],
            lower_bound: vec![None],
            upper_bound: vec![None],
            granularity: vec![],
            max_bb_eval,
            nb_threads_parallel_eval: 1,
            direction_type: DirectionType::OrthoNPlus1,
            opportunistic_eval: false,
            bb_max_block_size: 1,
            h_max_0: 0.0,
            quad_model_search: false,
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
    fn the_solver_drives_a_quadratic_bowl_to_its_minimum() {
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let mut algo = Algorithm::new(params(10.0, None), evaluator).unwrap();
        let report = algo.run();
        assert_eq!(report.stop_reason, BaseStopType::Mads(MadsStopType::MinMeshSizeReached));
        assert!(report.has_feasible_solution());
        assert!(report.best_feasible.unwrap().point[0].value_or(f64::INFINITY).abs() < 1e-2);
    }

    #[test]
    fn an_evaluation_budget_stops_the_run_early() {
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let mut algo = Algorithm::new(params(10.0, Some(5)), evaluator).unwrap();
        let report = algo.run();
        assert_eq!(report.stop_reason, BaseStopType::Mads(MadsStopType::Eval(EvalStopType::MaxBbEvalReached)));
        assert!(report.bb_eval >= 5);
    }

    #[test]
    fn an_empty_x0_is_synthesized_from_the_bounded_box() {
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let mut p = params(0.0, Some(10));
        p.x0 = Vec::new();
        p.lower_bound = vec![Some(-5.0)];
        p.upper_bound = vec![Some(5.0)];
        let algo = Algorithm::new(p, evaluator).unwrap();
        assert!(algo.params.x0[0] >= -5.0 && algo.params.x0[0] <= 5.0);
    }

    #[test]
    fn an_empty_x0_without_bounds_is_rejected() {
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let mut p = params(0.0, None);
        p.x0 = Vec::new();
        assert!(Algorithm::new(p, evaluator).is_err());
    }

    #[test]
    fn invalid_parameters_are_rejected_up_front() {
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let mut bad = params(0.0, None);
        bad.dimension = 0;
        assert!(Algorithm::new(bad, evaluator).is_err());
    }
}
