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

//! A single MADS iteration: run the enabled search methods, and if none of
//! them (opportunistically) succeeds, fall back to polling the frame
//! center's positive basis.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::algos::search::{nelder_mead, quad_model, speculative, vns};
use crate::algos::{poll, submit_candidates};
use crate::barrier::{Barrier, SuccessType};
use crate::eval::{Cache, EvalPoint};
use crate::evaluator::{ControlStats, EvaluatorControl};
use crate::math::{Direction, Point};
use crate::mesh::GMesh;
use crate::params::Parameters;
use crate::problem::Problem;
use crate::queue::LexicographicPriority;
use crate::step::{EvalStopType, IterStopType, Step, StepStatus};

pub struct MadsIteration<'a> {
    problem: &'a dyn Problem,
    params: &'a Parameters,
    mesh: &'a mut GMesh,
    cache: &'a Arc<dyn Cache + Send + Sync>,
    barrier: &'a Arc<dyn Barrier + Send + Sync>,
    control: &'a EvaluatorControl<LexicographicPriority>,
    frame_center: EvalPoint,
    order: u64,
    vns_level: usize,
    last_success_direction: Option<Direction>,
    outcome: Option<IterStopType>,
}

impl<'a> MadsIteration<'a> {
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
        vns_level: usize,
        last_success_direction: Option<Direction>,
    ) -> Self {
        MadsIteration { problem, params, mesh, cache, barrier, control, frame_center, order, vns_level, last_success_direction, outcome: None }
    }

    pub fn outcome(&self) -> Option<IterStopType> {
        self.outcome
    }

    pub fn order(&self) -> u64 {
        self.order
    }

    pub fn last_success_direction(&self) -> Option<&Direction> {
        self.last_success_direction.as_ref()
    }

    /// Every trial point this iteration would submit — search points plus
    /// the poll's positive basis — without submitting or evaluating any of
    /// them. Used by the mega-iteration's `GENERATE_ALL_POINTS_BEFORE_EVAL`
    /// mode to pool candidates from several frame centers into one batch
    /// before any of them is evaluated.
    pub fn candidate_points(&self) -> Vec<(Point, Option<Direction>)> {
        let mut points: Vec<(Point, Option<Direction>)> =
            self.generate_search_points_no_eval().into_iter().map(|p| (p, None)).collect();
        let n = self.problem.dimension();
        let dirs = poll::seeded_basis(n, self.params.direction_type, self.order);
        let frame = self.mesh.frame_size();
        points.extend(dirs.iter().map(|d| (d.apply(&self.frame_center.point, &frame), Some(d.clone()))));
        points
    }

    /// The n+1 best feasible cached points nearest the frame center, sorted
    /// best-to-worst, used to seed the Nelder-Mead simplex.
    fn nm_simplex(&self) -> Vec<EvalPoint> {
        let mut feasible: Vec<EvalPoint> = self.cache.all().into_iter().filter(EvalPoint::is_feasible).collect();
        feasible.sort_by(|a, b| a.f().partial_cmp(&b.f()).unwrap_or(std::cmp::Ordering::Equal));
        feasible.truncate(self.problem.dimension() + 1);
        feasible
    }

    /// Search points common to both call sites: the quadratic model and the
    /// speculative step never submit or evaluate anything themselves, so
    /// both `run_search` (which may evaluate VNS's and Nelder-Mead's moves
    /// immediately) and `candidate_points` (which must not evaluate
    /// anything before the batch is pooled) share this.
    fn generate_stateless_search_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        if self.params.quad_model_search {
            let (found, stop) = quad_model::generate(&self.frame_center, &self.cache.all());
            trace!(order = self.order, stop = ?stop, "quadratic model search stopped");
            if let Some(p) = found {
                points.push(p);
            }
        }
        if self.params.speculative_search {
            if let Some(dir) = &self.last_success_direction {
                points.push(speculative::generate(&self.frame_center.point, &*self.mesh, dir));
            }
        }
        points
    }

    /// Used by `GENERATE_ALL_POINTS_BEFORE_EVAL` batch mode: VNS and
    /// Nelder-Mead each contribute only their first raw (projected,
    /// bounds-checked) move rather than running their full descent/simplex
    /// loop, since both loops evaluate as they decide their next move.
    fn generate_search_points_no_eval(&self) -> Vec<Point> {
        let mut points = self.generate_stateless_search_points();
        if self.params.nm_search {
            let simplex: Vec<Point> = self.nm_simplex().into_iter().map(|ep| ep.point).collect();
            if let Some(p) = nelder_mead::propose(&simplex, 1.0) {
                points.push(p);
            }
        }
        if self.params.vns_search {
            if let Some(p) = vns::propose(&self.frame_center.point, &*self.mesh, self.vns_level.max(1), self.order, self.problem) {
                points.push(p);
            }
        }
        points
    }

    fn generate_search_points(&mut self) -> Vec<Point> {
        let mut points = self.generate_stateless_search_points();
        if self.params.nm_search {
            let simplex = self.nm_simplex();
            let (found, stop) =
                nelder_mead::generate(simplex, 20, self.problem, &*self.mesh, self.cache, self.barrier, self.control, &mut self.order);
            trace!(order = self.order, stop = ?stop, "nelder-mead search stopped");
            if let Some(p) = found {
                points.push(p);
            }
        }
        if self.params.vns_search {
            let level = self.vns_level.max(1);
            let seed = self.order;
            let mut order = self.order;
            let found = vns::generate(
                &self.frame_center.point,
                &*self.mesh,
                level,
                seed,
                self.problem,
                self.params,
                self.cache,
                self.barrier,
                self.control,
                &mut order,
            );
            self.order = order;
            if let Some(p) = found {
                points.push(p);
            }
        }
        points
    }

    fn run_search(&mut self) -> ControlStats {
        let points: Vec<(Point, Option<Direction>)> = self.generate_search_points().into_iter().map(|p| (p, None)).collect();
        submit_candidates(points, self.problem, &*self.mesh, self.cache, self.control, &mut self.order, self.last_success_direction.as_ref());
        self.control.run()
    }

    fn run_poll(&mut self) -> ControlStats {
        let n = self.problem.dimension();
        let dirs = poll::seeded_basis(n, self.params.direction_type, self.order);
        let frame = self.mesh.frame_size();
        let poll_points: Vec<(Direction, Point)> =
            dirs.into_iter().map(|d| { let p = d.apply(&self.frame_center.point, &frame); (d, p) }).collect();
        let submitted = submit_candidates(
            poll_points.iter().map(|(d, p)| (p.clone(), Some(d.clone()))).collect(),
            self.problem,
            &*self.mesh,
            self.cache,
            self.control,
            &mut self.order,
            self.last_success_direction.as_ref(),
        );
        let stats = self.control.run();
        if stats.best_success != SuccessType::Unsuccessful {
            self.record_successful_direction(&poll_points, &submitted);
        }
        stats
    }

    /// If one of the poll points we submitted is now the barrier's best
    /// feasible or infeasible incumbent, remembers its direction for the
    /// next iteration's speculative search.
    fn record_successful_direction(&mut self, poll_points: &[(Direction, Point)], submitted: &[EvalPoint]) {
        let winner_tag = self
            .barrier
            .best_feasible()
            .map(|ep| ep.tag)
            .or_else(|| self.barrier.best_infeasible().map(|ep| ep.tag));
        let Some(winner_tag) = winner_tag else { return };
        for (submitted_ep, (dir, _)) in submitted.iter().zip(poll_points.iter()) {
            if submitted_ep.tag == winner_tag {
                self.last_success_direction = Some(dir.clone());
                return;
            }
            if let Some(found) = self.cache.find(&submitted_ep.point) {
                if found.tag == winner_tag {
                    self.last_success_direction = Some(dir.clone());
                    return;
                }
            }
        }
    }

    fn update_mesh(&mut self, success: SuccessType) {
        match success {
            SuccessType::FullSuccess => {
                let dir = self.last_success_direction.clone();
                self.mesh.enlarge(dir.as_ref(), self.params.anisotropy_factor, self.params.anisotropic_mesh);
            }
            SuccessType::Unsuccessful => self.mesh.refine(),
            SuccessType::PartialSuccess => {}
        }
    }
}

impl<'a> Step for MadsIteration<'a> {
    fn start(&mut self) {
        trace!(order = self.order, "starting mads iteration");
    }

    fn run(&mut self) -> StepStatus {
        let search_stats = if self.params.quad_model_search || self.params.nm_search || self.params.vns_search || self.params.speculative_search {
            self.run_search()
        } else {
            ControlStats { bb_eval: 0, stop_reason: None, best_success: SuccessType::Unsuccessful }
        };

        if let Some(EvalStopType::MaxBbEvalReached) = search_stats.stop_reason {
            self.outcome = Some(IterStopType::Eval(EvalStopType::MaxBbEvalReached));
            return StepStatus::Stopped;
        }

        let opportunistic_search_success = self.params.opportunistic_eval && search_stats.best_success != SuccessType::Unsuccessful;

        let overall_success = if opportunistic_search_success {
            search_stats.best_success
        } else {
            let poll_stats = self.run_poll();
            if let Some(EvalStopType::MaxBbEvalReached) = poll_stats.stop_reason {
                self.outcome = Some(IterStopType::Eval(EvalStopType::MaxBbEvalReached));
                return StepStatus::Stopped;
            }
            search_stats.best_success.best(poll_stats.best_success)
        };

        self.update_mesh(overall_success);
        self.outcome = Some(match overall_success {
            SuccessType::FullSuccess => IterStopType::FullSuccess,
            SuccessType::PartialSuccess => IterStopType::PartialSuccess,
            SuccessType::Unsuccessful => IterStopType::Unsuccessful,
        });
        debug!(order = self.order, outcome = ?self.outcome, "mads iteration complete");
        StepStatus::Completed
    }
}
