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

//! The evaluator worker pool.
//!
//! Grounded directly on the teacher's `ParallelSolver`: a priority queue and
//! a handful of counters live behind one `Mutex`, workers park on a
//! `Condvar` when the queue is temporarily empty, and `std::thread::scope`
//! spawns a fixed number of them to drain it. Where the teacher's workers
//! pop one search-tree node and expand it, these pop a *block* of trial
//! points and hand it to the [`Evaluator`] in one call, then fold the
//! results back into the cache and barrier before looping.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use crate::barrier::{Barrier, SuccessType};
use crate::eval::{Cache, EvalType};
use crate::evaluator::Evaluator;
use crate::params::ConstraintKind;
use crate::queue::{ComparePriority, EvalQueuePoint, EvaluationQueue};
use crate::step::EvalStopType;

#[derive(Clone, Copy, Debug)]
pub struct ControlStats {
    pub bb_eval: usize,
    pub stop_reason: Option<EvalStopType>,
    pub best_success: SuccessType,
}

struct Critical<P: ComparePriority> {
    queue: EvaluationQueue<P>,
    in_flight: usize,
    stop_reason: Option<EvalStopType>,
    best_success: SuccessType,
}

enum WorkLoad {
    Block(Vec<EvalQueuePoint>),
    Done,
}

pub struct EvaluatorControl<P: ComparePriority> {
    evaluator: Arc<dyn Evaluator>,
    cache: Arc<dyn Cache + Send + Sync>,
    barrier: Arc<dyn Barrier + Send + Sync>,
    nb_threads: usize,
    block_size: usize,
    max_bb_eval: Option<usize>,
    opportunistic: bool,
    constraint_kinds: Vec<ConstraintKind>,
    bb_eval_count: AtomicUsize,
    critical: Mutex<Critical<P>>,
    monitor: Condvar,
}

impl<P: ComparePriority + Send> EvaluatorControl<P> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        evaluator: Arc<dyn Evaluator>,
        cache: Arc<dyn Cache + Send + Sync>,
        barrier: Arc<dyn Barrier + Send + Sync>,
        priority: P,
        nb_threads: usize,
        block_size: usize,
        max_bb_eval: Option<usize>,
        opportunistic: bool,
    ) -> Self {
        Self::with_constraint_kinds(evaluator, cache, barrier, priority, nb_threads, block_size, max_bb_eval, opportunistic, Vec::new())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_constraint_kinds(
        evaluator: Arc<dyn Evaluator>,
        cache: Arc<dyn Cache + Send + Sync>,
        barrier: Arc<dyn Barrier + Send + Sync>,
        priority: P,
        nb_threads: usize,
        block_size: usize,
        max_bb_eval: Option<usize>,
        opportunistic: bool,
        constraint_kinds: Vec<ConstraintKind>,
    ) -> Self {
        EvaluatorControl {
            evaluator,
            cache,
            barrier,
            nb_threads: nb_threads.max(1),
            block_size: block_size.max(1),
            max_bb_eval,
            opportunistic,
            constraint_kinds,
            bb_eval_count: AtomicUsize::new(0),
            critical: Mutex::new(Critical {
                queue: EvaluationQueue::new(priority),
                in_flight: 0,
                stop_reason: None,
                best_success: SuccessType::Unsuccessful,
            }),
            monitor: Condvar::new(),
        }
    }

    pub fn bb_eval_count(&self) -> usize {
        self.bb_eval_count.load(Ordering::Relaxed)
    }

    /// Enqueues points for evaluation. Callers are expected to have already
    /// claimed each point via [`Cache::smart_insert`] so that a point
    /// generated by two different search methods in the same iteration is
    /// only ever evaluated once.
    pub fn submit(&self, points: Vec<EvalQueuePoint>) {
        let mut critical = self.critical.lock();
        for p in points {
            critical.queue.push(p);
        }
        self.monitor.notify_all();
    }

    pub fn clear_queue(&self) {
        self.critical.lock().queue.clear();
    }

    fn get_workload(&self) -> WorkLoad {
        let mut critical = self.critical.lock();
        loop {
            if let Some(max) = self.max_bb_eval {
                if critical.stop_reason.is_none() && self.bb_eval_count.load(Ordering::Relaxed) >= max {
                    critical.stop_reason = Some(EvalStopType::MaxBbEvalReached);
                }
            }
            if critical.stop_reason.is_none() && !critical.queue.is_empty() {
                let block = critical.queue.pop_block(self.block_size);
                critical.in_flight += 1;
                return WorkLoad::Block(block);
            }
            if critical.in_flight == 0 {
                return WorkLoad::Done;
            }
            // Either stopped or the queue is temporarily empty with other
            // workers still finishing their blocks: park until the next
            // `process_block` notifies us.
            self.monitor.wait(&mut critical);
        }
    }

    fn process_block(&self, block: Vec<EvalQueuePoint>) {
        let points: Vec<_> = block.iter().map(|q| q.eval_point.point.clone()).collect();
        let mut evals = self.evaluator.eval_block(&points, EvalType::BbEval);
        for eval in &mut evals {
            eval.recompute_h(&self.constraint_kinds);
        }
        self.bb_eval_count.fetch_add(evals.len(), Ordering::Relaxed);

        let mut block_success = SuccessType::Unsuccessful;
        for (queued, eval) in block.into_iter().zip(evals.into_iter()) {
            let mut ep = queued.eval_point;
            self.cache.update(&ep.point, eval.clone());
            ep.set_eval(eval);
            let success = self.barrier.consider(ep);
            block_success = block_success.best(success);
        }

        let mut critical = self.critical.lock();
        critical.in_flight -= 1;
        critical.best_success = critical.best_success.best(block_success);
        let improved_this_block = block_success != SuccessType::Unsuccessful;
        if self.opportunistic && improved_this_block && critical.stop_reason.is_none() {
            debug!("opportunistic success, discarding remaining queued trial points");
            critical.queue.clear();
            critical.stop_reason = Some(EvalStopType::OpportunisticSuccess);
        }
        self.monitor.notify_all();
    }

    /// Drains the queue, dispatching blocks to `nb_threads` workers until it
    /// is empty (or a budget/opportunistic stop fires), and returns the
    /// resulting stop reason.
    pub fn run(&self) -> ControlStats
    where
        P: Sync,
    {
        std::thread::scope(|scope| {
            for _ in 0..self.nb_threads {
                scope.spawn(|| loop {
                    match self.get_workload() {
                        WorkLoad::Done => break,
                        WorkLoad::Block(block) => self.process_block(block),
                    }
                });
            }
        });

        let mut critical = self.critical.lock();
        let stop_reason = *critical.stop_reason.get_or_insert(EvalStopType::EvalQueueEmpty);
        let stats = ControlStats { bb_eval: self.bb_eval_count(), stop_reason: Some(stop_reason), best_success: critical.best_success };
        info!(bb_eval = stats.bb_eval, stop_reason = ?stats.stop_reason, best_success = ?stats.best_success, "evaluator control drained the queue");
        // Reset for the next mega-iteration's dispatch.
        critical.stop_reason = None;
        critical.best_success = SuccessType::Unsuccessful;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrier::ProgressiveBarrier;
    use crate::eval::{EvalPoint, SimpleCache};
    use crate::evaluator::CallbackEvaluator;
    use crate::math::Point;
    use crate::queue::LexicographicPriority;

    fn make_control(max_bb_eval: Option<usize>, nb_threads: usize) -> EvaluatorControl<LexicographicPriority> {
        let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![]))));
        let cache: Arc<dyn Cache + Send + Sync> = Arc::new(SimpleCache::new(1e-9));
        let barrier: Arc<dyn Barrier + Send + Sync> = Arc::new(ProgressiveBarrier::new(0.0));
        EvaluatorControl::new(evaluator, cache, barrier, LexicographicPriority, nb_threads, 1, max_bb_eval, false)
    }

    fn queued(x: f64, order: u64) -> EvalQueuePoint {
        EvalQueuePoint { eval_point: EvalPoint::new(Point::from_f64(&[x])), generation_order: order, is_last_success_direction: false, direction: None }
    }

    #[test]
    fn draining_an_empty_queue_reports_queue_empty() {
        let control = make_control(None, 1);
        let stats = control.run();
        assert_eq!(stats.bb_eval, 0);
        assert_eq!(stats.stop_reason, Some(EvalStopType::EvalQueueEmpty));
    }

    #[test]
    fn every_submitted_point_is_evaluated_exactly_once() {
        let control = make_control(None, 2);
        control.submit(vec![queued(1.0, 1), queued(2.0, 2), queued(3.0, 3)]);
        let stats = control.run();
        assert_eq!(stats.bb_eval, 3);
    }

    #[test]
    fn a_budget_stops_the_run_before_the_queue_is_fully_drained() {
        let control = make_control(Some(2), 1);
        control.submit((0..10).map(|i| queued(i as f64, i)).collect());
        let stats = control.run();
        assert!(stats.bb_eval >= 2);
        assert_eq!(stats.stop_reason, Some(EvalStopType::MaxBbEvalReached));
    }

    #[test]
    fn an_eb_constraint_rejects_the_point_outright() {
        let evaluator: Arc<dyn Evaluator> =
            Arc::new(CallbackEvaluator::new(|p: &Point| Some((p[0].value_or(0.0).powi(2), vec![1.0]))));
        let cache: Arc<dyn Cache + Send + Sync> = Arc::new(SimpleCache::new(1e-9));
        let barrier: Arc<dyn Barrier + Send + Sync> = Arc::new(ProgressiveBarrier::new(f64::INFINITY));
        let control = EvaluatorControl::with_constraint_kinds(
            evaluator,
            Arc::clone(&cache),
            Arc::clone(&barrier),
            LexicographicPriority,
            1,
            1,
            None,
            false,
            vec![ConstraintKind::Eb],
        );
        control.submit(vec![queued(1.0, 1)]);
        control.run();
        assert!(barrier.best_feasible().is_none());
        assert!(barrier.best_infeasible().unwrap().h().value_or(0.0).is_infinite());
    }
}
