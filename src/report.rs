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

//! The run report returned at termination: what stopped the run, how many
//! blackbox evaluations it cost, and the best feasible/infeasible points
//! found. Logged once at `info` level and also handed back to the caller,
//! the way the engine's step framework logs every smaller transition.

use std::time::Duration;

use tracing::info;

use crate::eval::EvalPoint;
use crate::step::BaseStopType;

#[derive(Clone, Debug)]
pub struct RunReport {
    pub stop_reason: BaseStopType,
    pub bb_eval: usize,
    /// Surrogate evaluations spent (the Sgtelib regressor itself is an
    /// external collaborator this crate never calls, so this is always `0`
    /// until a caller wires one in through a future `Evaluator` impl).
    pub sgte_eval: usize,
    pub mega_iterations: usize,
    pub elapsed: Duration,
    pub best_feasible: Option<EvalPoint>,
    pub best_infeasible: Option<EvalPoint>,
}

impl RunReport {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stop_reason: BaseStopType,
        bb_eval: usize,
        sgte_eval: usize,
        mega_iterations: usize,
        elapsed: Duration,
        best_feasible: Option<EvalPoint>,
        best_infeasible: Option<EvalPoint>,
    ) -> Self {
        let report = RunReport { stop_reason, bb_eval, sgte_eval, mega_iterations, elapsed, best_feasible, best_infeasible };
        info!(
            stop_reason = ?report.stop_reason,
            bb_eval = report.bb_eval,
            sgte_eval = report.sgte_eval,
            mega_iterations = report.mega_iterations,
            elapsed_ms = report.elapsed.as_millis() as u64,
            best_f = ?report.best_feasible.as_ref().map(EvalPoint::f),
            best_h = ?report.best_infeasible.as_ref().map(EvalPoint::h),
            "run terminated"
        );
        report
    }

    /// Whether the run found at least one feasible point — the usual
    /// "did this succeed" question a caller actually wants answered.
    pub fn has_feasible_solution(&self) -> bool {
        self.best_feasible.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point;
    use crate::step::MadsStopType;

    #[test]
    fn a_report_with_a_feasible_point_reports_success() {
        let report = RunReport::new(
            BaseStopType::Mads(MadsStopType::MinMeshSizeReached),
            10,
            0,
            3,
            Duration::from_millis(5),
            Some(EvalPoint::new(Point::from_f64(&[0.0]))),
            None,
        );
        assert!(report.has_feasible_solution());
    }

    #[test]
    fn a_report_without_a_feasible_point_reports_failure() {
        let report =
            RunReport::new(BaseStopType::Mads(MadsStopType::MinMeshSizeReached), 10, 0, 3, Duration::from_millis(5), None, None);
        assert!(!report.has_feasible_solution());
    }
}
