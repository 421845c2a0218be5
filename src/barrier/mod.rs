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

//! Progressive barrier: tracks the best feasible and infeasible points seen
//! so far and classifies each new evaluation against them.
//!
//! Modeled on the `Barrier` trait from the teacher's decision-diagram
//! solver (`must_explore`/`update_threshold`/`clear`), but the threshold it
//! tracks is NOMAD's scalar `h_max` rather than a per-state bound, and the
//! "explore or not" question becomes "did this point improve the barrier".

use parking_lot::Mutex;

use crate::eval::EvalPoint;
use crate::math::Double;

/// How a newly evaluated point compares to the current barrier state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuccessType {
    /// Strictly better than the best feasible (or infeasible) incumbent:
    /// the frame will expand.
    FullSuccess,
    /// Feasible but not better than the incumbent, or infeasible and
    /// improving `h` without improving `f`: a partial step.
    PartialSuccess,
    /// No improvement at all: the frame will shrink.
    Unsuccessful,
}

impl SuccessType {
    fn rank(self) -> u8 {
        match self {
            SuccessType::Unsuccessful => 0,
            SuccessType::PartialSuccess => 1,
            SuccessType::FullSuccess => 2,
        }
    }

    /// The better of two outcomes, full success beating partial beating
    /// none — used to fold the per-point classifications of a whole
    /// dispatched block into one verdict for the mesh update rule.
    pub fn best(self, other: SuccessType) -> SuccessType {
        if self.rank() >= other.rank() { self } else { other }
    }
}

pub trait Barrier {
    /// Inserts an evaluated point, returning how it compares to the
    /// incumbents and whether it was kept.
    fn consider(&self, point: EvalPoint) -> SuccessType;

    fn best_feasible(&self) -> Option<EvalPoint>;
    fn best_infeasible(&self) -> Option<EvalPoint>;
    /// Up to `max` feasible incumbents, best first, suitable as frame
    /// centers for the next mega-iteration.
    fn feasible_incumbents(&self, max: usize) -> Vec<EvalPoint>;
    /// Up to `max` infeasible incumbents with `h <= h_max`, best first.
    fn infeasible_incumbents(&self, max: usize) -> Vec<EvalPoint>;
    fn h_max(&self) -> Double;
    fn set_h_max(&self, h_max: Double);
    /// Tightens `h_max` to the worst `h` still carried by a current
    /// infeasible incumbent, called once a mega-iteration has finished
    /// considering its candidates. Never loosens `h_max`, and leaves it
    /// untouched when there is no infeasible incumbent to measure against.
    fn update_h_max_after_iteration(&self);
}

struct BarrierState {
    feasible: Vec<EvalPoint>,
    infeasible: Vec<EvalPoint>,
    h_max: Double,
}

/// The single production implementation: one incumbent list for feasible
/// points, one for infeasible points with `h <= h_max`, guarded by a single
/// lock (there is exactly one barrier per run, unlike the teacher's
/// per-layer threshold maps — nothing here is sharded by iteration depth).
pub struct ProgressiveBarrier {
    state: Mutex<BarrierState>,
}

impl ProgressiveBarrier {
    pub fn new(h_max_0: f64) -> Self {
        ProgressiveBarrier {
            state: Mutex::new(BarrierState { feasible: Vec::new(), infeasible: Vec::new(), h_max: Double::new(h_max_0) }),
        }
    }
}

impl Barrier for ProgressiveBarrier {
    fn consider(&self, point: EvalPoint) -> SuccessType {
        if !point.is_eval_ok() {
            return SuccessType::Unsuccessful;
        }
        let mut state = self.state.lock();
        if point.is_feasible() {
            let incumbent_f = state.feasible.first().map(|p| p.f());
            let success = match incumbent_f {
                None => SuccessType::FullSuccess,
                Some(best) if point.f() < best => SuccessType::FullSuccess,
                Some(best) if point.f() == best => SuccessType::PartialSuccess,
                _ => SuccessType::Unsuccessful,
            };
            if success != SuccessType::Unsuccessful {
                state.feasible.insert(0, point);
                state.feasible.truncate(8);
            }
            success
        } else {
            let h_max = state.h_max;
            if point.h() > h_max {
                return SuccessType::Unsuccessful;
            }
            let incumbent = state.infeasible.first().cloned();
            let success = match &incumbent {
                None => SuccessType::FullSuccess,
                Some(best) if point.f() < best.f() && point.h() <= best.h() => SuccessType::FullSuccess,
                Some(best) if point.h() < best.h() => SuccessType::PartialSuccess,
                _ => SuccessType::Unsuccessful,
            };
            if success != SuccessType::Unsuccessful {
                state.infeasible.insert(0, point);
                state.infeasible.truncate(8);
            }
            success
        }
    }

    fn best_feasible(&self) -> Option<EvalPoint> {
        self.state.lock().feasible.first().cloned()
    }

    fn best_infeasible(&self) -> Option<EvalPoint> {
        self.state.lock().infeasible.first().cloned()
    }

    fn feasible_incumbents(&self, max: usize) -> Vec<EvalPoint> {
        self.state.lock().feasible.iter().take(max).cloned().collect()
    }

    fn infeasible_incumbents(&self, max: usize) -> Vec<EvalPoint> {
        self.state.lock().infeasible.iter().take(max).cloned().collect()
    }

    fn h_max(&self) -> Double {
        self.state.lock().h_max
    }

    fn set_h_max(&self, h_max: Double) {
        self.state.lock().h_max = h_max;
    }

    fn update_h_max_after_iteration(&self) {
        let mut state = self.state.lock();
        let worst_infeasible_h = state.infeasible.iter().filter_map(|p| p.h().value()).fold(None, |acc: Option<f64>, h| match acc {
            None => Some(h),
            Some(a) => Some(a.max(h)),
        });
        if let Some(h) = worst_infeasible_h {
            if h < state.h_max.value_or(f64::INFINITY) {
                state.h_max = Double::new(h);
            }
        }
    }
}
