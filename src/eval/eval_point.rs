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

//! Evaluations: the objective/constraint outcome of running the blackbox on
//! a single point, and the point carrying it.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::math::{Double, Point};
use crate::params::ConstraintKind;

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// How a point came to be evaluated, mirroring the block-evaluation outcome
/// a blackbox process can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalStatus {
    /// Not yet sent to the evaluator.
    NotEvaluated,
    /// Evaluation in flight.
    InProgress,
    /// Evaluator returned a value.
    EvalOk,
    /// Evaluator failed (crash, timeout, unparsable output).
    EvalFailed,
    /// Evaluator reported the point as infeasible by construction
    /// (e.g. `EB` constraint violated at the blackbox level).
    EvalRejected,
}

/// Which evaluation pass this result belongs to: the true objective/
/// constraint evaluation, or a cheap surrogate/model pass used only to rank
/// points before the real evaluation (search-step pre-selection).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalType {
    BbEval,
    ModelEval,
}

/// The outcome of evaluating a point: objective value plus constraint
/// values, and the aggregated infeasibility measure `h`.
#[derive(Clone, Debug)]
pub struct Eval {
    pub eval_type: EvalType,
    pub status: EvalStatus,
    pub f: Double,
    pub constraints: Vec<Double>,
    /// Aggregated constraint violation (progressive-barrier `h`); `0.0` if
    /// feasible, `undefined` if the point was rejected outright.
    pub h: Double,
}

impl Eval {
    pub fn not_evaluated(eval_type: EvalType) -> Self {
        Eval { eval_type, status: EvalStatus::NotEvaluated, f: Double::undefined(), constraints: Vec::new(), h: Double::undefined() }
    }

    pub fn failed(eval_type: EvalType) -> Self {
        Eval { eval_type, status: EvalStatus::EvalFailed, f: Double::undefined(), constraints: Vec::new(), h: Double::undefined() }
    }

    /// Builds a successful evaluation, computing `h` as the sum of squared
    /// violations of the progressive-barrier (PB) constraints (negative
    /// values are satisfied and contribute nothing).
    pub fn ok(eval_type: EvalType, f: f64, constraints: Vec<f64>) -> Self {
        let h: f64 = constraints.iter().map(|&c| if c > 0.0 { c * c } else { 0.0 }).sum();
        Eval {
            eval_type,
            status: EvalStatus::EvalOk,
            f: Double::new(f),
            constraints: constraints.into_iter().map(Double::new).collect(),
            h: Double::new(h),
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.status == EvalStatus::EvalOk && self.h.value_or(f64::INFINITY) <= 0.0
    }

    /// Re-derives `h` from the raw constraint values using per-constraint
    /// kinds: an extreme-barrier (`Eb`) violation rejects the point outright
    /// (`h = +inf`) regardless of every other constraint, while
    /// progressive-barrier (`Pb`) constraints accumulate squared violation
    /// as before. A constraint with no corresponding kind (`kinds` shorter
    /// than `constraints`) defaults to `Pb`. A no-op when `kinds` is empty,
    /// which keeps the historical all-`Pb` behavior of [`Eval::ok`].
    pub fn recompute_h(&mut self, kinds: &[ConstraintKind]) {
        if kinds.is_empty() || self.status != EvalStatus::EvalOk {
            return;
        }
        let mut eb_violated = false;
        let mut pb_sum = 0.0;
        for (i, c) in self.constraints.iter().enumerate() {
            let v = c.value_or(0.0);
            if v <= 0.0 {
                continue;
            }
            match kinds.get(i) {
                Some(ConstraintKind::Eb) => eb_violated = true,
                _ => pb_sum += v * v,
            }
        }
        self.h = if eb_violated { Double::new(f64::INFINITY) } else { Double::new(pb_sum) };
    }
}

/// A point in variable space together with the evaluations computed for it.
///
/// Parent/child relationships between trial points and the frame center
/// that generated them are tracked by opaque tags rather than back
/// pointers, so `EvalPoint` owns everything it needs and the cache can hand
/// out plain values instead of shared, cyclic references.
#[derive(Clone, Debug)]
pub struct EvalPoint {
    pub point: Point,
    pub tag: u64,
    pub from_tag: Option<u64>,
    pub bb_eval: Option<Eval>,
    pub model_eval: Option<Eval>,
}

impl EvalPoint {
    pub fn new(point: Point) -> Self {
        EvalPoint { point, tag: NEXT_TAG.fetch_add(1, AtomicOrdering::Relaxed), from_tag: None, bb_eval: None, model_eval: None }
    }

    pub fn from_parent(point: Point, parent_tag: u64) -> Self {
        let mut ep = Self::new(point);
        ep.from_tag = Some(parent_tag);
        ep
    }

    pub fn needs_eval(&self, eval_type: EvalType) -> bool {
        match eval_type {
            EvalType::BbEval => self.bb_eval.is_none(),
            EvalType::ModelEval => self.model_eval.is_none(),
        }
    }

    pub fn set_eval(&mut self, eval: Eval) {
        match eval.eval_type {
            EvalType::BbEval => self.bb_eval = Some(eval),
            EvalType::ModelEval => self.model_eval = Some(eval),
        }
    }

    pub fn f(&self) -> Double {
        self.bb_eval.as_ref().map(|e| e.f).unwrap_or_else(Double::undefined)
    }

    pub fn h(&self) -> Double {
        self.bb_eval.as_ref().map(|e| e.h).unwrap_or_else(Double::undefined)
    }

    pub fn is_feasible(&self) -> bool {
        self.bb_eval.as_ref().map(Eval::is_feasible).unwrap_or(false)
    }

    pub fn is_eval_ok(&self) -> bool {
        matches!(self.bb_eval.as_ref().map(|e| e.status), Some(EvalStatus::EvalOk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feasible_requires_nonpositive_h() {
        let e = Eval::ok(EvalType::BbEval, 3.0, vec![-1.0, -0.5]);
        assert!(e.is_feasible());
        assert_eq!(e.h, Double::new(0.0));
    }

    #[test]
    fn violated_constraint_yields_positive_h() {
        let e = Eval::ok(EvalType::BbEval, 3.0, vec![1.0, -0.5]);
        assert!(!e.is_feasible());
        assert_eq!(e.h, Double::new(1.0));
    }

    #[test]
    fn each_eval_point_gets_a_distinct_tag() {
        let a = EvalPoint::new(Point::from_f64(&[0.0]));
        let b = EvalPoint::new(Point::from_f64(&[0.0]));
        assert_ne!(a.tag, b.tag);
    }

    #[test]
    fn eb_violation_forces_h_to_infinity_regardless_of_pb_constraints() {
        use crate::params::ConstraintKind;
        let mut e = Eval::ok(EvalType::BbEval, 3.0, vec![1.0, -0.5]);
        e.recompute_h(&[ConstraintKind::Eb, ConstraintKind::Pb]);
        assert_eq!(e.h.value(), Some(f64::INFINITY));
        assert!(!e.is_feasible());
    }

    #[test]
    fn pb_only_kinds_recompute_the_same_h_as_the_default() {
        use crate::params::ConstraintKind;
        let mut e = Eval::ok(EvalType::BbEval, 3.0, vec![1.0, -0.5]);
        e.recompute_h(&[ConstraintKind::Pb, ConstraintKind::Pb]);
        assert_eq!(e.h, Double::new(1.0));
    }

    #[test]
    fn needs_eval_until_an_eval_is_set() {
        let mut ep = EvalPoint::new(Point::from_f64(&[1.0]));
        assert!(ep.needs_eval(EvalType::BbEval));
        ep.set_eval(Eval::ok(EvalType::BbEval, 1.0, vec![]));
        assert!(!ep.needs_eval(EvalType::BbEval));
    }
}
