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

//! Typed stop reasons, propagated up the step tree (mega-iteration ->
//! iteration -> algorithm -> root) instead of the cyclic "ask my parent"
//! polling spec.md's redesign notes flag.

/// Reasons an individual blackbox evaluation, or block thereof, stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalStopType {
    MaxBbEvalReached,
    MaxBlockEvalReached,
    OpportunisticSuccess,
    EvalQueueEmpty,
}

/// Reasons a single MADS iteration (search + poll) stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterStopType {
    Started,
    FullSuccess,
    PartialSuccess,
    Unsuccessful,
    Eval(EvalStopType),
}

/// Reasons the Nelder-Mead search stopped refining its simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NMStopType {
    /// The simplex's diameter shrank below the engine's minimum mesh size.
    SimplexTooSmall,
    /// The simplex's vertices became affinely dependent (zero volume), so
    /// no reflection/expansion direction can be computed.
    RankDeficient,
    MaxIterationReached,
    Eval(EvalStopType),
}

/// Reasons the Latin Hypercube search stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LHStopType {
    SamplesExhausted,
    Eval(EvalStopType),
}

/// Reasons the quadratic-model search stopped trying to fit a surrogate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelStopType {
    /// The surrogate was fit and produced a usable stationary point.
    Fitted,
    /// Fewer cached neighbors than the model needs to be well-posed.
    NotEnoughPoints,
    /// The normal equations, or the model's own stationarity system, were
    /// singular (or too ill-conditioned) to solve, or the stationary point
    /// found was not a minimizer of the fitted model.
    RankDeficient,
    Eval(EvalStopType),
}

impl From<EvalStopType> for NMStopType {
    fn from(e: EvalStopType) -> Self {
        NMStopType::Eval(e)
    }
}

impl From<EvalStopType> for LHStopType {
    fn from(e: EvalStopType) -> Self {
        LHStopType::Eval(e)
    }
}

impl From<EvalStopType> for ModelStopType {
    fn from(e: EvalStopType) -> Self {
        ModelStopType::Eval(e)
    }
}

/// Reasons the overall MADS algorithm stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MadsStopType {
    MinMeshSizeReached,
    MaxIterationReached,
    Eval(EvalStopType),
    UserStopped,
}

/// Root-level stop reason returned from a run, the union of every level
/// below it — exactly one concrete cause bubbles all the way up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseStopType {
    Mads(MadsStopType),
    CtrlC,
}

impl BaseStopType {
    /// Whether this reason represents a normal, expected termination (as
    /// opposed to a user interrupt or exhausted budget that the caller
    /// should perhaps treat specially).
    pub fn terminates(&self) -> bool {
        matches!(self, BaseStopType::Mads(MadsStopType::MinMeshSizeReached) | BaseStopType::Mads(MadsStopType::Eval(EvalStopType::MaxBbEvalReached)))
    }
}

impl From<EvalStopType> for IterStopType {
    fn from(e: EvalStopType) -> Self {
        IterStopType::Eval(e)
    }
}

impl From<EvalStopType> for MadsStopType {
    fn from(e: EvalStopType) -> Self {
        MadsStopType::Eval(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_exhaustion_terminates_the_run() {
        let reason = BaseStopType::Mads(MadsStopType::Eval(EvalStopType::MaxBbEvalReached));
        assert!(reason.terminates());
    }

    #[test]
    fn a_user_interrupt_is_not_a_normal_termination() {
        assert!(!BaseStopType::CtrlC.terminates());
    }

    #[test]
    fn an_eval_stop_converts_into_every_search_level_stop_type() {
        assert_eq!(NMStopType::from(EvalStopType::MaxBbEvalReached), NMStopType::Eval(EvalStopType::MaxBbEvalReached));
        assert_eq!(LHStopType::from(EvalStopType::MaxBbEvalReached), LHStopType::Eval(EvalStopType::MaxBbEvalReached));
        assert_eq!(ModelStopType::from(EvalStopType::MaxBbEvalReached), ModelStopType::Eval(EvalStopType::MaxBbEvalReached));
    }
}
