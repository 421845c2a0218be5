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

//! The step framework: every algorithmic phase (an iteration, a search
//! method, a poll, a mega-iteration) implements the same `start`/`run`/`end`
//! contract, so the engine can log, time and abort any of them uniformly.

mod stop_reason;

pub use stop_reason::{BaseStopType, EvalStopType, IterStopType, LHStopType, MadsStopType, ModelStopType, NMStopType};

/// Outcome of running a step once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Stopped,
}

/// A phase of the algorithm. Default `start`/`end` are no-ops; most steps
/// only need to implement `run`.
pub trait Step {
    fn start(&mut self) {}

    fn run(&mut self) -> StepStatus;

    fn end(&mut self) {}

    /// Runs the full `start`/`run`/`end` contract, as every call site does.
    fn execute(&mut self) -> StepStatus {
        self.start();
        let status = self.run();
        self.end();
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingStep {
        started: bool,
        ended: bool,
        ran: bool,
    }

    impl Step for CountingStep {
        fn start(&mut self) {
            self.started = true;
        }
        fn run(&mut self) -> StepStatus {
            self.ran = true;
            StepStatus::Completed
        }
        fn end(&mut self) {
            self.ended = true;
        }
    }

    #[test]
    fn execute_calls_start_run_and_end_in_order() {
        let mut step = CountingStep { started: false, ended: false, ran: false };
        let status = step.execute();
        assert_eq!(status, StepStatus::Completed);
        assert!(step.started && step.ran && step.ended);
    }
}
