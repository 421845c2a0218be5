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

//! External-executable evaluator: writes the block of points to a temp
//! file, invokes the user's blackbox with that file's path as `argv[1]`,
//! and parses one `f c1 c2 ...` line of output per point.
//!
//! A non-zero exit status or an unparsable/missing output line marks every
//! point in the block as failed rather than aborting the run — a flaky
//! blackbox is the normal case this engine is built to tolerate.

use std::io::Write;
use std::process::Command;

use tracing::warn;

use crate::eval::{Eval, EvalType};
use crate::evaluator::Evaluator;
use crate::math::Point;

pub struct BlackboxEvaluator {
    executable: String,
}

impl BlackboxEvaluator {
    pub fn new(executable: impl Into<String>) -> Self {
        BlackboxEvaluator { executable: executable.into() }
    }

    fn parse_line(line: &str, eval_type: EvalType) -> Eval {
        let mut fields = line.split_whitespace();
        let f: f64 = match fields.next().and_then(|s| s.parse().ok()) {
            Some(f) => f,
            None => return Eval::failed(eval_type),
        };
        let constraints: Option<Vec<f64>> = fields.map(|s| s.parse().ok()).collect();
        match constraints {
            Some(c) => Eval::ok(eval_type, f, c),
            None => Eval::failed(eval_type),
        }
    }
}

impl Evaluator for BlackboxEvaluator {
    fn eval_block(&self, points: &[Point], eval_type: EvalType) -> Vec<Eval> {
        let fail_block = || vec![Eval::failed(eval_type); points.len()];

        let mut input = match tempfile::NamedTempFile::new() {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "could not create blackbox input file");
                return fail_block();
            }
        };
        for p in points {
            let coords: Vec<String> = p.coords().iter().map(|c| c.value_or(f64::NAN).to_string()).collect();
            if writeln!(input, "{}", coords.join(" ")).is_err() {
                return fail_block();
            }
        }
        if input.flush().is_err() {
            return fail_block();
        }

        let output = match Command::new(&self.executable).arg(input.path()).output() {
            Ok(o) => o,
            Err(e) => {
                warn!(error = %e, executable = %self.executable, "failed to spawn blackbox");
                return fail_block();
            }
        };
        if !output.status.success() {
            warn!(status = ?output.status, "blackbox exited with a non-zero status");
            return fail_block();
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines();
        points
            .iter()
            .map(|_| match lines.next() {
                Some(line) => Self::parse_line(line, eval_type),
                None => Eval::failed(eval_type),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_output_line() {
        let eval = BlackboxEvaluator::parse_line("3.5 -1.0 0.2", EvalType::BbEval);
        assert_eq!(eval.f, crate::math::Double::new(3.5));
        assert_eq!(eval.constraints.len(), 2);
    }

    #[test]
    fn an_unparsable_line_is_a_failed_eval() {
        let eval = BlackboxEvaluator::parse_line("not-a-number", EvalType::BbEval);
        assert_eq!(eval.status, crate::eval::EvalStatus::EvalFailed);
    }

    #[test]
    fn missing_executable_fails_the_whole_block() {
        let evaluator = BlackboxEvaluator::new("/nonexistent/path/to/nothing");
        let evals = evaluator.eval_block(&[Point::from_f64(&[1.0]), Point::from_f64(&[2.0])], EvalType::BbEval);
        assert_eq!(evals.len(), 2);
        assert!(evals.iter().all(|e| e.status == crate::eval::EvalStatus::EvalFailed));
    }
}
