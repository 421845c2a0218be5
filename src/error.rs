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

//! Crate-wide error type.
//!
//! Evaluation failures are *not* represented here: a blackbox that crashes
//! or times out on one point is recorded on the [`crate::eval::EvalPoint`]
//! itself and handled by the barrier/cache, per the engine's "a bad point is
//! data, not an exception" rule. `NomadError` is reserved for the two cases
//! that actually abort a run: a parameter the user handed us is unusable, or
//! the engine hit a state it should be structurally impossible to reach.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NomadError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("run terminated by user callback")]
    UserTerminated,

    #[error("internal invariant violated: {0}")]
    Internal(String),

    #[error("cache/history file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NomadError>;
