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

//! Search methods: cheap, pluggable ways to propose trial points before
//! falling back to the poll's positive basis. Kept as free functions
//! dispatched through [`SearchMethod`] rather than a trait-object
//! hierarchy, since none of them need more than "take some context, return
//! some points" and a deep inheritance chain here would buy nothing.

pub mod latin_hypercube;
pub mod nelder_mead;
pub mod quad_model;
pub mod speculative;
pub mod vns;

/// Which search step produced a trial point, kept on [`crate::queue::EvalQueuePoint`]-
/// adjacent bookkeeping for diagnostics and for the run report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMethod {
    QuadModel,
    NelderMead,
    Vns,
    Speculative,
    LatinHypercube,
}
