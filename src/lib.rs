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

//! # nomad-mads
//!
//! A Mesh Adaptive Direct Search (MADS) solver for constrained, derivative-free
//! blackbox optimization. Given a [`Problem`] (dimension, bounds, starting
//! point) and an [`Evaluator`] (how to turn a point into an objective value
//! and constraint values), [`Algorithm`] polls and searches a shrinking or
//! growing mesh around the best point found so far until a stopping
//! criterion fires, and returns a [`RunReport`].
//!
//! ## Quick example
//!
//! The following minimizes `f(x, y) = (x - 1)^2 + (y + 2)^2` with an
//! in-process callback evaluator (no external executable required):
//!
//! ```
//! use std::sync::Arc;
//! use nomad_mads::{Algorithm, CallbackEvaluator, DirectionType, Evaluator, Parameters};
//!
//! let params = Parameters {
//!     dimension: 2,
//!     x0: vec![0.0, 0.0],
//!     lower_bound: vec![None, None],
//!     upper_bound: vec![None, None],
//!     granularity: vec![],
//!     max_bb_eval: Some(2_000),
//!     nb_threads_parallel_eval: 1,
//!     direction_type: DirectionType::OrthoNPlus1,
//!     opportunistic_eval: true,
//!     bb_max_block_size: 1,
//!     h_max_0: 0.0,
//!     quad_model_search: true,
//!     nm_search: false,
//!     vns_search: false,
//!     speculative_search: true,
//!     constraint_kinds: vec![],
//!     anisotropic_mesh: false,
//!     anisotropy_factor: 0.1,
//!     max_x_feas: 1,
//!     max_x_inf: 1,
//!     generate_all_points_before_eval: false,
//!     cache_file: None,
//!     solution_file: None,
//!     history_file: None,
//!     stats_file: None,
//! };
//!
//! let evaluator: Arc<dyn Evaluator> = Arc::new(CallbackEvaluator::new(|p: &nomad_mads::Point| {
//!     let x = p[0].value_or(0.0);
//!     let y = p[1].value_or(0.0);
//!     Some(((x - 1.0).powi(2) + (y + 2.0).powi(2), vec![]))
//! }));
//!
//! let mut algorithm = Algorithm::new(params, evaluator).expect("valid parameters");
//! let report = algorithm.run();
//! assert!(report.has_feasible_solution());
//! ```
//!
//! ## Module map
//!
//! - [`math`]: extended-real scalars, points and poll directions.
//! - [`mesh`]: the granular mesh trial points are projected onto.
//! - [`eval`]: evaluation outcomes and the content-addressed point cache.
//! - [`barrier`]: the progressive barrier classifying new evaluations.
//! - [`evaluator`]: blackbox/callback evaluators and the parallel dispatcher.
//! - [`queue`]: the priority queue of trial points awaiting evaluation.
//! - [`step`]: the `start`/`run`/`end` phase contract and typed stop reasons.
//! - [`algos`]: the MADS iteration, mega-iteration, search methods, poll and
//!   subproblem decomposition, plus the top-level [`Algorithm`].
//! - [`problem`] / [`params`]: the caller-facing problem description and
//!   run configuration.
//! - [`error`] / [`report`]: the crate's error type and termination report.

pub mod algos;
pub mod barrier;
pub mod error;
pub mod eval;
pub mod evaluator;
pub mod math;
pub mod mesh;
pub mod params;
pub mod problem;
pub mod queue;
pub mod report;
pub mod step;

pub use algos::algorithm::Algorithm;
pub use error::{NomadError, Result};
pub use evaluator::{BlackboxEvaluator, CallbackEvaluator, Evaluator};
pub use math::{Direction, Double, Point};
pub use params::{DirectionType, Parameters};
pub use problem::{ParamProblem, Problem};
pub use report::RunReport;
