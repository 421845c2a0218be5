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

//! Run parameters.
//!
//! A deliberately small subset of NOMAD's keyword-file surface: the knobs
//! the core engine itself reads. Parsing the full `KEYWORD value` grammar
//! and the attribute-registration/reflection system that backs it is an
//! external concern (see spec's Non-goals) — this struct is the boundary a
//! future parameter-file reader would populate.

use serde::{Deserialize, Serialize};

use crate::error::{NomadError, Result};

/// How the positive basis used by [`crate::algos::poll`] is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionType {
    Ortho2N,
    OrthoNPlus1,
}

/// How a single blackbox output is folded into the aggregated constraint
/// violation `h`: extreme-barrier outputs reject the point outright on any
/// violation, progressive-barrier outputs accumulate into `h` and may be
/// temporarily tolerated up to `h_max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Eb,
    Pb,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Parameters {
    /// Number of variables.
    pub dimension: usize,
    /// Starting point, one coordinate per variable. Empty means "synthesize
    /// one via Latin Hypercube sampling of the bounded box" (requires every
    /// variable to have both bounds set).
    #[serde(default)]
    pub x0: Vec<f64>,
    /// Inclusive lower bounds, `None` meaning unbounded, one per variable.
    pub lower_bound: Vec<Option<f64>>,
    /// Inclusive upper bounds, `None` meaning unbounded, one per variable.
    pub upper_bound: Vec<Option<f64>>,
    /// Granularity per variable; `0.0` means continuous.
    #[serde(default)]
    pub granularity: Vec<f64>,
    /// Maximum number of blackbox evaluations, `None` for unbounded.
    #[serde(default)]
    pub max_bb_eval: Option<usize>,
    /// Number of worker threads dispatching blocks to the evaluator.
    #[serde(default = "default_threads")]
    pub nb_threads_parallel_eval: usize,
    /// Positive basis construction used by poll.
    #[serde(default = "default_direction_type")]
    pub direction_type: DirectionType,
    /// Stop polling a direction set as soon as one trial point improves,
    /// rather than evaluating the whole block.
    #[serde(default = "default_true")]
    pub opportunistic_eval: bool,
    /// Number of trial points sent to the evaluator per dispatch block.
    #[serde(default = "default_block_size")]
    pub bb_max_block_size: usize,
    /// Initial progressive-barrier threshold on constraint violation.
    #[serde(default)]
    pub h_max_0: f64,
    /// Enable the quadratic-model search step.
    #[serde(default = "default_true")]
    pub quad_model_search: bool,
    /// Enable the Nelder-Mead search step.
    #[serde(default)]
    pub nm_search: bool,
    /// Enable the variable neighborhood search step.
    #[serde(default)]
    pub vns_search: bool,
    /// Enable the speculative search step.
    #[serde(default = "default_true")]
    pub speculative_search: bool,
    /// Per-constraint kind, parallel to the constraint vector a blackbox
    /// evaluation returns. Empty means every constraint is `Pb` (the
    /// historical all-progressive behavior).
    #[serde(default)]
    pub constraint_kinds: Vec<ConstraintKind>,
    /// Whether mesh enlargement is anisotropic (gated per coordinate by the
    /// successful direction) rather than growing every coordinate in
    /// lockstep.
    #[serde(default)]
    pub anisotropic_mesh: bool,
    /// Fraction of the successful direction's largest component a
    /// coordinate must have moved along to enlarge, when `anisotropic_mesh`
    /// is set.
    #[serde(default = "default_anisotropy_factor")]
    pub anisotropy_factor: f64,
    /// Maximum number of feasible incumbents offered as frame centers per
    /// mega-iteration.
    #[serde(default = "default_max_frame_centers")]
    pub max_x_feas: usize,
    /// Maximum number of infeasible incumbents offered as frame centers per
    /// mega-iteration.
    #[serde(default = "default_max_frame_centers")]
    pub max_x_inf: usize,
    /// If set, generate every search and poll trial point for all of this
    /// mega-iteration's frame centers before evaluating any of them
    /// (`GENERATE_ALL_POINTS_BEFORE_EVAL`), instead of running one frame
    /// center's search-then-poll to completion before moving to the next.
    #[serde(default)]
    pub generate_all_points_before_eval: bool,
    /// Optional path to persist the evaluation cache, read back on startup.
    #[serde(default)]
    pub cache_file: Option<String>,
    /// Optional path to write the best feasible solution found.
    #[serde(default)]
    pub solution_file: Option<String>,
    /// Optional path to append one line per blackbox evaluation.
    #[serde(default)]
    pub history_file: Option<String>,
    /// Optional path to write final run statistics.
    #[serde(default)]
    pub stats_file: Option<String>,
}

fn default_threads() -> usize {
    1
}
fn default_direction_type() -> DirectionType {
    DirectionType::OrthoNPlus1
}
fn default_true() -> bool {
    true
}
fn default_block_size() -> usize {
    1
}
fn default_anisotropy_factor() -> f64 {
    0.1
}
fn default_max_frame_centers() -> usize {
    1
}

impl Parameters {
    pub fn from_toml_str(text: &str) -> Result<Parameters> {
        let params: Parameters =
            toml::from_str(text).map_err(|e| NomadError::InvalidParameter(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Fail-fast structural validation, performed once up front rather than
    /// scattered through the engine as defensive checks.
    pub fn validate(&self) -> Result<()> {
        let n = self.dimension;
        if n == 0 {
            return Err(NomadError::InvalidParameter("dimension must be positive".into()));
        }
        for (name, field) in [("x0", self.x0.len()), ("lower_bound", self.lower_bound.len()), ("upper_bound", self.upper_bound.len())] {
            if field != n {
                return Err(NomadError::InvalidParameter(format!(
                    "{name} has length {field}, expected dimension {n}"
                )));
            }
        }
        if !self.granularity.is_empty() && self.granularity.len() != n {
            return Err(NomadError::InvalidParameter(format!(
                "granularity has length {}, expected dimension {n}",
                self.granularity.len()
            )));
        }
        for i in 0..n {
            if let (Some(lo), Some(hi)) = (self.lower_bound[i], self.upper_bound[i]) {
                if lo > hi {
                    return Err(NomadError::InvalidParameter(format!(
                        "variable {i}: lower bound {lo} exceeds upper bound {hi}"
                    )));
                }
            }
            if let Some(lo) = self.lower_bound[i] {
                if self.x0[i] < lo {
                    return Err(NomadError::InvalidParameter(format!(
                        "variable {i}: x0 {} is below lower bound {lo}",
                        self.x0[i]
                    )));
                }
            }
            if let Some(hi) = self.upper_bound[i] {
                if self.x0[i] > hi {
                    return Err(NomadError::InvalidParameter(format!(
                        "variable {i}: x0 {} is above upper bound {hi}",
                        self.x0[i]
                    )));
                }
            }
        }
        if self.nb_threads_parallel_eval == 0 {
            return Err(NomadError::InvalidParameter("nb_threads_parallel_eval must be positive".into()));
        }
        if self.bb_max_block_size == 0 {
            return Err(NomadError::InvalidParameter("bb_max_block_size must be positive".into()));
        }
        if self.max_x_feas == 0 {
            return Err(NomadError::InvalidParameter("max_x_feas must be positive".into()));
        }
        if self.max_x_inf == 0 {
            return Err(NomadError::InvalidParameter("max_x_inf must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.anisotropy_factor) {
            return Err(NomadError::InvalidParameter("anisotropy_factor must be within [0, 1]".into()));
        }
        Ok(())
    }

    pub fn granularity_or_zero(&self) -> Vec<f64> {
        if self.granularity.is_empty() {
            vec![0.0; self.dimension]
        } else {
            self.granularity.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Parameters {
        Parameters {
            dimension: 2,
            x0: vec![0.0, 0.0],
            lower_bound: vec![Some(-1.0), None],
            upper_bound: vec![Some(1.0), None],
            granularity: vec![],
            max_bb_eval: Some(100),
            nb_threads_parallel_eval: 1,
            direction_type: DirectionType::OrthoNPlus1,
            opportunistic_eval: true,
            bb_max_block_size: 1,
            h_max_0: 0.0,
            quad_model_search: true,
            nm_search: false,
            vns_search: false,
            speculative_search: true,
            constraint_kinds: vec![],
            anisotropic_mesh: false,
            anisotropy_factor: 0.1,
            max_x_feas: 1,
            max_x_inf: 1,
            generate_all_points_before_eval: false,
            cache_file: None,
            solution_file: None,
            history_file: None,
            stats_file: None,
        }
    }

    #[test]
    fn valid_parameters_pass() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn x0_outside_bounds_is_rejected() {
        let mut p = valid();
        p.x0[0] = -5.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn mismatched_vector_length_is_rejected() {
        let mut p = valid();
        p.x0.push(0.0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn from_toml_round_trips_minimal_config() {
        let text = r#"
            dimension = 1
            x0 = [0.5]
            lower_bound = [0.0]
            upper_bound = [1.0]
        "#;
        let params = Parameters::from_toml_str(text).unwrap();
        assert_eq!(params.dimension, 1);
        assert_eq!(params.nb_threads_parallel_eval, 1);
    }
}
