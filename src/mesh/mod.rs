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

//! Granular mesh: the lattice trial points are snapped to, with a
//! per-variable frame size used to generate poll directions and a coarser
//! mesh size used for projection.
//!
//! Every coordinate `i` has its own granularity `g_i` (`0` for continuous
//! variables) and an exponent `e_i` such that `mesh_size_i = g_i * tau^e_i`
//! for a fixed base `tau` (NOMAD uses `tau = 4`). On an unsuccessful poll
//! every exponent shrinks by one in lockstep. On success, `enlarge` gates
//! each coordinate individually against the successful direction: a
//! coordinate the direction barely moved along does not get the same boost
//! as one it moved along strongly, which is what makes the frame anisotropic
//! rather than a single scalar shared by every variable.

use crate::math::{Direction, Point, DEFAULT_EPSILON};

const TAU: f64 = 4.0;
const MIN_EXPONENT: i32 = -49;
const MAX_EXPONENT: i32 = 49;

#[derive(Clone, Copy, Debug)]
struct CoordMesh {
    granularity: f64,
    exponent: i32,
}

impl CoordMesh {
    fn size(&self) -> f64 {
        if self.granularity > 0.0 {
            self.granularity * TAU.powi(self.exponent).min(1.0)
        } else {
            TAU.powi(self.exponent)
        }
    }

    fn frame_size(&self) -> f64 {
        if self.granularity > 0.0 {
            self.granularity * TAU.powi(self.exponent.max(0))
        } else {
            TAU.powi(self.exponent.max(0))
        }
    }
}

/// The mesh shared by every variable of a run; all coordinates refine in
/// lockstep, matching the classical (non-anisotropic) MADS update.
#[derive(Clone, Debug)]
pub struct GMesh {
    coords: Vec<CoordMesh>,
}

impl GMesh {
    pub fn new(granularity: &[f64]) -> Self {
        GMesh { coords: granularity.iter().map(|&g| CoordMesh { granularity: g, exponent: 0 }).collect() }
    }

    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    /// Per-variable mesh size `delta^m`, used to project trial points.
    pub fn mesh_size(&self) -> Vec<f64> {
        self.coords.iter().map(CoordMesh::size).collect()
    }

    /// Per-variable frame/poll size `delta^p`, used to scale poll
    /// directions; always `>= mesh_size`.
    pub fn frame_size(&self) -> Vec<f64> {
        self.coords.iter().map(CoordMesh::frame_size).collect()
    }

    /// Enlarges the frame after a full success along `dir` (the successful
    /// poll/search direction). With `anisotropic` false, or no direction
    /// available, every coordinate enlarges in lockstep (the classical
    /// isotropic update). With `anisotropic` true, a coordinate only
    /// enlarges if the direction moved along it by at least
    /// `anisotropy_factor` of the direction's largest component — a
    /// coordinate the step barely touched keeps its current frame size
    /// instead of growing along with the rest.
    pub fn enlarge(&mut self, dir: Option<&Direction>, anisotropy_factor: f64, anisotropic: bool) {
        let gate = match (anisotropic, dir) {
            (true, Some(d)) if !d.components().is_empty() => {
                let max_abs = d.components().iter().map(|c| c.unsigned_abs()).max().unwrap_or(0);
                if max_abs == 0 {
                    None
                } else {
                    Some((d.components(), max_abs))
                }
            }
            _ => None,
        };
        for (i, c) in self.coords.iter_mut().enumerate() {
            let enlarge_this = match &gate {
                None => true,
                Some((components, max_abs)) => {
                    let ratio = components[i].unsigned_abs() as f64 / *max_abs as f64;
                    ratio >= anisotropy_factor
                }
            };
            if enlarge_this {
                c.exponent = (c.exponent + 1).min(MAX_EXPONENT);
            }
        }
    }

    /// Shrinks the frame after an unsuccessful poll. Failure always refines
    /// every coordinate in lockstep — anisotropy only applies to enlargement.
    pub fn refine(&mut self) {
        for c in &mut self.coords {
            c.exponent = (c.exponent - 1).max(MIN_EXPONENT);
        }
    }

    /// Projects `point` onto the current mesh, rounding every coordinate to
    /// the nearest mesh-size multiple (granular coordinates additionally
    /// snap to their own granularity via [`Point::round_to_granularity`]).
    pub fn project(&self, point: &Point) -> Point {
        let mesh_size = self.mesh_size();
        let snapped: Vec<f64> = point
            .coords()
            .iter()
            .zip(mesh_size.iter())
            .map(|(c, &m)| {
                let v = c.value_or(0.0);
                if m > 0.0 { (v / m).round() * m } else { v }
            })
            .collect();
        Point::from_f64(&snapped)
    }

    /// True once every coordinate's frame size has collapsed past the
    /// engine's minimum representable mesh exponent — the `MIN_MESH_SIZE`
    /// stopping criterion. This is one of three ways a mesh can stop; see
    /// [`GMesh::check_stopping`] for the full three-way criterion.
    pub fn is_finest(&self) -> bool {
        self.coords.iter().all(|c| c.exponent <= MIN_EXPONENT)
    }

    /// Full three-way mesh stopping criterion: stop if every frame size has
    /// collapsed past the engine minimum, or mesh-size precision is
    /// exhausted (below machine epsilon at this scale), or every coordinate
    /// is granular and already at its own granularity after an unsuccessful
    /// iteration (there is nowhere finer to go).
    pub fn check_stopping(&self, last_was_failure: bool) -> bool {
        if self.is_finest() {
            return true;
        }
        let precision_exhausted = self.coords.iter().all(|c| c.size() < f64::EPSILON * c.size().abs().max(1.0));
        if precision_exhausted {
            return true;
        }
        let all_granular_at_floor = last_was_failure
            && !self.coords.is_empty()
            && self.coords.iter().all(|c| c.granularity > 0.0 && (c.size() - c.granularity).abs() <= DEFAULT_EPSILON * c.granularity.max(1.0));
        all_granular_at_floor
    }

    /// Checks that `point - center` is, in every coordinate, an exact
    /// integer multiple of the current mesh size — the guarantee every
    /// trial point pushed to the evaluator must satisfy.
    pub fn verify_point_is_on_mesh(&self, point: &Point, center: &Point) -> bool {
        let mesh_size = self.mesh_size();
        point
            .coords()
            .iter()
            .zip(center.coords().iter())
            .zip(mesh_size.iter())
            .all(|((p, c), &m)| (*p - *c).is_multiple_of(m, DEFAULT_EPSILON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_idempotent() {
        let mesh = GMesh::new(&[0.0, 0.1]);
        let p = Point::from_f64(&[1.2345, 6.789]);
        let once = mesh.project(&p);
        let twice = mesh.project(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn enlarge_then_refine_returns_to_the_original_frame_size() {
        let mut mesh = GMesh::new(&[0.0]);
        let before = mesh.frame_size();
        mesh.enlarge(None, 0.0, false);
        mesh.refine();
        assert_eq!(mesh.frame_size(), before);
    }

    #[test]
    fn isotropic_enlarge_grows_every_coordinate() {
        let mut mesh = GMesh::new(&[0.0, 0.0]);
        let before = mesh.frame_size();
        mesh.enlarge(None, 0.0, false);
        let after = mesh.frame_size();
        assert!(after[0] > before[0]);
        assert!(after[1] > before[1]);
    }

    #[test]
    fn anisotropic_enlarge_only_grows_coordinates_the_direction_moved_along() {
        let mut mesh = GMesh::new(&[0.0, 0.0]);
        let before = mesh.frame_size();
        // The direction moved heavily along coordinate 0 and not at all
        // along coordinate 1, so only coordinate 0 should enlarge.
        let dir = Direction::new(vec![4, 0]);
        mesh.enlarge(Some(&dir), 0.5, true);
        let after = mesh.frame_size();
        assert!(after[0] > before[0]);
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn verify_point_is_on_mesh_accepts_snapped_points_and_rejects_others() {
        let mesh = GMesh::new(&[0.0]);
        let center = Point::from_f64(&[0.0]);
        let on_mesh = mesh.project(&Point::from_f64(&[3.7]));
        assert!(mesh.verify_point_is_on_mesh(&on_mesh, &center));
        let off_mesh = Point::from_f64(&[on_mesh[0].value_or(0.0) + 0.37]);
        assert!(!mesh.verify_point_is_on_mesh(&off_mesh, &center));
    }

    #[test]
    fn stopping_fires_once_finest_even_before_precision_exhaustion() {
        let mut mesh = GMesh::new(&[0.0]);
        for _ in 0..200 {
            mesh.refine();
        }
        assert!(mesh.check_stopping(true));
    }

    #[test]
    fn granular_mesh_stops_at_its_own_granularity_after_a_failure() {
        let mesh = GMesh::new(&[1.0]);
        assert!(mesh.check_stopping(true));
        assert!(!mesh.check_stopping(false));
    }

    #[test]
    fn frame_size_is_never_smaller_than_mesh_size() {
        let mut mesh = GMesh::new(&[0.0]);
        for _ in 0..5 {
            mesh.refine();
        }
        let mesh_size = mesh.mesh_size()[0];
        let frame_size = mesh.frame_size()[0];
        assert!(frame_size >= mesh_size);
    }

    #[test]
    fn repeated_refinement_eventually_reaches_the_finest_mesh() {
        let mut mesh = GMesh::new(&[0.0]);
        for _ in 0..200 {
            mesh.refine();
        }
        assert!(mesh.is_finest());
    }
}
