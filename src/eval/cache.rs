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

//! Content-addressed cache of every point ever submitted to the evaluator.
//!
//! Keyed by a quantized coordinate tuple rather than by identity, so two
//! trial points generated from different frame centers that happen to land
//! on the same mesh node collapse into one cache entry and are evaluated at
//! most once — the "smart insert" rule.
//!
//! Persistence (`CACHE_FILE`) uses an append-only binary format: a fixed
//! header (`magic`, dimension) followed by length-prefixed records, one per
//! cached point. Loading stops at the first record it cannot fully read
//! rather than erroring, so a file left half-written by a crashed run is
//! still usable.

use std::io::{self, Read, Write};

use dashmap::DashMap;
use fxhash::FxBuildHasher;

use crate::eval::eval_point::{Eval, EvalPoint, EvalStatus, EvalType};
use crate::math::{Double, Point};

const CACHE_FILE_MAGIC: u32 = 0x4e4d_4443; // "NMDC"

/// Minimum behavior required of a point cache.
pub trait Cache {
    /// Looks up a point by coordinates, returning its cached evaluations if
    /// any.
    fn find(&self, point: &Point) -> Option<EvalPoint>;

    /// Claims `point` for a single blackbox evaluation: inserts it if
    /// absent, never re-evaluating one already done. Equivalent to
    /// `smart_insert_for(point, 1, EvalType::BbEval)`.
    fn smart_insert(&self, point: EvalPoint) -> bool {
        self.smart_insert_for(point, 1, EvalType::BbEval)
    }

    /// Atomically: if no entry exists for `point`'s coordinates, inserts it
    /// in-progress and returns `true` (the caller now owns the obligation
    /// to evaluate it). If an entry exists whose `eval_type` pass has
    /// completed fewer than `max_eval` times (a noisy blackbox re-evaluated
    /// on request), returns `true` so the caller re-evaluates the existing
    /// point. Otherwise returns `false`.
    fn smart_insert_for(&self, point: EvalPoint, max_eval: usize, eval_type: EvalType) -> bool;

    /// Records the result of evaluating a previously inserted point.
    fn update(&self, point: &Point, eval: Eval);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshots every cached point, for search methods that need to look
    /// back over evaluation history (e.g. fitting a local surrogate).
    fn all(&self) -> Vec<EvalPoint>;

    /// The best feasible point recorded so far, if any.
    fn find_best_feas(&self) -> Option<EvalPoint>;

    /// The best infeasible point with `h <= h_max` recorded so far, if any.
    fn find_best_inf(&self, h_max: Double) -> Option<EvalPoint>;

    /// Appends every cached point to `path` in the `CACHE_FILE` binary
    /// format. The default is a no-op, for `Cache` implementations that do
    /// not support persistence.
    fn save_to_file(&self, _path: &str) -> io::Result<()> {
        Ok(())
    }

    /// Loads points from a `CACHE_FILE` written by [`Cache::save_to_file`],
    /// returning how many were added. The default is a no-op.
    fn load_from_file(&self, _path: &str) -> io::Result<usize> {
        Ok(0)
    }
}

/// `DashMap`-backed cache, one shard-locked bucket per key, matching the
/// concurrency shape `ddo`'s `SimpleCache` gets from the same crate.
pub struct SimpleCache {
    epsilon: f64,
    entries: DashMap<Vec<i64>, EvalPoint, FxBuildHasher>,
    eval_counts: DashMap<Vec<i64>, usize, FxBuildHasher>,
}

impl SimpleCache {
    pub fn new(epsilon: f64) -> Self {
        SimpleCache {
            epsilon,
            entries: DashMap::with_hasher(FxBuildHasher::default()),
            eval_counts: DashMap::with_hasher(FxBuildHasher::default()),
        }
    }
}

impl Cache for SimpleCache {
    fn find(&self, point: &Point) -> Option<EvalPoint> {
        let key = point.quantize(self.epsilon);
        self.entries.get(&key).map(|e| e.value().clone())
    }

    fn smart_insert_for(&self, point: EvalPoint, max_eval: usize, eval_type: EvalType) -> bool {
        let key = point.point.quantize(self.epsilon);
        match self.entries.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                let has_result = match eval_type {
                    EvalType::BbEval => entry.get().bb_eval.is_some(),
                    EvalType::ModelEval => entry.get().model_eval.is_some(),
                };
                drop(entry);
                if !has_result {
                    return false;
                }
                let mut count = self.eval_counts.entry(key).or_insert(1);
                if *count < max_eval.max(1) {
                    *count += 1;
                    true
                } else {
                    false
                }
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(point);
                self.eval_counts.insert(key, 1);
                true
            }
        }
    }

    fn update(&self, point: &Point, eval: Eval) {
        let key = point.quantize(self.epsilon);
        if let Some(mut entry) = self.entries.get_mut(&key) {
            entry.set_eval(eval);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn all(&self) -> Vec<EvalPoint> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }

    fn find_best_feas(&self) -> Option<EvalPoint> {
        self.entries
            .iter()
            .map(|e| e.value().clone())
            .filter(EvalPoint::is_feasible)
            .min_by(|a, b| a.f().partial_cmp(&b.f()).unwrap_or(std::cmp::Ordering::Equal))
    }

    fn find_best_inf(&self, h_max: Double) -> Option<EvalPoint> {
        let h_max = h_max.value_or(f64::INFINITY);
        self.entries
            .iter()
            .map(|e| e.value().clone())
            .filter(|ep| ep.is_eval_ok() && !ep.is_feasible() && ep.h().value_or(f64::INFINITY) <= h_max)
            .min_by(|a, b| a.f().partial_cmp(&b.f()).unwrap_or(std::cmp::Ordering::Equal))
    }

    fn save_to_file(&self, path: &str) -> io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        let dim = self.entries.iter().next().map(|e| e.value().point.size()).unwrap_or(0) as u32;
        file.write_all(&CACHE_FILE_MAGIC.to_le_bytes())?;
        file.write_all(&dim.to_le_bytes())?;
        for entry in self.entries.iter() {
            write_record(&mut file, entry.value())?;
        }
        Ok(())
    }

    fn load_from_file(&self, path: &str) -> io::Result<usize> {
        let mut file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };
        let mut magic_buf = [0u8; 4];
        if file.read_exact(&mut magic_buf).is_err() {
            return Ok(0);
        }
        if u32::from_le_bytes(magic_buf) != CACHE_FILE_MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "not a nomad cache file"));
        }
        let mut dim_buf = [0u8; 4];
        if file.read_exact(&mut dim_buf).is_err() {
            return Ok(0);
        }
        let dim = u32::from_le_bytes(dim_buf) as usize;
        let mut loaded = 0;
        while let Some((point, eval)) = read_record(&mut file, dim) {
            let mut ep = EvalPoint::new(point);
            ep.set_eval(eval);
            if self.smart_insert(ep) {
                loaded += 1;
            }
        }
        Ok(loaded)
    }
}

fn write_record(file: &mut std::fs::File, ep: &EvalPoint) -> io::Result<()> {
    let Some(eval) = ep.bb_eval.as_ref() else { return Ok(()) };
    let coords: Vec<f64> = ep.point.coords().iter().map(|c| c.value_or(f64::NAN)).collect();
    let mut body = Vec::with_capacity(8 * coords.len() + 18);
    for c in &coords {
        body.extend_from_slice(&c.to_bits().to_le_bytes());
    }
    body.extend_from_slice(&eval.f.value_or(f64::NAN).to_bits().to_le_bytes());
    body.extend_from_slice(&eval.h.value_or(f64::NAN).to_bits().to_le_bytes());
    body.push(eval.status as u8);
    body.push(eval.eval_type as u8);
    file.write_all(&(body.len() as u32).to_le_bytes())?;
    file.write_all(&body)
}

/// Reads one record, returning `None` at a clean EOF or a truncated
/// trailing record (tolerant of a file left half-written by a crashed run).
fn read_record(file: &mut std::fs::File, dim: usize) -> Option<(Point, Eval)> {
    let mut len_buf = [0u8; 4];
    file.read_exact(&mut len_buf).ok()?;
    let len = u32::from_le_bytes(len_buf) as usize;
    let mut body = vec![0u8; len];
    file.read_exact(&mut body).ok()?;
    if body.len() != 8 * dim + 18 {
        return None;
    }
    let mut offset = 0;
    let mut coords = Vec::with_capacity(dim);
    for _ in 0..dim {
        let bits = u64::from_le_bytes(body[offset..offset + 8].try_into().ok()?);
        coords.push(Double::new(f64::from_bits(bits)));
        offset += 8;
    }
    let f = f64::from_bits(u64::from_le_bytes(body[offset..offset + 8].try_into().ok()?));
    offset += 8;
    let h = f64::from_bits(u64::from_le_bytes(body[offset..offset + 8].try_into().ok()?));
    offset += 8;
    let status = body[offset];
    let eval_type = body[offset + 1];
    let eval_type = if eval_type == EvalType::ModelEval as u8 { EvalType::ModelEval } else { EvalType::BbEval };
    if status != EvalStatus::EvalOk as u8 {
        return None;
    }
    let eval = Eval { eval_type, status: EvalStatus::EvalOk, f: Double::new(f), constraints: Vec::new(), h: Double::new(h) };
    Some((Point::new(coords), eval))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::eval_point::EvalType;
    use std::sync::Arc;
    use std::thread;

    fn p(x: f64) -> Point {
        Point::from_f64(&[x])
    }

    #[test]
    fn by_default_the_cache_is_empty() {
        let cache = SimpleCache::new(1e-9);
        assert!(cache.is_empty());
    }

    #[test]
    fn smart_insert_accepts_the_first_copy_of_a_point() {
        let cache = SimpleCache::new(1e-9);
        assert!(cache.smart_insert(EvalPoint::new(p(1.0))));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn smart_insert_rejects_a_duplicate_point() {
        let cache = SimpleCache::new(1e-9);
        assert!(cache.smart_insert(EvalPoint::new(p(1.0))));
        assert!(!cache.smart_insert(EvalPoint::new(p(1.0))));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn update_attaches_an_eval_to_the_cached_point() {
        let cache = SimpleCache::new(1e-9);
        cache.smart_insert(EvalPoint::new(p(2.0)));
        cache.update(&p(2.0), Eval::ok(EvalType::BbEval, 4.0, vec![]));
        let found = cache.find(&p(2.0)).unwrap();
        assert_eq!(found.f(), crate::math::Double::new(4.0));
    }

    #[test]
    fn concurrent_inserts_of_the_same_point_succeed_exactly_once() {
        let cache = Arc::new(SimpleCache::new(1e-9));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || cache.smart_insert(EvalPoint::new(p(3.0)))));
        }
        let successes: usize = handles.into_iter().map(|h| h.join().unwrap() as usize).sum();
        assert_eq!(successes, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn smart_insert_for_allows_reevaluation_up_to_max_eval() {
        let cache = SimpleCache::new(1e-9);
        let mut ep = EvalPoint::new(p(1.0));
        ep.set_eval(Eval::ok(EvalType::BbEval, 1.0, vec![]));
        assert!(cache.smart_insert_for(ep, 3, EvalType::BbEval));
        let mut again = EvalPoint::new(p(1.0));
        again.set_eval(Eval::ok(EvalType::BbEval, 1.0, vec![]));
        assert!(cache.smart_insert_for(again.clone(), 3, EvalType::BbEval));
        assert!(cache.smart_insert_for(again.clone(), 3, EvalType::BbEval));
        assert!(!cache.smart_insert_for(again, 3, EvalType::BbEval));
    }

    #[test]
    fn find_best_feas_picks_the_lowest_f_among_feasible_points() {
        let cache = SimpleCache::new(1e-9);
        cache.smart_insert(EvalPoint::new(p(1.0)));
        cache.update(&p(1.0), Eval::ok(EvalType::BbEval, 5.0, vec![-1.0]));
        cache.smart_insert(EvalPoint::new(p(2.0)));
        cache.update(&p(2.0), Eval::ok(EvalType::BbEval, 2.0, vec![-1.0]));
        cache.smart_insert(EvalPoint::new(p(3.0)));
        cache.update(&p(3.0), Eval::ok(EvalType::BbEval, 1.0, vec![1.0]));

        let best = cache.find_best_feas().unwrap();
        assert_eq!(best.f(), crate::math::Double::new(2.0));
    }

    #[test]
    fn find_best_inf_ignores_points_above_h_max() {
        let cache = SimpleCache::new(1e-9);
        cache.smart_insert(EvalPoint::new(p(1.0)));
        cache.update(&p(1.0), Eval::ok(EvalType::BbEval, 0.0, vec![1.0]));
        cache.smart_insert(EvalPoint::new(p(2.0)));
        cache.update(&p(2.0), Eval::ok(EvalType::BbEval, 10.0, vec![5.0]));

        assert!(cache.find_best_inf(crate::math::Double::new(0.5)).is_none());
        let best = cache.find_best_inf(crate::math::Double::new(2.0)).unwrap();
        assert_eq!(best.f(), crate::math::Double::new(0.0));
    }

    #[test]
    fn saving_and_loading_a_cache_file_round_trips_every_ok_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.bin");
        let path = path.to_str().unwrap();

        let cache = SimpleCache::new(1e-9);
        cache.smart_insert(EvalPoint::new(p(1.0)));
        cache.update(&p(1.0), Eval::ok(EvalType::BbEval, 1.0, vec![]));
        cache.smart_insert(EvalPoint::new(p(2.0)));
        cache.update(&p(2.0), Eval::ok(EvalType::BbEval, 4.0, vec![-1.0]));
        cache.save_to_file(path).unwrap();

        let reloaded = SimpleCache::new(1e-9);
        let loaded = reloaded.load_from_file(path).unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(reloaded.find(&p(1.0)).unwrap().f(), crate::math::Double::new(1.0));
        assert_eq!(reloaded.find(&p(2.0)).unwrap().f(), crate::math::Double::new(4.0));
    }

    #[test]
    fn loading_a_missing_cache_file_is_a_no_op() {
        let cache = SimpleCache::new(1e-9);
        assert_eq!(cache.load_from_file("/nonexistent/path/to/cache.bin").unwrap(), 0);
    }
}
