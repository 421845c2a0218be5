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

//! The evaluation queue: trial points waiting to be sent to the evaluator,
//! ordered by priority so the most promising points are dispatched first.
//!
//! Built directly on `binary-heap-plus`'s comparator-parametrized heap, the
//! same way the teacher's `SimpleFringe` wraps it for the open-node list —
//! here the elements are trial points instead of search-tree subproblems.

use std::hash::{Hash, Hasher};

use binary_heap_plus::BinaryHeap;
use compare::Compare;

use crate::eval::EvalPoint;
use crate::math::{Direction, Point};

/// A trial point waiting in the evaluation queue, tagged with the
/// generating step's priority hints.
#[derive(Clone, Debug)]
pub struct EvalQueuePoint {
    pub eval_point: EvalPoint,
    /// Lower means "generated earlier / by a higher-priority step"; used as
    /// the primary tie-breaker by [`LexicographicPriority`].
    pub generation_order: u64,
    /// Set when this point came from the direction that succeeded on the
    /// previous poll (§4.10's "last successful direction" dynamic ranking).
    pub is_last_success_direction: bool,
    /// The poll direction that generated this point, if any. Search-step
    /// points (quad model, Nelder-Mead, VNS, speculative) carry `None`.
    pub direction: Option<Direction>,
}

/// Orders points in the queue. Implementations compare `a` against `b` the
/// way `std::cmp::Ordering` does: `Greater` means `a` should be popped
/// first.
pub trait ComparePriority {
    fn compare(&self, a: &EvalQueuePoint, b: &EvalQueuePoint) -> std::cmp::Ordering;
}

/// Default ordering: points generated from the last successful poll
/// direction go first; ties break on earlier-generated points first (a
/// stable, FIFO-within-priority order); remaining ties break by comparing
/// the trial points' coordinates one-by-one, most significant first, so two
/// points submitted in the same generation never compare as fully equal
/// unless they are literally the same point.
#[derive(Default)]
pub struct LexicographicPriority;

impl ComparePriority for LexicographicPriority {
    fn compare(&self, a: &EvalQueuePoint, b: &EvalQueuePoint) -> std::cmp::Ordering {
        a.is_last_success_direction
            .cmp(&b.is_last_success_direction)
            .then_with(|| b.generation_order.cmp(&a.generation_order))
            .then_with(|| compare_coords(&b.eval_point.point, &a.eval_point.point))
    }
}

/// Compares two points coordinate-by-coordinate, first difference wins.
/// Undefined coordinates never break a tie against each other.
fn compare_coords(a: &Point, b: &Point) -> std::cmp::Ordering {
    for (x, y) in a.coords().iter().zip(b.coords().iter()) {
        match (x.value(), y.value()) {
            (Some(vx), Some(vy)) => match vx.partial_cmp(&vy) {
                Some(std::cmp::Ordering::Equal) | None => continue,
                Some(ord) => return ord,
            },
            _ => continue,
        }
    }
    std::cmp::Ordering::Equal
}

/// Dispatches points in a pseudo-random order. Seeded once per queue so the
/// order is reproducible for a given seed without needing interior
/// mutability shared across worker threads: each point's rank is derived
/// from the seed mixed with its own coordinates, not from a stream of calls.
pub struct RandomPriority {
    seed: u64,
}

impl RandomPriority {
    pub fn new(seed: u64) -> Self {
        RandomPriority { seed }
    }

    fn rank(&self, p: &EvalQueuePoint) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.seed.hash(&mut hasher);
        for c in p.eval_point.point.coords() {
            c.value_or(0.0).to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl ComparePriority for RandomPriority {
    fn compare(&self, a: &EvalQueuePoint, b: &EvalQueuePoint) -> std::cmp::Ordering {
        self.rank(a).cmp(&self.rank(b))
    }
}

/// Ranks poll points by how closely their direction aligns with a reference
/// direction (typically the last successful one), most aligned first.
/// Points with no direction of their own (search-step points) or when there
/// is no reference yet rank behind every directional point.
pub struct DirectionCosinePriority {
    reference: Option<Direction>,
}

impl DirectionCosinePriority {
    pub fn new(reference: Option<Direction>) -> Self {
        DirectionCosinePriority { reference }
    }

    fn alignment(&self, p: &EvalQueuePoint) -> f64 {
        match (&self.reference, &p.direction) {
            (Some(reference), Some(dir)) => reference.cosine_angle(dir),
            _ => -1.0,
        }
    }
}

impl ComparePriority for DirectionCosinePriority {
    fn compare(&self, a: &EvalQueuePoint, b: &EvalQueuePoint) -> std::cmp::Ordering {
        self.alignment(a)
            .partial_cmp(&self.alignment(b))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.generation_order.cmp(&a.generation_order))
    }
}

struct HeapComparator<P>(P);

impl<P: ComparePriority> Compare<EvalQueuePoint> for HeapComparator<P> {
    fn compare(&self, a: &EvalQueuePoint, b: &EvalQueuePoint) -> std::cmp::Ordering {
        self.0.compare(a, b)
    }
}

/// The priority queue of pending trial points.
pub struct EvaluationQueue<P: ComparePriority> {
    heap: BinaryHeap<EvalQueuePoint, HeapComparator<P>>,
}

impl<P: ComparePriority> EvaluationQueue<P> {
    pub fn new(priority: P) -> Self {
        EvaluationQueue { heap: BinaryHeap::from_vec_cmp(Vec::new(), HeapComparator(priority)) }
    }

    pub fn push(&mut self, point: EvalQueuePoint) {
        self.heap.push(point);
    }

    pub fn pop(&mut self) -> Option<EvalQueuePoint> {
        self.heap.pop()
    }

    /// Pops up to `n` points at once, for block-based dispatch.
    pub fn pop_block(&mut self, n: usize) -> Vec<EvalQueuePoint> {
        let mut block = Vec::with_capacity(n);
        while block.len() < n {
            match self.pop() {
                Some(p) => block.push(p),
                None => break,
            }
        }
        block
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
