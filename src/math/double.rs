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

//! Extended-real scalar arithmetic used throughout the engine.
//!
//! Blackbox evaluations routinely produce undefined values (a crashed
//! simulation, a constraint that could not be computed) and the algorithm
//! needs to reason about "undefined" as a first-class value rather than
//! propagate `NaN` and hope every comparison happens to do the right thing.
//! `Double` wraps an `f64` together with a definedness tag and gives it the
//! comparison and arithmetic semantics the rest of the crate relies on.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Default tolerance used by [`Double::rel_eq`] and mesh-size comparisons.
pub const DEFAULT_EPSILON: f64 = 1e-13;

/// An extended real: either a finite `f64` or an explicit "undefined" value.
///
/// Undefined values sort after every defined value, mirroring the NOMAD
/// convention that an undefined objective or constraint is treated as
/// infinitely bad during comparisons but never participates in arithmetic.
#[derive(Clone, Copy, Debug)]
pub struct Double {
    value: f64,
    defined: bool,
}

impl Double {
    /// A defined value.
    pub fn new(value: f64) -> Self {
        Double { value, defined: true }
    }

    /// The undefined value.
    pub fn undefined() -> Self {
        Double { value: 0.0, defined: false }
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Returns the raw value, or `None` if undefined.
    pub fn value(&self) -> Option<f64> {
        self.defined.then_some(self.value)
    }

    /// Returns the raw value, or `default` if undefined.
    pub fn value_or(&self, default: f64) -> f64 {
        if self.defined { self.value } else { default }
    }

    /// True relative/absolute equality within `eps`, per the `weakLess`
    /// tolerance convention used when deduplicating cache entries.
    pub fn rel_eq(&self, other: &Double, eps: f64) -> bool {
        match (self.defined, other.defined) {
            (false, false) => true,
            (true, true) => {
                let scale = self.value.abs().max(other.value.abs()).max(1.0);
                (self.value - other.value).abs() <= eps * scale
            }
            _ => false,
        }
    }

    /// Rounds this value to the nearest multiple of `granularity`, unless
    /// `granularity` is zero (continuous variable, no rounding). Uses
    /// banker's rounding (round-half-to-even) on `value / granularity`, per
    /// the engine's display/projection convention: a value exactly halfway
    /// between two ticks must round the same way regardless of sign so that
    /// repeated projection stays idempotent.
    pub fn round_to_granularity(&self, granularity: f64) -> Double {
        if !self.defined || granularity <= 0.0 {
            return *self;
        }
        Double::new(round_ties_even(self.value / granularity) * granularity)
    }

    /// Whether this value is an integer multiple of `delta`, within
    /// `eps`-scaled tolerance. `delta <= 0.0` (continuous) is trivially true.
    pub fn is_multiple_of(&self, delta: f64, eps: f64) -> bool {
        if !self.defined {
            return false;
        }
        if delta <= 0.0 {
            return true;
        }
        let ratio = self.value / delta;
        let remainder = (ratio - ratio.round()).abs();
        remainder <= eps * ratio.abs().max(1.0)
    }

    pub fn abs(&self) -> Double {
        if self.defined { Double::new(self.value.abs()) } else { *self }
    }
}

/// Round-half-to-even, since `f64::round` is round-half-away-from-zero.
fn round_ties_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

impl Default for Double {
    fn default() -> Self {
        Double::undefined()
    }
}

impl From<f64> for Double {
    fn from(value: f64) -> Self {
        Double::new(value)
    }
}

impl fmt::Display for Double {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "{}", self.value)
        } else {
            write!(f, "-")
        }
    }
}

impl PartialEq for Double {
    fn eq(&self, other: &Self) -> bool {
        match (self.defined, other.defined) {
            (false, false) => true,
            (true, true) => self.value == other.value,
            _ => false,
        }
    }
}

/// Undefined values order as greater than any defined value: an evaluation
/// we could not compute is worse than every evaluation we could.
impl PartialOrd for Double {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(match (self.defined, other.defined) {
            (true, true) => self.value.partial_cmp(&other.value)?,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        })
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Double {
            type Output = Double;
            fn $method(self, rhs: Double) -> Double {
                if self.defined && rhs.defined {
                    Double::new(self.value $op rhs.value)
                } else {
                    Double::undefined()
                }
            }
        }
    };
}

impl_binop!(Add, add, +);
impl_binop!(Sub, sub, -);
impl_binop!(Mul, mul, *);

impl Div for Double {
    type Output = Double;
    fn div(self, rhs: Double) -> Double {
        if self.defined && rhs.defined && rhs.value != 0.0 {
            Double::new(self.value / rhs.value)
        } else {
            Double::undefined()
        }
    }
}

impl Neg for Double {
    type Output = Double;
    fn neg(self) -> Double {
        if self.defined { Double::new(-self.value) } else { self }
    }
}
