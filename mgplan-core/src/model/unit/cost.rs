use derive_more::{Add, Div, Mul, Neg, Sum};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Represents the cost of traversing a roadmap edge, or an accumulation of
/// such costs. A cost is a totally-ordered f64; +infinity marks unreachable
/// or colliding motion.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    PartialOrd,
    Ord,
    Add,
    Mul,
    Div,
    Sum,
    Neg,
    Serialize,
    Deserialize,
)]
pub struct Cost(OrderedFloat<f64>);

impl Cost {
    /// represents zero cost, unit of the addition operation
    pub const ZERO: Cost = Cost(OrderedFloat(0.0));

    /// the cost of colliding or unreachable motion
    pub const INFINITY: Cost = Cost(OrderedFloat(f64::INFINITY));

    /// helper to construct a Cost from an f64
    pub fn new(value: f64) -> Cost {
        Cost(OrderedFloat(value))
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    pub fn is_infinite(&self) -> bool {
        self.0.is_infinite()
    }

    pub fn as_f64(&self) -> f64 {
        self.0 .0
    }

    pub fn max(self, other: Cost) -> Cost {
        if self < other {
            other
        } else {
            self
        }
    }

    pub fn min(self, other: Cost) -> Cost {
        if self < other {
            self
        } else {
            other
        }
    }
}

impl From<f64> for Cost {
    fn from(f: f64) -> Self {
        Cost(OrderedFloat(f))
    }
}

impl From<Cost> for f64 {
    fn from(val: Cost) -> Self {
        val.0.into_inner()
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
