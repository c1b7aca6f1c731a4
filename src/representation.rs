//! The three ways a table can store a frequency.
//!
//! Every representation knows its valid domain, the value a fresh table is
//! filled with, and how to derive itself from a raw count and a total:
//!
//! | Representation     | Domain      | Fill | From count `c`, total `T` |
//! |--------------------|-------------|------|---------------------------|
//! | [`Count`]          | `0, 1, ...` | 0    | `c`                       |
//! | [`Probability`]    | `[0, 1]`    | 0    | `c / T`                   |
//! | [`LogProbability`] | `(-inf, 0]` | -inf | `ln(c) - ln(T)`           |

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Slack allowed at the upper bound of the floating domains.
pub const EPSILON: f64 = 1e-12;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Count {}
    impl Sealed for super::Probability {}
    impl Sealed for super::LogProbability {}
}

/// Machine type a representation is emitted as in generated source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    U64,
    F64,
}

/// A single stored value, ready to be printed as a literal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Unsigned(u64),
    Float(f64),
}

/// A frequency representation. Implemented by [`Count`], [`Probability`] and
/// [`LogProbability`] only.
pub trait Representation:
    sealed::Sealed + Copy + Debug + PartialEq + Serialize + DeserializeOwned + 'static
{
    const NAME: &'static str;

    /// Tag identifying the representation in the binary snapshot envelope.
    const TAG: u8;

    /// Value of a cell that has never been set.
    const ZERO: Self;

    const MIN: f64;
    const MAX: f64;

    const PRIMITIVE: Primitive;

    /// Convert a raw count against `total`.
    ///
    /// # Errors
    /// [`Error::RepresentationRange`] when the result falls outside the
    /// domain, e.g. a count above the total.
    fn from_count(count: u64, total: u64) -> Result<Self>;

    fn as_f64(self) -> f64;

    fn literal(self) -> Literal;

    fn is_valid(self) -> bool;

    fn validate(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(Error::RepresentationRange {
                representation: Self::NAME,
                value: self.as_f64(),
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }
}

/// A raw occurrence count.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Count(pub u64);

impl Count {
    /// Accept a count given as a float, as long as it is a non-negative whole
    /// number that fits in a `u64`.
    pub fn from_f64(value: f64) -> Result<Self> {
        // 2^64 is exactly representable; anything at or above it overflows.
        let whole = value.is_finite() && value >= 0.0 && value.fract() == 0.0;
        if whole && value < 18_446_744_073_709_551_616.0 {
            Ok(Count(value as u64))
        } else {
            Err(Error::RepresentationRange {
                representation: Self::NAME,
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Representation for Count {
    const NAME: &'static str = "count";
    const TAG: u8 = 0;
    const ZERO: Self = Count(0);
    const MIN: f64 = 0.0;
    const MAX: f64 = u64::MAX as f64;
    const PRIMITIVE: Primitive = Primitive::U64;

    fn from_count(count: u64, _total: u64) -> Result<Self> {
        Ok(Count(count))
    }

    fn as_f64(self) -> f64 {
        self.0 as f64
    }

    fn literal(self) -> Literal {
        Literal::Unsigned(self.0)
    }

    fn is_valid(self) -> bool {
        true
    }
}

/// A relative frequency in `[0, 1]`.
///
/// Every value outside the crate has passed validation: construction goes
/// through [`Probability::new`], including deserialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    pub fn new(value: f64) -> Result<Self> {
        Probability(positive_zero(value)).validate()
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Representation for Probability {
    const NAME: &'static str = "probability";
    const TAG: u8 = 1;
    const ZERO: Self = Probability(0.0);
    const MIN: f64 = 0.0;
    const MAX: f64 = 1.0;
    const PRIMITIVE: Primitive = Primitive::F64;

    fn from_count(count: u64, total: u64) -> Result<Self> {
        if total == 0 {
            return Probability::new(f64::NAN);
        }
        if count == total {
            return Ok(Probability(1.0));
        }
        Probability::new(count as f64 / total as f64)
    }

    fn as_f64(self) -> f64 {
        self.0
    }

    fn literal(self) -> Literal {
        Literal::Float(self.0)
    }

    fn is_valid(self) -> bool {
        self.0 >= Self::MIN && self.0 <= Self::MAX + EPSILON
    }
}

/// The natural log of a probability, in `(-inf, 0]`. Negative infinity
/// stands for a zero count.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct LogProbability(f64);

impl LogProbability {
    pub fn new(value: f64) -> Result<Self> {
        LogProbability(positive_zero(value)).validate()
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for LogProbability {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Representation for LogProbability {
    const NAME: &'static str = "log-probability";
    const TAG: u8 = 2;
    const ZERO: Self = LogProbability(f64::NEG_INFINITY);
    const MIN: f64 = f64::NEG_INFINITY;
    const MAX: f64 = 0.0;
    const PRIMITIVE: Primitive = Primitive::F64;

    fn from_count(count: u64, total: u64) -> Result<Self> {
        if count == 0 {
            return Ok(Self::ZERO);
        }
        if count == total {
            return Ok(LogProbability(0.0));
        }
        // ln(c) - ln(T) rather than ln(c / T) to skip one rounding step.
        LogProbability::new((count as f64).ln() - (total as f64).ln())
    }

    fn as_f64(self) -> f64 {
        self.0
    }

    fn literal(self) -> Literal {
        Literal::Float(self.0)
    }

    fn is_valid(self) -> bool {
        // NaN fails the comparison.
        self.0 <= Self::MAX + EPSILON
    }
}

/// `-0.0` compares equal to `0.0` but prints as `-0`, which generated
/// source would read back as `+0`.
fn positive_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

macro_rules! float_conversions {
    ($($representation:ident),*) => {$(
        impl TryFrom<f64> for $representation {
            type Error = Error;

            fn try_from(value: f64) -> Result<Self> {
                $representation::new(value)
            }
        }

        impl From<$representation> for f64 {
            fn from(value: $representation) -> f64 {
                value.0
            }
        }
    )*};
}

float_conversions!(Probability, LogProbability);
