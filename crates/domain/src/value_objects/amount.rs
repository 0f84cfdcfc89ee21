//! Numeric value of a game quantity

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// An integer or fractional quantity value.
///
/// Equality is numeric, so `Int(5) == Float(5.0)`. Use [`Amount::normalized`]
/// to collapse integer-valued floats before storing. NaN and infinities have
/// no JSON form, so [`Amount::finite`] must pass before a value is stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawAmount")]
pub enum Amount {
    Int(i64),
    Float(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Int(i64),
    Float(f64),
}

impl TryFrom<RawAmount> for Amount {
    type Error = DomainError;

    fn try_from(raw: RawAmount) -> Result<Self, Self::Error> {
        match raw {
            RawAmount::Int(i) => Ok(Self::Int(i)),
            RawAmount::Float(f) => Self::Float(f).finite(),
        }
    }
}

impl Amount {
    pub const ZERO: Amount = Amount::Int(0);

    /// Reject NaN and infinities.
    pub fn finite(self) -> Result<Self, DomainError> {
        match self {
            Self::Float(f) if !f.is_finite() => Err(DomainError::validation(format!(
                "Quantity values must be finite numbers, got {f}"
            ))),
            other => Ok(other),
        }
    }

    /// Integer-valued floats become `Int`; everything else is unchanged.
    pub fn normalized(self) -> Self {
        match self {
            Self::Float(f)
                if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
            {
                Self::Int(f as i64)
            }
            other => other,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Self::Int(_))
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}
