//! JSON number representation
//!
//! Integers keep their exact 64-bit value; everything else is an `f64`.
//! Non-finite floats are not representable in JSON and are rejected at the
//! construction boundary.

use std::fmt;

/// A JSON number
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Non-negative integer
    PosInt(u64),
    /// Negative integer
    NegInt(i64),
    /// Finite floating-point value
    Float(f64),
}

impl Number {
    /// Build from a float, rejecting NaN and infinities
    pub fn from_f64(value: f64) -> Option<Self> {
        value.is_finite().then_some(Number::Float(value))
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::PosInt(n) => i64::try_from(n).ok(),
            Number::NegInt(n) => Some(n),
            Number::Float(_) => None,
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        match self {
            Number::PosInt(n) => Some(n),
            Number::NegInt(n) => u64::try_from(n).ok(),
            Number::Float(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::PosInt(n) => n as f64,
            Number::NegInt(n) => n as f64,
            Number::Float(f) => f,
        }
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, Number::Float(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::PosInt(n) => write!(f, "{n}"),
            Number::NegInt(n) => write!(f, "{n}"),
            // Keep a fractional part so the value reads back as a float
            Number::Float(v) if v == v.trunc() && v.is_finite() => write!(f, "{v:.1}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        if value >= 0 {
            Number::PosInt(value as u64)
        } else {
            Number::NegInt(value)
        }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::PosInt(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::from(i64::from(value))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::PosInt(u64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_render_exactly() {
        assert_eq!(Number::from(42i64).to_string(), "42");
        assert_eq!(Number::from(-7i64).to_string(), "-7");
        assert_eq!(Number::PosInt(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn whole_floats_keep_a_fraction() {
        assert_eq!(Number::from_f64(1.0).unwrap().to_string(), "1.0");
        assert_eq!(Number::from_f64(2.5).unwrap().to_string(), "2.5");
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn conversions_respect_sign() {
        assert_eq!(Number::from(-1i64).as_u64(), None);
        assert_eq!(Number::PosInt(7).as_i64(), Some(7));
        assert_eq!(Number::PosInt(u64::MAX).as_i64(), None);
    }
}
