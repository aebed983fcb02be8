//! # Unit Types
//!
//! Lightweight newtype wrappers for the handful of units that cross the
//! engine boundary. They serialize as bare numbers.
//!
//! ## SI Units
//!
//! The engine works in SI throughout:
//! - Length: metres (m); frost heave is reported in centimetres (cm)
//! - Time: hours (h) for the freezing period; days are accepted at the edges
//!
//! ## Example
//!
//! ```rust
//! use frost_core::units::{Centimeters, Days, Hours, Meters};
//!
//! let heave: Centimeters = Meters(0.0125).into();
//! assert!((heave.0 - 1.25).abs() < 1e-12);
//!
//! let period: Hours = Days(151.0).into();
//! assert_eq!(period.0, 3624.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in centimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

// ============================================================================
// Time Units
// ============================================================================

/// Duration in hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hours(pub f64);

/// Duration in days
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Days(pub f64);

impl From<Days> for Hours {
    fn from(d: Days) -> Self {
        Hours(d.0 * 24.0)
    }
}

impl From<Hours> for Days {
    fn from(h: Hours) -> Self {
        Days(h.0 / 24.0)
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Centimeters);
impl_arithmetic!(Hours);
impl_arithmetic!(Days);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_to_centimeters() {
        let cm: Centimeters = Meters(0.85).into();
        assert!((cm.0 - 85.0).abs() < 1e-9);
        let back: Meters = cm.into();
        assert!((back.0 - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_days_to_hours() {
        let h: Hours = Days(2.5).into();
        assert_eq!(h.0, 60.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Meters(1.0);
        let b = Meters(0.25);
        assert_eq!((a + b).0, 1.25);
        assert_eq!((a - b).0, 0.75);
        assert_eq!((b * 2.0).value(), 0.5);
        assert_eq!((a / 4.0).value(), 0.25);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Hours(3624.0)).unwrap();
        assert_eq!(json, "3624.0");
        let roundtrip: Hours = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, Hours(3624.0));
    }
}
