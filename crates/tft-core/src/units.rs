//! Compile-time unit safety for transformer test quantities.
//!
//! Nameplate data mixes kilovolts with volts and megavolt-amperes with
//! kilovolt-amperes; the test voltage is entered in volts while the nameplate
//! voltage is in kilovolts. Wrapping each quantity in its own newtype keeps
//! those scales from being mixed silently.
//!
//! All types use `#[repr(transparent)]` and compile down to a bare `f64`.
//!
//! # Usage
//!
//! ```
//! use tft_core::units::{Degrees, Kilovolts, Percent};
//!
//! let base = Kilovolts(13.8).to_volts();
//! assert_eq!(base.value(), 13_800.0);
//!
//! let z = Percent(5.0).to_per_unit();
//! assert_eq!(z.value(), 0.05);
//!
//! let angle = Degrees(190.0).normalized();
//! assert_eq!(angle.value(), -170.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Implements arithmetic and accessors shared by every unit type
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
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

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
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

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Unit symbol used in reports
            pub const UNIT: &'static str = $unit_name;

            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Strictly positive and finite
            #[inline]
            pub fn is_positive(self) -> bool {
                self.0.is_finite() && self.0 > 0.0
            }
        }
    };
}

// =============================================================================
// Ratios
// =============================================================================

/// Quantity in percent of a rated base (nameplate impedance)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(pub f64);

impl_unit_ops!(Percent, "%");

/// Dimensionless per-unit quantity
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerUnit(pub f64);

impl_unit_ops!(PerUnit, "pu");

impl Percent {
    #[inline]
    pub fn to_per_unit(self) -> PerUnit {
        PerUnit(self.0 / 100.0)
    }
}

// =============================================================================
// Voltage
// =============================================================================

/// Voltage in volts (V); the short-circuit test voltage is entered in volts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Volts(pub f64);

impl_unit_ops!(Volts, "V");

/// Voltage in kilovolts (kV); nameplate line-to-line voltages
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl_unit_ops!(Kilovolts, "kV");

impl Kilovolts {
    #[inline]
    pub fn to_volts(self) -> Volts {
        Volts(self.0 * 1000.0)
    }
}

// =============================================================================
// Current
// =============================================================================

/// Current in amperes (A)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A");

// =============================================================================
// Apparent Power
// =============================================================================

/// Apparent power in megavolt-amperes (MVA); nameplate rating
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MegavoltAmperes(pub f64);

impl_unit_ops!(MegavoltAmperes, "MVA");

/// Apparent power in kilovolt-amperes (kVA); power drawn during the test
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KilovoltAmperes(pub f64);

impl_unit_ops!(KilovoltAmperes, "kVA");

impl MegavoltAmperes {
    /// Rating in volt-amperes
    #[inline]
    pub fn to_volt_amperes(self) -> f64 {
        self.0 * 1e6
    }
}

impl KilovoltAmperes {
    #[inline]
    pub fn from_volt_amperes(va: f64) -> Self {
        Self(va / 1000.0)
    }
}

// =============================================================================
// Angle Units
// =============================================================================

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

/// Angle in degrees; measured CT angles are entered in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

impl Radians {
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }

    #[inline]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    #[inline]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }
}

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }

    /// Wrap into (-180°, 180°].
    ///
    /// Computes `((a + 180) mod 360) - 180` with a floored modulo, then folds
    /// the lower bound -180 onto +180 so the interval is open below.
    #[inline]
    pub fn normalized(self) -> Self {
        let wrapped = (self.0 + 180.0).rem_euclid(360.0) - 180.0;
        if wrapped <= -180.0 {
            Degrees(180.0)
        } else {
            Degrees(wrapped)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voltage_scaling() {
        assert_eq!(Kilovolts(13.8).to_volts().value(), 13_800.0);
        assert_eq!(Kilovolts(0.38).to_volts(), Volts(380.0));
    }

    #[test]
    fn test_percent_to_per_unit() {
        assert_eq!(Percent(5.0).to_per_unit(), PerUnit(0.05));
        assert_eq!(Percent(100.0).to_per_unit(), PerUnit(1.0));
    }

    #[test]
    fn test_power_scaling() {
        assert_eq!(MegavoltAmperes(10.0).to_volt_amperes(), 10e6);
        assert_eq!(KilovoltAmperes::from_volt_amperes(1500.0).value(), 1.5);
    }

    #[test]
    fn test_angle_conversion() {
        let rad = Degrees(180.0).to_radians();
        assert!((rad.value() - std::f64::consts::PI).abs() < 1e-12);
        assert!((rad.to_degrees().value() - 180.0).abs() < 1e-12);
        assert!((Degrees(30.0).to_radians().sin() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_range() {
        for raw in [-720.0, -540.0, -181.0, -180.0, -1.0, 0.0, 179.9, 180.0, 181.0, 540.0] {
            let n = Degrees(raw).normalized().value();
            assert!(n > -180.0 && n <= 180.0, "{raw} -> {n}");
        }
        assert_eq!(Degrees(-180.0).normalized().value(), 180.0);
        assert_eq!(Degrees(270.0).normalized().value(), -90.0);
        assert_eq!(Degrees(-150.0).normalized().value(), -150.0);
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in [-1000.5, -180.0, -30.0, 0.0, 90.0, 180.0, 359.0, 725.25] {
            let once = Degrees(raw).normalized();
            assert_eq!(once.normalized(), once);
        }
    }

    #[test]
    fn test_is_positive() {
        assert!(Volts(1.0).is_positive());
        assert!(!Volts(0.0).is_positive());
        assert!(!Volts(-3.0).is_positive());
        assert!(!Volts(f64::NAN).is_positive());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Amperes(606.25)), "606.2500 A");
        assert_eq!(format!("{}", Degrees(45.0)), "45.0000 °");
        assert_eq!(format!("{}", PerUnit(1.0)), "1.0000 pu");
    }
}
