//! Phasor geometry shared by the CT verification and the phasor diagram.
//!
//! Angles are in degrees on the way in and out; trigonometry happens in
//! radians via [`Degrees::to_radians`]. Coordinates keep the input phase
//! order so a renderer can zip them with the label sets.

use num_complex::Complex64;
use serde::Serialize;
use tft_core::{Degrees, Phase, PhaseAngles, TftError, TftResult};

/// Wrap an angle in degrees into (-180°, 180°].
pub fn normalize_angle(degrees: f64) -> f64 {
    Degrees(degrees).normalized().value()
}

/// Polar phasor with magnitude and angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Phasor {
    pub magnitude: f64,
    pub angle: Degrees,
}

impl Phasor {
    pub fn new(magnitude: f64, angle: Degrees) -> Self {
        Self { magnitude, angle }
    }

    /// Rectangular coordinates `(magnitude·cos θ, magnitude·sin θ)`
    pub fn to_xy(self) -> (f64, f64) {
        let theta = self.angle.to_radians();
        (self.magnitude * theta.cos(), self.magnitude * theta.sin())
    }

    pub fn to_complex(self) -> Complex64 {
        let (x, y) = self.to_xy();
        Complex64::new(x, y)
    }

    pub fn from_complex(z: Complex64) -> Self {
        let (magnitude, angle) = magnitude_angle(z);
        Self { magnitude, angle }
    }
}

/// Magnitude and normalized angle of a complex value.
pub fn magnitude_angle(z: Complex64) -> (f64, Degrees) {
    (z.norm(), Degrees(z.arg().to_degrees()).normalized())
}

/// Rectangular coordinates of three equal-magnitude phasors, in A-B-C order.
///
/// The magnitude must be finite and non-negative.
pub fn phasor_coordinates(angles: &PhaseAngles, magnitude: f64) -> TftResult<[(f64, f64); 3]> {
    if !magnitude.is_finite() {
        return Err(TftError::arithmetic_domain("phasor_magnitude", magnitude));
    }
    if magnitude < 0.0 {
        return Err(TftError::invalid_input(
            "phasor_magnitude",
            format!("must not be negative, got {magnitude}"),
        ));
    }
    Ok(Phase::ALL.map(|phase| Phasor::new(magnitude, angles[phase]).to_xy()))
}

/// Which label set a diagram trace uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winding {
    /// IA, IB, IC
    Primary,
    /// Ia, Ib, Ic
    Secondary,
}

impl Winding {
    pub fn label(self, phase: Phase) -> &'static str {
        match self {
            Winding::Primary => phase.primary_label(),
            Winding::Secondary => phase.secondary_label(),
        }
    }
}

/// One labelled phasor tip for diagram rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhasorPoint {
    pub label: &'static str,
    pub angle_deg: f64,
    pub x: f64,
    pub y: f64,
}

/// Labelled coordinate set for one winding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhasorTrace {
    pub winding: Winding,
    pub points: Vec<PhasorPoint>,
}

impl PhasorTrace {
    pub fn new(winding: Winding, angles: &PhaseAngles, magnitude: f64) -> TftResult<Self> {
        let coords = phasor_coordinates(angles, magnitude)?;
        let points = Phase::ALL
            .iter()
            .zip(coords)
            .map(|(&phase, (x, y))| PhasorPoint {
                label: winding.label(phase),
                angle_deg: angles[phase].value(),
                x,
                y,
            })
            .collect();
        Ok(Self { winding, points })
    }
}

/// Line-to-line differences `[V_A - V_B, V_B - V_C, V_C - V_A]` of three
/// phase quantities given as rectangular coordinates.
pub fn line_to_line(phases: &[(f64, f64); 3]) -> [Complex64; 3] {
    let [a, b, c] = (*phases).map(|(x, y)| Complex64::new(x, y));
    [a - b, b - c, c - a]
}
