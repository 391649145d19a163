//! Three-phase labels and angle triples.
//!
//! Phases are indexed A, B, C. The primary side renders them as `IA IB IC`
//! and the secondary side as `Ia Ib Ic`; both label sets refer to the same
//! [`Phase`] values so a measured triple and its expected secondary triple
//! line up index for index.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::error::{TftError, TftResult};
use crate::units::Degrees;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    A,
    B,
    C,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];

    /// Primary-side current label
    pub fn primary_label(self) -> &'static str {
        match self {
            Phase::A => "IA",
            Phase::B => "IB",
            Phase::C => "IC",
        }
    }

    /// Secondary-side current label
    pub fn secondary_label(self) -> &'static str {
        match self {
            Phase::A => "Ia",
            Phase::B => "Ib",
            Phase::C => "Ic",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.secondary_label())
    }
}

impl FromStr for Phase {
    type Err = TftError;

    /// Accepts `a`, `Ia`, `IA` and the like, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let letter = trimmed.strip_prefix('i').unwrap_or(&trimmed);
        match letter {
            "a" => Ok(Phase::A),
            "b" => Ok(Phase::B),
            "c" => Ok(Phase::C),
            _ => Err(TftError::Parse(format!("unknown phase '{}'", s.trim()))),
        }
    }
}

/// Ordered assignment of secondary phases to the three CT positions
pub type PhaseOrder = [Phase; 3];

/// Reference order Ia–Ib–Ic
pub const EXPECTED_ORDER: PhaseOrder = [Phase::A, Phase::B, Phase::C];

/// Parse `"Ia,Ib,Ic"` (or `"a b c"`) into a phase order.
pub fn parse_phase_order(s: &str) -> TftResult<PhaseOrder> {
    let phases = s
        .split(|c: char| c == ',' || c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::parse::<Phase>)
        .collect::<TftResult<Vec<_>>>()?;
    match phases.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(TftError::Parse(format!(
            "phase order needs exactly three phases, got {}",
            phases.len()
        ))),
    }
}

/// Angles of the three phases, each finite and normalized to (-180°, 180°].
///
/// Deserialized values go through [`PhaseAngles::new`], so out-of-range
/// angles are wrapped and non-finite ones are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPhaseAngles")]
pub struct PhaseAngles {
    a: Degrees,
    b: Degrees,
    c: Degrees,
}

#[derive(Deserialize)]
struct RawPhaseAngles {
    a: f64,
    b: f64,
    c: f64,
}

impl TryFrom<RawPhaseAngles> for PhaseAngles {
    type Error = TftError;

    fn try_from(raw: RawPhaseAngles) -> TftResult<Self> {
        Self::new(raw.a, raw.b, raw.c)
    }
}

fn finite_angle(field: &'static str, value: f64) -> TftResult<Degrees> {
    if value.is_finite() {
        Ok(Degrees(value).normalized())
    } else {
        Err(TftError::arithmetic_domain(field, value))
    }
}

impl PhaseAngles {
    /// Build from raw degrees, normalizing each value. NaN and infinite
    /// angles are a [`TftError::ArithmeticDomain`] error.
    pub fn new(a: f64, b: f64, c: f64) -> TftResult<Self> {
        Ok(Self {
            a: finite_angle("angle_ia", a)?,
            b: finite_angle("angle_ib", b)?,
            c: finite_angle("angle_ic", c)?,
        })
    }

    /// Build from operator-entered angles, which must lie in [-180°, 180°].
    pub fn measured(a: f64, b: f64, c: f64) -> TftResult<Self> {
        for (field, value) in [("angle_ia", a), ("angle_ib", b), ("angle_ic", c)] {
            if !value.is_finite() || !(-180.0..=180.0).contains(&value) {
                return Err(TftError::invalid_input(
                    field,
                    format!("must be within [-180, 180] degrees, got {value}"),
                ));
            }
        }
        Self::new(a, b, c)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.a.value(), self.b.value(), self.c.value()]
    }

    /// Apply `f` to each angle, renormalizing the result
    pub fn map(&self, f: impl Fn(Degrees) -> Degrees) -> TftResult<Self> {
        Self::new(f(self.a).value(), f(self.b).value(), f(self.c).value())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Phase, Degrees)> + '_ {
        Phase::ALL.into_iter().map(move |phase| (phase, self[phase]))
    }
}

impl Index<Phase> for PhaseAngles {
    type Output = Degrees;

    fn index(&self, phase: Phase) -> &Self::Output {
        match phase {
            Phase::A => &self.a,
            Phase::B => &self.b,
            Phase::C => &self.c,
        }
    }
}
