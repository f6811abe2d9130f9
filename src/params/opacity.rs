use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpacityError {
    #[error("opacity fraction {0} is outside 0.0..=1.0")]
    FractionOutOfRange(f64),
}

/// Background opacity as an integer percentage (0..=100).
///
/// This is the only representation used inside the crate. Peers that send a
/// floating-point fraction are converted on the way in: any JSON float in
/// `0.0..=1.0` is read as a fraction and rounded to the nearest percent,
/// while JSON integers are always percentages. A float above `1.0` is taken
/// as a percentage and rounded. Out-of-range numbers are clamped to
/// `0..=100` rather than rejected, so one odd field never costs a whole
/// window-appearance message. The wire form we emit is always the integer
/// percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opacity(u8);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(100);
    pub const MAX: u8 = 100;

    /// Clamps into range.
    pub fn percent(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn from_fraction(fraction: f64) -> Result<Self, OpacityError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(OpacityError::FractionOutOfRange(fraction));
        }
        Ok(Self((fraction * 100.0).round() as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn saturating_add(self, step: u8) -> Self {
        Self::percent(self.0.saturating_add(step))
    }

    pub fn saturating_sub(self, step: u8) -> Self {
        Self(self.0.saturating_sub(step))
    }
}

impl fmt::Display for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Serialize for Opacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireOpacity {
    Percent(i64),
    Float(f64),
}

impl From<WireOpacity> for Opacity {
    fn from(wire: WireOpacity) -> Self {
        let max = f64::from(Self::MAX);
        match wire {
            WireOpacity::Percent(p) => Self(p.clamp(0, i64::from(Self::MAX)) as u8),
            WireOpacity::Float(f) => Self::from_fraction(f).unwrap_or_else(|_| {
                if f > 1.0 {
                    Self(f.round().min(max) as u8)
                } else {
                    // negative or NaN
                    Self(0)
                }
            }),
        }
    }
}

impl<'de> Deserialize<'de> for Opacity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireOpacity::deserialize(deserializer).map(Self::from)
    }
}
