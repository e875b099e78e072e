//! Line-item quantity that can never drop below one.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A cart line quantity, always `>= 1`.
///
/// Every constructor clamps: zero and negative inputs become `1`, values
/// beyond `u32::MAX` saturate. Decrementing a line therefore never removes
/// it; removal is a separate explicit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// The minimum quantity.
    pub const ONE: Self = Self(1);

    /// Build a quantity from any signed integer, clamping to `1..=u32::MAX`.
    #[must_use]
    pub fn clamped(n: i64) -> Self {
        if n < 1 {
            Self::ONE
        } else {
            u32::try_from(n).map_or(Self(u32::MAX), Self)
        }
    }

    /// The numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add `other`, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    /// Persisted data may hold `0` or negative values written by older
    /// clients; they are clamped rather than rejected. Integer strings are
    /// read as integers; any other value reads as one.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        Ok(raw.map_or(Self::ONE, Self::clamped))
    }
}
