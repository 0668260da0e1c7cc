//! Rounding policy for settlement amounts.
//!
//! All computation runs at full `Decimal` precision. Rounding is applied
//! exactly once, to each final transfer amount, and the same rounded value
//! decides whether a pair is considered settled.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How midpoints are resolved when rounding to the policy scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// 0.125 -> 0.13, -0.125 -> -0.13.
    #[default]
    HalfAwayFromZero,
    /// Banker's rounding: 0.125 -> 0.12, 0.135 -> 0.14.
    HalfEven,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::HalfAwayFromZero => write!(f, "half-up"),
            RoundingMode::HalfEven => write!(f, "half-even"),
        }
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "half-up" | "half-away-from-zero" => Ok(RoundingMode::HalfAwayFromZero),
            "half-even" | "bankers" => Ok(RoundingMode::HalfEven),
            other => Err(format!("unknown rounding mode '{other}'")),
        }
    }
}

/// Most decimal places a `Decimal` can carry.
pub const MAX_SCALE: u32 = 28;

/// Scale and midpoint rule applied to settlement output.
///
/// # Examples
///
/// ```
/// use expense_settlement::settlement::rounding::{RoundingMode, RoundingPolicy};
/// use rust_decimal_macros::dec;
///
/// let policy = RoundingPolicy::default();
/// assert_eq!(policy.round(dec!(0.335)), dec!(0.34));
///
/// let bankers = RoundingPolicy::new(2, RoundingMode::HalfEven);
/// assert_eq!(bankers.round(dec!(0.335)), dec!(0.34));
/// assert_eq!(bankers.round(dec!(0.345)), dec!(0.34));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundingPolicy {
    /// Decimal places kept, e.g. 2 for cents. At most [`MAX_SCALE`].
    pub scale: u32,
    pub mode: RoundingMode,
}

impl RoundingPolicy {
    /// Scales above [`MAX_SCALE`] are clamped to it.
    pub fn new(scale: u32, mode: RoundingMode) -> Self {
        Self {
            scale: scale.min(MAX_SCALE),
            mode,
        }
    }

    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.scale, self.mode.strategy())
    }

    /// Largest error a single rounding step can introduce.
    ///
    /// Zero from [`MAX_SCALE`] up: rounding to the full precision of a
    /// `Decimal` never changes it.
    pub fn half_unit(&self) -> Decimal {
        if self.scale >= MAX_SCALE {
            return Decimal::ZERO;
        }
        Decimal::new(5, self.scale + 1)
    }
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            scale: 2,
            mode: RoundingMode::HalfAwayFromZero,
        }
    }
}
