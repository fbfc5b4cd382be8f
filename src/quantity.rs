pub mod energy;
pub mod power;
pub mod time;

use std::ops::{Div, Mul};

use serde::Serialize;

/// Physical quantity with its dimension encoded in the type: exponents of power and time.
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Sub,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Quantity<const POWER: isize, const TIME: isize>(pub f64);

impl<const POWER: isize, const TIME: isize> Quantity<POWER, TIME> {
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub const fn min(self, rhs: Self) -> Self {
        Self(self.0.min(rhs.0))
    }

    #[must_use]
    pub const fn max(self, rhs: Self) -> Self {
        Self(self.0.max(rhs.0))
    }
}

impl<const POWER: isize, const TIME: isize> Mul<f64> for Quantity<POWER, TIME> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl<const POWER: isize, const TIME: isize> Div<f64> for Quantity<POWER, TIME> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}
