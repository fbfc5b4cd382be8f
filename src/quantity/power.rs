use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
    str::FromStr,
};

use crate::{
    core::{Diagnosed, SizingError, Warning},
    quantity::{Quantity, energy::KilowattHours, time::Hours},
};

pub type Kilowatts = Quantity<1, 0>;

impl Kilowatts {
    pub const fn from_watts(watts: f64) -> Self {
        Self(watts / 1000.0)
    }
}

impl Display for Kilowatts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kW", self.0)
    }
}

impl Debug for Kilowatts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kW", self.0)
    }
}

impl Mul<Hours> for Kilowatts {
    type Output = KilowattHours;

    fn mul(self, rhs: Hours) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}

/// Power unit of a meter reading.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PowerUnit {
    Kilowatt,
    Watt,
    Milliwatt,
    Microwatt,
}

impl PowerUnit {
    /// How many of this unit make one kilowatt.
    pub const fn per_kilowatt(self) -> f64 {
        match self {
            Self::Kilowatt => 1.0,
            Self::Watt => 1_000.0,
            Self::Milliwatt => 1_000_000.0,
            Self::Microwatt => 1_000_000_000.0,
        }
    }
}

impl FromStr for PowerUnit {
    type Err = SizingError;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit {
            "kW" => Ok(Self::Kilowatt),
            "W" => Ok(Self::Watt),
            "mW" => Ok(Self::Milliwatt),
            // Micro sign and Greek small mu look the same but are different code points:
            "\u{b5}W" | "\u{3bc}W" => Ok(Self::Microwatt),
            _ => Err(SizingError::UnknownUnit { value: unit.to_owned(), unit: unit.to_owned() }),
        }
    }
}

/// Parse a reading like `1.5 kW` or `250 W`.
///
/// A bare number is read as watts, and the result then carries [`Warning::MissingUnit`].
pub fn parse_reading(raw: &str) -> Result<Diagnosed<Kilowatts>, SizingError> {
    let invalid_number = || SizingError::InvalidNumber { value: raw.to_owned() };

    let mut tokens = raw.split_whitespace();
    let magnitude = tokens.next().ok_or_else(invalid_number)?;
    let unit = tokens.next();
    if tokens.next().is_some() {
        return Err(invalid_number());
    }
    let magnitude = magnitude.parse::<f64>().map_err(|_| invalid_number())?;
    if !magnitude.is_finite() {
        return Err(invalid_number());
    }

    match unit {
        Some(unit) => {
            let unit = unit.parse::<PowerUnit>().map_err(|_| SizingError::UnknownUnit {
                value: raw.to_owned(),
                unit: unit.to_owned(),
            })?;
            Ok(Diagnosed::new(Kilowatts::from(magnitude / unit.per_kilowatt())))
        }
        None => Ok(Diagnosed::new(Kilowatts::from_watts(magnitude))
            .with_warning(Warning::MissingUnit { n_values: 1 })),
    }
}
