use itertools::Itertools;

use crate::quantity::{energy::KilowattHours, power::Kilowatts, time::Hours};

impl<T> Integrate for T where T: ?Sized {}

pub trait Integrate {
    /// Trapezoidal integral over evenly spaced samples.
    ///
    /// Fewer than two samples integrate to zero.
    fn trapezoid(self, dx: Hours) -> KilowattHours
    where
        Self: Iterator<Item = Kilowatts> + Sized,
    {
        self.tuple_windows().map(|(left, right)| (left + right) / 2.0).sum::<Kilowatts>() * dx
    }

    /// Left Riemann sum over evenly spaced samples.
    fn riemann(self, dx: Hours) -> KilowattHours
    where
        Self: Iterator<Item = Kilowatts> + Sized,
    {
        self.sum::<Kilowatts>() * dx
    }
}
