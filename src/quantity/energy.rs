use std::ops::{Div, Mul};

use crate::quantity::{
    power::Kilowatts,
    price::{Cost, KilowattHourPrice},
    proportions::Percent,
    time::Hours,
};

quantity!(KilowattHours, via: f64, suffix: "kWh", precision: 2);
zero!(KilowattHours);
abs!(KilowattHours);

impl KilowattHours {
    pub const ONE_WATT_HOUR: Self = Self(0.001);
}

impl Mul<Percent> for KilowattHours {
    type Output = Self;

    fn mul(self, percent: Percent) -> Self::Output {
        self * percent.to_ratio()
    }
}

impl Mul<KilowattHourPrice> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourPrice) -> Self::Output {
        Cost(self.0 * rhs.0)
    }
}

impl Div<Kilowatts> for KilowattHours {
    type Output = Hours;

    fn div(self, rhs: Kilowatts) -> Self::Output {
        Hours(self.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn percent_of_capacity() {
        assert_abs_diff_eq!((KilowattHours(13.6) * Percent(25.0)).0, 3.4);
    }

    #[test]
    fn time_to_charge() {
        assert_abs_diff_eq!((KilowattHours(3.0) / Kilowatts(2.0)).0, 1.5);
    }

    #[test]
    fn ordering() {
        assert!(KilowattHours(1.0) < KilowattHours(2.0));
        assert_eq!(KilowattHours(-1.0).max(KilowattHours::ZERO), KilowattHours::ZERO);
    }
}
