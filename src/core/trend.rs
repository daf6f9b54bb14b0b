use std::{
    cmp::Reverse,
    fmt::{Display, Formatter},
};

use chrono::{DateTime, Local, TimeDelta, Timelike};
use itertools::Itertools;

use crate::{
    core::{history::EnergyStats, model::HourlyModel},
    prelude::*,
    quantity::energy::KilowattHours,
};

/// Today's solar production relative to the modelled expectation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolarTrend(pub f64);

impl SolarTrend {
    pub const NEUTRAL: Self = Self(1.0);

    /// Hard cap of the trend ratio.
    ///
    /// TODO: make it configurable once the intended bound is settled.
    pub const MAX: Self = Self(3.0);

    /// Relative deviation the trend must exceed before it has any effect.
    const SIGNIFICANT_DEVIATION: f64 = 0.1;

    /// Below this, the model expects no sun at all.
    const MIN_EXPECTED_SOLAR: KilowattHours = KilowattHours(0.001);

    /// Compare the two latest hours recorded today with what the model expected for those hours.
    ///
    /// The hours must be consecutive, otherwise there is no trend.
    #[instrument(skip_all)]
    pub fn estimate(history: &[EnergyStats], model: &HourlyModel, now: DateTime<Local>) -> Self {
        let today = now.date_naive();
        let latest = history
            .iter()
            .filter(|stats| stats.hour.date_naive() == today && stats.hour <= now)
            .sorted_by_key(|stats| Reverse(stats.hour))
            .dedup_by(|lhs, rhs| lhs.hour == rhs.hour)
            .take(2)
            .collect_vec();
        let [last, previous] = latest.as_slice() else {
            debug!(n_hours = latest.len(), "not enough hours today, no trend");
            return Self::NEUTRAL;
        };
        if last.hour - previous.hour != TimeDelta::hours(1) {
            debug!(
                last = ?last.hour,
                previous = ?previous.hour,
                "latest hours are not consecutive, no trend",
            );
            return Self::NEUTRAL;
        }

        let actual = last.solar + previous.solar;
        let expected =
            model.on_hour(last.hour.hour()).solar + model.on_hour(previous.hour.hour()).solar;
        if expected < Self::MIN_EXPECTED_SOLAR {
            debug!(?actual, ?expected, "no solar expected, no trend");
            return Self::NEUTRAL;
        }

        let deviation = (actual - expected).abs() / expected;
        let this = if deviation > Self::SIGNIFICANT_DEVIATION {
            Self((actual / expected).min(Self::MAX.0))
        } else {
            Self::NEUTRAL
        };
        debug!(?actual, ?expected, deviation, ratio = this.0, "estimated the solar trend");
        this
    }
}

impl Display for SolarTrend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "×{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn stats(hour: DateTime<Local>, solar: f64) -> EnergyStats {
        EnergyStats::builder()
            .hour(hour)
            .solar(KilowattHours(solar))
            .home(KilowattHours(1.0))
            .build()
    }

    /// Yesterday's 10:00 and 11:00 with 2 kWh of solar each.
    fn yesterday(now: DateTime<Local>) -> Vec<EnergyStats> {
        let yesterday = now - TimeDelta::days(1);
        vec![
            stats(yesterday.with_hour(10).unwrap(), 2.0),
            stats(yesterday.with_hour(11).unwrap(), 2.0),
        ]
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 2, 12, 20, 0).unwrap()
    }

    fn estimate(today: &[(u32, f64)]) -> SolarTrend {
        let now = now();
        let mut history = yesterday(now);
        let model = HourlyModel::build(&history, 0.0);
        history.extend(today.iter().map(|(hour, solar)| stats(now.with_hour(*hour).unwrap(), *solar)));
        SolarTrend::estimate(&history, &model, now)
    }

    #[test]
    fn no_records_today() {
        assert_eq!(estimate(&[]), SolarTrend::NEUTRAL);
    }

    #[test]
    fn single_record_today() {
        assert_eq!(estimate(&[(11, 1.0)]), SolarTrend::NEUTRAL);
    }

    #[test]
    fn cloudy_day() {
        assert_abs_diff_eq!(estimate(&[(10, 1.0), (11, 1.0)]).0, 0.5);
    }

    #[test]
    fn small_deviation_is_ignored() {
        assert_eq!(estimate(&[(10, 2.1), (11, 2.1)]), SolarTrend::NEUTRAL);
    }

    #[test]
    fn capped() {
        assert_abs_diff_eq!(estimate(&[(10, 10.0), (11, 10.0)]).0, 3.0);
    }

    #[test]
    fn latest_hours_win() {
        // The 9:00 record has no model and must not be picked over 10:00 and 11:00:
        assert_abs_diff_eq!(estimate(&[(9, 0.0), (10, 3.0), (11, 3.0)]).0, 1.5);
    }

    #[test]
    fn gap_between_latest_hours() {
        // Taken together, these would cap the trend:
        assert_eq!(estimate(&[(9, 10.0), (11, 1.0)]), SolarTrend::NEUTRAL);
    }

    #[test]
    fn no_sun_expected() {
        let now = now();
        let night = [stats(now.with_hour(1).unwrap(), 0.1), stats(now.with_hour(2).unwrap(), 0.1)];
        assert_eq!(SolarTrend::estimate(&night, &HourlyModel::default(), now), SolarTrend::NEUTRAL);
    }
}
