use chrono::Timelike;
use itertools::Itertools;
use serde::Serialize;

use crate::{core::history::EnergyStats, prelude::*, quantity::energy::KilowattHours};

/// Average solar production and home load within one hour of a day.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HourlyProfile {
    pub solar: KilowattHours,
    pub load: KilowattHours,

    /// Number of samples the averages are taken over.
    pub n_samples: usize,

    /// Whether a single outlier got excluded from the averages.
    pub has_outlier: bool,
}

impl HourlyProfile {
    /// Expected net load: positive is drawn from the battery, negative is surplus.
    pub fn net_load(&self, solar_ratio: f64) -> KilowattHours {
        self.load - self.solar * solar_ratio
    }
}

/// Hour-of-day energy profile built from the history.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct HourlyModel([Option<HourlyProfile>; 24]);

impl HourlyModel {
    /// Group the history by the local hour of day and average each group.
    ///
    /// Hours without any samples stay empty.
    #[instrument(skip_all, fields(n_samples = history.len()))]
    pub fn build(history: &[EnergyStats], outlier_multiplier: f64) -> Self {
        let mut hourly = [None; 24];
        for (hour, samples) in history.iter().into_group_map_by(|stats| stats.hour.hour()) {
            hourly[hour as usize] = Some(Self::average(&samples, outlier_multiplier));
        }
        let this = Self(hourly);
        debug!(n_hours = this.len(), "built the hourly model");
        this
    }

    /// Profile on the specified hour of day, zero when unknown.
    pub fn on_hour(&self, hour: u32) -> HourlyProfile {
        self.get(hour).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, hour: u32) -> Option<&HourlyProfile> {
        self.0.get(hour as usize)?.as_ref()
    }

    /// Known profiles ordered by hour of day.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &HourlyProfile)> {
        (0..).zip(&self.0).filter_map(|(hour, profile)| Some((hour, profile.as_ref()?)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn average(samples: &[&EnergyStats], outlier_multiplier: f64) -> HourlyProfile {
        // Only a lone outlier is dropped, several of them likely are a real pattern:
        let excluded = match Self::find_outliers(samples, outlier_multiplier).as_slice() {
            [index] => Some(*index),
            _ => None,
        };
        if let Some(index) = excluded {
            trace!(hour = ?samples[index].hour, load = ?samples[index].home, "excluding the outlier");
        }

        let (n_samples, solar, load) = samples
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != excluded)
            .fold((0_usize, KilowattHours::ZERO, KilowattHours::ZERO), |(n, solar, load), (_, stats)| {
                (n + 1, solar + stats.solar, load + stats.home)
            });

        #[expect(clippy::cast_precision_loss)]
        let divisor = n_samples.max(1) as f64;
        HourlyProfile {
            solar: solar / divisor,
            load: load / divisor,
            n_samples,
            has_outlier: excluded.is_some(),
        }
    }

    /// Indices of the samples whose load exceeds the mean load of all the other samples
    /// multiplied by the outlier multiplier.
    fn find_outliers(samples: &[&EnergyStats], outlier_multiplier: f64) -> Vec<usize> {
        if samples.len() < 3 || outlier_multiplier <= 0.0 {
            return Vec::new();
        }
        let total_load: KilowattHours = samples.iter().map(|stats| stats.home).sum();
        #[expect(clippy::cast_precision_loss)]
        let n_others = (samples.len() - 1) as f64;
        samples
            .iter()
            .positions(|stats| {
                let mean_of_others = (total_load - stats.home) / n_others;
                stats.home > mean_of_others * outlier_multiplier
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{Local, TimeDelta, TimeZone};

    use super::*;

    /// Samples on the same hour of consecutive days.
    fn samples(loads: &[f64]) -> Vec<EnergyStats> {
        let start = Local.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap();
        (0..)
            .zip(loads)
            .map(|(day, load)| {
                EnergyStats::builder()
                    .hour(start + TimeDelta::days(day))
                    .solar(KilowattHours(0.5))
                    .home(KilowattHours(*load))
                    .build()
            })
            .collect()
    }

    #[test]
    fn single_outlier_is_excluded() {
        let model = HourlyModel::build(&samples(&[1.0, 1.0, 1.0, 10.0]), 2.0);
        let profile = model.get(18).unwrap();
        assert!(profile.has_outlier);
        assert_eq!(profile.n_samples, 3);
        assert_abs_diff_eq!(profile.load.0, 1.0);
        assert_abs_diff_eq!(profile.solar.0, 0.5);
    }

    #[test]
    fn multiple_outliers_are_kept() {
        let model = HourlyModel::build(&samples(&[1.0, 1.0, 10.0, 10.0]), 2.0);
        let profile = model.get(18).unwrap();
        assert!(!profile.has_outlier);
        assert_eq!(profile.n_samples, 4);
        assert_abs_diff_eq!(profile.load.0, 5.5);
    }

    #[test]
    fn small_bucket_is_kept() {
        let model = HourlyModel::build(&samples(&[1.0, 10.0]), 2.0);
        assert_abs_diff_eq!(model.on_hour(18).load.0, 5.5);
    }

    #[test]
    fn disabled_rejection() {
        let model = HourlyModel::build(&samples(&[1.0, 1.0, 1.0, 10.0]), 0.0);
        assert_eq!(model.on_hour(18).n_samples, 4);
        assert_abs_diff_eq!(model.on_hour(18).load.0, 3.25);
    }

    #[test]
    fn missing_hour_is_zero() {
        let model = HourlyModel::build(&samples(&[1.0]), 2.0);
        assert_eq!(model.len(), 1);
        assert!(model.get(3).is_none());
        assert_eq!(model.on_hour(3), HourlyProfile::default());
    }

    #[test]
    fn empty_history() {
        assert!(HourlyModel::build(&[], 3.0).is_empty());
    }

    #[test]
    fn iterates_in_hour_order() {
        let start = Local.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
        let history = [5, 1, 3].map(|hour| {
            EnergyStats::builder()
                .hour(start - TimeDelta::hours(hour))
                .solar(KilowattHours::ZERO)
                .home(KilowattHours(1.0))
                .build()
        });
        let hours = HourlyModel::build(&history, 3.0).iter().map(|(hour, _)| hour).collect_vec();
        assert_eq!(hours, [15, 17, 19]);
    }
}
