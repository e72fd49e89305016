use chrono::{NaiveDate, NaiveTime};

use super::PrayerType;

/// The five prayer times of one calendar day, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySchedule {
    date: NaiveDate,
    times: [NaiveTime; 5],
}

impl DailySchedule {
    /// `times` is indexed like [`PrayerType::ALL`].
    pub fn new(date: NaiveDate, times: [NaiveTime; 5]) -> Self {
        Self { date, times }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time_of(&self, prayer: PrayerType) -> NaiveTime {
        let idx = PrayerType::ALL
            .iter()
            .position(|p| *p == prayer)
            .unwrap_or(0);
        self.times[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrayerType, NaiveTime)> + '_ {
        PrayerType::ALL.into_iter().zip(self.times.iter().copied())
    }
}

#[cfg(test)]
pub(crate) fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[cfg(test)]
pub(crate) fn sample_schedule(date: NaiveDate) -> DailySchedule {
    DailySchedule::new(
        date,
        [hm(5, 0), hm(12, 30), hm(16, 0), hm(19, 0), hm(20, 30)],
    )
}
