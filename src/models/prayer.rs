#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrayerType {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerType {
    /// Canonical order of the day's prayers.
    pub const ALL: [PrayerType; 5] = [
        PrayerType::Fajr,
        PrayerType::Dhuhr,
        PrayerType::Asr,
        PrayerType::Maghrib,
        PrayerType::Isha,
    ];

    /// Key used by the prayer-times service in `data.timings`.
    pub fn api_key(&self) -> &'static str {
        match self {
            PrayerType::Fajr => "Fajr",
            PrayerType::Dhuhr => "Dhuhr",
            PrayerType::Asr => "Asr",
            PrayerType::Maghrib => "Maghrib",
            PrayerType::Isha => "Isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.api_key()
    }
}

impl std::fmt::Display for PrayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_starts_at_fajr_and_ends_at_isha() {
        assert_eq!(PrayerType::ALL[0], PrayerType::Fajr);
        assert_eq!(PrayerType::ALL[4], PrayerType::Isha);
    }

    #[test]
    fn display_matches_service_keys() {
        for prayer in PrayerType::ALL {
            assert_eq!(prayer.to_string(), prayer.api_key());
        }
        assert_eq!(PrayerType::Dhuhr.api_key(), "Dhuhr");
    }
}
