//! Day-period classification for city rows
//!
//! Each reference-scale hour of a row is shaded by the period of the city's
//! own local hour at that moment.

use chrono::{DateTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::time_engine::add_hours;

/// Qualitative bucket for an hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    Night,
    Dawn,
    Day,
    Dusk,
}

impl DayPeriod {
    /// Classify a local hour of day (0-23)
    ///
    /// Boundaries are inclusive-low, exclusive-high.
    pub fn classify(local_hour: u32) -> Self {
        match local_hour {
            6..=7 => DayPeriod::Dawn,
            8..=17 => DayPeriod::Day,
            18..=19 => DayPeriod::Dusk,
            _ => DayPeriod::Night,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DayPeriod::Night => "night",
            DayPeriod::Dawn => "dawn",
            DayPeriod::Day => "day",
            DayPeriod::Dusk => "dusk",
        }
    }
}

impl std::fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One hour-wide slice of a city row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySegment {
    /// Reference-scale hour where the slice begins (0-23)
    pub start_hour: u8,
    /// Reference-scale hour where the slice ends (1-24)
    pub end_hour: u8,
    /// The city's local hour of day during this slice
    pub local_hour: u8,
    pub period: DayPeriod,
}

/// Compute the 24 segments of a city row against `reference_day`
///
/// Segment `i` covers `[i, i + 1)` on the reference scale, so the result
/// always tiles the whole day.
pub fn day_segments<Z: TimeZone>(reference_day: &DateTime<Z>, city_tz: Tz) -> [DaySegment; 24] {
    std::array::from_fn(|i| {
        let hour = i as u8;
        let local_hour = add_hours(reference_day, f64::from(hour))
            .with_timezone(&city_tz)
            .hour();
        DaySegment {
            start_hour: hour,
            end_hour: hour + 1,
            local_hour: local_hour as u8,
            period: DayPeriod::classify(local_hour),
        }
    })
}
