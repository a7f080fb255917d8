//! Date relations between the reference city and other rows
//!
//! Answers two questions for a row: is the city on the same calendar date as
//! the reference at the selected instant, and where on the reference scale
//! does the city's local date roll over.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::time_engine::{add_hours, local_date};

/// Calendar date of a city relative to the reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRelation {
    Same,
    Prev,
    Next,
}

impl DateRelation {
    /// Human-readable label shown next to a row
    pub fn label(&self) -> &'static str {
        match self {
            DateRelation::Same => "Same day",
            DateRelation::Prev => "Previous day",
            DateRelation::Next => "Next day",
        }
    }
}

impl std::fmt::Display for DateRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Compare the date of `selected` in the reference zone with its date in the
/// city's zone
///
/// `NaiveDate` orders the same way ISO-8601 date strings sort, so this is the
/// calendar comparison without formatting.
pub fn date_relation(selected: DateTime<Utc>, reference_tz: Tz, city_tz: Tz) -> DateRelation {
    let reference_date = local_date(reference_tz, selected);
    let city_date = local_date(city_tz, selected);

    match city_date.cmp(&reference_date) {
        std::cmp::Ordering::Equal => DateRelation::Same,
        std::cmp::Ordering::Greater => DateRelation::Next,
        std::cmp::Ordering::Less => DateRelation::Prev,
    }
}

/// Reference-scale hour (1-24) where the city's local date first changes
///
/// Hours are scanned in order and each is compared with the hour right
/// before it. Only the first rollover is reported; real offsets never
/// produce two within one reference day.
pub fn date_break_hour<Z: TimeZone>(reference_day: &DateTime<Z>, city_tz: Tz) -> Option<u8> {
    let mut previous = local_date(city_tz, add_hours(reference_day, 0.0));

    for hour in 1..=24u8 {
        let current = local_date(city_tz, add_hours(reference_day, f64::from(hour)));
        if current != previous {
            return Some(hour);
        }
        previous = current;
    }

    None
}
