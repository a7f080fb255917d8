//! Text formatting for the timeline: times, scale labels, dates, flags

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Clock display preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "24h")]
    H24,
}

impl TimeFormat {
    pub fn label(&self) -> &'static str {
        match self {
            TimeFormat::H12 => "12h",
            TimeFormat::H24 => "24h",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            TimeFormat::H12 => TimeFormat::H24,
            TimeFormat::H24 => TimeFormat::H12,
        }
    }
}

/// Wall-clock time, "14:05" or "2:05 PM"
pub fn format_time<Z: TimeZone>(dt: &DateTime<Z>, tf: TimeFormat) -> String
where
    Z::Offset: std::fmt::Display,
{
    match tf {
        TimeFormat::H12 => dt.format("%-I:%M %p").to_string(),
        TimeFormat::H24 => dt.format("%H:%M").to_string(),
    }
}

/// Label for an hour tick on the scale, "07" or "7AM"
///
/// Hour 24 is labelled like hour 0.
pub fn format_hour_label(hour: u32, tf: TimeFormat) -> String {
    let hour = hour % 24;
    match tf {
        TimeFormat::H24 => format!("{:02}", hour),
        TimeFormat::H12 => {
            let hour12 = match hour {
                0 => 12,
                1..=12 => hour,
                _ => hour - 12,
            };
            let meridiem = if hour < 12 { "AM" } else { "PM" };
            format!("{}{}", hour12, meridiem)
        }
    }
}

/// "Mon 15 Jan 2024"
pub fn format_local_date<Z: TimeZone>(dt: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    dt.format("%a %-d %b %Y").to_string()
}

/// "Mon 15 Jan 2024 • 14:00"
pub fn format_selected_heading<Z: TimeZone>(dt: &DateTime<Z>, tf: TimeFormat) -> String
where
    Z::Offset: std::fmt::Display,
{
    format!("{} • {}", format_local_date(dt), format_time(dt, tf))
}

/// Flag emoji for a two-letter country code
///
/// Each ASCII letter maps to its regional indicator symbol; anything else is
/// dropped.
pub fn country_flag(country_code: &str) -> String {
    const REGIONAL_INDICATOR_OFFSET: u32 = 127397;

    country_code
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .filter_map(|c| char::from_u32(REGIONAL_INDICATOR_OFFSET + c.to_ascii_uppercase() as u32))
        .collect()
}

/// Hour ticks of the scale, 0 through 24
pub fn hour_scale() -> impl Iterator<Item = u32> {
    0..=24
}
