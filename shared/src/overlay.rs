//! Per-city row data handed to the renderer
//!
//! Rows are rebuilt from the controller on every read and never stored.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::city::City;
use crate::controller::TimelineController;
use crate::date_break::{date_break_hour, date_relation, DateRelation};
use crate::day_period::{day_segments, DaySegment};

/// Everything needed to draw one city row
#[derive(Debug, Clone)]
pub struct CityRow {
    pub city: City,
    pub segments: [DaySegment; 24],
    /// Reference-scale hour where the local date rolls over
    pub date_break: Option<u8>,
    pub relation: DateRelation,
    /// The selected instant in the city's local time
    pub selected_local: DateTime<Tz>,
    pub is_reference: bool,
}

/// Build the row for `city` against the controller's current state
pub fn city_row(controller: &TimelineController, city: &City, reference_city_id: &str) -> CityRow {
    let reference_day = controller.reference_day();
    let selected: DateTime<Utc> = controller.selected();

    CityRow {
        city: city.clone(),
        segments: day_segments(&reference_day, city.tz()),
        date_break: date_break_hour(&reference_day, city.tz()),
        relation: date_relation(selected, controller.reference_tz(), city.tz()),
        selected_local: selected.with_timezone(&city.tz()),
        is_reference: city.id() == reference_city_id,
    }
}
