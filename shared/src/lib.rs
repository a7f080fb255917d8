//! Shared timeline engine for the city timeline clock
//!
//! Anchors a 24-hour scale to the reference city's day and projects every
//! other city onto it: day periods, date breaks, pointer mapping and the
//! now/selected markers.

pub mod city;
pub mod config;
pub mod controller;
pub mod date_break;
pub mod day_period;
pub mod format;
pub mod overlay;
pub mod pointer;
pub mod selection;
pub mod session;
pub mod ticker;
pub mod time_engine;

pub use city::{popular_cities, search_catalog, seed_cities, City, CityError, CitySet, Preferences};
pub use config::{config_dir, ConfigError, ConfigStore};
pub use controller::{ReferenceDate, TimelineController};
pub use date_break::{date_break_hour, date_relation, DateRelation};
pub use day_period::{day_segments, DayPeriod, DaySegment};
pub use format::{
    country_flag, format_hour_label, format_local_date, format_selected_heading, format_time,
    hour_scale, TimeFormat,
};
pub use overlay::{city_row, CityRow};
pub use pointer::{hour_from_pointer, px_from_hour, StripGeometry};
pub use selection::{DragOutput, DragState, PointerEvent};
pub use session::TimelineSession;
pub use ticker::{RefreshTimer, NOW_REFRESH_INTERVAL};
pub use time_engine::{
    add_hours, at_local_time, day_start, hour_offset, parse_timezone, search_timezones,
    snap_to_hour, start_of_local_day, TimezoneError, SCALE_HOURS,
};
