//! Timeline controller - owns the reference day and both markers
//!
//! The controller is the only holder of mutable timeline state: the
//! reference timezone and date, the "now" instant and the "selected"
//! instant. Everything derived from them is computed on read.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::pointer::StripGeometry;
use crate::selection::{step, DragOutput, DragState, PointerEvent};
use crate::time_engine::{
    add_hours, at_local_time, day_start, hour_offset, local_time, snap_to_hour, start_of_local_day,
};

/// Which calendar date the reference scale shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceDate {
    /// The current date in the reference timezone
    #[default]
    Today,
    /// A date picked by the user
    Pinned(NaiveDate),
}

/// State behind the shared timeline
#[derive(Debug, Clone)]
pub struct TimelineController {
    reference_tz: Tz,
    reference_date: ReferenceDate,
    now: DateTime<Utc>,
    selected: DateTime<Utc>,
    drag: DragState,
}

impl TimelineController {
    /// Create a controller showing today, with the selection at `now`
    pub fn new(reference_tz: Tz, now: DateTime<Utc>) -> Self {
        Self {
            reference_tz,
            reference_date: ReferenceDate::Today,
            now,
            selected: now,
            drag: DragState::Idle,
        }
    }

    pub fn reference_tz(&self) -> Tz {
        self.reference_tz
    }

    pub fn reference_date(&self) -> ReferenceDate {
        self.reference_date
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn selected(&self) -> DateTime<Utc> {
        self.selected
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Hour 0 of the scale: start of the reference date in the reference zone
    pub fn reference_day(&self) -> DateTime<Tz> {
        match self.reference_date {
            ReferenceDate::Today => day_start(self.reference_tz, &self.now),
            ReferenceDate::Pinned(date) => start_of_local_day(self.reference_tz, date),
        }
    }

    /// Position of the now marker, clamped to `[0, 24]`
    pub fn now_hour(&self) -> f64 {
        hour_offset(self.now, &self.reference_day())
    }

    /// Position of the selected marker, clamped to `[0, 24]`
    pub fn selected_hour(&self) -> f64 {
        hour_offset(self.selected, &self.reference_day())
    }

    /// Re-sample the now marker; drag state and selection are untouched
    pub fn refresh_now(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    /// Feed one pointer event through the drag machine
    pub fn handle_pointer(&mut self, event: PointerEvent, geometry: &StripGeometry) -> DragOutput {
        let (next, output) = step(self.drag, event, geometry);
        self.drag = next;

        match output {
            DragOutput::None => {}
            DragOutput::SeekHour(hour) => {
                self.selected = add_hours(&self.reference_day(), hour);
            }
            DragOutput::Snap => {
                self.selected = snap_to_hour(self.reference_tz, self.selected);
            }
        }
        output
    }

    /// Move the selection to the live current instant, without snapping
    pub fn jump_to_now(&mut self, now: DateTime<Utc>) {
        self.selected = now;
    }

    /// Switch the reference timezone, keeping the selection's time of day
    pub fn set_reference_timezone(&mut self, tz: Tz) {
        if tz == self.reference_tz {
            return;
        }
        let wall_time = local_time(self.reference_tz, self.selected);
        debug!(from = %self.reference_tz.name(), to = %tz.name(), "reference timezone changed");
        self.reference_tz = tz;
        self.rebase(wall_time);
    }

    /// Switch the reference date, keeping the selection's time of day
    pub fn set_reference_date(&mut self, date: ReferenceDate) {
        if date == self.reference_date {
            return;
        }
        let wall_time = local_time(self.reference_tz, self.selected);
        debug!(?date, "reference date changed");
        self.reference_date = date;
        self.rebase(wall_time);
    }

    /// Put the selection at `wall_time` on the current reference date
    fn rebase(&mut self, wall_time: NaiveTime) {
        let date = self.reference_day().date_naive();
        self.selected = at_local_time(self.reference_tz, date, wall_time).with_timezone(&Utc);
    }
}
