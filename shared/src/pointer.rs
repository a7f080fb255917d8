//! Pointer mapping between strip pixels and reference-scale hours

use crate::time_engine::SCALE_HOURS;

/// Smallest hour width a strip can have, in pixels
const MIN_PX_PER_HOUR: f64 = 1e-3;

/// Horizontal placement of a 24-hour strip on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripGeometry {
    /// Screen x of hour 0
    left: f64,
    /// Width of one hour in pixels, always positive
    px_per_hour: f64,
}

impl StripGeometry {
    /// Hour widths below `MIN_PX_PER_HOUR`, NaN included, are raised to it
    pub fn new(left: f64, px_per_hour: f64) -> Self {
        Self {
            left,
            px_per_hour: px_per_hour.max(MIN_PX_PER_HOUR),
        }
    }

    /// Geometry of a strip spanning `width` pixels from `left`
    pub fn fit(left: f64, width: f64) -> Self {
        Self::new(left, width / SCALE_HOURS)
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn px_per_hour(&self) -> f64 {
        self.px_per_hour
    }

    pub fn width(&self) -> f64 {
        SCALE_HOURS * self.px_per_hour
    }

    /// Hour under the pointer at screen x
    pub fn hour_at(&self, client_x: f64) -> f64 {
        hour_from_pointer(client_x, self.left, self.px_per_hour)
    }

    /// Screen x of an hour on the strip
    pub fn x_of(&self, hour: f64) -> f64 {
        self.left + px_from_hour(hour, self.px_per_hour)
    }

    /// Whether screen x lies on the strip
    pub fn contains(&self, client_x: f64) -> bool {
        client_x >= self.left && client_x <= self.left + self.width()
    }
}

/// Fractional hour for a pointer at `client_x`, saturating at 0 and 24
///
/// A strip without positive width maps every pointer to hour 0.
pub fn hour_from_pointer(client_x: f64, container_left: f64, px_per_hour: f64) -> f64 {
    if px_per_hour.is_nan() || px_per_hour <= 0.0 {
        return 0.0;
    }
    ((client_x - container_left) / px_per_hour).clamp(0.0, SCALE_HOURS)
}

/// Pixel offset of `hour` from the strip's left edge, clamped to the strip
pub fn px_from_hour(hour: f64, px_per_hour: f64) -> f64 {
    if px_per_hour.is_nan() || px_per_hour <= 0.0 {
        return 0.0;
    }
    (hour * px_per_hour).clamp(0.0, SCALE_HOURS * px_per_hour)
}
