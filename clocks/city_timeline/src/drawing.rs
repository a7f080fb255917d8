//! Drawing module - hour scale, city rows, and the two markers
//!
//! Everything here is positioned through the strip geometry so that the
//! picture and the pointer mapping always agree.

use nannou::prelude::*;
use shared::{format_hour_label, hour_scale, CityRow, DayPeriod, StripGeometry, TimeFormat};

/// Color palette - cool slate night, pale blue twilight
pub mod colors {
    use nannou::prelude::*;

    pub const BACKGROUND: Srgb<u8> = Srgb {
        red: 15,
        green: 23,
        blue: 42,
        standard: std::marker::PhantomData,
    };

    pub const NIGHT: Srgb<u8> = Srgb {
        red: 30,
        green: 41,
        blue: 59,
        standard: std::marker::PhantomData,
    };

    /// Shared by dawn and dusk
    pub const TWILIGHT: Srgb<u8> = Srgb {
        red: 71,
        green: 98,
        blue: 138,
        standard: std::marker::PhantomData,
    };

    pub const DAY: Srgb<u8> = Srgb {
        red: 148,
        green: 170,
        blue: 199,
        standard: std::marker::PhantomData,
    };

    pub const TEXT_PRIMARY: Srgb<u8> = Srgb {
        red: 226,
        green: 232,
        blue: 240,
        standard: std::marker::PhantomData,
    };

    pub const TEXT_SECONDARY: Srgb<u8> = Srgb {
        red: 148,
        green: 163,
        blue: 184,
        standard: std::marker::PhantomData,
    };

    pub const GRID: Srgb<u8> = Srgb {
        red: 51,
        green: 65,
        blue: 85,
        standard: std::marker::PhantomData,
    };

    /// Selected-time marker
    pub const SELECTED: Srgb<u8> = Srgb {
        red: 37,
        green: 99,
        blue: 235,
        standard: std::marker::PhantomData,
    };

    /// Now indicator
    pub const NOW: Srgb<u8> = Srgb {
        red: 239,
        green: 68,
        blue: 68,
        standard: std::marker::PhantomData,
    };

    pub const DATE_BREAK: Srgb<u8> = Srgb {
        red: 203,
        green: 213,
        blue: 225,
        standard: std::marker::PhantomData,
    };
}

/// Width of the egui side panel, in points
pub const SIDEBAR_WIDTH: f32 = 260.0;
/// Height of the egui top bar
pub const TOP_BAR_HEIGHT: f32 = 44.0;
/// Height of the egui selected-time table
pub const TABLE_HEIGHT: f32 = 190.0;

const MARGIN_X: f32 = 36.0;
const SCALE_HEIGHT: f32 = 28.0;
const ROW_HEIGHT: f32 = 40.0;
/// Vertical distance between row centers, caption included
const ROW_PITCH: f32 = 72.0;
const MIN_STRIP_WIDTH: f32 = 240.0;

/// Screen layout of the timeline area
#[derive(Debug, Clone, Copy)]
pub struct TimelineLayout {
    pub strip_left: f32,
    pub strip_width: f32,
    pub scale_y: f32,
    pub first_row_y: f32,
    pub row_count: usize,
}

impl TimelineLayout {
    pub fn calculate(window_rect: Rect, row_count: usize) -> Self {
        let strip_left = window_rect.left() + SIDEBAR_WIDTH + MARGIN_X;
        let strip_width = (window_rect.right() - MARGIN_X - strip_left).max(MIN_STRIP_WIDTH);
        let scale_y = window_rect.top() - TOP_BAR_HEIGHT - 40.0;
        Self {
            strip_left,
            strip_width,
            scale_y,
            first_row_y: scale_y - SCALE_HEIGHT / 2.0 - 24.0 - ROW_HEIGHT / 2.0,
            row_count,
        }
    }

    pub fn strip(&self) -> StripGeometry {
        StripGeometry::fit(<f64 as From<_>>::from(self.strip_left), <f64 as From<_>>::from(self.strip_width))
    }

    pub fn row_y(&self, index: usize) -> f32 {
        self.first_row_y - index as f32 * ROW_PITCH
    }

    fn bottom(&self) -> f32 {
        match self.row_count {
            0 => self.scale_y - SCALE_HEIGHT / 2.0,
            n => self.row_y(n - 1) - ROW_HEIGHT / 2.0,
        }
    }

    /// Whether a press at `pos` should grab the selected marker
    pub fn hit_test(&self, pos: Point2) -> bool {
        let top = self.scale_y + SCALE_HEIGHT / 2.0;
        self.strip().contains(<f64 as From<_>>::from(pos.x)) && pos.y <= top && pos.y >= self.bottom()
    }
}

fn x_of(strip: &StripGeometry, hour: f64) -> f32 {
    strip.x_of(hour) as f32
}

fn period_color(period: DayPeriod) -> Srgb<u8> {
    match period {
        DayPeriod::Night => colors::NIGHT,
        DayPeriod::Dawn | DayPeriod::Dusk => colors::TWILIGHT,
        DayPeriod::Day => colors::DAY,
    }
}

/// Draw the shared hour scale across the top of the rows
pub fn draw_scale(draw: &Draw, layout: &TimelineLayout, time_format: TimeFormat) {
    let strip = layout.strip();
    // Skip labels when hours get too narrow to fit one
    let label_step = if strip.px_per_hour() < 28.0 { 3 } else if strip.px_per_hour() < 40.0 { 2 } else { 1 };

    draw.rect()
        .x_y(layout.strip_left + layout.strip_width / 2.0, layout.scale_y)
        .w_h(layout.strip_width, SCALE_HEIGHT)
        .color(colors::NIGHT);

    for hour in hour_scale() {
        let x = x_of(&strip, <f64 as From<_>>::from(hour));
        draw.line()
            .start(pt2(x, layout.scale_y - SCALE_HEIGHT / 2.0))
            .end(pt2(x, layout.scale_y - SCALE_HEIGHT / 2.0 + 6.0))
            .color(colors::GRID)
            .weight(1.0);

        if hour % label_step == 0 {
            draw.text(&format_hour_label(hour, time_format))
                .x_y(x, layout.scale_y + 2.0)
                .color(colors::TEXT_SECONDARY)
                .font_size(11)
                .w(48.0);
        }
    }
}

/// Draw one city row: period segments, date break, and caption
pub fn draw_city_row(draw: &Draw, layout: &TimelineLayout, index: usize, row: &CityRow, caption: &str) {
    let strip = layout.strip();
    let y = layout.row_y(index);

    for segment in &row.segments {
        let x0 = x_of(&strip, <f64 as From<_>>::from(segment.start_hour));
        let x1 = x_of(&strip, <f64 as From<_>>::from(segment.end_hour));
        draw.rect()
            .x_y((x0 + x1) / 2.0, y)
            .w_h(x1 - x0, ROW_HEIGHT)
            .color(period_color(segment.period));
    }

    // Hour grid
    for hour in hour_scale() {
        let x = x_of(&strip, <f64 as From<_>>::from(hour));
        draw.line()
            .start(pt2(x, y - ROW_HEIGHT / 2.0))
            .end(pt2(x, y + ROW_HEIGHT / 2.0))
            .color(srgba(15u8, 23u8, 42u8, 60u8))
            .weight(1.0);
    }

    if let Some(hour) = row.date_break {
        let x = x_of(&strip, <f64 as From<_>>::from(hour));
        draw.line()
            .start(pt2(x, y - ROW_HEIGHT / 2.0 - 4.0))
            .end(pt2(x, y + ROW_HEIGHT / 2.0 + 4.0))
            .color(colors::DATE_BREAK)
            .weight(2.0);
    }

    let caption_y = y - ROW_HEIGHT / 2.0 - 12.0;
    let name_color = if row.is_reference {
        colors::SELECTED
    } else {
        colors::TEXT_PRIMARY
    };
    draw.text(row.city.label())
        .x_y(layout.strip_left + 90.0, caption_y)
        .color(name_color)
        .font_size(13)
        .left_justify()
        .w(180.0);
    draw.text(caption)
        .x_y(layout.strip_left + layout.strip_width - 160.0, caption_y)
        .color(colors::TEXT_SECONDARY)
        .font_size(12)
        .right_justify()
        .w(320.0);
}

/// Draw the now indicator and the selected marker through scale and rows
pub fn draw_markers(draw: &Draw, layout: &TimelineLayout, now_hour: f64, selected_hour: f64, dragging: bool) {
    let strip = layout.strip();
    let top = layout.scale_y + SCALE_HEIGHT / 2.0;
    let bottom = layout.bottom();

    let now_x = x_of(&strip, now_hour);
    draw.line()
        .start(pt2(now_x, top))
        .end(pt2(now_x, bottom))
        .color(srgba(239u8, 68u8, 68u8, 110u8))
        .weight(1.0);
    draw.ellipse()
        .x_y(now_x, top)
        .radius(3.0)
        .color(colors::NOW);

    let selected_x = x_of(&strip, selected_hour);
    draw.line()
        .start(pt2(selected_x, top + 6.0))
        .end(pt2(selected_x, bottom))
        .color(colors::SELECTED)
        .weight(if dragging { 3.0 } else { 2.0 });

    // Handle (triangle pointing down)
    let head_size = 8.0;
    draw.polygon()
        .points(vec![
            pt2(selected_x, top + 6.0),
            pt2(selected_x - head_size, top + 6.0 + head_size),
            pt2(selected_x + head_size, top + 6.0 + head_size),
        ])
        .color(colors::SELECTED);
}

/// Draw the usage tip under the rows
pub fn draw_help_text(draw: &Draw, layout: &TimelineLayout) {
    draw.text("Drag anywhere on the timeline; release to snap to the nearest hour.  N: now  T: 12h/24h")
        .x_y(layout.strip_left + layout.strip_width / 2.0, layout.bottom() - 28.0)
        .color(srgba(148u8, 163u8, 184u8, 140u8))
        .font_size(11)
        .w(layout.strip_width);
}
