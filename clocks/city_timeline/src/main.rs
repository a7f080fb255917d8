//! City Timeline Clock
//!
//! Several cities on one 24-hour strip anchored to the reference city's day.
//! Drag the marker to compare local times; release to snap to the hour.

mod drawing;
mod ui;

use chrono::{Duration, Utc};
use nannou::prelude::*;
use nannou_egui::{self, Egui};
use shared::{
    format_local_date, format_time, City, ConfigStore, PointerEvent, ReferenceDate, TimelineSession,
};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::drawing::{colors, draw_city_row, draw_help_text, draw_markers, draw_scale, TimelineLayout};
use crate::ui::{
    draw_add_city_dialog, draw_remove_confirm, draw_selected_table, draw_sidebar, draw_top_bar,
    AddCityState,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    nannou::app(model).update(update).exit(exit).run();
}

/// Application state
struct Model {
    session: TimelineSession,
    add_city: AddCityState,
    /// City id waiting for remove confirmation
    pending_remove: Option<String>,
    egui: Egui,
}

impl Model {
    fn layout(&self, window_rect: Rect) -> TimelineLayout {
        TimelineLayout::calculate(window_rect, self.session.cities().len())
    }

    fn dialog_open(&self) -> bool {
        self.add_city.is_open || self.pending_remove.is_some()
    }
}

fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("City Timeline")
        .size(1320, 780)
        .min_size(900, 560)
        .view(view)
        .key_pressed(key_pressed)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_moved(mouse_moved)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);

    let store = match ConfigStore::default_location() {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Persistence disabled: {}", e);
            None
        }
    };

    Model {
        session: TimelineSession::start(store, Utc::now(), Instant::now()),
        add_city: AddCityState::default(),
        pending_remove: None,
        egui,
    }
}

fn update(_app: &App, model: &mut Model, update: Update) {
    model.session.tick(Instant::now(), Utc::now());

    model.egui.set_elapsed_time(update.since_start);
    let ctx = model.egui.begin_frame();

    let session = &model.session;
    let controller = session.controller();
    let reference = session.reference_city();
    let reference_day = controller.reference_day();
    let pinned = matches!(controller.reference_date(), ReferenceDate::Pinned(_));
    let date_label = format_local_date(&reference_day);
    let rows = session.rows();
    let existing: Vec<String> = session.cities().iter().map(|c| c.id().to_string()).collect();

    let top = draw_top_bar(&ctx, session.time_format(), reference, &date_label, pinned);
    let side = draw_sidebar(&ctx, session.cities().iter(), reference.map(City::id));
    draw_selected_table(
        &ctx,
        &session.selected_heading(),
        reference.map(City::label).unwrap_or_default(),
        &rows,
        session.time_format(),
    );
    let added = draw_add_city_dialog(&ctx, &mut model.add_city, &existing);

    let confirm = model.pending_remove.as_ref().map(|id| {
        let label = session.cities().get(id).map(City::label).unwrap_or(id.as_str());
        draw_remove_confirm(&ctx, label)
    });

    let reference_date = reference_day.date_naive();
    drop(ctx);

    // Apply UI results
    if top.toggle_format {
        let toggled = model.session.time_format().toggled();
        model.session.set_time_format(toggled);
    }
    if top.open_add_city {
        model.add_city.open();
    }
    if top.jump_to_now {
        model.session.jump_to_now(Utc::now());
    }
    if let Some(days) = top.shift_days {
        let date = reference_date + Duration::days(days);
        model.session.set_reference_date(ReferenceDate::Pinned(date));
    }
    if top.follow_today {
        model.session.set_reference_date(ReferenceDate::Today);
    }

    if let Some(id) = side.make_reference {
        model.session.make_reference(&id);
    }
    if let Some(id) = side.request_remove {
        model.pending_remove = Some(id);
    }

    if let Some(city) = added.add {
        info!(city = %city.id(), "adding city");
        model.session.add_city(city);
    }
    if added.close {
        model.add_city.close();
    }

    if let Some(result) = confirm {
        if result.confirmed {
            if let Some(id) = model.pending_remove.take() {
                model.session.remove_city(&id);
            }
        } else if result.cancelled {
            model.pending_remove = None;
        }
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();

    draw.background().color(colors::BACKGROUND);

    let session = &model.session;
    let controller = session.controller();
    let layout = model.layout(window_rect);
    let time_format = session.time_format();

    draw_scale(&draw, &layout, time_format);

    for (index, row) in session.rows().iter().enumerate() {
        let caption = format!(
            "{} · {} · {}",
            format_local_date(&row.selected_local),
            format_time(&row.selected_local, time_format),
            row.relation.label()
        );
        draw_city_row(&draw, &layout, index, row, &caption);
    }

    draw_markers(
        &draw,
        &layout,
        controller.now_hour(),
        controller.selected_hour(),
        controller.is_dragging(),
    );
    draw_help_text(&draw, &layout);

    draw.to_frame(app, &frame).unwrap();
    model.egui.draw_to_frame(&frame).unwrap();
}

fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if model.dialog_open() {
        return;
    }

    match key {
        // N - jump to now
        Key::N => model.session.jump_to_now(Utc::now()),
        // T - toggle 12h/24h
        Key::T => {
            let toggled = model.session.time_format().toggled();
            model.session.set_time_format(toggled);
        }
        _ => {}
    }
}

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.dialog_open() {
        return;
    }

    let pos = app.mouse.position();
    let layout = model.layout(app.window_rect());
    if layout.hit_test(pos) {
        model
            .session
            .pointer(PointerEvent::Press(<f64 as From<_>>::from(pos.x)), &layout.strip());
    }
}

fn mouse_released(app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        let layout = model.layout(app.window_rect());
        model.session.pointer(PointerEvent::Release, &layout.strip());
    }
}

fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    // Moves outside the strip still count while dragging; the mapper clamps
    let layout = model.layout(app.window_rect());
    model
        .session
        .pointer(PointerEvent::Move(<f64 as From<_>>::from(pos.x)), &layout.strip());
}

fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);

    // Resync the now marker when the window regains focus
    if let nannou::winit::event::WindowEvent::Focused(true) = event {
        model.session.refresh_now(Utc::now());
    }
}

fn exit(_app: &App, mut model: Model) {
    model.session.end();
}
