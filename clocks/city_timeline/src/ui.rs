//! UI module - egui controls, city list, add-city dialog, and time table
//!
//! Each draw function returns a result struct; the caller applies it to the
//! session after the frame so egui never holds a borrow of the session.

use chrono_tz::Tz;
use nannou_egui::egui;
use shared::{
    country_flag, format_local_date, format_time, search_catalog, search_timezones, City,
    CityRow, TimeFormat,
};
use tracing::warn;

use crate::drawing::{SIDEBAR_WIDTH, TABLE_HEIGHT, TOP_BAR_HEIGHT};

/// Timezone search results are capped to keep the list responsive
const MAX_TZ_RESULTS: usize = 60;

/// State for the add-city dialog
#[derive(Default)]
pub struct AddCityState {
    pub is_open: bool,
    pub search_query: String,
    pub catalog_results: Vec<City>,
    pub tz_results: Vec<Tz>,
    /// Country code for cities added straight from a timezone
    pub country_code: String,
    pub error: Option<String>,
    pub should_focus_search: bool,
}

impl AddCityState {
    pub fn open(&mut self) {
        self.is_open = true;
        self.search_query.clear();
        self.country_code.clear();
        self.error = None;
        self.should_focus_search = true;
        self.update_search();
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.search_query.clear();
        self.catalog_results.clear();
        self.tz_results.clear();
        self.error = None;
    }

    pub fn update_search(&mut self) {
        self.catalog_results = search_catalog(&self.search_query);
        self.tz_results = if self.search_query.trim().len() < 2 {
            Vec::new()
        } else {
            search_timezones(self.search_query.trim().replace(' ', "_").as_str())
                .into_iter()
                .take(MAX_TZ_RESULTS)
                .collect()
        };
    }
}

/// Result of add-city dialog interactions
#[derive(Default)]
pub struct AddCityResult {
    pub add: Option<City>,
    pub close: bool,
}

/// Result of top bar interactions
#[derive(Default)]
pub struct TopBarResult {
    pub toggle_format: bool,
    pub open_add_city: bool,
    pub jump_to_now: bool,
    /// Move the reference date by this many days
    pub shift_days: Option<i64>,
    pub follow_today: bool,
}

/// Result of sidebar interactions
#[derive(Default)]
pub struct SidebarResult {
    pub make_reference: Option<String>,
    pub request_remove: Option<String>,
}

/// Result of the remove confirmation
#[derive(Default)]
pub struct ConfirmResult {
    pub confirmed: bool,
    pub cancelled: bool,
}

/// Draw the top control bar
pub fn draw_top_bar(
    ctx: &egui::Context,
    time_format: TimeFormat,
    reference: Option<&City>,
    date_label: &str,
    pinned: bool,
) -> TopBarResult {
    let mut result = TopBarResult::default();

    egui::TopBottomPanel::top("controls")
        .resizable(false)
        .exact_height(TOP_BAR_HEIGHT)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                if ui
                    .button(format!("⏱ {}", time_format.label()))
                    .on_hover_text("Toggle 12/24 hour format")
                    .clicked()
                {
                    result.toggle_format = true;
                }
                if ui.button("➕ Add City").clicked() {
                    result.open_add_city = true;
                }
                if ui.button("◎ Now").on_hover_text("Jump to now").clicked() {
                    result.jump_to_now = true;
                }

                ui.separator();

                if ui.small_button("◀").on_hover_text("Previous day").clicked() {
                    result.shift_days = Some(-1);
                }
                ui.label(date_label);
                if ui.small_button("▶").on_hover_text("Next day").clicked() {
                    result.shift_days = Some(1);
                }
                if ui.add_enabled(pinned, egui::Button::new("Today")).clicked() {
                    result.follow_today = true;
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(city) = reference {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} {}",
                                country_flag(city.country_code()),
                                city.label()
                            ))
                            .strong(),
                        );
                        ui.label("Reference:");
                    }
                });
            });
        });

    result
}

/// Draw the city list with reference and remove actions
pub fn draw_sidebar<'a>(
    ctx: &egui::Context,
    cities: impl Iterator<Item = &'a City>,
    reference_id: Option<&str>,
) -> SidebarResult {
    let mut result = SidebarResult::default();

    egui::SidePanel::left("cities")
        .resizable(false)
        .exact_width(SIDEBAR_WIDTH)
        .show(ctx, |ui| {
            ui.heading("Cities");
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                for city in cities {
                    let is_reference = reference_id == Some(city.id());
                    ui.horizontal(|ui| {
                        ui.label(country_flag(city.country_code()));
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(city.label()).strong());
                            ui.label(egui::RichText::new(city.tz().name()).small().weak());
                        });
                    });
                    ui.horizontal(|ui| {
                        let label = if is_reference { "Reference" } else { "Make reference" };
                        if ui
                            .add_enabled(!is_reference, egui::Button::new(label).small())
                            .clicked()
                        {
                            result.make_reference = Some(city.id().to_string());
                        }
                        if ui.small_button("🗑 Remove").clicked() {
                            result.request_remove = Some(city.id().to_string());
                        }
                    });
                    ui.separator();
                }
            });
        });

    result
}

/// Draw the add-city dialog
pub fn draw_add_city_dialog(ctx: &egui::Context, state: &mut AddCityState, existing: &[String]) -> AddCityResult {
    let mut result = AddCityResult::default();

    if !state.is_open {
        return result;
    }

    egui::Window::new("Add City")
        .collapsible(false)
        .resizable(true)
        .default_width(380.0)
        .default_height(460.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Search:");
                let response = ui.text_edit_singleline(&mut state.search_query);
                if state.should_focus_search {
                    response.request_focus();
                    state.should_focus_search = false;
                }
                if response.changed() {
                    state.update_search();
                }
            });

            ui.separator();
            ui.label("Popular cities:");
            egui::ScrollArea::vertical()
                .id_source("catalog")
                .max_height(160.0)
                .show(ui, |ui| {
                    for city in &state.catalog_results {
                        let present = existing.iter().any(|id| id == city.id());
                        let label = format!("{} {} · {}", country_flag(city.country_code()), city.label(), city.id());
                        if ui.add_enabled(!present, egui::SelectableLabel::new(false, label)).clicked() {
                            result.add = Some(city.clone());
                            result.close = true;
                        }
                    }
                });

            if !state.tz_results.is_empty() {
                ui.separator();
                ui.horizontal(|ui| {
                    ui.label("Other time zones, country code:");
                    ui.add(egui::TextEdit::singleline(&mut state.country_code).desired_width(32.0));
                });
                egui::ScrollArea::vertical()
                    .id_source("timezones")
                    .max_height(160.0)
                    .show(ui, |ui| {
                        for &tz in &state.tz_results {
                            let present = existing.iter().any(|id| id == tz.name());
                            if ui
                                .add_enabled(!present, egui::SelectableLabel::new(false, tz.name()))
                                .clicked()
                            {
                                match City::from_timezone(tz, state.country_code.trim()) {
                                    Ok(city) => {
                                        result.add = Some(city);
                                        result.close = true;
                                    }
                                    Err(e) => {
                                        warn!(tz = tz.name(), "Rejected city: {}", e);
                                        state.error = Some(e.to_string());
                                    }
                                }
                            }
                        }
                    });
            }

            if let Some(error) = &state.error {
                ui.colored_label(egui::Color32::from_rgb(239, 68, 68), error);
            }

            ui.separator();
            if ui.button("Close").clicked() {
                result.close = true;
            }
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        result.close = true;
    }

    result
}

/// Ask before removing a city
pub fn draw_remove_confirm(ctx: &egui::Context, label: &str) -> ConfirmResult {
    let mut result = ConfirmResult::default();

    egui::Window::new("Remove city")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(format!("Remove {}?", label));
            ui.horizontal(|ui| {
                if ui.button("Remove").clicked() {
                    result.confirmed = true;
                }
                if ui.button("Cancel").clicked() {
                    result.cancelled = true;
                }
            });
        });

    result
}

/// Draw the selected-time table: every city's local date and time
pub fn draw_selected_table(
    ctx: &egui::Context,
    heading: &str,
    reference_label: &str,
    rows: &[CityRow],
    time_format: TimeFormat,
) {
    egui::TopBottomPanel::bottom("selected_table")
        .resizable(false)
        .exact_height(TABLE_HEIGHT)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Selected Time:");
                ui.label(egui::RichText::new(format!("{} ({})", heading, reference_label)).strong());
            });
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("selected_grid")
                    .striped(true)
                    .num_columns(5)
                    .spacing([24.0, 4.0])
                    .show(ui, |ui| {
                        ui.strong("City");
                        ui.strong("Local Date");
                        ui.strong("Local Time");
                        ui.strong("Day");
                        ui.strong("TZ");
                        ui.end_row();

                        for row in rows {
                            ui.label(format!("{} {}", country_flag(row.city.country_code()), row.city.label()));
                            ui.label(format_local_date(&row.selected_local));
                            ui.label(format_time(&row.selected_local, time_format));
                            ui.label(row.relation.label());
                            ui.label(egui::RichText::new(row.city.tz().name()).weak());
                            ui.end_row();
                        }
                    });
            });
        });
}
