//! Timeline session - composes cities, preferences, controller and storage
//!
//! A session lives as long as the view. It owns the refresh timer handle, so
//! ending the session is what stops the now marker from advancing.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::city::{seed_cities, City, CitySet, Preferences};
use crate::config::ConfigStore;
use crate::controller::{ReferenceDate, TimelineController};
use crate::format::{format_selected_heading, TimeFormat};
use crate::overlay::{city_row, CityRow};
use crate::pointer::StripGeometry;
use crate::selection::{DragOutput, PointerEvent};
use crate::ticker::{RefreshTimer, NOW_REFRESH_INTERVAL};

/// Reference zone used when the city set is empty
pub const DEFAULT_REFERENCE_TZ: Tz = chrono_tz::Europe::Helsinki;

pub struct TimelineSession {
    cities: CitySet,
    prefs: Preferences,
    controller: TimelineController,
    timer: RefreshTimer,
    store: Option<ConfigStore>,
}

impl TimelineSession {
    /// Start a session, restoring cities and preferences from `store`
    ///
    /// Missing or unreadable blobs fall back to the seed cities and default
    /// preferences.
    pub fn start(store: Option<ConfigStore>, now: DateTime<Utc>, at: Instant) -> Self {
        let cities = load_cities(store.as_ref());
        let prefs = load_prefs(store.as_ref());

        let reference_tz = resolve_reference(&cities, &prefs)
            .map(City::tz)
            .unwrap_or(DEFAULT_REFERENCE_TZ);
        info!(
            cities = cities.len(),
            reference = %reference_tz.name(),
            "timeline session started"
        );

        Self {
            cities,
            prefs,
            controller: TimelineController::new(reference_tz, now),
            timer: RefreshTimer::start(NOW_REFRESH_INTERVAL, at),
            store,
        }
    }

    pub fn cities(&self) -> &CitySet {
        &self.cities
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn time_format(&self) -> TimeFormat {
        self.prefs.time_format
    }

    pub fn controller(&self) -> &TimelineController {
        &self.controller
    }

    /// The city whose day defines the scale
    ///
    /// Falls back to the first city when the stored id is no longer present.
    pub fn reference_city(&self) -> Option<&City> {
        resolve_reference(&self.cities, &self.prefs)
    }

    /// Add a city; duplicates by id are ignored
    pub fn add_city(&mut self, city: City) -> bool {
        let added = self.cities.insert(city);
        if added {
            self.persist();
            self.sync_reference();
        }
        added
    }

    pub fn remove_city(&mut self, id: &str) -> Option<City> {
        let removed = self.cities.remove(id)?;
        self.persist();
        self.sync_reference();
        Some(removed)
    }

    /// Make the city with `id` the reference; unknown ids are ignored
    pub fn make_reference(&mut self, id: &str) -> bool {
        if !self.cities.contains(id) {
            return false;
        }
        self.prefs.reference_city_id = id.to_string();
        self.persist();
        self.sync_reference();
        true
    }

    pub fn set_time_format(&mut self, time_format: TimeFormat) {
        if self.prefs.time_format == time_format {
            return;
        }
        self.prefs.time_format = time_format;
        self.persist();
    }

    pub fn set_reference_date(&mut self, date: ReferenceDate) {
        self.controller.set_reference_date(date);
    }

    pub fn jump_to_now(&mut self, now: DateTime<Utc>) {
        self.controller.jump_to_now(now);
    }

    pub fn pointer(&mut self, event: PointerEvent, geometry: &StripGeometry) -> DragOutput {
        self.controller.handle_pointer(event, geometry)
    }

    /// Poll the refresh timer; re-samples now when it fires
    pub fn tick(&mut self, at: Instant, now: DateTime<Utc>) -> bool {
        if !self.timer.poll(at) {
            return false;
        }
        debug!(%now, "now marker refreshed");
        self.controller.refresh_now(now);
        true
    }

    /// Re-sample now immediately, e.g. after the host was backgrounded
    pub fn refresh_now(&mut self, now: DateTime<Utc>) {
        self.controller.refresh_now(now);
    }

    /// Rows for every city, in display order
    pub fn rows(&self) -> Vec<CityRow> {
        let reference_id = self.reference_city().map(City::id).unwrap_or_default();
        self.cities
            .iter()
            .map(|city| city_row(&self.controller, city, reference_id))
            .collect()
    }

    /// Selected instant in the reference zone, e.g. "Mon 15 Jan 2024 • 14:00"
    pub fn selected_heading(&self) -> String {
        let local = self
            .controller
            .selected()
            .with_timezone(&self.controller.reference_tz());
        format_selected_heading(&local, self.prefs.time_format)
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_active()
    }

    /// Tear down the session's timer
    pub fn end(&mut self) {
        if self.timer.is_active() {
            info!("timeline session ended");
        }
        self.timer.cancel();
    }

    fn sync_reference(&mut self) {
        let tz = self
            .reference_city()
            .map(City::tz)
            .unwrap_or(DEFAULT_REFERENCE_TZ);
        self.controller.set_reference_timezone(tz);
    }

    /// Write both blobs; any change also retries an earlier failed save
    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save_cities(self.cities.iter()) {
            warn!("Failed to save cities: {}", e);
        }
        if let Err(e) = store.save_prefs(&self.prefs) {
            warn!("Failed to save preferences: {}", e);
        }
    }
}

impl Drop for TimelineSession {
    fn drop(&mut self) {
        self.end();
    }
}

fn resolve_reference<'a>(cities: &'a CitySet, prefs: &Preferences) -> Option<&'a City> {
    cities.get(&prefs.reference_city_id).or_else(|| cities.first())
}

fn load_cities(store: Option<&ConfigStore>) -> CitySet {
    let loaded = match store.map(ConfigStore::load_cities) {
        Some(Ok(cities)) => cities,
        Some(Err(e)) => {
            warn!("Failed to load cities, using defaults: {}", e);
            None
        }
        None => None,
    };

    match loaded {
        Some(cities) if !cities.is_empty() => cities.into_iter().collect(),
        _ => seed_cities().into_iter().collect(),
    }
}

fn load_prefs(store: Option<&ConfigStore>) -> Preferences {
    match store.map(ConfigStore::load_prefs) {
        Some(Ok(Some(prefs))) => prefs,
        Some(Ok(None)) | None => Preferences::default(),
        Some(Err(e)) => {
            warn!("Failed to load preferences, using defaults: {}", e);
            Preferences::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CITIES_KEY;
    use crate::date_break::DateRelation;
    use chrono::{NaiveDate, TimeZone, Timelike};
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        // 14:30 Helsinki
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap()
    }

    fn strip() -> StripGeometry {
        StripGeometry::new(0.0, 40.0)
    }

    #[test]
    fn test_fresh_session_uses_seed_state() {
        let dir = tempfile::tempdir().unwrap();
        let session = TimelineSession::start(Some(ConfigStore::in_dir(dir.path())), now(), Instant::now());

        assert_eq!(session.cities().len(), 5);
        assert_eq!(session.reference_city().unwrap().id(), "Europe/Helsinki");
        assert_eq!(session.time_format(), TimeFormat::H24);
        assert_eq!(session.controller().selected(), now());
        assert!(session.is_running());
    }

    #[test]
    fn test_corrupt_storage_falls_back_to_seed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());
        std::fs::write(store.path(CITIES_KEY), "cities = 42").unwrap();

        let session = TimelineSession::start(Some(store), now(), Instant::now());
        assert_eq!(session.cities().len(), 5);
    }

    #[test]
    fn test_changes_persist_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut session =
                TimelineSession::start(Some(ConfigStore::in_dir(dir.path())), now(), Instant::now());
            let paris = City::new("Europe/Paris", "Paris", "FR", "Europe/Paris").unwrap();
            assert!(session.add_city(paris));
            assert!(session.make_reference("Asia/Tokyo"));
            session.set_time_format(TimeFormat::H12);
        }

        let session = TimelineSession::start(Some(ConfigStore::in_dir(dir.path())), now(), Instant::now());
        assert_eq!(session.cities().len(), 6);
        assert!(session.cities().contains("Europe/Paris"));
        assert_eq!(session.reference_city().unwrap().id(), "Asia/Tokyo");
        assert_eq!(session.controller().reference_tz().name(), "Asia/Tokyo");
        assert_eq!(session.time_format(), TimeFormat::H12);
    }

    #[test]
    fn test_failed_save_is_retried_by_next_change() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = dir.path().join("store");
        // A plain file where the directory should be makes every save fail
        std::fs::write(&store_dir, "").unwrap();

        let mut session =
            TimelineSession::start(Some(ConfigStore::in_dir(&store_dir)), now(), Instant::now());
        session.set_time_format(TimeFormat::H12);

        std::fs::remove_file(&store_dir).unwrap();
        let paris = City::new("Europe/Paris", "Paris", "FR", "Europe/Paris").unwrap();
        assert!(session.add_city(paris));

        let store = ConfigStore::in_dir(&store_dir);
        assert_eq!(store.load_prefs().unwrap().unwrap().time_format, TimeFormat::H12);
        assert_eq!(store.load_cities().unwrap().unwrap().len(), 6);
    }

    #[test]
    fn test_duplicate_city_is_ignored() {
        let mut session = TimelineSession::start(None, now(), Instant::now());
        let tokyo = City::new("Asia/Tokyo", "Tokyo", "JP", "Asia/Tokyo").unwrap();

        assert!(!session.add_city(tokyo));
        assert_eq!(session.cities().len(), 5);
    }

    #[test]
    fn test_make_reference_rebases_selection() {
        let mut session = TimelineSession::start(None, now(), Instant::now());

        assert!(session.make_reference("America/New_York"));
        assert!(!session.make_reference("Nowhere/Unknown"));

        let new_york = session.controller().reference_tz();
        let local = session.controller().selected().with_timezone(&new_york);
        assert_eq!((local.hour(), local.minute()), (14, 30));
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_removing_reference_moves_to_first_city() {
        let mut session = TimelineSession::start(None, now(), Instant::now());

        let removed = session.remove_city("Europe/Helsinki").unwrap();
        assert_eq!(removed.label(), "Helsinki");
        assert_eq!(session.reference_city().unwrap().id(), "Europe/London");
        assert_eq!(session.controller().reference_tz().name(), "Europe/London");
        assert!(session.remove_city("Europe/Helsinki").is_none());
    }

    #[test]
    fn test_empty_city_set_keeps_default_reference() {
        let mut session = TimelineSession::start(None, now(), Instant::now());
        let ids: Vec<String> = session.cities().iter().map(|c| c.id().to_string()).collect();
        for id in ids {
            session.remove_city(&id);
        }

        assert!(session.cities().is_empty());
        assert!(session.reference_city().is_none());
        assert_eq!(session.controller().reference_tz(), DEFAULT_REFERENCE_TZ);
        assert!(session.rows().is_empty());
    }

    #[test]
    fn test_tick_during_drag() {
        let t0 = Instant::now();
        let mut session = TimelineSession::start(None, now(), t0);
        session.pointer(PointerEvent::Press(120.0), &strip());

        let later = now() + chrono::Duration::seconds(30);
        assert!(!session.tick(t0 + Duration::from_secs(10), later));
        assert!(session.tick(t0 + Duration::from_secs(30), later));

        assert_eq!(session.controller().now(), later);
        assert!(session.controller().is_dragging());
        assert_eq!(session.controller().selected_hour(), 3.0);

        session.pointer(PointerEvent::Release, &strip());
        assert!(!session.controller().is_dragging());
    }

    #[test]
    fn test_ended_session_stops_refreshing() {
        let t0 = Instant::now();
        let mut session = TimelineSession::start(None, now(), t0);
        session.end();

        assert!(!session.is_running());
        assert!(!session.tick(t0 + Duration::from_secs(300), now() + chrono::Duration::minutes(5)));
        assert_eq!(session.controller().now(), now());
    }

    #[test]
    fn test_refresh_now_outside_timer() {
        let mut session = TimelineSession::start(None, now(), Instant::now());
        let later = now() + chrono::Duration::minutes(45);

        session.refresh_now(later);

        assert_eq!(session.controller().now(), later);
        assert_eq!(session.controller().selected(), now());
        assert_eq!(session.controller().now_hour(), 15.25);
    }

    #[test]
    fn test_rows_and_heading() {
        let mut session = TimelineSession::start(None, now(), Instant::now());
        session.pointer(PointerEvent::Press(23.75 * 40.0), &strip());
        session.pointer(PointerEvent::Release, &strip());

        assert_eq!(session.selected_heading(), "Tue 16 Jan 2024 • 00:00");

        let rows = session.rows();
        assert_eq!(rows.len(), 5);
        assert!(rows[0].is_reference);
        assert!(rows[1..].iter().all(|r| !r.is_reference));

        let new_york = rows.iter().find(|r| r.city.id() == "America/New_York").unwrap();
        assert_eq!(new_york.date_break, Some(7));
        assert_eq!(new_york.relation, DateRelation::Prev);

        let tokyo = rows.iter().find(|r| r.city.id() == "Asia/Tokyo").unwrap();
        assert_eq!(tokyo.relation, DateRelation::Same);
    }

    #[test]
    fn test_pinned_date() {
        let mut session = TimelineSession::start(None, now(), Instant::now());
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        session.set_reference_date(ReferenceDate::Pinned(date));

        assert_eq!(session.controller().reference_day().date_naive(), date);
        assert_eq!(session.selected_heading(), "Thu 29 Feb 2024 • 14:30");
    }
}
