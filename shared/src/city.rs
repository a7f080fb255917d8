//! Cities, the active city set, and the built-in catalog
//!
//! A `City` can only exist with a valid timezone, so nothing downstream ever
//! has to handle an unknown zone.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::TimeFormat;
use crate::time_engine::{parse_timezone, TimezoneError};

/// Rejected city definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CityError {
    #[error("City {id}: {source}")]
    Timezone {
        id: String,
        #[source]
        source: TimezoneError,
    },
    #[error("City {id}: invalid country code {code:?}")]
    CountryCode { id: String, code: String },
}

/// Serialized form of a city, validated on the way in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: String,
    pub label: String,
    pub country_code: String,
    pub tz: String,
}

/// A city row on the timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CityRecord", into = "CityRecord")]
pub struct City {
    id: String,
    label: String,
    country_code: String,
    tz: Tz,
}

impl City {
    /// Build a city, rejecting unknown timezones and malformed country codes
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        country_code: &str,
        tz: &str,
    ) -> Result<Self, CityError> {
        let id = id.into();
        let tz = parse_timezone(tz).map_err(|source| CityError::Timezone {
            id: id.clone(),
            source,
        })?;

        if country_code.len() != 2 || !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CityError::CountryCode {
                id,
                code: country_code.to_string(),
            });
        }

        Ok(Self {
            id,
            label: label.into(),
            country_code: country_code.to_ascii_uppercase(),
            tz,
        })
    }

    /// A city keyed by its timezone, labelled from the last path component
    pub fn from_timezone(tz: Tz, country_code: &str) -> Result<Self, CityError> {
        let label = tz
            .name()
            .rsplit('/')
            .next()
            .unwrap_or(tz.name())
            .replace('_', " ");
        Self::new(tz.name(), label, country_code, tz.name())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }
}

impl TryFrom<CityRecord> for City {
    type Error = CityError;

    fn try_from(record: CityRecord) -> Result<Self, Self::Error> {
        City::new(record.id, record.label, &record.country_code, &record.tz)
    }
}

impl From<City> for CityRecord {
    fn from(city: City) -> Self {
        CityRecord {
            id: city.id,
            label: city.label,
            country_code: city.country_code,
            tz: city.tz.name().to_string(),
        }
    }
}

/// Ordered set of cities, unique by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitySet {
    cities: Vec<City>,
}

impl CitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a city; a city whose id is already present is ignored
    ///
    /// Returns whether the set changed.
    pub fn insert(&mut self, city: City) -> bool {
        if self.contains(city.id()) {
            return false;
        }
        self.cities.push(city);
        true
    }

    /// Remove a city by id, returning it if it was present
    pub fn remove(&mut self, id: &str) -> Option<City> {
        let pos = self.cities.iter().position(|c| c.id() == id)?;
        Some(self.cities.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn first(&self) -> Option<&City> {
        self.cities.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl FromIterator<City> for CitySet {
    fn from_iter<I: IntoIterator<Item = City>>(iter: I) -> Self {
        let mut set = CitySet::new();
        for city in iter {
            set.insert(city);
        }
        set
    }
}

/// User preferences persisted next to the city set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub time_format: TimeFormat,
    pub reference_city_id: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::H24,
            reference_city_id: SEED_CITIES[0].0.to_string(),
        }
    }
}

/// (id, label, country code, timezone)
type CatalogEntry = (&'static str, &'static str, &'static str, &'static str);

const SEED_CITIES: [CatalogEntry; 5] = [
    ("Europe/Helsinki", "Helsinki", "FI", "Europe/Helsinki"),
    ("Europe/London", "London", "GB", "Europe/London"),
    ("America/New_York", "New York", "US", "America/New_York"),
    ("Asia/Tokyo", "Tokyo", "JP", "Asia/Tokyo"),
    ("Australia/Sydney", "Sydney", "AU", "Australia/Sydney"),
];

const EXTRA_POPULAR_CITIES: [CatalogEntry; 8] = [
    ("Europe/Paris", "Paris", "FR", "Europe/Paris"),
    ("Europe/Berlin", "Berlin", "DE", "Europe/Berlin"),
    ("America/Los_Angeles", "Los Angeles", "US", "America/Los_Angeles"),
    ("America/Chicago", "Chicago", "US", "America/Chicago"),
    ("Asia/Singapore", "Singapore", "SG", "Asia/Singapore"),
    ("Asia/Dubai", "Dubai", "AE", "Asia/Dubai"),
    ("Asia/Shanghai", "Shanghai", "CN", "Asia/Shanghai"),
    ("America/Sao_Paulo", "São Paulo", "BR", "America/Sao_Paulo"),
];

fn catalog(entries: &[CatalogEntry]) -> Vec<City> {
    entries
        .iter()
        .filter_map(|&(id, label, cc, tz)| City::new(id, label, cc, tz).ok())
        .collect()
}

/// Cities shown on first launch
pub fn seed_cities() -> Vec<City> {
    catalog(&SEED_CITIES)
}

/// Cities offered by the add-city picker
pub fn popular_cities() -> Vec<City> {
    let mut cities = seed_cities();
    cities.extend(catalog(&EXTRA_POPULAR_CITIES));
    cities
}

/// Filter the popular cities by label, id or country code
pub fn search_catalog(query: &str) -> Vec<City> {
    let query = query.trim().to_lowercase();
    popular_cities()
        .into_iter()
        .filter(|c| {
            query.is_empty()
                || c.label().to_lowercase().contains(&query)
                || c.id().to_lowercase().contains(&query)
                || c.country_code().to_lowercase() == query
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_rejects_unknown_timezone() {
        let err = City::new("X", "Nowhere", "XX", "Nowhere/Atlantis").unwrap_err();
        assert!(matches!(err, CityError::Timezone { .. }));
        assert!(err.to_string().contains("Nowhere/Atlantis"));
    }

    #[test]
    fn test_city_rejects_bad_country_code() {
        let err = City::new("Europe/Oslo", "Oslo", "NOR", "Europe/Oslo").unwrap_err();
        assert_eq!(
            err,
            CityError::CountryCode {
                id: "Europe/Oslo".to_string(),
                code: "NOR".to_string()
            }
        );
    }

    #[test]
    fn test_country_code_is_uppercased() {
        let city = City::new("Europe/Oslo", "Oslo", "no", "Europe/Oslo").unwrap();
        assert_eq!(city.country_code(), "NO");
    }

    #[test]
    fn test_from_timezone_label() {
        let city = City::from_timezone("America/Los_Angeles".parse().unwrap(), "US").unwrap();
        assert_eq!(city.id(), "America/Los_Angeles");
        assert_eq!(city.label(), "Los Angeles");
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut set: CitySet = seed_cities().into_iter().collect();
        let before = set.clone();

        let duplicate = City::new("Asia/Tokyo", "Tokyo again", "JP", "Asia/Tokyo").unwrap();
        assert!(!set.insert(duplicate));
        assert_eq!(set, before);
        assert_eq!(set.get("Asia/Tokyo").unwrap().label(), "Tokyo");
    }

    #[test]
    fn test_insert_and_remove_keep_order() {
        let mut set: CitySet = seed_cities().into_iter().collect();
        let paris = City::new("Europe/Paris", "Paris", "FR", "Europe/Paris").unwrap();

        assert!(set.insert(paris));
        assert_eq!(set.iter().last().unwrap().id(), "Europe/Paris");

        let removed = set.remove("Europe/London").unwrap();
        assert_eq!(removed.label(), "London");
        assert!(set.remove("Europe/London").is_none());
        let ids: Vec<&str> = set.iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            ["Europe/Helsinki", "America/New_York", "Asia/Tokyo", "Australia/Sydney", "Europe/Paris"]
        );
    }

    #[test]
    fn test_catalogs() {
        assert_eq!(seed_cities().len(), 5);
        assert_eq!(popular_cities().len(), 13);
        assert_eq!(Preferences::default().reference_city_id, "Europe/Helsinki");

        let german: Vec<String> = search_catalog("DE").iter().map(|c| c.label().to_string()).collect();
        assert_eq!(german, ["Berlin"]);
        assert_eq!(search_catalog("paulo")[0].id(), "America/Sao_Paulo");
        assert_eq!(search_catalog("").len(), 13);
    }
}
