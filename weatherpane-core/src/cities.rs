//! Static US/Canada city list used by the city picker.

use std::{collections::HashSet, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::{error::WeatherError, model::Coordinates};

/// Countries kept when building the index.
pub const COUNTRIES: &[&str] = &["US", "CA"];

const BUNDLED_CITIES: &str = include_str!("../data/cities.json");

/// One row of the source dataset. Fields we don't need are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CityRecord {
    pub id: u64,
    pub name: String,
    pub country: String,
    pub coord: CityCoord,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CityCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityEntry {
    pub id: u64,
    pub name: String,
    pub country_code: String,
    pub coordinates: Coordinates,
}

/// Filtered, name-unique city list. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CityIndex {
    entries: Vec<CityEntry>,
}

impl CityIndex {
    /// Keep `US`/`CA` rows, then the first row for each name in source order.
    /// Rows with out-of-range coordinates are skipped.
    pub fn from_records(records: impl IntoIterator<Item = CityRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for record in records {
            if !COUNTRIES.contains(&record.country.as_str()) {
                continue;
            }
            if seen.contains(&record.name) {
                continue;
            }

            let Ok(coordinates) = Coordinates::new(record.coord.lat, record.coord.lon) else {
                debug!(
                    id = record.id,
                    name = %record.name,
                    "skipping city with invalid coordinates"
                );
                continue;
            };

            seen.insert(record.name.clone());
            entries.push(CityEntry {
                id: record.id,
                name: record.name,
                country_code: record.country,
                coordinates,
            });
        }

        Self { entries }
    }

    pub fn from_json_str(json: &str) -> Result<Self, WeatherError> {
        let records: Vec<CityRecord> =
            serde_json::from_str(json).map_err(|e| WeatherError::CityData(e.to_string()))?;
        Ok(Self::from_records(records))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WeatherError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| WeatherError::CityData(format!("{}: {e}", path.display())))?;

        let index = Self::from_json_str(&json)?;
        debug!(path = %path.display(), cities = index.len(), "city index loaded");
        Ok(index)
    }

    /// Small dataset compiled into the crate.
    pub fn bundled() -> Self {
        // The bundled file is covered by tests; an empty index is the only
        // sane fallback if it were ever broken.
        Self::from_json_str(BUNDLED_CITIES).unwrap_or_default()
    }

    /// Case-insensitive substring search on the city name, sorted by name.
    /// An empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&CityEntry> {
        if query.is_empty() {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let mut matches: Vec<&CityEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .collect();

        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CityEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, name: &str, country: &str, lat: f64, lon: f64) -> CityRecord {
        CityRecord {
            id,
            name: name.to_string(),
            country: country.to_string(),
            coord: CityCoord { lat, lon },
        }
    }

    fn names<'a>(entries: &[&'a CityEntry]) -> Vec<&'a str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn keeps_only_us_and_canada() {
        let index = CityIndex::from_records([
            record(1, "Toronto", "CA", 43.7, -79.4),
            record(2, "Lyon", "FR", 45.7, 4.8),
            record(3, "Reno", "US", 39.5, -119.8),
        ]);

        let kept: Vec<_> = index.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(kept, ["Toronto", "Reno"]);
    }

    #[test]
    fn dedupes_by_name_keeping_first_occurrence() {
        let index = CityIndex::from_records([
            record(10, "Springfield", "US", 39.8, -89.6),
            record(11, "Springfield", "US", 37.2, -93.3),
            record(12, "Albany", "US", 42.6, -73.7),
        ]);

        let springfield = index.search("springfield");
        assert_eq!(index.len(), 2);
        assert_eq!(springfield.len(), 1);
        assert_eq!(springfield[0].id, 10);
    }

    #[test]
    fn filter_runs_before_dedupe() {
        // A foreign duplicate listed first must not shadow the US entry.
        let index = CityIndex::from_records([
            record(1, "London", "GB", 51.5, -0.1),
            record(2, "London", "CA", 42.98, -81.23),
        ]);

        let london = index.search("London");
        assert_eq!(london.len(), 1);
        assert_eq!(london[0].country_code, "CA");
    }

    #[test]
    fn empty_query_returns_nothing() {
        assert!(CityIndex::bundled().search("").is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring_sorted_by_name() {
        let index = CityIndex::bundled();

        let hits = index.search("San");
        assert_eq!(
            names(&hits),
            ["San Antonio", "San Diego", "San Francisco", "San Jose", "Santa Ana"]
        );

        // Match in the middle of a name.
        let hits = index.search("LAND");
        assert_eq!(names(&hits), ["Oakland", "Portland"]);
    }

    #[test]
    fn bundled_dataset_is_filtered_and_unique() {
        let index = CityIndex::bundled();
        assert!(!index.is_empty());

        let mut seen = HashSet::new();
        for entry in index.iter() {
            assert!(COUNTRIES.contains(&entry.country_code.as_str()));
            assert!(seen.insert(entry.name.clone()), "duplicate {}", entry.name);
        }

        // Vancouver, BC is listed before Vancouver, WA.
        assert_eq!(index.search("vancouver")[0].country_code, "CA");
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = CityIndex::from_json_str("{").unwrap_err();
        assert!(matches!(err, WeatherError::CityData(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.json");
        std::fs::write(
            &path,
            r#"[{"id":1,"name":"Boise","country":"US","coord":{"lat":43.6,"lon":-116.2},"state":"ID"}]"#,
        )
        .unwrap();

        let index = CityIndex::load(&path).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.search("ois")[0].coordinates.lat(), 43.6);
    }
}
