use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::classify::{Category, CityClassifier};
use crate::gazetteer::Gazetteer;
use crate::normalize::CityNormalizer;
use crate::parse::{is_placeholder, parse_route_text};

/// One input row, as ingested. Optional fields use None as the single
/// missing-value representation; the sentinels in the sheets ("nan", blank
/// cells) are collapsed at ingestion, not checked downstream.
#[derive(Clone, Debug)]
pub struct RawRouteEntry {
    /// Empty when the source row had no airline and no group to continue
    pub airline: String,
    pub registration: Option<String>,
    pub aircraft: Option<String>,
    pub age: Option<String>,
    pub export_routes: Option<String>,
    pub import_routes: Option<String>,
    pub remarks: Option<String>,
}

/// Assigned by column provenance, never inferred from geography.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Export,
    Import,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Export => write!(f, "export"),
            Direction::Import => write!(f, "import"),
        }
    }
}

/// One directed edge of the cleaned route set. Created once per parsed
/// segment and never mutated afterwards, except to backfill coordinates,
/// distance, and duration once the gazetteer resolves both endpoints.
#[derive(Clone, Debug)]
pub struct DirectedRouteRecord {
    pub airline: String,
    pub aircraft: Option<String>,
    pub age: Option<String>,
    pub origin: String,
    pub destination: String,
    pub direction: Direction,
    pub full_route_text: String,
    pub origin_category: Category,
    pub destination_category: Category,
    pub origin_pos: Option<Point<f64>>,
    pub destination_pos: Option<Point<f64>>,
    pub distance_km: Option<f64>,
    pub duration: Option<String>,
}

impl DirectedRouteRecord {
    /// Two records are the same fact exactly when these match. Direction is
    /// part of the identity on purpose: an export and an import leg over the
    /// same city pair stay separate records.
    fn dedup_key(&self) -> (String, String, String, String, Direction) {
        (
            self.airline.clone(),
            self.origin.clone(),
            self.destination.clone(),
            self.aircraft.clone().unwrap_or_default(),
            self.direction,
        )
    }
}

/// Counts of everything the pipeline skipped or changed, for one summary
/// line at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub rows_without_airline: usize,
    pub placeholder_texts: usize,
    pub self_loops: usize,
    pub invalid_cities: usize,
    pub duplicates_removed: usize,
    pub unresolved_cities: usize,
}

impl Diagnostics {
    pub fn log_summary(&self) {
        info!(
            "Pipeline skipped {} rows without an airline, {} placeholder route texts, {} \
             self-loops, {} segments with an invalid endpoint; removed {} duplicates; {} \
             cities missing from the gazetteer",
            self.rows_without_airline,
            self.placeholder_texts,
            self.self_loops,
            self.invalid_cities,
            self.duplicates_removed,
            self.unresolved_cities
        );
    }
}

/// Joins parsed route segments with per-row metadata into flat directed-edge
/// records.
pub struct RecordBuilder {
    normalizer: CityNormalizer,
    classifier: CityClassifier,
    pub diagnostics: Diagnostics,
}

impl RecordBuilder {
    pub fn new(normalizer: CityNormalizer, classifier: CityClassifier) -> Self {
        Self {
            normalizer,
            classifier,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(CityNormalizer::builtin(), CityClassifier::builtin())
    }

    pub fn build(&mut self, entry: &RawRouteEntry) -> Vec<DirectedRouteRecord> {
        if entry.airline.is_empty() {
            self.diagnostics.rows_without_airline += 1;
            return Vec::new();
        }

        let mut records = Vec::new();
        for (text, direction) in [
            (&entry.export_routes, Direction::Export),
            (&entry.import_routes, Direction::Import),
        ] {
            let text = match text {
                Some(text) => text,
                None => {
                    continue;
                }
            };
            if is_placeholder(text) {
                self.diagnostics.placeholder_texts += 1;
                continue;
            }
            for segment in parse_route_text(&self.normalizer, &self.classifier, text) {
                if segment.origin.name == segment.destination.name {
                    self.diagnostics.self_loops += 1;
                    continue;
                }
                // Both endpoints must independently be real cities
                if !self.classifier.is_valid(&segment.origin.name)
                    || !self.classifier.is_valid(&segment.destination.name)
                {
                    self.diagnostics.invalid_cities += 1;
                    continue;
                }
                records.push(DirectedRouteRecord {
                    airline: entry.airline.clone(),
                    aircraft: entry.aircraft.clone(),
                    age: entry.age.clone(),
                    origin: segment.origin.name,
                    destination: segment.destination.name,
                    direction,
                    full_route_text: segment.full_text,
                    origin_category: segment.origin.category,
                    destination_category: segment.destination.category,
                    origin_pos: None,
                    destination_pos: None,
                    distance_km: None,
                    duration: None,
                });
            }
        }
        records
    }
}

/// Drops records restating a fact already seen; first occurrence wins.
/// Records sharing a city pair but differing in airline or aircraft are
/// distinct facts and always survive. Returns how many were dropped.
pub fn dedupe(records: &mut Vec<DirectedRouteRecord>) -> usize {
    let before = records.len();
    let mut seen = BTreeSet::new();
    records.retain(|rec| seen.insert(rec.dedup_key()));
    before - records.len()
}

/// Backfills coordinates, great-circle distance, and estimated duration for
/// every record whose endpoints both resolve. A gazetteer miss keeps the
/// record (tabular display still wants it); only geometry consumers skip it.
/// Returns the number of records left without coordinates.
pub fn fill_geometry(records: &mut [DirectedRouteRecord], gazetteer: &Gazetteer) -> usize {
    let mut missing_cities: BTreeMap<String, usize> = BTreeMap::new();
    let mut unresolved_records = 0;

    for rec in records.iter_mut() {
        rec.origin_pos = gazetteer.resolve(&rec.origin);
        rec.destination_pos = gazetteer.resolve(&rec.destination);
        for (city, pos) in [
            (&rec.origin, rec.origin_pos),
            (&rec.destination, rec.destination_pos),
        ] {
            if pos.is_none() {
                *missing_cities.entry(city.clone()).or_insert(0) += 1;
            }
        }
        match (rec.origin_pos, rec.destination_pos) {
            (Some(from), Some(to)) => {
                let km = (Haversine.distance(from, to) / 1000.0).round();
                rec.distance_km = Some(km);
                rec.duration = Some(estimate_duration(km, rec.aircraft.as_deref()));
            }
            _ => {
                unresolved_records += 1;
            }
        }
    }

    for (city, count) in &missing_cities {
        warn!("No coordinates for {city} ({count} records)");
    }
    unresolved_records
}

// Typical cruise speeds in km/h by airframe family
const CRUISE_SPEEDS: &[(&str, f64)] = &[
    ("B737", 850.0),
    ("B747", 900.0),
    ("B757", 850.0),
    ("B767", 850.0),
    ("B777", 900.0),
    ("B787", 900.0),
    ("A320", 840.0),
    ("A330", 880.0),
    ("A340", 880.0),
    ("A350", 900.0),
    ("A380", 900.0),
];
const DEFAULT_CRUISE_SPEED: f64 = 850.0;

fn estimate_duration(distance_km: f64, aircraft: Option<&str>) -> String {
    let mut speed = DEFAULT_CRUISE_SPEED;
    if let Some(aircraft) = aircraft {
        let aircraft = aircraft.to_ascii_uppercase();
        for (family, kmh) in CRUISE_SPEEDS {
            if aircraft.contains(family) {
                speed = *kmh;
                break;
            }
        }
    }
    let total_minutes = (distance_km / speed * 60.0).round() as usize;
    format!("{}h{:02}m", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(airline: &str, export: Option<&str>, import: Option<&str>) -> RawRouteEntry {
        RawRouteEntry {
            airline: airline.to_string(),
            registration: Some("B-220F".to_string()),
            aircraft: Some("B777F".to_string()),
            age: Some("3.2".to_string()),
            export_routes: export.map(|t| t.to_string()),
            import_routes: import.map(|t| t.to_string()),
            remarks: None,
        }
    }

    #[test]
    fn test_multi_hop_expansion() {
        let mut builder = RecordBuilder::builtin();
        let records = builder.build(&entry("中货航", Some("上海—安克雷奇—纽约"), None));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].origin, "上海");
        assert_eq!(records[0].destination, "安克雷奇");
        assert_eq!(records[1].origin, "安克雷奇");
        assert_eq!(records[1].destination, "纽约");
        for rec in &records {
            assert_eq!(rec.direction, Direction::Export);
            assert_eq!(rec.full_route_text, "上海—安克雷奇—纽约");
        }
        assert_eq!(records[0].origin_category, Category::Domestic);
        assert_eq!(records[0].destination_category, Category::International);
    }

    #[test]
    fn test_direction_by_provenance() {
        let mut builder = RecordBuilder::builtin();
        // The import column also reads left-to-right; direction comes from
        // the column, not from which end is domestic
        let records = builder.build(&entry("中货航", None, Some("纽约—上海")));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].direction, Direction::Import);
        assert_eq!(records[0].origin, "纽约");
        assert_eq!(records[0].destination, "上海");
    }

    #[test]
    fn test_placeholder_rows() {
        let mut builder = RecordBuilder::builtin();
        let records = builder.build(&entry("中货航", Some("无近一个月的飞行记录"), None));
        assert!(records.is_empty());
        assert_eq!(builder.diagnostics.placeholder_texts, 1);
    }

    #[test]
    fn test_empty_airline_skipped() {
        let mut builder = RecordBuilder::builtin();
        let records = builder.build(&entry("", Some("上海—纽约"), None));
        assert!(records.is_empty());
        assert_eq!(builder.diagnostics.rows_without_airline, 1);
    }

    #[test]
    fn test_self_loop_dropped() {
        let mut builder = RecordBuilder::builtin();
        // 上海 and 上海浦东 normalize to the same city
        let records = builder.build(&entry("中货航", Some("上海—上海浦东"), None));
        assert!(records.is_empty());
        assert_eq!(builder.diagnostics.self_loops, 1);
    }

    #[test]
    fn test_invalid_endpoint_dropped() {
        let mut builder = RecordBuilder::builtin();
        let records = builder.build(&entry("中货航", Some("上海—亚特兰蒂斯"), None));
        assert!(records.is_empty());
        assert_eq!(builder.diagnostics.invalid_cities, 1);
    }

    #[test]
    fn test_dedupe_exact_restatements() {
        let mut builder = RecordBuilder::builtin();
        let mut records = builder.build(&entry("中货航", Some("上海—纽约"), None));
        records.extend(builder.build(&entry("中货航", Some("上海—纽约"), None)));
        assert_eq!(records.len(), 2);
        assert_eq!(dedupe(&mut records), 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_dedupe_preserves_distinct_operators() {
        let mut builder = RecordBuilder::builtin();
        let mut records = builder.build(&entry("中货航", Some("上海—纽约"), None));
        records.extend(builder.build(&entry("国货航", Some("上海—纽约"), None)));
        // Same pair, different aircraft
        let mut other = entry("中货航", Some("上海—纽约"), None);
        other.aircraft = Some("B747F".to_string());
        records.extend(builder.build(&other));
        // Same pair, other direction tag
        records.extend(builder.build(&entry("中货航", None, Some("上海—纽约"))));
        assert_eq!(records.len(), 4);
        assert_eq!(dedupe(&mut records), 0);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_fill_geometry() {
        let mut builder = RecordBuilder::builtin();
        let mut records = builder.build(&entry("中货航", Some("上海—纽约"), None));
        let unresolved = fill_geometry(&mut records, &Gazetteer::builtin());
        assert_eq!(unresolved, 0);
        let rec = &records[0];
        assert!(rec.origin_pos.is_some());
        assert!(rec.destination_pos.is_some());
        // Great-circle Shanghai to New York is roughly 11,900 km
        let km = rec.distance_km.unwrap();
        assert!(km > 11_000.0 && km < 13_000.0, "{km}");
        // B777 cruises at 900 km/h, so this is a 12-14 hour leg
        let duration = rec.duration.clone().unwrap();
        assert!(
            duration.starts_with("12h") || duration.starts_with("13h") || duration.starts_with("14h"),
            "{duration}"
        );
    }

    #[test]
    fn test_unresolved_city_retained() {
        let classifier = CityClassifier::builtin();
        let mut domestic = BTreeSet::new();
        domestic.insert("上海".to_string());
        let mut international = classifier.known_cities();
        international.remove("上海");
        international.insert("香格里拉".to_string());
        let classifier = CityClassifier::new(domestic, international);
        let mut builder = RecordBuilder::new(CityNormalizer::builtin(), classifier);
        let mut records = builder.build(&entry("中货航", Some("上海—香格里拉"), None));
        assert_eq!(records.len(), 1);

        // 香格里拉 passes validity but isn't in the gazetteer
        let unresolved = fill_geometry(&mut records, &Gazetteer::builtin());
        assert_eq!(unresolved, 1);
        assert!(records[0].origin_pos.is_some());
        assert!(records[0].destination_pos.is_none());
        assert!(records[0].distance_km.is_none());
    }

    #[test]
    fn test_estimate_duration() {
        assert_eq!(estimate_duration(900.0, Some("B777F")), "1h00m");
        assert_eq!(estimate_duration(850.0, None), "1h00m");
        assert_eq!(estimate_duration(2125.0, Some("未知机型")), "2h30m");
    }
}
