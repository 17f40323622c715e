#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod classify;
mod gazetteer;
mod normalize;
mod parse;
mod paths;
mod records;
mod sources;

use anyhow::Result;
use serde::Serialize;

pub use self::classify::{Category, CityClassifier};
pub use self::gazetteer::Gazetteer;
pub use self::normalize::CityNormalizer;
pub use self::parse::{is_placeholder, parse_route_text, RouteSegment, Waypoint};
pub use self::paths::flight_path;
pub use self::records::{
    dedupe, fill_geometry, Diagnostics, DirectedRouteRecord, Direction, RawRouteEntry,
    RecordBuilder,
};
pub use self::sources::load_table;

#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOptions {
    /// Collapse records restating the same (airline, origin, destination,
    /// aircraft, direction) fact down to the first occurrence.
    pub deduplicate: bool,
}

/// The cleaned route set, ready for tabular display or map rendering.
pub struct Model {
    pub records: Vec<DirectedRouteRecord>,
    pub gazetteer: Gazetteer,
    pub diagnostics: Diagnostics,
}

impl Model {
    /// Loads and concatenates several source tables, then runs the full
    /// pipeline. A source that can't be read or parsed is skipped with a
    /// warning; it's only fatal when nothing loads at all.
    pub fn load(paths: &[String], options: LoadOptions) -> Result<Self> {
        let mut entries = Vec::new();
        let mut loaded = 0;
        for path in paths {
            match std::fs::File::open(path)
                .map_err(anyhow::Error::new)
                .and_then(load_table)
            {
                Ok(mut table) => {
                    info!("Loaded {} rows from {path}", table.len());
                    entries.append(&mut table);
                    loaded += 1;
                }
                Err(err) => {
                    warn!("Skipping {path}: {err}");
                }
            }
        }
        if loaded == 0 {
            bail!("None of the {} sources could be loaded", paths.len());
        }
        Ok(Self::from_entries(entries, Gazetteer::builtin(), options))
    }

    pub fn from_entries(
        entries: Vec<RawRouteEntry>,
        gazetteer: Gazetteer,
        options: LoadOptions,
    ) -> Self {
        let mut builder = RecordBuilder::builtin();
        let mut records = Vec::new();
        for entry in &entries {
            records.extend(builder.build(entry));
        }
        let mut diagnostics = builder.diagnostics;
        if options.deduplicate {
            diagnostics.duplicates_removed = dedupe(&mut records);
        }
        diagnostics.unresolved_cities = fill_geometry(&mut records, &gazetteer);
        diagnostics.log_summary();
        Self {
            records,
            gazetteer,
            diagnostics,
        }
    }

    /// One flat CSV row per record, the persisted intermediate form.
    pub fn export_to_csv(&self) -> Result<String> {
        let mut out = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut out);
            for rec in &self.records {
                writer.serialize(ExportRecordRow {
                    airline: rec.airline.clone(),
                    aircraft: rec.aircraft.clone(),
                    age: rec.age.clone(),
                    origin: rec.origin.clone(),
                    destination: rec.destination.clone(),
                    direction: rec.direction,
                    origin_category: rec.origin_category,
                    destination_category: rec.destination_category,
                    origin_lon: rec.origin_pos.map(|p| p.x()),
                    origin_lat: rec.origin_pos.map(|p| p.y()),
                    destination_lon: rec.destination_pos.map(|p| p.x()),
                    destination_lat: rec.destination_pos.map(|p| p.y()),
                    distance_km: rec.distance_km,
                    duration: rec.duration.clone(),
                    full_route_text: rec.full_route_text.clone(),
                })?;
            }
            writer.flush()?;
        }
        let out = String::from_utf8(out)?;
        Ok(out)
    }

    /// A FeatureCollection of LineString render paths, one per record with
    /// both endpoints resolved. `num_points` controls how finely each
    /// great-circle arc is sampled.
    pub fn export_paths_geojson(&self, num_points: usize) -> Result<String> {
        use geojson::{Feature, FeatureCollection, GeoJson};

        let mut features = Vec::new();
        for rec in &self.records {
            let (from, to) = match (rec.origin_pos, rec.destination_pos) {
                (Some(from), Some(to)) => (from, to),
                _ => {
                    continue;
                }
            };
            let line = flight_path(from, to, num_points)
                .into_iter()
                .map(|point| vec![point.x(), point.y()])
                .collect();
            let mut feature = Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::LineString(line))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("airline", rec.airline.clone());
            if let Some(aircraft) = &rec.aircraft {
                feature.set_property("aircraft", aircraft.clone());
            }
            feature.set_property("origin", rec.origin.clone());
            feature.set_property("destination", rec.destination.clone());
            feature.set_property("direction", rec.direction.to_string());
            if let Some(km) = rec.distance_km {
                feature.set_property("distance_km", km);
            }
            features.push(feature);
        }

        let gj = GeoJson::FeatureCollection(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        });
        Ok(serde_json::to_string_pretty(&gj)?)
    }
}

#[derive(Serialize)]
struct ExportRecordRow {
    airline: String,
    aircraft: Option<String>,
    age: Option<String>,
    origin: String,
    destination: String,
    direction: Direction,
    origin_category: Category,
    destination_category: Category,
    origin_lon: Option<f64>,
    origin_lat: Option<f64>,
    destination_lon: Option<f64>,
    destination_lat: Option<f64>,
    distance_km: Option<f64>,
    duration: Option<String>,
    full_route_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Vec<RawRouteEntry> {
        let csv = "航司,注册号,机型,机龄,出口航线,进口航线,备注\n\
                   中国货运航空,B-2425,B777F,5.2年,上海—安克雷奇—纽约,纽约—上海,\n\
                   ,,,,上海—法兰克福,无近一个月的飞行记录,\n";
        load_table(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let model = Model::from_entries(
            sample_entries(),
            Gazetteer::builtin(),
            LoadOptions::default(),
        );
        // 2 export segments + 1 import + 1 carried-forward export
        assert_eq!(model.records.len(), 4);
        assert_eq!(model.diagnostics.placeholder_texts, 1);
        for rec in &model.records {
            assert_eq!(rec.airline, "中国货运航空");
            assert!(rec.distance_km.is_some());
            assert!(rec.duration.is_some());
        }
        let frankfurt = &model.records[3];
        assert_eq!(frankfurt.origin, "上海");
        assert_eq!(frankfurt.destination, "法兰克福");
        assert_eq!(frankfurt.direction, Direction::Export);
    }

    #[test]
    fn test_export_to_csv() {
        let model = Model::from_entries(
            sample_entries(),
            Gazetteer::builtin(),
            LoadOptions::default(),
        );
        let out = model.export_to_csv().unwrap();
        let mut lines = out.lines();
        assert!(lines
            .next()
            .unwrap()
            .starts_with("airline,aircraft,age,origin,destination"));
        assert_eq!(lines.count(), 4);
        assert!(out.contains("安克雷奇"));
        assert!(out.contains("export"));
        assert!(out.contains("import"));
    }

    #[test]
    fn test_export_paths_geojson() {
        let model = Model::from_entries(
            sample_entries(),
            Gazetteer::builtin(),
            LoadOptions::default(),
        );
        let out = model.export_paths_geojson(16).unwrap();
        let gj: geojson::GeoJson = out.parse().unwrap();
        match gj {
            geojson::GeoJson::FeatureCollection(fc) => {
                assert_eq!(fc.features.len(), 4);
                let first = &fc.features[0];
                assert_eq!(
                    first.property("airline").unwrap().as_str().unwrap(),
                    "中国货运航空"
                );
                match first.geometry.as_ref().unwrap().value {
                    geojson::Value::LineString(ref line) => {
                        assert_eq!(line.len(), 17);
                    }
                    _ => panic!("expected a LineString"),
                }
            }
            _ => panic!("expected a FeatureCollection"),
        }
    }

    #[test]
    fn test_deduplicate_flag() {
        let mut entries = sample_entries();
        entries.extend(sample_entries());
        let model = Model::from_entries(
            entries,
            Gazetteer::builtin(),
            LoadOptions { deduplicate: true },
        );
        assert_eq!(model.records.len(), 4);
        assert_eq!(model.diagnostics.duplicates_removed, 4);
    }

    #[test]
    fn test_load_requires_at_least_one_source() {
        assert!(Model::load(
            &["/definitely/not/a/real/path.csv".to_string()],
            LoadOptions::default()
        )
        .is_err());
    }
}
