#![allow(dead_code)]

use vaxmap_metrics_models::{MetricRecord, RegionGeometry, RegionId, Year};
use vaxmap_session::{AppConfig, Datasets, Session};

pub const AFGHANISTAN: RegionId = RegionId::new(4);
pub const ALBANIA: RegionId = RegionId::new(8);
pub const ANTARCTICA: RegionId = RegionId::new(10);
pub const CANADA: RegionId = RegionId::new(124);

fn record(id: RegionId, country: &str, year: i32, coverage: f64, incidents: f64) -> MetricRecord {
    MetricRecord {
        id,
        year: Year::new(year),
        country: country.to_string(),
        coverage: Some(coverage),
        incidents: Some(incidents),
        incidents_total: Some(incidents * 10.0),
        population: Some(1_000_000.0),
    }
}

fn geometry(id: RegionId) -> RegionGeometry {
    RegionGeometry {
        id,
        shape: serde_json::json!({"type": "Polygon", "id": id.value()}),
    }
}

/// Afghanistan has a record every year, Canada only from 2000, Albania
/// never. Antarctica has data but is excluded by default.
pub fn datasets() -> Datasets {
    let mut records = Vec::new();
    for year in 1980..=2019 {
        let step = f64::from(year - 1980);
        records.push(record(AFGHANISTAN, "Afghanistan", year, 20.0 + step * 2.0, 1.5));
        records.push(record(ANTARCTICA, "Antarctica", year, 99.0, 0.0));
        if year >= 2000 {
            records.push(record(CANADA, "Canada", year, 90.0, 0.0));
        }
    }

    Datasets {
        regions: vec![
            geometry(AFGHANISTAN),
            geometry(ALBANIA),
            geometry(ANTARCTICA),
            geometry(CANADA),
        ],
        records,
    }
}

pub fn session() -> Session {
    Session::new(datasets(), &AppConfig::default()).unwrap()
}
