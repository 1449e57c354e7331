#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Disease-surveillance metric types shared across the vaxmap workspace.
//!
//! A [`MetricRecord`] is one row of the metrics dataset: one country in one
//! year, carrying vaccine coverage and incident rates. Years and region ids
//! are normalized to integers on ingest; the raw dataset encodes both as
//! either strings or numbers, and numeric fields may hold `null` or the
//! literal string `"null"`.

pub mod de;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// A calendar year, stored as an integer and formatted as a string only
/// at the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(i32);

impl Year {
    /// Wraps a raw integer year.
    #[must_use]
    pub const fn new(year: i32) -> Self {
        Self(year)
    }

    /// Returns the integer value of this year.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns the following year.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not an integer year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseYearError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseYearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid year {:?}: expected an integer", self.input)
    }
}

impl std::error::Error for ParseYearError {}

impl FromStr for Year {
    type Err = ParseYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(Self).map_err(|_| ParseYearError {
            input: s.to_string(),
        })
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = de::integer_like(deserializer)?;
        i32::try_from(value)
            .map(Self)
            .map_err(|_| serde::de::Error::custom(format!("year {value} out of range")))
    }
}

/// Numeric region code shared between the topology and metrics datasets
/// (ISO 3166-1 numeric for countries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RegionId(u32);

impl RegionId {
    /// Wraps a raw numeric region code.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric region code.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RegionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}

impl<'de> Deserialize<'de> for RegionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = de::integer_like(deserializer)?;
        u32::try_from(value)
            .map(Self)
            .map_err(|_| serde::de::Error::custom(format!("region id {value} out of range")))
    }
}

/// The two metrics that can drive the map colouring.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricKind {
    /// Vaccine coverage, percent of the target population (0-100).
    Coverage,
    /// Incident rate per 100k population.
    Incidents,
}

impl MetricKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Coverage, Self::Incidents]
    }
}

/// The set of metrics currently toggled on in the UI.
///
/// The empty set is legal and renders every region as "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedMetrics(BTreeSet<MetricKind>);

impl SelectedMetrics {
    /// No metric selected.
    #[must_use]
    pub const fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Every metric selected.
    #[must_use]
    pub fn all() -> Self {
        MetricKind::all().iter().copied().collect()
    }

    /// Turns a metric on or off.
    pub fn set(&mut self, metric: MetricKind, enabled: bool) {
        if enabled {
            self.0.insert(metric);
        } else {
            self.0.remove(&metric);
        }
    }

    /// Whether `metric` is selected.
    #[must_use]
    pub fn contains(&self, metric: MetricKind) -> bool {
        self.0.contains(&metric)
    }

    /// Whether no metric is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the selected metrics in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<MetricKind> for SelectedMetrics {
    fn from_iter<I: IntoIterator<Item = MetricKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for SelectedMetrics {
    type Err = strum::ParseError;

    /// Parses a comma-separated list such as `"coverage,incidents"`. The
    /// empty string yields the empty set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse::<MetricKind>)
            .collect()
    }
}

/// One row of the metrics dataset: a region in a given year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Region code, shared with the topology dataset.
    pub id: RegionId,
    /// Year of the observation.
    pub year: Year,
    /// Display name of the country.
    #[serde(default)]
    pub country: String,
    /// Vaccine coverage in percent.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub coverage: Option<f64>,
    /// Incident rate per 100k population.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub incidents: Option<f64>,
    /// Absolute incident count.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub incidents_total: Option<f64>,
    /// Total population.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub population: Option<f64>,
}

impl MetricRecord {
    /// Returns the value of the given metric, if present.
    #[must_use]
    pub const fn metric(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::Coverage => self.coverage,
            MetricKind::Incidents => self.incidents,
        }
    }
}

/// The selected, present metric values of one region in one year.
///
/// Metrics that are not selected, or that the record leaves absent, are
/// omitted. An empty projection renders as "no data".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricProjection(BTreeMap<MetricKind, f64>);

impl MetricProjection {
    /// Projects `record` onto the `selected` metrics.
    #[must_use]
    pub fn project(record: &MetricRecord, selected: &SelectedMetrics) -> Self {
        Self(
            selected
                .iter()
                .filter_map(|kind| record.metric(kind).map(|value| (kind, value)))
                .collect(),
        )
    }

    /// Value of `kind`, if projected.
    #[must_use]
    pub fn get(&self, kind: MetricKind) -> Option<f64> {
        self.0.get(&kind).copied()
    }

    /// Whether no metric survived the projection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A region's geometry from the topology dataset.
///
/// The shape is opaque to this workspace and handed to the renderer as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGeometry {
    /// Region code.
    pub id: RegionId,
    /// Geometry object, untouched.
    pub shape: serde_json::Value,
}

/// Global totals for one year, driving the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSeriesPoint {
    /// Year of the point.
    pub year: Year,
    /// Sum of incident rates across regions.
    pub incidents_sum: f64,
    /// Sum of absolute incident counts.
    pub incidents_total_sum: f64,
    /// Arithmetic mean of coverage over regions reporting it; `None` when
    /// no region does.
    pub coverage_mean: Option<f64>,
    /// Population-weighted coverage over regions reporting both values.
    pub coverage_weighted_mean: Option<f64>,
    /// Sum of populations.
    pub population_sum: f64,
}

/// One year of a single region's history, for the detail chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSeriesPoint {
    /// Year of the observation.
    pub year: Year,
    /// Vaccine coverage in percent.
    pub coverage: Option<f64>,
    /// Incident rate per 100k.
    pub incidents: Option<f64>,
    /// Absolute incident count.
    pub incidents_total: Option<f64>,
    /// Total population.
    pub population: Option<f64>,
}

impl From<&MetricRecord> for RegionSeriesPoint {
    fn from(record: &MetricRecord) -> Self {
        Self {
            year: record.year,
            coverage: record.coverage,
            incidents: record.incidents,
            incidents_total: record.incidents_total,
            population: record.population,
        }
    }
}
