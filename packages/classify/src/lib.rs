#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bivariate choropleth classification.
//!
//! Each region's coverage and incident rate are bucketed independently by
//! ascending threshold arrays, and the two bucket indexes are combined into
//! one rank `coverage_bucket * n + incidents_bucket` indexing an `n * n`
//! palette, where `n = floor(sqrt(palette.len()))`.
//!
//! Three thresholds produce four buckets per axis while a nine-colour
//! palette only has room for three, so the top bucket of each axis is
//! clamped into bucket `n - 1`. A warning is logged at construction when a
//! threshold array is longer than `n - 1`.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use vaxmap_metrics_models::{MetricKind, MetricProjection};

/// Vaccine coverage cut points (percent).
pub const DEFAULT_COVERAGE_THRESHOLDS: &[f64] = &[50.0, 85.0, 100.0];

/// Incident rate cut points (per 100k).
pub const DEFAULT_INCIDENTS_THRESHOLDS: &[f64] = &[0.0001, 0.5, 1.0];

/// Nine-colour bivariate palette, row-major by coverage bucket.
pub const DEFAULT_PALETTE: &[&str] = &[
    "#d6abd9", "#ff3fab", "#be006b", "#8bbce3", "#882e94", "#67045e", "#3e90d0", "#3a2489",
    "#2b0055",
];

/// Fill for regions without data.
pub const DEFAULT_NO_DATA_COLOR: &str = "#F0F0F0";

/// Which classification axis a threshold array belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Axis {
    /// Vaccine coverage.
    Coverage,
    /// Incident rate.
    Incidents,
}

/// Errors raised when a classifier configuration is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    /// The palette has no colours, so no axis can have a bucket.
    #[error("Classifier palette is empty")]
    EmptyPalette,

    /// A threshold array is not ascending.
    #[error("{axis} thresholds must be ascending")]
    UnsortedThresholds {
        /// Offending axis.
        axis: Axis,
    },

    /// A threshold is NaN or infinite.
    #[error("{axis} thresholds must be finite")]
    NonFiniteThreshold {
        /// Offending axis.
        axis: Axis,
    },
}

/// Classification of one region in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rank", rename_all = "camelCase")]
pub enum ColorClass {
    /// No record, or nothing selected: rendered with the no-data colour.
    NoData,
    /// Index into the palette.
    Rank(usize),
}

/// Serializable classifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Ascending coverage cut points.
    pub coverage_thresholds: Vec<f64>,
    /// Ascending incident rate cut points.
    pub incidents_thresholds: Vec<f64>,
    /// Row-major bivariate palette.
    pub palette: Vec<String>,
    /// Fill for regions without data.
    pub no_data_color: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            coverage_thresholds: DEFAULT_COVERAGE_THRESHOLDS.to_vec(),
            incidents_thresholds: DEFAULT_INCIDENTS_THRESHOLDS.to_vec(),
            palette: DEFAULT_PALETTE.iter().map(ToString::to_string).collect(),
            no_data_color: DEFAULT_NO_DATA_COLOR.to_string(),
        }
    }
}

/// Maps `(coverage, incidents)` pairs to palette colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    coverage_thresholds: Vec<f64>,
    incidents_thresholds: Vec<f64>,
    palette: Vec<String>,
    no_data_color: String,
    axis_size: usize,
}

impl Classifier {
    /// Builds a classifier from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] if the palette is empty or a threshold
    /// array is unsorted or contains a non-finite value.
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let axis_size = config.palette.len().isqrt();
        if axis_size == 0 {
            return Err(ClassifierError::EmptyPalette);
        }

        validate_thresholds(Axis::Coverage, &config.coverage_thresholds, axis_size)?;
        validate_thresholds(Axis::Incidents, &config.incidents_thresholds, axis_size)?;

        if config.palette.len() != axis_size * axis_size {
            log::debug!(
                "Palette has {} colours; only the first {} are addressable",
                config.palette.len(),
                axis_size * axis_size
            );
        }

        Ok(Self {
            coverage_thresholds: config.coverage_thresholds,
            incidents_thresholds: config.incidents_thresholds,
            palette: config.palette,
            no_data_color: config.no_data_color,
            axis_size,
        })
    }

    /// Number of buckets per axis (`n`).
    #[must_use]
    pub const fn axis_size(&self) -> usize {
        self.axis_size
    }

    /// Bucket index of a coverage value, in `0..n`.
    #[must_use]
    pub fn coverage_bucket(&self, coverage: f64) -> usize {
        bucket(&self.coverage_thresholds, coverage, self.axis_size)
    }

    /// Bucket index of an incident rate, in `0..n`.
    #[must_use]
    pub fn incidents_bucket(&self, incidents: f64) -> usize {
        bucket(&self.incidents_thresholds, incidents, self.axis_size)
    }

    /// Classifies a pair of values. Absent values count as zero.
    #[must_use]
    pub fn classify(&self, coverage: Option<f64>, incidents: Option<f64>) -> ColorClass {
        let coverage_rank = self.coverage_bucket(coverage.unwrap_or(0.0));
        let incidents_rank = self.incidents_bucket(incidents.unwrap_or(0.0));
        ColorClass::Rank(coverage_rank * self.axis_size + incidents_rank)
    }

    /// Classifies a region's projection; a missing or empty projection is
    /// [`ColorClass::NoData`].
    #[must_use]
    pub fn classify_projection(&self, projection: Option<&MetricProjection>) -> ColorClass {
        match projection {
            Some(projection) if !projection.is_empty() => self.classify(
                projection.get(MetricKind::Coverage),
                projection.get(MetricKind::Incidents),
            ),
            _ => ColorClass::NoData,
        }
    }

    /// Resolves a class to its fill colour.
    #[must_use]
    pub fn color(&self, class: ColorClass) -> &str {
        match class {
            ColorClass::NoData => &self.no_data_color,
            ColorClass::Rank(rank) => self
                .palette
                .get(rank)
                .map_or(self.no_data_color.as_str(), String::as_str),
        }
    }

    /// Fill colour for a pair of values.
    #[must_use]
    pub fn color_of(&self, coverage: Option<f64>, incidents: Option<f64>) -> &str {
        self.color(self.classify(coverage, incidents))
    }

    /// The no-data fill colour.
    #[must_use]
    pub fn no_data_color(&self) -> &str {
        &self.no_data_color
    }
}

impl Default for Classifier {
    fn default() -> Self {
        let config = ClassifierConfig::default();
        Self {
            axis_size: config.palette.len().isqrt(),
            coverage_thresholds: config.coverage_thresholds,
            incidents_thresholds: config.incidents_thresholds,
            palette: config.palette,
            no_data_color: config.no_data_color,
        }
    }
}

fn validate_thresholds(
    axis: Axis,
    thresholds: &[f64],
    axis_size: usize,
) -> Result<(), ClassifierError> {
    if thresholds.iter().any(|t| !t.is_finite()) {
        return Err(ClassifierError::NonFiniteThreshold { axis });
    }
    if thresholds.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(ClassifierError::UnsortedThresholds { axis });
    }
    if thresholds.len() + 1 > axis_size {
        log::warn!(
            "{axis} thresholds produce {} buckets but the palette has {axis_size} per axis; \
             top buckets are clamped",
            thresholds.len() + 1
        );
    }
    Ok(())
}

/// Step-function bucketing: the number of thresholds `<= value`, clamped
/// to `axis_size - 1`. NaN lands in bucket 0.
fn bucket(thresholds: &[f64], value: f64, axis_size: usize) -> usize {
    let raw = thresholds.partition_point(|threshold| *threshold <= value);
    raw.min(axis_size.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use vaxmap_metrics_models::{MetricRecord, RegionId, SelectedMetrics, Year};

    use super::*;

    fn config(palette_len: usize) -> ClassifierConfig {
        ClassifierConfig {
            palette: (0..palette_len).map(|i| format!("#{i:06x}")).collect(),
            ..ClassifierConfig::default()
        }
    }

    #[test]
    fn buckets_follow_threshold_steps() {
        let classifier = Classifier::default();

        assert_eq!(classifier.coverage_bucket(0.0), 0);
        assert_eq!(classifier.coverage_bucket(49.9), 0);
        assert_eq!(classifier.coverage_bucket(50.0), 1);
        assert_eq!(classifier.coverage_bucket(84.9), 1);
        assert_eq!(classifier.coverage_bucket(85.0), 2);

        assert_eq!(classifier.incidents_bucket(0.0), 0);
        assert_eq!(classifier.incidents_bucket(0.0001), 1);
        assert_eq!(classifier.incidents_bucket(0.75), 2);
    }

    #[test]
    fn top_bucket_is_clamped_into_palette() {
        let classifier = Classifier::default();

        assert_eq!(classifier.coverage_bucket(100.0), 2);
        assert_eq!(classifier.incidents_bucket(250.0), 2);
        assert_eq!(classifier.classify(Some(100.0), Some(5.0)), ColorClass::Rank(8));
        assert_eq!(classifier.color_of(Some(100.0), Some(5.0)), "#2b0055");
    }

    #[test]
    fn rank_combines_both_axes() {
        let classifier = Classifier::default();

        assert_eq!(classifier.classify(Some(60.0), Some(0.2)), ColorClass::Rank(4));
        assert_eq!(classifier.color_of(Some(60.0), Some(0.2)), "#882e94");
        assert_eq!(classifier.classify(Some(90.0), Some(0.0)), ColorClass::Rank(6));
    }

    #[test]
    fn absent_values_count_as_zero() {
        let classifier = Classifier::default();

        assert_eq!(
            classifier.classify(None, None),
            classifier.classify(Some(0.0), Some(0.0))
        );
        assert_eq!(classifier.classify(None, Some(0.7)), ColorClass::Rank(2));
    }

    #[test]
    fn empty_projection_is_no_data() {
        let classifier = Classifier::default();
        let record = MetricRecord {
            id: RegionId::new(4),
            year: Year::new(1990),
            country: "Afghanistan".to_string(),
            coverage: Some(70.0),
            incidents: Some(0.3),
            incidents_total: None,
            population: None,
        };

        let empty = MetricProjection::project(&record, &SelectedMetrics::none());
        assert_eq!(classifier.classify_projection(Some(&empty)), ColorClass::NoData);
        assert_eq!(classifier.classify_projection(None), ColorClass::NoData);

        let no_data = classifier.color(ColorClass::NoData);
        assert_eq!(no_data, DEFAULT_NO_DATA_COLOR);
        assert!(!DEFAULT_PALETTE.contains(&no_data));

        let full = MetricProjection::project(&record, &SelectedMetrics::all());
        assert_eq!(classifier.classify_projection(Some(&full)), ColorClass::Rank(4));
    }

    #[test]
    fn rejects_empty_palette() {
        assert_eq!(Classifier::new(config(0)), Err(ClassifierError::EmptyPalette));
    }

    #[test]
    fn rejects_bad_thresholds() {
        let unsorted = ClassifierConfig {
            coverage_thresholds: vec![85.0, 50.0],
            ..ClassifierConfig::default()
        };
        assert_eq!(
            Classifier::new(unsorted),
            Err(ClassifierError::UnsortedThresholds {
                axis: Axis::Coverage
            })
        );

        let nan = ClassifierConfig {
            incidents_thresholds: vec![0.1, f64::NAN],
            ..ClassifierConfig::default()
        };
        assert_eq!(
            Classifier::new(nan),
            Err(ClassifierError::NonFiniteThreshold {
                axis: Axis::Incidents
            })
        );
    }

    #[test]
    fn oversized_palette_uses_square_prefix() {
        let classifier = Classifier::new(config(10)).unwrap();
        assert_eq!(classifier.axis_size(), 3);
        assert_eq!(classifier.classify(Some(100.0), Some(100.0)), ColorClass::Rank(8));
    }

    #[test]
    fn default_matches_default_config() {
        assert_eq!(
            Classifier::new(ClassifierConfig::default()).unwrap(),
            Classifier::default()
        );
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ClassifierConfig = toml::from_str("no_data_color = \"#000000\"").unwrap();
        assert_eq!(config.no_data_color, "#000000");
        assert_eq!(config.coverage_thresholds, DEFAULT_COVERAGE_THRESHOLDS);
    }

    proptest! {
        #[test]
        fn coverage_axis_is_monotonic(
            low in -10.0f64..150.0,
            delta in 0.0f64..150.0,
            incidents in proptest::option::of(0.0f64..5.0),
        ) {
            let classifier = Classifier::default();
            let high = low + delta;

            prop_assert!(classifier.coverage_bucket(low) <= classifier.coverage_bucket(high));

            let (ColorClass::Rank(a), ColorClass::Rank(b)) = (
                classifier.classify(Some(low), incidents),
                classifier.classify(Some(high), incidents),
            ) else {
                unreachable!("classify never yields NoData");
            };
            prop_assert!(a <= b);
            prop_assert!(b < classifier.axis_size() * classifier.axis_size());
        }

        #[test]
        fn incidents_axis_is_monotonic(
            low in -1.0f64..5.0,
            delta in 0.0f64..5.0,
        ) {
            let classifier = Classifier::default();
            prop_assert!(
                classifier.incidents_bucket(low) <= classifier.incidents_bucket(low + delta)
            );
        }
    }
}
