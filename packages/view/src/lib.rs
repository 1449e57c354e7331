#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! View synchronization.
//!
//! Given a year, the selected metrics and an optional pinned region,
//! [`ViewSynchronizer::sync`] recomputes everything the map, the trend
//! chart and the tooltip show. It renders nothing itself and keeps no state
//! between calls, so the same inputs always produce the same frame.

pub mod format;

use std::collections::{BTreeMap, BTreeSet};

use vaxmap_classify::{Classifier, ColorClass};
use vaxmap_metrics::{MetricsIndex, aggregate_all};
use vaxmap_metrics_models::{MetricProjection, RegionGeometry, RegionId, SelectedMetrics, Year};
use vaxmap_view_models::{RegionDetail, RegionFill, RenderInstructions, ScreenPoint};

/// Region pinned by hover, click or the country picker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pin {
    /// Pinned region.
    pub region: RegionId,
    /// Pointer position to anchor the tooltip at, if known.
    pub anchor: Option<ScreenPoint>,
}

impl From<RegionId> for Pin {
    fn from(region: RegionId) -> Self {
        Self {
            region,
            anchor: None,
        }
    }
}

/// Joins the drawable regions, the metrics index and the classifier.
#[derive(Debug, Clone)]
pub struct ViewSynchronizer {
    index: MetricsIndex,
    regions: BTreeSet<RegionId>,
    classifier: Classifier,
}

impl ViewSynchronizer {
    /// Creates a synchronizer over the given drawable regions.
    #[must_use]
    pub fn new(index: MetricsIndex, regions: &[RegionGeometry], classifier: Classifier) -> Self {
        let regions: BTreeSet<RegionId> = regions.iter().map(|region| region.id).collect();
        log::debug!("View synchronizer tracking {} regions", regions.len());
        Self {
            index,
            regions,
            classifier,
        }
    }

    /// The underlying metrics index.
    #[must_use]
    pub const fn index(&self) -> &MetricsIndex {
        &self.index
    }

    /// The classifier in use.
    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Drawable region ids, ascending.
    pub fn regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.iter().copied()
    }

    /// Projects every drawable region's record for `year` onto the selected
    /// metrics. Regions without a record are absent from the map.
    #[must_use]
    pub fn project(
        &self,
        year: Year,
        selected: &SelectedMetrics,
    ) -> BTreeMap<RegionId, MetricProjection> {
        self.regions
            .iter()
            .filter_map(|&region| {
                let record = self.index.get(year, region)?;
                Some((region, MetricProjection::project(record, selected)))
            })
            .collect()
    }

    /// Computes one frame.
    #[must_use]
    pub fn sync(
        &self,
        year: Year,
        selected: &SelectedMetrics,
        pinned: Option<Pin>,
    ) -> RenderInstructions {
        let projections = self.project(year, selected);

        let fills = self
            .regions
            .iter()
            .map(|&region| {
                let class = self.classifier.classify_projection(projections.get(&region));
                (region, self.fill(class))
            })
            .collect();

        RenderInstructions {
            year,
            metrics: selected.clone(),
            fills,
            global_series: aggregate_all(self.index.records()),
            detail: pinned.and_then(|pin| self.detail(year, pin)),
        }
    }

    /// Tooltip payload for `pin` in `year`, or `None` without a record.
    #[must_use]
    pub fn detail(&self, year: Year, pin: Pin) -> Option<RegionDetail> {
        let record = self.index.get(year, pin.region)?;
        Some(RegionDetail {
            region: pin.region,
            country: record.country.clone(),
            year,
            population: format::population(record.population),
            incidents: format::incidents(record.incidents),
            coverage: format::coverage(record.coverage),
            series: self.index.region_series(pin.region),
            anchor: pin.anchor,
        })
    }

    fn fill(&self, class: ColorClass) -> RegionFill {
        RegionFill {
            color: self.classifier.color(class).to_string(),
            rank: match class {
                ColorClass::NoData => None,
                ColorClass::Rank(rank) => Some(rank),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use vaxmap_classify::DEFAULT_NO_DATA_COLOR;
    use vaxmap_metrics_models::{MetricKind, MetricRecord};
    use vaxmap_view_models::NO_DATA_TEXT;

    use super::*;

    fn record(id: u32, year: i32, coverage: Option<f64>, incidents: Option<f64>) -> MetricRecord {
        MetricRecord {
            id: RegionId::new(id),
            year: Year::new(year),
            country: format!("Country {id}"),
            coverage,
            incidents,
            incidents_total: incidents.map(|i| i * 100.0),
            population: Some(1_000_000.0),
        }
    }

    fn geometry(id: u32) -> RegionGeometry {
        RegionGeometry {
            id: RegionId::new(id),
            shape: serde_json::Value::Null,
        }
    }

    fn synchronizer() -> ViewSynchronizer {
        let index = MetricsIndex::build(vec![
            record(4, 1990, Some(60.0), Some(0.2)),
            record(8, 1990, None, Some(0.7)),
            record(12, 1990, None, None),
            record(4, 1991, Some(95.0), Some(0.0)),
        ]);
        ViewSynchronizer::new(
            index,
            &[geometry(4), geometry(8), geometry(12), geometry(16)],
            Classifier::default(),
        )
    }

    #[test]
    fn fills_every_drawable_region() {
        let frame = synchronizer().sync(Year::new(1990), &SelectedMetrics::all(), None);

        assert_eq!(frame.fills.len(), 4);
        assert_eq!(frame.color_of(RegionId::new(4)), Some("#882e94"));
        assert_eq!(frame.fills[&RegionId::new(8)].rank, Some(2));
        assert_eq!(frame.color_of(RegionId::new(12)), Some(DEFAULT_NO_DATA_COLOR));
        assert_eq!(frame.color_of(RegionId::new(16)), Some(DEFAULT_NO_DATA_COLOR));
        assert_eq!(frame.fills[&RegionId::new(16)].rank, None);
    }

    #[test]
    fn empty_selection_is_uniformly_no_data() {
        let frame = synchronizer().sync(Year::new(1990), &SelectedMetrics::none(), None);
        assert!(
            frame
                .fills
                .values()
                .all(|fill| fill.rank.is_none() && fill.color == DEFAULT_NO_DATA_COLOR)
        );
    }

    #[test]
    fn unselected_metrics_are_projected_away() {
        let sync = synchronizer();
        let incidents_only: SelectedMetrics = "incidents".parse().unwrap();

        let projections = sync.project(Year::new(1990), &incidents_only);
        assert_eq!(projections[&RegionId::new(4)].get(MetricKind::Coverage), None);
        assert!(!projections.contains_key(&RegionId::new(16)));

        // Coverage 60 no longer counts: rank falls back to coverage bucket 0.
        let frame = sync.sync(Year::new(1990), &incidents_only, None);
        assert_eq!(frame.fills[&RegionId::new(4)].rank, Some(1));
    }

    #[test]
    fn sync_is_stable_across_selection_changes() {
        let sync = synchronizer();
        let year = Year::new(1990);

        let first = sync.sync(year, &SelectedMetrics::all(), None);
        let _ = sync.sync(year, &SelectedMetrics::none(), None);
        let again = sync.sync(year, &SelectedMetrics::all(), None);

        assert_eq!(first.fills, again.fills);
        assert_eq!(first, again);
    }

    #[test]
    fn detail_for_pinned_region() {
        let anchor = ScreenPoint { x: 10.0, y: 20.0 };
        let frame = synchronizer().sync(
            Year::new(1990),
            &SelectedMetrics::all(),
            Some(Pin {
                region: RegionId::new(8),
                anchor: Some(anchor),
            }),
        );

        let detail = frame.detail.expect("pinned region has data");
        assert_eq!(detail.country, "Country 8");
        assert_eq!(detail.year, Year::new(1990));
        assert_eq!(detail.population, "1,000,000");
        assert_eq!(detail.incidents, "0.70 per 100k");
        assert_eq!(detail.coverage, NO_DATA_TEXT);
        assert_eq!(detail.series.len(), 1);
        assert_eq!(detail.anchor, Some(anchor));
    }

    #[test]
    fn no_detail_without_record() {
        let sync = synchronizer();
        let frame = sync.sync(
            Year::new(1991),
            &SelectedMetrics::all(),
            Some(Pin::from(RegionId::new(8))),
        );
        assert!(frame.detail.is_none());
        assert!(sync.detail(Year::new(1990), Pin::from(RegionId::new(16))).is_none());
    }

    #[test]
    fn global_series_covers_all_years() {
        let frame = synchronizer().sync(Year::new(1991), &SelectedMetrics::all(), None);
        let years: Vec<i32> = frame
            .global_series
            .iter()
            .map(|point| point.year.value())
            .collect();
        assert_eq!(years, vec![1990, 1991]);
        assert!((frame.global_series[0].incidents_sum - 0.9).abs() < 1e-9);
    }
}
