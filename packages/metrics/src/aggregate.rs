//! Global per-year reductions for the trend chart.
//!
//! Sums skip absent values; the coverage means are `None` rather than NaN
//! when no record in the year reports coverage, so callers never push a NaN
//! into a chart.

use indexmap::IndexMap;
use vaxmap_metrics_models::{GlobalSeriesPoint, MetricRecord, Year};

#[derive(Debug, Default)]
struct Accumulator {
    incidents_sum: f64,
    incidents_total_sum: f64,
    coverage_sum: f64,
    coverage_count: usize,
    weighted_coverage_sum: f64,
    weight_sum: f64,
    population_sum: f64,
}

impl Accumulator {
    fn push(&mut self, record: &MetricRecord) {
        self.incidents_sum += record.incidents.unwrap_or(0.0);
        self.incidents_total_sum += record.incidents_total.unwrap_or(0.0);
        self.population_sum += record.population.unwrap_or(0.0);

        if let Some(coverage) = record.coverage {
            self.coverage_sum += coverage;
            self.coverage_count += 1;

            if let Some(population) = record.population.filter(|p| *p > 0.0) {
                self.weighted_coverage_sum += coverage * population;
                self.weight_sum += population;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self, year: Year) -> GlobalSeriesPoint {
        GlobalSeriesPoint {
            year,
            incidents_sum: self.incidents_sum,
            incidents_total_sum: self.incidents_total_sum,
            coverage_mean: (self.coverage_count > 0)
                .then(|| self.coverage_sum / self.coverage_count as f64),
            coverage_weighted_mean: (self.weight_sum > 0.0)
                .then(|| self.weighted_coverage_sum / self.weight_sum),
            population_sum: self.population_sum,
        }
    }
}

/// Reduces every record for `year` into one global point.
///
/// A year with no records yields zero sums and absent means.
#[must_use]
pub fn aggregate(records: &[MetricRecord], year: Year) -> GlobalSeriesPoint {
    let mut accumulator = Accumulator::default();
    for record in records.iter().filter(|record| record.year == year) {
        accumulator.push(record);
    }
    accumulator.finish(year)
}

/// Reduces all records into one point per distinct year.
///
/// Points come out in first-seen year order, not sorted; sort by
/// [`GlobalSeriesPoint::year`] for display if needed.
#[must_use]
pub fn aggregate_all(records: &[MetricRecord]) -> Vec<GlobalSeriesPoint> {
    let mut by_year: IndexMap<Year, Accumulator> = IndexMap::new();
    for record in records {
        by_year.entry(record.year).or_default().push(record);
    }

    by_year
        .into_iter()
        .map(|(year, accumulator)| accumulator.finish(year))
        .collect()
}
