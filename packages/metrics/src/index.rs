//! Two-level `year -> region -> record` lookup.

use std::collections::HashMap;

use vaxmap_metrics_models::{MetricRecord, RegionId, RegionSeriesPoint, Year};

/// Immutable index over the metrics dataset.
///
/// Owns the raw records in source order. Each `(year, region)` pair resolves
/// to the first record encountered for it; later duplicates stay in
/// [`records()`](Self::records) (and therefore in the global aggregation
/// and region series) but are never consulted for colouring or tooltips.
#[derive(Debug, Clone, Default)]
pub struct MetricsIndex {
    records: Vec<MetricRecord>,
    by_year: HashMap<Year, HashMap<RegionId, usize>>,
    by_region: HashMap<RegionId, Vec<usize>>,
    years: Vec<Year>,
    duplicates: usize,
}

impl MetricsIndex {
    /// Builds the index from the flat record list.
    #[must_use]
    pub fn build(records: Vec<MetricRecord>) -> Self {
        let mut by_year: HashMap<Year, HashMap<RegionId, usize>> = HashMap::new();
        let mut by_region: HashMap<RegionId, Vec<usize>> = HashMap::new();
        let mut duplicates = 0;

        for (position, record) in records.iter().enumerate() {
            let regions = by_year.entry(record.year).or_default();
            if regions.contains_key(&record.id) {
                duplicates += 1;
                log::debug!(
                    "Ignoring duplicate record for region {} in {} (row {position})",
                    record.id,
                    record.year
                );
            } else {
                regions.insert(record.id, position);
            }
            by_region.entry(record.id).or_default().push(position);
        }

        let mut years: Vec<Year> = by_year.keys().copied().collect();
        years.sort_unstable();

        log::info!(
            "Indexed {} metric records across {} years and {} regions",
            records.len(),
            years.len(),
            by_region.len()
        );
        if duplicates > 0 {
            log::debug!("{duplicates} duplicate (year, region) records were shadowed");
        }

        Self {
            records,
            by_year,
            by_region,
            years,
            duplicates,
        }
    }

    /// Returns the record for `id` in `year`, if any.
    #[must_use]
    pub fn get(&self, year: Year, id: RegionId) -> Option<&MetricRecord> {
        let position = *self.by_year.get(&year)?.get(&id)?;
        self.records.get(position)
    }

    /// Whether any record exists for `id` in `year`.
    #[must_use]
    pub fn contains(&self, year: Year, id: RegionId) -> bool {
        self.get(year, id).is_some()
    }

    /// All raw records in source order, duplicates included.
    #[must_use]
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// Distinct years present in the dataset, ascending.
    #[must_use]
    pub fn years(&self) -> &[Year] {
        &self.years
    }

    /// First and last year present, or `None` for an empty dataset.
    #[must_use]
    pub fn year_range(&self) -> Option<(Year, Year)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    /// Number of records shadowed by an earlier record for the same
    /// `(year, region)` pair.
    #[must_use]
    pub const fn duplicate_count(&self) -> usize {
        self.duplicates
    }

    /// Number of raw records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record for `id` in source order, for the region detail chart.
    #[must_use]
    pub fn region_series(&self, id: RegionId) -> Vec<RegionSeriesPoint> {
        self.by_region
            .get(&id)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&position| self.records.get(position))
                    .map(RegionSeriesPoint::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolves a country display name to the id of the first record
    /// carrying it.
    #[must_use]
    pub fn region_for_country(&self, country: &str) -> Option<RegionId> {
        self.records
            .iter()
            .find(|record| record.country == country)
            .map(|record| record.id)
    }

    /// Display name for `id`, taken from its first record.
    #[must_use]
    pub fn country_name(&self, id: RegionId) -> Option<&str> {
        let position = *self.by_region.get(&id)?.first()?;
        self.records.get(position).map(|record| record.country.as_str())
    }
}
