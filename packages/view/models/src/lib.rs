#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Render instruction types.
//!
//! These are the only output of the synchronization pipeline: a pure
//! description of what the map, the trend chart and the tooltip should
//! show. They are serialized to JSON for whatever rendering layer sits on
//! top.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vaxmap_metrics_models::{
    GlobalSeriesPoint, RegionId, RegionSeriesPoint, SelectedMetrics, Year,
};

/// Text shown in place of an absent measurement.
pub const NO_DATA_TEXT: &str = "no data";

/// Fill of one region on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionFill {
    /// CSS colour string.
    pub color: String,
    /// Palette rank, or `None` for the no-data colour.
    pub rank: Option<usize>,
}

/// A position on the rendering surface, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

/// Tooltip / side panel payload for the pinned region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDetail {
    /// Region code.
    pub region: RegionId,
    /// Country display name.
    pub country: String,
    /// Year shown.
    pub year: Year,
    /// Formatted population, or [`NO_DATA_TEXT`].
    pub population: String,
    /// Formatted incident rate, or [`NO_DATA_TEXT`].
    pub incidents: String,
    /// Formatted coverage, or [`NO_DATA_TEXT`].
    pub coverage: String,
    /// The region's whole history, in source order.
    pub series: Vec<RegionSeriesPoint>,
    /// Where to anchor the tooltip, if the caller supplied a position.
    pub anchor: Option<ScreenPoint>,
}

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderInstructions {
    /// Year rendered.
    pub year: Year,
    /// Metrics that drove the colouring.
    pub metrics: SelectedMetrics,
    /// Fill for every drawable region.
    pub fills: BTreeMap<RegionId, RegionFill>,
    /// Global trend series, first-seen year order.
    pub global_series: Vec<GlobalSeriesPoint>,
    /// Detail for the pinned region, when it has data this year.
    pub detail: Option<RegionDetail>,
}

impl RenderInstructions {
    /// Colour string for `region`, if it is drawable.
    #[must_use]
    pub fn color_of(&self, region: RegionId) -> Option<&str> {
        self.fills.get(&region).map(|fill| fill.color.as_str())
    }
}
