//! UI actions understood by [`crate::Session::dispatch`].

use serde::{Deserialize, Serialize};
use vaxmap_metrics_models::{MetricKind, RegionId};
use vaxmap_playback::TimerId;
use vaxmap_view_models::ScreenPoint;

/// One discrete UI event.
///
/// Commands arriving over the wire are tagged by `type`; [`UiCommand::Tick`]
/// only ever comes from the event loop's own timer and cannot be sent from
/// outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiCommand {
    /// Raw slider value, a stringified year.
    SliderInput {
        /// Slider value.
        value: String,
    },
    /// One of the metric toggles changed.
    ToggleMetric {
        /// Metric toggled.
        metric: MetricKind,
        /// New toggle state.
        enabled: bool,
    },
    /// The three-state play/pause/restart control was pressed.
    PressPlayButton,
    /// Start or resume playback.
    Play,
    /// Pause playback.
    Pause,
    /// Reset to the first year.
    Restart {
        /// Resume playing immediately.
        #[serde(default)]
        autoplay: bool,
    },
    /// Pointer entered a region.
    Hover {
        /// Region under the pointer.
        region: RegionId,
        /// Pointer position.
        #[serde(default)]
        anchor: Option<ScreenPoint>,
    },
    /// A region was clicked.
    Click {
        /// Region clicked.
        region: RegionId,
        /// Pointer position.
        #[serde(default)]
        anchor: Option<ScreenPoint>,
    },
    /// Pointer left the pinned region.
    Unhover,
    /// A country was chosen by name.
    SelectCountry {
        /// Country display name.
        name: String,
    },
    /// Timer tick.
    #[serde(skip)]
    Tick(TimerId),
}

impl UiCommand {
    /// Slider input from a raw value.
    #[must_use]
    pub fn slider(value: impl Into<String>) -> Self {
        Self::SliderInput {
            value: value.into(),
        }
    }

    /// Hover without a pointer position.
    #[must_use]
    pub const fn hover(region: RegionId) -> Self {
        Self::Hover {
            region,
            anchor: None,
        }
    }

    /// Click without a pointer position.
    #[must_use]
    pub const fn click(region: RegionId) -> Self {
        Self::Click {
            region,
            anchor: None,
        }
    }
}
