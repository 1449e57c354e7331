#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Playback state machine for scrubbing through years.
//!
//! The controller never owns a real timer. Every operation returns a
//! [`PlaybackUpdate`] telling the caller which year to render (if any) and
//! whether to start or cancel the tick timer. Each started timer gets a
//! fresh [`TimerId`]; ticks carrying any other id are ignored, so a tick
//! that was already queued when the timer was cancelled cannot advance the
//! year.

pub mod controller;

pub use controller::PlaybackController;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use vaxmap_metrics_models::{ParseYearError, RegionId, Year};

/// First year of the default playback range.
pub const DEFAULT_FIRST_YEAR: Year = Year::new(1980);

/// Last year of the default playback range.
pub const DEFAULT_LAST_YEAR: Year = Year::new(2019);

/// Default tick interval: a 500ms map transition plus half again.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 750;

/// Errors raised by the playback controller.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// The configured range is empty.
    #[error("Invalid playback range: first year {first} is after last year {last}")]
    InvalidRange {
        /// Configured first year.
        first: Year,
        /// Configured last year.
        last: Year,
    },

    /// The tick interval is zero.
    #[error("Playback tick interval must be non-zero")]
    ZeroInterval,

    /// A seek targeted a year outside the playback range.
    #[error("Year {year} is outside the playback range {first}-{last}")]
    YearOutOfRange {
        /// Requested year.
        year: Year,
        /// First playable year.
        first: Year,
        /// Last playable year.
        last: Year,
    },

    /// A slider value was not an integer year.
    #[error(transparent)]
    InvalidYear(#[from] ParseYearError),
}

/// Playback lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    /// Initial state, or after a restart.
    #[default]
    Stopped,
    /// Timer running.
    Playing,
    /// Timer cleared, year retained.
    Paused,
    /// Reached the last year while playing.
    Finished,
}

/// Label of the three-state play control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
pub enum PlayButton {
    /// Starts or resumes playback.
    Play,
    /// Pauses playback.
    Pause,
    /// Resets to the first year after playback finished.
    Restart,
}

impl From<PlaybackStatus> for PlayButton {
    fn from(status: PlaybackStatus) -> Self {
        match status {
            PlaybackStatus::Playing => Self::Pause,
            PlaybackStatus::Finished => Self::Restart,
            PlaybackStatus::Stopped | PlaybackStatus::Paused => Self::Play,
        }
    }
}

/// Generation number of a started tick timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw generation number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Instruction for whoever owns the real timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEffect {
    /// Start ticking `timer` every `interval`, replacing any running timer.
    Start {
        /// Generation the ticks must carry.
        timer: TimerId,
        /// Tick period.
        interval: Duration,
    },
    /// Stop the given timer.
    Cancel(TimerId),
}

/// Outcome of one controller operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackUpdate {
    /// Year to synchronize the views at, if a render is due.
    pub render: Option<Year>,
    /// Timer change to apply, if any.
    pub timer: Option<TimerEffect>,
}

impl PlaybackUpdate {
    /// Nothing to do.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            render: None,
            timer: None,
        }
    }

    /// Whether the update asks for neither a render nor a timer change.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.render.is_none() && self.timer.is_none()
    }
}

/// Serializable playback settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// First playable year; restarts return here.
    pub first_year: Year,
    /// Last playable year; reaching it while playing finishes playback.
    pub last_year: Year,
    /// Milliseconds between ticks.
    pub tick_interval_ms: u64,
}

impl PlaybackConfig {
    /// Tick period as a [`Duration`].
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            first_year: DEFAULT_FIRST_YEAR,
            last_year: DEFAULT_LAST_YEAR,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// Session state mutated by playback and by user navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Year currently shown.
    pub current_year: Year,
    /// Lifecycle status.
    pub status: PlaybackStatus,
    /// Region under the pointer or last clicked, if any.
    pub pinned_region: Option<RegionId>,
}
