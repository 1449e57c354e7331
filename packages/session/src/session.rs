//! Session state and the command dispatch table.

use serde::Serialize;
use vaxmap_classify::{Classifier, ClassifierError};
use vaxmap_metrics::MetricsIndex;
use vaxmap_metrics_models::{RegionId, SelectedMetrics, Year};
use vaxmap_playback::{
    PlayButton, PlaybackController, PlaybackError, PlaybackState, PlaybackStatus, PlaybackUpdate,
    TimerEffect,
};
use vaxmap_view::{Pin, ViewSynchronizer};
use vaxmap_view_models::{RenderInstructions, ScreenPoint};

use crate::{
    command::UiCommand,
    config::AppConfig,
    loader::{Datasets, exclude_regions, load_datasets},
};

/// Message shown to the user when startup loading fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data";

/// Errors that can occur while building a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The classifier configuration is invalid.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    /// The playback configuration is invalid.
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// One synchronized frame plus the playback control state it was drawn in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Map, chart and tooltip contents.
    pub instructions: RenderInstructions,
    /// Playback status after the command.
    pub status: PlaybackStatus,
    /// Label of the play control after the command.
    pub button: PlayButton,
}

/// Result of dispatching one command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    /// Frame to render, if the command changed what is shown.
    pub frame: Option<Frame>,
    /// Timer change for the event loop to apply.
    pub timer: Option<TimerEffect>,
}

/// The whole interactive state: data, playback, metric toggles and pin.
#[derive(Debug)]
pub struct Session {
    view: ViewSynchronizer,
    controller: PlaybackController,
    selected: SelectedMetrics,
    anchor: Option<ScreenPoint>,
    shown_year: Year,
}

impl Session {
    /// Builds the index, classifier and controller from loaded datasets.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the classifier or playback configuration
    /// is invalid.
    pub fn new(datasets: Datasets, config: &AppConfig) -> Result<Self, SessionError> {
        let classifier = Classifier::new(config.classifier.clone())?;
        let controller = PlaybackController::new(&config.playback)?;
        let regions = exclude_regions(datasets.regions, &config.excluded_regions);
        let index = MetricsIndex::build(datasets.records);

        Ok(Self {
            view: ViewSynchronizer::new(index, &regions, classifier),
            controller,
            selected: config.view.default_metrics.clone(),
            anchor: None,
            shown_year: config.playback.first_year,
        })
    }

    /// Playback state.
    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        self.controller.state()
    }

    /// Metrics currently toggled on.
    #[must_use]
    pub const fn selected(&self) -> &SelectedMetrics {
        &self.selected
    }

    /// The synchronizer, for read-only queries.
    #[must_use]
    pub const fn view(&self) -> &ViewSynchronizer {
        &self.view
    }

    /// Year of the last frame emitted.
    ///
    /// Differs from the controller's current year while playing: a tick
    /// shows one year and queues the next.
    #[must_use]
    pub const fn shown_year(&self) -> Year {
        self.shown_year
    }

    /// Re-renders the year on screen with the current selection and pin.
    #[must_use]
    pub fn render(&self) -> Frame {
        self.render_at(self.shown_year)
    }

    /// Renders `year` with the current selection and pin.
    #[must_use]
    pub fn render_at(&self, year: Year) -> Frame {
        let pin = self.controller.state().pinned_region.map(|region| Pin {
            region,
            anchor: self.anchor,
        });
        Frame {
            instructions: self.view.sync(year, &self.selected, pin),
            status: self.controller.status(),
            button: self.controller.button(),
        }
    }

    /// Handles one command to completion.
    pub fn dispatch(&mut self, command: UiCommand) -> Dispatch {
        log::trace!("dispatch: {command:?}");

        match command {
            UiCommand::SliderInput { value } => match self.controller.seek_str(&value) {
                Ok(update) => self.apply(update),
                Err(e) => {
                    log::warn!("Ignoring slider input {value:?}: {e}");
                    Dispatch::default()
                }
            },
            UiCommand::ToggleMetric { metric, enabled } => {
                self.selected.set(metric, enabled);
                self.redraw()
            }
            UiCommand::PressPlayButton => {
                let update = self.controller.press_button();
                self.apply(update)
            }
            UiCommand::Play => {
                let update = self.controller.play();
                self.apply(update)
            }
            UiCommand::Pause => {
                let update = self.controller.pause();
                self.apply(update)
            }
            UiCommand::Restart { autoplay } => {
                let update = self.controller.restart(autoplay);
                self.apply(update)
            }
            UiCommand::Hover { region, anchor } | UiCommand::Click { region, anchor } => {
                self.pin(Some(region), anchor)
            }
            UiCommand::Unhover => self.pin(None, None),
            UiCommand::SelectCountry { name } => {
                match self.view.index().region_for_country(&name) {
                    Some(region) => self.pin(Some(region), None),
                    None => {
                        log::warn!("Unknown country {name:?}");
                        Dispatch::default()
                    }
                }
            }
            UiCommand::Tick(timer) => {
                let update = self.controller.tick(timer);
                self.apply(update)
            }
        }
    }

    fn pin(&mut self, region: Option<RegionId>, anchor: Option<ScreenPoint>) -> Dispatch {
        self.controller.pin(region);
        self.anchor = anchor;
        self.redraw()
    }

    fn redraw(&self) -> Dispatch {
        Dispatch {
            frame: Some(self.render()),
            timer: None,
        }
    }

    fn apply(&mut self, update: PlaybackUpdate) -> Dispatch {
        if let Some(year) = update.render {
            self.shown_year = year;
        }
        Dispatch {
            frame: update.render.map(|year| self.render_at(year)),
            timer: update.timer,
        }
    }
}

/// Startup state of the application.
#[derive(Debug, Default)]
pub enum LoadState {
    /// Datasets still loading.
    #[default]
    Loading,
    /// Both datasets loaded and joined.
    Ready(Box<Session>),
    /// Loading or session construction failed; carries the user-facing
    /// message.
    Failed(String),
}

impl LoadState {
    /// The session, once ready.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Ready(session) => Some(session.as_ref()),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    /// Takes the session out, once ready.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::Ready(session) => Some(*session),
            Self::Loading | Self::Failed(_) => None,
        }
    }
}

/// Loads both datasets and builds the session.
///
/// Any failure, in either dataset or in the configuration, yields
/// [`LoadState::Failed`]; no session is ever built from partial data.
pub async fn initialize(config: &AppConfig) -> LoadState {
    let datasets = match load_datasets(&config.data.topology, &config.data.records).await {
        Ok(datasets) => datasets,
        Err(e) => {
            log::error!("{LOAD_FAILED_MESSAGE}: {e}");
            return LoadState::Failed(LOAD_FAILED_MESSAGE.to_string());
        }
    };

    match Session::new(datasets, config) {
        Ok(session) => LoadState::Ready(Box::new(session)),
        Err(e) => {
            log::error!("{LOAD_FAILED_MESSAGE}: {e}");
            LoadState::Failed(LOAD_FAILED_MESSAGE.to_string())
        }
    }
}
