//! The playback controller.

use std::time::Duration;

use vaxmap_metrics_models::{RegionId, Year};

use crate::{
    PlayButton, PlaybackConfig, PlaybackError, PlaybackState, PlaybackStatus, PlaybackUpdate,
    TimerEffect, TimerId,
};

/// Drives the current year through `Stopped -> Playing -> Paused ->
/// Playing -> Finished -> Stopped`.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    state: PlaybackState,
    first_year: Year,
    last_year: Year,
    interval: Duration,
    active_timer: Option<TimerId>,
    next_timer: u64,
}

impl PlaybackController {
    /// Creates a stopped controller positioned at the first year.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidRange`] if the first year is after
    /// the last year, or [`PlaybackError::ZeroInterval`] if the tick
    /// interval is zero.
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        if config.first_year > config.last_year {
            return Err(PlaybackError::InvalidRange {
                first: config.first_year,
                last: config.last_year,
            });
        }
        if config.tick_interval_ms == 0 {
            return Err(PlaybackError::ZeroInterval);
        }

        Ok(Self {
            state: PlaybackState {
                current_year: config.first_year,
                status: PlaybackStatus::Stopped,
                pinned_region: None,
            },
            first_year: config.first_year,
            last_year: config.last_year,
            interval: config.tick_interval(),
            active_timer: None,
            next_timer: 0,
        })
    }

    /// Snapshot of the mutable session state.
    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Year currently shown.
    #[must_use]
    pub const fn current_year(&self) -> Year {
        self.state.current_year
    }

    /// Lifecycle status.
    #[must_use]
    pub const fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    /// First playable year.
    #[must_use]
    pub const fn first_year(&self) -> Year {
        self.first_year
    }

    /// Last playable year.
    #[must_use]
    pub const fn last_year(&self) -> Year {
        self.last_year
    }

    /// The timer whose ticks are currently honoured.
    #[must_use]
    pub const fn active_timer(&self) -> Option<TimerId> {
        self.active_timer
    }

    /// Label the play control should show.
    #[must_use]
    pub fn button(&self) -> PlayButton {
        PlayButton::from(self.state.status)
    }

    /// Starts or resumes playback. No-op unless stopped or paused.
    pub fn play(&mut self) -> PlaybackUpdate {
        match self.state.status {
            PlaybackStatus::Stopped | PlaybackStatus::Paused => {
                let timer = self.start_timer();
                self.transition(PlaybackStatus::Playing);
                PlaybackUpdate {
                    render: None,
                    timer: Some(TimerEffect::Start {
                        timer,
                        interval: self.interval,
                    }),
                }
            }
            PlaybackStatus::Playing | PlaybackStatus::Finished => {
                log::debug!("play() ignored while {}", self.state.status);
                PlaybackUpdate::none()
            }
        }
    }

    /// Pauses playback, keeping the current year. No-op unless playing.
    pub fn pause(&mut self) -> PlaybackUpdate {
        if self.state.status != PlaybackStatus::Playing {
            log::debug!("pause() ignored while {}", self.state.status);
            return PlaybackUpdate::none();
        }

        self.transition(PlaybackStatus::Paused);
        PlaybackUpdate {
            render: None,
            timer: self.active_timer.take().map(TimerEffect::Cancel),
        }
    }

    /// Resets to the first year from any state and renders it.
    ///
    /// With `autoplay` the controller goes straight back to `Playing` and
    /// starts a fresh timer; otherwise it rests in `Stopped`.
    pub fn restart(&mut self, autoplay: bool) -> PlaybackUpdate {
        let cancelled = self.active_timer.take();
        self.state.current_year = self.first_year;
        self.transition(PlaybackStatus::Stopped);

        let timer = if autoplay {
            let timer = self.start_timer();
            self.transition(PlaybackStatus::Playing);
            Some(TimerEffect::Start {
                timer,
                interval: self.interval,
            })
        } else {
            cancelled.map(TimerEffect::Cancel)
        };

        PlaybackUpdate {
            render: Some(self.first_year),
            timer,
        }
    }

    /// Handles one timer tick.
    ///
    /// Renders the current year and advances by one; on the last year it
    /// renders, finishes, and cancels the timer instead. Ticks from any
    /// timer but the active one, or outside `Playing`, are ignored.
    pub fn tick(&mut self, timer: TimerId) -> PlaybackUpdate {
        if self.state.status != PlaybackStatus::Playing || self.active_timer != Some(timer) {
            log::debug!(
                "Ignoring stale tick from {timer} (status {}, active {:?})",
                self.state.status,
                self.active_timer
            );
            return PlaybackUpdate::none();
        }

        let year = self.state.current_year;
        if year >= self.last_year {
            self.active_timer = None;
            self.transition(PlaybackStatus::Finished);
            return PlaybackUpdate {
                render: Some(year),
                timer: Some(TimerEffect::Cancel(timer)),
            };
        }

        self.state.current_year = year.next();
        PlaybackUpdate {
            render: Some(year),
            timer: None,
        }
    }

    /// Jumps to `year` without touching the status or the timer.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::YearOutOfRange`] if `year` is outside the
    /// playback range.
    pub fn seek(&mut self, year: Year) -> Result<PlaybackUpdate, PlaybackError> {
        if year < self.first_year || year > self.last_year {
            return Err(PlaybackError::YearOutOfRange {
                year,
                first: self.first_year,
                last: self.last_year,
            });
        }

        self.state.current_year = year;
        Ok(PlaybackUpdate {
            render: Some(year),
            timer: None,
        })
    }

    /// Jumps to the year in a raw slider value.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidYear`] if the value is not an
    /// integer, or [`PlaybackError::YearOutOfRange`] as for [`Self::seek`].
    pub fn seek_str(&mut self, value: &str) -> Result<PlaybackUpdate, PlaybackError> {
        self.seek(value.parse()?)
    }

    /// Presses the three-state play control.
    pub fn press_button(&mut self) -> PlaybackUpdate {
        match self.button() {
            PlayButton::Pause => self.pause(),
            PlayButton::Restart => self.restart(false),
            PlayButton::Play => self.play(),
        }
    }

    /// Pins a region for the detail view, or clears the pin.
    pub const fn pin(&mut self, region: Option<RegionId>) {
        self.state.pinned_region = region;
    }

    fn start_timer(&mut self) -> TimerId {
        self.next_timer += 1;
        let timer = TimerId(self.next_timer);
        self.active_timer = Some(timer);
        timer
    }

    fn transition(&mut self, status: PlaybackStatus) {
        if self.state.status != status {
            log::debug!(
                "Playback {} -> {status} at {}",
                self.state.status,
                self.state.current_year
            );
            self.state.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PlaybackController {
        PlaybackController::new(&PlaybackConfig::default()).unwrap()
    }

    fn started_timer(update: PlaybackUpdate) -> TimerId {
        match update.timer {
            Some(TimerEffect::Start { timer, .. }) => timer,
            other => panic!("expected a timer start, got {other:?}"),
        }
    }

    #[test]
    fn starts_stopped_at_first_year() {
        let controller = controller();
        assert_eq!(controller.status(), PlaybackStatus::Stopped);
        assert_eq!(controller.current_year(), Year::new(1980));
        assert_eq!(controller.button(), PlayButton::Play);
        assert!(controller.active_timer().is_none());
    }

    #[test]
    fn rejects_inverted_range() {
        let config = PlaybackConfig {
            first_year: Year::new(2000),
            last_year: Year::new(1990),
            ..PlaybackConfig::default()
        };
        assert!(matches!(
            PlaybackController::new(&config),
            Err(PlaybackError::InvalidRange { .. })
        ));
    }

    #[test]
    fn rejects_zero_tick_interval() {
        let config: PlaybackConfig = toml::from_str("tick_interval_ms = 0").unwrap();
        assert!(matches!(
            PlaybackController::new(&config),
            Err(PlaybackError::ZeroInterval)
        ));
    }

    #[test]
    fn play_starts_timer_with_configured_interval() {
        let mut controller = controller();
        let update = controller.play();

        assert_eq!(update.render, None);
        assert!(matches!(
            update.timer,
            Some(TimerEffect::Start { interval, .. }) if interval == Duration::from_millis(750)
        ));
        assert_eq!(controller.status(), PlaybackStatus::Playing);
        assert_eq!(controller.button(), PlayButton::Pause);
    }

    #[test]
    fn ticks_advance_one_year_until_finished() {
        let mut controller = controller();
        let timer = started_timer(controller.play());

        let mut rendered = Vec::new();
        for _ in 0..100 {
            let update = controller.tick(timer);
            if let Some(year) = update.render {
                rendered.push(year.value());
            }
            if controller.status() == PlaybackStatus::Finished {
                assert_eq!(update.timer, Some(TimerEffect::Cancel(timer)));
                break;
            }
        }

        let expected: Vec<i32> = (1980..=2019).collect();
        assert_eq!(rendered, expected);
        assert_eq!(controller.current_year(), Year::new(2019));
        assert_eq!(controller.button(), PlayButton::Restart);

        // A timer that was not cleared externally keeps firing: nothing moves.
        for _ in 0..5 {
            assert!(controller.tick(timer).is_noop());
        }
        assert_eq!(controller.current_year(), Year::new(2019));
        assert_eq!(controller.status(), PlaybackStatus::Finished);
    }

    #[test]
    fn pause_freezes_the_year() {
        let mut controller = controller();
        let timer = started_timer(controller.play());
        controller.tick(timer);
        controller.tick(timer);

        let update = controller.pause();
        assert_eq!(update.timer, Some(TimerEffect::Cancel(timer)));
        assert_eq!(controller.status(), PlaybackStatus::Paused);

        let year = controller.current_year();
        for _ in 0..10 {
            assert!(controller.tick(timer).is_noop());
        }
        assert_eq!(controller.current_year(), year);
    }

    #[test]
    fn resume_uses_a_new_timer_generation() {
        let mut controller = controller();
        let first = started_timer(controller.play());
        controller.pause();
        let second = started_timer(controller.play());

        assert_ne!(first, second);
        assert!(controller.tick(first).is_noop(), "stale tick must be ignored");
        assert_eq!(controller.tick(second).render, Some(Year::new(1980)));
    }

    #[test]
    fn seek_while_playing_keeps_status_and_timer() {
        let mut controller = controller();
        let timer = started_timer(controller.play());
        controller.tick(timer);

        let update = controller.seek_str("2005").unwrap();
        assert_eq!(update.render, Some(Year::new(2005)));
        assert_eq!(update.timer, None);
        assert_eq!(controller.status(), PlaybackStatus::Playing);
        assert_eq!(controller.active_timer(), Some(timer));

        assert_eq!(controller.tick(timer).render, Some(Year::new(2005)));
        assert_eq!(controller.current_year(), Year::new(2006));
    }

    #[test]
    fn seek_rejects_bad_years() {
        let mut controller = controller();
        assert!(matches!(
            controller.seek_str("1850"),
            Err(PlaybackError::YearOutOfRange { .. })
        ));
        assert!(matches!(
            controller.seek_str("soon"),
            Err(PlaybackError::InvalidYear(_))
        ));
        assert_eq!(controller.current_year(), Year::new(1980));
    }

    #[test]
    fn seek_while_stopped_does_not_start_playback() {
        let mut controller = controller();
        controller.seek(Year::new(1999)).unwrap();
        assert_eq!(controller.status(), PlaybackStatus::Stopped);
        assert!(controller.active_timer().is_none());
    }

    #[test]
    fn restart_from_finished() {
        let mut controller = controller();
        let timer = started_timer(controller.play());
        controller.seek(Year::new(2019)).unwrap();
        controller.tick(timer);
        assert_eq!(controller.status(), PlaybackStatus::Finished);

        assert!(controller.play().is_noop());

        let update = controller.press_button();
        assert_eq!(update.render, Some(Year::new(1980)));
        assert_eq!(controller.status(), PlaybackStatus::Stopped);
        assert_eq!(controller.current_year(), Year::new(1980));
        assert_eq!(controller.button(), PlayButton::Play);
    }

    #[test]
    fn restart_with_autoplay_replaces_timer() {
        let mut controller = controller();
        let old = started_timer(controller.play());
        controller.tick(old);

        let new = started_timer(controller.restart(true));
        assert_ne!(old, new);
        assert_eq!(controller.status(), PlaybackStatus::Playing);
        assert!(controller.tick(old).is_noop());
        assert_eq!(controller.tick(new).render, Some(Year::new(1980)));
    }

    #[test]
    fn restart_while_playing_without_autoplay_cancels() {
        let mut controller = controller();
        let timer = started_timer(controller.play());

        let update = controller.restart(false);
        assert_eq!(update.timer, Some(TimerEffect::Cancel(timer)));
        assert_eq!(controller.status(), PlaybackStatus::Stopped);
        assert!(controller.tick(timer).is_noop());
    }

    #[test]
    fn button_cycles_play_pause() {
        let mut controller = controller();
        controller.press_button();
        assert_eq!(controller.status(), PlaybackStatus::Playing);
        controller.press_button();
        assert_eq!(controller.status(), PlaybackStatus::Paused);
        controller.press_button();
        assert_eq!(controller.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn pin_and_unpin() {
        let mut controller = controller();
        controller.pin(Some(RegionId::new(250)));
        assert_eq!(controller.state().pinned_region, Some(RegionId::new(250)));
        controller.pin(None);
        assert_eq!(controller.state().pinned_region, None);
    }

    #[test]
    fn config_deserializes_from_toml() {
        let config: PlaybackConfig = toml::from_str("last_year = 2000").unwrap();
        assert_eq!(config.first_year, Year::new(1980));
        assert_eq!(config.last_year, Year::new(2000));
        assert_eq!(config.tick_interval(), Duration::from_millis(750));
    }
}
