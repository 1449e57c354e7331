//! The event loop: owns the tick timer and feeds commands through
//! [`Session::dispatch`] one at a time.

use std::time::Duration;

use tokio::{
    sync::mpsc,
    time::{Instant, Interval, MissedTickBehavior},
};
use vaxmap_playback::{TimerEffect, TimerId};

use crate::{
    command::UiCommand,
    session::{Frame, Session},
};

/// A running tick timer tagged with its generation.
#[derive(Debug)]
struct Ticker {
    timer: TimerId,
    interval: Interval,
}

impl Ticker {
    fn start(timer: TimerId, period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::debug!("Started {timer} every {period:?}");
        Self { timer, interval }
    }
}

async fn next_tick(ticker: Option<&mut Ticker>) -> TimerId {
    match ticker {
        Some(ticker) => {
            ticker.interval.tick().await;
            ticker.timer
        }
        None => std::future::pending().await,
    }
}

fn apply_timer(ticker: &mut Option<Ticker>, effect: TimerEffect) {
    match effect {
        TimerEffect::Start { timer, interval } => {
            *ticker = Some(Ticker::start(timer, interval));
        }
        TimerEffect::Cancel(timer) => {
            if ticker.as_ref().is_some_and(|running| running.timer == timer) {
                log::debug!("Cancelled {timer}");
                *ticker = None;
            }
        }
    }
}

/// Runs the session until there is nothing left to do.
///
/// Commands take priority over ticks. Cancelling a timer drops it, so no
/// tick is delivered for it afterwards. The loop returns once the command
/// channel is closed and no timer is running, or as soon as the frame
/// receiver is dropped.
pub async fn run_event_loop(
    mut session: Session,
    mut commands: mpsc::Receiver<UiCommand>,
    frames: mpsc::Sender<Frame>,
) -> Session {
    let mut ticker: Option<Ticker> = None;
    let mut commands_open = true;

    loop {
        if !commands_open && ticker.is_none() {
            log::debug!("No commands or timer left, stopping event loop");
            break;
        }

        let command = tokio::select! {
            biased;
            command = commands.recv(), if commands_open => {
                let Some(command) = command else {
                    commands_open = false;
                    continue;
                };
                command
            }
            timer = next_tick(ticker.as_mut()) => UiCommand::Tick(timer),
        };

        let dispatch = session.dispatch(command);

        if let Some(effect) = dispatch.timer {
            apply_timer(&mut ticker, effect);
        }

        if let Some(frame) = dispatch.frame
            && frames.send(frame).await.is_err()
        {
            log::debug!("Frame receiver dropped, stopping event loop");
            break;
        }
    }

    session
}
