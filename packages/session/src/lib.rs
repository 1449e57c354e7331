#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive map session.
//!
//! Wires the pieces together: [`config`] reads `vaxmap.toml`, [`loader`]
//! fetches both datasets concurrently, [`Session`] maps each [`UiCommand`]
//! onto the playback controller and the view synchronizer, and
//! [`run_event_loop`] drives it all on a single task with one cancellable
//! tick timer.

pub mod command;
pub mod config;
pub mod driver;
pub mod loader;
pub mod session;

pub use command::UiCommand;
pub use config::{AppConfig, ConfigError};
pub use driver::run_event_loop;
pub use loader::{Datasets, LoadError, load_datasets};
pub use session::{Dispatch, Frame, LOAD_FAILED_MESSAGE, LoadState, Session, SessionError, initialize};
