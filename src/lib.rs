#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod app;
pub mod clock;
pub mod compress;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
pub mod process;
pub mod rotation;
pub mod scheduler;
pub mod test_support;

pub use clock::PeriodClock;
pub use config::{RotationConfig, Settings};
pub use error::RotatorError;
pub use scheduler::{RotationScheduler, TickOutcome};
