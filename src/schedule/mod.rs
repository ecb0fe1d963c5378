pub mod calculator;
pub mod model;

use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ScheduleError {
    #[error("invalid prayer time '{input}', expected HH:MM")]
    InvalidTimeFormat { input: String },
}
