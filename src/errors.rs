use chrono::{DateTime, Utc};
use thiserror::Error;

/// Hard failures of the time entry engine. Overlap outcomes are not errors,
/// they are reported through [`crate::overlap::OverlapResolution`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeEntryError {
    #[error("Invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid time fragment size: {0} minutes")]
    InvalidFragmentSize(u32),

    #[error("Adjusting {start} → {end} leaves no positive duration")]
    DegenerateAdjustment {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

pub type Result<T> = std::result::Result<T, TimeEntryError>;
