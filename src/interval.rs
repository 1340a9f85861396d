use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TimeEntryError};

/// Half-open span `[start, end)`. Always satisfies `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntervalBounds")]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct IntervalBounds {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<IntervalBounds> for TimeInterval {
    type Error = TimeEntryError;

    fn try_from(bounds: IntervalBounds) -> Result<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(TimeEntryError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_seconds(&self) -> i64 {
        self.duration().num_seconds()
    }

    /// Touching intervals (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_adjacent_to(&self, other: &TimeInterval) -> bool {
        self.end == other.start || other.end == self.start
    }
}

/// Removes every blocker from `candidate` and returns what is left, ordered by
/// start. Blockers may be unsorted and may extend past the candidate on
/// either side. Zero-length remainders are never returned.
pub fn subtract_intervals(candidate: TimeInterval, blockers: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut relevant: Vec<&TimeInterval> = blockers
        .iter()
        .filter(|blocker| blocker.overlaps(&candidate))
        .collect();
    relevant.sort_by_key(|blocker| blocker.start);

    let mut remaining = Vec::new();
    let mut cursor = candidate.start;

    for blocker in relevant {
        if blocker.start > cursor {
            remaining.push(TimeInterval {
                start: cursor,
                end: blocker.start,
            });
        }
        cursor = cursor.max(blocker.end);
    }

    if cursor < candidate.end {
        remaining.push(TimeInterval {
            start: cursor,
            end: candidate.end,
        });
    }

    remaining
}
