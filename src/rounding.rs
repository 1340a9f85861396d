use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TimeEntryError};
use crate::interval::TimeInterval;
use crate::models::WorkTimeEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RoundingDirection {
    Up,
    Down,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingConfig {
    pub interval_minutes: u32,
    pub direction: RoundingDirection,
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 0,
            direction: RoundingDirection::Nearest,
        }
    }
}

/// Rounds a non-negative duration in seconds to the configured increment.
pub fn round_seconds(seconds: i64, cfg: &RoundingConfig) -> i64 {
    if cfg.interval_minutes == 0 {
        return seconds;
    }

    let increment_seconds = i64::from(cfg.interval_minutes) * 60;

    match cfg.direction {
        RoundingDirection::Down => (seconds / increment_seconds) * increment_seconds,
        RoundingDirection::Up => {
            if seconds % increment_seconds == 0 {
                seconds
            } else {
                ((seconds / increment_seconds) + 1) * increment_seconds
            }
        }
        RoundingDirection::Nearest => {
            let lower = (seconds / increment_seconds) * increment_seconds;
            let upper = if seconds % increment_seconds == 0 {
                lower
            } else {
                lower + increment_seconds
            };
            let distance_to_lower = seconds - lower;
            let distance_to_upper = upper - seconds;
            if distance_to_upper <= distance_to_lower {
                upper
            } else {
                lower
            }
        }
    }
}

/// Rounds the duration of `interval`, keeping its start and moving its end.
pub fn apply_rounding(interval: TimeInterval, cfg: &RoundingConfig) -> Result<TimeInterval> {
    if cfg.interval_minutes == 0 {
        return Ok(interval);
    }

    // Sub-second precision is dropped so the result is a whole number of seconds.
    let rounded = round_seconds(interval.duration_seconds(), cfg);
    let end = interval.start() + Duration::seconds(rounded);
    TimeInterval::new(interval.start(), end).map_err(|_| TimeEntryError::DegenerateAdjustment {
        start: interval.start(),
        end,
    })
}

pub fn round_entry(entry: &WorkTimeEntry, cfg: &RoundingConfig) -> Result<WorkTimeEntry> {
    let rounded = apply_rounding(entry.interval()?, cfg)?;
    Ok(entry.with_interval(rounded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::tests::{at, span};

    fn cfg(interval_minutes: u32, direction: RoundingDirection) -> RoundingConfig {
        RoundingConfig {
            interval_minutes,
            direction,
        }
    }

    #[test]
    fn round_seconds_off_returns_raw() {
        let cfg = cfg(0, RoundingDirection::Nearest);
        assert_eq!(round_seconds(123, &cfg), 123);
    }

    #[test]
    fn round_seconds_up() {
        let cfg = cfg(15, RoundingDirection::Up);
        assert_eq!(round_seconds(1, &cfg), 900);
        assert_eq!(round_seconds(900, &cfg), 900);
        assert_eq!(round_seconds(901, &cfg), 1800);
    }

    #[test]
    fn round_seconds_down() {
        let cfg = cfg(15, RoundingDirection::Down);
        assert_eq!(round_seconds(899, &cfg), 0);
        assert_eq!(round_seconds(900, &cfg), 900);
        assert_eq!(round_seconds(1799, &cfg), 900);
    }

    #[test]
    fn round_seconds_nearest_ties_up() {
        let cfg = cfg(15, RoundingDirection::Nearest);
        assert_eq!(round_seconds(449, &cfg), 0);
        assert_eq!(round_seconds(450, &cfg), 900);
        assert_eq!(round_seconds(1349, &cfg), 900);
        assert_eq!(round_seconds(1350, &cfg), 1800);
    }

    #[test]
    fn fifty_three_minutes_in_quarter_hours() {
        let interval = span((10, 0), (10, 53));

        let up = apply_rounding(interval, &cfg(15, RoundingDirection::Up)).unwrap();
        let down = apply_rounding(interval, &cfg(15, RoundingDirection::Down)).unwrap();
        let nearest = apply_rounding(interval, &cfg(15, RoundingDirection::Nearest)).unwrap();

        assert_eq!(up, span((10, 0), (11, 0)));
        assert_eq!(down, span((10, 0), (10, 45)));
        assert_eq!(nearest, span((10, 0), (11, 0)));
    }

    #[test]
    fn zero_interval_passes_through() {
        let interval = TimeInterval::new(at(10, 0), at(10, 7) + Duration::seconds(13)).unwrap();
        assert_eq!(
            apply_rounding(interval, &cfg(0, RoundingDirection::Up)).unwrap(),
            interval
        );
    }

    #[test]
    fn rounding_down_to_nothing_is_rejected() {
        let result = apply_rounding(span((10, 0), (10, 10)), &cfg(15, RoundingDirection::Down));
        assert_eq!(
            result,
            Err(TimeEntryError::DegenerateAdjustment {
                start: at(10, 0),
                end: at(10, 0),
            })
        );
    }

    #[test]
    fn duration_moves_in_the_requested_direction() {
        for minutes in 1..=180_i64 {
            let interval = TimeInterval::new(at(8, 0), at(8, 0) + Duration::minutes(minutes)).unwrap();
            let actual = interval.duration_seconds();

            let up = apply_rounding(interval, &cfg(15, RoundingDirection::Up)).unwrap();
            assert!(up.duration_seconds() >= actual);

            if let Ok(down) = apply_rounding(interval, &cfg(15, RoundingDirection::Down)) {
                assert!(down.duration_seconds() <= actual);
            }

            if let Ok(nearest) = apply_rounding(interval, &cfg(15, RoundingDirection::Nearest)) {
                assert!((nearest.duration_seconds() - actual).abs() <= 15 * 60 / 2);
            }
        }
    }

    #[test]
    fn round_entry_recomputes_active_seconds() {
        let entry = WorkTimeEntry {
            id: uuid::Uuid::new_v4(),
            project_id: uuid::Uuid::new_v4(),
            start_time: at(9, 0),
            end_time: at(9, 53),
            active_seconds: 53 * 60,
            salary: 40.0,
            currency: "EUR".to_string(),
            hourly_payment: true,
            memo: None,
            single_cashflow_id: None,
            payout_id: None,
            time_fragments_interval: None,
        };
        let rounded = round_entry(&entry, &cfg(15, RoundingDirection::Up)).unwrap();
        assert_eq!(rounded.end_time, at(10, 0));
        assert_eq!(rounded.active_seconds, 3600);
        assert_eq!(rounded.id, entry.id);
    }
}
