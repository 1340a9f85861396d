use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use tracing::debug;

use crate::errors::{Result, TimeEntryError};
use crate::interval::TimeInterval;
use crate::models::WorkTimeEntry;

/// Fragment sizes offered to users. Other positive sizes are accepted too.
pub const STANDARD_FRAGMENT_MINUTES: [u32; 5] = [5, 10, 15, 30, 60];

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Expands `interval` outward onto a grid of `fragment_minutes` blocks and
/// returns the single block range that contains it.
///
/// The grid follows the wall clock of `tz`: it restarts at every local hour
/// for sizes up to an hour and at every local midnight for longer ones, so a
/// 45 minute grid has boundaries at `:00` and `:45`. Boundaries are whole
/// minutes. A trailing partial minute still counts, so the block always
/// covers the whole input.
pub fn align_to_fragments<Tz: TimeZone>(
    interval: TimeInterval,
    fragment_minutes: u32,
    tz: &Tz,
) -> Result<TimeInterval> {
    if fragment_minutes == 0 {
        return Err(TimeEntryError::InvalidFragmentSize(fragment_minutes));
    }
    if !STANDARD_FRAGMENT_MINUTES.contains(&fragment_minutes) {
        debug!(fragment_minutes, "aligning to a non-standard fragment size");
    }

    let size = i64::from(fragment_minutes);
    let period = if size <= MINUTES_PER_HOUR {
        MINUTES_PER_HOUR
    } else {
        MINUTES_PER_DAY
    };
    let fragment = Duration::minutes(size);
    let out_of_range = || TimeEntryError::DegenerateAdjustment {
        start: interval.start(),
        end: interval.end(),
    };

    let (start_anchor, start_minute) = grid_position(interval.start(), tz, period);
    let block_start = start_anchor
        .checked_add_signed(Duration::minutes(start_minute / size * size))
        .ok_or_else(out_of_range)?;

    let (end_anchor, end_minute) = grid_position(interval.end(), tz, period);
    let end_offset = if end_minute % size == 0 {
        end_minute
    } else {
        ((end_minute / size + 1) * size).min(period)
    };
    let mut block_end = end_anchor
        .checked_add_signed(Duration::minutes(end_offset))
        .ok_or_else(out_of_range)?;

    // A sub-minute input sitting on a boundary ceils onto its own start.
    if block_end <= block_start {
        block_end = block_start.checked_add_signed(fragment).ok_or_else(out_of_range)?;
    }
    // Seconds past the last boundary still belong to the entry.
    if block_end < interval.end() {
        block_end = block_end.checked_add_signed(fragment).ok_or_else(out_of_range)?;
    }

    TimeInterval::new(block_start, block_end)
}

pub fn align_entry<Tz: TimeZone>(
    entry: &WorkTimeEntry,
    fragment_minutes: u32,
    tz: &Tz,
) -> Result<WorkTimeEntry> {
    let block = align_to_fragments(entry.interval()?, fragment_minutes, tz)?;
    let mut aligned = entry.with_interval(block);
    aligned.time_fragments_interval = Some(fragment_minutes);
    Ok(aligned)
}

/// Start of the local hour (or day) containing `instant`, in UTC, and the
/// whole local minutes elapsed since then.
fn grid_position<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz, period: i64) -> (DateTime<Utc>, i64) {
    let local = instant.with_timezone(tz);
    let minute = if period == MINUTES_PER_HOUR {
        i64::from(local.minute())
    } else {
        i64::from(local.hour()) * MINUTES_PER_HOUR + i64::from(local.minute())
    };
    let into_period = Duration::minutes(minute)
        + Duration::seconds(i64::from(local.second()))
        + Duration::nanoseconds(i64::from(local.nanosecond()));
    (instant - into_period, minute)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::tests::{at, span};
    use crate::models::EntryDraft;
    use chrono::{Duration, FixedOffset};
    use uuid::Uuid;

    #[test]
    fn expands_to_enclosing_ten_minute_blocks() {
        let block = align_to_fragments(span((10, 3), (10, 37)), 10, &Utc).unwrap();
        assert_eq!(block, span((10, 0), (10, 40)));
        assert_eq!(block.duration_seconds(), 2400);
    }

    #[test]
    fn sizes_that_do_not_divide_an_hour_restart_at_the_hour() {
        assert_eq!(
            align_to_fragments(span((10, 3), (10, 37)), 45, &Utc).unwrap(),
            span((10, 0), (10, 45))
        );
        assert_eq!(
            align_to_fragments(span((10, 3), (10, 37)), 7, &Utc).unwrap(),
            span((10, 0), (10, 42))
        );
        assert_eq!(
            align_to_fragments(span((10, 50), (11, 10)), 45, &Utc).unwrap(),
            span((10, 45), (11, 45))
        );
        // The block after 10:45 ends at the next hour, not at 11:30.
        assert_eq!(
            align_to_fragments(span((10, 46), (10, 58)), 45, &Utc).unwrap(),
            span((10, 45), (11, 0))
        );
    }

    #[test]
    fn hour_blocks_follow_the_local_hour_in_half_hour_zones() {
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        // 15:33 to 16:07 local time.
        let block = align_to_fragments(span((10, 3), (10, 37)), 60, &offset).unwrap();
        assert_eq!(block, span((9, 30), (11, 30)));
        assert_eq!(block.start().with_timezone(&offset).minute(), 0);
    }

    #[test]
    fn sizes_above_an_hour_restart_at_local_midnight() {
        // Boundaries at 09:00, 10:30 and 12:00.
        let block = align_to_fragments(span((10, 3), (10, 37)), 90, &Utc).unwrap();
        assert_eq!(block, span((9, 0), (12, 0)));
    }

    #[test]
    fn sliver_on_a_boundary_becomes_one_full_fragment() {
        // The end ceils onto the start itself, so the block is widened by one fragment.
        let interval = TimeInterval::new(at(10, 0), at(10, 0) + Duration::seconds(20)).unwrap();
        let block = align_to_fragments(interval, 10, &Utc).unwrap();
        assert_eq!(block, span((10, 0), (10, 10)));
        assert_eq!(block.duration_seconds(), 600);
    }

    #[test]
    fn trailing_seconds_push_the_end_to_the_next_block() {
        let interval = TimeInterval::new(at(10, 3), at(10, 40) + Duration::seconds(30)).unwrap();
        assert_eq!(align_to_fragments(interval, 10, &Utc).unwrap(), span((10, 0), (10, 50)));
    }

    #[test]
    fn aligned_interval_is_a_fixed_point() {
        for minutes in STANDARD_FRAGMENT_MINUTES {
            let once = align_to_fragments(span((9, 7), (11, 52)), minutes, &Utc).unwrap();
            let twice = align_to_fragments(once, minutes, &Utc).unwrap();
            assert_eq!(once, twice, "fragment size {minutes}");
        }
    }

    #[test]
    fn block_always_contains_the_input() {
        for start_minute in 0..60 {
            for length in 1..90_i64 {
                let start = at(10, start_minute) + Duration::seconds(7);
                let interval = TimeInterval::new(start, start + Duration::minutes(length)).unwrap();
                let block = align_to_fragments(interval, 15, &Utc).unwrap();
                assert!(block.contains(&interval));
                assert_eq!(block.duration_seconds() % (15 * 60), 0);
            }
        }
    }

    #[test]
    fn hour_fragments_cross_midnight() {
        let start = at(23, 20);
        let interval = TimeInterval::new(start, start + Duration::minutes(70)).unwrap();
        let block = align_to_fragments(interval, 60, &Utc).unwrap();
        assert_eq!(block.start(), at(23, 0));
        assert_eq!(block.end(), at(23, 0) + Duration::hours(2));
    }

    #[test]
    fn zero_fragment_size_is_rejected() {
        assert_eq!(
            align_to_fragments(span((10, 0), (11, 0)), 0, &Utc),
            Err(TimeEntryError::InvalidFragmentSize(0))
        );
    }

    #[test]
    fn align_entry_records_the_fragment_size() {
        let draft = EntryDraft {
            project_id: Uuid::new_v4(),
            start_time: at(10, 3),
            end_time: at(10, 37),
            salary: 60.0,
            currency: "USD".to_string(),
            hourly_payment: true,
            memo: None,
        };
        let entry = draft.to_entry(draft.interval().unwrap());
        let aligned = align_entry(&entry, 10, &Utc).unwrap();
        assert_eq!(aligned.start_time, at(10, 0));
        assert_eq!(aligned.end_time, at(10, 40));
        assert_eq!(aligned.active_seconds, 2400);
        assert_eq!(aligned.time_fragments_interval, Some(10));
    }
}
