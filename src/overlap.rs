use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::interval::{subtract_intervals, TimeInterval};
use crate::models::{EntryDraft, WorkTimeEntry};

/// What became of a draft once the project's existing entries were taken
/// out of it. Each variant maps to a distinct user-facing outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OverlapResolution {
    /// Nothing intersected the draft; it is stored as a single entry.
    NoOverlap { created: WorkTimeEntry },
    /// Some of the draft survived as one or more fragments.
    PartialOverlap {
        created: Vec<WorkTimeEntry>,
        overlapping: Vec<WorkTimeEntry>,
    },
    /// Existing entries cover the whole draft. Nothing is stored.
    CompleteOverlap { overlapping: Vec<WorkTimeEntry> },
}

impl OverlapResolution {
    pub fn is_complete_overlap(&self) -> bool {
        matches!(self, Self::CompleteOverlap { .. })
    }

    /// Entries to persist, `None` when the draft was fully covered.
    pub fn created_entries(&self) -> Option<&[WorkTimeEntry]> {
        match self {
            Self::NoOverlap { created } => Some(std::slice::from_ref(created)),
            Self::PartialOverlap { created, .. } => Some(created),
            Self::CompleteOverlap { .. } => None,
        }
    }

    /// Pre-existing entries that intersected the draft, `None` when there
    /// were none.
    pub fn overlapping_entries(&self) -> Option<&[WorkTimeEntry]> {
        match self {
            Self::NoOverlap { .. } => None,
            Self::PartialOverlap { overlapping, .. } | Self::CompleteOverlap { overlapping } => {
                Some(overlapping)
            }
        }
    }
}

/// Splits `draft` around every entry in `existing` that intersects it.
///
/// `existing` must already be limited to the draft's project and reflect the
/// latest known state of that project; stale input can let overlaps through.
/// Entries with an empty or reversed span are ignored.
pub fn resolve_overlaps(draft: &EntryDraft, existing: &[WorkTimeEntry]) -> Result<OverlapResolution> {
    let candidate = draft.interval()?;

    let mut overlapping: Vec<(TimeInterval, &WorkTimeEntry)> = existing
        .iter()
        .filter_map(|entry| match entry.interval() {
            Ok(interval) => Some((interval, entry)),
            Err(err) => {
                warn!(entry_id = %entry.id, "skipping existing entry: {err}");
                None
            }
        })
        .filter(|(interval, _)| interval.overlaps(&candidate))
        .collect();

    if overlapping.is_empty() {
        debug!("no overlapping entries");
        return Ok(OverlapResolution::NoOverlap {
            created: draft.to_entry(candidate),
        });
    }

    overlapping.sort_by_key(|(interval, _)| interval.start());
    let blockers: Vec<TimeInterval> = overlapping.iter().map(|(interval, _)| *interval).collect();
    let overlapping: Vec<WorkTimeEntry> = overlapping
        .into_iter()
        .map(|(_, entry)| entry.clone())
        .collect();

    let fragments = subtract_intervals(candidate, &blockers);
    debug!(
        overlapping = overlapping.len(),
        fragments = fragments.len(),
        "resolved overlapping entries"
    );

    if fragments.is_empty() {
        return Ok(OverlapResolution::CompleteOverlap { overlapping });
    }

    let created = fragments
        .into_iter()
        .map(|fragment| draft.to_entry(fragment))
        .collect();
    Ok(OverlapResolution::PartialOverlap {
        created,
        overlapping,
    })
}
