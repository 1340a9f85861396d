use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::errors::Result;
use crate::fragments::align_entry;
use crate::interval::{subtract_intervals, TimeInterval};
use crate::models::{EntryDraft, WorkTimeEntry};
use crate::overlap::{resolve_overlaps, OverlapResolution};
use crate::rounding::round_entry;
use crate::settings::TimerRoundingSettings;

/// What to do when alignment or rounding pushes a fragment back over
/// another entry of the same project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostAdjustmentOverlap {
    /// Cut the adjusted fragment around existing entries and around the
    /// fragments already accepted from the same draft.
    #[default]
    Trim,
    /// Keep adjusted fragments as they are, even if they overlap.
    Allow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Materialization {
    /// The span the user asked for, before any splitting or rounding.
    pub requested: TimeInterval,
    pub resolution: OverlapResolution,
}

/// Turns a draft into the entries to persist for its project.
///
/// Entries of other projects in `existing` are ignored. Surviving fragments
/// are either aligned to time fragments on the wall clock of `tz` or
/// rounded, as `settings` selects.
#[instrument(skip_all, fields(project_id = %draft.project_id))]
pub fn materialize_entry<Tz: TimeZone>(
    draft: &EntryDraft,
    existing: &[WorkTimeEntry],
    settings: &TimerRoundingSettings,
    policy: PostAdjustmentOverlap,
    tz: &Tz,
) -> Result<Materialization> {
    let requested = draft.interval()?;

    let scoped: Vec<WorkTimeEntry> = existing
        .iter()
        .filter(|entry| entry.project_id == draft.project_id)
        .cloned()
        .collect();
    if scoped.len() < existing.len() {
        warn!(
            ignored = existing.len() - scoped.len(),
            kept = scoped.len(),
            "existing entries belong to another project"
        );
    }

    let (created, mut overlapping) = match resolve_overlaps(draft, &scoped)? {
        OverlapResolution::NoOverlap { created } => (vec![created], Vec::new()),
        OverlapResolution::PartialOverlap {
            created,
            overlapping,
        } => (created, overlapping),
        complete @ OverlapResolution::CompleteOverlap { .. } => {
            debug!("draft fully covered by existing entries");
            return Ok(Materialization {
                requested,
                resolution: complete,
            });
        }
    };

    let adjusted = created
        .iter()
        .map(|entry| adjust_entry(entry, settings, tz))
        .collect::<Result<Vec<_>>>()?;

    let created = match policy {
        PostAdjustmentOverlap::Allow => adjusted,
        PostAdjustmentOverlap::Trim => trim_adjusted(adjusted, &scoped, &mut overlapping)?,
    };

    Ok(Materialization {
        requested,
        resolution: classify(created, overlapping),
    })
}

/// Re-splits an edited entry. The entry being edited is left out of the
/// existing entries so it never conflicts with its own new span.
pub fn materialize_edit<Tz: TimeZone>(
    edited_id: Uuid,
    draft: &EntryDraft,
    existing: &[WorkTimeEntry],
    settings: &TimerRoundingSettings,
    policy: PostAdjustmentOverlap,
    tz: &Tz,
) -> Result<Materialization> {
    let others: Vec<WorkTimeEntry> = existing
        .iter()
        .filter(|entry| entry.id != edited_id)
        .cloned()
        .collect();
    materialize_entry(draft, &others, settings, policy, tz)
}

fn adjust_entry<Tz: TimeZone>(
    entry: &WorkTimeEntry,
    settings: &TimerRoundingSettings,
    tz: &Tz,
) -> Result<WorkTimeEntry> {
    if settings.round_in_time_fragments {
        align_entry(entry, settings.time_fragment_interval, tz)
    } else {
        round_entry(entry, &settings.rounding())
    }
}

fn trim_adjusted(
    adjusted: Vec<WorkTimeEntry>,
    existing: &[WorkTimeEntry],
    overlapping: &mut Vec<WorkTimeEntry>,
) -> Result<Vec<WorkTimeEntry>> {
    let existing: Vec<(TimeInterval, &WorkTimeEntry)> = existing
        .iter()
        .filter_map(|entry| entry.interval().ok().map(|interval| (interval, entry)))
        .collect();
    let mut blockers: Vec<TimeInterval> = existing.iter().map(|(interval, _)| *interval).collect();

    let mut trimmed = Vec::with_capacity(adjusted.len());
    for entry in adjusted {
        let block = entry.interval()?;

        for (interval, other) in &existing {
            if interval.overlaps(&block) && !overlapping.iter().any(|known| known.id == other.id) {
                overlapping.push((*other).clone());
            }
        }

        let pieces = subtract_intervals(block, &blockers);
        if pieces.len() != 1 || pieces[0] != block {
            debug!(
                entry_id = %entry.id,
                pieces = pieces.len(),
                "trimmed adjusted entry"
            );
        }
        for (index, piece) in pieces.into_iter().enumerate() {
            let mut piece_entry = entry.with_interval(piece);
            if index > 0 {
                piece_entry.id = Uuid::new_v4();
            }
            trimmed.push(piece_entry);
        }
        blockers.push(block);
    }

    overlapping.sort_by_key(|entry| entry.start_time);
    Ok(trimmed)
}

fn classify(mut created: Vec<WorkTimeEntry>, overlapping: Vec<WorkTimeEntry>) -> OverlapResolution {
    if created.is_empty() {
        return OverlapResolution::CompleteOverlap { overlapping };
    }
    if overlapping.is_empty() && created.len() == 1 {
        if let Some(created) = created.pop() {
            return OverlapResolution::NoOverlap { created };
        }
    }
    OverlapResolution::PartialOverlap {
        created,
        overlapping,
    }
}
