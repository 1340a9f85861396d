use std::fmt::{self, Display};

use chrono::TimeZone;
use serde::Serialize;

use crate::dates::{format_duration, format_span};
use crate::materialize::Materialization;
use crate::models::WorkTimeEntry;
use crate::overlap::OverlapResolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Breakdown shown when the saved time differs from the requested time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapDetails {
    pub requested: String,
    pub overlapping: Vec<String>,
    pub created: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub details: Option<OverlapDetails>,
}

impl Notification {
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NotificationLevel::Success => "OK",
            NotificationLevel::Error => "ERROR",
        };
        writeln!(f, "[{tag}] {}", self.title)?;
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\n  Requested: {}", details.requested)?;
            if !details.overlapping.is_empty() {
                write!(f, "\n  Overlapping:")?;
                for span in &details.overlapping {
                    write!(f, "\n    - {span}")?;
                }
            }
            if !details.created.is_empty() {
                write!(f, "\n  Created:")?;
                for span in &details.created {
                    write!(f, "\n    - {span}")?;
                }
            }
        }
        Ok(())
    }
}

/// Describes a materialization for the user, rendering times in `tz`.
pub fn build_notification<Tz: TimeZone>(materialization: &Materialization, tz: &Tz) -> Notification
where
    Tz::Offset: Display,
{
    let requested = format_span(&materialization.requested, tz);

    match &materialization.resolution {
        OverlapResolution::CompleteOverlap { overlapping } => Notification {
            level: NotificationLevel::Error,
            title: "Time entry not saved".to_string(),
            message: format!("{requested} is already fully covered by existing entries."),
            details: Some(OverlapDetails {
                requested,
                overlapping: entry_spans(overlapping, tz),
                created: Vec::new(),
            }),
        },
        OverlapResolution::PartialOverlap {
            created,
            overlapping,
        } => {
            let total: i64 = created.iter().map(|entry| entry.active_seconds).sum();
            Notification {
                level: NotificationLevel::Success,
                title: "Time entry saved with adjustments".to_string(),
                message: format!(
                    "Saved {} ({}); {} overlapped the requested time.",
                    count_label(created.len(), "entry", "entries"),
                    format_duration(total),
                    count_label(overlapping.len(), "existing entry", "existing entries"),
                ),
                details: Some(OverlapDetails {
                    requested,
                    overlapping: entry_spans(overlapping, tz),
                    created: entry_spans(created, tz),
                }),
            }
        }
        OverlapResolution::NoOverlap { created } => Notification {
            level: NotificationLevel::Success,
            title: "Time entry saved".to_string(),
            message: match created.interval() {
                Ok(interval) => format!(
                    "{} ({})",
                    format_span(&interval, tz),
                    format_duration(created.active_seconds)
                ),
                Err(_) => requested,
            },
            details: None,
        },
    }
}

fn entry_spans<Tz: TimeZone>(entries: &[WorkTimeEntry], tz: &Tz) -> Vec<String>
where
    Tz::Offset: Display,
{
    entries
        .iter()
        .filter_map(|entry| entry.interval().ok())
        .map(|interval| format_span(&interval, tz))
        .collect()
}

fn count_label(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}
