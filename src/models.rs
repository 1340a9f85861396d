use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Result;
use crate::interval::TimeInterval;
use crate::rounding::RoundingDirection;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkProject {
    pub id: Uuid,
    pub name: String,
    pub salary: f64,
    pub currency: String,
    pub hourly_payment: bool,
    #[serde(default)]
    pub rounding_interval: Option<u32>,
    #[serde(default)]
    pub rounding_direction: Option<RoundingDirection>,
    #[serde(default)]
    pub round_in_time_fragments: Option<bool>,
    #[serde(default)]
    pub time_fragment_interval: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkTimeEntry {
    pub id: Uuid,
    pub project_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub active_seconds: i64,
    pub salary: f64,
    pub currency: String,
    pub hourly_payment: bool,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub single_cashflow_id: Option<Uuid>,
    #[serde(default)]
    pub payout_id: Option<Uuid>,
    #[serde(default)]
    pub time_fragments_interval: Option<u32>,
}

impl WorkTimeEntry {
    pub fn interval(&self) -> Result<TimeInterval> {
        TimeInterval::new(self.start_time, self.end_time)
    }

    /// Paid entries carry a back-reference to the cashflow or payout that
    /// settled them.
    pub fn is_paid(&self) -> bool {
        self.single_cashflow_id.is_some() || self.payout_id.is_some()
    }

    /// Same entry moved onto `interval`, with `active_seconds` recomputed.
    pub fn with_interval(&self, interval: TimeInterval) -> Self {
        Self {
            start_time: interval.start(),
            end_time: interval.end(),
            active_seconds: interval.duration_seconds(),
            ..self.clone()
        }
    }
}

/// A time entry the user asked for, before overlap resolution.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EntryDraft {
    pub project_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub salary: f64,
    pub currency: String,
    pub hourly_payment: bool,
    #[serde(default)]
    pub memo: Option<String>,
}

impl EntryDraft {
    /// Draft with the project's current rate snapshotted into it.
    pub fn for_project(
        project: &WorkProject,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        memo: Option<String>,
    ) -> Self {
        Self {
            project_id: project.id,
            start_time,
            end_time,
            salary: project.salary,
            currency: project.currency.clone(),
            hourly_payment: project.hourly_payment,
            memo,
        }
    }

    pub fn interval(&self) -> Result<TimeInterval> {
        TimeInterval::new(self.start_time, self.end_time)
    }

    pub fn to_entry(&self, interval: TimeInterval) -> WorkTimeEntry {
        WorkTimeEntry {
            id: Uuid::new_v4(),
            project_id: self.project_id,
            start_time: interval.start(),
            end_time: interval.end(),
            active_seconds: interval.duration_seconds(),
            salary: self.salary,
            currency: self.currency.clone(),
            hourly_payment: self.hourly_payment,
            memo: self.memo.clone(),
            single_cashflow_id: None,
            payout_id: None,
            time_fragments_interval: None,
        }
    }
}
