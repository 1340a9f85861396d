use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{WorkProject, WorkTimeEntry};

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project_id: Uuid,
    pub name: String,
    pub currency: String,
    pub total_hours: f64,
    pub paid_hours: f64,
    pub unpaid_hours: f64,
    pub earnings: f64,
}

/// Earnings of an hourly entry, `None` for fixed-price work.
pub fn entry_earnings(entry: &WorkTimeEntry) -> Option<f64> {
    entry
        .hourly_payment
        .then(|| entry.active_seconds as f64 / 3600.0 * entry.salary)
}

/// Totals per project, busiest project first. Fixed-price projects earn
/// their salary once, regardless of how many entries they have.
pub fn summarize_projects(entries: &[WorkTimeEntry], projects: &[WorkProject]) -> Vec<ProjectSummary> {
    let project_lookup: HashMap<Uuid, &WorkProject> =
        projects.iter().map(|project| (project.id, project)).collect();

    let mut grouped: HashMap<Uuid, Vec<&WorkTimeEntry>> = HashMap::new();
    for entry in entries {
        grouped.entry(entry.project_id).or_default().push(entry);
    }

    let mut result: Vec<ProjectSummary> = grouped
        .into_iter()
        .map(|(project_id, entries)| {
            let project = project_lookup.get(&project_id);
            let name = project
                .map(|project| project.name.clone())
                .unwrap_or_else(|| "Unknown Project".to_string());

            let (paid_seconds, unpaid_seconds) = entries.iter().fold((0_i64, 0_i64), |(paid, unpaid), entry| {
                if entry.is_paid() {
                    (paid + entry.active_seconds, unpaid)
                } else {
                    (paid, unpaid + entry.active_seconds)
                }
            });

            let earnings = match project {
                Some(project) if !project.hourly_payment => project.salary,
                _ => entries.iter().filter_map(|entry| entry_earnings(entry)).sum(),
            };

            let currency = project
                .map(|project| project.currency.clone())
                .or_else(|| entries.first().map(|entry| entry.currency.clone()))
                .unwrap_or_default();

            ProjectSummary {
                project_id,
                name,
                currency,
                total_hours: (paid_seconds + unpaid_seconds) as f64 / 3600.0,
                paid_hours: paid_seconds as f64 / 3600.0,
                unpaid_hours: unpaid_seconds as f64 / 3600.0,
                earnings,
            }
        })
        .collect();

    result.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));

    result
}
