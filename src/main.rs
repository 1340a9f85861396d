use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use uuid::Uuid;

use timesplit::dates::parse_local_datetime;
use timesplit::earnings::summarize_projects;
use timesplit::logging::enable_logging;
use timesplit::materialize::{materialize_edit, materialize_entry, PostAdjustmentOverlap};
use timesplit::models::{EntryDraft, WorkProject, WorkTimeEntry};
use timesplit::notification::build_notification;
use timesplit::rounding::RoundingDirection;
use timesplit::settings::{resolve_rounding_settings, GlobalSettings};
use timesplit::storage;

#[derive(Parser, Debug)]
#[command(name = "timesplit", version, about = "Split and round time entries around existing ones")]
struct Args {
    #[command(subcommand)]
    command: Command,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Global settings file. Defaults to ~/.timesplit.json"
    )]
    settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Resolve a draft entry against the existing entries of its project")]
    Resolve {
        #[arg(long, help = "JSON file with project, existing entries and an optional draft")]
        request: PathBuf,
        #[arg(long, help = "Override the draft start (YYYY-MM-DD HH:MM, local time)")]
        start: Option<String>,
        #[arg(long, help = "Override the draft end (YYYY-MM-DD HH:MM, local time)")]
        end: Option<String>,
        #[arg(long, help = "Id of the entry being edited")]
        editing: Option<Uuid>,
        #[arg(long, help = "Keep aligned or rounded entries even if they overlap again")]
        allow_overlap: bool,
        #[arg(long, help = "Print the result as JSON")]
        json: bool,
    },
    #[command(about = "Show hours and earnings per project")]
    Summary {
        #[arg(long, help = "JSON file with projects and entries")]
        request: PathBuf,
    },
    #[command(about = "Show or change global timer rounding settings")]
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        fragments: Option<bool>,
        #[arg(long)]
        fragment_minutes: Option<u32>,
        #[arg(long)]
        rounding_minutes: Option<u32>,
        #[arg(long, value_enum)]
        direction: Option<RoundingDirection>,
        #[arg(long, help = "Reset every setting before applying the others")]
        clear: bool,
    },
}

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    project: WorkProject,
    #[serde(default)]
    existing: Vec<WorkTimeEntry>,
    #[serde(default)]
    draft: Option<EntryDraft>,
}

#[derive(Debug, Deserialize)]
struct SummaryRequest {
    projects: Vec<WorkProject>,
    entries: Vec<WorkTimeEntry>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(logging_level)?;

    run(args).inspect_err(|e| {
        error!("Error running timesplit {e:?}");
    })
}

fn run(args: Args) -> Result<ExitCode> {
    let settings_file = args.settings.as_deref();

    match args.command {
        Command::Resolve {
            request,
            start,
            end,
            editing,
            allow_overlap,
            json,
        } => {
            let request: ResolveRequest = read_json(&request)?;
            let draft = build_draft(&request, start.as_deref(), end.as_deref())?;
            let settings = resolve_rounding_settings(&request.project, &load_settings(settings_file));
            let policy = if allow_overlap {
                PostAdjustmentOverlap::Allow
            } else {
                PostAdjustmentOverlap::Trim
            };
            info!(?settings, ?policy, "resolving draft");

            let materialization = match editing {
                Some(id) => {
                    materialize_edit(id, &draft, &request.existing, &settings, policy, &Local)?
                }
                None => materialize_entry(&draft, &request.existing, &settings, policy, &Local)?,
            };

            let notification = build_notification(&materialization, &Local);
            if json {
                println!("{}", serde_json::to_string_pretty(&materialization)?);
            } else {
                println!("{notification}");
            }

            Ok(if notification.is_error() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Summary { request } => {
            let request: SummaryRequest = read_json(&request)?;
            for summary in summarize_projects(&request.entries, &request.projects) {
                println!(
                    "{:<24} {:>7.2}h  paid {:>6.2}h  unpaid {:>6.2}h  {:>10.2} {}",
                    summary.name,
                    summary.total_hours,
                    summary.paid_hours,
                    summary.unpaid_hours,
                    summary.earnings,
                    summary.currency
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Settings { action } => {
            match action {
                SettingsAction::Show => {
                    let settings = load_settings(settings_file);
                    println!("{}", serde_json::to_string_pretty(&settings)?);
                }
                SettingsAction::Set {
                    fragments,
                    fragment_minutes,
                    rounding_minutes,
                    direction,
                    clear,
                } => {
                    let mut settings = if clear {
                        GlobalSettings::default()
                    } else {
                        load_settings(settings_file)
                    };
                    if fragment_minutes == Some(0) {
                        return Err(anyhow!("Fragment size must be at least one minute."));
                    }
                    settings.round_in_time_fragments = fragments.or(settings.round_in_time_fragments);
                    settings.time_fragment_interval =
                        fragment_minutes.or(settings.time_fragment_interval);
                    settings.rounding_interval = rounding_minutes.or(settings.rounding_interval);
                    settings.rounding_direction = direction.or(settings.rounding_direction);
                    save_settings(settings_file, &settings)?;
                    println!("{}", serde_json::to_string_pretty(&settings)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_draft(request: &ResolveRequest, start: Option<&str>, end: Option<&str>) -> Result<EntryDraft> {
    let start = start.map(parse_local_datetime).transpose().map_err(|e| anyhow!(e))?;
    let end = end.map(parse_local_datetime).transpose().map_err(|e| anyhow!(e))?;

    match (&request.draft, start, end) {
        (Some(draft), _, _) if draft.project_id != request.project.id => Err(anyhow!(
            "The draft belongs to project {}, but the request is for project {}.",
            draft.project_id,
            request.project.id
        )),
        (Some(draft), start, end) => Ok(EntryDraft {
            start_time: start.unwrap_or(draft.start_time),
            end_time: end.unwrap_or(draft.end_time),
            ..draft.clone()
        }),
        (None, Some(start), Some(end)) => {
            Ok(EntryDraft::for_project(&request.project, start, end, None))
        }
        (None, _, _) => Err(anyhow!(
            "The request has no draft. Pass both --start and --end."
        )),
    }
}

fn load_settings(path: Option<&Path>) -> GlobalSettings {
    match path {
        Some(path) => storage::read_settings_from(path).unwrap_or_default(),
        None => storage::read_settings(),
    }
}

fn save_settings(path: Option<&Path>, settings: &GlobalSettings) -> Result<()> {
    let written = match path {
        Some(path) => storage::write_settings_to(path, settings),
        None => storage::write_settings(settings),
    };
    written.context("Failed to write settings")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}
