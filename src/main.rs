use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod error;
mod form;
mod models;
mod query;
mod report;
mod roster;
mod selection;
mod state;
mod store;

use crate::config::Config;
use crate::form::FormFields;
use crate::models::{Department, Filter, TeacherId, TeacherRecord, TeacherStatus};
use crate::roster::RosterFetcher;
use crate::state::{Effect, RosterEvent, RosterState};
use crate::store::{LogOnlyStore, TeacherStore};

#[derive(Parser)]
#[command(name = "teacher-roster")]
#[command(about = "Teacher roster administration for EduAdmin", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load the roster from this CSV file instead of the built-in sample staff
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Case-insensitive match on first name, last name or email
    #[arg(long, default_value = "")]
    search: String,
    /// Department name, or `all`
    #[arg(long, default_value = "all")]
    department: Filter<Department>,
    /// active, inactive, on-leave, or `all`
    #[arg(long, default_value = "all")]
    status: Filter<TeacherStatus>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Defaults to ROSTER_PAGE_SIZE, then 6
    #[arg(long)]
    page_size: Option<usize>,
}

impl FilterArgs {
    fn events(&self) -> Vec<RosterEvent> {
        let mut events = Vec::new();
        if let Some(page_size) = self.page_size {
            events.push(RosterEvent::PageSizeChanged(page_size));
        }
        if !self.search.is_empty() {
            events.push(RosterEvent::SearchChanged(self.search.clone()));
        }
        if self.department != Filter::All {
            events.push(RosterEvent::DepartmentChanged(self.department));
        }
        if self.status != Filter::All {
            events.push(RosterEvent::StatusChanged(self.status));
        }
        if self.page != 1 {
            events.push(RosterEvent::GoToPage(self.page));
        }
        events
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of the roster
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// Mark these teacher ids as selected
        #[arg(long, value_delimiter = ',')]
        select: Vec<TeacherId>,
        /// Drop the selection again before rendering
        #[arg(long)]
        clear_selection: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show every detail of one teacher
    Show {
        #[arg(long)]
        id: TeacherId,
    },
    /// Validate and submit a new teacher
    Create {
        /// Form field as name=value, e.g. firstName=Nora
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Validate and submit changes to a teacher
    Update {
        #[arg(long)]
        id: TeacherId,
        /// Form field as name=value, e.g. status=on-leave
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Delete one teacher after confirmation
    Delete {
        #[arg(long)]
        id: TeacherId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete several teachers after confirmation
    BulkDelete {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<TeacherId>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Write every teacher matching the filters to a file
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long)]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_roster(config: &Config) -> anyhow::Result<Vec<TeacherRecord>> {
    match &config.data {
        Some(path) => roster::import_csv(path),
        None => Ok(roster::sample_teachers()),
    }
}

fn confirm(prompt: &str, assume_yes: bool, mut input: impl BufRead) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

/// Hands `ids` to the store only once the prompt is accepted. Returns whether
/// anything was deleted.
fn delete_confirmed<S: TeacherStore>(
    store: &mut S,
    ids: &[TeacherId],
    prompt: &str,
    assume_yes: bool,
    input: impl BufRead,
) -> anyhow::Result<bool> {
    if !confirm(prompt, assume_yes, input)? {
        return Ok(false);
    }
    store.delete(ids)?;
    Ok(true)
}

fn find_teacher(records: &[TeacherRecord], id: TeacherId) -> anyhow::Result<TeacherRecord> {
    roster::find(records, id)
        .cloned()
        .with_context(|| format!("no teacher with id {id}"))
}

fn criteria_for(filters: &FilterArgs, config: &Config) -> models::QueryCriteria {
    let state = RosterState::new(config.page_size);
    filters
        .events()
        .into_iter()
        .fold(state, |state, event| state.apply(event).0)
        .criteria
}

fn print_validation_errors(errors: &error::ValidationErrors) {
    for error in &errors.errors {
        eprintln!("  - {error}");
    }
}

async fn list(
    records: Vec<TeacherRecord>,
    config: &Config,
    filters: &FilterArgs,
    select: &[TeacherId],
    clear_selection: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut state = RosterState::new(config.page_size);
    let mut fetcher = RosterFetcher::new(records, config.fetch_delay);

    if let Effect::Fetch(criteria) = state.initial_fetch() {
        fetcher.request(criteria);
    }
    for event in filters.events() {
        let (next, effect) = state.apply(event);
        state = next;
        if let Some(Effect::Fetch(criteria)) = effect {
            fetcher.request(criteria);
        }
    }
    for id in select {
        state = state
            .apply(RosterEvent::SelectionToggled {
                id: *id,
                included: true,
            })
            .0;
    }
    if clear_selection {
        state = state.apply(RosterEvent::SelectionCleared).0;
    }

    if fetcher.is_loading() {
        debug!(delay = ?config.fetch_delay, "waiting for roster fetch");
    }
    if let Some(page) = fetcher.settle().await? {
        state = state.apply(RosterEvent::PageLoaded(page)).0;
    }
    let Some(page) = state.page.as_ref() else {
        anyhow::bail!("roster fetch produced no page");
    };
    debug!(
        total = page.total_matches,
        shown = page.records.len(),
        page = state.criteria.page,
        "roster page loaded"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(page)?);
        return Ok(());
    }

    print!("{}", report::render_page(&state));
    if state.pagination_visible() {
        println!("Page {} of {}", state.criteria.page, state.total_pages());
    }
    if state.bulk_actions_visible() {
        println!("{} selected", state.selection.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::from_env()?;
    if cli.data.is_some() {
        config.data = cli.data.clone();
    }
    let records = load_roster(&config)?;
    let mut store = LogOnlyStore::new(roster::next_id(&records));

    match cli.command {
        Commands::List {
            filters,
            select,
            clear_selection,
            json,
        } => {
            list(records, &config, &filters, &select, clear_selection, json).await?;
        }
        Commands::Show { id } => {
            let teacher = find_teacher(&records, id)?;
            print!("{}", report::render_details(&teacher));
        }
        Commands::Create { fields } => {
            let (state, _) = RosterState::new(config.page_size).apply(RosterEvent::CreateFormOpened);
            let mut submission = state.form_prefill().unwrap_or_default();
            submission.extend(fields);

            match form::validate_new(&submission) {
                Ok(teacher) => {
                    let id = store.create(&teacher)?;
                    let (state, _) = state.apply(RosterEvent::FormClosed);
                    debug!(form_open = state.form.is_some(), "create form submitted");
                    println!("Would create teacher #{id}:");
                    print!("{}", report::render_details(&TeacherRecord::from_new(id, teacher)));
                }
                Err(errors) => {
                    print_validation_errors(&errors);
                    anyhow::bail!("teacher form has {} invalid field(s)", errors.errors.len());
                }
            }
        }
        Commands::Update { id, fields } => {
            let teacher = find_teacher(&records, id)?;
            let (state, _) = RosterState::new(config.page_size)
                .apply(RosterEvent::EditFormOpened(teacher.clone()));
            let mut submission: FormFields = state.form_prefill().unwrap_or_default();
            submission.extend(fields);

            match form::validate_update(&submission) {
                Ok(update) => {
                    store.update(id, &update)?;
                    let (state, _) = state.apply(RosterEvent::FormClosed);
                    debug!(form_open = state.form.is_some(), "edit form submitted");
                    let updated = update.apply(&teacher);
                    println!("Would update teacher #{id}:");
                    print!("{}", report::render_details(&updated));
                }
                Err(errors) => {
                    print_validation_errors(&errors);
                    anyhow::bail!("teacher form has {} invalid field(s)", errors.errors.len());
                }
            }
        }
        Commands::Delete { id, yes } => {
            let teacher = find_teacher(&records, id)?;
            let prompt = format!("Delete {}?", teacher.full_name());
            if delete_confirmed(&mut store, &[id], &prompt, yes, std::io::stdin().lock())? {
                println!("Would delete teacher #{id}.");
            } else {
                println!("Cancelled.");
            }
        }
        Commands::BulkDelete { ids, yes } => {
            let mut state = RosterState::new(config.page_size);
            for id in ids {
                if roster::find(&records, id).is_none() {
                    warn!(id, "skipping unknown teacher id");
                    continue;
                }
                state = state
                    .apply(RosterEvent::SelectionToggled { id, included: true })
                    .0;
            }
            anyhow::ensure!(state.bulk_actions_visible(), "no known teachers selected");

            let prompt = format!("Delete {} teacher(s)?", state.selection.len());
            let ids = state.selection.ids();
            if delete_confirmed(&mut store, &ids, &prompt, yes, std::io::stdin().lock())? {
                if let (_, Some(Effect::Delete(deleted))) = state.apply(RosterEvent::BulkDeleteConfirmed) {
                    println!("Would delete {} teacher(s).", deleted.len());
                }
            } else {
                println!("Cancelled.");
            }
        }
        Commands::Export {
            filters,
            format,
            out,
        } => {
            let criteria = criteria_for(&filters, &config);
            let matching: Vec<TeacherRecord> =
                query::filter_records(&records, &criteria).cloned().collect();
            match format {
                ExportFormat::Csv => roster::write_csv(&out, &matching)?,
                ExportFormat::Json => roster::write_json(&out, &matching)?,
            }
            info!(count = matching.len(), path = %out.display(), "exported roster");
            println!("Exported {} teachers to {}.", matching.len(), out.display());
        }
        Commands::Report { filters, out } => {
            let criteria = criteria_for(&filters, &config);
            let matching: Vec<&TeacherRecord> =
                query::filter_records(&records, &criteria).collect();
            let page = query::compute_page(&records, &criteria);
            let report = report::build_report(&criteria, &matching, &page);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
