//! News Board command line
//!
//! Drives the board over a JSON snapshot of the content store:
//! - `board` prints the four columns
//! - `move`, `publish`, `unpublish`, `rate` change one item and write the
//!   snapshot back; `move --dry-run` only prints the resulting columns
//! - `plan` starts an editorial planning run

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use newsboard_board::{BoardConfig, Column, NewsBoard, TransitionOutcome};
use newsboard_core::{ItemId, PriorityRating, WorkflowStage};
use newsboard_store::{MemoryStore, PersistOutcome};
use newsboard_trigger::JobTrigger;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Default snapshot file
pub const DEFAULT_DATA_FILE: &str = "newsboard.json";

/// Command-line definition
#[must_use]
pub fn command() -> Command {
    Command::new("newsboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Editorial workflow board")
        .subcommand_required(true)
        .arg(
            Arg::new("data")
                .long("data")
                .short('d')
                .global(true)
                .default_value(DEFAULT_DATA_FILE)
                .value_parser(value_parser!(PathBuf))
                .help("Content snapshot file"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("board").about("Show the board columns").arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Output as JSON"),
            ),
        )
        .subcommand(
            Command::new("move")
                .about("Move an item to a stage")
                .arg(id_arg())
                .arg(
                    Arg::new("stage")
                        .required(true)
                        .help("idea, writing, draft or published"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the columns after the move without saving"),
                ),
        )
        .subcommand(
            Command::new("publish")
                .about("Publish a draft")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("unpublish")
                .about("Withdraw a published item to drafts")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("rate")
                .about("Set an item's priority rating")
                .arg(id_arg())
                .arg(Arg::new("rating").required(true).help("HC, 1, 2, 3 or 4")),
        )
        .subcommand(Command::new("plan").about("Start an editorial planning run"))
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Item id, e.g. drafts.a1")
}

/// Requested command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Board { json: bool },
    Move {
        id: ItemId,
        stage: WorkflowStage,
        dry_run: bool,
    },
    Publish { id: ItemId },
    Unpublish { id: ItemId },
    Rate { id: ItemId, rating: PriorityRating },
    Plan,
}

impl Action {
    /// Check if the command changes stored content
    #[must_use]
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Action::Board { .. } | Action::Plan | Action::Move { dry_run: true, .. }
        )
    }
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub data: PathBuf,
    pub config: Option<PathBuf>,
    pub log_json: bool,
    pub action: Action,
}

impl Invocation {
    /// Build from parsed matches
    ///
    /// # Errors
    /// Unknown stage or rating values
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let (name, sub) = matches
            .subcommand()
            .context("a subcommand is required")?;

        let action = match name {
            "board" => Action::Board {
                json: sub.get_flag("json"),
            },
            "move" => Action::Move {
                id: required_id(sub)?,
                stage: required(sub, "stage")?.parse()?,
                dry_run: sub.get_flag("dry-run"),
            },
            "publish" => Action::Publish {
                id: required_id(sub)?,
            },
            "unpublish" => Action::Unpublish {
                id: required_id(sub)?,
            },
            "rate" => Action::Rate {
                id: required_id(sub)?,
                rating: required(sub, "rating")?.parse()?,
            },
            "plan" => Action::Plan,
            other => anyhow::bail!("unknown command {other}"),
        };

        Ok(Self {
            data: sub
                .get_one::<PathBuf>("data")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            config: sub.get_one::<PathBuf>("config").cloned(),
            log_json: sub.get_flag("log-json"),
            action,
        })
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing <{name}>"))
}

fn required_id(matches: &ArgMatches) -> Result<ItemId> {
    required(matches, "id").map(ItemId::from)
}

/// Board configuration for an invocation
///
/// # Errors
/// The configuration file cannot be read or parsed
pub fn load_config(invocation: &Invocation) -> Result<BoardConfig> {
    match &invocation.config {
        Some(path) => Ok(BoardConfig::load(path)?),
        None => Ok(BoardConfig::from_env()),
    }
}

/// Install the global tracing subscriber, logging to stderr
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute one command, writing its report to `out`
///
/// # Errors
/// Snapshot I/O failures and any board operation failure
pub async fn run<W: Write>(
    invocation: &Invocation,
    config: &BoardConfig,
    trigger: Arc<dyn JobTrigger>,
    out: &mut W,
) -> Result<()> {
    if invocation.action == Action::Plan {
        let board = NewsBoard::new(Arc::new(MemoryStore::new()), trigger, config);
        let ack = board.trigger_planning().await?;
        match ack.message {
            Some(message) => writeln!(out, "planning started: {message}")?,
            None => writeln!(out, "planning started")?,
        }
        return Ok(());
    }

    let data = &invocation.data;
    let store = Arc::new(
        MemoryStore::load_snapshot(data)
            .with_context(|| format!("failed to load snapshot {}", data.display()))?,
    );
    let board = NewsBoard::new(store.clone(), trigger, config);
    board.load().await?;

    match &invocation.action {
        Action::Board { json: true } => {
            writeln!(out, "{}", serde_json::to_string_pretty(&columns_json(&board.columns())?)?)?;
        }
        Action::Board { json: false } => write!(out, "{}", render_columns(&board.columns()))?,
        Action::Move {
            id,
            stage,
            dry_run: true,
        } => write!(out, "{}", render_columns(&board.preview_move(id, *stage)?))?,
        Action::Move { id, stage, .. } => {
            let outcome = board.move_item(id, *stage).await?;
            report_transition(out, id, &outcome)?;
        }
        Action::Publish { id } => {
            let outcome = board.publish(id).await?;
            report_persist(out, "published", &outcome)?;
        }
        Action::Unpublish { id } => {
            let outcome = board.unpublish(id).await?;
            report_persist(out, "unpublished", &outcome)?;
        }
        Action::Rate { id, rating } => {
            let record = board.set_priority_rating(id, *rating).await?;
            writeln!(out, "rated {} {}", record.id, rating.label())?;
        }
        Action::Plan => {}
    }

    if invocation.action.mutates() {
        store
            .save_snapshot(data)
            .with_context(|| format!("failed to save snapshot {}", data.display()))?;
        tracing::debug!(path = %data.display(), "snapshot saved");
    }
    Ok(())
}

/// Plain-text board
#[must_use]
pub fn render_columns(columns: &[Column]) -> String {
    let mut text = String::new();
    for column in columns {
        text.push_str(&format!("{} ({})\n", column.title(), column.count()));
        for item in &column.items {
            let rating = item
                .priority_rating
                .map(|r| format!(" [{}]", r.label()))
                .unwrap_or_default();
            let flag = if item.backend_succeeded { " *" } else { "" };
            text.push_str(&format!("  {}  {}{rating}{flag}\n", item.id, item.title));
        }
    }
    text
}

fn columns_json(columns: &[Column]) -> Result<serde_json::Value> {
    let columns = columns
        .iter()
        .map(|column| {
            let items = serde_json::to_value(&column.items)?;
            Ok(json!({
                "stage": column.stage,
                "title": column.title(),
                "color": column.stage.color(),
                "count": column.count(),
                "items": items,
            }))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({ "columns": columns }))
}

fn report_transition<W: Write>(out: &mut W, id: &ItemId, outcome: &TransitionOutcome) -> Result<()> {
    match outcome {
        TransitionOutcome::Committed {
            stage,
            path,
            job,
            lingering,
            ..
        } => {
            writeln!(out, "moved {id} to {stage} ({path})")?;
            if job.is_some() {
                writeln!(out, "writing job started")?;
            }
            if let Some(old) = lingering {
                writeln!(out, "warning: old copy {old} was not removed")?;
            }
        }
        TransitionOutcome::Unchanged => writeln!(out, "{id} is already there")?,
        TransitionOutcome::Cancelled => writeln!(out, "cancelled")?,
    }
    Ok(())
}

fn report_persist<W: Write>(out: &mut W, verb: &str, outcome: &PersistOutcome) -> Result<()> {
    writeln!(out, "{verb} as {}", outcome.record.id)?;
    if let Some(old) = &outcome.lingering {
        writeln!(out, "warning: old copy {old} was not removed")?;
    }
    Ok(())
}
