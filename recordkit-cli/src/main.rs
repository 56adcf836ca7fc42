//! recordkit command-line edit panel
//!
//! Loads a panel file (entity type, field list, config and an entity graph)
//! and runs one edit-panel operation against it:
//! 1. `edit` prints the edit form with every field's current value
//! 2. `update` applies submitted data and prints the updated entry
//!
//! Usage:
//!   recordkit --panel article.json edit 1
//!   recordkit --panel article.json update 1 --data '{"title":"New"}'
//!
//! The graph lives in memory only; updates are not written back to the file.

use std::path::PathBuf;
use anyhow::Result;
use clap::{Parser, Subcommand};
use recordkit_cli::{parse_data, parse_key, PanelFile, Session};
use recordkit_model::FixedEntry;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "recordkit")]
#[command(about = "Edit panel over a recordkit entity graph")]
struct Args {
    /// Path to the panel file
    #[arg(short, long)]
    panel: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the edit form with current values
    Edit {
        /// Entry key; falls back to the panel's current entry
        id: Option<String>,

        /// Current entry key used when no id is given
        #[arg(long)]
        current: Option<String>,
    },
    /// Apply submitted form data to an entry
    Update {
        /// Entry key
        id: String,

        /// Submitted data as a JSON object
        #[arg(short, long)]
        data: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let file = PanelFile::from_path(&args.panel)?;
    info!("Loaded panel for '{}' from {:?}", file.entity_type, args.panel);
    let mut session = Session::open(file)?;

    let output = match args.command {
        Command::Edit { id: Some(id), .. } => session.edit(&parse_key(&id))?,
        Command::Edit { id: None, current } => {
            if let Some(current) = current {
                debug!("Using current entry {}", current);
                session.panel = session
                    .panel
                    .with_request_context(Arc::new(FixedEntry(parse_key(&current))));
            }
            let fields = session.panel.get_update_fields(None)?;
            serde_json::to_value(&fields)?
        }
        Command::Update { id, data } => session.update(&parse_key(&id), parse_data(&data)?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
