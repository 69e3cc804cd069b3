//! Watch command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use folio::{LiveCollection, LiveDocument, RecordService};

use super::{build_query, parse_collection, parse_id};
use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Collection name
    pub collection: String,

    /// Watch a single record instead of the collection
    #[arg(long)]
    pub id: Option<String>,

    /// Filter as field:op:value (repeatable)
    #[arg(long = "where", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Field to sort by
    #[arg(long)]
    pub order_by: Option<String>,

    /// Sort descending
    #[arg(long, requires = "order_by")]
    pub desc: bool,

    /// Maximum number of records per snapshot
    #[arg(long)]
    pub limit: Option<usize>,

    /// Stop after this many snapshots
    #[arg(long)]
    pub count: Option<usize>,
}

pub async fn run(args: WatchArgs, service: RecordService<CliStore>) -> Result<()> {
    let collection = parse_collection(&args.collection)?;

    output::note("Watching for changes...");
    output::note("Press Ctrl+C to stop.");

    let mut seen = 0;
    let done = |seen: usize| args.count.is_some_and(|count| seen >= count);

    match &args.id {
        Some(id) => {
            let id = parse_id(id)?;
            let mut live = LiveDocument::subscribe(&service, collection, id)
                .context("Failed to start subscription")?;

            while let Some(state) = live.changed().await {
                if let Some(error) = &state.error {
                    eprintln!("{} {}", "ERROR".red(), error);
                } else if state.loading {
                    continue;
                } else {
                    match &state.data {
                        Some(record) => output::json(record)?,
                        None => println!("null"),
                    }
                }
                seen += 1;
                if done(seen) {
                    break;
                }
            }
        }
        None => {
            let query = build_query(&args.filters, args.order_by.as_deref(), args.desc, args.limit)?;
            let mut live = LiveCollection::subscribe(&service, collection, query)
                .context("Failed to start subscription")?;

            while let Some(state) = live.changed().await {
                if let Some(error) = &state.error {
                    eprintln!("{} {}", "ERROR".red(), error);
                } else if state.loading {
                    continue;
                } else {
                    output::json(&state.data)?;
                }
                seen += 1;
                if done(seen) {
                    break;
                }
            }
        }
    }

    Ok(())
}
