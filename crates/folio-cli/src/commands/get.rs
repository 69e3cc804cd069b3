//! Get command implementation.

use anyhow::{Context, Result};
use clap::Args;

use folio::RecordService;

use super::{parse_collection, parse_id};
use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Collection name
    pub collection: String,

    /// Record id
    pub id: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: GetArgs, service: RecordService<CliStore>) -> Result<()> {
    let collection = parse_collection(&args.collection)?;
    let id = parse_id(&args.id)?;

    let record = service
        .read(&collection, &id)
        .await
        .context("Failed to get record")?
        .with_context(|| format!("No record {}/{}", collection, id))?;

    if args.pretty {
        output::json_pretty(&record)
    } else {
        output::json(&record)
    }
}
