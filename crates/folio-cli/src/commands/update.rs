//! Update command implementation.

use anyhow::{Context, Result};
use clap::Args;

use folio::RecordService;

use super::{parse_collection, parse_id, read_fields};
use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Collection name
    pub collection: String,

    /// Record id
    pub id: String,

    /// JSON file holding the fields to merge, or `-` for stdin
    #[arg(long)]
    pub json: String,
}

pub async fn run(args: UpdateArgs, service: RecordService<CliStore>) -> Result<()> {
    let collection = parse_collection(&args.collection)?;
    let id = parse_id(&args.id)?;
    let fields = read_fields(&args.json)?;

    service
        .update(&collection, &id, fields)
        .await
        .context("Failed to update record")?;

    output::success(&format!("Updated {}/{}", collection, id));
    Ok(())
}
