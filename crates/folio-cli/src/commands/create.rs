//! Create command implementation.

use anyhow::{Context, Result};
use clap::Args;

use folio::RecordService;

use super::{parse_collection, parse_id, read_fields};
use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Collection name
    pub collection: String,

    /// JSON file holding the record, or `-` for stdin
    #[arg(long)]
    pub json: String,

    /// Use this id instead of a generated one (replaces any existing record)
    #[arg(long)]
    pub id: Option<String>,
}

pub async fn run(args: CreateArgs, service: RecordService<CliStore>) -> Result<()> {
    let collection = parse_collection(&args.collection)?;
    let fields = read_fields(&args.json)?;

    let id = match &args.id {
        Some(id) => {
            let id = parse_id(id)?;
            service
                .create_with_id(&collection, &id, fields)
                .await
                .context("Failed to create record")?;
            id
        }
        None => service
            .create(&collection, fields)
            .await
            .context("Failed to create record")?,
    };

    output::success("Record created");
    output::field("ID", id.as_str());
    Ok(())
}
