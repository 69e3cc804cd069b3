//! Delete command implementation.

use anyhow::{Context, Result};
use clap::Args;

use folio::RecordService;

use super::{parse_collection, parse_id};
use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Collection name
    pub collection: String,

    /// Record id
    pub id: String,
}

pub async fn run(args: DeleteArgs, service: RecordService<CliStore>) -> Result<()> {
    let collection = parse_collection(&args.collection)?;
    let id = parse_id(&args.id)?;

    service
        .delete(&collection, &id)
        .await
        .context("Failed to delete record")?;

    output::success(&format!("Deleted {}/{}", collection, id));
    Ok(())
}
