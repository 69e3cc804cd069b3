//! Search command implementation.

use anyhow::{Context, Result};
use clap::Args;

use folio::{QuerySpec, RecordService};

use super::parse_collection;
use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Collection name
    pub collection: String,

    /// String field to search
    pub field: String,

    /// Case-sensitive prefix to match
    pub term: String,

    /// Maximum number of records to return
    #[arg(long)]
    pub limit: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: SearchArgs, service: RecordService<CliStore>) -> Result<()> {
    let collection = parse_collection(&args.collection)?;

    let mut options = QuerySpec::new();
    if let Some(limit) = args.limit {
        options = options.limit(limit);
    }

    let records = service
        .search_by_field(&collection, &args.field, &args.term, options)
        .await
        .context("Search failed")?;

    if records.is_empty() {
        output::note("No matches.");
        return Ok(());
    }

    output::records(&records, args.pretty)
}
