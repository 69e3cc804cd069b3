//! List command implementation.

use anyhow::{Context, Result};
use clap::Args;

use folio::RecordService;

use super::{build_query, parse_collection};
use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Collection name
    pub collection: String,

    /// Filter as field:op:value (repeatable), e.g. hidden:==:false
    #[arg(long = "where", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Field to sort by
    #[arg(long)]
    pub order_by: Option<String>,

    /// Sort descending
    #[arg(long, requires = "order_by")]
    pub desc: bool,

    /// Maximum number of records to return
    #[arg(long)]
    pub limit: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: ListArgs, service: RecordService<CliStore>) -> Result<()> {
    let collection = parse_collection(&args.collection)?;
    let query = build_query(&args.filters, args.order_by.as_deref(), args.desc, args.limit)?;

    let records = service
        .query(&collection, &query)
        .await
        .context("Failed to list records")?;

    if records.is_empty() {
        output::note("No records found.");
        return Ok(());
    }

    output::records(&records, args.pretty)
}
