//! Page command implementation.

use anyhow::{Context, Result};
use clap::Args;

use folio::{Cursor, DEFAULT_PAGE_SIZE, RecordService};

use super::{build_query, parse_collection};
use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct PageArgs {
    /// Collection name
    pub collection: String,

    /// Records per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Cursor printed by the previous page
    #[arg(long)]
    pub cursor: Option<String>,

    /// Filter as field:op:value (repeatable)
    #[arg(long = "where", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Field to sort by
    #[arg(long)]
    pub order_by: Option<String>,

    /// Sort descending
    #[arg(long, requires = "order_by")]
    pub desc: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: PageArgs, service: RecordService<CliStore>) -> Result<()> {
    let collection = parse_collection(&args.collection)?;
    let query = build_query(&args.filters, args.order_by.as_deref(), args.desc, None)?;
    let cursor = args
        .cursor
        .as_deref()
        .map(Cursor::decode)
        .transpose()
        .context("Invalid cursor")?;

    let page = service
        .paginate(&collection, args.page_size, cursor, query)
        .await
        .context("Failed to fetch page")?;

    output::records(&page.data, args.pretty)?;

    if page.has_more {
        if let Some(cursor) = &page.next_cursor {
            eprintln!();
            output::note(&format!("Next cursor: {}", cursor.encode()?));
        }
    } else {
        output::note("No more records.");
    }

    Ok(())
}
