//! Subcommand implementations.

mod array;
mod create;
mod delete;
mod get;
mod list;
mod page;
mod search;
mod seed;
mod update;
mod watch;

use std::io::Read;

use anyhow::{Context, Result, bail};
use clap::Subcommand;

use folio::{CollectionName, Direction, DocumentId, Fields, Filter, FilterOp, QuerySpec, Value};

use crate::store::CliStore;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a single record
    Get(get::GetArgs),

    /// Query records in a collection
    List(list::ListArgs),

    /// Fetch one page of records
    Page(page::PageArgs),

    /// Prefix search on a string field
    Search(search::SearchArgs),

    /// Create a record from JSON
    Create(create::CreateArgs),

    /// Merge JSON fields into a record
    Update(update::UpdateArgs),

    /// Delete a record
    Delete(delete::DeleteArgs),

    /// Edit an array field
    Array(array::ArrayCommand),

    /// Write the sample case studies
    Seed(seed::SeedArgs),

    /// Print a collection or record every time it changes
    Watch(watch::WatchArgs),
}

pub async fn handle(cmd: Commands, store: CliStore) -> Result<()> {
    let service = folio::RecordService::new(store);

    match cmd {
        Commands::Get(args) => get::run(args, service).await,
        Commands::List(args) => list::run(args, service).await,
        Commands::Page(args) => page::run(args, service).await,
        Commands::Search(args) => search::run(args, service).await,
        Commands::Create(args) => create::run(args, service).await,
        Commands::Update(args) => update::run(args, service).await,
        Commands::Delete(args) => delete::run(args, service).await,
        Commands::Array(cmd) => array::run(cmd, service).await,
        Commands::Seed(args) => seed::run(args, service).await,
        Commands::Watch(args) => watch::run(args, service).await,
    }
}

pub(crate) fn parse_collection(name: &str) -> Result<CollectionName> {
    CollectionName::new(name).with_context(|| format!("Invalid collection name '{}'", name))
}

pub(crate) fn parse_id(id: &str) -> Result<DocumentId> {
    DocumentId::new(id).with_context(|| format!("Invalid document id '{}'", id))
}

/// Parse a JSON literal, falling back to a bare string.
pub(crate) fn parse_value(text: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(text)
        .map(Value::from_json)
        .unwrap_or_else(|_| Value::from(text))
}

/// Parse `field:op:value`, e.g. `hidden:==:false`.
pub(crate) fn parse_where(text: &str) -> Result<Filter> {
    let mut parts = text.splitn(3, ':');
    let (Some(field), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("Invalid filter '{}': expected field:op:value", text);
    };

    let op: FilterOp = op
        .parse()
        .with_context(|| format!("Invalid filter '{}'", text))?;
    Ok(Filter::new(field, op, parse_value(value)))
}

/// Build a query from the shared `--where`, `--order-by`, `--desc` and `--limit` flags.
pub(crate) fn build_query(
    filters: &[String],
    order_by: Option<&str>,
    descending: bool,
    limit: Option<usize>,
) -> Result<QuerySpec> {
    let filters = filters
        .iter()
        .map(|f| parse_where(f))
        .collect::<Result<Vec<_>>>()?;

    let mut query = QuerySpec::new().with_filters(filters);
    if let Some(field) = order_by {
        let direction = if descending {
            Direction::Descending
        } else {
            Direction::Ascending
        };
        query = query.order_by(field, direction);
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    Ok(query)
}

/// Read a JSON object from a file, or stdin when `source` is `-`.
pub(crate) fn read_fields(source: &str) -> Result<Fields> {
    let text = if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        text
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    let json: serde_json::Value = serde_json::from_str(&text).context("Invalid JSON")?;
    folio_core::to_fields(&json).context("Record must be a JSON object")
}
