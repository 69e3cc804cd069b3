//! Array field commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use folio::RecordService;

use super::{parse_collection, parse_id, parse_value};
use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct ArrayCommand {
    #[command(subcommand)]
    pub command: ArraySubcommand,
}

/// Which record and field to edit.
#[derive(Args, Debug)]
pub struct Target {
    /// Collection name
    pub collection: String,

    /// Record id
    pub id: String,

    /// Array field name
    pub field: String,
}

#[derive(Subcommand, Debug)]
pub enum ArraySubcommand {
    /// Append an item (JSON, or a bare string)
    Add {
        #[command(flatten)]
        target: Target,
        item: String,
    },

    /// Remove the item at an index
    Remove {
        #[command(flatten)]
        target: Target,
        index: usize,
    },

    /// Replace the item at an index
    Set {
        #[command(flatten)]
        target: Target,
        index: usize,
        item: String,
    },
}

pub async fn run(cmd: ArrayCommand, service: RecordService<CliStore>) -> Result<()> {
    match cmd.command {
        ArraySubcommand::Add { target, item } => {
            let (collection, id) = (parse_collection(&target.collection)?, parse_id(&target.id)?);
            service
                .add_to_array(&collection, &id, &target.field, parse_value(&item))
                .await
                .context("Failed to add item")?;
        }
        ArraySubcommand::Remove { target, index } => {
            let (collection, id) = (parse_collection(&target.collection)?, parse_id(&target.id)?);
            service
                .remove_from_array(&collection, &id, &target.field, index)
                .await
                .context("Failed to remove item")?;
        }
        ArraySubcommand::Set {
            target,
            index,
            item,
        } => {
            let (collection, id) = (parse_collection(&target.collection)?, parse_id(&target.id)?);
            service
                .update_array_item(&collection, &id, &target.field, index, parse_value(&item))
                .await
                .context("Failed to replace item")?;
        }
    }

    output::success("Array updated");
    Ok(())
}
