//! Seed command implementation.

use anyhow::{Context, Result};
use clap::Args;

use folio::{RecordService, Seeder};

use crate::output;
use crate::store::CliStore;

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Only seed the Bravado Health case study
    #[arg(long)]
    pub bravado_health: bool,
}

pub async fn run(args: SeedArgs, service: RecordService<CliStore>) -> Result<()> {
    let seeder = Seeder::new(service);

    let ids = if args.bravado_health {
        vec![
            seeder
                .seed_bravado_health()
                .await
                .context("Failed to seed Bravado Health")?,
        ]
    } else {
        seeder.seed_all().await.context("Failed to seed case studies")?
    };

    output::success(&format!("Seeded {} case studies", ids.len()));
    for id in &ids {
        output::field("ID", id.as_str());
    }
    Ok(())
}
