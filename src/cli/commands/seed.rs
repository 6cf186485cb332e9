use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::open_store;
use crate::fixtures::{self, Fixtures};

#[derive(Args)]
pub struct SeedArgs {
    #[arg(long, help = "Fixture YAML file (defaults to the built-in sample organisation)")]
    pub file: Option<PathBuf>,
    #[arg(long, help = "Keep existing records instead of clearing every collection first")]
    pub keep: bool,
}

pub async fn handle(args: SeedArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let fixtures = match &args.file {
        Some(path) => Fixtures::load(path)?,
        None => Fixtures::builtin()?,
    };

    let store = open_store(&config.database).await.context("opening store")?;
    let report = fixtures::seed(store, &fixtures, !args.keep).await?;

    for name in &report.unresolved {
        eprintln!("warning: unresolved reference {}", name);
    }
    output_success(
        &output_format,
        &format!(
            "Seeded {} areas, {} managers, {} departments, {} employees",
            report.areas, report.managers, report.departments, report.employees
        ),
        Some(serde_json::to_value(&report)?),
    )
}
