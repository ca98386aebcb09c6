//! `dit export` - populate the Word template from a report

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{open_workspace, resolve_id};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::Store;
use crate::export::docx;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,

    /// Output path (default: suggested filename in the current directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Dir)?;
    let aggregate = store.load_report_aggregate(&id).into_diagnostic()?;

    let exported = docx::export(&aggregate, Some(&ws)).into_diagnostic()?;
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&exported.filename));
    std::fs::write(&path, &exported.bytes).into_diagnostic()?;

    if !global.quiet {
        println!("{} wrote {}", style("✓").green(), path.display());
    }
    Ok(())
}
