//! `dit init` - create a workspace skeleton

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::core::Workspace;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    pub path: Option<PathBuf>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&path).into_diagnostic()?;
    let ws = Workspace::init(&path).into_diagnostic()?;

    println!(
        "{} initialized DIT workspace at {}",
        style("✓").green(),
        ws.root().display()
    );
    println!("Next steps:");
    println!("  dit team init            # set up the team roster");
    println!("  dit project new --name ... --contract ...");
    Ok(())
}
