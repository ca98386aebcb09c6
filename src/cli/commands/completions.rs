//! `dit completions` - generate shell completion scripts

use clap::{Args, CommandFactory};
use clap_complete::Shell;
use miette::Result;

use crate::cli::Cli;

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "dit", &mut std::io::stdout());
    Ok(())
}
