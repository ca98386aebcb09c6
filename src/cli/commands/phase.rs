//! `dit phase` command - construction phase management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{alias_label, index_ids, open_workspace, resolve_id};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::{Config, Store};
use crate::entities::Phase;

#[derive(Subcommand, Debug)]
pub enum PhaseCommands {
    /// Create a new phase
    New(NewArgs),

    /// List phases
    List,

    /// Delete a phase (rejected while reports reference it)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Phase name (unique)
    #[arg(long, short = 'n')]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Phase ID or alias (PHS@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: PhaseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PhaseCommands::New(args) => run_new(args, global),
        PhaseCommands::List => run_list(global),
        PhaseCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    // Phase names are unique across the workspace
    let duplicate = store
        .load_all::<Phase>()
        .iter()
        .any(|p| p.name.trim() == args.name.trim());
    if duplicate {
        miette::bail!("phase '{}' already exists", args.name);
    }

    let phase = Phase::new(args.name, Config::load().author());
    store.save_phase(&phase).into_diagnostic()?;
    let index = index_ids(&ws, [phase.id.to_string()]);

    if !global.quiet {
        println!(
            "{} created phase {} ({})",
            style("✓").green(),
            style(&phase.name).bold(),
            alias_label(&index, &phase.id)
        );
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    let mut phases = store.load_all::<Phase>();
    phases.sort_by(|a, b| a.name.cmp(&b.name));
    let index = index_ids(&ws, phases.iter().map(|p| p.id.to_string()));

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name"]);
    for phase in &phases {
        builder.push_record([alias_label(&index, &phase.id), phase.name.clone()]);
    }
    println!("{}", builder.build().with(Style::modern()));
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Phs)?;
    let phase: Phase = store.load(&id).into_diagnostic()?;

    if !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete phase '{}'?", phase.name))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.delete_phase(&id).into_diagnostic()?;
    if !global.quiet {
        println!("{} deleted phase {}", style("✓").green(), phase.name);
    }
    Ok(())
}
