//! `dit spec` command - specification item management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{alias_label, index_ids, open_workspace, resolve_id, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::{Config, Store};
use crate::entities::SpecItem;

#[derive(Subcommand, Debug)]
pub enum SpecCommands {
    /// Create a new spec item
    New(NewArgs),

    /// List spec items
    List(ListArgs),

    /// Show a spec item's details
    Show(ShowArgs),

    /// Delete a spec item (rejected while bid items reference it)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Specification code (unique, e.g. "P-401")
    #[arg(long, short = 'c')]
    pub code: String,

    /// Description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Division or category label
    #[arg(long)]
    pub division: Option<String>,

    /// Default checklist question (repeatable, in order)
    #[arg(long = "question", short = 'Q')]
    pub questions: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by division label
    #[arg(long)]
    pub division: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Spec item ID or alias (SPEC@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Spec item ID or alias (SPEC@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: SpecCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SpecCommands::New(args) => run_new(args, global),
        SpecCommands::List(args) => run_list(args, global),
        SpecCommands::Show(args) => run_show(args, global),
        SpecCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    let mut spec = SpecItem::new(args.code, args.description, Config::load().author());
    spec.division = args.division;
    spec.checklist_questions = args.questions;

    store.save_spec_item(&spec).into_diagnostic()?;
    let index = index_ids(&ws, [spec.id.to_string()]);

    if !global.quiet {
        println!(
            "{} created spec item {} ({})",
            style("✓").green(),
            style(&spec.code).bold(),
            alias_label(&index, &spec.id)
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    let mut specs = store.load_all::<SpecItem>();
    if let Some(division) = &args.division {
        specs.retain(|s| s.division.as_deref() == Some(division.as_str()));
    }
    specs.sort_by(|a, b| a.code.cmp(&b.code));
    let index = index_ids(&ws, specs.iter().map(|s| s.id.to_string()));

    let mut builder = Builder::default();
    builder.push_record(["ID", "Code", "Description", "Division", "Questions"]);
    for spec in &specs {
        builder.push_record([
            alias_label(&index, &spec.id),
            spec.code.clone(),
            truncate_str(&spec.description, 40),
            spec.division.clone().unwrap_or_default(),
            spec.checklist_questions.len().to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::modern()));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Spec)?;
    let spec: SpecItem = store.load(&id).into_diagnostic()?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&spec).into_diagnostic()?)
        }
        _ => print!("{}", serde_yml::to_string(&spec).into_diagnostic()?),
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Spec)?;
    let spec: SpecItem = store.load(&id).into_diagnostic()?;

    if !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete spec item '{}'?", spec.code))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.delete_spec_item(&id).into_diagnostic()?;
    if !global.quiet {
        println!("{} deleted spec item {}", style("✓").green(), spec.code);
    }
    Ok(())
}
