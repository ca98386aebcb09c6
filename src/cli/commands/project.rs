//! `dit project` command - project (contract) management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{alias_label, index_ids, open_workspace, resolve_id};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::{Config, Store};
use crate::entities::Project;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a new project
    New(NewArgs),

    /// List projects
    List,

    /// Show a project's details
    Show(ShowArgs),

    /// Delete a project (rejected while bid items or reports reference it)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Contract number
    #[arg(long, short = 'c')]
    pub contract: String,

    #[arg(long)]
    pub project_manager: Option<String>,

    #[arg(long)]
    pub construction_manager: Option<String>,

    /// Contract duration in days
    #[arg(long)]
    pub contract_days: Option<u32>,

    /// Contract start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    #[arg(long)]
    pub prime_contractor: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project ID or alias (PRJ@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Project ID or alias (PRJ@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::New(args) => run_new(args, global),
        ProjectCommands::List => run_list(global),
        ProjectCommands::Show(args) => run_show(args, global),
        ProjectCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let config = Config::load();

    let mut project = Project::new(args.name, args.contract, config.author());
    project.project_manager = args.project_manager;
    project.construction_manager = args.construction_manager;
    project.contract_days = args.contract_days;
    project.contract_start_date = args.start_date;
    project.prime_contractor = args.prime_contractor;

    store.save_project(&project).into_diagnostic()?;
    let index = index_ids(&ws, [project.id.to_string()]);

    if !global.quiet {
        println!(
            "{} created project {} ({})",
            style("✓").green(),
            style(&project.name).bold(),
            alias_label(&index, &project.id)
        );
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    let mut projects = store.load_all::<Project>();
    projects.sort_by(|a, b| a.name.cmp(&b.name));

    match global.format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&projects).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&projects).into_diagnostic()?
            );
            return Ok(());
        }
        OutputFormat::Auto | OutputFormat::Table => {}
    }

    let index = index_ids(&ws, projects.iter().map(|p| p.id.to_string()));

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Contract", "Prime Contractor"]);
    for project in &projects {
        builder.push_record([
            alias_label(&index, &project.id),
            project.name.clone(),
            project.contract_number.clone(),
            project.prime_contractor.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", builder.build().with(Style::modern()));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Prj)?;
    let project: Project = store.load(&id).into_diagnostic()?;

    match global.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&project).into_diagnostic()?
        ),
        _ => print!("{}", serde_yml::to_string(&project).into_diagnostic()?),
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Prj)?;
    let project: Project = store.load(&id).into_diagnostic()?;

    if !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete project '{}'?", project.name))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.delete_project(&id).into_diagnostic()?;
    if !global.quiet {
        println!("{} deleted project {}", style("✓").green(), project.name);
    }
    Ok(())
}
