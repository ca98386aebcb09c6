//! `dit item` command - bid (pay) item management
//!
//! Includes the checklist "traffic cop": `dit item checklist` shows the
//! resolved question list (item override or spec default), and
//! `dit item questions` edits the override as newline-separated text.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{alias_label, index_ids, open_workspace, resolve_id, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::{Config, Store};
use crate::entities::bid_item::{questions_from_text, questions_to_text};
use crate::entities::{BidItem, Project, Report, SpecItem};

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Create a new bid item
    New(NewArgs),

    /// List bid items
    List(ListArgs),

    /// Show a bid item's details
    Show(ShowArgs),

    /// Delete a bid item (rejected while placed quantities reference it)
    Delete(DeleteArgs),

    /// Show or set the item's own checklist question override
    Questions(QuestionsArgs),

    /// Show the resolved checklist (override or spec default)
    Checklist(ChecklistArgs),

    /// Placed-quantity totals per item across all reports
    Summary,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Owning project ID or alias (PRJ@N)
    #[arg(long, short = 'p')]
    pub project: String,

    /// Linked spec item ID or alias (SPEC@N)
    #[arg(long, short = 's')]
    pub spec: String,

    /// Pay item code (unique within the project)
    #[arg(long, short = 'c')]
    pub code: String,

    /// Description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Unit of measure (e.g. "SY", "TON")
    #[arg(long, short = 'u')]
    pub unit: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by project ID or alias
    #[arg(long, short = 'p')]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Bid item ID or alias (ITEM@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Bid item ID or alias (ITEM@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct QuestionsArgs {
    /// Bid item ID or alias (ITEM@N)
    pub id: String,

    /// Replace the override with newline-separated question text
    #[arg(long, conflicts_with = "clear")]
    pub set: Option<String>,

    /// Clear the override so the spec default applies again
    #[arg(long)]
    pub clear: bool,
}

#[derive(clap::Args, Debug)]
pub struct ChecklistArgs {
    /// Bid item ID or alias (ITEM@N)
    pub id: String,
}

pub fn run(cmd: ItemCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ItemCommands::New(args) => run_new(args, global),
        ItemCommands::List(args) => run_list(args, global),
        ItemCommands::Show(args) => run_show(args, global),
        ItemCommands::Delete(args) => run_delete(args, global),
        ItemCommands::Questions(args) => run_questions(args, global),
        ItemCommands::Checklist(args) => run_checklist(args, global),
        ItemCommands::Summary => run_summary(global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    let project_id = resolve_id(&ws, &args.project, EntityPrefix::Prj)?;
    let spec_id = resolve_id(&ws, &args.spec, EntityPrefix::Spec)?;
    // Both references must exist
    store.load::<Project>(&project_id).into_diagnostic()?;
    store.load::<SpecItem>(&spec_id).into_diagnostic()?;

    let mut item = BidItem::new(
        project_id,
        spec_id,
        args.code,
        args.description,
        Config::load().author(),
    );
    item.unit = args.unit;

    store.save_bid_item(&item).into_diagnostic()?;
    let index = index_ids(&ws, [item.id.to_string()]);

    if !global.quiet {
        println!(
            "{} created bid item {} ({})",
            style("✓").green(),
            style(&item.code).bold(),
            alias_label(&index, &item.id)
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    let mut items = store.load_all::<BidItem>();
    if let Some(project) = &args.project {
        let project_id = resolve_id(&ws, project, EntityPrefix::Prj)?;
        items.retain(|i| i.project == project_id);
    }
    items.sort_by(|a, b| a.code.cmp(&b.code));
    let index = index_ids(&ws, items.iter().map(|i| i.id.to_string()));

    let mut builder = Builder::default();
    builder.push_record(["ID", "Code", "Description", "Unit"]);
    for item in &items {
        builder.push_record([
            alias_label(&index, &item.id),
            item.code.clone(),
            truncate_str(&item.description, 40),
            item.unit.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", builder.build().with(Style::modern()));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Item)?;
    let item: BidItem = store.load(&id).into_diagnostic()?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&item).into_diagnostic()?)
        }
        _ => print!("{}", serde_yml::to_string(&item).into_diagnostic()?),
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Item)?;
    let item: BidItem = store.load(&id).into_diagnostic()?;

    if !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete bid item '{}'?", item.code))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.delete_bid_item(&id).into_diagnostic()?;
    if !global.quiet {
        println!("{} deleted bid item {}", style("✓").green(), item.code);
    }
    Ok(())
}

fn run_questions(args: QuestionsArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Item)?;
    let mut item: BidItem = store.load(&id).into_diagnostic()?;

    if args.clear {
        item.checklist_questions.clear();
        store.save_bid_item(&item).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} cleared question override for {}",
                style("✓").green(),
                item.code
            );
        }
        return Ok(());
    }

    if let Some(text) = args.set {
        item.checklist_questions = questions_from_text(&text);
        store.save_bid_item(&item).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} set {} question(s) on {}",
                style("✓").green(),
                item.checklist_questions.len(),
                item.code
            );
        }
        return Ok(());
    }

    print!("{}", questions_to_text(&item.checklist_questions));
    if !item.checklist_questions.is_empty() {
        println!();
    }
    Ok(())
}

fn run_checklist(args: ChecklistArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Item)?;
    let item: BidItem = store.load(&id).into_diagnostic()?;
    let spec = store.load::<SpecItem>(&item.spec_item).ok();

    let questions = item.active_questions(spec.as_ref());
    if questions.is_empty() {
        println!("No checklist questions for {}", item.code);
        return Ok(());
    }
    for (n, question) in questions.iter().enumerate() {
        println!("{:>3}. {}", n + 1, question);
    }
    Ok(())
}

fn run_summary(global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    let mut items = store.load_all::<BidItem>();
    items.sort_by(|a, b| a.code.cmp(&b.code));

    // Sum placed quantities per bid item across every report
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for report in store.load_all::<Report>() {
        for quantity in &report.placed_quantities {
            if let Some(item) = &quantity.bid_item {
                *totals.entry(item.to_string()).or_insert(0.0) += quantity.quantity;
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(["Code", "Description", "Unit", "Total Placed"]);
    for item in &items {
        let total = totals.get(&item.id.to_string()).copied().unwrap_or(0.0);
        builder.push_record([
            item.code.clone(),
            truncate_str(&item.description, 40),
            item.unit.clone().unwrap_or_default(),
            total.to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::modern()));
    Ok(())
}
