//! `dit checklist` command - per-report spec checklists
//!
//! `save` speaks the JSON contract used by form clients: a success or
//! error envelope on stdout.

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::helpers::{open_workspace, resolve_id};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::Store;
use crate::entities::{BidItem, Report, SpecItem};

#[derive(Subcommand, Debug)]
pub enum ChecklistCommands {
    /// Save checklist answers for a spec item on a report
    Save(SaveArgs),

    /// Show a report's checklists with recorded answers
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct SaveArgs {
    /// Report ID or alias (DIR@N)
    #[arg(long, short = 'r')]
    pub report: String,

    /// Spec item ID or alias (SPEC@N)
    #[arg(long, short = 's')]
    pub spec: String,

    /// Answers as a JSON object, e.g. '{"Q1":"Yes"}'
    #[arg(long, short = 'a')]
    pub answers: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Report ID or alias (DIR@N)
    pub report: String,
}

pub fn run(cmd: ChecklistCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ChecklistCommands::Save(args) => run_save(args, global),
        ChecklistCommands::Show(args) => run_show(args, global),
    }
}

fn fail(message: String) -> ! {
    println!(
        "{}",
        json!({ "status": "error", "message": message })
    );
    std::process::exit(1);
}

fn run_save(args: SaveArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    let report_id = resolve_id(&ws, &args.report, EntityPrefix::Dir)?;
    let spec_id = resolve_id(&ws, &args.spec, EntityPrefix::Spec)?;
    let mut report: Report = store.load(&report_id).into_diagnostic()?;
    let spec: SpecItem = store.load(&spec_id).into_diagnostic()?;

    let answers: serde_json::Value = match serde_json::from_str(&args.answers) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        Ok(_) => fail("answers must be a JSON object".to_string()),
        Err(e) => fail(format!("answers are not valid JSON: {}", e)),
    };

    // Find-or-create the embedded entry, then run the save pipeline
    let entry = report.checklist_entry_mut(&spec_id);
    entry.checklist_answers = answers;
    let entry_id = entry.id.clone();

    if let Err(e) = store.save_report(&mut report) {
        fail(e.to_string());
    }

    println!(
        "{}",
        json!({
            "status": "success",
            "id": entry_id.to_string(),
            "code": spec.code,
            "description": spec.description,
        })
    );
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let report_id = resolve_id(&ws, &args.report, EntityPrefix::Dir)?;
    let report: Report = store.load(&report_id).into_diagnostic()?;

    if report.checklist_entries.is_empty() && report.placed_quantities.is_empty() {
        println!("No checklists recorded on this report.");
        return Ok(());
    }

    // Spec-level checklists
    for entry in &report.checklist_entries {
        let spec = store.load::<SpecItem>(&entry.spec_item).ok();
        let code = spec.as_ref().map(|s| s.code.clone()).unwrap_or_default();
        let questions: Vec<String> = spec
            .map(|s| s.checklist_questions.clone())
            .unwrap_or_default();
        let answers = entry.answers();

        println!("{}", code);
        if questions.is_empty() {
            // Stale answers with no current question list still render
            for (question, answer) in &answers {
                println!("  {}: {}", question, answer);
            }
            continue;
        }
        for question in &questions {
            // Answers keyed by text that no longer matches a current
            // question are silently orphaned
            let answer = answers.get(question).map(String::as_str).unwrap_or("-");
            println!("  {}: {}", question, answer);
        }
    }

    // Per-line checklists on placed quantities
    for quantity in &report.placed_quantities {
        let Some(item_id) = &quantity.bid_item else {
            continue;
        };
        let Ok(item) = store.load::<BidItem>(item_id) else {
            continue;
        };
        let spec = store.load::<SpecItem>(&item.spec_item).ok();
        let answers = quantity.answers();
        if answers.is_empty() {
            continue;
        }
        println!("{} (line item)", item.code);
        for question in item.active_questions(spec.as_ref()) {
            let answer = answers.get(question).map(String::as_str).unwrap_or("-");
            println!("  {}: {}", question, answer);
        }
    }
    Ok(())
}
