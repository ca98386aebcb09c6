//! `dit report` command - daily inspection report management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{alias_label, index_ids, open_workspace, resolve_id};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::{Config, ReportFilter, Store, Workspace};
use crate::entities::entries::{CrewEntry, EquipmentEntry, PlacedQuantity, QaEntry};
use crate::entities::report::WeatherReading;
use crate::entities::{Phase, Project, Report};
use crate::export::csv::master_log;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Create a new report
    New(NewArgs),

    /// List reports with filtering
    List(ListArgs),

    /// Show a report's details
    Show(ShowArgs),

    /// Edit a report's YAML in your editor (re-validated on save)
    Edit(EditArgs),

    /// Delete a report
    Delete(DeleteArgs),

    /// Record a weather reading (up to three per report)
    Weather(WeatherArgs),

    /// Set report fields (deficiency, narrative)
    Set(SetArgs),

    /// Add a placed-quantity row
    AddQty(AddQtyArgs),

    /// Add a QA test result row
    AddQa(AddQaArgs),

    /// Add a crew count row
    AddCrew(AddCrewArgs),

    /// Add an equipment usage row
    AddEquipment(AddEquipmentArgs),

    /// Export the filtered master log as CSV
    Csv(CsvArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project ID or alias (PRJ@N)
    #[arg(long, short = 'p')]
    pub project: String,

    /// Phase ID or alias (PHS@N)
    #[arg(long)]
    pub phase: String,

    /// Inspection start date (YYYY-MM-DD)
    #[arg(long, short = 'd')]
    pub date: NaiveDate,

    /// Inspection end date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// DIR number
    #[arg(long)]
    pub dir: Option<String>,

    #[arg(long)]
    pub shift_start: Option<String>,

    #[arg(long)]
    pub shift_end: Option<String>,

    #[arg(long)]
    pub contractor: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
pub struct FilterArgs {
    /// Filter by status (creating, qc_review, revise, authorization)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by result (pending, pass, fail, as_built)
    #[arg(long)]
    pub result: Option<String>,

    /// Filter by inspector username substring
    #[arg(long)]
    pub inspector: Option<String>,

    /// Filter by project ID or alias
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Filter by bid item ID or alias (reports that placed it)
    #[arg(long)]
    pub item: Option<String>,

    /// Start of the date range (inclusive)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End of the date range (inclusive)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Minimum precipitation (numeric; legacy text reads as 0)
    #[arg(long)]
    pub precip_min: Option<f64>,

    /// Maximum precipitation
    #[arg(long)]
    pub precip_max: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct WeatherArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,

    #[arg(long)]
    pub temp: Option<i32>,

    #[arg(long)]
    pub wind: Option<String>,

    #[arg(long)]
    pub precip: Option<String>,

    #[arg(long)]
    pub visibility: Option<String>,

    #[arg(long)]
    pub summary: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,

    /// Deficiency status (none, minor, cdr, ncr)
    #[arg(long)]
    pub deficiency: Option<String>,

    #[arg(long)]
    pub deficiency_desc: Option<String>,

    /// Safety incident (na, yes, no)
    #[arg(long)]
    pub safety: Option<String>,

    #[arg(long)]
    pub safety_desc: Option<String>,

    #[arg(long)]
    pub commentary: Option<String>,

    #[arg(long)]
    pub additional_activities: Option<String>,

    #[arg(long)]
    pub additional_info: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddQtyArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,

    /// Bid item ID or alias (ITEM@N)
    #[arg(long, short = 'i')]
    pub item: String,

    /// Quantity placed
    #[arg(long, short = 'n')]
    pub qty: f64,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Checklist answer as "Question=Yes|No|N/A" (repeatable)
    #[arg(long = "answer", short = 'a')]
    pub answers: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddQaArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,

    /// Test type (compaction, concrete_slump, concrete_cylinder,
    /// asphalt_temp, nuclear_gauge, proof_roll)
    #[arg(long = "type", short = 't')]
    pub qa_type: String,

    /// Test result (pass, fail, pending, n_a)
    #[arg(long, short = 'r')]
    pub result: String,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub remarks: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddCrewArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,

    #[arg(long, short = 'c')]
    pub contractor: String,

    #[arg(long, default_value_t = 0)]
    pub foremen: u32,

    #[arg(long, default_value_t = 0)]
    pub superintendents: u32,

    #[arg(long, default_value_t = 0)]
    pub laborers: u32,

    #[arg(long, default_value_t = 0)]
    pub operators: u32,

    #[arg(long, default_value_t = 0)]
    pub survey: u32,

    #[arg(long, default_value_t = 0)]
    pub electricians: u32,
}

#[derive(clap::Args, Debug)]
pub struct AddEquipmentArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,

    #[arg(long, short = 'm')]
    pub make_model: String,

    #[arg(long)]
    pub contractor: Option<String>,

    #[arg(long, short = 'n', default_value_t = 1)]
    pub qty: u32,

    #[arg(long)]
    pub hours: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct CsvArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::New(args) => run_new(args, global),
        ReportCommands::List(args) => run_list(args, global),
        ReportCommands::Show(args) => run_show(args, global),
        ReportCommands::Edit(args) => run_edit(args, global),
        ReportCommands::Delete(args) => run_delete(args, global),
        ReportCommands::Weather(args) => run_weather(args, global),
        ReportCommands::Set(args) => run_set(args, global),
        ReportCommands::AddQty(args) => run_add_qty(args, global),
        ReportCommands::AddQa(args) => run_add_qa(args, global),
        ReportCommands::AddCrew(args) => run_add_crew(args, global),
        ReportCommands::AddEquipment(args) => run_add_equipment(args, global),
        ReportCommands::Csv(args) => run_csv(args, global),
    }
}

fn build_filter(ws: &Workspace, args: &FilterArgs) -> Result<ReportFilter> {
    // All defaults resolved here, before any file is scanned
    let mut filter = ReportFilter {
        inspector: args.inspector.clone(),
        date_from: args.from,
        date_to: args.to,
        precip_min: args.precip_min,
        precip_max: args.precip_max,
        ..Default::default()
    };
    if let Some(status) = &args.status {
        filter.status = Some(status.parse().map_err(|e: String| miette::miette!(e))?);
    }
    if let Some(result) = &args.result {
        filter.result = Some(result.parse().map_err(|e: String| miette::miette!(e))?);
    }
    if let Some(project) = &args.project {
        filter.project = Some(resolve_id(ws, project, EntityPrefix::Prj)?);
    }
    if let Some(item) = &args.item {
        filter.bid_item = Some(resolve_id(ws, item, EntityPrefix::Item)?);
    }
    Ok(filter)
}

fn load_report(store: &Store<'_>, ws: &Workspace, input: &str) -> Result<(EntityId, Report)> {
    let id = resolve_id(ws, input, EntityPrefix::Dir)?;
    let report: Report = store.load(&id).into_diagnostic()?;
    Ok((id, report))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);

    let project_id = resolve_id(&ws, &args.project, EntityPrefix::Prj)?;
    let phase_id = resolve_id(&ws, &args.phase, EntityPrefix::Phs)?;
    store.load::<Project>(&project_id).into_diagnostic()?;
    store.load::<Phase>(&phase_id).into_diagnostic()?;

    let mut report = Report::new(Config::load().author());
    report.project = Some(project_id);
    report.phase = Some(phase_id);
    report.start_date = Some(args.date);
    report.end_date = args.end_date;
    report.dir_number = args.dir;
    report.shift_start = args.shift_start;
    report.shift_end = args.shift_end;
    report.contractor = args.contractor;

    store.save_report(&mut report).into_diagnostic()?;
    let index = index_ids(&ws, [report.id.to_string()]);

    if !global.quiet {
        println!(
            "{} created report {} ({}, status {})",
            style("✓").green(),
            style(report.dir_number.as_deref().unwrap_or("unnumbered")).bold(),
            alias_label(&index, &report.id),
            report.status.label()
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let filter = build_filter(&ws, &args.filter)?;

    let mut reports: Vec<Report> = store
        .load_all::<Report>()
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect();
    reports.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    match global.format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&reports).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&reports).into_diagnostic()?
            );
            return Ok(());
        }
        OutputFormat::Auto | OutputFormat::Table => {}
    }

    let projects: BTreeMap<String, String> = store
        .load_all::<Project>()
        .into_iter()
        .map(|p| (p.id.to_string(), p.name))
        .collect();
    let index = index_ids(&ws, reports.iter().map(|r| r.id.to_string()));

    let mut builder = Builder::default();
    builder.push_record(["ID", "DIR #", "Date", "Inspector", "Project", "Status", "Result"]);
    for report in &reports {
        let project = report
            .project
            .as_ref()
            .and_then(|id| projects.get(&id.to_string()))
            .cloned()
            .unwrap_or_default();
        builder.push_record([
            alias_label(&index, &report.id),
            report.dir_number.clone().unwrap_or_default(),
            report
                .start_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            report.inspector.clone(),
            project,
            report.status.label().to_string(),
            report.result.label().to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::modern()));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let (_, report) = load_report(&store, &ws, &args.id)?;

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).into_diagnostic()?
            )
        }
        _ => print!("{}", serde_yml::to_string(&report).into_diagnostic()?),
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let id = resolve_id(&ws, &args.id, EntityPrefix::Dir)?;
    // Ensure it exists before handing the path to an editor
    let _: Report = store.load(&id).into_diagnostic()?;

    let config = Config::load();
    let status = config
        .run_editor(&ws.entity_path(&id))
        .into_diagnostic()?;
    if !status.success() {
        miette::bail!("editor exited with non-zero status");
    }

    // Re-run the content save pipeline over whatever was written
    let mut report: Report = store.load(&id).into_diagnostic()?;
    store.save_report(&mut report).into_diagnostic()?;
    if !global.quiet {
        println!(
            "{} saved; result is {}",
            style("✓").green(),
            report.result.label()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let (id, report) = load_report(&store, &ws, &args.id)?;

    if !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete report {}?",
                report.dir_number.as_deref().unwrap_or("(unnumbered)")
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.delete_report(&id).into_diagnostic()?;
    if !global.quiet {
        println!("{} deleted report", style("✓").green());
    }
    Ok(())
}

fn run_weather(args: WeatherArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let (_, mut report) = load_report(&store, &ws, &args.id)?;

    if report.weather.len() >= 3 {
        miette::bail!("a report carries at most three weather readings");
    }
    report.weather.push(WeatherReading {
        temperature: args.temp,
        wind: args.wind,
        precipitation: args.precip,
        visibility: args.visibility,
        summary: args.summary,
    });

    store.save_report(&mut report).into_diagnostic()?;
    if !global.quiet {
        println!(
            "{} recorded weather reading {} of 3",
            style("✓").green(),
            report.weather.len()
        );
    }
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let (_, mut report) = load_report(&store, &ws, &args.id)?;

    if let Some(deficiency) = &args.deficiency {
        report.deficiency_status = deficiency
            .parse()
            .map_err(|e: String| miette::miette!(e))?;
    }
    if let Some(desc) = args.deficiency_desc {
        report.deficiency_desc = Some(desc);
    }
    if let Some(safety) = &args.safety {
        report.safety_incident = safety.parse().map_err(|e: String| miette::miette!(e))?;
    }
    if let Some(desc) = args.safety_desc {
        report.safety_desc = Some(desc);
    }
    if let Some(commentary) = args.commentary {
        report.commentary = Some(commentary);
    }
    if let Some(activities) = args.additional_activities {
        report.additional_activities = Some(activities);
    }
    if let Some(info) = args.additional_info {
        report.additional_info = Some(info);
    }

    store.save_report(&mut report).into_diagnostic()?;
    if !global.quiet {
        println!(
            "{} saved; result is {}",
            style("✓").green(),
            report.result.label()
        );
    }
    Ok(())
}

fn run_add_qty(args: AddQtyArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let (_, mut report) = load_report(&store, &ws, &args.id)?;
    let item_id = resolve_id(&ws, &args.item, EntityPrefix::Item)?;

    let mut quantity = PlacedQuantity::new(item_id, args.qty);
    quantity.location = args.location;
    quantity.notes = args.notes;
    if !args.answers.is_empty() {
        let mut map = serde_json::Map::new();
        for pair in &args.answers {
            let (question, answer) = pair
                .split_once('=')
                .ok_or_else(|| miette::miette!("expected Question=Answer, got '{}'", pair))?;
            map.insert(
                question.trim().to_string(),
                serde_json::Value::String(answer.trim().to_string()),
            );
        }
        quantity.checklist_answers = serde_json::Value::Object(map);
    }
    report.placed_quantities.push(quantity);

    store.save_report(&mut report).into_diagnostic()?;
    if !global.quiet {
        println!(
            "{} added placed quantity ({} rows)",
            style("✓").green(),
            report.placed_quantities.len()
        );
    }
    Ok(())
}

fn run_add_qa(args: AddQaArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let (_, mut report) = load_report(&store, &ws, &args.id)?;

    report.qa_entries.push(QaEntry {
        qa_type: args.qa_type.parse().map_err(|e: String| miette::miette!(e))?,
        result: args.result.parse().map_err(|e: String| miette::miette!(e))?,
        location: args.location,
        remarks: args.remarks,
    });

    store.save_report(&mut report).into_diagnostic()?;
    if !global.quiet {
        println!(
            "{} added QA entry; report result is {}",
            style("✓").green(),
            report.result.label()
        );
    }
    Ok(())
}

fn run_add_crew(args: AddCrewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let (_, mut report) = load_report(&store, &ws, &args.id)?;

    report.crew_entries.push(CrewEntry {
        contractor: Some(args.contractor),
        foreman_count: args.foremen,
        superintendent_count: args.superintendents,
        laborer_count: args.laborers,
        operator_count: args.operators,
        survey_count: args.survey,
        electrician_count: args.electricians,
        notes: None,
    });

    store.save_report(&mut report).into_diagnostic()?;
    if !global.quiet {
        println!("{} added crew entry", style("✓").green());
    }
    Ok(())
}

fn run_add_equipment(args: AddEquipmentArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let (_, mut report) = load_report(&store, &ws, &args.id)?;

    report.equipment_entries.push(EquipmentEntry {
        contractor: args.contractor,
        make_model: Some(args.make_model),
        quantity: args.qty,
        hours: args.hours,
    });

    store.save_report(&mut report).into_diagnostic()?;
    if !global.quiet {
        println!("{} added equipment entry", style("✓").green());
    }
    Ok(())
}

fn run_csv(args: CsvArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let store = Store::new(&ws);
    let filter = build_filter(&ws, &args.filter)?;

    let mut matched: Vec<Report> = store
        .load_all::<Report>()
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect();
    matched.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    let mut aggregates = Vec::with_capacity(matched.len());
    for report in matched {
        aggregates.push(store.load_report_aggregate(&report.id).into_diagnostic()?);
    }

    let csv = master_log(&aggregates).into_diagnostic()?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, csv).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} wrote {} report(s) to {}",
                    style("✓").green(),
                    aggregates.len(),
                    path.display()
                );
            }
        }
        None => print!("{}", csv),
    }
    Ok(())
}
