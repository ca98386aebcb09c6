//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    checklist::ChecklistCommands,
    completions::CompletionsArgs,
    export::ExportArgs,
    init::InitArgs,
    item::ItemCommands,
    phase::PhaseCommands,
    project::ProjectCommands,
    report::ReportCommands,
    spec::SpecCommands,
    team::TeamCommands,
    workflow::{ApproveArgs, ReviseArgs, SubmitArgs},
};

#[derive(Parser)]
#[command(name = "dit")]
#[command(author, version, about = "Daily Inspection Toolkit")]
#[command(
    long_about = "A toolkit for managing construction daily inspection reports as plain text files: checklists, QA results, QC review workflow, CSV master logs, and Word exports."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Workspace root (default: auto-detect by finding .dit/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Auto,
    Table,
    Yaml,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new DIT workspace
    Init(InitArgs),

    /// Project (contract) management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Construction phase management
    #[command(subcommand)]
    Phase(PhaseCommands),

    /// Specification item management
    #[command(subcommand)]
    Spec(SpecCommands),

    /// Bid (pay) item management
    #[command(subcommand)]
    Item(ItemCommands),

    /// Daily inspection report management
    #[command(subcommand)]
    Report(ReportCommands),

    /// Per-report spec checklists
    #[command(subcommand)]
    Checklist(ChecklistCommands),

    /// Submit a report for QC review
    Submit(SubmitArgs),

    /// Approve (authorize) a report
    Approve(ApproveArgs),

    /// Send a report back for revision
    Revise(ReviseArgs),

    /// Export a report as a Word document
    Export(ExportArgs),

    /// Team roster management
    #[command(subcommand)]
    Team(TeamCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
