//! Workflow verbs: `dit submit`, `dit approve`, `dit revise`

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_workspace, resolve_id};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::{Config, Store, TeamRoster, WorkflowEngine};
use crate::entities::Report;

/// Submit a report for QC review
#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,
}

/// Approve (authorize) a report; always records result=pass
#[derive(Debug, Args)]
pub struct ApproveArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,
}

/// Send a report back for revision with an activity-log note
#[derive(Debug, Args)]
pub struct ReviseArgs {
    /// Report ID or alias (DIR@N)
    pub id: String,

    /// Why the report is being returned
    #[arg(long, short = 'n')]
    pub note: String,
}

impl SubmitArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let ws = open_workspace(global)?;
        let store = Store::new(&ws);
        let id = resolve_id(&ws, &self.id, EntityPrefix::Dir)?;
        let mut report: Report = store.load(&id).into_diagnostic()?;

        let engine = WorkflowEngine::new(TeamRoster::load(&ws));
        engine.submit_for_qc(&mut report);
        store.write_report(&report).into_diagnostic()?;

        if !global.quiet {
            println!(
                "{} report {} submitted to QC",
                style("✓").green(),
                report.dir_number.as_deref().unwrap_or("(unnumbered)")
            );
        }
        Ok(())
    }
}

impl ApproveArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let ws = open_workspace(global)?;
        let store = Store::new(&ws);
        let id = resolve_id(&ws, &self.id, EntityPrefix::Dir)?;
        let mut report: Report = store.load(&id).into_diagnostic()?;

        let engine = WorkflowEngine::new(TeamRoster::load(&ws));
        engine
            .approve(&mut report, &Config::load().author())
            .into_diagnostic()?;
        store.write_report(&report).into_diagnostic()?;

        if !global.quiet {
            println!(
                "{} report {} approved and authorized",
                style("✓").green(),
                report.dir_number.as_deref().unwrap_or("(unnumbered)")
            );
        }
        Ok(())
    }
}

impl ReviseArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let ws = open_workspace(global)?;
        let store = Store::new(&ws);
        let id = resolve_id(&ws, &self.id, EntityPrefix::Dir)?;
        let mut report: Report = store.load(&id).into_diagnostic()?;

        let engine = WorkflowEngine::new(TeamRoster::load(&ws));
        let entry = engine
            .request_revision(&mut report, &Config::load().author(), &self.note)
            .into_diagnostic()?;
        store.write_report(&report).into_diagnostic()?;

        if !global.quiet {
            println!(
                "{} report returned for revision by {}",
                style("!").yellow(),
                entry.actor
            );
        }
        Ok(())
    }
}
