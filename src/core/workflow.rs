//! Workflow engine for report status transitions
//!
//! Reports move `creating -> qc_review -> revise -> ... -> authorization`;
//! authorization is terminal. The three actions mirror the QC review
//! cycle: submit, approve (authorize), and request revision.

use chrono::Utc;
use thiserror::Error;

use crate::core::team::{TeamMember, TeamRoster};
use crate::entities::entries::ActivityLog;
use crate::entities::report::{Report, ReportResult, ReportStatus};

/// Errors that can occur during workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ReportStatus,
        to: ReportStatus,
    },

    #[error("authorization required: report approval requires a quality or management role")]
    Unauthorized,

    #[error("actor '{0}' is not on the team roster")]
    UnknownActor(String),

    #[error("team roster not configured. Run 'dit team init' first")]
    NoRoster,

    #[error("a revision note is required")]
    EmptyNote,
}

/// Workflow engine for managing report status transitions
pub struct WorkflowEngine {
    roster: Option<TeamRoster>,
}

impl WorkflowEngine {
    pub fn new(roster: Option<TeamRoster>) -> Self {
        Self { roster }
    }

    /// Get the team roster
    pub fn roster(&self) -> Option<&TeamRoster> {
        self.roster.as_ref()
    }

    /// Check if a status transition is part of the review cycle
    pub fn is_valid_transition(&self, from: ReportStatus, to: ReportStatus) -> bool {
        matches!(
            (from, to),
            (ReportStatus::Creating, ReportStatus::QcReview)
                | (ReportStatus::QcReview, ReportStatus::Authorization)
                | (ReportStatus::QcReview, ReportStatus::Revise)
                | (ReportStatus::Revise, ReportStatus::QcReview)
        )
    }

    /// Get allowed transitions from the current status
    pub fn allowed_transitions(&self, current: ReportStatus) -> Vec<ReportStatus> {
        match current {
            ReportStatus::Creating => vec![ReportStatus::QcReview],
            ReportStatus::QcReview => vec![ReportStatus::Authorization, ReportStatus::Revise],
            ReportStatus::Revise => vec![ReportStatus::QcReview],
            ReportStatus::Authorization => vec![],
        }
    }

    /// Submit a report for QC review.
    ///
    /// Sets the status unconditionally; no child-data consistency check
    /// is enforced at this layer.
    pub fn submit_for_qc(&self, report: &mut Report) {
        report.status = ReportStatus::QcReview;
    }

    /// Approve (authorize) a report.
    ///
    /// Always forces result=pass for the archival record, even over a
    /// derived fail/pending. When a roster is configured the actor must
    /// be a member with approval rights.
    pub fn approve(&self, report: &mut Report, actor: &str) -> Result<(), WorkflowError> {
        if let Some(roster) = &self.roster {
            let member = roster
                .find_member(actor)
                .ok_or_else(|| WorkflowError::UnknownActor(actor.to_string()))?;
            if !roster.can_approve(member) {
                return Err(WorkflowError::Unauthorized);
            }
        }

        report.status = ReportStatus::Authorization;
        report.result = ReportResult::Pass;
        Ok(())
    }

    /// Send a report back for revision, recording who asked and why.
    ///
    /// The actor must resolve to a roster member: the activity log holds
    /// identified users, never free-text names.
    pub fn request_revision(
        &self,
        report: &mut Report,
        actor: &str,
        note: &str,
    ) -> Result<ActivityLog, WorkflowError> {
        let roster = self.roster.as_ref().ok_or(WorkflowError::NoRoster)?;
        let member = roster
            .find_member(actor)
            .ok_or_else(|| WorkflowError::UnknownActor(actor.to_string()))?;

        if note.trim().is_empty() {
            return Err(WorkflowError::EmptyNote);
        }

        report.status = ReportStatus::Revise;
        report.result = ReportResult::Fail;

        let entry = ActivityLog {
            actor: member.username.clone(),
            note: note.trim().to_string(),
            timestamp: Utc::now(),
        };
        report.activity_log.push(entry.clone());
        Ok(entry)
    }

    /// Resolve an actor against the roster, if one is configured
    pub fn resolve_actor(&self, actor: &str) -> Result<Option<&TeamMember>, WorkflowError> {
        match &self.roster {
            None => Ok(None),
            Some(roster) => roster
                .find_member(actor)
                .map(Some)
                .ok_or_else(|| WorkflowError::UnknownActor(actor.to_string())),
        }
    }
}
