//! DIT: Daily Inspection Toolkit
//!
//! A toolkit for managing construction daily inspection reports as
//! plain text files: projects, phases, bid items with spec-driven
//! checklists, QA results, a QC review workflow, and CSV/Word exports.

pub mod cli;
pub mod core;
pub mod entities;
pub mod export;
