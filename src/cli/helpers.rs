//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::{ShortIdIndex, Workspace};

/// Resolve the workspace from --workspace or by discovery
pub fn open_workspace(global: &GlobalOpts) -> Result<Workspace> {
    match &global.workspace {
        Some(path) => Workspace::discover_from(path).into_diagnostic(),
        None => Workspace::discover().into_diagnostic(),
    }
}

/// Resolve user input (full ID or `PREFIX@N` alias) to an entity ID of
/// the expected type
pub fn resolve_id(ws: &Workspace, input: &str, prefix: EntityPrefix) -> Result<EntityId> {
    let index = ShortIdIndex::load(ws);
    let full = index
        .resolve(input)
        .ok_or_else(|| miette::miette!("Cannot resolve ID: {}", input))?;
    let id = EntityId::parse(&full).into_diagnostic()?;
    if id.prefix() != prefix {
        miette::bail!(
            "Expected a {} ID, got {}: {}",
            prefix.entity_name(),
            id.prefix().entity_name(),
            input
        );
    }
    Ok(id)
}

/// Register IDs in the alias index and persist it; returns the index
/// for alias display
pub fn index_ids(ws: &Workspace, ids: impl IntoIterator<Item = String>) -> ShortIdIndex {
    let mut index = ShortIdIndex::load(ws);
    index.extend(ids);
    let _ = index.save(ws);
    index
}

/// Short alias label like `DIR@3`, falling back to the full ID
pub fn alias_label(index: &ShortIdIndex, id: &EntityId) -> String {
    match index.get_alias(&id.to_string()) {
        Some(alias) => alias.to_string(),
        None => id.to_string(),
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
