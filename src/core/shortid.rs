//! Short ID system for easier entity selection
//!
//! Provides numeric aliases like `DIR@1` that map to full entity IDs.
//! Aliases are assigned per entity type as entities are created or
//! listed, and persist in the workspace's index file.

use std::collections::HashMap;
use std::fs;

use crate::core::identity::EntityId;
use crate::core::Workspace;

/// Index file location within a workspace
const INDEX_FILE: &str = ".dit/shortids.json";

/// A mapping of aliases (`PRJ@1`) to full entity IDs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Maps alias to full entity ID string
    entries: HashMap<String, String>,
    /// Maps full entity ID to alias (reverse lookup)
    #[serde(skip)]
    reverse: HashMap<String, String>,
}

impl ShortIdIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    /// Load the index from a workspace, or create empty if not found
    pub fn load(ws: &Workspace) -> Self {
        let path = ws.root().join(INDEX_FILE);
        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(mut index) = serde_json::from_str::<ShortIdIndex>(&content) {
                    index.reverse = index
                        .entries
                        .iter()
                        .map(|(alias, id)| (id.clone(), alias.clone()))
                        .collect();
                    return index;
                }
            }
        }
        Self::new()
    }

    /// Save the index to a workspace
    pub fn save(&self, ws: &Workspace) -> std::io::Result<()> {
        let path = ws.root().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Add entity IDs to the index, keeping existing aliases stable
    pub fn extend(&mut self, entity_ids: impl IntoIterator<Item = String>) {
        for id in entity_ids {
            self.add(id);
        }
    }

    /// Add an entity ID and return its alias
    pub fn add(&mut self, entity_id: String) -> String {
        if let Some(alias) = self.reverse.get(&entity_id) {
            return alias.clone();
        }

        let prefix = entity_id
            .split('-')
            .next()
            .unwrap_or_default()
            .to_uppercase();
        // Aliases are never removed individually, so count+1 is fresh
        let n = self
            .entries
            .keys()
            .filter(|alias| alias.starts_with(&format!("{}@", prefix)))
            .count()
            + 1;
        let alias = format!("{}@{}", prefix, n);
        self.entries.insert(alias.clone(), entity_id.clone());
        self.reverse.insert(entity_id, alias.clone());
        alias
    }

    /// Get the alias for a full entity ID, if one is assigned
    pub fn get_alias(&self, entity_id: &str) -> Option<&str> {
        self.reverse.get(entity_id).map(String::as_str)
    }

    /// Resolve user input (an alias like `DIR@1` or a full ID) to a
    /// full entity ID string
    pub fn resolve(&self, input: &str) -> Option<String> {
        if let Some((prefix, n)) = input.split_once('@') {
            let alias = format!("{}@{}", prefix.to_uppercase(), n.trim());
            return self.entries.get(&alias).cloned();
        }

        if EntityId::parse(input).is_ok() {
            return Some(input.to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_add_is_idempotent() {
        let mut index = ShortIdIndex::new();
        let id = EntityId::new(EntityPrefix::Dir).to_string();
        let a = index.add(id.clone());
        let b = index.add(id);
        assert_eq!(a, b);
    }

    #[test]
    fn test_aliases_number_per_prefix() {
        let mut index = ShortIdIndex::new();
        let project = index.add(EntityId::new(EntityPrefix::Prj).to_string());
        let phase = index.add(EntityId::new(EntityPrefix::Phs).to_string());
        let report = index.add(EntityId::new(EntityPrefix::Dir).to_string());
        let report2 = index.add(EntityId::new(EntityPrefix::Dir).to_string());

        assert_eq!(project, "PRJ@1");
        assert_eq!(phase, "PHS@1");
        assert_eq!(report, "DIR@1");
        assert_eq!(report2, "DIR@2");
    }

    #[test]
    fn test_resolve_alias_and_full_id() {
        let mut index = ShortIdIndex::new();
        let id = EntityId::new(EntityPrefix::Dir).to_string();
        let alias = index.add(id.clone());

        assert_eq!(index.resolve(&alias), Some(id.clone()));
        assert_eq!(index.resolve("dir@1"), Some(id.clone()));
        assert_eq!(index.resolve(&id), Some(id.clone()));
        assert_eq!(index.resolve("ITEM@1"), None);
        assert_eq!(index.resolve("not-an-id"), None);
    }
}
