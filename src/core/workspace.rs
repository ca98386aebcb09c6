//! Workspace discovery and directory structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Represents a DIT workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .dit/)
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            let dit_dir = current.join(".dit");
            if dit_dir.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace structure at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let dit_dir = root.join(".dit");
        if dit_dir.exists() {
            return Err(WorkspaceError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(dit_dir.join("templates"))
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        let config_path = dit_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Self::create_entity_dirs(&root)?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# DIT Workspace Configuration

# Default author (inspector) for new entities. Must match a team
# roster username once a roster is configured.
# author: ""

# Editor to use for `dit report edit` (default: $EDITOR)
# editor: ""
"#
    }

    fn create_entity_dirs(root: &Path) -> Result<(), WorkspaceError> {
        let dirs = ["projects", "phases", "specs", "items", "reports"];

        for dir in dirs {
            std::fs::create_dir_all(root.join(dir))
                .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .dit configuration directory
    pub fn dit_dir(&self) -> PathBuf {
        self.root.join(".dit")
    }

    /// Get the path for an entity file
    pub fn entity_path(&self, id: &EntityId) -> PathBuf {
        let subdir = Self::entity_directory(id.prefix());
        self.root.join(subdir).join(format!("{}.dit.yaml", id))
    }

    /// Get the directory for a given entity prefix
    pub fn entity_directory(prefix: EntityPrefix) -> &'static str {
        match prefix {
            EntityPrefix::Prj => "projects",
            EntityPrefix::Phs => "phases",
            EntityPrefix::Spec => "specs",
            EntityPrefix::Item => "items",
            // Checklist entries are embedded in their report file
            EntityPrefix::Dir | EntityPrefix::Chk => "reports",
        }
    }

    /// Iterate all entity files of a given prefix type
    pub fn iter_entity_files(&self, prefix: EntityPrefix) -> impl Iterator<Item = PathBuf> {
        let dir = self.root.join(Self::entity_directory(prefix));
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(".dit.yaml"))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a DIT workspace (searched from {searched_from:?}). Run 'dit init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("DIT workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
