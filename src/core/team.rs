//! Team roster and role management for workflow authorization

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::Workspace;

/// Team roles for authorization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Inspector,
    Quality,
    Management,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Inspector => write!(f, "inspector"),
            Role::Quality => write!(f, "quality"),
            Role::Management => write!(f, "management"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inspector" => Ok(Role::Inspector),
            "quality" => Ok(Role::Quality),
            "management" => Ok(Role::Management),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A team member with their roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub email: String,
    /// Username used to identify the member (matches config author)
    pub username: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    /// Check if member has a specific role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check if member is an admin (can bypass authorization)
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// Team roster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

fn default_version() -> u32 {
    1
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self {
            version: 1,
            members: Vec::new(),
        }
    }
}

impl TeamRoster {
    /// Load team roster from the workspace's .dit/team.yaml
    pub fn load(ws: &Workspace) -> Option<Self> {
        let path = ws.dit_dir().join("team.yaml");
        Self::load_from_path(&path)
    }

    /// Load team roster from a specific path
    pub fn load_from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&contents).ok()
    }

    /// Save team roster to the workspace's .dit/team.yaml
    pub fn save(&self, ws: &Workspace) -> std::io::Result<()> {
        let path = ws.dit_dir().join("team.yaml");
        let contents = serde_yml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, contents)
    }

    /// Find an active member by username or email
    pub fn find_member(&self, username: &str) -> Option<&TeamMember> {
        self.members
            .iter()
            .filter(|m| m.active)
            .find(|m| m.username == username || m.email == username)
    }

    /// Whether the member may approve a report (authorize it)
    pub fn can_approve(&self, member: &TeamMember) -> bool {
        member.is_admin() || member.has_role(Role::Quality) || member.has_role(Role::Management)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(username: &str, roles: Vec<Role>) -> TeamMember {
        TeamMember {
            name: username.to_string(),
            email: format!("{}@example.com", username),
            username: username.to_string(),
            roles,
            active: true,
        }
    }

    #[test]
    fn test_find_member_by_username_or_email() {
        let roster = TeamRoster {
            version: 1,
            members: vec![member("jdoe", vec![Role::Inspector])],
        };

        assert!(roster.find_member("jdoe").is_some());
        assert!(roster.find_member("jdoe@example.com").is_some());
        assert!(roster.find_member("nobody").is_none());
    }

    #[test]
    fn test_inactive_member_not_found() {
        let mut m = member("jdoe", vec![Role::Inspector]);
        m.active = false;
        let roster = TeamRoster {
            version: 1,
            members: vec![m],
        };
        assert!(roster.find_member("jdoe").is_none());
    }

    #[test]
    fn test_can_approve_requires_quality_role() {
        let roster = TeamRoster::default();
        assert!(!roster.can_approve(&member("jdoe", vec![Role::Inspector])));
        assert!(roster.can_approve(&member("qc", vec![Role::Quality])));
        assert!(roster.can_approve(&member("boss", vec![Role::Management])));
        assert!(roster.can_approve(&member("root", vec![Role::Admin])));
    }
}
