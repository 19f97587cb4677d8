//! Permission vocabulary
//!
//! The closed set of capability identifiers used across the Roster admin
//! tools. Checks against anything outside this set cannot be expressed,
//! which removes the class of bugs where a typo'd identifier silently
//! always denies.

use serde::{Deserialize, Serialize};

/// Specific permissions that can be granted to users
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Edit participant records
    EditParticipant,
    /// Delete participant records
    DeleteParticipant,
    /// Edit training entries
    EditTraining,
    /// Delete training entries
    DeleteTraining,
    /// Edit tags attached to participants
    EditTag,
    /// Delete tags
    DeleteTag,
    /// Manage role assignments
    ManageRoles,
    /// Administrative wildcard: satisfies every permission check
    Admin,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::EditParticipant => write!(f, "EDIT_PARTICIPANT"),
            Permission::DeleteParticipant => write!(f, "DELETE_PARTICIPANT"),
            Permission::EditTraining => write!(f, "EDIT_TRAINING"),
            Permission::DeleteTraining => write!(f, "DELETE_TRAINING"),
            Permission::EditTag => write!(f, "EDIT_TAG"),
            Permission::DeleteTag => write!(f, "DELETE_TAG"),
            Permission::ManageRoles => write!(f, "MANAGE_ROLES"),
            Permission::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EDIT_PARTICIPANT" => Ok(Permission::EditParticipant),
            "DELETE_PARTICIPANT" => Ok(Permission::DeleteParticipant),
            "EDIT_TRAINING" => Ok(Permission::EditTraining),
            "DELETE_TRAINING" => Ok(Permission::DeleteTraining),
            "EDIT_TAG" => Ok(Permission::EditTag),
            "DELETE_TAG" => Ok(Permission::DeleteTag),
            "MANAGE_ROLES" => Ok(Permission::ManageRoles),
            "ADMIN" => Ok(Permission::Admin),
            _ => Err(format!("Unknown permission: {}", s)),
        }
    }
}
