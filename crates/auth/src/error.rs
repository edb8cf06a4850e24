//! Errors raised while building assignments or resolving rights.

use thiserror::Error;

use refdata_core::{DomainError, RightId, RoleId, SupervisoryNodeId};

use crate::RightType;

/// Result type used by the rights engine.
pub type RightsResult<T> = Result<T, RightsError>;

/// Rights engine error.
///
/// Every variant is local to a single call. Nothing in this crate retries:
/// lookups are delegated, so retry policy belongs to whoever fetches data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RightsError {
    /// Malformed `RightQuery` (caller bug).
    #[error("invalid right query: {0}")]
    InvalidQuery(String),

    #[error("role '{role}' has no rights and cannot be assigned")]
    EmptyRoleRights { role: String },

    #[error("role '{role}' carries {actual} rights, which cannot be used for a {assignment} assignment")]
    RightTypeMismatch {
        role: String,
        actual: RightType,
        assignment: &'static str,
    },

    #[error("role '{role}' cannot mix {existing} and {added} rights")]
    MixedRightTypes {
        role: String,
        existing: RightType,
        added: RightType,
    },

    #[error("role {0} not found")]
    UnknownRole(RoleId),

    #[error("right {0} not found")]
    UnknownRight(RightId),

    #[error("program '{0}' not found")]
    UnknownProgram(String),

    #[error("facility '{0}' not found")]
    UnknownFacility(String),

    #[error("supervisory node '{0}' not found")]
    UnknownSupervisoryNode(String),

    /// A role assignment request names an impossible combination of scopes.
    #[error("invalid role assignment: {0}")]
    InvalidAssignment(String),

    #[error("duplicate role assignment: {0}")]
    DuplicateRoleAssignment(String),

    /// The supervisory-node hierarchy loops back on itself.
    #[error("supervisory node hierarchy contains a cycle at node {node}")]
    HierarchyCycleDetected { node: SupervisoryNodeId },

    #[error("{0}")]
    Domain(#[from] DomainError),
}

impl RightsError {
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn invalid_assignment(msg: impl Into<String>) -> Self {
        Self::InvalidAssignment(msg.into())
    }
}
