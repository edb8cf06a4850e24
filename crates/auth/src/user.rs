//! User aggregate: the owner of a role-assignment set (event-sourced).
//!
//! Assignments are edited with whole-set replacement. The caller supplies the
//! desired set; the aggregate validates it in one pass and never diffs it
//! against history.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use refdata_core::{
    Aggregate, AggregateRoot, DomainError, ExpectedVersion, FacilityId, ProgramId, RightId, UserId,
};
use refdata_events::{Event, EventEnvelope};

use crate::assignment::ensure_valid;
use crate::{RightsError, RightsResult, RoleAssignment};

pub const USER_AGGREGATE_TYPE: &str = "auth.user";

// ─────────────────────────────────────────────────────────────────────────────
// User Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// User aggregate.
///
/// # Invariants
/// - No two role assignments share the same (kind, role, scope) key.
/// - Inactive users cannot be granted assignments (clearing them is allowed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub home_facility: Option<FacilityId>,
    pub active: bool,
    role_assignments: Vec<RoleAssignment>,
    pub version: u64,
    pub created: bool,
}

impl User {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: UserId) -> Self {
        Self {
            id,
            username: String::new(),
            home_facility: None,
            active: true,
            role_assignments: Vec::new(),
            version: 0,
            created: false,
        }
    }

    /// An existing user loaded from a snapshot.
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            created: true,
            ..Self::empty(id)
        }
    }

    pub fn with_home_facility(mut self, facility: FacilityId) -> Self {
        self.home_facility = Some(facility);
        self
    }

    pub fn with_role_assignments(mut self, assignments: Vec<RoleAssignment>) -> RightsResult<Self> {
        ensure_valid(&assignments)?;
        self.role_assignments = assignments;
        Ok(self)
    }

    pub fn role_assignments(&self) -> &[RoleAssignment] {
        &self.role_assignments
    }

    /// Warehouses where the user holds `right` through a fulfillment assignment.
    pub fn fulfillment_facilities(&self, right: RightId) -> BTreeSet<FacilityId> {
        self.role_assignments
            .iter()
            .filter_map(|assignment| match assignment {
                RoleAssignment::Fulfillment(a) if assignment.carries(right) => Some(a.warehouse()),
                _ => None,
            })
            .collect()
    }

    /// Programs the user supervises through a supervisory node.
    ///
    /// Home-facility supervision is left out: it covers the user's own
    /// facility, not a delegated part of the hierarchy.
    pub fn supervised_programs(&self) -> BTreeSet<ProgramId> {
        self.role_assignments
            .iter()
            .filter_map(|assignment| match assignment {
                RoleAssignment::Supervision(a) if !a.is_home_facility_supervision() => {
                    Some(a.program())
                }
                _ => None,
            })
            .collect()
    }

    fn ensure_user_id(&self, user_id: UserId) -> Result<(), DomainError> {
        if self.id != user_id {
            return Err(DomainError::invariant("user_id mismatch"));
        }
        Ok(())
    }

    fn ensure_exists(&self, user_id: UserId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("user {user_id}")));
        }
        self.ensure_user_id(user_id)
    }
}

impl AggregateRoot for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub user_id: UserId,
    pub username: String,
    pub home_facility: Option<FacilityId>,
    pub role_assignments: Vec<RoleAssignment>,
    pub occurred_at: DateTime<Utc>,
}

/// Replace the user's whole assignment set with `role_assignments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRoleAssignments {
    pub user_id: UserId,
    pub role_assignments: Vec<RoleAssignment>,
    #[serde(default)]
    pub expected_version: ExpectedVersion,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeHomeFacility {
    pub user_id: UserId,
    pub home_facility: Option<FacilityId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivateUser {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateUser {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UserCommand {
    Create(CreateUser),
    ReplaceRoleAssignments(ReplaceRoleAssignments),
    ChangeHomeFacility(ChangeHomeFacility),
    Deactivate(DeactivateUser),
    Activate(ActivateUser),
}

impl UserCommand {
    pub fn user_id(&self) -> UserId {
        match self {
            UserCommand::Create(c) => c.user_id,
            UserCommand::ReplaceRoleAssignments(c) => c.user_id,
            UserCommand::ChangeHomeFacility(c) => c.user_id,
            UserCommand::Deactivate(c) => c.user_id,
            UserCommand::Activate(c) => c.user_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreated {
    pub user_id: UserId,
    pub username: String,
    pub home_facility: Option<FacilityId>,
    pub role_assignments: Vec<RoleAssignment>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignmentsReplaced {
    pub user_id: UserId,
    pub role_assignments: Vec<RoleAssignment>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeFacilityChanged {
    pub user_id: UserId,
    pub home_facility: Option<FacilityId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeactivated {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivated {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserEvent {
    Created(UserCreated),
    RoleAssignmentsReplaced(RoleAssignmentsReplaced),
    HomeFacilityChanged(HomeFacilityChanged),
    Deactivated(UserDeactivated),
    Activated(UserActivated),
}

impl Event for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Created(_) => "auth.user.created",
            UserEvent::RoleAssignmentsReplaced(_) => "auth.user.role_assignments_replaced",
            UserEvent::HomeFacilityChanged(_) => "auth.user.home_facility_changed",
            UserEvent::Deactivated(_) => "auth.user.deactivated",
            UserEvent::Activated(_) => "auth.user.activated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            UserEvent::Created(e) => e.occurred_at,
            UserEvent::RoleAssignmentsReplaced(e) => e.occurred_at,
            UserEvent::HomeFacilityChanged(e) => e.occurred_at,
            UserEvent::Deactivated(e) => e.occurred_at,
            UserEvent::Activated(e) => e.occurred_at,
        }
    }
}

/// Wrap events decided against a user at `base_version` for appending.
pub fn seal_events(
    user_id: UserId,
    base_version: u64,
    events: Vec<UserEvent>,
) -> Vec<EventEnvelope<UserEvent>> {
    EventEnvelope::seal_all(user_id.into(), USER_AGGREGATE_TYPE, base_version, events)
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for User {
    type Command = UserCommand;
    type Event = UserEvent;
    type Error = RightsError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            UserEvent::Created(e) => {
                self.id = e.user_id;
                self.username = e.username.clone();
                self.home_facility = e.home_facility;
                self.role_assignments = e.role_assignments.clone();
                self.active = true;
                self.created = true;
            }
            UserEvent::RoleAssignmentsReplaced(e) => {
                self.role_assignments = e.role_assignments.clone();
            }
            UserEvent::HomeFacilityChanged(e) => self.home_facility = e.home_facility,
            UserEvent::Deactivated(_) => self.active = false,
            UserEvent::Activated(_) => self.active = true,
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            UserCommand::Create(cmd) => self.handle_create(cmd),
            UserCommand::ReplaceRoleAssignments(cmd) => self.handle_replace(cmd),
            UserCommand::ChangeHomeFacility(cmd) => self.handle_change_home_facility(cmd),
            UserCommand::Deactivate(cmd) => self.handle_deactivate(cmd),
            UserCommand::Activate(cmd) => self.handle_activate(cmd),
        }
    }
}

impl User {
    fn handle_create(&self, cmd: &CreateUser) -> RightsResult<Vec<UserEvent>> {
        if self.created {
            return Err(DomainError::conflict("user already exists").into());
        }
        self.ensure_user_id(cmd.user_id)?;

        let username = cmd.username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username cannot be empty").into());
        }
        ensure_valid(&cmd.role_assignments)?;

        Ok(vec![UserEvent::Created(UserCreated {
            user_id: cmd.user_id,
            username: username.to_string(),
            home_facility: cmd.home_facility,
            role_assignments: cmd.role_assignments.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_replace(&self, cmd: &ReplaceRoleAssignments) -> RightsResult<Vec<UserEvent>> {
        self.ensure_exists(cmd.user_id)?;
        cmd.expected_version.check(self.version)?;

        if !self.active && !cmd.role_assignments.is_empty() {
            return Err(DomainError::invariant("user is inactive").into());
        }
        ensure_valid(&cmd.role_assignments)?;

        tracing::debug!(
            user_id = %cmd.user_id,
            assignments = cmd.role_assignments.len(),
            "replacing role assignments"
        );

        Ok(vec![UserEvent::RoleAssignmentsReplaced(RoleAssignmentsReplaced {
            user_id: cmd.user_id,
            role_assignments: cmd.role_assignments.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_home_facility(&self, cmd: &ChangeHomeFacility) -> RightsResult<Vec<UserEvent>> {
        self.ensure_exists(cmd.user_id)?;

        if self.home_facility == cmd.home_facility {
            return Ok(Vec::new());
        }

        Ok(vec![UserEvent::HomeFacilityChanged(HomeFacilityChanged {
            user_id: cmd.user_id,
            home_facility: cmd.home_facility,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_deactivate(&self, cmd: &DeactivateUser) -> RightsResult<Vec<UserEvent>> {
        self.ensure_exists(cmd.user_id)?;

        if !self.active {
            return Err(DomainError::invariant("user already inactive").into());
        }

        Ok(vec![UserEvent::Deactivated(UserDeactivated {
            user_id: cmd.user_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_activate(&self, cmd: &ActivateUser) -> RightsResult<Vec<UserEvent>> {
        self.ensure_exists(cmd.user_id)?;

        if self.active {
            return Err(DomainError::invariant("user already active").into());
        }

        Ok(vec![UserEvent::Activated(UserActivated {
            user_id: cmd.user_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
