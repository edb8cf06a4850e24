//! In-memory, append-only store for user event streams.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use refdata_auth::{RightsError, User, UserCommand, UserEvent, seal_events};
use refdata_core::{Aggregate, UserId};
use refdata_events::EventEnvelope;

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error(transparent)]
    Rights(#[from] RightsError),

    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

/// One stream of sealed `UserEvent`s per user.
///
/// Intended for tests/dev. Commands run under the write lock, so deciding and
/// appending are atomic per store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    streams: RwLock<HashMap<UserId, Vec<EventEnvelope<UserEvent>>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide `command` against the current stream and append the result.
    pub fn execute(
        &self,
        command: &UserCommand,
    ) -> Result<Vec<EventEnvelope<UserEvent>>, UserStoreError> {
        let user_id = command.user_id();
        let mut streams = self
            .streams
            .write()
            .map_err(|_| UserStoreError::Unavailable("lock poisoned".to_string()))?;

        let user = rehydrate(user_id, streams.get(&user_id).map(Vec::as_slice).unwrap_or_default());
        let events = user.handle(command)?;
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let sealed = seal_events(user_id, user.version, events);
        streams
            .entry(user_id)
            .or_default()
            .extend(sealed.iter().cloned());

        tracing::info!(
            user_id = %user_id,
            events = sealed.len(),
            version = user.version + sealed.len() as u64,
            "appended user events"
        );
        Ok(sealed)
    }

    pub fn load(&self, user_id: UserId) -> Result<Option<User>, UserStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| UserStoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(streams.get(&user_id).map(|stream| rehydrate(user_id, stream)))
    }

    /// Every stored user, ordered by username.
    pub fn users(&self) -> Result<Vec<User>, UserStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| UserStoreError::Unavailable("lock poisoned".to_string()))?;
        let mut users: Vec<User> = streams
            .iter()
            .map(|(id, stream)| rehydrate(*id, stream))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    pub fn stream(&self, user_id: UserId) -> Result<Vec<EventEnvelope<UserEvent>>, UserStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| UserStoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(streams.get(&user_id).cloned().unwrap_or_default())
    }
}

fn rehydrate(user_id: UserId, stream: &[EventEnvelope<UserEvent>]) -> User {
    let mut user = User::empty(user_id);
    for envelope in stream {
        user.apply(envelope.payload());
    }
    user
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use refdata_auth::{
        CreateUser, DeactivateUser, ReplaceRoleAssignments, Right, RightType, Role,
        RoleAssignment,
    };
    use refdata_core::{DomainError, ExpectedVersion, RoleId};

    fn create(user_id: UserId, username: &str) -> UserCommand {
        UserCommand::Create(CreateUser {
            user_id,
            username: username.to_string(),
            home_facility: None,
            role_assignments: Vec::new(),
            occurred_at: Utc::now(),
        })
    }

    fn admin_assignment() -> RoleAssignment {
        let right = Right::new("USERS_MANAGE", RightType::GeneralAdmin);
        let role = Role::with_rights(RoleId::new(), "Admin", [right]).unwrap();
        RoleAssignment::direct(role).unwrap()
    }

    #[test]
    fn appends_numbered_envelopes_and_rehydrates() {
        let store = InMemoryUserStore::new();
        let user_id = UserId::new();

        let created = store.execute(&create(user_id, "ada")).unwrap();
        assert_eq!(created[0].sequence_number(), 1);
        assert_eq!(created[0].event_type(), "auth.user.created");
        assert_eq!(created[0].aggregate_type(), refdata_auth::USER_AGGREGATE_TYPE);

        let replaced = store
            .execute(&UserCommand::ReplaceRoleAssignments(ReplaceRoleAssignments {
                user_id,
                role_assignments: vec![admin_assignment()],
                expected_version: ExpectedVersion::Exact(1),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        assert_eq!(replaced[0].sequence_number(), 2);

        let user = store.load(user_id).unwrap().unwrap();
        assert_eq!(user.version, 2);
        assert_eq!(user.role_assignments().len(), 1);
        assert_eq!(store.stream(user_id).unwrap().len(), 2);
    }

    #[test]
    fn stale_replacement_is_a_conflict() {
        let store = InMemoryUserStore::new();
        let user_id = UserId::new();
        store.execute(&create(user_id, "ada")).unwrap();

        let err = store
            .execute(&UserCommand::ReplaceRoleAssignments(ReplaceRoleAssignments {
                user_id,
                role_assignments: vec![admin_assignment()],
                expected_version: ExpectedVersion::Exact(0),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(
            err,
            UserStoreError::Rights(RightsError::Domain(DomainError::Conflict(_)))
        ));
        assert_eq!(store.stream(user_id).unwrap().len(), 1);
    }

    #[test]
    fn failed_command_leaves_no_stream() {
        let store = InMemoryUserStore::new();
        let user_id = UserId::new();

        let err = store
            .execute(&UserCommand::Deactivate(DeactivateUser {
                user_id,
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, UserStoreError::Rights(_)));
        assert!(store.load(user_id).unwrap().is_none());
        assert!(store.users().unwrap().is_empty());
    }

    #[test]
    fn users_are_listed_by_username() {
        let store = InMemoryUserStore::new();
        store.execute(&create(UserId::new(), "zoe")).unwrap();
        store.execute(&create(UserId::new(), "ada")).unwrap();

        let names: Vec<String> = store.users().unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["ada".to_string(), "zoe".to_string()]);
    }
}
