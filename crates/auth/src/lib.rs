//! `refdata-auth`: rights resolution over role assignments.
//!
//! Answers "may this user exercise this right here?" from a user's role
//! assignments and the supervisory-node hierarchy. Storage stays behind the
//! lookup traits in [`lookup`]; this crate holds no state between calls.

pub mod assignment;
pub mod authorize;
pub mod builder;
pub mod directory;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod lookup;
pub mod query;
pub mod reference;
pub mod right;
pub mod role;
pub mod search;
pub mod user;

#[cfg(test)]
mod testing;

pub use assignment::{
    AssignmentKey, AssignmentKind, DirectRoleAssignment, FulfillmentRoleAssignment,
    RoleAssignment, RoleAssignmentRecord, SupervisionRoleAssignment, ensure_unique, ensure_valid,
};
pub use authorize::{RightDecision, RightsResolver, home_facility_programs};
pub use builder::{AssignmentBuilder, RoleAssignmentRequest};
pub use directory::{
    supervising_users, users_who_can_supervise, users_with_direct_right,
    users_with_fulfillment_right,
};
pub use error::{RightsError, RightsResult};
pub use export::RoleAssignmentView;
pub use hierarchy::{RequisitionGroup, SubtreeExpander, SupervisoryNode, ancestors};
pub use query::RightQuery;
pub use reference::{Facility, Program};
pub use right::{Right, RightType};
pub use role::{Role, RoleRecord};
pub use search::{RoleSearchParams, filter_roles};
pub use user::{
    ActivateUser, ChangeHomeFacility, CreateUser, DeactivateUser, HomeFacilityChanged,
    ReplaceRoleAssignments, RoleAssignmentsReplaced, USER_AGGREGATE_TYPE, User, UserActivated,
    UserCommand, UserCreated, UserDeactivated, UserEvent, seal_events,
};
