//! Bulk "who can act here" queries over a set of users.

use refdata_core::{FacilityId, ProgramId, RightId, SupervisoryNodeId};

use crate::authorize::RightsResolver;
use crate::hierarchy::SubtreeExpander;
use crate::lookup::HierarchyLookup;
use crate::{RightQuery, RightsResult, RoleAssignment, User};

/// Users holding `right` through a direct assignment.
pub fn users_with_direct_right(users: &[User], right: RightId) -> Vec<&User> {
    users
        .iter()
        .filter(|user| {
            user.role_assignments()
                .iter()
                .any(|a| matches!(a, RoleAssignment::Direct(_)) && a.carries(right))
        })
        .collect()
}

pub fn users_with_fulfillment_right(
    users: &[User],
    right: RightId,
    warehouse: FacilityId,
) -> Vec<&User> {
    users
        .iter()
        .filter(|user| {
            user.role_assignments().iter().any(|a| match a {
                RoleAssignment::Fulfillment(f) => f.warehouse() == warehouse && a.carries(right),
                _ => false,
            })
        })
        .collect()
}

/// Users supervising exactly `node` for `program` with `right`.
///
/// No hierarchy walk: a supervisor of an ancestor node is not returned.
pub fn supervising_users(
    users: &[User],
    right: RightId,
    node: SupervisoryNodeId,
    program: ProgramId,
) -> Vec<&User> {
    users
        .iter()
        .filter(|user| {
            user.role_assignments().iter().any(|a| match a {
                RoleAssignment::Supervision(s) => {
                    s.supervisory_node() == Some(node) && s.program() == program && a.carries(right)
                }
                _ => false,
            })
        })
        .collect()
}

/// Users for whom `has_right(right, program, facility)` holds.
///
/// Subtree expansions are shared across all users of the call.
pub fn users_who_can_supervise<'u, L>(
    users: &'u [User],
    right: RightId,
    program: ProgramId,
    facility: FacilityId,
    lookup: &L,
) -> RightsResult<Vec<&'u User>>
where
    L: HierarchyLookup + ?Sized,
{
    let resolver = RightsResolver::new(lookup);
    let mut expander = SubtreeExpander::new(lookup);
    let query = RightQuery::supervision(right, program, facility);

    let mut matched = Vec::new();
    for user in users {
        if resolver.has_right_with(&mut expander, user, &query)? {
            matched.push(user);
        }
    }

    tracing::debug!(
        right = %right,
        program = %program,
        facility = %facility,
        candidates = users.len(),
        matched = matched.len(),
        "resolved supervisors for facility"
    );
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use crate::{RightType, RightsError};
    use refdata_core::UserId;

    fn user(name: &str, assignments: Vec<RoleAssignment>) -> User {
        User::new(UserId::new(), name)
            .with_role_assignments(assignments)
            .unwrap()
    }

    fn names<'a>(users: &[&'a User]) -> Vec<&'a str> {
        users.iter().map(|u| u.username.as_str()).collect()
    }

    #[test]
    fn direct_and_fulfillment_holders() {
        let mut fx = Fixture::new();
        let manage = fx.right("USERS_MANAGE", RightType::GeneralAdmin);
        let edit = fx.right("ORDERS_EDIT", RightType::OrderFulfillment);
        let admin = fx.role("Admin", &[&manage]);
        let clerk = fx.role("Clerk", &[&edit]);
        let w1 = fx.facility("W1");
        let w2 = fx.facility("W2");

        let users = vec![
            user("ada", vec![RoleAssignment::direct(admin).unwrap()]),
            user("bob", vec![RoleAssignment::fulfillment(clerk.clone(), w1).unwrap()]),
            user("cyd", vec![RoleAssignment::fulfillment(clerk, w2).unwrap()]),
        ];

        assert_eq!(names(&users_with_direct_right(&users, manage.id)), vec!["ada"]);
        assert!(users_with_direct_right(&users, edit.id).is_empty());
        assert_eq!(
            names(&users_with_fulfillment_right(&users, edit.id, w1)),
            vec!["bob"]
        );
    }

    #[test]
    fn exact_node_supervisors_versus_subtree_supervisors() {
        let mut fx = Fixture::new();
        let approve = fx.right("REQUISITION_APPROVE", RightType::Supervision);
        let role = fx.role("Supervisor", &[&approve]);
        let program = fx.program("FP");
        let root = fx.node("ROOT", None);
        let child = fx.node("CHILD", Some(root));
        let facility = fx.group(child, program);

        let users = vec![
            user(
                "top",
                vec![RoleAssignment::supervision_at_node(role.clone(), program, root).unwrap()],
            ),
            user(
                "low",
                vec![RoleAssignment::supervision_at_node(role, program, child).unwrap()],
            ),
            user("none", vec![]),
        ];

        assert_eq!(
            names(&supervising_users(&users, approve.id, child, program)),
            vec!["low"]
        );
        let supervisors =
            users_who_can_supervise(&users, approve.id, program, facility, &fx).unwrap();
        assert_eq!(names(&supervisors), vec!["top", "low"]);
    }

    #[test]
    fn cycle_fails_the_whole_bulk_query() {
        let mut fx = Fixture::new();
        let approve = fx.right("REQUISITION_APPROVE", RightType::Supervision);
        let role = fx.role("Supervisor", &[&approve]);
        let program = fx.program("FP");
        let a = fx.node("A", None);
        let b = fx.node("B", Some(a));
        fx.set_parent(a, b);

        let users = vec![user(
            "loop",
            vec![RoleAssignment::supervision_at_node(role, program, a).unwrap()],
        )];
        let err = users_who_can_supervise(&users, approve.id, program, FacilityId::new(), &fx)
            .unwrap_err();
        assert!(matches!(err, RightsError::HierarchyCycleDetected { .. }));
    }
}
