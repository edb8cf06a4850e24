//! Rights resolution: matching queries against a user's role assignments.
//!
//! - No IO beyond the supplied lookups
//! - No state kept between calls (memoization is per call)
//! - No panics

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use refdata_core::{FacilityId, ProgramId, RightId, UserId};

use crate::hierarchy::SubtreeExpander;
use crate::lookup::{FacilityProgramLookup, HierarchyLookup};
use crate::{AssignmentKey, Program, RightQuery, RightsResult, RoleAssignment, User};

/// Answers right queries for users against one hierarchy view.
///
/// A query is granted when at least one of the user's role assignments both
/// carries the queried right and covers the query's scope:
///
/// - a Direct assignment covers every scope, so a global right answers yes for
///   any program or facility the caller names
/// - a Supervision assignment at a node covers the query's facility when that
///   facility belongs to a requisition group for the assigned program anywhere
///   in the node's subtree
/// - a Supervision assignment without a node covers the user's home facility
///   for the assigned program only
/// - a Fulfillment assignment covers exactly its warehouse
///
/// Every operation builds a fresh [`SubtreeExpander`], so subtree walks are
/// shared between the assignments of one call and never between calls. A
/// loop in the supervisory hierarchy fails the call with
/// `HierarchyCycleDetected` instead of producing a partial answer.
///
/// The resolver only borrows the lookup; callers keep that view immutable for
/// the duration of a call (e.g. an `Arc` snapshot of the catalog). The
/// user's `active` flag is not consulted here; callers filter inactive users.
pub struct RightsResolver<'a, L: ?Sized> {
    lookup: &'a L,
}

impl<'a, L> RightsResolver<'a, L>
where
    L: HierarchyLookup + ?Sized,
{
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Whether any of the user's assignments grants `query`.
    pub fn has_right(&self, user: &User, query: &RightQuery) -> RightsResult<bool> {
        let mut expander = SubtreeExpander::new(self.lookup);
        self.has_right_with(&mut expander, user, query)
    }

    /// `has_right` sharing an expander across several users (bulk queries).
    pub(crate) fn has_right_with(
        &self,
        expander: &mut SubtreeExpander<'a, L>,
        user: &User,
        query: &RightQuery,
    ) -> RightsResult<bool> {
        let granted = matching_assignment(expander, user, query)?.is_some();
        tracing::debug!(user_id = %user.id, query = %query, granted, "evaluated right query");
        Ok(granted)
    }

    /// Same decision as `has_right`, with the reasoning spelled out.
    pub fn explain_right(&self, user: &User, query: &RightQuery) -> RightsResult<RightDecision> {
        let mut expander = SubtreeExpander::new(self.lookup);

        if let Some(assignment) = matching_assignment(&mut expander, user, query)? {
            return Ok(RightDecision {
                user_id: user.id,
                query: *query,
                granted: true,
                matched: Some(assignment.key()),
                reason: format!(
                    "granted by {} assignment of role '{}'",
                    assignment.kind(),
                    assignment.role().name()
                ),
                out_of_scope_roles: Vec::new(),
            });
        }

        let mut out_of_scope_roles: Vec<String> = user
            .role_assignments()
            .iter()
            .filter(|a| a.carries(query.right()))
            .map(|a| a.role().name().to_string())
            .collect();
        out_of_scope_roles.sort();
        out_of_scope_roles.dedup();

        let reason = if out_of_scope_roles.is_empty() {
            format!("no assigned role carries right {}", query.right())
        } else {
            format!(
                "roles {:?} carry right {} but not for the requested scope",
                out_of_scope_roles,
                query.right()
            )
        };

        Ok(RightDecision {
            user_id: user.id,
            query: *query,
            granted: false,
            matched: None,
            reason,
            out_of_scope_roles,
        })
    }

    /// Facilities the user may act on for `right` within `program`.
    ///
    /// Union over matching supervision assignments of the node-subtree
    /// expansion, or of the home facility for home-facility supervision.
    pub fn supervised_facilities(
        &self,
        user: &User,
        right: RightId,
        program: ProgramId,
    ) -> RightsResult<BTreeSet<FacilityId>> {
        let mut expander = SubtreeExpander::new(self.lookup);
        let mut facilities = BTreeSet::new();

        for assignment in user.role_assignments() {
            let RoleAssignment::Supervision(supervision) = assignment else {
                continue;
            };
            if supervision.program() != program || !assignment.carries(right) {
                continue;
            }
            match supervision.supervisory_node() {
                Some(node) => facilities.extend(expander.expand(node, program)?.iter().copied()),
                None => facilities.extend(user.home_facility),
            }
        }

        tracing::debug!(
            user_id = %user.id,
            right = %right,
            program = %program,
            facilities = facilities.len(),
            "computed supervised facilities"
        );
        Ok(facilities)
    }

    pub fn fulfillment_facilities(&self, user: &User, right: RightId) -> BTreeSet<FacilityId> {
        user.fulfillment_facilities(right)
    }

    pub fn supervised_programs(&self, user: &User) -> BTreeSet<ProgramId> {
        user.supervised_programs()
    }
}

/// Programs supported at the user's home facility; empty without one.
pub fn home_facility_programs<L>(user: &User, lookup: &L) -> Vec<Program>
where
    L: FacilityProgramLookup + ?Sized,
{
    let Some(home) = user.home_facility else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    lookup
        .programs_for_facility(home)
        .into_iter()
        .filter(|program| seen.insert(program.id))
        .collect()
}

fn matching_assignment<'u, L>(
    expander: &mut SubtreeExpander<'_, L>,
    user: &'u User,
    query: &RightQuery,
) -> RightsResult<Option<&'u RoleAssignment>>
where
    L: HierarchyLookup + ?Sized,
{
    for assignment in user.role_assignments() {
        if assignment_matches(expander, assignment, user.home_facility, query)? {
            return Ok(Some(assignment));
        }
    }
    Ok(None)
}

fn assignment_matches<L>(
    expander: &mut SubtreeExpander<'_, L>,
    assignment: &RoleAssignment,
    home_facility: Option<FacilityId>,
    query: &RightQuery,
) -> RightsResult<bool>
where
    L: HierarchyLookup + ?Sized,
{
    if !assignment.carries(query.right()) {
        return Ok(false);
    }

    match assignment {
        // Direct rights are held globally, whatever scope the caller passed.
        RoleAssignment::Direct(_) => Ok(true),
        RoleAssignment::Supervision(supervision) => {
            let Some((program, facility)) = query.supervision_scope() else {
                return Ok(false);
            };
            if supervision.program() != program {
                return Ok(false);
            }
            match supervision.supervisory_node() {
                Some(node) => expander.contains(node, program, facility),
                None => Ok(home_facility == Some(facility)),
            }
        }
        RoleAssignment::Fulfillment(fulfillment) => {
            Ok(query.warehouse() == Some(fulfillment.warehouse()))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Explanation of a single right decision, for audit logs and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct RightDecision {
    pub user_id: UserId,
    pub query: RightQuery,
    pub granted: bool,

    /// The assignment that granted the right.
    pub matched: Option<AssignmentKey>,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// On denial: assigned roles that carry the right outside the queried scope.
    pub out_of_scope_roles: Vec<String>,
}
