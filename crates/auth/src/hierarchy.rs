//! Supervisory-node hierarchy and subtree expansion.
//!
//! Nodes point at their parent by id only. The hierarchy is expected to be a
//! forest; a loop is a data-integrity violation that every walk detects and
//! reports as `HierarchyCycleDetected` instead of spinning forever.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use refdata_core::{Code, Entity, FacilityId, ProgramId, RequisitionGroupId, SupervisoryNodeId};

use crate::lookup::{HierarchyLookup, SupervisoryNodeLookup};
use crate::{RightsError, RightsResult};

/// A node of the organizational hierarchy used to delegate supervision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisoryNode {
    pub id: SupervisoryNodeId,
    pub code: Code,
    pub name: String,
    #[serde(default)]
    pub parent: Option<SupervisoryNodeId>,
    #[serde(default)]
    pub facility: Option<FacilityId>,
}

impl SupervisoryNode {
    pub fn new(id: SupervisoryNodeId, code: Code, name: impl Into<String>) -> Self {
        Self {
            id,
            code,
            name: name.into(),
            parent: None,
            facility: None,
        }
    }

    pub fn with_parent(mut self, parent: SupervisoryNodeId) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl Entity for SupervisoryNode {
    type Id = SupervisoryNodeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Ties a (supervisory node, program) pair to its member facilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionGroup {
    pub id: RequisitionGroupId,
    pub code: Code,
    pub name: String,
    pub supervisory_node: SupervisoryNodeId,
    pub program: ProgramId,
    #[serde(default)]
    pub member_facilities: BTreeSet<FacilityId>,
}

impl Entity for RequisitionGroup {
    type Id = RequisitionGroupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Expands supervisory subtrees into facility sets.
///
/// The subtree of a node is the node itself plus every node whose parent chain
/// reaches it. Expanding `(node, program)` collects the member facilities of
/// each requisition group for `program` attached to any node of that subtree.
/// Groups for other programs are ignored, so the same node can supervise
/// different facilities per program.
///
/// The walk is an iterative depth-first search over `children_of` with a
/// visited set. Reaching a node twice means the parent links loop, and the
/// walk stops with `HierarchyCycleDetected` naming the node it reached again.
/// Nothing is memoized for a walk that failed.
///
/// One expander lives for a single resolution call. Results are memoized per
/// (node, program) and handed out as shared `Arc` sets, so two assignments
/// reaching the same subtree walk it once. The memo is dropped with the
/// expander; a catalog swap between calls is always observed.
pub struct SubtreeExpander<'a, L: ?Sized> {
    lookup: &'a L,
    memo: HashMap<(SupervisoryNodeId, ProgramId), Arc<BTreeSet<FacilityId>>>,
}

impl<'a, L> SubtreeExpander<'a, L>
where
    L: HierarchyLookup + ?Sized,
{
    pub fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
            memo: HashMap::new(),
        }
    }

    /// Facilities of every requisition group for `program` attached to `node`
    /// or any of its descendants.
    pub fn expand(
        &mut self,
        node: SupervisoryNodeId,
        program: ProgramId,
    ) -> RightsResult<Arc<BTreeSet<FacilityId>>> {
        if let Some(hit) = self.memo.get(&(node, program)) {
            return Ok(Arc::clone(hit));
        }

        let mut visited = HashSet::new();
        let mut stack = vec![node];
        let mut facilities = BTreeSet::new();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                tracing::warn!(root = %node, node = %current, "cycle in supervisory node hierarchy");
                return Err(RightsError::HierarchyCycleDetected { node: current });
            }

            for group in self.lookup.find_groups_for_node_and_program(current, program) {
                facilities.extend(group.member_facilities);
            }
            stack.extend(self.lookup.children_of(current));
        }

        tracing::debug!(
            node = %node,
            program = %program,
            nodes = visited.len(),
            facilities = facilities.len(),
            "expanded supervisory subtree"
        );

        let facilities = Arc::new(facilities);
        self.memo.insert((node, program), Arc::clone(&facilities));
        Ok(facilities)
    }

    pub fn contains(
        &mut self,
        node: SupervisoryNodeId,
        program: ProgramId,
        facility: FacilityId,
    ) -> RightsResult<bool> {
        Ok(self.expand(node, program)?.contains(&facility))
    }
}

/// `node` followed by its ancestors up to the root.
pub fn ancestors<L>(lookup: &L, node: SupervisoryNodeId) -> RightsResult<Vec<SupervisoryNodeId>>
where
    L: SupervisoryNodeLookup + ?Sized,
{
    let mut chain = vec![node];
    let mut seen: HashSet<SupervisoryNodeId> = HashSet::from([node]);
    let mut current = node;

    while let Some(parent) = lookup.parent_of(current) {
        if !seen.insert(parent) {
            tracing::warn!(node = %parent, "cycle in supervisory node parent chain");
            return Err(RightsError::HierarchyCycleDetected { node: parent });
        }
        chain.push(parent);
        current = parent;
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn expansion_collects_the_whole_subtree() {
        let mut fx = Fixture::new();
        let program = fx.program("FP");
        let root = fx.node("N1", None);
        let child = fx.node("N2", Some(root));
        let grandchild = fx.node("N3", Some(child));
        let f1 = fx.group(root, program);
        let f2 = fx.group(child, program);
        let f3 = fx.group(grandchild, program);

        let mut expander = SubtreeExpander::new(&fx);
        let facilities = expander.expand(root, program).unwrap();
        assert_eq!(*facilities, BTreeSet::from([f1, f2, f3]));

        let below = expander.expand(child, program).unwrap();
        assert_eq!(*below, BTreeSet::from([f2, f3]));
    }

    #[test]
    fn expansion_ignores_other_programs() {
        let mut fx = Fixture::new();
        let fp = fx.program("FP");
        let em = fx.program("EM");
        let root = fx.node("N1", None);
        let child = fx.node("N2", Some(root));
        let fp_facility = fx.group(root, fp);
        fx.group(child, em);

        let mut expander = SubtreeExpander::new(&fx);
        assert_eq!(*expander.expand(root, fp).unwrap(), BTreeSet::from([fp_facility]));
    }

    #[test]
    fn cycle_is_reported_not_looped() {
        let mut fx = Fixture::new();
        let program = fx.program("FP");
        let a = fx.node("A", None);
        let b = fx.node("B", Some(a));
        fx.set_parent(a, b);
        fx.group(b, program);

        let mut expander = SubtreeExpander::new(&fx);
        let err = expander.expand(a, program).unwrap_err();
        assert_eq!(err, RightsError::HierarchyCycleDetected { node: a });

        let err = ancestors(&fx, b).unwrap_err();
        assert!(matches!(err, RightsError::HierarchyCycleDetected { .. }));
    }

    #[test]
    fn ancestors_walk_to_the_root() {
        let mut fx = Fixture::new();
        let root = fx.node("ROOT", None);
        let mid = fx.node("MID", Some(root));
        let leaf = fx.node("LEAF", Some(mid));

        assert_eq!(ancestors(&fx, leaf).unwrap(), vec![leaf, mid, root]);
        assert_eq!(ancestors(&fx, root).unwrap(), vec![root]);
    }
}
