//! Lookup collaborators consumed by the rights engine.
//!
//! The engine never owns storage: callers hand it implementations of these
//! traits (an in-memory snapshot, a repository adapter...). Every lookup
//! returns owned values so a resolution works on a stable view.

use std::sync::Arc;

use refdata_core::{Code, FacilityId, ProgramId, RightId, RoleId, SupervisoryNodeId};

use crate::{Facility, Program, RequisitionGroup, Right, Role, SupervisoryNode};

pub trait RightLookup {
    fn find_right_by_id(&self, id: RightId) -> Option<Right>;
}

pub trait RoleLookup {
    fn find_role_by_id(&self, id: RoleId) -> Option<Role>;
}

pub trait ProgramLookup {
    fn find_program_by_code(&self, code: &Code) -> Option<Program>;
    fn find_program_by_id(&self, id: ProgramId) -> Option<Program>;
}

pub trait FacilityLookup {
    fn find_facility_by_code(&self, code: &Code) -> Option<Facility>;
    fn find_facility_by_id(&self, id: FacilityId) -> Option<Facility>;
}

pub trait SupervisoryNodeLookup {
    fn find_node_by_code(&self, code: &Code) -> Option<SupervisoryNode>;
    fn find_node_by_id(&self, id: SupervisoryNodeId) -> Option<SupervisoryNode>;

    /// Direct children of `id`. Order is irrelevant.
    fn children_of(&self, id: SupervisoryNodeId) -> Vec<SupervisoryNodeId>;

    fn parent_of(&self, id: SupervisoryNodeId) -> Option<SupervisoryNodeId> {
        self.find_node_by_id(id).and_then(|node| node.parent)
    }
}

pub trait RequisitionGroupLookup {
    fn find_groups_for_node_and_program(
        &self,
        node: SupervisoryNodeId,
        program: ProgramId,
    ) -> Vec<RequisitionGroup>;
}

/// Facility–program support, used for a user's home-facility programs.
pub trait FacilityProgramLookup {
    fn programs_for_facility(&self, facility: FacilityId) -> Vec<Program>;
}

/// Everything subtree expansion needs.
pub trait HierarchyLookup: SupervisoryNodeLookup + RequisitionGroupLookup {}

impl<T> HierarchyLookup for T where T: SupervisoryNodeLookup + RequisitionGroupLookup + ?Sized {}

impl<S> RightLookup for Arc<S>
where
    S: RightLookup + ?Sized,
{
    fn find_right_by_id(&self, id: RightId) -> Option<Right> {
        (**self).find_right_by_id(id)
    }
}

impl<S> RoleLookup for Arc<S>
where
    S: RoleLookup + ?Sized,
{
    fn find_role_by_id(&self, id: RoleId) -> Option<Role> {
        (**self).find_role_by_id(id)
    }
}

impl<S> ProgramLookup for Arc<S>
where
    S: ProgramLookup + ?Sized,
{
    fn find_program_by_code(&self, code: &Code) -> Option<Program> {
        (**self).find_program_by_code(code)
    }

    fn find_program_by_id(&self, id: ProgramId) -> Option<Program> {
        (**self).find_program_by_id(id)
    }
}

impl<S> FacilityLookup for Arc<S>
where
    S: FacilityLookup + ?Sized,
{
    fn find_facility_by_code(&self, code: &Code) -> Option<Facility> {
        (**self).find_facility_by_code(code)
    }

    fn find_facility_by_id(&self, id: FacilityId) -> Option<Facility> {
        (**self).find_facility_by_id(id)
    }
}

impl<S> SupervisoryNodeLookup for Arc<S>
where
    S: SupervisoryNodeLookup + ?Sized,
{
    fn find_node_by_code(&self, code: &Code) -> Option<SupervisoryNode> {
        (**self).find_node_by_code(code)
    }

    fn find_node_by_id(&self, id: SupervisoryNodeId) -> Option<SupervisoryNode> {
        (**self).find_node_by_id(id)
    }

    fn children_of(&self, id: SupervisoryNodeId) -> Vec<SupervisoryNodeId> {
        (**self).children_of(id)
    }

    fn parent_of(&self, id: SupervisoryNodeId) -> Option<SupervisoryNodeId> {
        (**self).parent_of(id)
    }
}

impl<S> RequisitionGroupLookup for Arc<S>
where
    S: RequisitionGroupLookup + ?Sized,
{
    fn find_groups_for_node_and_program(
        &self,
        node: SupervisoryNodeId,
        program: ProgramId,
    ) -> Vec<RequisitionGroup> {
        (**self).find_groups_for_node_and_program(node, program)
    }
}

impl<S> FacilityProgramLookup for Arc<S>
where
    S: FacilityProgramLookup + ?Sized,
{
    fn programs_for_facility(&self, facility: FacilityId) -> Vec<Program> {
        (**self).programs_for_facility(facility)
    }
}
