//! Flat, serializable view of role assignments for listings and exports.

use serde::{Deserialize, Serialize};

use refdata_core::{FacilityId, ProgramId, RoleId, SupervisoryNodeId};

use crate::{AssignmentKind, RoleAssignment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentView {
    pub kind: AssignmentKind,
    pub role_id: RoleId,
    pub role_name: String,
    pub program_id: Option<ProgramId>,
    pub supervisory_node_id: Option<SupervisoryNodeId>,
    pub warehouse_id: Option<FacilityId>,
}

impl From<&RoleAssignment> for RoleAssignmentView {
    fn from(assignment: &RoleAssignment) -> Self {
        let role = assignment.role();
        let (program_id, supervisory_node_id, warehouse_id) = match assignment {
            RoleAssignment::Direct(_) => (None, None, None),
            RoleAssignment::Supervision(s) => (Some(s.program()), s.supervisory_node(), None),
            RoleAssignment::Fulfillment(f) => (None, None, Some(f.warehouse())),
        };

        Self {
            kind: assignment.kind(),
            role_id: role.role_id(),
            role_name: role.name().to_string(),
            program_id,
            supervisory_node_id,
            warehouse_id,
        }
    }
}
