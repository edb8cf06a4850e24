//! Role assignments: a role granted to a user within a scope.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use refdata_core::{FacilityId, ProgramId, RightId, RoleId, SupervisoryNodeId};

use crate::{RightType, RightsError, RightsResult, Role};

/// Which variant an assignment is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    Direct,
    Supervision,
    Fulfillment,
}

impl AssignmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentKind::Direct => "direct",
            AssignmentKind::Supervision => "supervision",
            AssignmentKind::Fulfillment => "fulfillment",
        }
    }

    fn accepts(&self, right_type: RightType) -> bool {
        match self {
            AssignmentKind::Direct => {
                matches!(right_type, RightType::GeneralAdmin | RightType::Reports)
            }
            AssignmentKind::Supervision => right_type == RightType::Supervision,
            AssignmentKind::Fulfillment => right_type == RightType::OrderFulfillment,
        }
    }
}

impl core::fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an assignment within a user's set: (kind, role, scope).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentKey {
    pub kind: AssignmentKind,
    pub role: RoleId,
    pub program: Option<ProgramId>,
    pub supervisory_node: Option<SupervisoryNodeId>,
    pub warehouse: Option<FacilityId>,
}

impl core::fmt::Display for AssignmentKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} role {}", self.kind, self.role)?;
        if let Some(program) = self.program {
            write!(f, " program {program}")?;
        }
        if let Some(node) = self.supervisory_node {
            write!(f, " node {node}")?;
        }
        if let Some(warehouse) = self.warehouse {
            write!(f, " warehouse {warehouse}")?;
        }
        Ok(())
    }
}

/// Scope-free grant, e.g. a global administration right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectRoleAssignment {
    role: Role,
}

/// Grant over a program, either at the user's home facility (no node) or over
/// every facility below a supervisory node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisionRoleAssignment {
    role: Role,
    program: ProgramId,
    supervisory_node: Option<SupervisoryNodeId>,
}

impl SupervisionRoleAssignment {
    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn supervisory_node(&self) -> Option<SupervisoryNodeId> {
        self.supervisory_node
    }

    pub fn is_home_facility_supervision(&self) -> bool {
        self.supervisory_node.is_none()
    }
}

/// Grant at exactly one warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentRoleAssignment {
    role: Role,
    warehouse: FacilityId,
}

impl FulfillmentRoleAssignment {
    pub fn warehouse(&self) -> FacilityId {
        self.warehouse
    }
}

/// A role granted to a user. Owned by exactly one user.
///
/// Every value, including one read back from JSON or an event stream, has
/// passed the same role check as the constructors: the role is non-empty and
/// its right type fits the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoleAssignmentRecord", into = "RoleAssignmentRecord")]
pub enum RoleAssignment {
    Direct(DirectRoleAssignment),
    Supervision(SupervisionRoleAssignment),
    Fulfillment(FulfillmentRoleAssignment),
}

impl RoleAssignment {
    pub fn direct(role: Role) -> RightsResult<Self> {
        check_role(&role, AssignmentKind::Direct)?;
        Ok(Self::Direct(DirectRoleAssignment { role }))
    }

    /// Home-facility supervision: scope is the owning user's home facility.
    pub fn supervision(role: Role, program: ProgramId) -> RightsResult<Self> {
        check_role(&role, AssignmentKind::Supervision)?;
        Ok(Self::Supervision(SupervisionRoleAssignment {
            role,
            program,
            supervisory_node: None,
        }))
    }

    pub fn supervision_at_node(
        role: Role,
        program: ProgramId,
        supervisory_node: SupervisoryNodeId,
    ) -> RightsResult<Self> {
        check_role(&role, AssignmentKind::Supervision)?;
        Ok(Self::Supervision(SupervisionRoleAssignment {
            role,
            program,
            supervisory_node: Some(supervisory_node),
        }))
    }

    pub fn fulfillment(role: Role, warehouse: FacilityId) -> RightsResult<Self> {
        check_role(&role, AssignmentKind::Fulfillment)?;
        Ok(Self::Fulfillment(FulfillmentRoleAssignment { role, warehouse }))
    }

    pub fn role(&self) -> &Role {
        match self {
            RoleAssignment::Direct(a) => &a.role,
            RoleAssignment::Supervision(a) => &a.role,
            RoleAssignment::Fulfillment(a) => &a.role,
        }
    }

    pub fn kind(&self) -> AssignmentKind {
        match self {
            RoleAssignment::Direct(_) => AssignmentKind::Direct,
            RoleAssignment::Supervision(_) => AssignmentKind::Supervision,
            RoleAssignment::Fulfillment(_) => AssignmentKind::Fulfillment,
        }
    }

    pub fn key(&self) -> AssignmentKey {
        let mut key = AssignmentKey {
            kind: self.kind(),
            role: self.role().role_id(),
            program: None,
            supervisory_node: None,
            warehouse: None,
        };
        match self {
            RoleAssignment::Direct(_) => {}
            RoleAssignment::Supervision(a) => {
                key.program = Some(a.program);
                key.supervisory_node = a.supervisory_node;
            }
            RoleAssignment::Fulfillment(a) => key.warehouse = Some(a.warehouse),
        }
        key
    }

    /// Whether the assigned role carries `right`, ignoring scope.
    pub fn carries(&self, right: RightId) -> bool {
        self.role().has_right(right)
    }

    /// Re-run the role check for this variant.
    pub fn validate(&self) -> RightsResult<()> {
        check_role(self.role(), self.kind())
    }
}

/// Wire form of [`RoleAssignment`], tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleAssignmentRecord {
    Direct {
        role: Role,
    },
    Supervision {
        role: Role,
        program: ProgramId,
        #[serde(default)]
        supervisory_node: Option<SupervisoryNodeId>,
    },
    Fulfillment {
        role: Role,
        warehouse: FacilityId,
    },
}

impl TryFrom<RoleAssignmentRecord> for RoleAssignment {
    type Error = RightsError;

    fn try_from(value: RoleAssignmentRecord) -> Result<Self, Self::Error> {
        match value {
            RoleAssignmentRecord::Direct { role } => RoleAssignment::direct(role),
            RoleAssignmentRecord::Supervision {
                role,
                program,
                supervisory_node: None,
            } => RoleAssignment::supervision(role, program),
            RoleAssignmentRecord::Supervision {
                role,
                program,
                supervisory_node: Some(node),
            } => RoleAssignment::supervision_at_node(role, program, node),
            RoleAssignmentRecord::Fulfillment { role, warehouse } => {
                RoleAssignment::fulfillment(role, warehouse)
            }
        }
    }
}

impl From<RoleAssignment> for RoleAssignmentRecord {
    fn from(value: RoleAssignment) -> Self {
        match value {
            RoleAssignment::Direct(a) => RoleAssignmentRecord::Direct { role: a.role },
            RoleAssignment::Supervision(a) => RoleAssignmentRecord::Supervision {
                role: a.role,
                program: a.program,
                supervisory_node: a.supervisory_node,
            },
            RoleAssignment::Fulfillment(a) => RoleAssignmentRecord::Fulfillment {
                role: a.role,
                warehouse: a.warehouse,
            },
        }
    }
}

fn check_role(role: &Role, kind: AssignmentKind) -> RightsResult<()> {
    let Some(right_type) = role.right_type() else {
        return Err(RightsError::EmptyRoleRights {
            role: role.name().to_string(),
        });
    };
    if !kind.accepts(right_type) {
        return Err(RightsError::RightTypeMismatch {
            role: role.name().to_string(),
            actual: right_type,
            assignment: kind.as_str(),
        });
    }
    Ok(())
}

/// Check every assignment in a desired set, then its uniqueness.
pub fn ensure_valid(assignments: &[RoleAssignment]) -> RightsResult<()> {
    for assignment in assignments {
        assignment.validate()?;
    }
    ensure_unique(assignments)
}

/// Reject a desired assignment set holding the same (kind, role, scope) twice.
pub fn ensure_unique(assignments: &[RoleAssignment]) -> RightsResult<()> {
    let mut seen = HashSet::with_capacity(assignments.len());
    for assignment in assignments {
        let key = assignment.key();
        if !seen.insert(key) {
            return Err(RightsError::DuplicateRoleAssignment(key.to_string()));
        }
    }
    Ok(())
}
