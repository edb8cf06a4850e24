//! Turning role-assignment requests (codes, as they arrive from clients) into
//! validated `RoleAssignment`s.

use serde::{Deserialize, Serialize};

use refdata_core::{Code, FacilityId, RoleId};

use crate::assignment::ensure_unique;
use crate::lookup::{FacilityLookup, ProgramLookup, RoleLookup, SupervisoryNodeLookup};
use crate::{RightsError, RightsResult, RoleAssignment};

/// One requested assignment. The variant follows from which codes are set:
/// program (optionally with node) → supervision, warehouse → fulfillment,
/// neither → direct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentRequest {
    pub role_id: RoleId,
    #[serde(default)]
    pub program_code: Option<String>,
    #[serde(default)]
    pub supervisory_node_code: Option<String>,
    #[serde(default)]
    pub warehouse_code: Option<String>,
}

impl RoleAssignmentRequest {
    pub fn direct(role_id: RoleId) -> Self {
        Self {
            role_id,
            ..Self::default()
        }
    }

    pub fn supervision(role_id: RoleId, program_code: impl Into<String>) -> Self {
        Self {
            role_id,
            program_code: Some(program_code.into()),
            ..Self::default()
        }
    }

    pub fn at_node(mut self, node_code: impl Into<String>) -> Self {
        self.supervisory_node_code = Some(node_code.into());
        self
    }

    pub fn fulfillment(role_id: RoleId, warehouse_code: impl Into<String>) -> Self {
        Self {
            role_id,
            warehouse_code: Some(warehouse_code.into()),
            ..Self::default()
        }
    }
}

/// Validates requests against the reference data lookups.
pub struct AssignmentBuilder<'a, L: ?Sized> {
    lookup: &'a L,
}

impl<'a, L> AssignmentBuilder<'a, L>
where
    L: RoleLookup + ProgramLookup + SupervisoryNodeLookup + FacilityLookup + ?Sized,
{
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    pub fn build(&self, request: &RoleAssignmentRequest) -> RightsResult<RoleAssignment> {
        let result = self.try_build(request);
        if let Err(err) = &result {
            tracing::warn!(role_id = %request.role_id, error = %err, "rejected role assignment");
        }
        result
    }

    /// Builds the full desired set; any invalid or duplicate entry rejects it.
    pub fn build_set(&self, requests: &[RoleAssignmentRequest]) -> RightsResult<Vec<RoleAssignment>> {
        let assignments = requests
            .iter()
            .map(|request| self.build(request))
            .collect::<RightsResult<Vec<_>>>()?;
        ensure_unique(&assignments)?;
        Ok(assignments)
    }

    pub fn resolve_home_facility(&self, code: &str) -> RightsResult<FacilityId> {
        let parsed = parse_code(Some(code))
            .ok_or_else(|| RightsError::UnknownFacility(code.to_string()))??;
        self.lookup
            .find_facility_by_code(&parsed)
            .map(|facility| facility.id)
            .ok_or_else(|| RightsError::UnknownFacility(code.to_string()))
    }

    fn try_build(&self, request: &RoleAssignmentRequest) -> RightsResult<RoleAssignment> {
        let program = parse_code(request.program_code.as_deref()).transpose()?;
        let node = parse_code(request.supervisory_node_code.as_deref()).transpose()?;
        let warehouse = parse_code(request.warehouse_code.as_deref()).transpose()?;

        if warehouse.is_some() && program.is_some() {
            return Err(RightsError::invalid_assignment(
                "warehouse cannot be combined with a program",
            ));
        }
        if node.is_some() && program.is_none() {
            return Err(RightsError::invalid_assignment(
                "supervisory node requires a program",
            ));
        }

        let role = self
            .lookup
            .find_role_by_id(request.role_id)
            .ok_or(RightsError::UnknownRole(request.role_id))?;
        if role.has_no_rights() {
            return Err(RightsError::EmptyRoleRights {
                role: role.name().to_string(),
            });
        }

        if let Some(program_code) = program {
            let program = self
                .lookup
                .find_program_by_code(&program_code)
                .ok_or_else(|| RightsError::UnknownProgram(program_code.to_string()))?;

            return match node {
                Some(node_code) => {
                    let node = self
                        .lookup
                        .find_node_by_code(&node_code)
                        .ok_or_else(|| RightsError::UnknownSupervisoryNode(node_code.to_string()))?;
                    RoleAssignment::supervision_at_node(role, program.id, node.id)
                }
                None => RoleAssignment::supervision(role, program.id),
            };
        }

        if let Some(warehouse_code) = warehouse {
            let warehouse = self
                .lookup
                .find_facility_by_code(&warehouse_code)
                .ok_or_else(|| RightsError::UnknownFacility(warehouse_code.to_string()))?;
            return RoleAssignment::fulfillment(role, warehouse.id);
        }

        RoleAssignment::direct(role)
    }
}

/// Blank codes count as absent.
fn parse_code(raw: Option<&str>) -> Option<RightsResult<Code>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(Code::new(raw).map_err(RightsError::from))
}
