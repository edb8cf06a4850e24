//! Scoped right queries.

use serde::{Deserialize, Serialize};

use refdata_core::{FacilityId, ProgramId, RightId, ValueObject};

use crate::lookup::{FacilityLookup, ProgramLookup, RightLookup};
use crate::{RightsError, RightsResult};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
enum QueryScope {
    Unscoped,
    Supervision {
        program: ProgramId,
        facility: FacilityId,
    },
    Fulfillment {
        warehouse: FacilityId,
    },
}

/// "Does this right apply here?"
///
/// A query carries either no scope, a program+facility pair (supervision), or
/// a warehouse (fulfillment). Invalid combinations cannot be constructed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RightQuery {
    right: RightId,
    #[serde(flatten)]
    scope: QueryScope,
}

impl ValueObject for RightQuery {}

impl RightQuery {
    pub fn new(right: RightId) -> Self {
        Self {
            right,
            scope: QueryScope::Unscoped,
        }
    }

    pub fn supervision(right: RightId, program: ProgramId, facility: FacilityId) -> Self {
        Self {
            right,
            scope: QueryScope::Supervision { program, facility },
        }
    }

    pub fn fulfillment(right: RightId, warehouse: FacilityId) -> Self {
        Self {
            right,
            scope: QueryScope::Fulfillment { warehouse },
        }
    }

    /// Build a query from optional parts, as they arrive from a request.
    pub fn from_parts(
        right: Option<RightId>,
        program: Option<ProgramId>,
        facility: Option<FacilityId>,
        warehouse: Option<FacilityId>,
    ) -> RightsResult<Self> {
        let Some(right) = right else {
            return Err(RightsError::invalid_query("right is required"));
        };

        match (program, facility, warehouse) {
            (None, None, None) => Ok(Self::new(right)),
            (Some(program), Some(facility), None) => Ok(Self::supervision(right, program, facility)),
            (None, None, Some(warehouse)) => Ok(Self::fulfillment(right, warehouse)),
            (Some(_), None, _) => Err(RightsError::invalid_query(
                "program was given without a facility",
            )),
            (None, Some(_), _) => Err(RightsError::invalid_query(
                "facility was given without a program",
            )),
            (Some(_), Some(_), Some(_)) => Err(RightsError::invalid_query(
                "warehouse cannot be combined with program and facility",
            )),
        }
    }

    /// Like `from_parts`, but every referenced id must resolve.
    pub fn resolve<L>(
        lookup: &L,
        right: RightId,
        program: Option<ProgramId>,
        facility: Option<FacilityId>,
        warehouse: Option<FacilityId>,
    ) -> RightsResult<Self>
    where
        L: RightLookup + ProgramLookup + FacilityLookup + ?Sized,
    {
        let query = Self::from_parts(Some(right), program, facility, warehouse)?;

        if lookup.find_right_by_id(right).is_none() {
            return Err(RightsError::UnknownRight(right));
        }
        if let Some(program) = query.program() {
            if lookup.find_program_by_id(program).is_none() {
                return Err(RightsError::UnknownProgram(program.to_string()));
            }
        }
        for facility in query.facility().into_iter().chain(query.warehouse()) {
            if lookup.find_facility_by_id(facility).is_none() {
                return Err(RightsError::UnknownFacility(facility.to_string()));
            }
        }

        Ok(query)
    }

    pub fn right(&self) -> RightId {
        self.right
    }

    pub fn program(&self) -> Option<ProgramId> {
        self.supervision_scope().map(|(program, _)| program)
    }

    pub fn facility(&self) -> Option<FacilityId> {
        self.supervision_scope().map(|(_, facility)| facility)
    }

    pub fn warehouse(&self) -> Option<FacilityId> {
        match self.scope {
            QueryScope::Fulfillment { warehouse } => Some(warehouse),
            _ => None,
        }
    }

    pub fn supervision_scope(&self) -> Option<(ProgramId, FacilityId)> {
        match self.scope {
            QueryScope::Supervision { program, facility } => Some((program, facility)),
            _ => None,
        }
    }

    pub fn is_unscoped(&self) -> bool {
        self.scope == QueryScope::Unscoped
    }
}

impl core::fmt::Display for RightQuery {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.scope {
            QueryScope::Unscoped => write!(f, "right {}", self.right),
            QueryScope::Supervision { program, facility } => write!(
                f,
                "right {} for program {} at facility {}",
                self.right, program, facility
            ),
            QueryScope::Fulfillment { warehouse } => {
                write!(f, "right {} at warehouse {}", self.right, warehouse)
            }
        }
    }
}
