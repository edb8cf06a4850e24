//! Reference entities the engine only knows by identity.

use serde::{Deserialize, Serialize};

use refdata_core::{Code, Entity, FacilityId, ProgramId};

/// A health/logistics program (e.g. "Family Planning").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub code: Code,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Program {
    pub fn new(id: ProgramId, code: Code, name: impl Into<String>) -> Self {
        Self {
            id,
            code,
            name: name.into(),
            active: true,
        }
    }
}

impl Entity for Program {
    type Id = ProgramId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A facility. Warehouses are facilities that fill orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub code: Code,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Facility {
    pub fn new(id: FacilityId, code: Code, name: impl Into<String>) -> Self {
        Self {
            id,
            code,
            name: name.into(),
            active: true,
        }
    }
}

impl Entity for Facility {
    type Id = FacilityId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn default_active() -> bool {
    true
}
