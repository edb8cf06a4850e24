use serde::{Deserialize, Serialize};

use refdata_core::{Entity, RightId};

/// Category of a right.
///
/// The category decides which kind of role assignment may grant it: general
/// administration and report rights are held globally, supervision rights per
/// program and facility, fulfillment rights per warehouse.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RightType {
    GeneralAdmin,
    Supervision,
    OrderFulfillment,
    Reports,
}

impl RightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RightType::GeneralAdmin => "general admin",
            RightType::Supervision => "supervision",
            RightType::OrderFulfillment => "order fulfillment",
            RightType::Reports => "reports",
        }
    }
}

impl core::fmt::Display for RightType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic permission (e.g. "REQUISITION_APPROVE").
///
/// Rights are immutable reference data; equality is by identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Right {
    pub id: RightId,
    pub name: String,
    pub right_type: RightType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Right {
    pub fn new(name: impl Into<String>, right_type: RightType) -> Self {
        Self::with_id(RightId::new(), name, right_type)
    }

    pub fn with_id(id: RightId, name: impl Into<String>, right_type: RightType) -> Self {
        Self {
            id,
            name: name.into(),
            right_type,
            description: None,
        }
    }
}

impl PartialEq for Right {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Right {}

impl core::hash::Hash for Right {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Entity for Right {
    type Id = RightId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Right {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
