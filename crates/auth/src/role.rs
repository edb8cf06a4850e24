use serde::{Deserialize, Serialize};

use refdata_core::{Entity, RightId, RoleId};

use crate::{Right, RightType, RightsError, RightsResult};

/// A named bundle of rights.
///
/// # Invariants
/// - Rights are unique by identity (adding a right twice is a no-op).
/// - All rights share one `RightType`.
///
/// A role may exist without rights while an administrator sets it up; the
/// empty-role check happens when the role is assigned to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoleRecord", into = "RoleRecord")]
pub struct Role {
    id: RoleId,
    name: String,
    description: Option<String>,
    rights: Vec<Right>,
}

impl Role {
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            rights: Vec::new(),
        }
    }

    pub fn with_rights(
        id: RoleId,
        name: impl Into<String>,
        rights: impl IntoIterator<Item = Right>,
    ) -> RightsResult<Self> {
        let mut role = Self::new(id, name);
        for right in rights {
            role.add_right(right)?;
        }
        Ok(role)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_right(&mut self, right: Right) -> RightsResult<()> {
        if let Some(existing) = self.right_type() {
            if existing != right.right_type {
                return Err(RightsError::MixedRightTypes {
                    role: self.name.clone(),
                    existing,
                    added: right.right_type,
                });
            }
        }
        if !self.has_right(right.id) {
            self.rights.push(right);
        }
        Ok(())
    }

    pub fn role_id(&self) -> RoleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn rights(&self) -> &[Right] {
        &self.rights
    }

    pub fn has_right(&self, right: RightId) -> bool {
        self.rights.iter().any(|r| r.id == right)
    }

    pub fn has_no_rights(&self) -> bool {
        self.rights.is_empty()
    }

    /// Category shared by the role's rights, `None` for an empty role.
    pub fn right_type(&self) -> Option<RightType> {
        self.rights.first().map(|r| r.right_type)
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Wire shape of a role; deserialization goes through `Role::with_rights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub rights: Vec<Right>,
}

impl TryFrom<RoleRecord> for Role {
    type Error = RightsError;

    fn try_from(value: RoleRecord) -> Result<Self, Self::Error> {
        let role = Role::with_rights(value.id, value.name, value.rights)?;
        Ok(Role {
            description: value.description,
            ..role
        })
    }
}

impl From<Role> for RoleRecord {
    fn from(value: Role) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            rights: value.rights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supervision_right(name: &str) -> Right {
        Right::new(name, RightType::Supervision)
    }

    #[test]
    fn duplicate_rights_are_collapsed() {
        let approve = supervision_right("REQUISITION_APPROVE");
        let role = Role::with_rights(
            RoleId::new(),
            "Program Supervisor",
            [approve.clone(), approve.clone()],
        )
        .unwrap();

        assert_eq!(role.rights().len(), 1);
        assert!(role.has_right(approve.id));
        assert_eq!(role.right_type(), Some(RightType::Supervision));
    }

    #[test]
    fn mixing_right_types_is_rejected() {
        let mut role = Role::new(RoleId::new(), "Storeroom Manager");
        role.add_right(supervision_right("REQUISITION_CREATE")).unwrap();

        let err = role
            .add_right(Right::new("PODS_MANAGE", RightType::OrderFulfillment))
            .unwrap_err();
        assert!(matches!(
            err,
            RightsError::MixedRightTypes {
                existing: RightType::Supervision,
                added: RightType::OrderFulfillment,
                ..
            }
        ));
    }

    #[test]
    fn empty_role_can_exist() {
        let role = Role::new(RoleId::new(), "Draft");
        assert!(role.has_no_rights());
        assert_eq!(role.right_type(), None);
    }

    #[test]
    fn deserialization_enforces_single_right_type() {
        let record = RoleRecord {
            id: RoleId::new(),
            name: "Broken".to_string(),
            description: None,
            rights: vec![
                Right::new("USERS_MANAGE", RightType::GeneralAdmin),
                Right::new("ORDERS_VIEW", RightType::OrderFulfillment),
            ],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(serde_json::from_str::<Role>(&json).is_err());

        let role = Role::with_rights(
            RoleId::new(),
            "Admin",
            [Right::new("USERS_MANAGE", RightType::GeneralAdmin)],
        )
        .unwrap()
        .with_description("user administration");
        let back: Role = serde_json::from_str(&serde_json::to_string(&role).unwrap()).unwrap();
        assert_eq!(back, role);
        assert_eq!(back.description(), Some("user administration"));
    }
}
