//! Role search parameters (`?rightId=..&rightId=..`).

use std::collections::BTreeSet;

use refdata_core::{DomainResult, RightId};

use crate::Role;

const RIGHT_ID: &str = "rightId";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSearchParams {
    right_ids: BTreeSet<RightId>,
}

impl RoleSearchParams {
    /// Collects every `rightId` value; other keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut right_ids = BTreeSet::new();
        for (key, value) in pairs {
            if key.as_ref() == RIGHT_ID {
                right_ids.insert(value.as_ref().trim().parse::<RightId>()?);
            }
        }
        Ok(Self { right_ids })
    }

    pub fn right_ids(&self) -> &BTreeSet<RightId> {
        &self.right_ids
    }

    /// A role matches when it carries any requested right, or when none was requested.
    pub fn matches(&self, role: &Role) -> bool {
        self.right_ids.is_empty() || self.right_ids.iter().any(|id| role.has_right(*id))
    }
}

pub fn filter_roles<'r>(roles: &'r [Role], params: &RoleSearchParams) -> Vec<&'r Role> {
    roles.iter().filter(|role| params.matches(role)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Right, RightType};
    use refdata_core::{DomainError, RoleId};

    #[test]
    fn collects_every_right_id() {
        let a = RightId::new();
        let b = RightId::new();
        let params = RoleSearchParams::from_pairs([
            ("rightId", a.to_string()),
            ("name", "ignored".to_string()),
            ("rightId", b.to_string()),
        ])
        .unwrap();
        assert_eq!(params.right_ids(), &BTreeSet::from([a, b]));
    }

    #[test]
    fn no_right_ids_gives_empty_set() {
        let params = RoleSearchParams::from_pairs(Vec::<(String, String)>::new()).unwrap();
        assert!(params.right_ids().is_empty());
    }

    #[test]
    fn malformed_right_id_is_rejected() {
        let err = RoleSearchParams::from_pairs([("rightId", "not-a-uuid")]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn filters_roles_by_any_requested_right() {
        let approve = Right::new("REQUISITION_APPROVE", RightType::Supervision);
        let create = Right::new("REQUISITION_CREATE", RightType::Supervision);
        let approver =
            Role::with_rights(RoleId::new(), "Approver", [approve.clone()]).unwrap();
        let creator = Role::with_rights(RoleId::new(), "Creator", [create]).unwrap();
        let roles = vec![approver, creator];

        let params = RoleSearchParams::from_pairs([("rightId", approve.id.to_string())]).unwrap();
        let found: Vec<&str> = filter_roles(&roles, &params).iter().map(|r| r.name()).collect();
        assert_eq!(found, vec!["Approver"]);

        assert_eq!(filter_roles(&roles, &RoleSearchParams::default()).len(), 2);
    }
}
