//! In-memory reference-data catalog backing every lookup collaborator.
//!
//! A catalog is built once from a [`CatalogSnapshot`] and never mutated;
//! updates replace the whole catalog (see [`crate::shared::SharedCatalog`]).

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use refdata_auth::lookup::{
    FacilityLookup, FacilityProgramLookup, ProgramLookup, RequisitionGroupLookup, RightLookup,
    RoleLookup, SupervisoryNodeLookup,
};
use refdata_auth::{Facility, Program, RequisitionGroup, Right, Role, SupervisoryNode};
use refdata_core::{
    Code, DomainError, DomainResult, FacilityId, ProgramId, RightId, RoleId, SupervisoryNodeId,
};

/// A facility supporting a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityProgramSupport {
    pub facility: FacilityId,
    pub program: ProgramId,
}

/// Serialized form of the whole reference-data set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    pub rights: Vec<Right>,
    pub roles: Vec<Role>,
    pub programs: Vec<Program>,
    pub facilities: Vec<Facility>,
    pub supervisory_nodes: Vec<SupervisoryNode>,
    pub requisition_groups: Vec<RequisitionGroup>,
    pub facility_programs: Vec<FacilityProgramSupport>,
}

#[derive(Debug, Default)]
pub struct ReferenceCatalog {
    rights: HashMap<RightId, Right>,
    roles: HashMap<RoleId, Role>,
    programs: HashMap<ProgramId, Program>,
    program_codes: HashMap<Code, ProgramId>,
    facilities: HashMap<FacilityId, Facility>,
    facility_codes: HashMap<Code, FacilityId>,
    nodes: HashMap<SupervisoryNodeId, SupervisoryNode>,
    node_codes: HashMap<Code, SupervisoryNodeId>,
    children: HashMap<SupervisoryNodeId, Vec<SupervisoryNodeId>>,
    groups: HashMap<(SupervisoryNodeId, ProgramId), Vec<RequisitionGroup>>,
    facility_programs: HashMap<FacilityId, Vec<ProgramId>>,
}

impl ReferenceCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index a snapshot, rejecting duplicates and dangling references.
    ///
    /// Parent links are only checked for existence; loops are reported by the
    /// hierarchy walks that run into them.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> DomainResult<Self> {
        let mut catalog = Self::default();

        for right in snapshot.rights {
            if catalog.rights.insert(right.id, right.clone()).is_some() {
                return Err(DomainError::conflict(format!("duplicate right {}", right.id)));
            }
        }

        for role in snapshot.roles {
            if let Some(missing) = role
                .rights()
                .iter()
                .find(|r| !catalog.rights.contains_key(&r.id))
            {
                return Err(DomainError::validation(format!(
                    "role '{}' references unknown right {}",
                    role.name(),
                    missing.id
                )));
            }
            if catalog.roles.insert(role.role_id(), role.clone()).is_some() {
                return Err(DomainError::conflict(format!("duplicate role {}", role.role_id())));
            }
        }

        for program in snapshot.programs {
            if catalog.programs.contains_key(&program.id) {
                return Err(DomainError::conflict(format!("duplicate program id {}", program.id)));
            }
            index_code(&mut catalog.program_codes, &program.code, program.id, "program")?;
            catalog.programs.insert(program.id, program);
        }

        for facility in snapshot.facilities {
            if catalog.facilities.contains_key(&facility.id) {
                return Err(DomainError::conflict(format!("duplicate facility id {}", facility.id)));
            }
            index_code(&mut catalog.facility_codes, &facility.code, facility.id, "facility")?;
            catalog.facilities.insert(facility.id, facility);
        }

        let mut node_ids = HashSet::with_capacity(snapshot.supervisory_nodes.len());
        for node in &snapshot.supervisory_nodes {
            if !node_ids.insert(node.id) {
                return Err(DomainError::conflict(format!(
                    "duplicate supervisory node id {}",
                    node.id
                )));
            }
            index_code(&mut catalog.node_codes, &node.code, node.id, "supervisory node")?;
        }
        for node in snapshot.supervisory_nodes {
            if let Some(parent) = node.parent {
                if !node_ids.contains(&parent) {
                    return Err(DomainError::validation(format!(
                        "supervisory node '{}' has unknown parent {parent}",
                        node.code
                    )));
                }
                catalog.children.entry(parent).or_default().push(node.id);
            }
            catalog.nodes.insert(node.id, node);
        }

        for group in snapshot.requisition_groups {
            if !catalog.nodes.contains_key(&group.supervisory_node) {
                return Err(DomainError::validation(format!(
                    "requisition group '{}' references unknown supervisory node {}",
                    group.code, group.supervisory_node
                )));
            }
            if !catalog.programs.contains_key(&group.program) {
                return Err(DomainError::validation(format!(
                    "requisition group '{}' references unknown program {}",
                    group.code, group.program
                )));
            }
            if let Some(missing) = group
                .member_facilities
                .iter()
                .find(|f| !catalog.facilities.contains_key(f))
            {
                return Err(DomainError::validation(format!(
                    "requisition group '{}' references unknown facility {missing}",
                    group.code
                )));
            }
            catalog
                .groups
                .entry((group.supervisory_node, group.program))
                .or_default()
                .push(group);
        }

        for support in snapshot.facility_programs {
            if !catalog.facilities.contains_key(&support.facility)
                || !catalog.programs.contains_key(&support.program)
            {
                return Err(DomainError::validation(format!(
                    "facility program support references unknown facility {} or program {}",
                    support.facility, support.program
                )));
            }
            let programs = catalog.facility_programs.entry(support.facility).or_default();
            if !programs.contains(&support.program) {
                programs.push(support.program);
            }
        }

        tracing::debug!(
            rights = catalog.rights.len(),
            roles = catalog.roles.len(),
            programs = catalog.programs.len(),
            facilities = catalog.facilities.len(),
            nodes = catalog.nodes.len(),
            "indexed reference catalog"
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let snapshot: CatalogSnapshot =
            serde_json::from_str(json).context("failed to parse catalog snapshot")?;
        Self::from_snapshot(snapshot).context("invalid catalog snapshot")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog snapshot {}", path.display()))?;
        let catalog = Self::from_json(&json)
            .with_context(|| format!("failed to load catalog snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded catalog snapshot");
        Ok(catalog)
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every facility reachable from some requisition group, for diagnostics.
    pub fn grouped_facilities(&self) -> BTreeSet<FacilityId> {
        self.groups
            .values()
            .flatten()
            .flat_map(|g| g.member_facilities.iter().copied())
            .collect()
    }
}

fn index_code<I: Copy>(
    index: &mut HashMap<Code, I>,
    code: &Code,
    id: I,
    what: &str,
) -> DomainResult<()> {
    if index.insert(code.clone(), id).is_some() {
        return Err(DomainError::conflict(format!("duplicate {what} code '{code}'")));
    }
    Ok(())
}

impl RightLookup for ReferenceCatalog {
    fn find_right_by_id(&self, id: RightId) -> Option<Right> {
        self.rights.get(&id).cloned()
    }
}

impl RoleLookup for ReferenceCatalog {
    fn find_role_by_id(&self, id: RoleId) -> Option<Role> {
        self.roles.get(&id).cloned()
    }
}

impl ProgramLookup for ReferenceCatalog {
    fn find_program_by_code(&self, code: &Code) -> Option<Program> {
        self.program_codes
            .get(code)
            .and_then(|id| self.programs.get(id))
            .cloned()
    }

    fn find_program_by_id(&self, id: ProgramId) -> Option<Program> {
        self.programs.get(&id).cloned()
    }
}

impl FacilityLookup for ReferenceCatalog {
    fn find_facility_by_code(&self, code: &Code) -> Option<Facility> {
        self.facility_codes
            .get(code)
            .and_then(|id| self.facilities.get(id))
            .cloned()
    }

    fn find_facility_by_id(&self, id: FacilityId) -> Option<Facility> {
        self.facilities.get(&id).cloned()
    }
}

impl SupervisoryNodeLookup for ReferenceCatalog {
    fn find_node_by_code(&self, code: &Code) -> Option<SupervisoryNode> {
        self.node_codes
            .get(code)
            .and_then(|id| self.nodes.get(id))
            .cloned()
    }

    fn find_node_by_id(&self, id: SupervisoryNodeId) -> Option<SupervisoryNode> {
        self.nodes.get(&id).cloned()
    }

    fn children_of(&self, id: SupervisoryNodeId) -> Vec<SupervisoryNodeId> {
        self.children.get(&id).cloned().unwrap_or_default()
    }

    fn parent_of(&self, id: SupervisoryNodeId) -> Option<SupervisoryNodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }
}

impl RequisitionGroupLookup for ReferenceCatalog {
    fn find_groups_for_node_and_program(
        &self,
        node: SupervisoryNodeId,
        program: ProgramId,
    ) -> Vec<RequisitionGroup> {
        self.groups.get(&(node, program)).cloned().unwrap_or_default()
    }
}

impl FacilityProgramLookup for ReferenceCatalog {
    fn programs_for_facility(&self, facility: FacilityId) -> Vec<Program> {
        self.facility_programs
            .get(&facility)
            .into_iter()
            .flatten()
            .filter_map(|id| self.programs.get(id).cloned())
            .collect()
    }
}
