//! In-crate test fixture implementing every lookup collaborator.

use std::collections::{BTreeSet, HashMap};

use refdata_core::{
    Code, FacilityId, ProgramId, RequisitionGroupId, RightId, RoleId, SupervisoryNodeId,
};

use crate::lookup::{
    FacilityLookup, FacilityProgramLookup, ProgramLookup, RequisitionGroupLookup, RightLookup,
    RoleLookup, SupervisoryNodeLookup,
};
use crate::{Facility, Program, RequisitionGroup, Right, RightType, Role, SupervisoryNode};

#[derive(Debug, Default)]
pub(crate) struct Fixture {
    pub rights: HashMap<RightId, Right>,
    pub roles: HashMap<RoleId, Role>,
    pub programs: HashMap<ProgramId, Program>,
    pub facilities: HashMap<FacilityId, Facility>,
    pub nodes: HashMap<SupervisoryNodeId, SupervisoryNode>,
    pub groups: Vec<RequisitionGroup>,
    pub facility_programs: HashMap<FacilityId, Vec<ProgramId>>,
}

pub(crate) fn code(value: &str) -> Code {
    Code::new(value).unwrap()
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn right(&mut self, name: &str, right_type: RightType) -> Right {
        let right = Right::new(name, right_type);
        self.rights.insert(right.id, right.clone());
        right
    }

    pub fn role(&mut self, name: &str, rights: &[&Right]) -> Role {
        let role = Role::with_rights(RoleId::new(), name, rights.iter().map(|r| (*r).clone()))
            .unwrap();
        self.roles.insert(role.role_id(), role.clone());
        role
    }

    pub fn program(&mut self, code_str: &str) -> ProgramId {
        let program = Program::new(ProgramId::new(), code(code_str), code_str);
        let id = program.id;
        self.programs.insert(id, program);
        id
    }

    pub fn facility(&mut self, code_str: &str) -> FacilityId {
        let facility = Facility::new(FacilityId::new(), code(code_str), code_str);
        let id = facility.id;
        self.facilities.insert(id, facility);
        id
    }

    pub fn node(&mut self, code_str: &str, parent: Option<SupervisoryNodeId>) -> SupervisoryNodeId {
        let mut node = SupervisoryNode::new(SupervisoryNodeId::new(), code(code_str), code_str);
        node.parent = parent;
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    pub fn set_parent(&mut self, node: SupervisoryNodeId, parent: SupervisoryNodeId) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = Some(parent);
        }
    }

    /// Creates a fresh member facility and a group holding it.
    pub fn group(&mut self, node: SupervisoryNodeId, program: ProgramId) -> FacilityId {
        let code_str = format!("F{}", self.facilities.len() + 1);
        let facility = self.facility(&code_str);
        self.group_with(node, program, &[facility]);
        facility
    }

    pub fn group_with(
        &mut self,
        node: SupervisoryNodeId,
        program: ProgramId,
        facilities: &[FacilityId],
    ) {
        let n = self.groups.len() + 1;
        self.groups.push(RequisitionGroup {
            id: RequisitionGroupId::new(),
            code: code(&format!("RG{n}")),
            name: format!("Group {n}"),
            supervisory_node: node,
            program,
            member_facilities: facilities.iter().copied().collect::<BTreeSet<_>>(),
        });
    }

    pub fn support(&mut self, facility: FacilityId, program: ProgramId) {
        self.facility_programs.entry(facility).or_default().push(program);
    }
}

impl RightLookup for Fixture {
    fn find_right_by_id(&self, id: RightId) -> Option<Right> {
        self.rights.get(&id).cloned()
    }
}

impl RoleLookup for Fixture {
    fn find_role_by_id(&self, id: RoleId) -> Option<Role> {
        self.roles.get(&id).cloned()
    }
}

impl ProgramLookup for Fixture {
    fn find_program_by_code(&self, code: &Code) -> Option<Program> {
        self.programs.values().find(|p| &p.code == code).cloned()
    }

    fn find_program_by_id(&self, id: ProgramId) -> Option<Program> {
        self.programs.get(&id).cloned()
    }
}

impl FacilityLookup for Fixture {
    fn find_facility_by_code(&self, code: &Code) -> Option<Facility> {
        self.facilities.values().find(|f| &f.code == code).cloned()
    }

    fn find_facility_by_id(&self, id: FacilityId) -> Option<Facility> {
        self.facilities.get(&id).cloned()
    }
}

impl SupervisoryNodeLookup for Fixture {
    fn find_node_by_code(&self, code: &Code) -> Option<SupervisoryNode> {
        self.nodes.values().find(|n| &n.code == code).cloned()
    }

    fn find_node_by_id(&self, id: SupervisoryNodeId) -> Option<SupervisoryNode> {
        self.nodes.get(&id).cloned()
    }

    fn children_of(&self, id: SupervisoryNodeId) -> Vec<SupervisoryNodeId> {
        self.nodes
            .values()
            .filter(|n| n.parent == Some(id))
            .map(|n| n.id)
            .collect()
    }
}

impl RequisitionGroupLookup for Fixture {
    fn find_groups_for_node_and_program(
        &self,
        node: SupervisoryNodeId,
        program: ProgramId,
    ) -> Vec<RequisitionGroup> {
        self.groups
            .iter()
            .filter(|g| g.supervisory_node == node && g.program == program)
            .cloned()
            .collect()
    }
}

impl FacilityProgramLookup for Fixture {
    fn programs_for_facility(&self, facility: FacilityId) -> Vec<Program> {
        self.facility_programs
            .get(&facility)
            .into_iter()
            .flatten()
            .filter_map(|id| self.programs.get(id).cloned())
            .collect()
    }
}
