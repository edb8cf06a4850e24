//! `refdata-core`: reference-data domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, codes, the domain error model and the aggregate/entity traits
//! shared by the rights engine and its collaborators.

pub mod aggregate;
pub mod code;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use code::Code;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    FacilityId, ProgramId, RequisitionGroupId, RightId, RoleId, SupervisoryNodeId, UserId,
};
pub use value_object::ValueObject;
