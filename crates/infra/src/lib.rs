//! Infrastructure layer: in-memory reference catalog, snapshot loading,
//! user event streams and configuration.

pub mod catalog;
pub mod config;
pub mod shared;
pub mod user_store;


pub use catalog::{CatalogSnapshot, FacilityProgramSupport, ReferenceCatalog};
pub use config::InfraConfig;
pub use shared::SharedCatalog;
pub use user_store::{InMemoryUserStore, UserStoreError};
