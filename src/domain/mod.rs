//! Domain layer - Pure business abstractions
//!
//! This layer contains NO web framework dependencies (no Axum).
//! Only value types, query parameters, authorization rules and the domain
//! error type.

pub mod errors;
pub mod pagination;
pub mod policy;
pub mod storage;
pub mod values;

pub use errors::DomainError;
pub use pagination::Pagination;
pub use policy::{Actor, Decision, GroupContent};
pub use storage::{FileStore, StoredFile};
pub use values::{ReadingStatus, Role};
