//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Update DTOs where the entity supports patching

pub mod document;
pub mod document_category;
pub mod document_version;
pub mod project;
pub mod project_category;
pub mod project_revision;
pub mod role;
pub mod session;
pub mod user;
