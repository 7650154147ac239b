//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod document_category_repo;
pub mod document_repo;
pub mod document_version_repo;
pub mod project_category_repo;
pub mod project_repo;
pub mod project_revision_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;

pub use document_category_repo::DocumentCategoryRepo;
pub use document_repo::DocumentRepo;
pub use document_version_repo::DocumentVersionRepo;
pub use project_category_repo::ProjectCategoryRepo;
pub use project_repo::ProjectRepo;
pub use project_revision_repo::ProjectRevisionRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
