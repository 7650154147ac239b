//! HTTP handler implementations, one module per resource.

pub mod auth;
pub mod document_categories;
pub mod documents;
pub mod files;
pub mod health;
pub mod preview;
pub mod project_categories;
pub mod projects;
pub mod users;
