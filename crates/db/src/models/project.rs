//! Project entity model and DTOs.

use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub category_id: Option<DbId>,
    pub year: Option<i32>,
    pub status: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub location: Option<String>,
    pub area_sqm: Option<i32>,
    pub cover_image_path: Option<String>,
    /// Ordered object-store paths for the gallery images.
    pub gallery: Vec<String>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Field set written by both the draft and the commit paths.
///
/// Draft and committed saves overwrite the row with the full current
/// field values (autosave semantics), so there is no `Option`-per-field
/// patch DTO here.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectData {
    pub title: String,
    pub slug: String,
    pub category_id: Option<DbId>,
    pub year: Option<i32>,
    pub status: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub location: Option<String>,
    pub area_sqm: Option<i32>,
    pub cover_image_path: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
}

/// Filters for the admin project listing.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Case-insensitive substring match on title, excerpt, or slug.
    pub search: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<DbId>,
}

/// A project listing row with resolved display names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectListItem {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub year: Option<i32>,
    pub status: String,
    pub excerpt: Option<String>,
    pub location: Option<String>,
    pub cover_image_path: Option<String>,
    pub created_by_name: Option<String>,
    pub updated_by_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Paginated project listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectPage {
    pub items: Vec<ProjectListItem>,
    pub total: i64,
}
