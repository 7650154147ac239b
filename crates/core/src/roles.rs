//! Well-known role name constants and capability checks.
//!
//! Role names must match the seed data in the `roles` table migration.
//! Every mutating call site goes through [`can_manage_content`] instead of
//! re-spelling the role set.

pub const ROLE_VIEWER: &str = "viewer";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_ADMIN: &str = "admin";

/// Whether a role may create or mutate portal content (projects,
/// categories, documents) and read `admin_only` documents.
pub fn can_manage_content(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_EDITOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_editor_manage_content() {
        assert!(can_manage_content(ROLE_ADMIN));
        assert!(can_manage_content(ROLE_EDITOR));
    }

    #[test]
    fn viewer_does_not_manage_content() {
        assert!(!can_manage_content(ROLE_VIEWER));
    }

    #[test]
    fn unknown_role_does_not_manage_content() {
        assert!(!can_manage_content("superuser"));
    }
}
