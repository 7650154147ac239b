//! Project revision snapshots.
//!
//! Every committed (non-autosave) project write appends one revision
//! record. Revisions are append-only; the payload is a small snapshot of
//! the fields an auditor cares about, not the full row.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Action recorded on a revision entry.
pub mod actions {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
}

/// Snapshot stored in the revision's JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionPayload {
    pub title: String,
    pub status: String,
    pub category_id: Option<DbId>,
    pub slug: String,
}

impl RevisionPayload {
    /// Serialize the snapshot for the jsonb column.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips() {
        let payload = RevisionPayload {
            title: "Fjordbyen Fase 2".into(),
            status: "published".into(),
            category_id: Some(3),
            slug: "fjordbyen-fase-2".into(),
        };
        let json = payload.to_json();
        assert_eq!(json["title"], "Fjordbyen Fase 2");
        assert_eq!(json["category_id"], 3);

        let back: RevisionPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.slug, "fjordbyen-fase-2");
    }

    #[test]
    fn null_category_serializes_as_null() {
        let payload = RevisionPayload {
            title: "Kladd".into(),
            status: "draft".into(),
            category_id: None,
            slug: "kladd".into(),
        };
        assert!(payload.to_json()["category_id"].is_null());
    }
}
