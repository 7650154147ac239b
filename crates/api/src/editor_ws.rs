//! WebSocket project editor.
//!
//! `GET /projects/editor` upgrades to a socket that runs one
//! [`portal_core::editor`] session: the client streams field edits, the
//! server lazily creates the draft row, autosaves with a trailing-edge
//! debounce, and pushes `draft_created` / `saved` events back. A `commit`
//! message runs the validated commit path and ends the session.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use portal_core::editor::{
    spawn_session, DraftFields, DraftStore, EditorConfig, EditorEvent, FieldEdit,
};
use portal_core::error::CoreError;
use portal_core::types::DbId;
use portal_db::models::project::ProjectData;
use portal_db::repositories::ProjectRepo;
use portal_db::DbPool;

use crate::error::AppError;
use crate::handlers::projects::{
    apply_commit, insert_draft_row, save_draft_row, CommitProjectRequest,
};
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Wire messages
// ---------------------------------------------------------------------------

/// Messages from the editing client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// A single field change.
    Edit(EditPayload),
    /// Run the validated commit path and end the session.
    Commit {
        #[serde(default)]
        created_by_override: Option<DbId>,
    },
}

/// `{"field": "title", "value": ...}` payloads.
#[derive(Debug, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
enum EditPayload {
    Title(String),
    Slug(String),
    CategoryId(Option<DbId>),
    Year(Option<i32>),
    Status(String),
    Excerpt(Option<String>),
    Content(Option<String>),
    Location(Option<String>),
    AreaSqm(Option<i32>),
}

impl From<EditPayload> for FieldEdit {
    fn from(payload: EditPayload) -> Self {
        match payload {
            EditPayload::Title(v) => FieldEdit::Title(v),
            EditPayload::Slug(v) => FieldEdit::Slug(v),
            EditPayload::CategoryId(v) => FieldEdit::Category(v),
            EditPayload::Year(v) => FieldEdit::Year(v),
            EditPayload::Status(v) => FieldEdit::Status(v),
            EditPayload::Excerpt(v) => FieldEdit::Excerpt(v),
            EditPayload::Content(v) => FieldEdit::Content(v),
            EditPayload::Location(v) => FieldEdit::Location(v),
            EditPayload::AreaSqm(v) => FieldEdit::AreaSqm(v),
        }
    }
}

/// Messages pushed to the editing client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Ready { project_id: Option<DbId> },
    DraftCreated { id: DbId },
    Saved { id: DbId },
    Committed { id: DbId },
    Error { message: String },
}

/// Query parameters for the editor upgrade request.
#[derive(Debug, Deserialize)]
pub struct EditorQuery {
    /// Resume editing an existing project; omitted for a new one.
    pub project_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// DraftStore over the project repository
// ---------------------------------------------------------------------------

/// Persists editor-session drafts through the project repository. The
/// acting user becomes both author and editor of the created draft.
pub struct SqlDraftStore {
    pool: DbPool,
    user_id: DbId,
}

impl SqlDraftStore {
    pub fn new(pool: DbPool, user_id: DbId) -> Self {
        Self { pool, user_id }
    }
}

fn draft_to_data(fields: &DraftFields) -> ProjectData {
    ProjectData {
        title: fields.title.clone(),
        slug: fields.slug.clone(),
        category_id: fields.category_id,
        year: fields.year,
        status: fields.status.clone(),
        excerpt: fields.excerpt.clone(),
        content: fields.content.clone(),
        location: fields.location.clone(),
        area_sqm: fields.area_sqm,
        cover_image_path: None,
        gallery: Vec::new(),
    }
}

fn to_core_error(err: AppError) -> CoreError {
    match err {
        AppError::Core(core) => core,
        other => CoreError::Internal(other.to_string()),
    }
}

#[async_trait::async_trait]
impl DraftStore for SqlDraftStore {
    async fn create_draft(&self, fields: &DraftFields) -> Result<DbId, CoreError> {
        insert_draft_row(&self.pool, &draft_to_data(fields), Some(self.user_id))
            .await
            .map(|project| project.id)
            .map_err(to_core_error)
    }

    async fn update_draft(&self, id: DbId, fields: &DraftFields) -> Result<(), CoreError> {
        save_draft_row(&self.pool, id, &draft_to_data(fields), Some(self.user_id))
            .await
            .map(|_| ())
            .map_err(to_core_error)
    }
}

// ---------------------------------------------------------------------------
// Socket handling
// ---------------------------------------------------------------------------

/// HTTP handler that upgrades the connection to WebSocket. Requires an
/// editor or admin role before the upgrade is accepted.
pub async fn editor_ws(
    RequireEditor(user): RequireEditor,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<EditorQuery>,
) -> impl IntoResponse {
    let user_id = user.user_id;
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id, params.project_id))
}

/// Manage a single editor session after upgrade.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: DbId, project_id: Option<DbId>) {
    tracing::info!(user_id, ?project_id, "Editor session connected");

    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(32);

    // Sender task: serialize outbound messages onto the socket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let Ok(text) = serde_json::to_string(&msg) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Resume state for an existing project.
    let existing = match project_id {
        Some(id) => match ProjectRepo::find_by_id(&state.pool, id).await {
            Ok(Some(project)) => Some((
                id,
                DraftFields {
                    title: project.title,
                    slug: project.slug,
                    category_id: project.category_id,
                    year: project.year,
                    status: project.status,
                    excerpt: project.excerpt,
                    content: project.content,
                    location: project.location,
                    area_sqm: project.area_sqm,
                },
            )),
            Ok(None) => {
                let _ = out_tx
                    .send(ServerMessage::Error {
                        message: format!("Project {id} not found"),
                    })
                    .await;
                send_task.abort();
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load project for editor session");
                let _ = out_tx
                    .send(ServerMessage::Error {
                        message: "Failed to load project".into(),
                    })
                    .await;
                send_task.abort();
                return;
            }
        },
        None => None,
    };

    let store = Arc::new(SqlDraftStore::new(state.pool.clone(), user_id));
    let (handle, mut events, session_task) =
        spawn_session(store, existing, EditorConfig::default());

    let _ = out_tx.send(ServerMessage::Ready { project_id }).await;

    // Event bridge: session events out to the client.
    let event_tx = out_tx.clone();
    let event_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let msg = match event {
                EditorEvent::DraftCreated { id } => ServerMessage::DraftCreated { id },
                EditorEvent::Saved { id } => ServerMessage::Saved { id },
            };
            if event_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Receiver loop: apply inbound client messages.
    while let Some(result) = stream.next().await {
        let message = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Editor socket receive error");
                break;
            }
        };

        let parsed: ClientMessage = match serde_json::from_str(&message) {
            Ok(parsed) => parsed,
            Err(e) => {
                let _ = out_tx
                    .send(ServerMessage::Error {
                        message: format!("Invalid message: {e}"),
                    })
                    .await;
                continue;
            }
        };

        match parsed {
            ClientMessage::Edit(payload) => {
                if !handle.edit(payload.into()).await {
                    break;
                }
            }
            ClientMessage::Commit {
                created_by_override,
            } => {
                // The commit path is the validated, revision-appending
                // write; it terminates the autosave session on success.
                let Some(snapshot) = handle.snapshot().await else {
                    break;
                };

                let mut data = draft_to_data(&snapshot.fields);
                // Keep images attached through the upload endpoint.
                if let Some(id) = snapshot.project_id {
                    if let Ok(Some(current)) = ProjectRepo::find_by_id(&state.pool, id).await {
                        data.cover_image_path = current.cover_image_path;
                        data.gallery = current.gallery;
                    }
                }

                let request = CommitProjectRequest {
                    data,
                    created_by_override,
                };
                match apply_commit(&state.pool, snapshot.project_id, &request, user_id).await {
                    Ok(project) => {
                        let _ = out_tx
                            .send(ServerMessage::Committed { id: project.id })
                            .await;
                        break;
                    }
                    Err(e) => {
                        // Blocking error: surface it, keep the session
                        // alive so the user can fix the input.
                        let _ = out_tx
                            .send(ServerMessage::Error {
                                message: e.to_string(),
                            })
                            .await;
                    }
                }
            }
        }
    }

    // Clean up: end the session (dropping any pending debounce flush)
    // and stop the bridge tasks.
    handle.close().await;
    let _ = session_task.await;
    event_task.abort();
    send_task.abort();
    tracing::info!(user_id, "Editor session disconnected");
}
