//! Project draft/autosave editing session.
//!
//! Gives an editor a persisted-as-you-type experience: the session starts
//! with no backing row, lazily creates a draft the first time both title
//! and slug are non-empty, and from then on flushes edits with a
//! trailing-edge debounce. Committed (validated) writes go through the
//! normal project update path, not through this session.
//!
//! The session runs as a message-loop task. Persistence is abstracted
//! behind [`DraftStore`] so the loop can be exercised with a mock store
//! and a paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::error::CoreError;
use crate::slug::slugify;
use crate::types::DbId;

/// Project status values, matching the CHECK constraint on `projects`.
pub mod status {
    pub const DRAFT: &str = "draft";
    pub const PUBLISHED: &str = "published";
    pub const ARCHIVED: &str = "archived";
}

/// Editable project fields held in session memory.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftFields {
    pub title: String,
    pub slug: String,
    pub category_id: Option<DbId>,
    pub year: Option<i32>,
    pub status: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub location: Option<String>,
    pub area_sqm: Option<i32>,
}

impl Default for DraftFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            category_id: None,
            year: None,
            status: status::DRAFT.to_string(),
            excerpt: None,
            content: None,
            location: None,
            area_sqm: None,
        }
    }
}

/// Persistence operations the session needs. Implemented over the project
/// repository by the API crate and by mock stores in tests.
#[async_trait::async_trait]
pub trait DraftStore: Send + Sync {
    /// Insert a new draft row, returning its id. The passed fields always
    /// carry `status = "draft"`.
    async fn create_draft(&self, fields: &DraftFields) -> Result<DbId, CoreError>;

    /// Overwrite the draft row with the current field values.
    async fn update_draft(&self, id: DbId, fields: &DraftFields) -> Result<(), CoreError>;
}

/// A single field change from the editing client.
#[derive(Debug, Clone)]
pub enum FieldEdit {
    Title(String),
    /// A manual slug edit. Permanently disables slug auto-derivation for
    /// the rest of the session.
    Slug(String),
    Category(Option<DbId>),
    Year(Option<i32>),
    Status(String),
    Excerpt(Option<String>),
    Content(Option<String>),
    Location(Option<String>),
    AreaSqm(Option<i32>),
}

/// Messages accepted by the session task.
enum EditorInput {
    Edit(FieldEdit),
    Snapshot(oneshot::Sender<EditorSnapshot>),
    Close,
}

/// Events emitted by the session. Autosave failures are logged, never
/// emitted: a transient persistence error must not interrupt typing.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The lazily created draft row now exists.
    DraftCreated { id: DbId },
    /// A debounced autosave flush succeeded.
    Saved { id: DbId },
}

/// Point-in-time view of the session, for status displays and tests.
#[derive(Debug, Clone)]
pub struct EditorSnapshot {
    pub project_id: Option<DbId>,
    pub fields: DraftFields,
    pub slug_manually_edited: bool,
    pub creating: bool,
}

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Quiet period before a debounced autosave flush.
    pub quiet_period: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(800),
        }
    }
}

/// Handle used to feed edits into a running session.
#[derive(Clone)]
pub struct EditorHandle {
    tx: mpsc::Sender<EditorInput>,
}

impl EditorHandle {
    /// Apply a field edit. Returns `false` if the session has ended.
    pub async fn edit(&self, edit: FieldEdit) -> bool {
        self.tx.send(EditorInput::Edit(edit)).await.is_ok()
    }

    /// Fetch the current session state. Also acts as a barrier: when this
    /// returns, every previously sent edit has been applied.
    pub async fn snapshot(&self) -> Option<EditorSnapshot> {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(EditorInput::Snapshot(tx)).await.is_err() {
            return None;
        }
        rx.await.ok()
    }

    /// End the session. A pending debounce flush is dropped, matching the
    /// editor being navigated away from.
    pub async fn close(&self) {
        let _ = self.tx.send(EditorInput::Close).await;
    }
}

/// Spawn an editing session.
///
/// `existing` carries the row id and current fields when editing an
/// already persisted project; `None` starts the lazily-creating flow.
/// Returns the input handle, the event stream, and the task handle.
pub fn spawn_session<S: DraftStore + 'static>(
    store: Arc<S>,
    existing: Option<(DbId, DraftFields)>,
    config: EditorConfig,
) -> (EditorHandle, mpsc::Receiver<EditorEvent>, JoinHandle<()>) {
    let (input_tx, input_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::channel(32);

    let project_id = existing.as_ref().map(|(id, _)| *id);
    let session = Session {
        store,
        config,
        project_id,
        fields: existing.map(|(_, f)| f).unwrap_or_default(),
        is_new: project_id.is_none(),
        slug_manually_edited: false,
        events: event_tx,
    };

    let task = tokio::spawn(session.run(input_rx));
    (EditorHandle { tx: input_tx }, event_rx, task)
}

struct Session<S> {
    store: Arc<S>,
    config: EditorConfig,
    project_id: Option<DbId>,
    fields: DraftFields,
    /// True until the session edits a row that existed before the session
    /// started. Autosaves of a new row always force `status = "draft"`.
    is_new: bool,
    slug_manually_edited: bool,
    events: mpsc::Sender<EditorEvent>,
}

impl<S: DraftStore + 'static> Session<S> {
    async fn run(mut self, mut inputs: mpsc::Receiver<EditorInput>) {
        // In-flight draft creation, if any. Receiving on the channel keeps
        // the loop responsive to edits while the insert is running; the
        // guard is the Option itself -- a second creation cannot start
        // while it is occupied.
        let mut creating: Option<oneshot::Receiver<Result<DbId, CoreError>>> = None;
        // Trailing-edge debounce deadline; re-armed on every edit.
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                msg = inputs.recv() => {
                    match msg {
                        Some(EditorInput::Edit(edit)) => {
                            self.apply(edit);
                            if self.project_id.is_some() {
                                deadline = Some(Instant::now() + self.config.quiet_period);
                            } else if creating.is_none() && self.ready_to_create() {
                                creating = Some(self.begin_create());
                            }
                        }
                        Some(EditorInput::Snapshot(reply)) => {
                            let _ = reply.send(EditorSnapshot {
                                project_id: self.project_id,
                                fields: self.fields.clone(),
                                slug_manually_edited: self.slug_manually_edited,
                                creating: creating.is_some(),
                            });
                        }
                        Some(EditorInput::Close) | None => break,
                    }
                }

                result = async { creating.as_mut().expect("guarded by condition").await }, if creating.is_some() => {
                    creating = None;
                    match result {
                        Ok(Ok(id)) => {
                            self.project_id = Some(id);
                            let _ = self.events.send(EditorEvent::DraftCreated { id }).await;
                            // Edits may have arrived while the insert ran;
                            // flush them after one quiet period.
                            deadline = Some(Instant::now() + self.config.quiet_period);
                        }
                        Ok(Err(e)) => {
                            tracing::warn!(error = %e, "Draft creation failed; will retry on next edit");
                        }
                        Err(_) => {
                            tracing::warn!("Draft creation task dropped; will retry on next edit");
                        }
                    }
                }

                _ = async { sleep_until(deadline.expect("guarded by condition")).await }, if deadline.is_some() => {
                    deadline = None;
                    self.flush_autosave().await;
                }
            }
        }
    }

    fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Title(title) => {
                if !self.slug_manually_edited {
                    self.fields.slug = slugify(&title);
                }
                self.fields.title = title;
            }
            FieldEdit::Slug(slug) => {
                self.fields.slug = slug;
                self.slug_manually_edited = true;
            }
            FieldEdit::Category(id) => self.fields.category_id = id,
            FieldEdit::Year(year) => self.fields.year = year,
            FieldEdit::Status(status) => self.fields.status = status,
            FieldEdit::Excerpt(v) => self.fields.excerpt = v,
            FieldEdit::Content(v) => self.fields.content = v,
            FieldEdit::Location(v) => self.fields.location = v,
            FieldEdit::AreaSqm(v) => self.fields.area_sqm = v,
        }
    }

    fn ready_to_create(&self) -> bool {
        !self.fields.title.is_empty() && !self.fields.slug.is_empty()
    }

    /// Start the one-time draft insert on a separate task so the loop
    /// keeps absorbing keystrokes while it runs.
    fn begin_create(&self) -> oneshot::Receiver<Result<DbId, CoreError>> {
        let (tx, rx) = oneshot::channel();
        let store = Arc::clone(&self.store);
        let mut fields = self.fields.clone();
        fields.status = status::DRAFT.to_string();
        tokio::spawn(async move {
            let _ = tx.send(store.create_draft(&fields).await);
        });
        rx
    }

    async fn flush_autosave(&mut self) {
        let Some(id) = self.project_id else { return };

        let mut fields = self.fields.clone();
        if self.is_new {
            // A row created this session stays a draft until the user
            // commits; the chosen status is applied by the commit path.
            fields.status = status::DRAFT.to_string();
        }

        match self.store.update_draft(id, &fields).await {
            Ok(()) => {
                let _ = self.events.send(EditorEvent::Saved { id }).await;
            }
            Err(e) => {
                // Swallowed: the next edit re-arms the debounce and
                // retries with newer state.
                tracing::warn!(project_id = id, error = %e, "Autosave failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Recording mock store. `fail_creates` / `fail_updates` make the
    /// next N calls fail.
    #[derive(Default)]
    struct MockStore {
        create_calls: Mutex<Vec<DraftFields>>,
        update_calls: Mutex<Vec<(DbId, DraftFields)>>,
        fail_creates: Mutex<u32>,
        fail_updates: Mutex<u32>,
    }

    #[async_trait::async_trait]
    impl DraftStore for MockStore {
        async fn create_draft(&self, fields: &DraftFields) -> Result<DbId, CoreError> {
            {
                let mut remaining = self.fail_creates.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(CoreError::Internal("connection reset".into()));
                }
            }
            let mut calls = self.create_calls.lock().unwrap();
            calls.push(fields.clone());
            Ok(calls.len() as DbId)
        }

        async fn update_draft(&self, id: DbId, fields: &DraftFields) -> Result<(), CoreError> {
            {
                let mut remaining = self.fail_updates.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(CoreError::Internal("connection reset".into()));
                }
            }
            self.update_calls.lock().unwrap().push((id, fields.clone()));
            Ok(())
        }
    }

    fn test_config() -> EditorConfig {
        EditorConfig {
            quiet_period: Duration::from_millis(800),
        }
    }

    /// Let the session task run until it is parked on timers, then jump
    /// past the debounce window.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1_000)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_draft_while_title_or_slug_empty() {
        let store = Arc::new(MockStore::default());
        let (handle, _events, task) = spawn_session(Arc::clone(&store), None, test_config());

        // A slug cannot exist without a title unless edited manually, so
        // exercise both half-empty combinations.
        handle.edit(FieldEdit::Excerpt(Some("Sentralt".into()))).await;
        handle.edit(FieldEdit::Slug("bare-slug".into())).await;
        settle().await;
        assert!(store.create_calls.lock().unwrap().is_empty());

        handle.edit(FieldEdit::Slug(String::new())).await;
        handle.edit(FieldEdit::Title("Fjordbyen".into())).await;
        // Title edit does not regenerate the slug after the manual edit
        // above, so both create preconditions are still not met.
        settle().await;
        assert!(store.create_calls.lock().unwrap().is_empty());

        handle.close().await;
        let _ = task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn keystroke_burst_creates_exactly_one_draft() {
        let store = Arc::new(MockStore::default());
        let (handle, mut events, task) = spawn_session(Arc::clone(&store), None, test_config());

        for title in ["F", "Fj", "Fjo", "Fjor", "Fjordbyen Fase 2"] {
            handle.edit(FieldEdit::Title(title.into())).await;
        }
        settle().await;

        assert_eq!(store.create_calls.lock().unwrap().len(), 1);
        assert_eq!(events.recv().await, Some(EditorEvent::DraftCreated { id: 1 }));

        handle.close().await;
        let _ = task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn created_draft_carries_derived_slug_and_draft_status() {
        let store = Arc::new(MockStore::default());
        let (handle, _events, task) = spawn_session(Arc::clone(&store), None, test_config());

        handle.edit(FieldEdit::Status(status::PUBLISHED.into())).await;
        handle.edit(FieldEdit::Title("Åsveien Ærfugl".into())).await;
        settle().await;

        let creates = store.create_calls.lock().unwrap();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].slug, "asveien-aerfugl");
        assert_eq!(creates[0].status, status::DRAFT);

        drop(creates);
        handle.close().await;
        let _ = task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_flushes_only_the_last_edit() {
        let store = Arc::new(MockStore::default());
        let (handle, _events, task) = spawn_session(
            Arc::clone(&store),
            Some((7, DraftFields::default())),
            test_config(),
        );

        handle.edit(FieldEdit::Title("Kvartal".into())).await;
        handle.snapshot().await.unwrap();
        tokio::time::advance(Duration::from_millis(500)).await;

        // Second edit inside the quiet window re-arms the timer.
        handle.edit(FieldEdit::Title("Kvartal 12".into())).await;
        handle.snapshot().await.unwrap();
        settle().await;

        let updates = store.update_calls.lock().unwrap();
        assert_eq!(updates.len(), 1, "one flush per quiet window");
        assert_eq!(updates[0].0, 7);
        assert_eq!(updates[0].1.title, "Kvartal 12");

        drop(updates);
        handle.close().await;
        let _ = task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn manual_slug_edit_disables_regeneration() {
        let store = Arc::new(MockStore::default());
        let (handle, _events, task) = spawn_session(
            Arc::clone(&store),
            Some((7, DraftFields::default())),
            test_config(),
        );

        handle.edit(FieldEdit::Title("Fjordbyen".into())).await;
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.fields.slug, "fjordbyen");
        assert!(!snap.slug_manually_edited);

        handle.edit(FieldEdit::Slug("egen-slug".into())).await;
        handle.edit(FieldEdit::Title("Fjordbyen Fase 2".into())).await;
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.fields.slug, "egen-slug");
        assert!(snap.slug_manually_edited);

        handle.close().await;
        let _ = task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn new_session_autosaves_force_draft_status() {
        let store = Arc::new(MockStore::default());
        let (handle, _events, task) = spawn_session(Arc::clone(&store), None, test_config());

        handle.edit(FieldEdit::Title("Bryggen".into())).await;
        settle().await;
        handle.edit(FieldEdit::Status(status::PUBLISHED.into())).await;
        handle.edit(FieldEdit::Excerpt(Some("Ved sjøen".into()))).await;
        settle().await;

        let updates = store.update_calls.lock().unwrap();
        assert!(!updates.is_empty());
        for (_, fields) in updates.iter() {
            assert_eq!(fields.status, status::DRAFT);
        }

        drop(updates);
        handle.close().await;
        let _ = task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn existing_session_autosaves_keep_chosen_status() {
        let store = Arc::new(MockStore::default());
        let mut fields = DraftFields::default();
        fields.title = "Bryggen".into();
        fields.slug = "bryggen".into();
        let (handle, _events, task) =
            spawn_session(Arc::clone(&store), Some((3, fields)), test_config());

        handle.edit(FieldEdit::Status(status::ARCHIVED.into())).await;
        settle().await;

        let updates = store.update_calls.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.status, status::ARCHIVED);

        drop(updates);
        handle.close().await;
        let _ = task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_create_retries_on_next_edit() {
        let store = Arc::new(MockStore::default());
        *store.fail_creates.lock().unwrap() = 1;
        let (handle, mut events, task) = spawn_session(Arc::clone(&store), None, test_config());

        handle.edit(FieldEdit::Title("Fjordbyen".into())).await;
        settle().await;
        assert!(store.create_calls.lock().unwrap().is_empty());

        handle.edit(FieldEdit::Title("Fjordbyen Fase 2".into())).await;
        settle().await;
        assert_eq!(store.create_calls.lock().unwrap().len(), 1);
        assert_eq!(events.recv().await, Some(EditorEvent::DraftCreated { id: 1 }));

        handle.close().await;
        let _ = task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_autosave_is_swallowed_and_retried() {
        let store = Arc::new(MockStore::default());
        *store.fail_updates.lock().unwrap() = 1;
        let (handle, _events, task) = spawn_session(
            Arc::clone(&store),
            Some((7, DraftFields::default())),
            test_config(),
        );

        handle.edit(FieldEdit::Title("Kaia".into())).await;
        settle().await;
        // First flush failed and was swallowed.
        assert!(store.update_calls.lock().unwrap().is_empty());

        handle.edit(FieldEdit::Title("Kaia Vest".into())).await;
        settle().await;
        let updates = store.update_calls.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.title, "Kaia Vest");

        drop(updates);
        handle.close().await;
        let _ = task.await;
    }

    #[tokio::test(start_paused = true)]
    async fn close_drops_pending_flush() {
        let store = Arc::new(MockStore::default());
        let (handle, _events, task) = spawn_session(
            Arc::clone(&store),
            Some((7, DraftFields::default())),
            test_config(),
        );

        handle.edit(FieldEdit::Title("Kaia".into())).await;
        handle.snapshot().await.unwrap();
        handle.close().await;
        let _ = task.await;

        assert!(store.update_calls.lock().unwrap().is_empty());
    }
}
