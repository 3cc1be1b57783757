//! Remote mirror worker.
//!
//! All remote operations for one theme store run on a single task in
//! submission order, so a later full-sequence replace can never be overtaken
//! by an earlier one. Writes are fire-and-forget: failures are logged and not
//! retried.

use moodskin_core::error::Result;
use moodskin_core::identity::{SessionKey, UserSession};
use moodskin_core::record::{UserRecord, UserRecordStore};
use moodskin_core::saved::SavedThemeEntry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum MirrorCommand {
    Hydrate {
        session: UserSession,
        reply: oneshot::Sender<Result<Option<Vec<SavedThemeEntry>>>>,
    },
    Write {
        session: UserSession,
        entries: Vec<SavedThemeEntry>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
}

/// Whether a remote record is known to exist for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordState {
    Exists,
    Missing,
}

/// Handle to the mirror worker. Dropping every handle stops the worker once
/// queued commands are processed.
#[derive(Clone)]
pub struct RemoteMirror {
    tx: mpsc::UnboundedSender<MirrorCommand>,
    worker: Arc<JoinHandle<()>>,
}

impl RemoteMirror {
    /// Spawns the worker on the current Tokio runtime.
    pub fn spawn(store: Arc<dyn UserRecordStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(store, rx));
        Self {
            tx,
            worker: Arc::new(worker),
        }
    }

    /// Fetches the remote sequence for `session`.
    ///
    /// `Ok(None)` means no record exists yet; it will be created on the first write.
    pub async fn hydrate(&self, session: &UserSession) -> Result<Option<Vec<SavedThemeEntry>>> {
        let (reply, rx) = oneshot::channel();
        self.send(MirrorCommand::Hydrate {
            session: session.clone(),
            reply,
        })?;
        rx.await.map_err(|_| worker_gone())?
    }

    /// Queues a full-sequence write. Never blocks and never fails the caller.
    pub fn write(&self, session: &UserSession, entries: Vec<SavedThemeEntry>) {
        let command = MirrorCommand::Write {
            session: session.clone(),
            entries,
        };
        if self.send(command).is_err() {
            tracing::warn!(key = %session.key, "Mirror worker stopped; dropping remote write");
        }
    }

    /// Waits until every previously queued command has been processed.
    pub async fn flush(&self) {
        let (reply, rx) = oneshot::channel();
        if self.send(MirrorCommand::Flush { reply }).is_ok() {
            let _ = rx.await;
        }
    }

    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }

    fn send(&self, command: MirrorCommand) -> Result<()> {
        self.tx.send(command).map_err(|_| worker_gone())
    }
}

fn worker_gone() -> moodskin_core::MoodskinError {
    moodskin_core::MoodskinError::internal("remote mirror worker is not running")
}

async fn run_worker(
    store: Arc<dyn UserRecordStore>,
    mut rx: mpsc::UnboundedReceiver<MirrorCommand>,
) {
    let mut records: HashMap<SessionKey, RecordState> = HashMap::new();

    while let Some(command) = rx.recv().await {
        match command {
            MirrorCommand::Hydrate { session, reply } => {
                let result = match store.fetch(&session.key).await {
                    Ok(record) => {
                        records.insert(session.key.clone(), RecordState::Exists);
                        Ok(Some(record.saved_themes))
                    }
                    Err(e) if e.is_not_found() => {
                        records.insert(session.key.clone(), RecordState::Missing);
                        Ok(None)
                    }
                    Err(e) => Err(e),
                };
                let _ = reply.send(result);
            }
            MirrorCommand::Write { session, entries } => {
                let state = records.get(&session.key).copied();
                match write_entries(store.as_ref(), &session, &entries, state).await {
                    Ok(()) => {
                        records.insert(session.key.clone(), RecordState::Exists);
                        tracing::debug!(key = %session.key, count = entries.len(), "Mirrored saved themes");
                    }
                    Err(e) => {
                        tracing::warn!(key = %session.key, error = %e, "Remote mirror write failed");
                    }
                }
            }
            MirrorCommand::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }

    tracing::debug!("Remote mirror worker stopped");
}

/// Creates the record when it is known to be missing; otherwise replaces the
/// sequence and falls back to create if the record turns out to be gone.
async fn write_entries(
    store: &dyn UserRecordStore,
    session: &UserSession,
    entries: &[SavedThemeEntry],
    state: Option<RecordState>,
) -> Result<()> {
    if state == Some(RecordState::Missing) {
        return create_record(store, session, entries).await;
    }

    match store.replace_saved_themes(&session.key, entries).await {
        Err(e) if e.is_not_found() => {
            tracing::info!(key = %session.key, "Remote record missing; creating it");
            create_record(store, session, entries).await
        }
        other => other,
    }
}

async fn create_record(
    store: &dyn UserRecordStore,
    session: &UserSession,
    entries: &[SavedThemeEntry],
) -> Result<()> {
    let record = UserRecord::for_session(session, entries.to_vec(), chrono::Utc::now().to_rfc3339());
    store.create(&session.key, &record).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use moodskin_core::CanonicalMood;
    use moodskin_core::MoodskinError;
    use moodskin_core::record::USER_RECORD_ENTITY;
    use moodskin_core::theme::theme_for;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory store that records every call.
    #[derive(Default)]
    pub(crate) struct RecordingStore {
        pub records: Mutex<HashMap<SessionKey, UserRecord>>,
        pub calls: Mutex<Vec<String>>,
        pub fail_writes: AtomicBool,
    }

    impl RecordingStore {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn saved_moods(&self, key: &str) -> Option<Vec<CanonicalMood>> {
            self.records
                .lock()
                .unwrap()
                .get(&SessionKey::new(key))
                .map(|r| r.saved_themes.iter().map(|e| e.mood).collect())
        }

        fn check_fail(&self) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                Err(MoodskinError::remote("store offline"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl UserRecordStore for RecordingStore {
        async fn fetch(&self, key: &SessionKey) -> Result<UserRecord> {
            self.calls.lock().unwrap().push(format!("fetch:{key}"));
            self.records
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| MoodskinError::not_found(USER_RECORD_ENTITY, key.as_str()))
        }

        async fn create(&self, key: &SessionKey, record: &UserRecord) -> Result<()> {
            self.calls.lock().unwrap().push(format!("create:{key}"));
            self.check_fail()?;
            self.records
                .lock()
                .unwrap()
                .insert(key.clone(), record.clone());
            Ok(())
        }

        async fn replace_saved_themes(
            &self,
            key: &SessionKey,
            saved_themes: &[SavedThemeEntry],
        ) -> Result<()> {
            self.calls.lock().unwrap().push(format!("replace:{key}"));
            self.check_fail()?;
            let mut records = self.records.lock().unwrap();
            let record = records
                .get_mut(key)
                .ok_or_else(|| MoodskinError::not_found(USER_RECORD_ENTITY, key.as_str()))?;
            record.saved_themes = saved_themes.to_vec();
            Ok(())
        }
    }

    fn entries(moods: &[CanonicalMood]) -> Vec<SavedThemeEntry> {
        moods
            .iter()
            .map(|m| SavedThemeEntry::new(*m, theme_for(Some(*m)).clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_record_is_created_then_replaced() {
        let store = Arc::new(RecordingStore::default());
        let mirror = RemoteMirror::spawn(store.clone());
        let session = UserSession::guest(SessionKey::new("u1"));

        assert_eq!(mirror.hydrate(&session).await.unwrap(), None);
        mirror.write(&session, entries(&[CanonicalMood::Joy]));
        mirror.write(&session, entries(&[CanonicalMood::Joy, CanonicalMood::Fear]));
        mirror.flush().await;

        assert_eq!(store.calls(), vec!["fetch:u1", "create:u1", "replace:u1"]);
        assert_eq!(
            store.saved_moods("u1"),
            Some(vec![CanonicalMood::Joy, CanonicalMood::Fear])
        );
    }

    #[tokio::test]
    async fn test_replace_falls_back_to_create_when_record_vanishes() {
        let store = Arc::new(RecordingStore::default());
        let mirror = RemoteMirror::spawn(store.clone());
        let session = UserSession::guest(SessionKey::new("u2"));

        mirror.write(&session, entries(&[CanonicalMood::Love]));
        mirror.flush().await;

        assert_eq!(store.calls(), vec!["replace:u2", "create:u2"]);
        assert_eq!(store.saved_moods("u2"), Some(vec![CanonicalMood::Love]));
    }

    #[tokio::test]
    async fn test_writes_apply_in_submission_order() {
        let store = Arc::new(RecordingStore::default());
        let mirror = RemoteMirror::spawn(store.clone());
        let session = UserSession::guest(SessionKey::new("u3"));

        mirror.write(&session, entries(&[CanonicalMood::Joy]));
        mirror.write(&session, entries(&[CanonicalMood::Joy, CanonicalMood::Anger]));
        mirror.write(&session, Vec::new());
        mirror.flush().await;

        assert_eq!(store.saved_moods("u3"), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_failed_write_is_swallowed() {
        let store = Arc::new(RecordingStore::default());
        store.fail_writes.store(true, Ordering::SeqCst);
        let mirror = RemoteMirror::spawn(store.clone());
        let session = UserSession::guest(SessionKey::new("u4"));

        mirror.write(&session, entries(&[CanonicalMood::Joy]));
        mirror.flush().await;

        assert!(mirror.is_running());
        assert_eq!(store.saved_moods("u4"), None);
    }

    #[tokio::test]
    async fn test_hydrate_returns_existing_entries() {
        let store = Arc::new(RecordingStore::default());
        store.records.lock().unwrap().insert(
            SessionKey::new("u5"),
            UserRecord {
                saved_themes: entries(&[CanonicalMood::Disgust]),
                ..UserRecord::default()
            },
        );
        let mirror = RemoteMirror::spawn(store.clone());
        let session = UserSession::guest(SessionKey::new("u5"));

        let hydrated = mirror.hydrate(&session).await.unwrap().unwrap();
        assert_eq!(hydrated[0].mood, CanonicalMood::Disgust);

        mirror.write(&session, Vec::new());
        mirror.flush().await;
        assert_eq!(store.calls(), vec!["fetch:u5", "replace:u5"]);
    }
}
