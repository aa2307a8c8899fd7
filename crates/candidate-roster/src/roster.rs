//! The candidate roster: local records kept in step with the document store.
//!
//! [`Roster`] owns the list of [`CandidateRecord`]s shown to the operator.
//! It loads that list from the store once at startup, appends to it after
//! each successful create, and removes from it after each confirmed delete.
//! A failed store call is reported and logged but never changes the list.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::prompt::{
    Confirmer, Notice, Notifier, TerminalConfirmer, TerminalNotifier, DELETE_PROMPT,
};
use crate::record::{CandidateFields, CandidateRecord, DocumentId};
use crate::store::{DocumentStore, StoreError, StoreOperation, CANDIDATES_COLLECTION};
use crate::validate::{FieldErrors, RawCandidate, Validator};

/// Shown after a candidate is stored.
pub const ADDED_MESSAGE: &str = "Candidate added.";

/// Shown after a record is deleted.
pub const DELETED_MESSAGE: &str = "Record deleted successfully.";

/// Result of [`Roster::submit`].
#[derive(Debug)]
#[must_use]
pub enum SubmitOutcome {
    /// The record was stored under this id and appended locally.
    Created(DocumentId),
    /// Validation failed; nothing was sent to the store.
    Invalid(FieldErrors),
    /// The store rejected the create.
    Failed(StoreError),
}

impl SubmitOutcome {
    /// Check whether the record was stored.
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Result of [`Roster::delete`].
#[derive(Debug)]
#[must_use]
pub enum DeleteOutcome {
    /// The record was removed from the store and the local list.
    Deleted,
    /// The operator declined the confirmation prompt.
    Declined,
    /// The store rejected the delete.
    Failed(StoreError),
}

impl DeleteOutcome {
    /// Check whether the record was removed.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// Keeps the local candidate list consistent with the document store.
///
/// Every store call is awaited before the next one is issued, and the list
/// is only touched after a call succeeds.
pub struct Roster {
    store: Arc<dyn DocumentStore>,
    collection: String,
    validator: Validator,
    confirmer: Box<dyn Confirmer>,
    notifier: Box<dyn Notifier>,
    records: Vec<CandidateRecord>,
}

impl fmt::Debug for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Roster")
            .field("collection", &self.collection)
            .field("validator", &self.validator)
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl Roster {
    /// Create an empty roster over a store.
    ///
    /// Prompts and notices go to the terminal until replaced with
    /// [`with_confirmer`](Self::with_confirmer) and
    /// [`with_notifier`](Self::with_notifier).
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, validator: Validator) -> Self {
        Self {
            store,
            collection: CANDIDATES_COLLECTION.to_string(),
            validator,
            confirmer: Box::new(TerminalConfirmer),
            notifier: Box::new(TerminalNotifier::default()),
            records: Vec::new(),
        }
    }

    /// Use a different collection name.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Use a different confirmation prompt.
    #[must_use]
    pub fn with_confirmer(mut self, confirmer: impl Confirmer + 'static) -> Self {
        self.confirmer = Box::new(confirmer);
        self
    }

    /// Use a different notice sink.
    #[must_use]
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// The records, in display order.
    #[must_use]
    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    /// Look up a record by id.
    #[must_use]
    pub fn find(&self, id: &DocumentId) -> Option<&CandidateRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The collection this roster reads and writes.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The validator applied to submissions.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Load every record from the store, replacing the local list.
    ///
    /// Documents whose body does not decode as a candidate are skipped with
    /// a warning. Returns the number of records loaded.
    ///
    /// # Errors
    ///
    /// Returns the store error after reporting it. The local list is left
    /// empty.
    pub async fn initialize(&mut self) -> Result<usize, StoreError> {
        self.records.clear();

        let documents = match self.store.list_all(&self.collection).await {
            Ok(documents) => documents,
            Err(err) => {
                self.report_failure(&err);
                return Err(err);
            }
        };

        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            match serde_json::from_value::<CandidateFields>(document.fields) {
                Ok(fields) => records.push(CandidateRecord::new(document.id, fields)),
                Err(err) => warn!("Skipping malformed document {}: {}", document.id, err),
            }
        }

        if records.is_empty() {
            info!("No records found in '{}'", self.collection);
        } else {
            debug!("Loaded {} records from '{}'", records.len(), self.collection);
        }

        self.records = records;
        Ok(self.records.len())
    }

    /// Validate and store a submission.
    ///
    /// On success the new record is appended and `draft` is cleared. On any
    /// failure `draft` is left as typed so the operator can correct it.
    pub async fn submit(&mut self, draft: &mut RawCandidate) -> SubmitOutcome {
        let fields = match self.validator.validate(draft) {
            Ok(fields) => fields,
            Err(errors) => {
                debug!("Submission rejected: {}", errors);
                return SubmitOutcome::Invalid(errors);
            }
        };

        let body = match serde_json::to_value(&fields) {
            Ok(body) => body,
            Err(err) => {
                let err =
                    StoreError::backend(StoreOperation::Create, &self.collection, err.into());
                self.report_failure(&err);
                return SubmitOutcome::Failed(err);
            }
        };

        match self.store.create(&self.collection, body).await {
            Ok(id) => {
                info!("Document written with id {}", id);
                self.records.push(CandidateRecord::new(id.clone(), fields));
                self.notifier.notify(&Notice::Success(ADDED_MESSAGE.to_string()));
                draft.clear();
                SubmitOutcome::Created(id)
            }
            Err(err) => {
                self.report_failure(&err);
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Delete a record after the operator confirms.
    ///
    /// Declining is a silent no-op.
    pub async fn delete(&mut self, id: &DocumentId) -> DeleteOutcome {
        if !self.confirmer.confirm(DELETE_PROMPT) {
            debug!("Delete of {} declined", id);
            return DeleteOutcome::Declined;
        }

        match self.store.delete_by_id(&self.collection, id).await {
            Ok(()) => {
                info!("Deleted document {}", id);
                self.records.retain(|record| &record.id != id);
                self.notifier
                    .notify(&Notice::Success(DELETED_MESSAGE.to_string()));
                DeleteOutcome::Deleted
            }
            Err(err) => {
                self.report_failure(&err);
                DeleteOutcome::Failed(err)
            }
        }
    }

    fn report_failure(&self, err: &StoreError) {
        debug!("Store call failed: {:?}", err);
        self.notifier.notify(&Notice::Failure(err.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::record::Field;
    use crate::store::{self, Document, SqliteStore};

    /// In-memory store with scripted ids and injectable failures.
    #[derive(Debug, Default)]
    struct ScriptedStore {
        state: Mutex<ScriptedState>,
    }

    #[derive(Debug, Default)]
    struct ScriptedState {
        documents: Vec<Document>,
        next_ids: VecDeque<&'static str>,
        generated: u32,
        fail_list: bool,
        fail_create: bool,
        fail_delete: bool,
        list_calls: usize,
        create_calls: usize,
        delete_calls: usize,
    }

    impl ScriptedStore {
        fn with_ids(ids: &[&'static str]) -> Arc<Self> {
            let store = Self::default();
            store.state.lock().unwrap().next_ids = ids.iter().copied().collect();
            Arc::new(store)
        }

        fn seeded(documents: Vec<Document>) -> Arc<Self> {
            let store = Self::default();
            store.state.lock().unwrap().documents = documents;
            Arc::new(store)
        }

        fn state(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
            self.state.lock().unwrap()
        }
    }

    #[async_trait]
    impl DocumentStore for ScriptedStore {
        async fn list_all(&self, _collection: &str) -> store::Result<Vec<Document>> {
            let mut state = self.state();
            state.list_calls += 1;
            if state.fail_list {
                return Err(StoreError::unavailable("network error"));
            }
            Ok(state.documents.clone())
        }

        async fn create(&self, _collection: &str, fields: Value) -> store::Result<DocumentId> {
            let mut state = self.state();
            state.create_calls += 1;
            if state.fail_create {
                return Err(StoreError::unavailable("permission denied"));
            }
            let id = match state.next_ids.pop_front() {
                Some(id) => DocumentId::from(id),
                None => {
                    state.generated += 1;
                    DocumentId::new(format!("doc{}", state.generated))
                }
            };
            state.documents.push(Document::new(id.clone(), fields));
            Ok(id)
        }

        async fn delete_by_id(&self, _collection: &str, id: &DocumentId) -> store::Result<()> {
            let mut state = self.state();
            state.delete_calls += 1;
            if state.fail_delete {
                return Err(StoreError::unavailable("network error"));
            }
            state.documents.retain(|doc| doc.id != *id);
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingNotifier {
        notices: Arc<Mutex<Vec<Notice>>>,
    }

    impl RecordingNotifier {
        fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: &Notice) {
            self.notices.lock().unwrap().push(notice.clone());
        }
    }

    #[derive(Debug, Clone, Default)]
    struct ScriptedConfirmer {
        answer: bool,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedConfirmer {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                prompts: Arc::default(),
            }
        }
    }

    impl Confirmer for ScriptedConfirmer {
        fn confirm(&self, prompt: &str) -> bool {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer
        }
    }

    fn ada() -> RawCandidate {
        RawCandidate {
            job_role: "Engineer".to_string(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@x.com".to_string(),
            address: "123 Main Street".to_string(),
            qualification: "BSc".to_string(),
            comments: "Strong background in analytical engines and numerics.".to_string(),
        }
    }

    fn grace() -> RawCandidate {
        RawCandidate {
            full_name: "Grace Hopper".to_string(),
            email: "grace@navy.mil".to_string(),
            ..ada()
        }
    }

    fn document(id: &str, raw: RawCandidate) -> Document {
        Document::new(DocumentId::from(id), serde_json::to_value(raw).unwrap())
    }

    fn roster_over(store: Arc<ScriptedStore>, confirm: bool) -> (Roster, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let roster = Roster::new(store, Validator::new(["Engineer", "Designer"]))
            .with_confirmer(ScriptedConfirmer::answering(confirm))
            .with_notifier(notifier.clone());
        (roster, notifier)
    }

    #[tokio::test]
    async fn test_initialize_empty_store() {
        let store = ScriptedStore::with_ids(&[]);
        let (mut roster, notifier) = roster_over(store, true);

        assert_eq!(roster.initialize().await.unwrap(), 0);
        assert!(roster.is_empty());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_loads_in_fetch_order() {
        let store = ScriptedStore::seeded(vec![document("b", grace()), document("a", ada())]);
        let (mut roster, _) = roster_over(store, true);

        assert_eq!(roster.initialize().await.unwrap(), 2);
        let ids: Vec<&str> = roster.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(roster.records()[0].fields.full_name, "Grace Hopper");
    }

    #[tokio::test]
    async fn test_initialize_twice_is_idempotent() {
        let store = ScriptedStore::seeded(vec![document("a", ada()), document("b", grace())]);
        let (mut roster, _) = roster_over(store.clone(), true);

        roster.initialize().await.unwrap();
        let first = roster.records().to_vec();
        roster.initialize().await.unwrap();

        assert_eq!(roster.records(), first.as_slice());
        assert_eq!(store.state().list_calls, 2);
    }

    #[tokio::test]
    async fn test_initialize_failure_reports_and_leaves_empty() {
        let store = ScriptedStore::seeded(vec![document("a", ada())]);
        store.state().fail_list = true;
        let (mut roster, notifier) = roster_over(store, true);

        let err = roster.initialize().await.unwrap_err();
        assert!(err.to_string().contains("network error"));
        assert!(roster.is_empty());

        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_failure());
    }

    #[tokio::test]
    async fn test_initialize_skips_malformed_documents() {
        let store = ScriptedStore::seeded(vec![
            document("a", ada()),
            Document::new(DocumentId::from("junk"), json!({"fullName": 42})),
        ]);
        let (mut roster, _) = roster_over(store, true);

        assert_eq!(roster.initialize().await.unwrap(), 1);
        assert_eq!(roster.records()[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_submit_appends_with_store_id() {
        let store = ScriptedStore::with_ids(&["abc123"]);
        let (mut roster, notifier) = roster_over(store.clone(), true);
        roster.initialize().await.unwrap();

        let expected = ada();
        let mut draft = ada();
        let outcome = roster.submit(&mut draft).await;

        assert!(matches!(outcome, SubmitOutcome::Created(ref id) if id.as_str() == "abc123"));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.records()[0].id.as_str(), "abc123");
        assert_eq!(RawCandidate::from(roster.records()[0].fields.clone()), expected);
        assert!(draft.is_empty());
        assert_eq!(
            notifier.notices(),
            vec![Notice::Success(ADDED_MESSAGE.to_string())]
        );
        assert_eq!(store.state().documents.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_appends_in_submission_order() {
        let store = ScriptedStore::seeded(vec![document("seed", ada())]);
        let (mut roster, _) = roster_over(store, true);
        roster.initialize().await.unwrap();

        assert!(roster.submit(&mut grace()).await.is_created());
        assert!(roster.submit(&mut ada()).await.is_created());

        let names: Vec<&str> = roster
            .records()
            .iter()
            .map(|r| r.fields.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper", "Ada Lovelace"]);
    }

    #[tokio::test]
    async fn test_submit_duplicate_values_allowed() {
        let store = ScriptedStore::with_ids(&[]);
        let (mut roster, _) = roster_over(store, true);

        assert!(roster.submit(&mut ada()).await.is_created());
        assert!(roster.submit(&mut ada()).await.is_created());
        assert_eq!(roster.len(), 2);
        assert_ne!(roster.records()[0].id, roster.records()[1].id);
    }

    #[tokio::test]
    async fn test_submit_invalid_never_calls_store() {
        let store = ScriptedStore::with_ids(&[]);
        let (mut roster, notifier) = roster_over(store.clone(), true);

        let mut draft = RawCandidate {
            comments: "too short".to_string(),
            ..ada()
        };
        let outcome = roster.submit(&mut draft).await;

        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![Field::Comments]);
        assert!(roster.is_empty());
        assert_eq!(draft.comments, "too short");
        assert_eq!(store.state().create_calls, 0);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_submit_store_failure_keeps_draft() {
        let store = ScriptedStore::with_ids(&[]);
        store.state().fail_create = true;
        let (mut roster, notifier) = roster_over(store, true);

        let mut draft = ada();
        let outcome = roster.submit(&mut draft).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert!(roster.is_empty());
        assert_eq!(draft, ada());
        assert!(notifier.notices()[0].is_failure());
    }

    #[tokio::test]
    async fn test_delete_confirmed() {
        let store = ScriptedStore::seeded(vec![document("a", ada()), document("b", grace())]);
        let (mut roster, notifier) = roster_over(store.clone(), true);
        roster.initialize().await.unwrap();

        let outcome = roster.delete(&DocumentId::from("a")).await;

        assert!(outcome.is_deleted());
        assert_eq!(roster.len(), 1);
        assert!(roster.find(&DocumentId::from("a")).is_none());
        assert!(roster.find(&DocumentId::from("b")).is_some());
        assert_eq!(store.state().documents.len(), 1);
        assert_eq!(
            notifier.notices(),
            vec![Notice::Success(DELETED_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_declined_is_silent_noop() {
        let store = ScriptedStore::seeded(vec![document("a", ada())]);
        let confirmer = ScriptedConfirmer::answering(false);
        let prompts = Arc::clone(&confirmer.prompts);
        let notifier = RecordingNotifier::default();
        let mut roster = Roster::new(store.clone(), Validator::default())
            .with_confirmer(confirmer)
            .with_notifier(notifier.clone());
        roster.initialize().await.unwrap();

        let outcome = roster.delete(&DocumentId::from("a")).await;

        assert!(matches!(outcome, DeleteOutcome::Declined));
        assert_eq!(roster.len(), 1);
        assert_eq!(store.state().delete_calls, 0);
        assert!(notifier.notices().is_empty());
        assert_eq!(*prompts.lock().unwrap(), vec![DELETE_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_records() {
        let store = ScriptedStore::seeded(vec![document("a", ada())]);
        store.state().fail_delete = true;
        let (mut roster, notifier) = roster_over(store, true);
        roster.initialize().await.unwrap();

        let outcome = roster.delete(&DocumentId::from("a")).await;

        assert!(matches!(outcome, DeleteOutcome::Failed(ref err) if err.is_unavailable()));
        assert_eq!(roster.len(), 1);
        assert!(notifier.notices()[0].is_failure());
    }

    #[tokio::test]
    async fn test_delete_already_removed_record() {
        let store = ScriptedStore::seeded(vec![document("a", ada()), document("b", grace())]);
        let (mut roster, notifier) = roster_over(store.clone(), true);
        roster.initialize().await.unwrap();
        store.state().documents.retain(|doc| doc.id.as_str() != "a");

        let outcome = roster.delete(&DocumentId::from("a")).await;

        assert!(outcome.is_deleted());
        assert!(roster.find(&DocumentId::from("a")).is_none());
        assert_eq!(roster.len(), 1);
        assert_eq!(
            notifier.notices(),
            vec![Notice::Success(DELETED_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_id_succeeds() {
        let store = ScriptedStore::seeded(vec![document("a", ada())]);
        let (mut roster, _) = roster_over(store.clone(), true);
        roster.initialize().await.unwrap();

        let outcome = roster.delete(&DocumentId::from("zzz")).await;

        assert!(outcome.is_deleted());
        assert!(roster.find(&DocumentId::from("zzz")).is_none());
        assert_eq!(roster.len(), 1);
        assert_eq!(store.state().documents.len(), 1);
    }

    #[tokio::test]
    async fn test_round_trip_through_sqlite() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let notifier = RecordingNotifier::default();
        let mut roster = Roster::new(store.clone(), Validator::new(["Engineer"]))
            .with_confirmer(ScriptedConfirmer::answering(true))
            .with_notifier(notifier);

        roster.initialize().await.unwrap();
        let SubmitOutcome::Created(id) = roster.submit(&mut ada()).await else {
            panic!("submit failed");
        };
        assert!(roster.submit(&mut grace()).await.is_created());

        let mut fresh = Roster::new(store.clone(), Validator::default())
            .with_confirmer(ScriptedConfirmer::answering(true))
            .with_notifier(RecordingNotifier::default());
        fresh.initialize().await.unwrap();
        assert_eq!(fresh.records(), roster.records());

        assert!(fresh.delete(&id).await.is_deleted());
        roster.initialize().await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.records()[0].fields.full_name, "Grace Hopper");
    }

    #[tokio::test]
    async fn test_custom_collection() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let mut roster = Roster::new(store.clone(), Validator::default())
            .with_collection("archive")
            .with_confirmer(ScriptedConfirmer::answering(true))
            .with_notifier(RecordingNotifier::default());

        assert!(roster.submit(&mut ada()).await.is_created());
        assert_eq!(roster.collection(), "archive");
        assert_eq!(store.list_all("archive").await.unwrap().len(), 1);
        assert!(store.list_all(CANDIDATES_COLLECTION).await.unwrap().is_empty());
    }

    #[test]
    fn test_roster_debug() {
        let roster = Roster::new(ScriptedStore::with_ids(&[]), Validator::default());
        let debug_str = format!("{roster:?}");
        assert!(debug_str.contains("Roster"));
        assert!(debug_str.contains("candidates"));
    }
}
