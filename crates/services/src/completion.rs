use std::sync::Arc;

use course_core::Progress;
use course_core::model::{Catalog, CompletionSet, LessonId};
use storage::repository::{KeyValueStore, StorageError};

use crate::error::CompletionError;

/// Storage key holding the JSON array of completed lesson ids.
pub const COMPLETED_KEY: &str = "completed";

/// Result of marking a lesson complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The lesson was added and the new set was persisted.
    Completed,
    /// The lesson was already complete; nothing was written.
    AlreadyComplete,
}

/// Owns the completion set and keeps it in sync with the key-value store.
///
/// Writes are persist-then-commit: a new set only replaces the in-memory one
/// after the store accepted it, so a failed write never leaves memory ahead of
/// storage.
pub struct CompletionTracker {
    store: Arc<dyn KeyValueStore>,
    catalog: Arc<Catalog>,
    completed: CompletionSet,
}

impl CompletionTracker {
    /// Hydrate the tracker from storage.
    ///
    /// Missing, unreadable or malformed data yields an empty set; the problem
    /// is logged and never returned to the caller.
    pub async fn load(store: Arc<dyn KeyValueStore>, catalog: Arc<Catalog>) -> Self {
        let completed = match store.get(COMPLETED_KEY).await {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => CompletionSet::new(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read completion history; starting empty");
                CompletionSet::new()
            }
        };

        let stale = completed.stale(&catalog).count();
        if stale > 0 {
            tracing::debug!(stale, "completion history references lessons outside the catalog");
        }

        Self {
            store,
            catalog,
            completed,
        }
    }

    #[must_use]
    pub fn is_complete(&self, lesson_id: &LessonId) -> bool {
        self.completed.contains(lesson_id)
    }

    #[must_use]
    pub fn completed(&self) -> &CompletionSet {
        &self.completed
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::measure(&self.catalog, &self.completed)
    }

    /// Record `lesson_id` as complete and persist the new set.
    ///
    /// Marking an already-complete lesson is a no-op and performs no write.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::UnknownLesson` for ids outside the catalog.
    /// Returns `CompletionError::Storage` if the write fails; the in-memory
    /// set is left unchanged in that case.
    pub async fn mark_complete(
        &mut self,
        lesson_id: &LessonId,
    ) -> Result<MarkOutcome, CompletionError> {
        if !self.catalog.contains(lesson_id) {
            return Err(CompletionError::UnknownLesson(lesson_id.clone()));
        }
        if self.completed.contains(lesson_id) {
            return Ok(MarkOutcome::AlreadyComplete);
        }

        let mut next = self.completed.clone();
        next.insert(lesson_id.clone());
        self.write(&next).await?;
        self.completed = next;

        tracing::info!(lesson = %lesson_id, "lesson completed");
        Ok(MarkOutcome::Completed)
    }

    /// Write the current set to storage, replacing the stored value.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Storage` if the write fails.
    pub async fn persist(&self) -> Result<(), CompletionError> {
        self.write(&self.completed).await
    }

    async fn write(&self, set: &CompletionSet) -> Result<(), CompletionError> {
        let raw = serde_json::to_string(set)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.store.put(COMPLETED_KEY, &raw).await?;
        tracing::debug!(count = set.len(), "completion set persisted");
        Ok(())
    }
}

fn decode(raw: &str) -> CompletionSet {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "discarding malformed completion history");
        CompletionSet::new()
    })
}
