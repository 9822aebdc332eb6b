use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::catalog::Catalog;
use crate::model::ids::LessonId;

/// Lesson ids that reached natural end-of-playback.
///
/// Grows monotonically: there is no way to remove an id once inserted. Ids
/// that are no longer in the catalog are kept so they survive a round trip
/// through storage, but [`CompletionSet::count_in`] ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSet {
    ids: BTreeSet<LessonId>,
}

impl CompletionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &LessonId) -> bool {
        self.ids.contains(id)
    }

    /// Adds an id. Returns `false` if it was already present.
    pub fn insert(&mut self, id: LessonId) -> bool {
        self.ids.insert(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LessonId> {
        self.ids.iter()
    }

    /// Number of ids that belong to lessons in `catalog`.
    #[must_use]
    pub fn count_in(&self, catalog: &Catalog) -> usize {
        catalog
            .lessons()
            .filter(|lesson| self.contains(lesson.id()))
            .count()
    }

    /// Ids with no matching lesson in `catalog`.
    pub fn stale<'a>(&'a self, catalog: &'a Catalog) -> impl Iterator<Item = &'a LessonId> {
        self.ids.iter().filter(move |id| !catalog.contains(id))
    }
}

impl FromIterator<LessonId> for CompletionSet {
    fn from_iter<T: IntoIterator<Item = LessonId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
