//! Completion progress derived from the catalog and the completion set.

use crate::model::{Catalog, CompletionSet, Course};

/// Fraction of catalog lessons present in `completed`, in `[0, 1]`.
///
/// Ids in `completed` that are not in the catalog are ignored. An empty
/// catalog yields `0.0`.
#[must_use]
pub fn progress_ratio(catalog: &Catalog, completed: &CompletionSet) -> f64 {
    Progress::measure(catalog, completed).ratio()
}

/// Completed vs. total lesson counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    completed: usize,
    total: usize,
}

impl Progress {
    #[must_use]
    pub fn measure(catalog: &Catalog, completed: &CompletionSet) -> Self {
        Self {
            completed: completed.count_in(catalog),
            total: catalog.lesson_count(),
        }
    }

    /// Progress restricted to one course.
    #[must_use]
    pub fn course(course: &Course, completed: &CompletionSet) -> Self {
        Self {
            completed: course
                .lessons()
                .iter()
                .filter(|lesson| completed.contains(lesson.id()))
                .count(),
            total: course.lessons().len(),
        }
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// Rounded percentage for the progress bar.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (self.ratio() * 100.0).round() as u8
    }

    /// Every lesson of a non-empty catalog is complete; gates the certificate.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}
