use std::path::{Path, PathBuf};
use std::sync::Arc;

use course_core::model::Catalog;
use storage::repository::Storage;

use crate::Clock;
use crate::certificate::CertificateEmitter;
use crate::completion::CompletionTracker;
use crate::error::AppServicesError;
use crate::playback::PlaybackCoordinator;

/// Assembles app-facing services around one catalog and one store.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    storage: Storage,
    certificates: Arc<CertificateEmitter>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: Storage, catalog: Catalog, clock: Clock, out_dir: PathBuf) -> Self {
        Self {
            catalog: Arc::new(catalog),
            storage,
            certificates: Arc::new(CertificateEmitter::pdf(clock, out_dir)),
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        catalog: Catalog,
        clock: Clock,
        out_dir: PathBuf,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(storage, catalog, clock, out_dir))
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn certificates(&self) -> Arc<CertificateEmitter> {
        Arc::clone(&self.certificates)
    }

    /// Hydrate completion history from the store.
    pub async fn load_tracker(&self) -> CompletionTracker {
        CompletionTracker::load(Arc::clone(&self.storage.kv), Arc::clone(&self.catalog)).await
    }

    /// Hydrate completion history and build the coordinator that owns it.
    pub async fn load_coordinator(&self) -> PlaybackCoordinator {
        PlaybackCoordinator::new(self.load_tracker().await)
    }
}

/// Read a catalog file, or the built-in catalog when `path` is `None`.
///
/// # Errors
///
/// Returns `AppServicesError::CatalogFile` if the file cannot be read, or
/// `AppServicesError::Catalog` if it is not a valid catalog.
pub async fn load_catalog(path: Option<&Path>) -> Result<Catalog, AppServicesError> {
    let Some(path) = path else {
        return Ok(Catalog::builtin());
    };
    let raw = tokio::fs::read_to_string(path).await?;
    let catalog = Catalog::from_json(&raw)?;
    tracing::info!(
        path = %path.display(),
        courses = catalog.courses().len(),
        lessons = catalog.lesson_count(),
        "catalog loaded"
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    use course_core::model::LessonId;
    use course_core::time::fixed_clock;
    use storage::repository::KeyValueStore;

    #[tokio::test]
    async fn coordinator_sees_previous_completions() {
        let services = AppServices::new(
            Storage::in_memory(),
            Catalog::builtin(),
            fixed_clock(),
            PathBuf::from("."),
        );
        services
            .storage()
            .kv
            .put("completed", r#"["a3"]"#)
            .await
            .unwrap();

        let coordinator = services.load_coordinator().await;
        assert!(
            coordinator
                .tracker()
                .is_complete(&LessonId::new("a3").unwrap())
        );
    }

    #[tokio::test]
    async fn load_catalog_defaults_to_builtin() {
        let catalog = load_catalog(None).await.unwrap();
        assert_eq!(catalog, Catalog::builtin());
    }

    #[tokio::test]
    async fn load_catalog_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"id": 9, "title": "Rust", "lessons": [{"id": "ru1", "title": "Ownership", "videoId": "abc123"}]}]"#,
        )
        .unwrap();

        let catalog = load_catalog(Some(&path)).await.unwrap();
        assert_eq!(catalog.lesson_count(), 1);
        assert_eq!(catalog.courses()[0].title(), "Rust");
    }

    #[tokio::test]
    async fn load_catalog_reports_missing_file() {
        let err = load_catalog(Some(Path::new("/definitely/not/here.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppServicesError::CatalogFile(_)));
    }
}
