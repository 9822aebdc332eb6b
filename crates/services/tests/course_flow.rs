use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use course_core::model::{Catalog, LessonId, PlayerEvent, PlayerState, VideoRef};
use course_core::time::fixed_clock;
use services::{
    AppServices, PlaybackCoordinator, PlaybackOutcome, PlayerEventSink, SurfaceError,
    VideoSurface, COMPLETED_KEY,
};
use storage::repository::{InMemoryStore, KeyValueStore, Storage};

struct NullSurface;

#[async_trait(?Send)]
impl VideoSurface for NullSurface {
    async fn load(&mut self, _video: &VideoRef) -> Result<(), SurfaceError> {
        Ok(())
    }
}

fn id(raw: &str) -> LessonId {
    LessonId::new(raw).unwrap()
}

/// Coordinator with a surface that has already reported ready.
async fn ready_coordinator(services: &AppServices) -> (PlaybackCoordinator, PlayerEventSink) {
    let mut coordinator = services.load_coordinator().await;
    let sink = coordinator.attach_surface(Box::new(NullSurface));
    sink.send(PlayerEvent::Ready).unwrap();
    coordinator.pump().await.unwrap();
    (coordinator, sink)
}

fn services_with(store: InMemoryStore, out_dir: PathBuf) -> AppServices {
    AppServices::new(
        Storage::from_store(Arc::new(store)),
        Catalog::builtin(),
        fixed_clock(),
        out_dir,
    )
}

#[tokio::test]
async fn preloaded_history_starts_at_two_of_six() {
    let store = InMemoryStore::with_entry(COMPLETED_KEY, r#"["r1","a1"]"#);
    let services = services_with(store, PathBuf::from("."));

    let coordinator = services.load_coordinator().await;
    let progress = coordinator.progress();
    assert_eq!((progress.completed(), progress.total()), (2, 6));
    assert!((progress.ratio() - 2.0 / 6.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn watching_every_lesson_unlocks_certificate() {
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryStore::new();
    let services = services_with(store.clone(), dir.path().to_path_buf());

    let (mut coordinator, sink) = ready_coordinator(&services).await;

    let lessons: Vec<LessonId> = services
        .catalog()
        .lessons()
        .map(|lesson| lesson.id().clone())
        .collect();

    for (watched, lesson) in lessons.iter().enumerate() {
        assert!(!coordinator.progress().is_complete(), "unlocked after {watched}");
        coordinator.select_lesson(lesson).await.unwrap();
        sink.send(PlayerEvent::StateChanged(PlayerState::Playing)).unwrap();
        sink.send(PlayerEvent::StateChanged(PlayerState::Ended)).unwrap();
        let outcomes = coordinator.pump().await.unwrap();
        assert_eq!(
            outcomes.last(),
            Some(&PlaybackOutcome::LessonCompleted(lesson.clone()))
        );
    }

    assert!(coordinator.progress().is_complete());
    assert_eq!(coordinator.progress().ratio(), 1.0);

    let emitter = services.certificates();
    let document = emitter.emit(Some("Grace")).unwrap();
    let path = emitter.save(&document).await.unwrap();
    assert!(path.ends_with("certificate.pdf"));
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));

    let raw = store.get(COMPLETED_KEY).await.unwrap().unwrap();
    let stored: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.len(), 6);
}

#[tokio::test]
async fn five_of_six_keeps_certificate_locked() {
    let store = InMemoryStore::with_entry(COMPLETED_KEY, r#"["r1","r2","r3","a1","a2"]"#);
    let services = services_with(store, PathBuf::from("."));

    let (mut coordinator, _sink) = ready_coordinator(&services).await;
    assert!(!coordinator.progress().is_complete());

    coordinator.select_lesson(&id("a3")).await.unwrap();
    coordinator.on_playback_ended().await.unwrap();
    assert!(coordinator.progress().is_complete());
}

#[tokio::test]
async fn history_survives_restart_on_sqlite() {
    let db_url = "sqlite:file:memdb_course_flow?mode=memory&cache=shared";
    let first = AppServices::new_sqlite(db_url, Catalog::builtin(), fixed_clock(), PathBuf::from("."))
        .await
        .expect("sqlite services");

    let (mut coordinator, _sink) = ready_coordinator(&first).await;
    coordinator.select_lesson(&id("r2")).await.unwrap();
    coordinator.on_playback_ended().await.unwrap();

    let reloaded = first.load_coordinator().await;
    assert!(reloaded.tracker().is_complete(&id("r2")));
    assert_eq!(reloaded.progress().completed(), 1);
}

#[tokio::test]
async fn corrupt_history_starts_fresh() {
    let store = InMemoryStore::with_entry(COMPLETED_KEY, "[\"r1\",");
    let services = services_with(store.clone(), PathBuf::from("."));

    let (mut coordinator, _sink) = ready_coordinator(&services).await;
    assert_eq!(coordinator.progress().completed(), 0);

    coordinator.on_playback_ended().await.unwrap();
    assert_eq!(
        store.get(COMPLETED_KEY).await.unwrap().as_deref(),
        Some(r#"["r1"]"#)
    );
}
