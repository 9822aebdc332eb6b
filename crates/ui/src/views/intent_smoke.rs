use services::COMPLETED_KEY;
use storage::repository::KeyValueStore;

use super::course::CourseIntent;
use super::test_harness::{ViewHarness, setup_view_harness, setup_view_harness_in};

const ALL_DONE: &str = r#"["r1","r2","r3","a1","a2","a3"]"#;

fn current_lesson(harness: &ViewHarness) -> Option<String> {
    harness.handles.vm().and_then(|vm| vm.current_lesson_id)
}

#[tokio::test(flavor = "current_thread")]
async fn course_intents_smoke_select_moves_title_and_marker() {
    let mut harness = setup_view_harness(None).await;
    harness.rebuild();
    let dispatch = harness.handles.dispatch();

    dispatch.call(CourseIntent::SelectLesson("a2".to_string()));
    harness.drive_async().await;
    let html = harness.render();

    assert_eq!(current_lesson(&harness).as_deref(), Some("a2"));
    assert!(
        html.contains(r#"class="course__lesson-title">React Router"#),
        "title did not follow selection in {html}"
    );
    assert_eq!(html.matches("lesson-card--current").count(), 1, "one current card in {html}");

    dispatch.call(CourseIntent::SelectLesson("retired-lesson".to_string()));
    harness.drive_async().await;
    let html = harness.render();

    assert_eq!(current_lesson(&harness).as_deref(), Some("a2"), "unknown id keeps selection");
    assert!(html.contains(r#"role="alert""#), "missing error banner in {html}");
    assert_eq!(harness.storage.kv.get(COMPLETED_KEY).await.unwrap(), None);
}

#[tokio::test(flavor = "current_thread")]
async fn course_intents_smoke_dismiss_keeps_fallback_player() {
    let mut harness = setup_view_harness(None).await;
    harness.rebuild();

    harness.handles.signals().mark_player_unavailable();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("The video player could not be loaded."), "missing notice in {html}");
    assert!(
        html.contains("https://www.youtube.com/embed/dGcsHMXbSOA?enablejsapi=1"),
        "missing fallback embed in {html}"
    );

    harness.handles.dispatch().call(CourseIntent::DismissError);
    harness.drive_async().await;
    let html = harness.render();
    assert!(!html.contains(r#"role="alert""#), "banner should be dismissed in {html}");
    assert!(html.contains("course__player-fallback"), "fallback player was removed in {html}");

    harness
        .handles
        .dispatch()
        .call(CourseIntent::SelectLesson("r2".to_string()));
    harness.drive_async().await;
    let html = harness.render();
    assert!(
        html.contains("https://www.youtube.com/embed/w7ejDZ8SWv8?enablejsapi=1"),
        "fallback embed should follow selection in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn course_intents_smoke_certificate_ignored_below_full_progress() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness =
        setup_view_harness_in(Some(r#"["r1","a1"]"#), dir.path().to_path_buf()).await;
    harness.rebuild();

    harness.handles.dispatch().call(CourseIntent::DownloadCertificate);
    harness.drive_async().await;
    let html = harness.render();

    assert!(!dir.path().join("certificate.pdf").exists());
    assert!(!html.contains("Certificate saved"), "unexpected notice in {html}");
    assert!(!html.contains(r#"role="alert""#), "unexpected error in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn course_intents_smoke_certificate_saved_when_complete() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = setup_view_harness_in(Some(ALL_DONE), dir.path().to_path_buf()).await;
    harness.rebuild();

    harness.handles.dispatch().call(CourseIntent::DownloadCertificate);
    let path = dir.path().join("certificate.pdf");
    for _ in 0..20 {
        harness.drive_async().await;
        if harness.render().contains("Certificate saved") {
            break;
        }
    }

    let html = harness.render();
    assert!(html.contains("Certificate saved to"), "missing notice in {html}");
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
}

#[tokio::test(flavor = "current_thread")]
async fn course_intents_smoke_selection_waits_for_busy_coordinator() {
    let mut harness = setup_view_harness(None).await;
    harness.rebuild();

    let held = harness.handles.take_coordinator().expect("coordinator available");
    harness
        .handles
        .dispatch()
        .call(CourseIntent::SelectLesson("r3".to_string()));
    harness
        .handles
        .dispatch()
        .call(CourseIntent::SelectLesson("a3".to_string()));
    harness.drive_async().await;
    assert_eq!(current_lesson(&harness).as_deref(), Some("r1"));

    harness.handles.restore_coordinator(held).await;
    harness.drive_async().await;
    let html = harness.render();

    assert_eq!(current_lesson(&harness).as_deref(), Some("a3"), "latest click wins");
    assert!(
        html.contains(r#"class="course__lesson-title">Performance Optimization"#),
        "view did not refresh in {html}"
    );
}
