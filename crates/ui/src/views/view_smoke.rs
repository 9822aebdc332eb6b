use services::COMPLETED_KEY;
use storage::repository::KeyValueStore;

use super::test_harness::setup_view_harness;

#[tokio::test(flavor = "current_thread")]
async fn course_view_smoke_renders_first_lesson_and_catalog() {
    let mut harness = setup_view_harness(None).await;
    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("Intro to React"), "missing lesson title in {html}");
    assert!(html.contains("React Basics"), "missing course title in {html}");
    assert!(html.contains("Advanced React"), "missing course title in {html}");
    assert!(html.contains(r#"id="player""#), "missing player mount in {html}");
    assert!(html.contains("0 of 6 lessons complete"), "missing progress in {html}");
    assert!(!html.contains("Completed"), "nothing should be completed in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn course_view_smoke_marks_preloaded_lessons() {
    let mut harness = setup_view_harness(Some(r#"["r1","a1"]"#)).await;
    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("2 of 6 lessons complete"), "missing progress in {html}");
    assert!(html.contains("width: 33%"), "missing progress width in {html}");
    assert_eq!(html.matches("Completed").count(), 2, "expected two completed cards in {html}");
    assert!(
        !html.contains("Download Certificate"),
        "certificate must stay hidden below 100% in {html}"
    );

    let stored = harness.storage.kv.get(COMPLETED_KEY).await.unwrap();
    assert_eq!(stored.as_deref(), Some(r#"["r1","a1"]"#), "rendering must not write");
}

#[tokio::test(flavor = "current_thread")]
async fn course_view_smoke_offers_certificate_when_everything_is_done() {
    let mut harness =
        setup_view_harness(Some(r#"["r1","r2","r3","a1","a2","a3"]"#)).await;
    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("6 of 6 lessons complete"), "missing progress in {html}");
    assert!(html.contains("Download Certificate"), "missing certificate button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn course_view_smoke_ignores_stale_history() {
    let mut harness = setup_view_harness(Some(r#"["r1","retired-lesson"]"#)).await;
    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("1 of 6 lessons complete"), "missing progress in {html}");
    assert_eq!(html.matches("Completed").count(), 1, "expected one completed card in {html}");
}
