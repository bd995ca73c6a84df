//! End-to-end tests over the disk store: install a fixture course,
//! serve its files through the content resolver, and drive a full
//! runtime session through the dispatcher.

mod common;

use std::sync::Arc;

use tempfile::TempDir;

use scormdeck::catalog::LearnerDataStore;
use scormdeck::content::ResolveOutcome;
use scormdeck::manifest::ScormVersion;
use scormdeck::player::{Player, PlayerError};
use scormdeck::store::LocalPackageStore;

use common::{descriptor, fixture_zip, MockCatalog, MockFetcher, MockLearnerStore, INDEX_HTML};

fn player_on_disk(temp: &TempDir, fetcher: MockFetcher) -> (Player, Arc<MockLearnerStore>) {
    let learner_store = Arc::new(MockLearnerStore::default());
    let player = Player::new(
        Arc::new(LocalPackageStore::new(temp.path())),
        Arc::new(MockCatalog {
            courses: vec![descriptor("course-42")],
        }),
        Arc::clone(&learner_store) as Arc<dyn LearnerDataStore>,
        Arc::new(fetcher),
        "http://backend:4000",
        "scorm-content",
    );
    (player, learner_store)
}

#[tokio::test]
async fn test_install_then_serve_concrete_scenario() {
    let temp = TempDir::new().unwrap();
    let (player, _) = player_on_disk(&temp, MockFetcher::serving(&fixture_zip(), 1024));

    let record = player.ensure_course("course-42", None).await.unwrap();
    assert_eq!(record.manifest.version, ScormVersion::V1_2);
    assert_eq!(record.manifest.launch_url, "index.html");

    // The extracted entry document is served back byte for byte.
    let resolver = player.resolver();
    match resolver.resolve("/scorm-content/course-42/index.html").await {
        ResolveOutcome::Response(response) => {
            assert_eq!(response.status, 200);
            assert_eq!(response.content_type, "text/html");
            assert_eq!(response.body, INDEX_HTML);
        }
        other => panic!("expected a response, got {:?}", other),
    }

    // An absent file in an existing course is 404, not a server error.
    match resolver.resolve("/scorm-content/course-42/missing.js").await {
        ResolveOutcome::Response(response) => assert_eq!(response.status, 404),
        other => panic!("expected a response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_runtime_session_over_disk_store() {
    let temp = TempDir::new().unwrap();
    let (player, learner_store) =
        player_on_disk(&temp, MockFetcher::serving(&fixture_zip(), 512));

    let mut session = player.launch("course-42", "learner-7", None).await.unwrap();
    assert_eq!(session.launch_path(), "/scorm-content/course-42/index.html");

    session.frame_loaded();
    assert!(session.begin());
    assert!(session.is_ready());

    let api = session.api();
    assert_eq!(
        api.call("LMSGetValue", &["cmi.core.lesson_status"]).unwrap(),
        "incomplete"
    );
    assert_eq!(
        api.call("LMSSetValue", &["cmi.core.lesson_status", "passed"]).unwrap(),
        "true"
    );
    assert_eq!(api.call("LMSSetValue", &["cmi.core.student_id", "x"]).unwrap(), "false");
    assert_eq!(api.call("LMSGetLastError", &[]).unwrap(), "403");
    assert_eq!(api.call("LMSCommit", &[""]).unwrap(), "true");

    session.teardown().await.unwrap();

    // Commit plus the final commit from Terminate both reached the provider.
    let saved = learner_store.saved.lock();
    assert_eq!(saved.len(), 2);
    assert_eq!(
        saved.last().unwrap().get("cmi.core.lesson_status").unwrap(),
        "passed"
    );
}

#[tokio::test]
async fn test_progress_reaches_100_and_download_survives_restart() {
    let temp = TempDir::new().unwrap();
    let reports = Arc::new(parking_lot::Mutex::new(Vec::new()));
    {
        let (player, _) = player_on_disk(&temp, MockFetcher::serving(&fixture_zip(), 256));
        let reports_clone = Arc::clone(&reports);
        player
            .ensure_course(
                "course-42",
                Some(Box::new(move |p| reports_clone.lock().push(p))),
            )
            .await
            .unwrap();
    }
    let reports = reports.lock();
    assert!(reports.windows(2).all(|w| w[0] <= w[1]), "{:?}", reports);
    assert_eq!(*reports.last().unwrap(), 100);

    // A fresh player over the same directory sees the cached course.
    let (player, _) = player_on_disk(&temp, MockFetcher::serving(b"unused", 8));
    assert!(player.is_installed("course-42").await.unwrap());
    let record = player.course_record("course-42").await.unwrap();
    assert_eq!(record.manifest.launch_url, "index.html");
}

#[tokio::test]
async fn test_mid_stream_failure_leaves_course_absent() {
    let temp = TempDir::new().unwrap();
    let zip = fixture_zip();
    let (player, _) = player_on_disk(&temp, MockFetcher::breaking_after(&zip[..zip.len() / 2], 128));

    let err = player.ensure_course("course-42", None).await.unwrap_err();
    assert!(matches!(err, PlayerError::Pipeline(_)));
    assert!(!player.is_installed("course-42").await.unwrap());

    // A retry with a healthy transport succeeds against the same store.
    let (player, _) = player_on_disk(&temp, MockFetcher::serving(&zip, 128));
    let record = player.ensure_course("course-42", None).await.unwrap();
    assert_eq!(record.manifest.title, "Lesson One");
}
