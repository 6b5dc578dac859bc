// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::scripted_engine::{Counters, ScriptedEngine, Step};
use crate::integration::helpers::{test_router, test_settings};
use rssgrab::application::use_cases::fetch_feed::{FetchFeedError, FetchFeedUseCase};
use rssgrab::engines::idle::NetworkIdle;
use rssgrab::engines::traits::{BrowserEngine, EngineError};
use rssgrab::infrastructure::storage::LocalFileStorage;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test(start_paused = true)]
async fn test_secondary_engine_rescues_the_run() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("feed.xml");
    let settings = test_settings(&output);

    let primary = Arc::new(ScriptedEngine::failing("chromiumoxide", NetworkIdle::AlmostIdle));
    let secondary = Arc::new(ScriptedEngine::new(
        "headless_chrome",
        NetworkIdle::Idle,
        vec![
            Step::TimesOut,
            Step::pre("\n<rss version=\"2.0\"><channel><title>Issue\u{0}</title></channel></rss>\n"),
        ],
    ));
    let engines: Vec<Arc<dyn BrowserEngine>> = vec![primary.clone(), secondary.clone()];
    let router = Arc::new(test_router(engines, settings.clone()));
    let storage = Arc::new(LocalFileStorage::new(&settings.fetch.output_path));

    let path = FetchFeedUseCase::new(router, storage)
        .execute()
        .await
        .unwrap();

    assert_eq!(path, output);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "<rss version=\"2.0\"><channel><title>Issue</title></channel></rss>"
    );
    assert_eq!(Counters::get(&primary.counters.navigations), 3);
    assert_eq!(Counters::get(&secondary.counters.navigations), 2);
}

#[tokio::test(start_paused = true)]
async fn test_total_failure_writes_nothing() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("feed.xml");
    let settings = test_settings(&output);

    let engines: Vec<Arc<dyn BrowserEngine>> = vec![
        Arc::new(ScriptedEngine::failing("chromiumoxide", NetworkIdle::AlmostIdle)),
        Arc::new(ScriptedEngine::failing("headless_chrome", NetworkIdle::Idle)),
    ];
    let router = Arc::new(test_router(engines, settings.clone()));
    let storage = Arc::new(LocalFileStorage::new(&output));

    let error = FetchFeedUseCase::new(router, storage)
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        FetchFeedError::Acquire(EngineError::Exhausted { .. })
    ));
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_total_failure_keeps_previous_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("feed.xml");
    std::fs::write(&output, "<rss>yesterday</rss>").unwrap();
    let settings = test_settings(&output);

    let engines: Vec<Arc<dyn BrowserEngine>> = vec![
        Arc::new(ScriptedEngine::unlaunchable("chromiumoxide", NetworkIdle::AlmostIdle)),
        Arc::new(ScriptedEngine::new(
            "headless_chrome",
            NetworkIdle::Idle,
            vec![Step::document("<html><body>Please enable JavaScript</body></html>")],
        )),
    ];
    let router = Arc::new(test_router(engines, settings.clone()));
    let storage = Arc::new(LocalFileStorage::new(&output));

    let result = FetchFeedUseCase::new(router, storage).execute().await;

    assert!(result.is_err());
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "<rss>yesterday</rss>"
    );
}
