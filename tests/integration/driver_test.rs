// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::scripted_engine::{Counters, ScriptedEngine, Step};
use crate::integration::helpers::{test_settings, TEST_FEED_URL};
use rssgrab::engines::driver::RenderingDriver;
use rssgrab::engines::idle::NetworkIdle;
use rssgrab::engines::traits::EngineError;
use std::path::Path;

fn driver(idle: NetworkIdle) -> RenderingDriver {
    let settings = test_settings(Path::new("feed.xml"));
    RenderingDriver::new(TEST_FEED_URL, &settings.page, idle)
}

#[tokio::test(start_paused = true)]
async fn test_fetch_once_reads_both_candidates() {
    let engine = ScriptedEngine::new(
        "scripted",
        NetworkIdle::AlmostIdle,
        vec![Step::pre("<rss version=\"2.0\"></rss>")],
    );
    let session = engine.session();

    let candidate = driver(NetworkIdle::AlmostIdle)
        .fetch_once(&session)
        .await
        .unwrap();

    assert_eq!(
        candidate.preformatted.as_deref(),
        Some("<rss version=\"2.0\"></rss>")
    );
    assert!(candidate.full_document.contains("<pre>"));
    assert_eq!(
        *engine.counters.idle_conditions.lock().unwrap(),
        vec![NetworkIdle::AlmostIdle]
    );
}

#[tokio::test(start_paused = true)]
async fn test_fetch_feed_prefers_preformatted_text() {
    let engine = ScriptedEngine::new(
        "scripted",
        NetworkIdle::Idle,
        vec![Step::pre("  <rss><channel/></rss>\n")],
    );
    let session = engine.session();

    let xml = driver(NetworkIdle::Idle).fetch_feed(&session).await.unwrap();

    assert_eq!(xml, "<rss><channel/></rss>");
    assert_eq!(Counters::get(&engine.counters.pages_opened), 1);
    assert_eq!(Counters::get(&engine.counters.pages_closed), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_feed_falls_back_to_document_markup() {
    let document = "<html><body><rss version=\"2.0\"><channel></channel></rss></body></html>";
    let engine = ScriptedEngine::new(
        "scripted",
        NetworkIdle::Idle,
        vec![Step::document(document)],
    );
    let session = engine.session();

    let xml = driver(NetworkIdle::Idle).fetch_feed(&session).await.unwrap();

    assert_eq!(
        xml,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\"><channel></channel></rss>"
    );
}

#[tokio::test(start_paused = true)]
async fn test_fetch_feed_decodes_escaped_preformatted_text() {
    let escaped = "&lt;rss&gt;&lt;title&gt;A &amp;amp; B&lt;/title&gt;&lt;/rss&gt;";
    let engine = ScriptedEngine::new(
        "scripted",
        NetworkIdle::Idle,
        vec![Step::Render {
            preformatted: Some(escaped.to_string()),
            document: "<html><body><pre>escaped twice</pre></body></html>".to_string(),
        }],
    );
    let session = engine.session();

    let xml = driver(NetworkIdle::Idle).fetch_feed(&session).await.unwrap();

    // Decoded exactly once, without a declaration
    assert_eq!(xml, "<rss><title>A &amp; B</title></rss>");
}

#[tokio::test(start_paused = true)]
async fn test_page_without_feed_is_an_attempt_failure() {
    let engine = ScriptedEngine::new(
        "scripted",
        NetworkIdle::Idle,
        vec![Step::document("<html><body>Just a moment...</body></html>")],
    );
    let session = engine.session();

    let error = driver(NetworkIdle::Idle)
        .fetch_feed(&session)
        .await
        .unwrap_err();

    match error {
        EngineError::NoFeedContent { url } => assert_eq!(url, TEST_FEED_URL),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(Counters::get(&engine.counters.pages_closed), 1);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_failure_still_closes_page() {
    let engine = ScriptedEngine::new("scripted", NetworkIdle::Idle, vec![Step::TimesOut]);
    let session = engine.session();

    let error = driver(NetworkIdle::Idle)
        .fetch_feed(&session)
        .await
        .unwrap_err();

    assert!(matches!(error, EngineError::Timeout { .. }));
    assert!(error.to_string().contains(TEST_FEED_URL));
    assert_eq!(Counters::get(&engine.counters.pages_opened), 1);
    assert_eq!(Counters::get(&engine.counters.pages_closed), 1);
}
