use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;
use tsuyaku_translator::{Backends, DeeplClient};
use tsuyaku_types::{Backend, CaptureRequest, DispatcherMessage, Point, TabId, UiMessage};
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{Harness, ScriptedBackend, TAB, assert_silent, next_message};
use crate::TIMED_OUT;

#[tokio::test]
async fn test_text_request_answers_origin_tab_once() {
    let harness = Harness::new(Backends::new().with(ScriptedBackend::new(Backend::DeepL, "cat")));
    let inbox = harness.router.register(TAB).await;

    let request = CaptureRequest::text(TAB, Backend::DeepL, "Katze", Point::default());
    let id = request.id;
    harness.dispatcher.handle(UiMessage::Capture(request)).await;

    match next_message(&inbox).await {
        DispatcherMessage::TranslationResult(result) => {
            assert_eq!(result.id, id);
            assert_eq!(result.backend, Backend::DeepL);
            assert_eq!(result.text, "cat");
        }
        other => panic!("Wrong message: {:?}", other),
    }
    assert_silent(&inbox, Duration::from_millis(100)).await;
    assert_eq!(harness.dispatcher.in_flight().await, 0);
}

#[tokio::test]
async fn test_concurrent_results_arrive_in_completion_order() {
    let harness = Harness::new(
        Backends::new()
            .with(ScriptedBackend::new(Backend::DeepL, "slow").with_delay(Duration::from_millis(300)))
            .with(ScriptedBackend::new(Backend::OpenAiText, "fast")),
    );
    let inbox = harness.router.register(TAB).await;

    let deepl = CaptureRequest::text(TAB, Backend::DeepL, "x", Point::default());
    let openai = CaptureRequest::text(TAB, Backend::OpenAiText, "x", Point::default());
    let (deepl_id, openai_id) = (deepl.id, openai.id);

    harness.dispatcher.handle(UiMessage::Capture(deepl)).await;
    harness.dispatcher.handle(UiMessage::Capture(openai)).await;

    assert_eq!(next_message(&inbox).await.id(), openai_id);
    assert_eq!(next_message(&inbox).await.id(), deepl_id);
}

#[tokio::test]
async fn test_results_only_reach_their_own_tab() {
    let harness = Harness::new(Backends::new().with(ScriptedBackend::new(Backend::DeepL, "ok")));
    let watching = harness.router.register(TAB).await;
    let origin = harness.router.register(TabId(99)).await;

    let request = CaptureRequest::text(TabId(99), Backend::DeepL, "x", Point::default());
    harness.dispatcher.handle(UiMessage::Capture(request)).await;

    next_message(&origin).await;
    assert_silent(&watching, Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_cancelled_request_sends_nothing() {
    let backend = ScriptedBackend::new(Backend::OpenAiText, "late").with_delay(Duration::from_millis(300));
    let harness = Harness::new(Backends::new().with(backend));
    let inbox = harness.router.register(TAB).await;

    let request = CaptureRequest::text(TAB, Backend::OpenAiText, "x", Point::default());
    let id = request.id;
    harness.dispatcher.handle(UiMessage::Capture(request)).await;
    harness.dispatcher.handle(UiMessage::Cancel { id }).await;

    assert_silent(&inbox, Duration::from_millis(600)).await;
    assert_eq!(harness.dispatcher.in_flight().await, 0);
}

#[tokio::test]
async fn test_deadline_produces_timeout_result() {
    let backend = ScriptedBackend::new(Backend::DeepL, "never").with_delay(Duration::from_secs(10));
    let harness = Harness::new(Backends::new().with(backend));
    harness.config.update(|c| c.request_timeout_secs = 1).await;
    let inbox = harness.router.register(TAB).await;

    let request = CaptureRequest::text(TAB, Backend::DeepL, "x", Point::default());
    harness.dispatcher.handle(UiMessage::Capture(request)).await;

    match next_message(&inbox).await {
        DispatcherMessage::TranslationResult(result) => {
            assert_eq!(result.backend, Backend::DeepL);
            assert_eq!(result.text, TIMED_OUT);
        }
        other => panic!("Wrong message: {:?}", other),
    }
}

#[tokio::test]
async fn test_unregistered_backend_still_answers() {
    let harness = Harness::new(Backends::new());
    let inbox = harness.router.register(TAB).await;

    let request = CaptureRequest::text(TAB, Backend::OpenAiText, "x", Point::default());
    harness.dispatcher.handle(UiMessage::Capture(request)).await;

    match next_message(&inbox).await {
        DispatcherMessage::TranslationResult(result) => {
            assert_eq!(result.text, "OpenAI is not available");
        }
        other => panic!("Wrong message: {:?}", other),
    }
}

#[tokio::test]
async fn test_config_edits_apply_to_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("Authorization", "DeepL-Auth-Key second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translations": [{ "text": "dog" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(Backends::new().with(DeeplClient::new(reqwest::Client::new())));
    let url = format!("{}/v2/translate", server.uri());
    harness.config.update(|c| c.deepl.api_url = url).await;
    let inbox = harness.router.register(TAB).await;

    let first = CaptureRequest::text(TAB, Backend::DeepL, "Hund", Point::default());
    harness.dispatcher.handle(UiMessage::Capture(first)).await;
    match next_message(&inbox).await {
        DispatcherMessage::TranslationResult(result) => assert_eq!(result.text, "API key not set"),
        other => panic!("Wrong message: {:?}", other),
    }

    harness.config.update(|c| c.deepl.api_key = "second".into()).await;

    let second = CaptureRequest::text(TAB, Backend::DeepL, "Hund", Point::default());
    harness.dispatcher.handle(UiMessage::Capture(second)).await;
    match next_message(&inbox).await {
        DispatcherMessage::TranslationResult(result) => assert_eq!(result.text, "dog"),
        other => panic!("Wrong message: {:?}", other),
    }
}

#[tokio::test]
async fn test_serve_stops_on_shutdown() {
    let backend = ScriptedBackend::new(Backend::DeepL, "ok");
    let calls = backend.calls();
    let harness = Harness::new(Backends::new().with(backend));
    let inbox = harness.router.register(TAB).await;

    let (tx, rx) = kanal::bounded_async(8);
    let dispatcher = harness.dispatcher.clone();
    let server = tokio::spawn(async move { dispatcher.serve(rx).await });

    tx.send(UiMessage::Capture(CaptureRequest::text(
        TAB,
        Backend::DeepL,
        "x",
        Point::default(),
    )))
    .await
    .unwrap();
    next_message(&inbox).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    harness.dispatcher.shutdown();
    let result = tokio::time::timeout(Duration::from_secs(2), server).await;
    assert!(matches!(result, Ok(Ok(Ok(())))), "serve did not stop");

    // the request channel is closed, not silently drained
    let late = CaptureRequest::text(TAB, Backend::DeepL, "y", Point::default());
    assert!(tx.send(UiMessage::Capture(late)).await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_serve_answers_every_queued_request() {
    let harness = Harness::new(Backends::new().with(ScriptedBackend::new(Backend::DeepL, "ok")));
    let inbox = harness.router.register(TAB).await;

    let (tx, rx) = kanal::bounded_async(4);
    let dispatcher = harness.dispatcher.clone();
    tokio::spawn(async move { dispatcher.serve(rx).await });

    let mut sent = Vec::new();
    for i in 0..40 {
        let request = CaptureRequest::text(TAB, Backend::DeepL, format!("n{i}"), Point::default());
        sent.push(request.id);
        tx.send(UiMessage::Capture(request)).await.unwrap();
    }

    let mut answered = Vec::new();
    for _ in 0..sent.len() {
        answered.push(next_message(&inbox).await.id());
    }
    answered.sort_by_key(|id| id.to_string());
    sent.sort_by_key(|id| id.to_string());
    assert_eq!(answered, sent);
    assert_silent(&inbox, Duration::from_millis(100)).await;
}
