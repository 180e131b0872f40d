use std::sync::Arc;
use std::time::Duration;

use tsuyaku_capture::StaticCapture;
use tsuyaku_config::{Config, SharedConfig};
use tsuyaku_translator::{Backends, CREDENTIALS_NOT_SET, KEY_NOT_SET};
use tsuyaku_types::{Backend, Point, Rect, Size};
use tsuyaku_ui::{InputEvent, PaneContent};

use crate::controller::AppController;
use crate::state::AppState;

fn offline_state() -> AppState {
    AppState {
        config: Arc::new(SharedConfig::new(Config::default())),
        capture: Arc::new(StaticCapture::denied("screen recording disabled")),
        backends: Backends::standard(reqwest::Client::new()),
        viewport: Size::new(800.0, 600.0),
        device_pixel_ratio: 1.0,
    }
}

#[tokio::test]
async fn test_text_run_without_credentials_reports_each_backend() {
    let controller = AppController::new(offline_state()).await;
    let mut tasks = controller.spawn_tasks();

    let panel = tokio::time::timeout(
        Duration::from_secs(5),
        controller.drive(vec![
            InputEvent::TextSelected {
                text: "Hallo Welt".into(),
                bounds: Rect::new(100.0, 300.0, 80.0, 16.0),
            },
            InputEvent::ActivateAffordance,
        ]),
    )
    .await
    .expect("Timeout waiting for panel")
    .unwrap();

    assert_eq!(panel.panes.len(), 2);
    assert_eq!(panel.panes[0].backend, Backend::DeepL);
    assert_eq!(panel.panes[0].content, PaneContent::Text(KEY_NOT_SET.into()));
    assert_eq!(panel.panes[1].content, PaneContent::Text(CREDENTIALS_NOT_SET.into()));

    controller.shutdown().await;
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_refused_capture_still_opens_the_panel() {
    let controller = AppController::new(offline_state()).await;
    let mut tasks = controller.spawn_tasks();

    let panel = tokio::time::timeout(
        Duration::from_secs(5),
        controller.drive(vec![
            InputEvent::RegionDragged {
                start: Point::new(10.0, 100.0),
                end: Point::new(60.0, 140.0),
            },
            InputEvent::ActivateAffordance,
        ]),
    )
    .await
    .expect("Timeout waiting for panel")
    .unwrap();

    assert_eq!(panel.panes.len(), 1);
    assert_eq!(panel.panes[0].backend, Backend::OpenAiVision);
    match &panel.panes[0].content {
        PaneContent::Text(text) => {
            assert!(text.starts_with("Error capturing screenshot"), "{text}");
            assert!(text.contains("screen recording disabled"));
        }
        other => panic!("Unexpected pane content {:?}", other),
    }

    controller.shutdown().await;
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }
}
