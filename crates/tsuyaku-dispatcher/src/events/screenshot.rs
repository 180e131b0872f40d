use tsuyaku_capture::{RgbaImage, crop, encode_png};
use tsuyaku_config::Config;
use tsuyaku_translator::{Payload, Translation};
use tsuyaku_types::{Backend, CaptureRequest, DispatcherMessage, Rect};

use crate::dispatcher::DispatchContext;

/// Capture, crop, encode, then ask the vision backend
pub async fn translate_region(
    ctx: &DispatchContext,
    request: &CaptureRequest,
    rect: Rect,
    config: &Config,
) -> Translation {
    let frame = ctx.capture.capture_visible(request.origin_tab).await;

    // Sent on failure too, so the tab never waits on a panel that cannot come
    ctx.sink
        .send_to_tab(
            request.origin_tab,
            DispatcherMessage::ScreenshotCaptured {
                id: request.id,
                anchor: request.anchor,
            },
        )
        .await;

    let frame = match frame {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(">>> [SCREENSHOT] Capture failed: {e}");
            return Translation::new(
                Backend::ScreenshotError,
                format!("Error capturing screenshot: {e}"),
            );
        }
    };
    tracing::debug!(
        ">>> [SCREENSHOT] Captured {}x{} frame",
        frame.width(),
        frame.height()
    );

    if !rect.is_valid() {
        tracing::warn!(">>> [SCREENSHOT] Rejected selection {:?}", rect);
        return Translation::new(
            Backend::ScreenshotError,
            "Error processing screenshot: invalid selection",
        );
    }

    let data_url = match prepare_image(frame, rect, request.device_pixel_ratio).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(">>> [SCREENSHOT] {e}");
            return Translation::new(
                Backend::ScreenshotError,
                format!("Error processing screenshot: {e}"),
            );
        }
    };

    let Some(client) = ctx.backends.get(Backend::OpenAiVision) else {
        tracing::warn!("No vision client registered");
        return Translation::new(Backend::ScreenshotError, "Vision backend is not available");
    };

    client.translate(&Payload::Image { data_url }, config).await
}

async fn prepare_image(
    frame: RgbaImage,
    rect: Rect,
    device_pixel_ratio: Option<f64>,
) -> anyhow::Result<String> {
    let encoded = tokio::task::spawn_blocking(move || {
        let cropped = crop(&frame, rect, device_pixel_ratio)?;
        encode_png(&cropped)
    })
    .await??;

    tracing::debug!(
        ">>> [SCREENSHOT] Encoded {}x{} crop, {} bytes",
        encoded.width,
        encoded.height,
        encoded.png.len()
    );
    Ok(encoded.data_url())
}
