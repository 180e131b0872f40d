use std::collections::HashMap;
use std::sync::Arc;

use kanal::AsyncReceiver;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tsuyaku_capture::ViewportCapture;
use tsuyaku_config::{Config, ConfigStore};
use tsuyaku_translator::{Backends, Translation};
use tsuyaku_types::{
    Backend, CapturePayload, CaptureRequest, DispatcherMessage, RequestId, UiMessage,
};

use crate::bus::TabSink;
use crate::events::{translate_region, translate_text};

pub const TIMED_OUT: &str = "Translation timed out";

/// Collaborators shared by every request
pub struct DispatchContext {
    pub config: Arc<dyn ConfigStore>,
    pub capture: Arc<dyn ViewportCapture>,
    pub backends: Backends,
    pub sink: Arc<dyn TabSink>,
}

/// Privileged-side service: one instance per process.
///
/// `handle` only registers and spawns; each request then runs
/// capture, crop, encode, call and respond in order on its own task, and
/// answers its origin tab with exactly one result unless cancelled.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<DispatchContext>,
    inflight: Arc<Mutex<HashMap<RequestId, CancellationToken>>>,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(ctx: DispatchContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        }
    }

    pub async fn handle(&self, message: UiMessage) {
        match message {
            UiMessage::Capture(request) => self.dispatch(request).await,
            UiMessage::Cancel { id } => self.cancel(id).await,
        }
    }

    /// Drain a UI -> dispatcher channel until it closes or `shutdown` is called.
    ///
    /// Shutdown closes the channel rather than racing `recv`, so a message is
    /// never taken off the channel and then dropped.
    pub async fn serve(&self, rx: AsyncReceiver<UiMessage>) -> anyhow::Result<()> {
        tracing::info!("[DISPATCHER] Waiting for requests");

        let closer = {
            let rx = rx.clone();
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                shutdown.cancelled().await;
                let _ = rx.close();
            })
        };

        while let Ok(message) = rx.recv().await {
            if self.shutdown.is_cancelled() {
                break;
            }
            self.handle(message).await;
        }
        tracing::info!("[DISPATCHER] Request channel closed");

        closer.abort();
        Ok(())
    }

    /// Cancel every in-flight request and stop `serve`
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub async fn in_flight(&self) -> usize {
        self.inflight.lock().await.len()
    }

    async fn dispatch(&self, request: CaptureRequest) {
        let id = request.id;
        let token = self.shutdown.child_token();

        if self.inflight.lock().await.insert(id, token.clone()).is_some() {
            tracing::warn!("Request {id} dispatched twice, the first can no longer be cancelled");
        }
        tracing::debug!(
            "Dispatching {id} for {} from {}",
            request.backend,
            request.origin_tab
        );

        let this = self.clone();
        tokio::spawn(async move {
            this.process(request, token).await;
            this.inflight.lock().await.remove(&id);
        });
    }

    async fn cancel(&self, id: RequestId) {
        match self.inflight.lock().await.remove(&id) {
            Some(token) => {
                tracing::debug!("Cancelling {id}");
                token.cancel();
            }
            None => tracing::debug!("Cancel for {id} ignored, not in flight"),
        }
    }

    async fn process(&self, request: CaptureRequest, token: CancellationToken) {
        let config = self.ctx.config.load().await;
        let deadline = config.request_timeout();

        let translation = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Request {} cancelled, no result sent", request.id);
                return;
            }
            outcome = tokio::time::timeout(deadline, self.execute(&request, &config)) => {
                outcome.unwrap_or_else(|_| {
                    tracing::warn!("Request {} exceeded {:?}", request.id, deadline);
                    Translation::new(failure_tag(&request), TIMED_OUT)
                })
            }
        };

        self.ctx
            .sink
            .send_to_tab(
                request.origin_tab,
                DispatcherMessage::TranslationResult(translation.into_result(request.id)),
            )
            .await;
    }

    async fn execute(&self, request: &CaptureRequest, config: &Config) -> Translation {
        match &request.payload {
            CapturePayload::Text(text) => {
                translate_text(&self.ctx, request.backend, text, config).await
            }
            CapturePayload::ScreenshotRegion(rect) => {
                translate_region(&self.ctx, request, *rect, config).await
            }
        }
    }
}

fn failure_tag(request: &CaptureRequest) -> Backend {
    if request.is_screenshot() {
        Backend::ScreenshotError
    } else {
        request.backend
    }
}
