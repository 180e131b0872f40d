mod dispatcher_tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kanal::AsyncReceiver;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tsuyaku_capture::{StaticCapture, ViewportCapture};
use tsuyaku_config::{Config, SharedConfig};
use tsuyaku_translator::{BackendClient, Backends, Capabilities, Payload, TranslateError};
use tsuyaku_types::{Backend, DispatcherMessage, TabId};

use crate::{DispatchContext, Dispatcher, TabRouter};

/// Deterministic backend with an optional delay; records what it was sent
pub struct ScriptedBackend {
    backend: Backend,
    reply: String,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    payloads: Arc<Mutex<Vec<Payload>>>,
}

impl ScriptedBackend {
    pub fn new(backend: Backend, reply: &str) -> Self {
        Self {
            backend,
            reply: reply.to_string(),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn payloads(&self) -> Arc<Mutex<Vec<Payload>>> {
        self.payloads.clone()
    }
}

#[async_trait]
impl BackendClient for ScriptedBackend {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn capabilities(&self) -> Capabilities {
        match self.backend {
            Backend::OpenAiVision => Capabilities::IMAGE,
            _ => Capabilities::TEXT,
        }
    }

    async fn request(&self, payload: &Payload, _config: &Config) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().await.push(payload.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.reply.clone())
    }
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub router: TabRouter,
    pub config: SharedConfig,
}

impl Harness {
    pub fn new(backends: Backends) -> Self {
        Self::with_capture(backends, StaticCapture::new(tsuyaku_capture::RgbaImage::new(100, 80)))
    }

    pub fn with_capture(backends: Backends, capture: impl ViewportCapture + 'static) -> Self {
        let router = TabRouter::new();
        let config = SharedConfig::new(Config::default());
        let dispatcher = Dispatcher::new(DispatchContext {
            config: Arc::new(config.clone()),
            capture: Arc::new(capture),
            backends,
            sink: Arc::new(router.clone()),
        });

        Self {
            dispatcher,
            router,
            config,
        }
    }
}

pub async fn next_message(rx: &AsyncReceiver<DispatcherMessage>) -> DispatcherMessage {
    match timeout(Duration::from_secs(5), rx.recv()).await {
        Ok(Ok(message)) => message,
        Ok(Err(e)) => panic!("Channel error: {}", e),
        Err(_) => panic!("Timeout - message never arrived!"),
    }
}

pub async fn assert_silent(rx: &AsyncReceiver<DispatcherMessage>, wait: Duration) {
    if let Ok(message) = timeout(wait, rx.recv()).await {
        panic!("Unexpected message: {:?}", message);
    }
}

pub const TAB: TabId = TabId(7);
