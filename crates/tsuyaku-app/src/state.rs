use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tsuyaku_capture::{StaticCapture, ViewportCapture};
use tsuyaku_config::{Config, ConfigStore, JsonConfigStore, SharedConfig};
use tsuyaku_translator::Backends;
use tsuyaku_types::Size;

const DEFAULT_VIEWPORT: Size = Size {
    width: 1280.0,
    height: 800.0,
};

/// Where the viewport frame comes from
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSource {
    /// Capture always fails (text-only runs)
    None,
    Image(PathBuf),
    Screen,
}

pub struct AppState {
    pub config: Arc<dyn ConfigStore>,
    pub capture: Arc<dyn ViewportCapture>,
    pub backends: Backends,
    /// CSS-pixel viewport of the simulated tab
    pub viewport: Size,
    pub device_pixel_ratio: f64,
}

impl AppState {
    pub async fn new(
        config_path: Option<&Path>,
        source: FrameSource,
        device_pixel_ratio: f64,
    ) -> anyhow::Result<Self> {
        let config: Arc<dyn ConfigStore> = match config_path {
            Some(path) => {
                tracing::info!("Reading configuration from {}", path.display());
                Arc::new(JsonConfigStore::new(path))
            }
            None => Arc::new(SharedConfig::new(Config::from_env())),
        };

        let (capture, viewport): (Arc<dyn ViewportCapture>, Size) = match source {
            FrameSource::None => (
                Arc::new(StaticCapture::denied("no frame source")),
                DEFAULT_VIEWPORT,
            ),
            FrameSource::Image(path) => {
                let capture = StaticCapture::from_png_file(&path)?;
                let viewport = capture
                    .frame_size()
                    .map_or(DEFAULT_VIEWPORT, |size| css_viewport(size, device_pixel_ratio));
                tracing::info!(
                    "Using {} as the viewport ({}x{} css px)",
                    path.display(),
                    viewport.width,
                    viewport.height
                );
                (Arc::new(capture), viewport)
            }
            FrameSource::Screen => screen_capture()?,
        };

        Ok(Self {
            config,
            capture,
            backends: Backends::standard(reqwest::Client::new()),
            viewport,
            device_pixel_ratio,
        })
    }

    /// How long the simulated tab waits before giving up on a panel
    pub async fn settle_timeout(&self) -> Duration {
        // the dispatcher answers every request by its own deadline
        self.config.load().await.request_timeout() + Duration::from_secs(5)
    }
}

fn css_viewport((width, height): (u32, u32), device_pixel_ratio: f64) -> Size {
    let scale = tsuyaku_capture::scale_factor(Some(device_pixel_ratio));
    Size::new(width as f64 / scale, height as f64 / scale)
}

#[cfg(feature = "screen")]
fn screen_capture() -> anyhow::Result<(Arc<dyn ViewportCapture>, Size)> {
    Ok((Arc::new(tsuyaku_capture::ScreenCapture), DEFAULT_VIEWPORT))
}

#[cfg(not(feature = "screen"))]
fn screen_capture() -> anyhow::Result<(Arc<dyn ViewportCapture>, Size)> {
    anyhow::bail!("--screen needs a build with the `screen` feature")
}
