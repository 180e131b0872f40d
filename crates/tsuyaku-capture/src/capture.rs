use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use tsuyaku_types::TabId;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Platform(String),
}

/// Source of full visible-viewport frames for a tab
#[async_trait]
pub trait ViewportCapture: Send + Sync {
    async fn capture_visible(&self, tab: TabId) -> Result<RgbaImage, CaptureError>;
}

/// Serves one fixed frame, or refuses every capture
#[derive(Clone)]
pub struct StaticCapture {
    frame: Result<Arc<RgbaImage>, String>,
}

impl StaticCapture {
    pub fn new(frame: RgbaImage) -> Self {
        Self {
            frame: Ok(Arc::new(frame)),
        }
    }

    /// Behaves like a platform that refuses screen capture
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            frame: Err(reason.into()),
        }
    }

    pub fn from_png_file(path: &Path) -> Result<Self, CaptureError> {
        let frame = image::open(path)
            .map_err(|e| CaptureError::Platform(format!("failed to load {}: {e}", path.display())))?
            .to_rgba8();
        tracing::debug!("Loaded frame {}x{} from {}", frame.width(), frame.height(), path.display());
        Ok(Self::new(frame))
    }

    /// Pixel size of the served frame
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame.as_ref().ok().map(|f| f.dimensions())
    }
}

#[async_trait]
impl ViewportCapture for StaticCapture {
    async fn capture_visible(&self, tab: TabId) -> Result<RgbaImage, CaptureError> {
        match &self.frame {
            Ok(frame) => Ok(frame.as_ref().clone()),
            Err(reason) => {
                tracing::debug!("Capture for {tab} refused: {reason}");
                Err(CaptureError::PermissionDenied(reason.clone()))
            }
        }
    }
}

/// Primary monitor grabbed through xcap
#[cfg(feature = "screen")]
#[derive(Clone, Copy, Default)]
pub struct ScreenCapture;

#[cfg(feature = "screen")]
#[async_trait]
impl ViewportCapture for ScreenCapture {
    async fn capture_visible(&self, tab: TabId) -> Result<RgbaImage, CaptureError> {
        tracing::debug!("Capturing primary monitor for {tab}");
        tokio::task::spawn_blocking(|| {
            let monitors = xcap::Monitor::all()
                .map_err(|e| CaptureError::Platform(format!("Failed to get monitors: {e}")))?;
            let monitor = monitors
                .first()
                .ok_or_else(|| CaptureError::Platform("No monitor found".to_string()))?;

            let image = monitor
                .capture_image()
                .map_err(|e| CaptureError::PermissionDenied(e.to_string()))?;
            let (width, height) = (image.width(), image.height());
            RgbaImage::from_raw(width, height, image.into_raw())
                .ok_or_else(|| CaptureError::Platform("Captured buffer has wrong size".to_string()))
        })
        .await
        .map_err(|e| CaptureError::Platform(format!("Capture task failed: {e}")))?
    }
}
