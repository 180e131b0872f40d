use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Browser tab a request originated from; results are addressed back to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// Correlation id generated by the page context and echoed by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Rectangle in CSS pixels, relative to the viewport at capture time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanned by a drag gesture in any direction
    pub fn from_corners(start: Point, end: Point) -> Self {
        Self {
            x: start.x.min(end.x),
            y: start.y.min(end.y),
            width: (end.x - start.x).abs(),
            height: (end.y - start.y).abs(),
        }
    }

    /// Offsets non-negative, extent strictly positive, nothing NaN
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Remote translation provider, plus the tag used for screenshot pipeline failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    #[serde(rename = "DeepL")]
    DeepL,
    #[serde(rename = "OpenAI")]
    OpenAiText,
    #[serde(rename = "OpenAIVision")]
    OpenAiVision,
    #[serde(rename = "Screenshot")]
    ScreenshotError,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::DeepL => "DeepL",
            Backend::OpenAiText => "OpenAI",
            Backend::OpenAiVision => "OpenAI Vision",
            Backend::ScreenshotError => "Screenshot",
        }
    }

    /// Pane a result for this backend is written into
    pub fn pane(self) -> Backend {
        match self {
            Backend::ScreenshotError => Backend::OpenAiVision,
            other => other,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CapturePayload {
    Text(String),
    ScreenshotRegion(Rect),
}

/// One unit of work for the dispatcher; consumed once, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub id: RequestId,
    pub origin_tab: TabId,
    pub backend: Backend,
    pub payload: CapturePayload,
    #[serde(default)]
    pub device_pixel_ratio: Option<f64>,
    pub anchor: Point,
}

impl CaptureRequest {
    pub fn text(origin_tab: TabId, backend: Backend, text: impl Into<String>, anchor: Point) -> Self {
        Self {
            id: RequestId::new(),
            origin_tab,
            backend,
            payload: CapturePayload::Text(text.into()),
            device_pixel_ratio: None,
            anchor,
        }
    }

    pub fn screenshot(
        origin_tab: TabId,
        rect: Rect,
        device_pixel_ratio: Option<f64>,
        anchor: Point,
    ) -> Self {
        Self {
            id: RequestId::new(),
            origin_tab,
            backend: Backend::OpenAiVision,
            payload: CapturePayload::ScreenshotRegion(rect),
            device_pixel_ratio,
            anchor,
        }
    }

    pub fn is_screenshot(&self) -> bool {
        matches!(self.payload, CapturePayload::ScreenshotRegion(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub id: RequestId,
    pub backend: Backend,
    pub text: String,
}

impl TranslationResult {
    pub fn new(id: RequestId, backend: Backend, text: impl Into<String>) -> Self {
        Self {
            id,
            backend,
            text: text.into(),
        }
    }
}
