use serde::{Deserialize, Serialize};

use crate::types::{CaptureRequest, Point, RequestId, TranslationResult};

/// Page context -> dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiMessage {
    Capture(CaptureRequest),
    Cancel { id: RequestId },
}

/// Dispatcher -> page context, addressed to the request's origin tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DispatcherMessage {
    /// The viewport frame has been taken (or capture failed); the panel may open
    ScreenshotCaptured { id: RequestId, anchor: Point },
    TranslationResult(TranslationResult),
}

impl DispatcherMessage {
    pub fn id(&self) -> RequestId {
        match self {
            DispatcherMessage::ScreenshotCaptured { id, .. } => *id,
            DispatcherMessage::TranslationResult(result) => result.id,
        }
    }
}
