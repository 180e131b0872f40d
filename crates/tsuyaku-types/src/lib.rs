pub mod messages;
pub mod types;

pub use messages::{DispatcherMessage, UiMessage};
pub use types::{
    Backend, CapturePayload, CaptureRequest, Point, Rect, RequestId, Size, TabId,
    TranslationResult,
};
