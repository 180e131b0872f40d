use tsuyaku_types::{Backend, Point, Rect, Size};

/// User input as reported by the page host
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer released with a text selection; `bounds` is its bounding box
    TextSelected { text: String, bounds: Rect },
    /// Region-capture drag finished
    RegionDragged { start: Point, end: Point },
    PointerDown { at: Point },
    /// Click on the affordance button
    ActivateAffordance,
    /// Click on a pane's own translate button
    Retranslate(Backend),
    /// Explicit close (e.g. Escape)
    Dismiss,
    Navigated,
    ViewportResized(Size),
}
