use tsuyaku_types::{
    Backend, CaptureRequest, DispatcherMessage, Point, Rect, RequestId, Size, TabId,
    TranslationResult, UiMessage,
};
use unicode_normalization::UnicodeNormalization;

use crate::events::InputEvent;
use crate::layout::{
    AFFORDANCE_OFFSET_Y, AFFORDANCE_SIZE, PANEL_OFFSET_Y, PanelMeasure, TextMetrics,
    clamp_into_viewport,
};
use crate::state::{Pane, PaneContent, Panel, Selection, SelectionPayload, UiState};

/// Page-side state machine for one tab.
///
/// Results are matched by the request id the machine generated; anything
/// else that arrives (late, cancelled, for a closed panel) is ignored.
pub struct SelectionUi {
    tab: TabId,
    state: UiState,
    viewport: Size,
    device_pixel_ratio: f64,
    measure: Box<dyn PanelMeasure>,
}

impl SelectionUi {
    pub fn new(tab: TabId, viewport: Size, device_pixel_ratio: f64) -> Self {
        Self {
            tab,
            state: UiState::Idle,
            viewport,
            device_pixel_ratio,
            measure: Box::new(TextMetrics::default()),
        }
    }

    pub fn with_measure(mut self, measure: impl PanelMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// Apply one input event; returns the messages to send to the dispatcher
    pub fn handle(&mut self, event: InputEvent) -> Vec<UiMessage> {
        let state = std::mem::take(&mut self.state);
        let before = state.name();

        let (next, out) = match (state, event) {
            (UiState::ResultPanelOpen(mut panel), InputEvent::ViewportResized(viewport)) => {
                self.viewport = viewport;
                self.relayout(&mut panel);
                (UiState::ResultPanelOpen(panel), vec![])
            }
            (state, InputEvent::ViewportResized(viewport)) => {
                self.viewport = viewport;
                (state, vec![])
            }

            (state @ (UiState::Idle | UiState::ActionVisible(_)), InputEvent::TextSelected { text, bounds }) => {
                match normalize_selection(&text) {
                    Some(text) => (
                        UiState::ActionVisible(Selection {
                            payload: SelectionPayload::Text(text),
                            anchor: affordance_anchor(bounds),
                        }),
                        vec![],
                    ),
                    None => (state, vec![]),
                }
            }
            (state @ (UiState::Idle | UiState::ActionVisible(_)), InputEvent::RegionDragged { start, end }) => {
                let rect = Rect::from_corners(start, end);
                if rect.is_valid() {
                    (
                        UiState::ActionVisible(Selection {
                            payload: SelectionPayload::Region(rect),
                            anchor: affordance_anchor(rect),
                        }),
                        vec![],
                    )
                } else {
                    tracing::debug!("Ignoring degenerate drag {:?}", rect);
                    (state, vec![])
                }
            }

            (UiState::ActionVisible(selection), InputEvent::PointerDown { at }) => {
                if affordance_bounds(selection.anchor).contains(at) {
                    (UiState::ActionVisible(selection), vec![])
                } else {
                    (UiState::Idle, vec![])
                }
            }
            (UiState::ActionVisible(selection), InputEvent::ActivateAffordance) => {
                self.activate(selection)
            }

            (UiState::CapturePending { id, .. }, InputEvent::PointerDown { .. })
            | (UiState::CapturePending { id, .. }, InputEvent::Dismiss)
            | (UiState::CapturePending { id, .. }, InputEvent::Navigated) => {
                (UiState::Idle, vec![UiMessage::Cancel { id }])
            }

            (UiState::ResultPanelOpen(panel), InputEvent::PointerDown { at }) => {
                if panel.bounds().contains(at) {
                    (UiState::ResultPanelOpen(panel), vec![])
                } else {
                    (UiState::Idle, cancel_all(&panel))
                }
            }
            (UiState::ResultPanelOpen(panel), InputEvent::Dismiss | InputEvent::Navigated) => {
                (UiState::Idle, cancel_all(&panel))
            }
            (UiState::ResultPanelOpen(mut panel), InputEvent::Retranslate(backend)) => {
                let out = self.retranslate(&mut panel, backend);
                (UiState::ResultPanelOpen(panel), out)
            }

            (_, InputEvent::Navigated) => (UiState::Idle, vec![]),
            (UiState::ActionVisible(_), InputEvent::Dismiss) => (UiState::Idle, vec![]),

            (state, event) => {
                tracing::trace!("{} ignores {:?}", state.name(), event);
                (state, vec![])
            }
        };

        self.state = next;
        if before != self.state.name() {
            tracing::debug!("[UI] {}: {} -> {}", self.tab, before, self.state.name());
        }
        out
    }

    /// Apply a dispatcher message; returns whether the state changed
    pub fn receive(&mut self, message: DispatcherMessage) -> bool {
        let state = std::mem::take(&mut self.state);

        let (next, changed) = match (state, message) {
            (UiState::CapturePending { id, .. }, DispatcherMessage::ScreenshotCaptured { id: got, anchor })
                if got == id =>
            {
                let mut panel = self.vision_panel(id, anchor);
                self.relayout(&mut panel);
                (UiState::ResultPanelOpen(panel), true)
            }
            // capture failed or timed out before the frame notice
            (UiState::CapturePending { id, anchor }, DispatcherMessage::TranslationResult(result))
                if result.id == id =>
            {
                let mut panel = self.vision_panel(id, anchor);
                apply_result(&mut panel, result);
                self.relayout(&mut panel);
                (UiState::ResultPanelOpen(panel), true)
            }
            (UiState::ResultPanelOpen(mut panel), DispatcherMessage::TranslationResult(result))
                if panel.is_waiting_for(result.id) =>
            {
                apply_result(&mut panel, result);
                self.relayout(&mut panel);
                (UiState::ResultPanelOpen(panel), true)
            }
            (state, message) => {
                tracing::debug!(
                    "[UI] {}: dropping stale message {} in {}",
                    self.tab,
                    message.id(),
                    state.name()
                );
                (state, false)
            }
        };

        self.state = next;
        changed
    }

    fn activate(&mut self, selection: Selection) -> (UiState, Vec<UiMessage>) {
        let panel_anchor = Point::new(selection.anchor.x, selection.anchor.y - PANEL_OFFSET_Y);

        match selection.payload {
            SelectionPayload::Text(text) => {
                let mut panes = vec![Pane::loading(Backend::DeepL), Pane::loading(Backend::OpenAiText)];
                panes[1].can_retranslate = true;

                let mut panel = Panel::new(panel_anchor, panes, Some(text.clone()));
                let mut out = Vec::with_capacity(2);
                for backend in [Backend::DeepL, Backend::OpenAiText] {
                    let request = CaptureRequest::text(self.tab, backend, text.clone(), panel_anchor);
                    panel.pending.insert(request.id, backend);
                    out.push(UiMessage::Capture(request));
                }

                self.relayout(&mut panel);
                (UiState::ResultPanelOpen(panel), out)
            }
            SelectionPayload::Region(rect) => {
                let request = CaptureRequest::screenshot(
                    self.tab,
                    rect,
                    Some(self.device_pixel_ratio),
                    panel_anchor,
                );
                let id = request.id;
                (
                    UiState::CapturePending {
                        id,
                        anchor: panel_anchor,
                    },
                    vec![UiMessage::Capture(request)],
                )
            }
        }
    }

    fn retranslate(&mut self, panel: &mut Panel, backend: Backend) -> Vec<UiMessage> {
        let retranslatable = panel.pane(backend).is_some_and(|p| p.can_retranslate);
        let Some(text) = panel.source_text.clone().filter(|_| retranslatable) else {
            tracing::debug!("{backend} pane has no translate action");
            return vec![];
        };

        // stop listening for whatever that pane was still waiting on
        let superseded: Vec<RequestId> = panel
            .pending
            .iter()
            .filter(|(_, b)| **b == backend)
            .map(|(id, _)| *id)
            .collect();
        let mut out: Vec<UiMessage> = superseded
            .into_iter()
            .map(|id| {
                panel.pending.remove(&id);
                UiMessage::Cancel { id }
            })
            .collect();

        let request = CaptureRequest::text(self.tab, backend, text, panel.anchor);
        panel.pending.insert(request.id, backend);
        if let Some(pane) = panel.pane_mut(backend) {
            pane.content = PaneContent::Loading;
        }
        out.push(UiMessage::Capture(request));

        self.relayout(panel);
        out
    }

    fn vision_panel(&self, id: RequestId, anchor: Point) -> Panel {
        let mut panel = Panel::new(anchor, vec![Pane::loading(Backend::OpenAiVision)], None);
        panel.pending.insert(id, Backend::OpenAiVision);
        panel
    }

    fn relayout(&self, panel: &mut Panel) {
        let size = self.measure.measure(panel);
        let placement = clamp_into_viewport(panel.anchor, size, self.viewport);
        panel.position = placement.position;
        panel.size = placement.size;
    }
}

fn apply_result(panel: &mut Panel, result: TranslationResult) {
    let Some(backend) = panel.pending.remove(&result.id) else {
        return;
    };

    let content = match result.backend {
        Backend::OpenAiVision => PaneContent::Markup(result.text),
        _ => PaneContent::Text(result.text),
    };

    match panel.pane_mut(backend) {
        Some(pane) => pane.content = content,
        None => tracing::debug!("No {backend} pane mounted for {}", result.id),
    }
}

fn cancel_all(panel: &Panel) -> Vec<UiMessage> {
    panel
        .pending
        .keys()
        .map(|id| UiMessage::Cancel { id: *id })
        .collect()
}

fn normalize_selection(text: &str) -> Option<String> {
    let text: String = text.trim().nfc().collect();
    (!text.is_empty()).then_some(text)
}

fn affordance_anchor(bounds: Rect) -> Point {
    Point::new(bounds.x + bounds.width / 2.0, bounds.y - AFFORDANCE_OFFSET_Y)
}

fn affordance_bounds(anchor: Point) -> Rect {
    Rect::new(
        anchor.x - AFFORDANCE_SIZE.width / 2.0,
        anchor.y,
        AFFORDANCE_SIZE.width,
        AFFORDANCE_SIZE.height,
    )
}
