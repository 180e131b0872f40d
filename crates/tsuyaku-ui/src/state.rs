use std::collections::HashMap;

use tsuyaku_types::{Backend, Point, Rect, RequestId, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionPayload {
    Text(String),
    Region(Rect),
}

/// Completed selection waiting for the user to activate the affordance
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub payload: SelectionPayload,
    /// Where the affordance is drawn (horizontally centred on this point)
    pub anchor: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaneContent {
    Loading,
    Text(String),
    /// Backend markup, rendered verbatim by the host
    Markup(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    pub backend: Backend,
    pub content: PaneContent,
    /// Carries its own "translate" button
    pub can_retranslate: bool,
}

impl Pane {
    pub fn loading(backend: Backend) -> Self {
        Self {
            backend,
            content: PaneContent::Loading,
            can_retranslate: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.content == PaneContent::Loading
    }
}

/// Open result panel: one pane per backend and the requests it still listens for
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Natural placement before clamping
    pub anchor: Point,
    pub position: Point,
    pub size: Size,
    pub panes: Vec<Pane>,
    pub(crate) source_text: Option<String>,
    pub(crate) pending: HashMap<RequestId, Backend>,
}

impl Panel {
    pub(crate) fn new(anchor: Point, panes: Vec<Pane>, source_text: Option<String>) -> Self {
        Self {
            anchor,
            position: anchor,
            size: Size::default(),
            panes,
            source_text,
            pending: HashMap::new(),
        }
    }

    pub fn pane(&self, backend: Backend) -> Option<&Pane> {
        self.panes.iter().find(|p| p.backend == backend)
    }

    pub(crate) fn pane_mut(&mut self, backend: Backend) -> Option<&mut Pane> {
        self.panes.iter_mut().find(|p| p.backend == backend)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.width, self.size.height)
    }

    pub fn is_waiting_for(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Per-tab UI state; illegal combinations (affordance and panel at once) cannot be expressed
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiState {
    #[default]
    Idle,
    ActionVisible(Selection),
    /// Region request sent; the panel opens once the frame has been taken
    CapturePending { id: RequestId, anchor: Point },
    ResultPanelOpen(Panel),
}

impl UiState {
    pub fn name(&self) -> &'static str {
        match self {
            UiState::Idle => "Idle",
            UiState::ActionVisible(_) => "ActionVisible",
            UiState::CapturePending { .. } => "CapturePending",
            UiState::ResultPanelOpen(_) => "ResultPanelOpen",
        }
    }

    pub fn panel(&self) -> Option<&Panel> {
        match self {
            UiState::ResultPanelOpen(panel) => Some(panel),
            _ => None,
        }
    }
}
