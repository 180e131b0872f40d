use tsuyaku_types::{Point, Size};

use crate::state::{Panel, PaneContent};

/// Affordance sits this far above the selection's top edge
pub const AFFORDANCE_OFFSET_Y: f64 = 70.0;
/// Panel opens this far above the affordance
pub const PANEL_OFFSET_Y: f64 = 30.0;
/// Hit box of the affordance button, centred on its anchor
pub const AFFORDANCE_SIZE: Size = Size {
    width: 36.0,
    height: 24.0,
};

/// Host-side measurement of a rendered panel
pub trait PanelMeasure: Send {
    fn measure(&self, panel: &Panel) -> Size;
}

/// Fixed-pitch estimate used when the host has no layout engine
#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub max_line_chars: usize,
    pub padding: f64,
    pub min_width: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 18.0,
            max_line_chars: 60,
            padding: 10.0,
            min_width: 160.0,
        }
    }
}

impl PanelMeasure for TextMetrics {
    fn measure(&self, panel: &Panel) -> Size {
        let mut widest = 0usize;
        let mut lines = 0usize;

        for pane in &panel.panes {
            // header
            widest = widest.max(pane.backend.name().chars().count());
            lines += 1;

            let body = match &pane.content {
                PaneContent::Loading => "",
                PaneContent::Text(text) | PaneContent::Markup(text) => text.as_str(),
            };
            if body.is_empty() {
                lines += 1;
                continue;
            }
            let max_line_chars = self.max_line_chars.max(1);
            for line in body.lines() {
                let chars = line.chars().count();
                widest = widest.max(chars.min(max_line_chars));
                lines += chars.div_ceil(max_line_chars).max(1);
            }
        }

        Size::new(
            (widest as f64 * self.char_width + 2.0 * self.padding).max(self.min_width),
            lines as f64 * self.line_height + 2.0 * self.padding,
        )
    }
}

/// Final position and size of a panel inside the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    pub size: Size,
}

/// Keep a panel fully on screen: shift left/up first, shrink only when it
/// is larger than the viewport itself, never start above/left of the origin.
pub fn clamp_into_viewport(natural: Point, size: Size, viewport: Size) -> Placement {
    let size = Size::new(
        size.width.min(viewport.width.max(0.0)),
        size.height.min(viewport.height.max(0.0)),
    );

    let mut x = natural.x;
    let mut y = natural.y;

    if x + size.width > viewport.width {
        x = viewport.width - size.width;
    }
    if y + size.height > viewport.height {
        y = viewport.height - size.height;
    }
    if x < 0.0 {
        x = 0.0;
    }
    if y < 0.0 {
        y = 0.0;
    }

    Placement {
        position: Point::new(x, y),
        size,
    }
}
