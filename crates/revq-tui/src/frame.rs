//! Cell-grid frame primitives for the revq TUI.
//!
//! The app model renders into this plain grid; the crossterm runtime maps
//! roles to terminal colors at the edge. Keeping the frame free of terminal
//! types lets view tests assert on rendered rows directly.

/// Frame dimensions in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: usize,
    pub height: usize,
}

/// Semantic role for rendered text; the runtime picks the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Primary,
    Muted,
    Accent,
    Success,
    Warning,
    Danger,
    Focus,
}

/// A single frame cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCell {
    pub glyph: char,
    pub role: TextRole,
    pub bold: bool,
}

impl FrameCell {
    fn blank() -> Self {
        Self {
            glyph: ' ',
            role: TextRole::Primary,
            bold: false,
        }
    }
}

/// A rendered frame: one cell per terminal position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame {
    size: FrameSize,
    cells: Vec<FrameCell>,
}

impl RenderFrame {
    pub fn new(size: FrameSize) -> Self {
        Self {
            size,
            cells: vec![FrameCell::blank(); size.width * size.height],
        }
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<FrameCell> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.cells.get(y * self.size.width + x).copied()
    }

    /// Writes `text` starting at (x, y); anything past the right edge is
    /// clipped.
    pub fn set_text(&mut self, x: usize, y: usize, text: &str, role: TextRole) {
        self.put(x, y, text, role, false);
    }

    pub fn set_text_bold(&mut self, x: usize, y: usize, text: &str, role: TextRole) {
        self.put(x, y, text, role, true);
    }

    fn put(&mut self, x: usize, y: usize, text: &str, role: TextRole, bold: bool) {
        if y >= self.size.height {
            return;
        }
        for (offset, glyph) in text.chars().enumerate() {
            let column = x + offset;
            if column >= self.size.width {
                break;
            }
            self.cells[y * self.size.width + column] = FrameCell { glyph, role, bold };
        }
    }

    /// The glyphs of one row as a string, trailing blanks trimmed. Test
    /// helper; roles are asserted through [`Self::cell`].
    pub fn row_text(&self, y: usize) -> String {
        if y >= self.size.height {
            return String::new();
        }
        let row: String = (0..self.size.width)
            .filter_map(|x| self.cell(x, y).map(|c| c.glyph))
            .collect();
        row.trim_end().to_string()
    }
}
