use crate::style::Style;

/// The direction children of a [`Container`] are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A node of the render tree handed to the host UI layer.
///
/// The tree is constructed fresh for every input string and is never mutated
/// after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Text(TextRun),
    Heading(Heading),
    Table(TableBlock),
    Math(MathGlyph),
    Container(Container),
}
impl RenderNode {
    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            RenderNode::Text(run) => Some(run),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            RenderNode::Container(container) => Some(container),
            _ => None,
        }
    }
}

/// A single styled run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: Style,
    pub bold: bool,
    pub italic: bool,
}
impl TextRun {
    pub fn plain(text: impl Into<String>, style: Style) -> TextRun {
        TextRun {
            text: text.into(),
            style,
            bold: false,
            italic: false,
        }
    }
}

/// A heading line. `level` is already clamped to the 1..=4 range the
/// stylesheet knows about.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: u8,
    pub segments: Vec<RenderNode>,
    pub style: Style,
}

/// One run of consecutive table-row lines.
///
/// `column_widths` always has one entry per header-row cell, and every row
/// holds at most that many cells. Rows shorter than the header are kept
/// short rather than padded.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub rows: Vec<TableRow>,
    pub column_widths: Vec<f64>,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<RenderNode>,
    pub is_header: bool,
    pub style: Style,
}

/// One typeset math expression, carried as post-processed vector markup.
#[derive(Debug, Clone, PartialEq)]
pub struct MathGlyph {
    pub markup: String,
    /// Width/height in engine units, as declared by the markup. Defaults to
    /// 1 when the markup carries no usable metadata.
    pub width: f64,
    pub height: f64,
    pub needs_scroll: bool,
    pub style: Style,
}

/// A grouping node. `scrollable` containers scroll along `axis`.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub children: Vec<RenderNode>,
    pub scrollable: bool,
    pub axis: Axis,
    pub style: Style,
}
impl Container {
    pub fn column(children: Vec<RenderNode>, style: Style) -> Container {
        Container {
            children,
            scrollable: false,
            axis: Axis::Vertical,
            style,
        }
    }

    pub fn row(children: Vec<RenderNode>, style: Style) -> Container {
        Container {
            children,
            scrollable: false,
            axis: Axis::Horizontal,
            style,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
