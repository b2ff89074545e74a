//! Presentation styles and the three-tier cascade.
//!
//! Resolution precedence is fixed: built-in tag defaults < inherited parent
//! style < the node's own inline declarations. Caller stylesheet overrides
//! are merged separately per stylesheet key, caller winning per-property.

use std::borrow::Cow;

use crate::engine::{CssTranslator, TypesetNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDecoration {
    Underline,
    LineThrough,
}

/// A flat presentation style. Every field is optional; `None` means the
/// property is unset and a later merge may fill it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub color: Option<Cow<'static, str>>,
    pub background_color: Option<Cow<'static, str>>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_decoration: Option<TextDecoration>,
    pub width: Option<Cow<'static, str>>,
    pub min_width: Option<Cow<'static, str>>,
    pub max_width: Option<Cow<'static, str>>,
    pub height: Option<Cow<'static, str>>,
    pub line_height: Option<f64>,
    pub margin_vertical: Option<f64>,
    pub margin_horizontal: Option<f64>,
    pub padding_vertical: Option<f64>,
    pub padding_left: Option<f64>,
    pub padding_right: Option<f64>,
    pub border_width: Option<f64>,
    pub border_color: Option<Cow<'static, str>>,
    pub border_style: Option<Cow<'static, str>>,
    pub border_radius: Option<f64>,
}

macro_rules! merge_fields {
    ($out:ident, $over:ident; $($field:ident),* $(,)?) => {
        $(
            if $over.$field.is_some() {
                $out.$field = $over.$field.clone();
            }
        )*
    };
}

impl Style {
    /// Overlay `over` on `self`: properties set in `over` win, unset ones
    /// keep this style's value. Reapplying the same overlay is a no-op.
    pub fn merge(&self, over: &Style) -> Style {
        let mut out = self.clone();
        merge_fields!(
            out, over;
            color, background_color, font_size, font_weight, font_style,
            text_decoration, width, min_width, max_width, height, line_height,
            margin_vertical, margin_horizontal, padding_vertical, padding_left,
            padding_right, border_width, border_color, border_style,
            border_radius,
        );
        out
    }

    pub fn with_color(mut self, color: impl Into<Cow<'static, str>>) -> Style {
        self.color = Some(color.into());
        self
    }

    pub fn with_bold(mut self) -> Style {
        self.font_weight = Some(FontWeight::Bold);
        self
    }

    pub fn with_italic(mut self) -> Style {
        self.font_style = Some(FontStyle::Italic);
        self
    }

    pub fn with_full_width(mut self) -> Style {
        self.width = Some(Cow::Borrowed("100%"));
        self
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight == Some(FontWeight::Bold)
    }

    pub fn is_italic(&self) -> bool {
        self.font_style == Some(FontStyle::Italic)
    }
}

/// Built-in style carried by a tag name, or `None` for tags with no
/// inherent presentation.
pub fn tag_default_style(tag: &str) -> Option<Style> {
    let mut style = Style::default();
    match tag {
        "u" | "ins" => style.text_decoration = Some(TextDecoration::Underline),
        "s" | "del" => style.text_decoration = Some(TextDecoration::LineThrough),
        "b" | "strong" => style.font_weight = Some(FontWeight::Bold),
        "i" | "cite" | "dfn" | "em" => style.font_style = Some(FontStyle::Italic),
        "mark" => style.background_color = Some(Cow::Borrowed("yellow")),
        "small" => style.font_size = Some(8.0),
        _ => return None,
    }
    Some(style)
}

/// Resolve the effective style for one typeset node.
///
/// Text leaves, math containers and comments carry no inherent style and
/// inherit the parent's resolved style verbatim. Unknown tags resolve as an
/// empty tag default; this never fails.
pub fn resolve_style(
    node: &TypesetNode,
    parent: Option<&Style>,
    css: &dyn CssTranslator,
) -> Style {
    if node.is_text() || node.is_math() || node.is_comment() {
        return parent.cloned().unwrap_or_default();
    }

    let builtin = node
        .kind
        .tag_name()
        .and_then(tag_default_style)
        .unwrap_or_default();
    let inherited = match parent {
        Some(parent) => builtin.merge(parent),
        None => builtin,
    };
    match node.all_styles() {
        Some(decls) => inherited.merge(&css.translate(decls)),
        None => inherited,
    }
}

/// The stylesheet keys a caller may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKey {
    Container,
    MathGlyph,
    ScrollContainer,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Paragraph,
    Bold,
    Italic,
    Table,
    TableRow,
    TableHeader,
    TableCell,
    FirstRow,
}

pub type StyleOverrides = std::collections::HashMap<StyleKey, Style>;

/// The full set of named styles the builder draws from. Defaults follow the
/// reference component's stylesheet; callers overlay per-key overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub container: Style,
    pub math_glyph: Style,
    pub scroll_container: Style,
    pub heading1: Style,
    pub heading2: Style,
    pub heading3: Style,
    pub heading4: Style,
    pub paragraph: Style,
    pub bold: Style,
    pub italic: Style,
    pub table: Style,
    pub table_row: Style,
    pub table_header: Style,
    pub table_cell: Style,
    pub first_row: Style,
}

fn heading_style(font_size: f64, margin_vertical: f64) -> Style {
    Style {
        font_size: Some(font_size),
        font_weight: Some(FontWeight::Bold),
        margin_vertical: Some(margin_vertical),
        color: Some(Cow::Borrowed("white")),
        width: Some(Cow::Borrowed("100%")),
        ..Style::default()
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        StyleSheet {
            container: Style::default(),
            math_glyph: Style {
                margin_horizontal: Some(5.0),
                ..Style::default()
            },
            scroll_container: Style {
                border_width: Some(1.0),
                border_style: Some(Cow::Borrowed("dashed")),
                border_radius: Some(8.0),
                padding_vertical: Some(10.0),
                padding_right: Some(10.0),
                ..Style::default()
            },
            heading1: heading_style(20.0, 14.0),
            heading2: heading_style(18.0, 14.0),
            heading3: Style {
                text_decoration: Some(TextDecoration::Underline),
                ..heading_style(16.0, 10.0)
            },
            heading4: heading_style(16.0, 10.0),
            paragraph: Style {
                color: Some(Cow::Borrowed("white")),
                font_size: Some(16.0),
                max_width: Some(Cow::Borrowed("100%")),
                line_height: Some(21.0),
                margin_vertical: Some(5.0),
                ..Style::default()
            },
            bold: Style {
                font_weight: Some(FontWeight::Bold),
                color: Some(Cow::Borrowed("white")),
                font_size: Some(16.0),
                ..Style::default()
            },
            italic: Style {
                font_style: Some(FontStyle::Italic),
                color: Some(Cow::Borrowed("white")),
                ..Style::default()
            },
            table: Style {
                border_width: Some(0.5),
                border_color: Some(Cow::Borrowed("#FFFFFF4D")),
                margin_vertical: Some(5.0),
                margin_horizontal: Some(5.0),
                color: Some(Cow::Borrowed("white")),
                ..Style::default()
            },
            table_row: Style {
                color: Some(Cow::Borrowed("white")),
                ..Style::default()
            },
            table_header: Style {
                color: Some(Cow::Borrowed("white")),
                font_weight: Some(FontWeight::Bold),
                ..Style::default()
            },
            table_cell: Style {
                padding_vertical: Some(4.0),
                padding_left: Some(4.0),
                border_width: Some(1.0),
                border_color: Some(Cow::Borrowed("#FFFFFF4D")),
                background_color: Some(Cow::Borrowed("transparent")),
                color: Some(Cow::Borrowed("white")),
                ..Style::default()
            },
            first_row: Style {
                font_weight: Some(FontWeight::Bold),
                background_color: Some(Cow::Borrowed("#E6D19033")),
                ..Style::default()
            },
        }
    }
}

impl StyleSheet {
    fn slot(&mut self, key: StyleKey) -> &mut Style {
        match key {
            StyleKey::Container => &mut self.container,
            StyleKey::MathGlyph => &mut self.math_glyph,
            StyleKey::ScrollContainer => &mut self.scroll_container,
            StyleKey::Heading1 => &mut self.heading1,
            StyleKey::Heading2 => &mut self.heading2,
            StyleKey::Heading3 => &mut self.heading3,
            StyleKey::Heading4 => &mut self.heading4,
            StyleKey::Paragraph => &mut self.paragraph,
            StyleKey::Bold => &mut self.bold,
            StyleKey::Italic => &mut self.italic,
            StyleKey::Table => &mut self.table,
            StyleKey::TableRow => &mut self.table_row,
            StyleKey::TableHeader => &mut self.table_header,
            StyleKey::TableCell => &mut self.table_cell,
            StyleKey::FirstRow => &mut self.first_row,
        }
    }

    /// Overlay caller overrides, caller winning per-property.
    pub fn with_overrides(mut self, overrides: &StyleOverrides) -> StyleSheet {
        for (key, over) in overrides {
            let slot = self.slot(*key);
            *slot = slot.merge(over);
        }
        self
    }

    /// The heading style for a level already clamped to 1..=4.
    pub fn heading(&self, level: u8) -> &Style {
        match level {
            1 => &self.heading1,
            2 => &self.heading2,
            3 => &self.heading3,
            _ => &self.heading4,
        }
    }
}
