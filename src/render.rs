//! Render-tree construction: a depth-first walk over the typeset-output
//! document that turns each node into presentation primitives.

use tracing::{debug, trace};

use crate::{
    engine::{CssTranslator, EntityDecoder, NodeKind, TypesetDocument, TypesetNode},
    layout,
    node::{Axis, Container, Heading, MathGlyph, RenderNode, TextRun},
    style::{resolve_style, Style, StyleSheet},
    svg,
    table::TableAccumulator,
    text::{self, Fragment, Line},
    Flow,
};

pub(crate) struct BuildContext<'a> {
    pub styles: &'a StyleSheet,
    pub font_scale: f64,
    pub color: &'a str,
    pub scroll_border_color: &'a str,
    pub scroll_icon_color: &'a str,
    pub flow: Flow,
    pub decoder: &'a dyn EntityDecoder,
    pub css: &'a dyn CssTranslator,
}

/// Build the top-level render tree: one child per top-level document node.
/// Nodes that flatten into several primitives are grouped so the top-level
/// shape stays one-to-one.
pub(crate) fn build_document(doc: &TypesetDocument, ctx: &BuildContext<'_>) -> Container {
    debug!(nodes = doc.body.len(), "building render tree");

    let axis = match ctx.flow {
        Flow::RowWrap => Axis::Horizontal,
        Flow::ColumnWrap => Axis::Vertical,
    };

    let mut children = Vec::new();
    for node in &doc.body {
        let mut built = build_node(node, None, ctx);
        match built.len() {
            0 => {}
            1 => children.push(built.pop().unwrap()),
            _ => children.push(RenderNode::Container(Container::column(
                built,
                Style::default(),
            ))),
        }
    }

    Container {
        children,
        scrollable: false,
        axis,
        style: ctx.styles.container.clone(),
    }
}

/// Convert one typeset node into zero or more render nodes.
fn build_node(
    node: &TypesetNode,
    parent_style: Option<&Style>,
    ctx: &BuildContext<'_>,
) -> Vec<RenderNode> {
    trace!(kind = ?node.kind, "visiting node");

    match &node.kind {
        NodeKind::Comment => Vec::new(),
        NodeKind::Text => {
            let raw = node.value().unwrap_or("");
            let decoded = ctx.decoder.decode(raw);
            let cleaned = text::normalize(&decoded);
            if cleaned.is_empty() {
                return Vec::new();
            }

            let inherited = resolve_style(node, parent_style, ctx.css);
            format_block(&cleaned, &inherited, ctx)
        }
        NodeKind::MathContainer => vec![build_math(node, parent_style, ctx)],
        NodeKind::Element(tag) if tag.as_ref() == "br" => vec![paragraph_break()],
        NodeKind::Element(_) => {
            // Wrapper elements contribute style, not boxes: children are
            // propagated directly so empty wrappers vanish
            let style = resolve_style(node, parent_style, ctx.css);
            node.children
                .iter()
                .flat_map(|child| build_node(child, Some(&style), ctx))
                .collect()
        }
    }
}

/// `br` emits a forced paragraph break.
fn paragraph_break() -> RenderNode {
    RenderNode::Text(TextRun {
        text: "\n\n".to_string(),
        style: Style {
            height: Some(std::borrow::Cow::Borrowed("0")),
            ..Style::default().with_full_width()
        },
        bold: false,
        italic: false,
    })
}

/// Post-process one math container and decide its wrapper.
fn build_math(
    node: &TypesetNode,
    parent_style: Option<&Style>,
    ctx: &BuildContext<'_>,
) -> RenderNode {
    let markup = node.inner_markup().unwrap_or("");
    let processed = svg::process_markup(markup, ctx.font_scale, ctx.color);

    let width = layout::intrinsic_width(node);
    let height = processed.size.map(|(_, h)| h).unwrap_or(1.0);
    let needs_scroll = layout::needs_scroll(width);

    let mut style = ctx.styles.math_glyph.clone();
    if let Some(parent) = parent_style {
        style = style.merge(parent);
    }
    if height > layout::TALL_GLYPH_HEIGHT {
        style.min_width = Some("100%".into());
    }

    let glyph = RenderNode::Math(MathGlyph {
        markup: processed.markup,
        width,
        height,
        needs_scroll,
        style,
    });

    if !needs_scroll {
        return glyph;
    }

    debug!(width, "wrapping oversized formula in scroll container");

    let affix = RenderNode::Text(TextRun::plain(
        layout::SCROLL_AFFIX,
        Style {
            color: Some(ctx.scroll_icon_color.to_string().into()),
            padding_right: Some(10.0),
            ..Style::default()
        },
    ));

    let scroll_style = Style {
        border_color: Some(ctx.scroll_border_color.to_string().into()),
        ..ctx.styles.scroll_container.clone()
    };

    RenderNode::Container(Container {
        children: vec![affix, glyph],
        scrollable: true,
        axis: Axis::Horizontal,
        style: scroll_style,
    })
}

/// Walk the normalized lines of one text leaf and assemble heading,
/// table and paragraph nodes, closing table runs as they end.
fn format_block(cleaned: &str, inherited: &Style, ctx: &BuildContext<'_>) -> Vec<RenderNode> {
    let mut out = Vec::new();
    let mut tables = TableAccumulator::new();

    for line in cleaned.split('\n') {
        match text::classify(line) {
            Line::Heading { level, content } => {
                if let Some(table) = tables.finish(ctx.styles) {
                    out.push(table);
                }
                if let Some(heading) = build_heading(level, content, ctx) {
                    out.push(heading);
                }
            }
            Line::TableRow { cells } => tables.push_row(cells),
            Line::TableSeparator => {}
            Line::Paragraph(line) => {
                if let Some(table) = tables.finish(ctx.styles) {
                    out.push(table);
                }
                if let Some(paragraph) = build_paragraph(line, inherited, ctx) {
                    out.push(paragraph);
                }
            }
        }
    }

    if let Some(table) = tables.finish(ctx.styles) {
        out.push(table);
    }
    out
}

fn build_heading(level: usize, content: &str, ctx: &BuildContext<'_>) -> Option<RenderNode> {
    if content.is_empty() {
        return None;
    }

    let level = level.min(4) as u8;
    let style = ctx.styles.heading(level).clone();

    let segments = text::fragments(content)
        .into_iter()
        .map(|fragment| match fragment {
            // Bold inside a heading keeps the heading's font; only the
            // weight changes
            Fragment::Bold(text) => RenderNode::Text(TextRun {
                text: text.to_string(),
                style: style.merge(&Style::default().with_bold()),
                bold: true,
                italic: false,
            }),
            other => fragment_run(other, &style, ctx),
        })
        .collect();

    Some(RenderNode::Heading(Heading {
        level,
        segments,
        style,
    }))
}

fn build_paragraph(line: &str, inherited: &Style, ctx: &BuildContext<'_>) -> Option<RenderNode> {
    if line.trim().is_empty() {
        return None;
    }

    let mut base = ctx.styles.paragraph.merge(inherited);
    if text::force_full_width(line) {
        base = base.with_full_width();
    }

    let mut runs: Vec<RenderNode> = text::fragments(line)
        .into_iter()
        .map(|fragment| fragment_run(fragment, &base, ctx))
        .collect();

    // Single-run paragraphs collapse to the run itself; the run already
    // carries the paragraph's width decision
    match runs.len() {
        0 => None,
        1 => Some(runs.pop().unwrap()),
        _ => Some(RenderNode::Container(Container::row(runs, base))),
    }
}

fn fragment_run(fragment: Fragment<'_>, base: &Style, ctx: &BuildContext<'_>) -> RenderNode {
    match fragment {
        Fragment::Plain(text) => RenderNode::Text(TextRun::plain(text, base.clone())),
        Fragment::Emoji(text) => RenderNode::Text(TextRun::plain(text, base.clone())),
        Fragment::Bold(text) => RenderNode::Text(TextRun {
            text: text.to_string(),
            style: base.merge(&ctx.styles.bold),
            bold: true,
            italic: false,
        }),
        Fragment::Italic(text) => RenderNode::Text(TextRun {
            text: text.to_string(),
            style: base.merge(&ctx.styles.italic),
            bold: false,
            italic: true,
        }),
        Fragment::ListMarker(text) => RenderNode::Text(TextRun {
            text: text.replace("**", ""),
            style: base.merge(&ctx.styles.bold),
            bold: true,
            italic: false,
        }),
    }
}
