use texview::{
    Axis, Container, RenderConfig, RenderNode, Renderer, StyleKey, StyleOverrides, TypesetDocument,
    TypesetError, TypesetNode, TypesetOptions, Typesetter,
};

/// Stand-in for the external math engine: splits `$...$` regions out of the
/// input and fabricates vector markup whose declared width grows with the
/// expression length (2 units per character), mirroring the adaptor's body
/// children shape.
struct StubEngine;

impl Typesetter for StubEngine {
    fn typeset(
        &self,
        input: &str,
        _options: &TypesetOptions,
    ) -> Result<TypesetDocument, TypesetError> {
        let mut body = Vec::new();
        let mut rest = input;

        while let Some(start) = rest.find('$') {
            if start > 0 {
                body.push(TypesetNode::text(&rest[..start]));
            }
            let after = &rest[start + 1..];
            let end = after
                .find('$')
                .ok_or_else(|| TypesetError::Compile("unterminated math delimiter".into()))?;

            let tex = &after[..end];
            let width = 2.0 * tex.chars().count() as f64;
            body.push(TypesetNode::math(format!(
                "<svg width=\"{width}ex\" height=\"2ex\" fill=\"currentColor\"><g><path d=\"M 0 0\"/></g></svg>"
            )));
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            body.push(TypesetNode::text(rest));
        }

        Ok(TypesetDocument { body })
    }
}

/// Engine returning one pre-built document whatever the input, for scenarios
/// that need exact control over the typeset tree.
struct FixedEngine(TypesetDocument);

impl Typesetter for FixedEngine {
    fn typeset(
        &self,
        _input: &str,
        _options: &TypesetOptions,
    ) -> Result<TypesetDocument, TypesetError> {
        Ok(self.0.clone())
    }
}

fn render(input: &str) -> Container {
    render_with(input, &RenderConfig::default())
}

fn render_with(input: &str, config: &RenderConfig) -> Container {
    Renderer::new(StubEngine)
        .render(input, config)
        .expect("render should succeed")
}

fn text_of(node: &RenderNode) -> &str {
    match node {
        RenderNode::Text(run) => &run.text,
        other => panic!("expected text run, got {:?}", other),
    }
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[test]
fn should_render_prose_math_prose_as_three_children() {
    let tree = render("Hello $x^2$ world");
    assert_eq!(tree.children.len(), 3);

    assert_eq!(text_of(&tree.children[0]), "Hello ");
    match &tree.children[1] {
        RenderNode::Math(glyph) => {
            assert!(!glyph.needs_scroll);
            assert_eq!(glyph.width, 2.0 * "x^2".len() as f64);
            // Short glyphs stay inline: no forced minimum width
            assert!(glyph.style.min_width.is_none());
        }
        other => panic!("expected math glyph, got {:?}", other),
    }
    assert_eq!(text_of(&tree.children[2]), " world");
}

#[test]
fn should_render_heading_then_bold_paragraph() {
    let tree = render("# Title\nSome **bold** text");
    assert_eq!(tree.children.len(), 1);

    let block = tree.children[0].as_container().expect("wrapper container");
    assert_eq!(block.children.len(), 2);

    match &block.children[0] {
        RenderNode::Heading(heading) => {
            assert_eq!(heading.level, 1);
            assert_eq!(heading.segments.len(), 1);
            assert_eq!(text_of(&heading.segments[0]), "Title");
        }
        other => panic!("expected heading, got {:?}", other),
    }

    let paragraph = block.children[1].as_container().expect("paragraph");
    let runs: Vec<_> = paragraph.children.iter().map(text_of).collect();
    assert_eq!(runs, vec!["Some ", "bold", " text"]);
    match &paragraph.children[1] {
        RenderNode::Text(run) => assert!(run.bold),
        _ => unreachable!(),
    }
}

#[test]
fn should_keep_heading_font_for_bold_segments() {
    let tree = render("# Big **bold** title");

    match &tree.children[0] {
        RenderNode::Heading(heading) => {
            let runs: Vec<_> = heading.segments.iter().map(text_of).collect();
            assert_eq!(runs, vec!["Big ", "bold", " title"]);
            match &heading.segments[1] {
                RenderNode::Text(run) => {
                    assert!(run.bold);
                    // Only the weight changes; the bold segment keeps the
                    // level-1 heading font size
                    assert_eq!(run.style.font_size, Some(20.0));
                }
                _ => unreachable!(),
            }
        }
        other => panic!("expected heading, got {:?}", other),
    }
}

#[test]
fn should_collapse_separator_row_into_one_table_block() {
    let tree = render("| Name | Value |\n|---|---|\n| pi | 3.14 |");
    assert_eq!(tree.children.len(), 1);

    match &tree.children[0] {
        RenderNode::Table(table) => {
            assert_eq!(table.rows.len(), 2);
            assert!(table.rows[0].is_header);
            assert!(!table.rows[1].is_header);
            assert_eq!(table.column_widths.len(), 2);
        }
        other => panic!("expected table block, got {:?}", other),
    }
}

#[test]
fn should_render_nothing_for_empty_input() {
    let tree = render("");
    assert!(tree.children.is_empty());
}

// =============================================================================
// Scroll wrapping
// =============================================================================

#[test]
fn should_wrap_oversized_formula_in_scroll_container() {
    // 23 characters -> declared width 46, over the threshold of 40
    let tree = render("$aaaaaaaaaaaaaaaaaaaaaaa$");
    assert_eq!(tree.children.len(), 1);

    let wrapper = tree.children[0].as_container().expect("scroll container");
    assert!(wrapper.scrollable);
    assert_eq!(wrapper.axis, Axis::Horizontal);
    assert_eq!(wrapper.children.len(), 2);

    // Affix first, then the glyph
    assert_eq!(text_of(&wrapper.children[0]), ">>");
    match &wrapper.children[1] {
        RenderNode::Math(glyph) => assert!(glyph.needs_scroll),
        other => panic!("expected math glyph, got {:?}", other),
    }
}

#[test]
fn should_give_tall_glyphs_their_own_line() {
    // Narrow but tall: declared height above the tall-glyph bound forces
    // the glyph to full minimum width without any scroll wrapper
    let doc = TypesetDocument {
        body: vec![TypesetNode::math(
            "<svg width=\"6ex\" height=\"9.2ex\" fill=\"currentColor\"><path/></svg>",
        )],
    };
    let tree = Renderer::new(FixedEngine(doc))
        .render("$tall$", &RenderConfig::default())
        .expect("render should succeed");

    match &tree.children[0] {
        RenderNode::Math(glyph) => {
            assert!(!glyph.needs_scroll);
            assert_eq!(glyph.style.min_width.as_deref(), Some("100%"));
        }
        other => panic!("expected math glyph, got {:?}", other),
    }
}

#[test]
fn should_keep_formula_at_threshold_inline() {
    // 20 characters -> declared width exactly 40
    let tree = render("$aaaaaaaaaaaaaaaaaaaa$");
    match &tree.children[0] {
        RenderNode::Math(glyph) => assert!(!glyph.needs_scroll),
        other => panic!("expected inline math glyph, got {:?}", other),
    }
}

// =============================================================================
// Colors, scaling, overrides
// =============================================================================

#[test]
fn should_recolor_and_rescale_markup() {
    let config = RenderConfig {
        font_size: Some(4.0),
        color: Some("red".into()),
        ..RenderConfig::default()
    };
    let tree = render_with("$ab$", &config);

    match &tree.children[0] {
        RenderNode::Math(glyph) => {
            assert!(glyph.markup.contains("fill=\"red\""));
            // Declared width 4, font scale 4/2 = 2
            assert!(glyph.markup.contains("width=\"8ex\""));
            assert!(glyph.markup.contains("height=\"4ex\""));
        }
        other => panic!("expected math glyph, got {:?}", other),
    }
}

#[test]
fn should_apply_caller_style_overrides() {
    let mut overrides = StyleOverrides::new();
    overrides.insert(
        StyleKey::Paragraph,
        texview::Style::default().with_color("black"),
    );
    let config = RenderConfig {
        style_overrides: overrides,
        ..RenderConfig::default()
    };

    let tree = render_with("plain prose", &config);
    match &tree.children[0] {
        RenderNode::Text(run) => {
            assert_eq!(run.style.color.as_deref(), Some("black"));
            // Non-overridden properties keep their defaults
            assert_eq!(run.style.font_size, Some(16.0));
        }
        other => panic!("expected text run, got {:?}", other),
    }
}

// =============================================================================
// Layout forcing and flow
// =============================================================================

#[test]
fn should_force_full_width_for_enumerated_lines() {
    let tree = render("1. First item");
    match &tree.children[0] {
        RenderNode::Text(run) => {
            assert!(run.bold);
            assert_eq!(run.style.width.as_deref(), Some("100%"));
        }
        other => panic!("expected list run, got {:?}", other),
    }
}

#[test]
fn should_lay_out_top_container_by_flow() {
    let tree = render("hi");
    assert_eq!(tree.axis, Axis::Horizontal);

    let config = RenderConfig {
        flow: texview::Flow::ColumnWrap,
        ..RenderConfig::default()
    };
    let tree = render_with("hi", &config);
    assert_eq!(tree.axis, Axis::Vertical);
}

// =============================================================================
// Error propagation
// =============================================================================

#[test]
fn should_propagate_engine_failure() {
    let result = Renderer::new(StubEngine).render("$unterminated", &RenderConfig::default());
    assert!(result.is_err());
}
