//! Seams to the external collaborators: the math typesetting engine that
//! turns mixed prose/TeX into a document tree, the HTML entity decoder, and
//! the CSS-declaration translator.
//!
//! The pipeline only ever reads the typeset tree; it is owned by the engine
//! for the duration of one render pass.

use std::{borrow::Cow, collections::HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::style::Style;

pub type Attributes = HashMap<String, String>;

/// The tag-level classification of a typeset-output node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A text leaf (`#text`).
    Text,
    /// A comment node. Produces no output.
    Comment,
    /// A container wrapping one rendered math expression as vector markup.
    MathContainer,
    /// Any other element, by tag name (`span`, `b`, `br`, ...).
    Element(Cow<'static, str>),
}
impl NodeKind {
    pub fn element(tag: impl Into<Cow<'static, str>>) -> NodeKind {
        NodeKind::Element(tag.into())
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self {
            NodeKind::Element(tag) => Some(tag.as_ref()),
            _ => None,
        }
    }
}

/// One node of the document tree produced by the typesetting engine.
///
/// This mirrors what a DOM adaptor exposes: a kind, attributes, ordered
/// children, a text value for leaves, the inner vector markup for math
/// containers, and the node's inline CSS declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct TypesetNode {
    pub kind: NodeKind,
    pub attributes: Attributes,
    pub children: Vec<TypesetNode>,
    value: Option<String>,
    inner_markup: Option<String>,
    styles: Option<String>,
}
impl TypesetNode {
    pub fn text(value: impl Into<String>) -> TypesetNode {
        TypesetNode {
            kind: NodeKind::Text,
            attributes: Attributes::new(),
            children: Vec::new(),
            value: Some(value.into()),
            inner_markup: None,
            styles: None,
        }
    }

    pub fn comment() -> TypesetNode {
        TypesetNode {
            kind: NodeKind::Comment,
            attributes: Attributes::new(),
            children: Vec::new(),
            value: None,
            inner_markup: None,
            styles: None,
        }
    }

    /// A math container holding rendered vector markup. The markup's root
    /// element is also exposed as a child so layout can read its declared
    /// width, matching the adaptor tree shape.
    pub fn math(markup: impl Into<String>) -> TypesetNode {
        let markup = markup.into();
        let mut svg = TypesetNode::element_node("svg", Vec::new());
        if let Some(width) = markup_attr(&markup, &WIDTH_VALUE_REGEX) {
            svg.attributes.insert("width".to_string(), width);
        }
        if let Some(height) = markup_attr(&markup, &HEIGHT_VALUE_REGEX) {
            svg.attributes.insert("height".to_string(), height);
        }

        TypesetNode {
            kind: NodeKind::MathContainer,
            attributes: Attributes::new(),
            children: vec![svg],
            value: None,
            inner_markup: Some(markup),
            styles: None,
        }
    }

    pub fn element_node(
        tag: impl Into<Cow<'static, str>>,
        children: Vec<TypesetNode>,
    ) -> TypesetNode {
        TypesetNode {
            kind: NodeKind::element(tag),
            attributes: Attributes::new(),
            children,
            value: None,
            inner_markup: None,
            styles: None,
        }
    }

    pub fn with_styles(mut self, styles: impl Into<String>) -> TypesetNode {
        self.styles = Some(styles.into());
        self
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn is_comment(&self) -> bool {
        self.kind == NodeKind::Comment
    }

    pub fn is_math(&self) -> bool {
        self.kind == NodeKind::MathContainer
    }

    /// The text value, for text leaves.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The raw vector markup, for math containers.
    pub fn inner_markup(&self) -> Option<&str> {
        self.inner_markup.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The node's inline CSS declaration string, if any.
    pub fn all_styles(&self) -> Option<&str> {
        self.styles.as_deref()
    }
}

/// The typeset-output document for one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypesetDocument {
    /// The top-level nodes of the document body, in order.
    pub body: Vec<TypesetNode>,
}

/// Options forwarded to the typesetting engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TypesetOptions {
    /// Delimiter pairs recognized for inline math.
    pub inline_delimiters: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    /// Delimiter pairs recognized for display math.
    pub display_delimiters: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    pub process_escapes: bool,
    /// Whether the engine may reuse glyph definitions across expressions.
    /// Internal to the engine; it does not affect this pipeline.
    pub glyph_cache: bool,
}
impl Default for TypesetOptions {
    fn default() -> Self {
        TypesetOptions {
            inline_delimiters: vec![
                (Cow::Borrowed("$"), Cow::Borrowed("$")),
                (Cow::Borrowed("\\("), Cow::Borrowed("\\)")),
            ],
            display_delimiters: vec![
                (Cow::Borrowed("$$"), Cow::Borrowed("$$")),
                (Cow::Borrowed("\\["), Cow::Borrowed("\\]")),
            ],
            process_escapes: true,
            glyph_cache: false,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum TypesetError {
    #[error("failed to compile input: {0}")]
    Compile(String),
    #[error("failed to render document: {0}")]
    Render(String),
}

/// The external math typesetting engine.
///
/// An instance is owned by the caller and passed into [`crate::Renderer`];
/// there is no process-global engine. Implementations are used from a single
/// thread per render call.
pub trait Typesetter {
    fn typeset(
        &self,
        input: &str,
        options: &TypesetOptions,
    ) -> Result<TypesetDocument, TypesetError>;
}

/// Resolves HTML entities in text leaves.
pub trait EntityDecoder {
    fn decode(&self, raw: &str) -> String;
}

static ENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("&(?:amp|lt|gt|quot|nbsp|#x27|#39);").unwrap());

/// Decoder for the handful of entities the engine's adaptor actually emits.
/// Hosts with richer input swap in a full decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicEntityDecoder;
impl EntityDecoder for BasicEntityDecoder {
    fn decode(&self, raw: &str) -> String {
        ENTITY_REGEX
            .replace_all(raw, |caps: &regex::Captures| -> &'static str {
                match &caps[0] {
                    "&amp;" => "&",
                    "&lt;" => "<",
                    "&gt;" => ">",
                    "&quot;" => "\"",
                    "&nbsp;" => " ",
                    "&#x27;" | "&#39;" => "'",
                    _ => "",
                }
            })
            .into_owned()
    }
}

/// Translates a CSS declaration string into a [`Style`].
pub trait CssTranslator {
    fn translate(&self, css: &str) -> Style;
}

/// Translator for the declarations the style cascade actually consumes.
/// Unknown properties and malformed declarations are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationTranslator;
impl CssTranslator for DeclarationTranslator {
    fn translate(&self, css: &str) -> Style {
        let mut style = Style::default();
        for decl in css.split(';') {
            let Some((prop, val)) = decl.split_once(':') else {
                continue;
            };
            let (prop, val) = (prop.trim(), val.trim());
            if val.is_empty() {
                continue;
            }

            match prop {
                "color" => style.color = Some(Cow::Owned(val.to_string())),
                "background-color" => {
                    style.background_color = Some(Cow::Owned(val.to_string()));
                }
                "font-size" => {
                    style.font_size = val.trim_end_matches("px").trim().parse().ok();
                }
                "font-weight" => {
                    style.font_weight = match val {
                        "bold" | "bolder" | "600" | "700" | "800" | "900" => {
                            Some(crate::style::FontWeight::Bold)
                        }
                        "normal" | "400" => Some(crate::style::FontWeight::Normal),
                        _ => None,
                    };
                }
                "font-style" => {
                    style.font_style = match val {
                        "italic" | "oblique" => Some(crate::style::FontStyle::Italic),
                        "normal" => Some(crate::style::FontStyle::Normal),
                        _ => None,
                    };
                }
                "text-decoration" | "text-decoration-line" => {
                    style.text_decoration = match val {
                        "underline" => Some(crate::style::TextDecoration::Underline),
                        "line-through" => Some(crate::style::TextDecoration::LineThrough),
                        _ => None,
                    };
                }
                "width" => style.width = Some(Cow::Owned(val.to_string())),
                _ => {}
            }
        }
        style
    }
}

static ROOT_ELEMENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new("<svg[^>]*>").unwrap());
// The leading \s keeps hyphenated attributes like stroke-width from matching
static WIDTH_VALUE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\swidth="([^"]*)""#).unwrap());
static HEIGHT_VALUE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sheight="([^"]*)""#).unwrap());

/// Pull an attribute value out of the markup's root element.
fn markup_attr(markup: &str, attr: &Regex) -> Option<String> {
    let root = ROOT_ELEMENT_REGEX.find(markup)?.as_str();
    attr.captures(root).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{FontStyle, FontWeight};

    #[test]
    fn test_entity_decode() {
        let decoder = BasicEntityDecoder;
        assert_eq!(decoder.decode("abc test"), "abc test");
        assert_eq!(decoder.decode("&#x27;hello&#x27;"), "'hello'");
        assert_eq!(decoder.decode("test&amp;other"), "test&other");
        assert_eq!(decoder.decode("2 &lt; 3 &gt; 1"), "2 < 3 > 1");
    }

    #[test]
    fn test_declaration_translate() {
        let css = DeclarationTranslator;
        let style = css.translate("color: red; font-weight: bold; font-style: italic");
        assert_eq!(style.color.as_deref(), Some("red"));
        assert_eq!(style.font_weight, Some(FontWeight::Bold));
        assert_eq!(style.font_style, Some(FontStyle::Italic));

        // Malformed declarations resolve to nothing rather than erroring
        let style = css.translate("nonsense;; color red; : 4");
        assert_eq!(style, Style::default());
    }

    #[test]
    fn test_math_node_exposes_markup_size() {
        let node = TypesetNode::math(
            "<svg stroke-width=\"0.5\" width=\"2.32ex\" height=\"1.8ex\"><g></g></svg>",
        );
        let svg = &node.children[0];
        assert_eq!(svg.attr("width"), Some("2.32ex"));
        assert_eq!(svg.attr("height"), Some("1.8ex"));
    }
}
