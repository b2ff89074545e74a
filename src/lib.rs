//! Renders a string of mixed prose and TeX-style math into a tree of styled
//! visual nodes for a UI layout engine that cannot interpret raw markup.
//!
//! The math itself is typeset by an external engine behind the
//! [`Typesetter`] trait; this crate walks the engine's document tree,
//! cascades styles, reformats the markdown-like conventions found in text
//! leaves, post-processes the vector markup of math regions, and decides
//! which formulas need a horizontally scrollable wrapper.
//!
//! ```no_run
//! # use texview::{Renderer, RenderConfig, Typesetter, TypesetOptions,
//! #     TypesetDocument, TypesetError};
//! # struct Engine;
//! # impl Typesetter for Engine {
//! #     fn typeset(&self, _: &str, _: &TypesetOptions)
//! #         -> Result<TypesetDocument, TypesetError> { unimplemented!() }
//! # }
//! let renderer = Renderer::new(Engine);
//! let tree = renderer.render("Euler: $e^{i\\pi} + 1 = 0$", &RenderConfig::default())?;
//! # Ok::<(), texview::RenderError>(())
//! ```

use std::borrow::Cow;

use thiserror::Error;
use tracing::debug;

pub mod engine;
pub mod layout;
pub mod node;
pub mod style;
pub mod svg;
pub mod table;
pub mod text;

mod render;

pub use engine::{
    BasicEntityDecoder, CssTranslator, DeclarationTranslator, EntityDecoder, NodeKind,
    TypesetDocument, TypesetError, TypesetNode, TypesetOptions, Typesetter,
};
pub use node::{Axis, Container, Heading, MathGlyph, RenderNode, TableBlock, TableRow, TextRun};
pub use style::{Style, StyleKey, StyleOverrides, StyleSheet};

/// Layout direction of the top-level container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flow {
    #[default]
    RowWrap,
    ColumnWrap,
}

/// Caller-facing presentation options for one render.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Requested font size. Halved internally before it is used as the
    /// vector-markup scale factor; absent means a scale of 14.
    pub font_size: Option<f64>,
    /// Foreground color substituted for the markup's generic color
    /// placeholders.
    pub color: Option<Cow<'static, str>>,
    /// Whether the engine may reuse glyph definitions internally.
    pub glyph_cache: bool,
    pub scroll_border_color: Option<Cow<'static, str>>,
    pub scroll_icon_color: Option<Cow<'static, str>>,
    pub flow: Flow,
    /// Per-key stylesheet overrides, shallow-merged over the defaults.
    pub style_overrides: StyleOverrides,
}

impl RenderConfig {
    fn font_scale(&self) -> f64 {
        match self.font_size {
            Some(size) => size / 2.0,
            None => 14.0,
        }
    }

    fn color(&self) -> &str {
        self.color.as_deref().unwrap_or("white")
    }

    fn scroll_border_color(&self) -> &str {
        self.scroll_border_color.as_deref().unwrap_or("white")
    }

    fn scroll_icon_color(&self) -> &str {
        self.scroll_icon_color.as_deref().unwrap_or("white")
    }
}

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The typesetting engine rejected the input. Not recovered here; TeX
    /// validity is the engine's concern.
    #[error(transparent)]
    Typeset(#[from] TypesetError),
}

/// One render pipeline over a caller-owned typesetting engine.
///
/// The renderer holds no state between calls; repeated renders of the same
/// input re-run the full pipeline. Single-threaded use per call.
pub struct Renderer<E> {
    engine: E,
    decoder: Box<dyn EntityDecoder>,
    css: Box<dyn CssTranslator>,
}

impl<E: Typesetter> Renderer<E> {
    pub fn new(engine: E) -> Renderer<E> {
        Renderer {
            engine,
            decoder: Box::new(BasicEntityDecoder),
            css: Box::new(DeclarationTranslator),
        }
    }

    /// Swap in a host-provided entity decoder.
    pub fn with_decoder(mut self, decoder: impl EntityDecoder + 'static) -> Renderer<E> {
        self.decoder = Box::new(decoder);
        self
    }

    /// Swap in a host-provided CSS declaration translator.
    pub fn with_css_translator(mut self, css: impl CssTranslator + 'static) -> Renderer<E> {
        self.css = Box::new(css);
        self
    }

    /// Render one input string into a [`Container`] tree.
    ///
    /// Empty input produces an empty container rather than an error. An
    /// engine failure propagates as [`RenderError::Typeset`].
    pub fn render(&self, input: &str, config: &RenderConfig) -> Result<Container, RenderError> {
        if input.is_empty() {
            let axis = match config.flow {
                Flow::RowWrap => Axis::Horizontal,
                Flow::ColumnWrap => Axis::Vertical,
            };
            return Ok(Container {
                children: Vec::new(),
                scrollable: false,
                axis,
                style: Style::default(),
            });
        }

        debug!(len = input.len(), "typesetting input");

        let options = TypesetOptions {
            glyph_cache: config.glyph_cache,
            ..TypesetOptions::default()
        };
        let doc = self.engine.typeset(input, &options)?;

        let styles = StyleSheet::default().with_overrides(&config.style_overrides);
        let ctx = render::BuildContext {
            styles: &styles,
            font_scale: config.font_scale(),
            color: config.color(),
            scroll_border_color: config.scroll_border_color(),
            scroll_icon_color: config.scroll_icon_color(),
            flow: config.flow,
            decoder: self.decoder.as_ref(),
            css: self.css.as_ref(),
        };

        Ok(render::build_document(&doc, &ctx))
    }
}
