//! Post-processing of the vector markup the engine emits for one math
//! expression: size extraction, rescaling, recoloring, and cleanup of
//! engine-internal decoration.
//!
//! Every step is a total rewrite of the markup string; none of them depend
//! on an earlier step having matched anything.

use once_cell::sync::Lazy;
use regex::Regex;

/// Extra divisor applied to the scaled width. The reference behavior scales
/// width by the font factor alone, so this stays at 1.
const WIDTH_CORRECTION: f64 = 1.0;

static ROOT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new("(?i)<svg[^>]*>").unwrap());

static WIDTH_ATTR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)width=\"([0-9.]+)[ep]x\"").unwrap());
static HEIGHT_ATTR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)height=\"([0-9.]+)[ep]x\"").unwrap());

static FONT_FAMILY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)\\s?font-family=\"[^\"]*\"").unwrap());

static ERROR_FRAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("<rect[^>]*data-frame=\"true\"[^>]*>").unwrap());

static SCALE_WIDTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)(<svg[^>]+width=\")([0-9.]+)([ep]x\"[^>]*>)").unwrap());
static SCALE_HEIGHT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)(<svg[^>]+height=\")([0-9.]+)([ep]x\"[^>]*>)").unwrap());

// A declared zero size must stay exactly "0"; "0ex" variants break the host
// renderer.
static ZERO_WIDTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)(<svg[^>]+width=\")(0+[ep]?x?)(\"[^>]*>)").unwrap());
static ZERO_HEIGHT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)(<svg[^>]+height=\")(0+[ep]?x?)(\"[^>]*>)").unwrap());

static CURRENT_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new("(?i)currentColor").unwrap());

/// Result of [`process_markup`]: the rewritten markup and the size pair
/// declared by the original markup, in engine units, when one was present.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedMarkup {
    pub markup: String,
    pub size: Option<(f64, f64)>,
}

/// Read the declared width/height off the markup's root element.
///
/// Missing or malformed attributes yield `None`; the caller then skips
/// rescaling rather than failing the render.
pub fn extract_size(markup: &str) -> Option<(f64, f64)> {
    let root = ROOT_REGEX.find(markup)?.as_str();

    let width = WIDTH_ATTR_REGEX.captures(root)?[1].parse::<f64>().ok()?;
    let height = HEIGHT_ATTR_REGEX.captures(root)?[1].parse::<f64>().ok()?;
    Some((width, height))
}

fn rewrite_attr(markup: &str, re: &Regex, value: f64) -> String {
    re.replace(markup, |caps: &regex::Captures| {
        format!("{}{}{}", &caps[1], value, &caps[3])
    })
    .into_owned()
}

/// Rewrite the root element's declared size to `width`/`height`. Declared
/// zeros are normalized to a bare "0".
fn apply_scale(markup: &str, width: f64, height: f64) -> String {
    let markup = rewrite_attr(markup, &SCALE_HEIGHT_REGEX, height);
    let markup = rewrite_attr(&markup, &SCALE_WIDTH_REGEX, width);

    let markup = ZERO_WIDTH_REGEX.replace(&markup, "${1}0${3}");
    ZERO_HEIGHT_REGEX.replace(&markup, "${1}0${3}").into_owned()
}

/// Replace every generic "current color" placeholder with the literal
/// target color.
fn apply_color(markup: &str, color: &str) -> String {
    CURRENT_COLOR_REGEX.replace_all(markup, color).into_owned()
}

/// Run the full rewrite chain over one math node's markup.
///
/// `font_scale` is the multiplier applied to the declared size. The error
/// frame policy here is replacement: frames marked `data-frame="true"` turn
/// into a transparent placeholder rect, and `merror` groups are left as-is.
pub fn process_markup(markup: &str, font_scale: f64, color: &str) -> ProcessedMarkup {
    let size = extract_size(markup);

    let mut out = FONT_FAMILY_REGEX.replace_all(markup, "").into_owned();

    out = ERROR_FRAME_REGEX
        .replace_all(&out, "<rect fill=\"transparent\" stroke=\"none\">")
        .into_owned();

    // Literal command sequences the engine leaves behind in text nodes
    out = out.replace("\\llbracket", "\u{27E6}");
    out = out.replace("\\rrbracket", "\u{27E7}");
    out = out.replace("\\]", "");
    out = out.replace("\\(", "");
    out = out.replace("\\)", "");

    if let Some((width, height)) = size {
        out = apply_scale(
            &out,
            width * font_scale / WIDTH_CORRECTION,
            height * font_scale,
        );
    }

    out = apply_color(&out, color);

    ProcessedMarkup { markup: out, size }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"2.5ex\" height=\"2ex\" fill=\"currentColor\"><g font-family=\"MJXZERO\"><path d=\"M 0 0\"/></g></svg>";

    #[test]
    fn test_extract_size() {
        assert_eq!(extract_size(MARKUP), Some((2.5, 2.0)));
        assert_eq!(extract_size("<svg viewBox=\"0 0 1 1\"></svg>"), None);
        assert_eq!(extract_size("no markup at all"), None);
    }

    #[test]
    fn test_rescale_multiplies_declared_size() {
        let done = process_markup(MARKUP, 7.0, "white");
        assert!(done.markup.contains("width=\"17.5ex\""));
        assert!(done.markup.contains("height=\"14ex\""));
        assert_eq!(done.size, Some((2.5, 2.0)));
    }

    #[test]
    fn test_zero_size_stays_bare_zero() {
        let markup = "<svg width=\"0\" height=\"0\"><path/></svg>";
        let done = process_markup(markup, 7.0, "white");
        assert!(done.markup.contains("width=\"0\""));
        assert!(done.markup.contains("height=\"0\""));
    }

    #[test]
    fn test_missing_size_skips_rescale() {
        let markup = "<svg viewBox=\"0 0 4 4\" fill=\"currentColor\"><path/></svg>";
        let done = process_markup(markup, 7.0, "red");
        assert_eq!(done.size, None);
        assert!(done.markup.contains("viewBox=\"0 0 4 4\""));
        assert!(done.markup.contains("fill=\"red\""));
    }

    #[test]
    fn test_recolor_replaces_every_placeholder() {
        let markup = "<svg width=\"1ex\" height=\"1ex\"><g fill=\"currentColor\" stroke=\"currentcolor\"/></svg>";
        let done = process_markup(markup, 1.0, "#aabbcc");
        assert!(!done.markup.to_lowercase().contains("currentcolor"));
        assert_eq!(done.markup.matches("#aabbcc").count(), 2);
    }

    #[test]
    fn test_font_family_stripped() {
        let done = process_markup(MARKUP, 1.0, "white");
        assert!(!done.markup.contains("font-family"));
    }

    #[test]
    fn test_error_frame_replaced_with_placeholder() {
        let markup = "<svg width=\"1ex\" height=\"1ex\"><rect width=\"8\" data-frame=\"true\" stroke=\"red\"><path/></svg>";
        let done = process_markup(markup, 1.0, "white");
        assert!(!done.markup.contains("data-frame"));
        assert!(done
            .markup
            .contains("<rect fill=\"transparent\" stroke=\"none\">"));
    }

    #[test]
    fn test_bracket_substitution() {
        let markup = "<svg width=\"1ex\" height=\"1ex\"><text>\\llbracket x \\rrbracket\\]</text></svg>";
        let done = process_markup(markup, 1.0, "white");
        assert!(done.markup.contains("\u{27E6} x \u{27E7}"));
        assert!(!done.markup.contains("\\]"));
    }
}
