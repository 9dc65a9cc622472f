/*!
 * Inline markup extraction and rebuilding.
 *
 * An element with mixed content is flattened into a single string where each
 * child node is replaced by an inline marker. The children themselves are
 * kept aside as opaque snapshots. After translation the string is split on
 * the markers again; the text runs become the element's text and the
 * children's tails, and the snapshots are pasted back unchanged.
 *
 * Text in the flattened string is XML-escaped (`&amp;`, `&lt;`, `&gt;`) so
 * translators see the same character data the document holds. Entity
 * references returned by the translator are decoded on the way back.
 */

use log::debug;
use once_cell::sync::Lazy;
use quick_xml::escape::partial_escape;
use regex::Regex;

use crate::errors::RebuildError;
use crate::validation::TokenValidator;
use crate::xliff::dom::{Element, Node};
use crate::xliff::parser;

use super::tokens::{self, TokenKind};

/// Flattened element content
#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    /// Escaped text with one inline marker per child
    pub flat: String,
    /// Child snapshots, tails cleared
    pub children: Vec<Node>,
}

impl InlineFragment {
    pub fn marker_count(&self) -> usize {
        self.children.len()
    }
}

/// Content ready to be written into an element
#[derive(Debug, Clone, PartialEq)]
pub struct RebuiltContent {
    pub text: String,
    pub children: Vec<Node>,
}

impl RebuiltContent {
    /// Replace the element's content; attributes and tail are untouched
    pub fn apply_to(self, element: &mut Element) {
        element.text = self.text;
        element.children = self.children;
    }
}

/// Flatten an element's content into text plus inline markers
pub fn linearize(element: &Element) -> InlineFragment {
    let mut flat = partial_escape(element.text.as_str()).into_owned();
    let mut children = Vec::with_capacity(element.children.len());

    for (index, node) in element.children.iter().enumerate() {
        children.push(node.detached());
        flat.push_str(&TokenKind::Inline.render(index));
        flat.push_str(&partial_escape(node.tail()));
    }

    InlineFragment { flat, children }
}

/// Rebuild element content from translated flat text.
///
/// Every marker must appear exactly once and in the original order, otherwise
/// the children could not be placed back without changing the structure.
pub fn delinearize(flat: &str, children: &[Node]) -> Result<RebuiltContent, RebuildError> {
    let validation = TokenValidator::validate(flat, TokenKind::Inline, children.len());
    if !validation.passed_in_order() {
        return Err(RebuildError::MarkerMismatch(validation.describe()));
    }

    let runs = tokens::split_on(flat, TokenKind::Inline);
    if runs.len() != children.len() + 1 {
        return Err(RebuildError::MarkerMismatch(format!(
            "expected {} text runs, found {}",
            children.len() + 1,
            runs.len()
        )));
    }

    let text = decode_run(runs[0])?;
    let mut rebuilt = Vec::with_capacity(children.len());
    for (child, run) in children.iter().zip(runs.iter().skip(1)) {
        let mut node = child.clone();
        *node.tail_mut() = decode_run(run)?;
        rebuilt.push(node);
    }

    Ok(RebuiltContent {
        text,
        children: rebuilt,
    })
}

/// Turn one run of translated text into character data.
///
/// Well-formed runs are decoded as XML text. Otherwise the stray markup
/// characters (`<`, `>` and any `&` that does not start a reference) are
/// escaped and the run is decoded again, so references that were already
/// valid still decode.
pub fn decode_run(run: &str) -> Result<String, RebuildError> {
    if let Ok(decoded) = parser::decode_text_run(run) {
        return Ok(decoded);
    }

    debug!("Text run is not well-formed, escaping stray markup: {}", run);
    let escaped = escape_stray_markup(run);
    parser::decode_text_run(&escaped).map_err(|e| RebuildError::MalformedFragment(e.to_string()))
}

// Predefined entities and character references quick-xml can decode
static REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:amp|lt|gt|quot|apos|#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6}));")
        .expect("Invalid reference regex")
});

/// Escape `<`, `>` and every `&` that does not begin a decodable reference
fn escape_stray_markup(run: &str) -> String {
    let mut out = String::with_capacity(run.len() + 8);
    for (index, c) in run.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if !starts_with_reference(&run[index..]) => out.push_str("&amp;"),
            other => out.push(other),
        }
    }
    out
}

fn starts_with_reference(text: &str) -> bool {
    let Some(caps) = REFERENCE_REGEX.captures(text) else {
        return false;
    };
    let code = match (caps.get(1), caps.get(2)) {
        (Some(decimal), _) => decimal.as_str().parse::<u32>().ok(),
        (_, Some(hex)) => u32::from_str_radix(hex.as_str(), 16).ok(),
        _ => return true,
    };
    code.filter(|code| *code != 0).and_then(char::from_u32).is_some()
}
