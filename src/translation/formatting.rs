/*!
 * Spacing normalization for mixed content.
 *
 * Translators tend to drop or double the spaces next to inline markers.
 * This pass collapses whitespace runs and puts back a single space where a
 * word runs straight into an inline element. Elements marked
 * `xml:space="preserve"` and everything below them are left alone.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::xliff::dom::{Document, Element, Node};

/// Two or more whitespace characters
static WHITESPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s{2,}").expect("Invalid whitespace regex")
});

/// Spacing normalizer for translated documents
pub struct FormatNormalizer;

impl FormatNormalizer {
    /// Normalize every mixed-content element in the document
    pub fn normalize(doc: &mut Document) {
        Self::normalize_element(&mut doc.root);
    }

    /// Normalize an element and its descendants
    pub fn normalize_element(element: &mut Element) {
        if element.preserves_space() {
            return;
        }

        if element.has_mixed_content() {
            Self::normalize_runs(element);
        }

        for node in element.children.iter_mut() {
            if let Node::Element(child) = node {
                Self::normalize_element(child);
            }
        }
    }

    fn normalize_runs(element: &mut Element) {
        element.text = collapse_whitespace(&element.text);
        for node in element.children.iter_mut() {
            let collapsed = collapse_whitespace(node.tail());
            *node.tail_mut() = collapsed;
        }

        for index in 0..element.children.len() {
            if element.children[index].as_element().is_none() {
                continue;
            }

            let preceding = if index == 0 {
                &mut element.text
            } else {
                element.children[index - 1].tail_mut()
            };
            if preceding.chars().last().is_some_and(char::is_alphanumeric) {
                preceding.push(' ');
            }

            let tail = element.children[index].tail_mut();
            if tail.chars().next().is_some_and(char::is_alphanumeric) {
                tail.insert(0, ' ');
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN_REGEX.replace_all(text, " ").into_owned()
}
