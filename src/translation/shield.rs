/*!
 * Placeholder protection.
 *
 * Spans a translator must not touch (format specifiers, template
 * variables, URLs, numbers and so on) are swapped for placeholder tokens
 * before translation and swapped back afterwards. All patterns live in one
 * alternation, so at any position the earliest listed pattern that matches
 * wins and a span is never tokenized twice.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::tokens::{self, TokenKind};

/// Protected span patterns, highest priority first
const SHIELD_PATTERNS: [&str; 10] = [
    // Tokens from an earlier pass are left alone
    r"(?P<token>[\x{E000}\x{E002}\x{E004}]\s*[0-9]+\s*[\x{E001}\x{E003}\x{E005}])",
    // XML character entities
    r"&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);",
    // Tag-like text
    r"</?[A-Za-z][A-Za-z0-9:_.-]*(?:\s[^<>]*)?/?>",
    // URLs
    r#"(?:(?:https?|ftp)://|www\.)[^\s<>"'\x{E000}-\x{E005}]*[^\s<>"'.,;:!?)\]}\x{E000}-\x{E005}]"#,
    // E-mail addresses
    r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}",
    // Double-brace templates
    r"\{\{.*?\}\}",
    // Single-brace placeholders, one nesting level for ICU-style arguments
    r"\{(?:[^{}]|\{[^{}]*\})*\}",
    // printf and Python percent specifiers; a letter conversion must end the word
    r"%(?:[0-9]+\$)?(?:\([A-Za-z_][A-Za-z0-9_]*\))?[-+0#]*(?:[0-9]+|\*)?(?:\.[0-9]+)?(?:hh|h|ll|l|L|z|j|t)?(?:[diouxXeEfFgGaAcspn]\b|[@%])",
    // Dates and times
    r"\b[0-9]{1,4}(?:[-/.:][0-9]{1,4}){1,2}\b",
    // Numbers with grouping or decimals
    r"\b[0-9]+(?:[.,][0-9]+)*\b",
];

static SHIELD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&SHIELD_PATTERNS.join("|")).expect("Invalid shield regex")
});

/// Text with protected spans replaced by placeholder tokens
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShieldedText {
    /// Text sent to the translator
    pub text: String,
    /// Original span for each token index
    pub tokens: Vec<String>,
}

impl ShieldedText {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

/// Placeholder shield
pub struct PlaceholderShield;

impl PlaceholderShield {
    /// Replace protected spans with dense placeholder tokens
    pub fn protect(text: &str) -> ShieldedText {
        if text.trim().is_empty() {
            return ShieldedText {
                text: text.to_string(),
                tokens: Vec::new(),
            };
        }

        let mut protected = Vec::new();
        let shielded = SHIELD_REGEX.replace_all(text, |caps: &regex::Captures<'_>| {
            if caps.name("token").is_some() {
                return caps[0].to_string();
            }
            let token = TokenKind::Placeholder.render(protected.len());
            protected.push(caps[0].to_string());
            token
        });

        ShieldedText {
            text: shielded.into_owned(),
            tokens: protected,
        }
    }

    /// Put protected spans back; unknown token indices are left untouched
    pub fn restore(text: &str, protected: &[String]) -> String {
        if protected.is_empty() {
            return text.to_string();
        }
        tokens::replace_tokens(text, TokenKind::Placeholder, |index| {
            protected.get(index).cloned()
        })
    }
}
