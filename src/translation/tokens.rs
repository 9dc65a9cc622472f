/*!
 * Opaque tokens substituted for text that must survive translation.
 *
 * A token is `<open><index><close>` where the delimiters are Unicode
 * private-use code points, one pair per token kind. Machine translators
 * pass private-use characters through untouched and never mistake them for
 * words, so a token comes back exactly as sent or is visibly damaged.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Token family; each has its own delimiter pair and index space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Placeholders, URLs, numbers and similar protected spans
    Placeholder,
    /// Glossary terms
    Glossary,
    /// Inline markup children
    Inline,
}

impl TokenKind {
    /// Opening and closing delimiter
    pub const fn delimiters(self) -> (char, char) {
        match self {
            Self::Placeholder => ('\u{E000}', '\u{E001}'),
            Self::Glossary => ('\u{E002}', '\u{E003}'),
            Self::Inline => ('\u{E004}', '\u{E005}'),
        }
    }

    /// Render the token for an index
    pub fn render(self, index: usize) -> String {
        let (open, close) = self.delimiters();
        format!("{}{}{}", open, index, close)
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::Placeholder => &PLACEHOLDER_TOKEN_REGEX,
            Self::Glossary => &GLOSSARY_TOKEN_REGEX,
            Self::Inline => &INLINE_TOKEN_REGEX,
        }
    }
}

// Translators occasionally pad tokens with spaces; those still count.
static PLACEHOLDER_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x{E000}\s*([0-9]+)\s*\x{E001}").expect("Invalid placeholder token regex")
});

static GLOSSARY_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x{E002}\s*([0-9]+)\s*\x{E003}").expect("Invalid glossary token regex")
});

static INLINE_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x{E004}\s*([0-9]+)\s*\x{E005}").expect("Invalid inline token regex")
});

/// Any token of any kind
pub static ANY_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{E000}\x{E002}\x{E004}]\s*[0-9]+\s*[\x{E001}\x{E003}\x{E005}]")
        .expect("Invalid token regex")
});

/// A slice of text split around tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Run<'a> {
    Text(&'a str),
    Token(&'a str),
}

/// Indices of every token of a kind, in order of appearance
pub fn find_indices(text: &str, kind: TokenKind) -> Vec<usize> {
    kind.regex()
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).and_then(|m| m.as_str().parse().ok()))
        .collect()
}

/// Replace tokens of a kind; tokens the lookup does not know stay as they are
pub fn replace_tokens<F>(text: &str, kind: TokenKind, lookup: F) -> String
where
    F: Fn(usize) -> Option<String>,
{
    kind.regex()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            caps.get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .and_then(&lookup)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Split text into alternating runs of plain text and tokens of any kind
pub fn split_runs(text: &str) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut last = 0;
    for token in ANY_TOKEN_REGEX.find_iter(text) {
        if token.start() > last {
            runs.push(Run::Text(&text[last..token.start()]));
        }
        runs.push(Run::Token(token.as_str()));
        last = token.end();
    }
    if last < text.len() {
        runs.push(Run::Text(&text[last..]));
    }
    runs
}

/// Split text on tokens of one kind; yields `count + 1` runs when every
/// token is present exactly once
pub fn split_on(text: &str, kind: TokenKind) -> Vec<&str> {
    kind.regex().split(text).collect()
}

/// Whether anything a translator could work on remains outside tokens
pub fn has_translatable_text(text: &str) -> bool {
    ANY_TOKEN_REGEX
        .replace_all(text, "")
        .chars()
        .any(char::is_alphabetic)
}
