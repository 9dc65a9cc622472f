/*!
 * Terminology overlay.
 *
 * Glossary terms are hidden behind glossary tokens before translation so
 * the translator cannot alter them. On restore a token becomes either the
 * matched text (keep) or the preferred rendering (map). Matching runs on
 * shielded text and never looks inside existing tokens, with one exception:
 * an `&`, `<` or `>` in a term also matches the placeholder token the
 * shield put in place of the escaped character.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use quick_xml::escape::unescape;
use regex::Regex;
use std::fs;
use std::path::Path;

use super::tokens::{self, Run, TokenKind};

/// What a matched term turns into after translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlossaryPolicy {
    /// Keep the term exactly as it appeared in the source
    Keep,
    /// Replace the term with the preferred rendering
    Map,
}

/// How a term is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Whole words only
    Word,
    /// Anywhere, including inside words
    Substring,
}

/// One glossary entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryRule {
    pub term: String,
    pub replacement: Option<String>,
    pub policy: GlossaryPolicy,
    pub match_mode: MatchMode,
}

impl GlossaryRule {
    /// Rule keeping a term verbatim
    pub fn keep(term: &str) -> Self {
        Self {
            term: term.to_string(),
            replacement: None,
            policy: GlossaryPolicy::Keep,
            match_mode: MatchMode::Word,
        }
    }

    /// Rule mapping a term to a preferred rendering
    pub fn map(term: &str, replacement: &str) -> Self {
        Self {
            term: term.to_string(),
            replacement: Some(replacement.to_string()),
            policy: GlossaryPolicy::Map,
            match_mode: MatchMode::Word,
        }
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    /// Whether the term holds characters that are escaped in document text
    fn has_markup_chars(&self) -> bool {
        self.term.contains(['&', '<', '>'])
    }

    fn pattern(&self) -> String {
        let escaped: String = self
            .term
            .chars()
            .map(|c| match c {
                '&' => format!("(?:&amp;|&|{})", PLACEHOLDER_TOKEN),
                '<' => format!("(?:&lt;|<|{})", PLACEHOLDER_TOKEN),
                '>' => format!("(?:&gt;|>|{})", PLACEHOLDER_TOKEN),
                other => regex::escape(&other.to_string()),
            })
            .collect();
        match self.match_mode {
            MatchMode::Substring => format!("(?i){}", escaped),
            MatchMode::Word => {
                // \b only applies next to word characters
                let starts_word = self.term.chars().next().is_some_and(is_word_char);
                let ends_word = self.term.chars().last().is_some_and(is_word_char);
                format!(
                    "(?i){}{}{}",
                    if starts_word { r"\b" } else { "" },
                    escaped,
                    if ends_word { r"\b" } else { "" }
                )
            }
        }
    }
}

const PLACEHOLDER_TOKEN: &str = r"\x{E000}\s*[0-9]+\s*\x{E001}";

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: GlossaryRule,
    regex: Regex,
}

impl CompiledRule {
    /// Whether a match that may span placeholder tokens really spells the term
    fn spells_term(&self, matched: &str, placeholders: &[String]) -> bool {
        let expanded = tokens::replace_tokens(matched, TokenKind::Placeholder, |index| {
            placeholders.get(index).cloned()
        });
        let decoded = match unescape(&expanded) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => expanded,
        };
        decoded.to_lowercase() == self.rule.term.to_lowercase()
    }

    fn restore_value(&self, matched: &str) -> String {
        match self.rule.policy {
            GlossaryPolicy::Keep => matched.to_string(),
            GlossaryPolicy::Map => self
                .rule
                .replacement
                .clone()
                .unwrap_or_else(|| matched.to_string()),
        }
    }
}

/// Text with glossary terms replaced by glossary tokens
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlossaryProtected {
    /// Text sent to the translator
    pub text: String,
    /// Value written back for each token index
    pub restore_map: Vec<String>,
}

/// Ordered set of glossary rules
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    rules: Vec<CompiledRule>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile rules, keeping declaration order
    pub fn load(rules: Vec<GlossaryRule>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.term.trim().is_empty() {
                warn!("Ignoring glossary rule with an empty term");
                continue;
            }
            if rule.policy == GlossaryPolicy::Map && rule.replacement.is_none() {
                return Err(anyhow!("Glossary term '{}' uses map without a replacement", rule.term));
            }
            let regex = Regex::new(&rule.pattern())
                .with_context(|| format!("Invalid glossary term '{}'", rule.term))?;
            compiled.push(CompiledRule { rule, regex });
        }
        debug!("Loaded glossary with {} rule(s)", compiled.len());
        Ok(Self { rules: compiled })
    }

    /// Parse CSV rows `source,replacement,mode,match`
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let fields = parse_csv_line(trimmed);
            if rules.is_empty() && is_header(&fields) {
                continue;
            }
            let rule = parse_rule(&fields)
                .with_context(|| format!("Invalid glossary entry at line {}: {}", line_num + 1, trimmed))?;
            rules.push(rule);
        }
        Self::load(rules)
    }

    /// Load a CSV glossary file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read glossary file: {}", path.display()))?;
        Self::from_csv_str(&content)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &GlossaryRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Replace glossary terms with glossary tokens, rules in order
    pub fn protect(&self, text: &str) -> GlossaryProtected {
        self.protect_shielded(text, &[])
    }

    /// Replace glossary terms in shielded text.
    ///
    /// `placeholders` are the spans behind the shield's placeholder tokens.
    /// Terms containing `&`, `<` or `>` may swallow the tokens of escaped
    /// characters; those tokens then travel inside the glossary token.
    pub fn protect_shielded(&self, text: &str, placeholders: &[String]) -> GlossaryProtected {
        let mut restore_map = Vec::new();
        let mut current = text.to_string();

        for compiled in &self.rules {
            if !compiled.regex.is_match(&current) {
                continue;
            }

            if compiled.rule.has_markup_chars() {
                current = compiled
                    .regex
                    .replace_all(&current, |caps: &regex::Captures<'_>| {
                        if !compiled.spells_term(&caps[0], placeholders) {
                            return caps[0].to_string();
                        }
                        restore_map.push(compiled.restore_value(&caps[0]));
                        TokenKind::Glossary.render(restore_map.len() - 1)
                    })
                    .into_owned();
                continue;
            }

            let mut next = String::with_capacity(current.len());
            for run in tokens::split_runs(&current) {
                match run {
                    Run::Token(token) => next.push_str(token),
                    Run::Text(segment) => {
                        let replaced = compiled.regex.replace_all(segment, |caps: &regex::Captures<'_>| {
                            restore_map.push(compiled.restore_value(&caps[0]));
                            TokenKind::Glossary.render(restore_map.len() - 1)
                        });
                        next.push_str(&replaced);
                    }
                }
            }
            current = next;
        }

        GlossaryProtected {
            text: current,
            restore_map,
        }
    }

    /// Substitute glossary tokens with their restore values
    pub fn restore(text: &str, restore_map: &[String]) -> String {
        if restore_map.is_empty() {
            return text.to_string();
        }
        tokens::replace_tokens(text, TokenKind::Glossary, |index| restore_map.get(index).cloned())
    }
}

fn is_header(fields: &[String]) -> bool {
    fields
        .first()
        .map(|first| matches!(first.to_lowercase().as_str(), "source" | "term" | "source term"))
        .unwrap_or(false)
}

fn parse_rule(fields: &[String]) -> Result<GlossaryRule> {
    let field = |index: usize| fields.get(index).map(|value| value.trim()).unwrap_or("");

    let term = field(0);
    if term.is_empty() {
        return Err(anyhow!("missing source term"));
    }
    let replacement = Some(field(1)).filter(|value| !value.is_empty());

    let policy = match field(2).to_lowercase().as_str() {
        "" if replacement.is_some() => GlossaryPolicy::Map,
        "" | "keep" => GlossaryPolicy::Keep,
        "map" => GlossaryPolicy::Map,
        other => return Err(anyhow!("unknown mode '{}'", other)),
    };
    let match_mode = match field(3).to_lowercase().as_str() {
        "" | "word" => MatchMode::Word,
        "substr" | "substring" => MatchMode::Substring,
        other => return Err(anyhow!("unknown match '{}'", other)),
    };

    Ok(GlossaryRule {
        term: term.to_string(),
        replacement: replacement.map(str::to_string),
        policy,
        match_mode,
    })
}

/// Split one CSV line; double quotes group commas and `""` is a literal quote
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
