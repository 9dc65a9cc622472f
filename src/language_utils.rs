use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// XLIFF carries BCP 47 style tags (`pt-BR`, `zh_Hant`). Only the primary
/// subtag is checked against ISO 639-1 / 639-2; region and script subtags are
/// passed through to the provider untouched.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// Bibliographic codes that differ from their terminology form
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Primary language subtag of a tag (`pt-BR` -> `pt`)
pub fn base_language(code: &str) -> &str {
    let code = code.trim();
    code.split(['-', '_']).next().unwrap_or(code)
}

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(part2b, _)| *part2b == code)
        .map(|(_, part2t)| *part2t)
}

fn region_is_valid(subtag: &str) -> bool {
    let len = subtag.len();
    (2..=8).contains(&len) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Validate a language tag whose primary subtag is ISO 639-1 or ISO 639-2
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let trimmed = code.trim();
    let mut subtags = trimmed.split(['-', '_']);
    let normalized_code = subtags.next().unwrap_or_default().to_lowercase();

    if subtags.any(|subtag| !region_is_valid(subtag)) {
        return Err(anyhow!("Invalid language code: {}", code));
    }

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if part2b_to_part2t(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = base_language(code).to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
