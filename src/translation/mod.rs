/*!
 * Text translation for XLIFF documents.
 *
 * - `tokens`: private-use token syntax shared by the protection layers
 * - `shield`: placeholder protection (variables, URLs, numbers, entities)
 * - `glossary`: terminology rules applied after the shield
 * - `inline`: flattening of mixed content into text plus inline markers
 * - `formatting`: spacing repair after translated text is put back
 * - `cache`: translation memory for one run
 * - `core`: the translation service running the per-text pipeline
 * - `document`: the per-document orchestrator
 */

pub use self::core::{LogEntry, ServiceStats, TextOutcome, TranslationService};
pub use self::document::{DocumentOptions, DocumentReport, DocumentTranslator};

pub mod cache;
pub mod core;
pub mod document;
pub mod formatting;
pub mod glossary;
pub mod inline;
pub mod shield;
pub mod tokens;
