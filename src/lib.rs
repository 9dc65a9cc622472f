/*!
 * # xlifftr - XLIFF translator
 *
 * A Rust library for machine translation of XLIFF 1.2 and 2.x documents that
 * keeps inline markup, placeholders and document structure intact.
 *
 * ## Features
 *
 * - Translate segments, notes and accessibility attributes
 * - Shield variables, format specifiers, URLs, numbers and entities from the
 *   translation service
 * - Keep inline tags (`<g>`, `<pc>`, `<ph>`, ...) exactly where they were
 * - Glossary rules to keep or map terminology
 * - Providers: Google, DeepL, LibreTranslate, Ollama
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `xliff`: Document tree, parser, writer and segment walker
 * - `translation`: Text protection and the translation pipeline:
 *   - `translation::shield`: Placeholder protection
 *   - `translation::inline`: Inline markup extraction and rebuilding
 *   - `translation::glossary`: Terminology overlay
 *   - `translation::formatting`: Spacing normalization
 *   - `translation::core`: Translation service
 *   - `translation::document`: Document orchestrator
 * - `validation`: Token checks after translation
 * - `providers`: Translation service clients
 * - `file_utils`: File system operations
 * - `app_controller`: Batch runs over files and folders
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod validation;
pub mod xliff;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{ProviderError, RebuildError, TranslationError, XliffError};
pub use language_utils::{get_language_name, normalize_to_part2t};
pub use translation::{DocumentOptions, DocumentReport, DocumentTranslator, TranslationService};
pub use xliff::{Document, XliffVersion, parse_document};
