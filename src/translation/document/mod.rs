/*!
 * Document translation.
 *
 * Drives the whole pipeline over one parsed document:
 * - every segment: ensure a target, flatten the source, translate, rebuild
 * - notes and accessibility attributes through the same per-text pipeline
 * - spacing repair on rewritten elements, language stamp, serialization
 *
 * Segments run one after another. A failed text keeps its original value
 * and the walk continues; only a document where every provider call failed
 * is an error.
 */

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use quick_xml::escape::partial_escape;
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::language_utils;
use crate::translation::core::{TextOutcome, TranslationService};
use crate::translation::formatting::FormatNormalizer;
use crate::translation::glossary::Glossary;
use crate::translation::inline::{self, RebuiltContent};
use crate::xliff::dom::{Document, Element};
use crate::xliff::walker::{self, DEFAULT_ATTRIBUTES, SegmentRef, TextSite};
use crate::xliff::{DocumentWriter, parse_document};

pub mod report;

pub use report::DocumentReport;

/// How a document is rewritten
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOptions {
    /// Source language code, or `auto` to use the document header
    pub source_language: String,
    pub overwrite_source: bool,
    pub translate_notes: bool,
    pub translate_attributes: bool,
    /// Attribute names translated when `translate_attributes` is set
    pub attributes: Vec<String>,
    pub normalize_spacing: bool,
    pub stamp_target_language: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            source_language: "auto".to_string(),
            overwrite_source: false,
            translate_notes: true,
            translate_attributes: true,
            attributes: DEFAULT_ATTRIBUTES.iter().map(|name| name.to_string()).collect(),
            normalize_spacing: true,
            stamp_target_language: true,
        }
    }
}

impl DocumentOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_language: config.source_language.clone(),
            overwrite_source: config.document.overwrite_source,
            translate_notes: config.document.translate_notes,
            translate_attributes: config.document.translate_attributes,
            attributes: config.document.attributes.clone(),
            normalize_spacing: config.document.normalize_spacing,
            stamp_target_language: config.document.stamp_target_language,
        }
    }
}

/// Translates XLIFF documents with one translation service
#[derive(Debug)]
pub struct DocumentTranslator {
    service: TranslationService,
    options: DocumentOptions,
    writer: DocumentWriter,
}

impl DocumentTranslator {
    pub fn new(service: TranslationService, options: DocumentOptions) -> Self {
        Self {
            service,
            options,
            writer: DocumentWriter::default(),
        }
    }

    /// Build the provider, glossary and options from the application config
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut service = TranslationService::new(config.translation.clone())
            .context("Failed to create translation service")?;

        if let Some(path) = config.document.glossary_path.as_deref().filter(|p| !p.is_empty()) {
            let glossary = Glossary::from_file(path)
                .with_context(|| format!("Failed to load glossary: {}", path))?;
            info!("Loaded {} glossary rule(s) from {}", glossary.len(), path);
            service = service.with_glossary(glossary);
        }

        Ok(Self::new(service, DocumentOptions::from_config(config)))
    }

    pub fn with_writer(mut self, writer: DocumentWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Parse, translate and serialize a document
    pub async fn translate_bytes<P>(
        &self,
        input: &[u8],
        target_language: &str,
        progress: P,
    ) -> Result<(Vec<u8>, DocumentReport)>
    where
        P: Fn(usize, usize),
    {
        let mut doc = parse_document(input).context("Failed to parse XLIFF document")?;
        let report = self.translate_document(&mut doc, target_language, progress).await?;
        let output = self.writer.to_bytes(&doc).context("Failed to serialize XLIFF document")?;
        Ok((output, report))
    }

    /// Translate a parsed document in place
    ///
    /// `progress` is called with (segments done, segments total) after each
    /// segment.
    pub async fn translate_document<P>(
        &self,
        doc: &mut Document,
        target_language: &str,
        progress: P,
    ) -> Result<DocumentReport>
    where
        P: Fn(usize, usize),
    {
        let start_time = Instant::now();
        let before = self.service.stats();
        let source_language = self.resolve_source_language(doc);
        let mut report = DocumentReport::new(doc.version(), &source_language, target_language);

        let segments = walker::enumerate_segments(doc);
        let total = segments.len();
        report.segments_total = total;
        debug!(
            "XLIFF {} document with {} segment(s), {} -> {}",
            doc.version(),
            total,
            source_language,
            target_language
        );

        for (done, mut segment) in segments.into_iter().enumerate() {
            self.translate_segment(doc, &mut segment, &source_language, target_language, &mut report)
                .await;
            progress(done + 1, total);
        }

        // Collected only now: inserted targets shift sibling indices
        if self.options.translate_notes {
            for site in walker::note_sites(doc) {
                self.translate_site(doc, site, &source_language, target_language, &mut report)
                    .await;
            }
        }
        if self.options.translate_attributes {
            let sites = walker::attribute_sites(doc, &self.options.attributes, self.options.overwrite_source);
            for site in sites {
                self.translate_site(doc, site, &source_language, target_language, &mut report)
                    .await;
            }
        }

        report.calls = self.service.stats().since(&before);
        if report.provider_unavailable() {
            error!(
                "All {} call(s) to {} failed",
                report.calls.attempted,
                self.service.provider_name()
            );
            return Err(TranslationError::ProviderUnavailable {
                attempted: report.calls.attempted,
                failed: report.calls.failed,
            }
            .into());
        }

        if self.options.stamp_target_language {
            walker::stamp_target_language(doc, target_language);
        }

        report.duration = start_time.elapsed();
        Ok(report)
    }

    fn resolve_source_language(&self, doc: &Document) -> String {
        if !self.options.source_language.eq_ignore_ascii_case("auto") {
            return self.options.source_language.clone();
        }
        match walker::declared_source_language(doc) {
            Some(declared) if language_utils::validate_language_code(&declared).is_ok() => declared,
            _ => "auto".to_string(),
        }
    }

    async fn translate_segment(
        &self,
        doc: &mut Document,
        segment: &mut SegmentRef,
        source_language: &str,
        target_language: &str,
        report: &mut DocumentReport,
    ) {
        let label = segment_label(doc, segment);

        if let Err(e) = walker::ensure_target(doc, segment) {
            warn!("Segment {}: cannot create target: {}", label, e);
            report.issue(format!("Segment {}: cannot create target: {}", label, e));
            report.segments_failed += 1;
            return;
        }

        let Some(source) = doc.element_at(&segment.source_path()) else {
            report.segments_failed += 1;
            return;
        };
        let original = source.clone();
        let fragment = inline::linearize(source);
        debug!("Segment {}: {}", label, fragment.flat);

        let result = match self
            .service
            .translate_protected(&fragment.flat, source_language, target_language)
            .await
        {
            TextOutcome::Translated(text) => {
                inline::delinearize(&text, &fragment.children).map_err(TranslationError::from)
            }
            TextOutcome::Unchanged => {
                report.segments_unchanged += 1;
                self.fill_empty_target(doc, segment, &original);
                return;
            }
            TextOutcome::Failed(e) => Err(e),
        };

        match result {
            Ok(content) => {
                if self.options.overwrite_source {
                    self.write_content(doc, &segment.source_path(), content.clone());
                }
                if let Some(target_path) = segment.target_path() {
                    self.write_content(doc, &target_path, content);
                }
                report.segments_translated += 1;
            }
            Err(e) => {
                warn!("Segment {} kept its source text: {}", label, e);
                report.issue(format!("Segment {} kept its source text: {}", label, e));
                report.segments_failed += 1;
                self.fill_empty_target(doc, segment, &original);
            }
        }
    }

    async fn translate_site(
        &self,
        doc: &mut Document,
        site: TextSite,
        source_language: &str,
        target_language: &str,
        report: &mut DocumentReport,
    ) {
        match site {
            TextSite::Note { path } => {
                let Some(note) = doc.element_at(&path) else {
                    return;
                };
                let fragment = inline::linearize(note);
                let result = match self
                    .service
                    .translate_protected(&fragment.flat, source_language, target_language)
                    .await
                {
                    TextOutcome::Translated(text) => {
                        inline::delinearize(&text, &fragment.children).map_err(TranslationError::from)
                    }
                    TextOutcome::Unchanged => return,
                    TextOutcome::Failed(e) => Err(e),
                };
                match result {
                    Ok(content) => {
                        self.write_content(doc, &path, content);
                        report.notes_translated += 1;
                    }
                    Err(e) => {
                        warn!("Note at {:?} left untranslated: {}", path, e);
                        report.issue(format!("Note at {:?} left untranslated: {}", path, e));
                        report.auxiliary_failed += 1;
                    }
                }
            }
            TextSite::Attribute { path, name } => {
                let Some(value) = doc.element_at(&path).and_then(|e| e.attribute(&name)) else {
                    return;
                };
                let flat = partial_escape(value).into_owned();
                let result = match self
                    .service
                    .translate_protected(&flat, source_language, target_language)
                    .await
                {
                    TextOutcome::Translated(text) => {
                        inline::decode_run(&text).map_err(TranslationError::from)
                    }
                    TextOutcome::Unchanged => return,
                    TextOutcome::Failed(e) => Err(e),
                };
                match result {
                    Ok(translated) => {
                        if let Some(element) = doc.element_at_mut(&path) {
                            element.set_attribute(&name, &translated);
                            report.attributes_translated += 1;
                        }
                    }
                    Err(e) => {
                        warn!("Attribute {} at {:?} left untranslated: {}", name, path, e);
                        report.issue(format!("Attribute {} at {:?} left untranslated: {}", name, path, e));
                        report.auxiliary_failed += 1;
                    }
                }
            }
            TextSite::Segment(_) => {}
        }
    }

    /// Replace an element's content and repair its spacing
    fn write_content(&self, doc: &mut Document, path: &[usize], content: RebuiltContent) {
        let normalize = self.options.normalize_spacing && !preserves_space_on_path(doc, path);
        if let Some(element) = doc.element_at_mut(path) {
            content.apply_to(element);
            if normalize {
                FormatNormalizer::normalize_element(element);
            }
        }
    }

    /// Give a new or empty target a copy of the source content
    fn fill_empty_target(&self, doc: &mut Document, segment: &SegmentRef, source: &Element) {
        let Some(target) = segment.target_path().and_then(|path| doc.element_at_mut(&path)) else {
            return;
        };
        if target.text.trim().is_empty() && target.children.is_empty() {
            target.text = source.text.clone();
            target.children = source.children.clone();
        }
    }
}

/// Whether the element at `path` or any ancestor sets `xml:space="preserve"`
fn preserves_space_on_path(doc: &Document, path: &[usize]) -> bool {
    (0..=path.len()).any(|depth| {
        doc.element_at(&path[..depth])
            .map(Element::preserves_space)
            .unwrap_or(false)
    })
}

/// Unit id for log lines, or the container path
fn segment_label(doc: &Document, segment: &SegmentRef) -> String {
    let Some(container) = doc.element_at(&segment.container) else {
        return format!("{:?}", segment.container);
    };
    match container.attribute("id") {
        Some(id) => format!("'{}'", id),
        None => format!("{:?}", segment.container),
    }
}
