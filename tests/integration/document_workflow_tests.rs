/*!
 * End-to-end tests: XLIFF bytes in, translated XLIFF bytes out
 */

use anyhow::Result;
use xlifftr::errors::TranslationError;
use xlifftr::providers::mock::MockProvider;
use xlifftr::translation::glossary::{Glossary, GlossaryRule};
use xlifftr::translation::{DocumentOptions, DocumentTranslator, TranslationService};
use xlifftr::app_config::TranslationConfig;
use xlifftr::xliff::parse_document;
use crate::common;

/// Test that placeholders survive a full document round trip
#[tokio::test]
async fn test_translateBytes_withPlaceholders_shouldKeepThemVerbatim() -> Result<()> {
    common::init_logging();
    let input = common::xliff_12_with_units(
        "<trans-unit><source>Olá {{nome}}, seu prazo é %d dias.</source></trans-unit>",
    );
    let translator = common::mock_translator(MockProvider::uppercase(), DocumentOptions::default());

    let (output, report) = translator.translate_bytes(input.as_bytes(), "en", |_, _| {}).await?;
    assert_eq!(report.segments_translated, 1);

    let doc = parse_document(&output)?;
    let target = common::target_of(&doc, &[0, 0, 0]).expect("target created");
    assert_eq!(target.text, "OLÁ {{nome}}, SEU PRAZO É %d DIAS.");
    Ok(())
}

/// Test that inline tags keep their place and content
#[tokio::test]
async fn test_translateBytes_withInlineTag_shouldKeepChild() -> Result<()> {
    let input = common::xliff_12_with_units(
        r#"<trans-unit id="1"><source>Click <g id="1">here</g> to continue.</source></trans-unit>"#,
    );
    let translator = common::mock_translator(MockProvider::uppercase(), DocumentOptions::default());

    let (output, _) = translator.translate_bytes(input.as_bytes(), "fr", |_, _| {}).await?;
    let text = String::from_utf8(output)?;
    assert!(text.contains(r#"<target>CLICK <g id="1">here</g> TO CONTINUE.</target>"#));
    assert!(text.contains(r#"target-language="fr""#));
    // Source untouched
    assert!(text.contains(r#"<source>Click <g id="1">here</g> to continue.</source>"#));
    Ok(())
}

/// Test a 2.0 document: new targets are created, existing ones replaced
#[tokio::test]
async fn test_translateBytes_withXliff20_shouldFillEverySegment() -> Result<()> {
    let translator = common::mock_translator(MockProvider::uppercase(), DocumentOptions::default());

    let (output, report) = translator
        .translate_bytes(common::SAMPLE_XLIFF_20.as_bytes(), "en", |_, _| {})
        .await?;
    let text = String::from_utf8(output)?;

    assert_eq!(report.segments_total, 2);
    assert_eq!(report.segments_translated, 2);
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(text.contains(r#"srcLang="pt" trgLang="en""#));
    assert!(text.contains(
        "      <segment>\n        <source>Bom dia.</source>\n        <target>BOM DIA.</target>\n      </segment>"
    ));
    assert!(text.contains(r#"<target>ATÉ LOGO, <pc id="1">amigo</pc>!</target>"#));
    assert!(!text.contains("Antigo"));
    Ok(())
}

/// Test that a provider that mangles tokens leaves the source text in place
#[tokio::test]
async fn test_translateBytes_withTokenDroppingProvider_shouldFallBackToSource() -> Result<()> {
    let translator = common::mock_translator(MockProvider::dropping_tokens(), DocumentOptions::default());

    let (output, report) = translator
        .translate_bytes(common::SAMPLE_XLIFF_12.as_bytes(), "en", |_, _| {})
        .await?;

    assert_eq!(report.segments_failed, 2);
    assert_eq!(report.issues.len(), 2);
    let doc = parse_document(&output)?;
    let greeting = common::target_of(&doc, &[0, 0, 0]).expect("target created");
    assert_eq!(greeting.text, "Olá {{nome}}, seu prazo é %d dias.");
    let link = common::target_of(&doc, &[0, 0, 1]).expect("target created");
    assert_eq!(link.child_element(0).map(|g| g.text.as_str()), Some("aqui"));
    Ok(())
}

/// Test that a document where every call fails is an error
#[tokio::test]
async fn test_translateBytes_withUnavailableProvider_shouldFail() {
    let translator = common::mock_translator(MockProvider::failing(), DocumentOptions::default());

    let error = translator
        .translate_bytes(common::SAMPLE_XLIFF_12.as_bytes(), "en", |_, _| {})
        .await
        .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<TranslationError>(),
        Some(TranslationError::ProviderUnavailable { .. })
    ));
}

/// Test that identical segments in one document reach the provider once
#[tokio::test]
async fn test_translateDocument_withRepeatedSegments_shouldUseCache() -> Result<()> {
    let provider = MockProvider::uppercase();
    let translator = common::mock_translator(provider.clone(), DocumentOptions {
        translate_notes: false,
        ..DocumentOptions::default()
    });
    let input = common::xliff_12_with_units(
        "<trans-unit id=\"1\"><source>Salvar</source></trans-unit><trans-unit id=\"2\"><source>Salvar</source></trans-unit>",
    );

    let (_, report) = translator.translate_bytes(input.as_bytes(), "en", |_, _| {}).await?;
    assert_eq!(report.segments_translated, 2);
    assert_eq!(report.calls.attempted, 1);
    assert_eq!(report.calls.cache_hits, 1);
    assert_eq!(provider.request_count(), 1);
    Ok(())
}

/// Test glossary terms through the whole document pipeline
#[tokio::test]
async fn test_translateBytes_withGlossary_shouldKeepTerms() -> Result<()> {
    let glossary = Glossary::load(vec![GlossaryRule::keep("Senai"), GlossaryRule::map("fatura", "invoice")])?;
    let service = TranslationService::with_provider(Box::new(MockProvider::uppercase()), TranslationConfig::default())
        .with_glossary(glossary);
    let translator = DocumentTranslator::new(service, DocumentOptions::default());
    let input = common::xliff_12_with_units(
        "<trans-unit id=\"1\"><source>O Senai enviou a fatura</source></trans-unit>",
    );

    let (output, _) = translator.translate_bytes(input.as_bytes(), "en", |_, _| {}).await?;
    let doc = parse_document(&output)?;
    assert_eq!(
        common::target_of(&doc, &[0, 0, 0]).map(|t| t.text.as_str()),
        Some("O Senai ENVIOU A invoice")
    );
    Ok(())
}

/// Test that the source language declared in the file reaches the provider
#[tokio::test]
async fn test_translateBytes_withAutoSource_shouldUseDeclaredLanguage() -> Result<()> {
    let provider = MockProvider::echo();
    let translator = common::mock_translator(provider.clone(), DocumentOptions::default());

    translator
        .translate_bytes(common::SAMPLE_XLIFF_20.as_bytes(), "de", |_, _| {})
        .await?;
    assert!(provider.requests().iter().all(|r| r.source_language == "pt" && r.target_language == "de"));
    Ok(())
}

/// Test that a mapped term with `&` next to a source entity is written as text, not as `&amp;`
#[tokio::test]
async fn test_translateBytes_withAmpersandReplacement_shouldNotDoubleEscape() -> Result<()> {
    let glossary = Glossary::load(vec![GlossaryRule::map("pesquisa e desenvolvimento", "R&D")])?;
    let service = TranslationService::with_provider(Box::new(MockProvider::echo()), TranslationConfig::default())
        .with_glossary(glossary);
    let translator = DocumentTranslator::new(service, DocumentOptions::default());
    let input = common::xliff_12_with_units(
        "<trans-unit id=\"1\"><source>Tom &amp; Jerry: pesquisa e desenvolvimento</source></trans-unit>",
    );

    let (output, _) = translator.translate_bytes(input.as_bytes(), "en", |_, _| {}).await?;
    let doc = parse_document(&output)?;
    assert_eq!(
        common::target_of(&doc, &[0, 0, 0]).map(|t| t.text.as_str()),
        Some("Tom & Jerry: R&D")
    );
    assert!(String::from_utf8(output)?.contains("<target>Tom &amp; Jerry: R&amp;D</target>"));
    Ok(())
}

/// Test that a bare `&` from the provider keeps the entities restored from the source
#[tokio::test]
async fn test_translateBytes_withBareAmpersandFromProvider_shouldKeepSourceEntities() -> Result<()> {
    let provider = MockProvider::echo().with_custom_response(|request| request.text.replace(" e ", " & "));
    let translator = common::mock_translator(provider, DocumentOptions::default());
    let input = common::xliff_12_with_units(
        "<trans-unit id=\"1\"><source>A&amp;B: sal e pimenta</source></trans-unit>",
    );

    let (output, report) = translator.translate_bytes(input.as_bytes(), "en", |_, _| {}).await?;
    assert_eq!(report.segments_translated, 1);
    let doc = parse_document(&output)?;
    assert_eq!(
        common::target_of(&doc, &[0, 0, 0]).map(|t| t.text.as_str()),
        Some("A&B: sal & pimenta")
    );
    Ok(())
}
