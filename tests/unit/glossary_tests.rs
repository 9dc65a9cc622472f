/*!
 * Tests for glossary loading and the glossary step of the text pipeline
 */

use anyhow::Result;
use xlifftr::app_config::TranslationConfig;
use xlifftr::providers::mock::MockProvider;
use xlifftr::translation::glossary::{Glossary, GlossaryPolicy, GlossaryRule, MatchMode};
use xlifftr::translation::{TextOutcome, TranslationService};
use crate::common;

/// Test loading a glossary file from disk
#[test]
fn test_fromFile_withCsvFile_shouldLoadRules() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "glossary.csv",
        "SENAI,,keep,word\nnota fiscal,invoice,,\nkg,,keep,substr\n",
    )?;

    let glossary = Glossary::from_file(&path)?;
    let rules: Vec<&GlossaryRule> = glossary.rules().collect();
    assert_eq!(glossary.len(), 3);
    assert_eq!(rules[1].policy, GlossaryPolicy::Map);
    assert_eq!(rules[1].replacement.as_deref(), Some("invoice"));
    assert_eq!(rules[2].match_mode, MatchMode::Substring);
    Ok(())
}

/// Test that a missing glossary file is reported with its path
#[test]
fn test_fromFile_withMissingFile_shouldFailWithPath() {
    let error = Glossary::from_file("/nonexistent/glossary.csv").unwrap_err();
    assert!(format!("{:#}", error).contains("/nonexistent/glossary.csv"));
}

/// Test that kept terms reach the provider as tokens and come back verbatim
#[tokio::test]
async fn test_translateProtected_withKeepRule_shouldHideTermFromProvider() {
    let provider = MockProvider::uppercase();
    let glossary = Glossary::load(vec![GlossaryRule::keep("Senai")]).unwrap();
    let service = TranslationService::with_provider(Box::new(provider.clone()), TranslationConfig::default())
        .with_glossary(glossary);

    let outcome = service.translate_protected("o Senai abre cedo", "pt", "en").await;
    assert!(matches!(outcome, TextOutcome::Translated(ref text) if text == "O Senai ABRE CEDO"));
    assert!(!provider.requests()[0].text.contains("Senai"));
}

/// Test that a text made only of mapped terms is rewritten without a provider call
#[tokio::test]
async fn test_translateProtected_withOnlyMappedTerm_shouldSkipProvider() {
    let provider = MockProvider::uppercase();
    let glossary = Glossary::load(vec![GlossaryRule::map("nota fiscal", "invoice")]).unwrap();
    let service = TranslationService::with_provider(Box::new(provider.clone()), TranslationConfig::default())
        .with_glossary(glossary);

    let outcome = service.translate_protected("Nota Fiscal", "pt", "en").await;
    assert!(matches!(outcome, TextOutcome::Translated(ref text) if text == "invoice"));
    assert_eq!(provider.request_count(), 0);
}

/// Test that terms with `&` match both plain and escaped text
#[test]
fn test_protect_withAmpersandTerm_shouldMatchPlainAndEscaped() {
    let glossary = Glossary::load(vec![GlossaryRule::keep("AT&T")]).unwrap();
    assert_eq!(glossary.protect("Call AT&T now").restore_map, vec!["AT&T"]);
    assert_eq!(glossary.protect("Call AT&amp;T now").restore_map, vec!["AT&amp;T"]);
    assert!(glossary.protect("Call AT and T now").restore_map.is_empty());
}

/// Test that a kept term with `&` survives even though the shield hid its entity
#[tokio::test]
async fn test_translateProtected_withKeepRuleContainingAmpersand_shouldKeepTerm() {
    let provider = MockProvider::uppercase();
    let glossary = Glossary::load(vec![GlossaryRule::keep("AcMe&Co")]).unwrap();
    let service = TranslationService::with_provider(Box::new(provider.clone()), TranslationConfig::default())
        .with_glossary(glossary);

    let outcome = service.translate_protected("Produtos AcMe&amp;Co hoje, 5 &lt; 6", "pt", "en").await;
    assert!(matches!(
        outcome,
        TextOutcome::Translated(ref text) if text == "PRODUTOS AcMe&amp;Co HOJE, 5 &lt; 6"
    ));
    assert!(!provider.requests()[0].text.to_lowercase().contains("acme"));
}

/// Test that an escaped `<` in the text matches a term containing `<`
#[tokio::test]
async fn test_translateProtected_withMapRuleContainingLessThan_shouldReplaceTerm() {
    let glossary = Glossary::load(vec![GlossaryRule::map("a<b", "a menor que b")]).unwrap();
    let service = TranslationService::with_provider(Box::new(MockProvider::echo()), TranslationConfig::default())
        .with_glossary(glossary);

    let outcome = service.translate_protected("Se a&lt;b, pare", "pt", "en").await;
    assert!(matches!(outcome, TextOutcome::Translated(ref text) if text == "Se a menor que b, pare"));
}
