/*!
 * Integration tests for file and folder runs through the controller
 */

use anyhow::Result;
use std::fs;
use xlifftr::app_config::Config;
use xlifftr::app_controller::{Controller, ISSUES_LOG_FILE};
use xlifftr::providers::mock::MockProvider;
use xlifftr::translation::DocumentOptions;
use crate::common;

fn controller(provider: MockProvider, target_languages: &[&str]) -> Controller {
    let config = common::test_config(target_languages);
    let translator = common::mock_translator(provider, DocumentOptions::from_config(&config));
    Controller::with_translator(config, translator)
}

/// Test the controller initialization with default config
#[test]
fn test_controller_withDefaultConfig_shouldInitialize() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;
    assert_eq!(controller.config().target_languages, vec!["en"]);
    Ok(())
}

/// Test that a missing glossary file stops the controller from starting
#[test]
fn test_controller_withMissingGlossary_shouldFail() {
    let mut config = Config::default();
    config.document.glossary_path = Some("/nonexistent/terms.csv".to_string());
    assert!(Controller::with_config(config).is_err());
}

/// Test one output per target language, named after the input
#[tokio::test]
async fn test_run_withTwoLanguages_shouldWriteOneFileEach() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "app.xlf", common::SAMPLE_XLIFF_12)?;
    let controller = controller(MockProvider::uppercase(), &["en", "es"]);

    let summary = controller.run(input, None, false).await?;

    assert_eq!(summary.written.len(), 2);
    assert_eq!(summary.reports.len(), 2);
    let english = fs::read_to_string(temp_dir.path().join("app.en.xlf"))?;
    let spanish = fs::read_to_string(temp_dir.path().join("app.es.xlf"))?;
    assert!(english.contains(r#"target-language="en""#));
    assert!(spanish.contains(r#"target-language="es""#));
    assert!(english.contains("<target>OLÁ {{nome}}, SEU PRAZO É %d DIAS.</target>"));
    assert!(!temp_dir.path().join(ISSUES_LOG_FILE).exists());
    Ok(())
}

/// Test that existing outputs are kept unless forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "app.xlf", common::SAMPLE_XLIFF_12)?;
    let existing = common::create_test_file(temp_dir.path(), "app.en.xlf", "previous")?;
    let controller = controller(MockProvider::uppercase(), &["en"]);

    let summary = controller.run(input.clone(), None, false).await?;
    assert_eq!(summary.skipped, 1);
    assert!(summary.written.is_empty());
    assert_eq!(fs::read_to_string(&existing)?, "previous");

    let summary = controller.run(input, None, true).await?;
    assert_eq!(summary.written, vec![existing.clone()]);
    assert!(fs::read_to_string(&existing)?.starts_with("<?xml"));
    Ok(())
}

/// Test that fallbacks are written to the issues log next to the output
#[tokio::test]
async fn test_run_withFallbacks_shouldWriteIssuesLog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out_dir = temp_dir.path().join("out");
    let input = common::create_test_file(temp_dir.path(), "app.xlf", common::SAMPLE_XLIFF_12)?;
    let controller = controller(MockProvider::dropping_tokens(), &["en"]);

    let summary = controller.run(input, Some(out_dir.clone()), false).await?;

    assert_eq!(summary.written, vec![out_dir.join("app.en.xlf")]);
    let log = fs::read_to_string(out_dir.join(ISSUES_LOG_FILE))?;
    assert!(log.contains("app.xlf -> en via"));
    assert!(log.contains("'greeting'"));
    assert!(log.contains("'link'"));
    Ok(())
}

/// Test that an unavailable provider fails the run and writes nothing
#[tokio::test]
async fn test_run_withUnavailableProvider_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "app.xlf", common::SAMPLE_XLIFF_12)?;
    let controller = controller(MockProvider::failing(), &["en"]);

    assert!(controller.run(input, None, false).await.is_err());
    assert!(!temp_dir.path().join("app.en.xlf").exists());
    Ok(())
}

/// Test that folder runs mirror the nested layout and leave the input tree untouched
#[tokio::test]
async fn test_runFolder_withOutputDir_shouldMirrorLayout() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let in_dir = temp_dir.path().join("in");
    let out_dir = temp_dir.path().join("out");
    common::create_test_file(&in_dir, "app.xlf", common::SAMPLE_XLIFF_12)?;
    common::create_test_file(&in_dir, "nested/help.xliff", common::SAMPLE_XLIFF_20)?;
    common::create_test_file(&in_dir, "app.fr.xlf", common::SAMPLE_XLIFF_12)?;
    common::create_test_file(&in_dir, "readme.txt", "not a document")?;
    let controller = controller(MockProvider::uppercase(), &["fr"]);

    let summary = controller.run_folder(in_dir.clone(), Some(out_dir.clone()), false).await?;

    assert_eq!(summary.written.len(), 2);
    assert_eq!(summary.failed, 0);
    assert!(out_dir.join("app.fr.xlf").exists());
    assert!(out_dir.join("nested/help.fr.xliff").exists());
    assert!(!out_dir.join("app.fr.fr.xlf").exists());
    assert!(fs::read_to_string(out_dir.join(ISSUES_LOG_FILE))?.contains("Folder processing completed"));
    assert!(!in_dir.join(ISSUES_LOG_FILE).exists());
    Ok(())
}

/// Test that a folder without documents is an error
#[test]
fn test_runFolder_withoutDocuments_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "notes.txt", "nothing here")?;
    let controller = controller(MockProvider::echo(), &["en"]);

    let result = tokio_test::block_on(async {
        controller.run_folder(temp_dir.path().to_path_buf(), None, false).await
    });
    assert!(result.is_err());
    Ok(())
}
