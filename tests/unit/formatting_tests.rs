/*!
 * Tests for spacing repair after translation
 */

use xlifftr::providers::mock::{MockProvider, MockRequest};
use xlifftr::translation::DocumentOptions;
use xlifftr::xliff::parser::parse_str;
use crate::common;

/// Uppercases and glues inline markers to the surrounding words
fn glue_markers(request: &MockRequest) -> String {
    request
        .text
        .to_uppercase()
        .replace(" \u{E004}", "\u{E004}")
        .replace("\u{E005} ", "\u{E005}")
}

const UNIT: &str = r#"<trans-unit id="1"><source>Click <g id="1">here</g> to continue.</source></trans-unit>"#;

/// Test that lost spaces around inline elements are put back
#[tokio::test]
async fn test_translateDocument_withGluedMarkers_shouldRestoreSpacing() {
    common::init_logging();
    let mut doc = parse_str(&common::xliff_12_with_units(UNIT)).unwrap();
    let translator = common::mock_translator(
        MockProvider::echo().with_custom_response(glue_markers),
        DocumentOptions::default(),
    );

    translator.translate_document(&mut doc, "en", |_, _| {}).await.unwrap();

    let target = common::target_of(&doc, &[0, 0, 0]).unwrap();
    assert_eq!(target.text, "CLICK ");
    assert_eq!(target.children[0].tail(), " TO CONTINUE.");
}

/// Test that the repair can be switched off
#[tokio::test]
async fn test_translateDocument_withNormalizationDisabled_shouldKeepProviderSpacing() {
    let mut doc = parse_str(&common::xliff_12_with_units(UNIT)).unwrap();
    let options = DocumentOptions {
        normalize_spacing: false,
        ..DocumentOptions::default()
    };
    let translator = common::mock_translator(MockProvider::echo().with_custom_response(glue_markers), options);

    translator.translate_document(&mut doc, "en", |_, _| {}).await.unwrap();

    let target = common::target_of(&doc, &[0, 0, 0]).unwrap();
    assert_eq!(target.text, "CLICK");
    assert_eq!(target.children[0].tail(), "TO CONTINUE.");
}

/// Test that xml:space="preserve" on an ancestor disables the repair
#[tokio::test]
async fn test_translateDocument_withPreservedAncestor_shouldKeepProviderSpacing() {
    let unit = r#"<trans-unit id="1" xml:space="preserve"><source>Click <g id="1">here</g> to continue.</source></trans-unit>"#;
    let mut doc = parse_str(&common::xliff_12_with_units(unit)).unwrap();
    let translator = common::mock_translator(
        MockProvider::echo().with_custom_response(glue_markers),
        DocumentOptions::default(),
    );

    translator.translate_document(&mut doc, "en", |_, _| {}).await.unwrap();

    let target = common::target_of(&doc, &[0, 0, 0]).unwrap();
    assert_eq!(target.text, "CLICK");
}
