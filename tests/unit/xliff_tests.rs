/*!
 * Tests for the XLIFF reader, writer and segment walker
 */

use anyhow::Result;
use xlifftr::xliff::walker::{self, TextSite};
use xlifftr::xliff::{DocumentWriter, XliffVersion, parse_document};
use crate::common;

/// Test that an untouched document is written back byte for byte
#[test]
fn test_writer_withUntouchedDocuments_shouldRoundTrip() -> Result<()> {
    for sample in [common::SAMPLE_XLIFF_12, common::SAMPLE_XLIFF_20] {
        let doc = parse_document(sample.as_bytes())?;
        assert_eq!(DocumentWriter::default().to_string(&doc)?, sample);
    }
    Ok(())
}

/// Test segment enumeration in a 2.0 document with several segments per unit
#[test]
fn test_enumerateSegments_withXliff20_shouldVisitEverySegment() -> Result<()> {
    let doc = parse_document(common::SAMPLE_XLIFF_20.as_bytes())?;
    assert_eq!(doc.version(), XliffVersion::V2_0);

    let segments = walker::enumerate_segments(&doc);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].container, vec![0, 0, 0]);
    assert_eq!(segments[0].target, None);
    assert_eq!(segments[1].container, vec![0, 0, 1]);
    assert_eq!(segments[1].target, Some(1));
    Ok(())
}

/// Test that units marked translate="no" are left out, in both versions
#[test]
fn test_enumerateSegments_withTranslateNo_shouldSkipUnit() -> Result<()> {
    let doc = parse_document(
        br#"<xliff xmlns="urn:oasis:names:tc:xliff:document:2.0" version="2.0" srcLang="en"><file id="f"><unit id="a" translate="no"><segment><source>Brand</source></segment></unit><unit id="b"><segment><source>Text</source></segment></unit></file></xliff>"#,
    )?;
    let segments = walker::enumerate_segments(&doc);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].container, vec![0, 1, 0]);

    let doc = parse_document(common::xliff_12_with_units(
        r#"<trans-unit id="a" translate="no"><source>Brand</source></trans-unit><trans-unit id="b"><source>Text</source></trans-unit>"#,
    ).as_bytes())?;
    assert_eq!(walker::enumerate_segments(&doc).len(), 1);
    Ok(())
}

/// Test that a created target keeps the source's prefix and namespace
#[test]
fn test_ensureTarget_withPrefixedNamespace_shouldCreateSingleTargetAfterSource() -> Result<()> {
    let mut doc = parse_document(
        br#"<x:xliff xmlns:x="urn:oasis:names:tc:xliff:document:1.2" version="1.2"><x:file><x:body><x:trans-unit id="1"><x:source>Oi</x:source><x:note>n</x:note></x:trans-unit></x:body></x:file></x:xliff>"#,
    )?;
    let mut segments = walker::enumerate_segments(&doc);
    assert_eq!(segments.len(), 1);

    let index = walker::ensure_target(&mut doc, &mut segments[0])?;
    assert_eq!(index, 1);
    // A second call reuses the target it just created
    assert_eq!(walker::ensure_target(&mut doc, &mut segments[0])?, 1);

    let unit = doc.element_at(&segments[0].container).unwrap();
    let names: Vec<&str> = unit.child_elements().map(|(_, e)| e.name.as_str()).collect();
    assert_eq!(names, vec!["x:source", "x:target", "x:note"]);
    assert_eq!(
        unit.child_element(1).unwrap().namespace.as_deref(),
        Some("urn:oasis:names:tc:xliff:document:1.2")
    );
    Ok(())
}

/// Test notes and attribute sites, sources excluded unless requested
#[test]
fn test_sites_shouldFindNotesAndAttributes() -> Result<()> {
    let doc = parse_document(
        br#"<xliff version="1.2"><file><body><trans-unit id="1"><source>a <g id="1" title="src">b</g></source><target>a <g id="1" title="tgt">b</g></target><note>hint</note><note translate="no">id</note></trans-unit></body></file></xliff>"#,
    )?;

    let notes = walker::note_sites(&doc);
    assert_eq!(notes, vec![TextSite::Note { path: vec![0, 0, 0, 2] }]);

    let names = vec!["title".to_string()];
    let targets_only = walker::attribute_sites(&doc, &names, false);
    assert_eq!(
        targets_only,
        vec![TextSite::Attribute { path: vec![0, 0, 0, 1, 0], name: "title".to_string() }]
    );
    assert_eq!(walker::attribute_sites(&doc, &names, true).len(), 2);
    Ok(())
}

/// Test stamping and reading header languages
#[test]
fn test_headerLanguages_shouldUseVersionSpecificAttributes() -> Result<()> {
    let mut doc = parse_document(common::SAMPLE_XLIFF_12.as_bytes())?;
    assert_eq!(walker::declared_source_language(&doc).as_deref(), Some("pt"));
    walker::stamp_target_language(&mut doc, "en");
    assert_eq!(doc.element_at(&[0]).unwrap().attribute("target-language"), Some("en"));

    let mut doc = parse_document(common::SAMPLE_XLIFF_20.as_bytes())?;
    assert_eq!(walker::declared_source_language(&doc).as_deref(), Some("pt"));
    walker::stamp_target_language(&mut doc, "de");
    assert_eq!(doc.root.attribute("trgLang"), Some("de"));
    Ok(())
}

/// Test that malformed input is rejected
#[test]
fn test_parseDocument_withMalformedXml_shouldFail() {
    assert!(parse_document(b"<xliff><file></xliff>").is_err());
    assert!(parse_document(b"not xml at all").is_err());
}
