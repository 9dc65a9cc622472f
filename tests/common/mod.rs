/*!
 * Common test utilities for the xlifftr test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use xlifftr::app_config::{Config, TranslationConfig};
use xlifftr::providers::mock::MockProvider;
use xlifftr::translation::{DocumentOptions, DocumentTranslator, TranslationService};
use xlifftr::xliff::dom::{Document, Element};

/// Route library logs to the test output; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Small XLIFF 1.2 document with a note and an inline tag
pub const SAMPLE_XLIFF_12: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file source-language="pt" datatype="plaintext" original="app">
    <body>
      <trans-unit id="greeting">
        <source>Olá {{nome}}, seu prazo é %d dias.</source>
        <note>Mensagem de boas-vindas</note>
      </trans-unit>
      <trans-unit id="link">
        <source>Clique <g id="1">aqui</g> para continuar.</source>
      </trans-unit>
    </body>
  </file>
</xliff>
"#;

/// Small XLIFF 2.0 document with two segments in one unit
pub const SAMPLE_XLIFF_20: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff xmlns="urn:oasis:names:tc:xliff:document:2.0" version="2.0" srcLang="pt">
  <file id="f1">
    <unit id="u1">
      <segment>
        <source>Bom dia.</source>
      </segment>
      <segment>
        <source>Até logo, <pc id="1">amigo</pc>!</source>
        <target>Antigo</target>
      </segment>
    </unit>
  </file>
</xliff>
"#;

/// Wrap trans-units in a minimal 1.2 document
pub fn xliff_12_with_units(units: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><xliff version="1.2"><file source-language="pt"><body>{}</body></file></xliff>"#,
        units
    )
}

/// Config that never reaches a network provider in tests
pub fn test_config(target_languages: &[&str]) -> Config {
    let mut config = Config::default();
    config.source_language = "pt".to_string();
    config.target_languages = target_languages.iter().map(|lang| lang.to_string()).collect();
    config
}

/// Translator backed by a mock provider
pub fn mock_translator(provider: MockProvider, options: DocumentOptions) -> DocumentTranslator {
    let service = TranslationService::with_provider(Box::new(provider), TranslationConfig::default());
    DocumentTranslator::new(service, options)
}

/// The target element of a 1.2 trans-unit or 2.0 segment
pub fn target_of<'a>(doc: &'a Document, container: &[usize]) -> Option<&'a Element> {
    let element = doc.element_at(container)?;
    let index = element.find_child("target")?;
    element.child_element(index)
}
