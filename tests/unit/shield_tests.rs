/*!
 * Tests for placeholder protection and token validation
 */

use xlifftr::translation::glossary::{Glossary, GlossaryRule};
use xlifftr::translation::shield::PlaceholderShield;
use xlifftr::translation::tokens::TokenKind;
use xlifftr::validation::TokenValidator;

/// Test that a protected text survives a translator that rewrites every letter
#[test]
fn test_protect_withMixedPlaceholders_shouldRestoreAfterUppercasing() {
    let source = "Olá {{nome}}, seu prazo é %d dias.";
    let shielded = PlaceholderShield::protect(source);
    assert_eq!(shielded.token_count(), 2);

    let translated = shielded.text.to_uppercase();
    assert_eq!(
        PlaceholderShield::restore(&translated, &shielded.tokens),
        "OLÁ {{nome}}, SEU PRAZO É %d DIAS."
    );
}

/// Test ICU style arguments with one nesting level
#[test]
fn test_protect_withIcuPlural_shouldKeepWholeArgument() {
    let shielded = PlaceholderShield::protect("You have {count, plural, one {# file} other {# files}} left");
    assert_eq!(shielded.tokens, vec!["{count, plural, one {# file} other {# files}}"]);
}

/// Test that the shield and the glossary stack without touching each other
#[test]
fn test_shieldThenGlossary_shouldProduceDistinctTokenFamilies() {
    let glossary = Glossary::load(vec![GlossaryRule::keep("SENAI")]).unwrap();

    let shielded = PlaceholderShield::protect("O SENAI abre às 08:00 em {cidade}");
    let protected = glossary.protect(&shielded.text);

    assert_eq!(shielded.tokens, vec!["08:00", "{cidade}"]);
    assert_eq!(protected.restore_map, vec!["SENAI"]);
    assert!(protected.text.contains(&TokenKind::Glossary.render(0)));
    assert!(protected.text.contains(&TokenKind::Placeholder.render(1)));

    let translated = protected.text.replace("O ", "The ").replace(" abre às ", " opens at ").replace(" em ", " in ");
    let restored = PlaceholderShield::restore(
        &Glossary::restore(&translated, &protected.restore_map),
        &shielded.tokens,
    );
    assert_eq!(restored, "The SENAI opens at 08:00 in {cidade}");
}

/// Test that dropped and duplicated tokens are detected
#[test]
fn test_validate_withDroppedOrDuplicatedTokens_shouldFail() {
    let shielded = PlaceholderShield::protect("Hello {name}, you scored %d%%");
    let expected = shielded.token_count();

    let intact = TokenValidator::validate(&shielded.text, TokenKind::Placeholder, expected);
    assert!(intact.passed_in_order());

    let dropped = shielded.text.replace(&TokenKind::Placeholder.render(1), "");
    let result = TokenValidator::validate(&dropped, TokenKind::Placeholder, expected);
    assert!(!result.passed());
    assert_eq!(result.missing_indices, vec![1]);

    let duplicated = format!("{}{}", shielded.text, TokenKind::Placeholder.render(0));
    assert!(!TokenValidator::validate(&duplicated, TokenKind::Placeholder, expected).passed());
}

/// Test that reordering placeholders is accepted when order is not required
#[test]
fn test_validate_withReorderedTokens_shouldPassUnordered() {
    let text = format!("{} y {}", TokenKind::Placeholder.render(1), TokenKind::Placeholder.render(0));
    let result = TokenValidator::validate(&text, TokenKind::Placeholder, 2);
    assert!(result.passed());
    assert!(!result.passed_in_order());
}
