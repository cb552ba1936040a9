// Unit tests for token identifier derivation.
//
// Covers every ticker mode, the live-typing auto ticker, name affixes and
// the symbol shape guarantees (1–13 chars, uppercase letters and digits).

use launchdeck::token::identifier::{derive_token_identifier, NameAffixes, TokenIdentifier};
use launchdeck::token::ticker::{auto_ticker, custom_symbol, derive_symbol, TickerMode, MAX_SYMBOL_LEN};

fn no_affixes() -> NameAffixes {
    NameAffixes::default()
}

fn assert_symbol_shape(symbol: &str, input: &str, mode: TickerMode) {
    let len = symbol.chars().count();
    assert!(
        (1..=MAX_SYMBOL_LEN).contains(&len),
        "{mode} symbol for {input:?} has length {len}: {symbol:?}"
    );
    assert!(
        symbol.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
        "{mode} symbol for {input:?} has invalid characters: {symbol:?}"
    );
}

// ============================================================
// Documented examples
// ============================================================

#[test]
fn selected_text_single_word() {
    let id = derive_token_identifier("charlie", TickerMode::SelectedText, &no_affixes()).unwrap();
    assert_eq!(
        id,
        TokenIdentifier {
            name: "charlie".to_string(),
            symbol: "CHARLIE".to_string(),
        }
    );
}

#[test]
fn abbreviation_multi_word() {
    let id =
        derive_token_identifier("Justice For America", TickerMode::Abbreviation, &no_affixes())
            .unwrap();
    assert_eq!(id.symbol, "JFA");
    assert_eq!(id.name, "Justice For America");
}

#[test]
fn first_word_takes_first_token() {
    let id = derive_token_identifier(
        "hello world foo bar baz qux",
        TickerMode::FirstWord,
        &no_affixes(),
    )
    .unwrap();
    assert_eq!(id.symbol, "HELLO");
}

// ============================================================
// Mode rules
// ============================================================

#[test]
fn selected_text_truncates_to_thirteen() {
    assert_eq!(
        derive_symbol("supercalifragilistic", TickerMode::SelectedText),
        "SUPERCALIFRAG"
    );
}

#[test]
fn selected_text_drops_spaces_and_punctuation() {
    assert_eq!(derive_symbol("  to the moon!  ", TickerMode::SelectedText), "TOTHEMOON");
}

#[test]
fn abbreviation_single_word_matches_selected_text() {
    for word in ["pepe", "extraordinarily", "x"] {
        assert_eq!(
            derive_symbol(word, TickerMode::Abbreviation),
            derive_symbol(word, TickerMode::SelectedText),
        );
    }
}

#[test]
fn abbreviation_caps_initials_at_thirteen() {
    let text = "a b c d e f g h i j k l m n o p";
    assert_eq!(derive_symbol(text, TickerMode::Abbreviation), "ABCDEFGHIJKLM");
}

#[test]
fn first_word_truncates_long_word() {
    assert_eq!(
        derive_symbol("antidisestablishmentarianism rocks", TickerMode::FirstWord),
        "ANTIDISESTABL"
    );
}

#[test]
fn custom_mode_letters_plus_three_digits() {
    let symbol = derive_symbol("Doge to the moon", TickerMode::Custom);
    assert!(symbol.starts_with("DOGE"), "got {symbol}");
    let digits: u16 = symbol[4..].parse().unwrap();
    assert!((100..=999).contains(&digits));
}

#[test]
fn custom_mode_short_text_uses_all_letters() {
    assert_eq!(custom_symbol("ok!", 555), "OK555");
}

#[test]
fn custom_mode_without_letters_is_just_the_number() {
    let symbol = derive_symbol("2024 !!", TickerMode::Custom);
    assert_eq!(symbol.len(), 3);
    let n: u16 = symbol.parse().unwrap();
    assert!((100..=999).contains(&n));
}

#[test]
fn symbol_shape_holds_for_every_mode() {
    let inputs = [
        "charlie",
        "Justice For America",
        "hello world foo bar baz qux",
        "a",
        "   padded   ",
        "!!!",
        "$PEPE to 1b",
        "the quick brown fox jumps over the lazy dog and keeps running far away",
        "supercalifragilisticexpialidocious",
        "42",
    ];
    for input in inputs {
        for mode in TickerMode::ALL {
            let symbol = derive_symbol(input, mode);
            assert_symbol_shape(&symbol, input, mode);
        }
    }
}

// ============================================================
// Auto ticker (live name typing)
// ============================================================

#[test]
fn auto_ticker_short_name_verbatim() {
    assert_eq!(auto_ticker("Moon Cat"), "MOONCAT");
    assert_eq!(auto_ticker("thirteenchars"), "THIRTEENCHARS");
}

#[test]
fn auto_ticker_long_multi_word_uses_initials() {
    assert_eq!(auto_ticker("Department Of Government Efficiency"), "DOGE");
}

#[test]
fn auto_ticker_long_single_word_truncates() {
    assert_eq!(auto_ticker("fourteenchars!x"), "FOURTEENCHARS");
}

#[test]
fn auto_ticker_agrees_with_modes() {
    // Short names behave like Selected Text, long multi-word like Abbreviation.
    assert_eq!(auto_ticker("pepe"), derive_symbol("pepe", TickerMode::SelectedText));
    let long = "make america great again today";
    assert_eq!(auto_ticker(long), derive_symbol(long, TickerMode::Abbreviation));
}

// ============================================================
// Names
// ============================================================

#[test]
fn affixes_wrap_name_and_trim() {
    let affixes = NameAffixes::new("  ", " Inu ");
    let id = derive_token_identifier(" shiba ", TickerMode::SelectedText, &affixes).unwrap();
    assert_eq!(id.name, "shiba Inu");
    assert_eq!(id.symbol, "SHIBA");
}

#[test]
fn empty_name_fails_with_message() {
    let err = derive_token_identifier("", TickerMode::Abbreviation, &NameAffixes::new(" ", " "))
        .unwrap_err();
    assert_eq!(err.to_string(), "could not generate token name");
}

#[test]
fn derivation_is_deterministic_outside_custom() {
    for mode in [TickerMode::SelectedText, TickerMode::Abbreviation, TickerMode::FirstWord] {
        let a = derive_token_identifier("Pepe The Frog", mode, &no_affixes()).unwrap();
        let b = derive_token_identifier("Pepe The Frog", mode, &no_affixes()).unwrap();
        assert_eq!(a, b);
    }
}
