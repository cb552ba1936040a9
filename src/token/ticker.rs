// Ticker symbol derivation — one rule per ticker mode.
//
// Symbols are at most 13 characters, uppercase letters and digits only.
// Lengths are counted in characters, never bytes.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

/// Longest symbol the deploy service accepts.
pub const MAX_SYMBOL_LEN: usize = 13;

/// Letters taken from the text in Custom mode.
const CUSTOM_LETTERS: usize = 4;

/// User-selected strategy for turning text into a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickerMode {
    #[default]
    SelectedText,
    Abbreviation,
    FirstWord,
    Custom,
}

impl TickerMode {
    pub const ALL: [TickerMode; 4] = [
        TickerMode::SelectedText,
        TickerMode::Abbreviation,
        TickerMode::FirstWord,
        TickerMode::Custom,
    ];

    /// Display name, also the accepted input spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            TickerMode::SelectedText => "Selected Text",
            TickerMode::Abbreviation => "Abbreviation",
            TickerMode::FirstWord => "First Word",
            TickerMode::Custom => "Custom",
        }
    }
}

impl fmt::Display for TickerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TickerMode {
    type Err = anyhow::Error;

    /// Mode names are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TickerMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown ticker mode {s:?} (expected one of: Selected Text, Abbreviation, First Word, Custom)"
                )
            })
    }
}

/// Derive a symbol from (already trimmed, non-empty) text.
pub fn derive_symbol(text: &str, mode: TickerMode) -> String {
    let text = text.trim();
    let symbol = match mode {
        TickerMode::SelectedText => symbolize(text),
        TickerMode::Abbreviation => {
            if is_multi_word(text) {
                initials(text)
            } else {
                symbolize(text)
            }
        }
        TickerMode::FirstWord => symbolize(text.split_whitespace().next().unwrap_or_default()),
        TickerMode::Custom => return custom_symbol(text, random_suffix()),
    };

    if symbol.is_empty() {
        random_suffix().to_string()
    } else {
        symbol
    }
}

/// Symbol that follows a token name as it is typed: short names verbatim,
/// long multi-word names as initials, long single words truncated.
pub fn auto_ticker(name: &str) -> String {
    let name = name.trim();
    let symbol = if name.chars().count() <= MAX_SYMBOL_LEN || !is_multi_word(name) {
        symbolize(name)
    } else {
        initials(name)
    };

    if symbol.is_empty() {
        random_suffix().to_string()
    } else {
        symbol
    }
}

/// Custom mode: up to four letters plus a 3-digit number. Letterless text
/// gives just the number.
pub fn custom_symbol(text: &str, suffix: u16) -> String {
    let letters: String = text
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .take(CUSTOM_LETTERS)
        .collect();
    format!("{letters}{suffix}")
}

fn random_suffix() -> u16 {
    rand::rng().random_range(100..=999)
}

fn is_multi_word(text: &str) -> bool {
    text.split_whitespace().nth(1).is_some()
}

fn is_symbol_char(c: &char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}

/// Uppercase, keep ASCII letters and digits, cap the length.
fn symbolize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_uppercase)
        .filter(is_symbol_char)
        .take(MAX_SYMBOL_LEN)
        .collect()
}

/// First letter or digit of each word, uppercased, capped.
fn initials(text: &str) -> String {
    text.split_whitespace()
        .filter_map(|word| word.chars().find(char::is_ascii_alphanumeric))
        .flat_map(char::to_uppercase)
        .filter(is_symbol_char)
        .take(MAX_SYMBOL_LEN)
        .collect()
}
