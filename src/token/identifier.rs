// Token identifiers — display name plus ticker symbol, derived from text.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ticker::{derive_symbol, TickerMode};

/// Name and symbol handed to the deploy service. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIdentifier {
    pub name: String,
    pub symbol: String,
}

/// Optional decoration around every derived name.
#[derive(Debug, Clone, Default)]
pub struct NameAffixes {
    pub prefix: String,
    pub suffix: String,
}

impl NameAffixes {
    pub fn new(prefix: &str, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// `prefix + text + suffix`, trimmed.
    pub fn apply(&self, text: &str) -> String {
        format!("{}{}{}", self.prefix, text, self.suffix)
            .trim()
            .to_string()
    }
}

/// Derive a token identifier from selected text.
///
/// The symbol comes from the text alone; the affixes only decorate the name.
/// Callers validate that the text is non-empty; an empty resulting name is
/// still reported as an error rather than deployed.
pub fn derive_token_identifier(
    selected_text: &str,
    mode: TickerMode,
    affixes: &NameAffixes,
) -> Result<TokenIdentifier> {
    let text = selected_text.trim();
    let name = affixes.apply(text);
    if name.is_empty() {
        anyhow::bail!("could not generate token name");
    }

    Ok(TokenIdentifier {
        name,
        symbol: derive_symbol(text, mode),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affixes_wrap_name_not_symbol() {
        let affixes = NameAffixes::new("The ", " Coin");
        let id = derive_token_identifier("frog", TickerMode::SelectedText, &affixes).unwrap();
        assert_eq!(id.name, "The frog Coin");
        assert_eq!(id.symbol, "FROG");
    }

    #[test]
    fn test_empty_name_is_an_error() {
        let err = derive_token_identifier("   ", TickerMode::SelectedText, &NameAffixes::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "could not generate token name");
    }
}
