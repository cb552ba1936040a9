// Notification rules — per-author highlight colors.
//
// The user maps handles to colors so posts from accounts they care about
// stand out in the feed. Lookups are case-insensitive. The rules are passed
// into every normalization call rather than held globally.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Handle → highlight color mapping, plus a fallback color.
#[derive(Debug, Clone, Default)]
pub struct NotificationRules {
    colors: HashMap<String, String>,
    default_color: Option<String>,
}

impl NotificationRules {
    /// Build rules from a handle → color map. Handles are matched
    /// case-insensitively and a leading `@` is ignored.
    pub fn new(colors: HashMap<String, String>, default_color: Option<String>) -> Self {
        let colors = colors
            .into_iter()
            .map(|(handle, color)| (normalize_handle(&handle), color))
            .collect();
        Self {
            colors,
            default_color,
        }
    }

    /// Load rules from a JSON object file (`{"handle": "#hex", ...}`).
    pub fn load(path: &Path, default_color: Option<String>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read highlight rules from {}", path.display()))?;
        let colors: HashMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("Highlight rules in {} are not a JSON object", path.display()))?;

        debug!(rules = colors.len(), path = %path.display(), "Loaded highlight rules");

        Ok(Self::new(colors, default_color))
    }

    /// Color for an author, else the default, else nothing.
    pub fn color_for(&self, handle: &str) -> Option<String> {
        self.colors
            .get(&normalize_handle(handle))
            .or(self.default_color.as_ref())
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let rules = NotificationRules::new(
            [("@ElonMusk".to_string(), "#ff0000".to_string())].into(),
            Some("#ffffff".to_string()),
        );
        assert_eq!(rules.color_for("elonmusk").as_deref(), Some("#ff0000"));
        assert_eq!(rules.color_for("ELONMUSK").as_deref(), Some("#ff0000"));
        assert_eq!(rules.color_for("someone").as_deref(), Some("#ffffff"));
    }

    #[test]
    fn test_no_default_means_no_color() {
        let rules = NotificationRules::default();
        assert!(rules.color_for("anyone").is_none());
        assert!(rules.is_empty());
    }
}
