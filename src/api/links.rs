// Status link parsing — pasted x.com / twitter.com links or bare ids.

use std::sync::LazyLock;

use regex_lite::Regex;

static STATUS_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.|mobile\.)?(?:twitter\.com|x\.com)/(?:[A-Za-z0-9_]+|i/web)/status(?:es)?/(\d+)",
    )
    .expect("status link pattern is valid")
});

/// Extract the status id from a link or a bare numeric id.
pub fn parse_status_id(input: &str) -> Option<String> {
    let input = input.trim();
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return Some(input.to_string());
    }
    STATUS_LINK
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
