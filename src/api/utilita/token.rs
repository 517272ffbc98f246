//! Anti-forgery token scraping.
//!
//! This is the only place that knows anything about the login page markup.

use std::sync::LazyLock;

use regex::Regex;

use crate::prelude::*;

static HIDDEN_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input type="hidden" name="_token" value="([^"]+)""#).unwrap()
});

static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta name="csrf-token" content="([^"]+)""#).unwrap()
});

/// Number of leading page characters to log when the token cannot be found.
const SNIPPET_LENGTH: usize = 1000;

/// Extract the CSRF token from the login page.
///
/// The hidden form field takes precedence over the `<meta>` tag.
pub fn extract_token(html: &str) -> Result<String> {
    let token = [&*HIDDEN_INPUT, &*META_TAG]
        .into_iter()
        .find_map(|pattern| pattern.captures(html))
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_owned());
    if let Some(token) = token {
        debug!(token = %token.chars().take(10).collect::<String>(), "Found the CSRF token");
        Ok(token)
    } else {
        let snippet: String = html.chars().take(SNIPPET_LENGTH).collect();
        error!(snippet, "CSRF token not found on the login page");
        bail!("CSRF token not found")
    }
}
