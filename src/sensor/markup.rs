use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Reduce a portal HTML fragment to plain text.
///
/// Entities other than non-breaking spaces are left as they are.
pub fn strip_html(html: &str) -> String {
    TAG.replace_all(html, "").replace('\u{a0}', " ").replace("&nbsp;", " ").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>First <b>5</b> kWh</p>"), "First 5 kWh");
        assert_eq!(strip_html("  3\u{a0}days&nbsp;left \n"), "3 days left");
        assert_eq!(strip_html(""), "");
    }
}
