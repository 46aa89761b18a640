//! XPath synthesis for the `selector *= text` shorthand.
//!
//! `button *= Save` finds a button containing "Save"; a trailing `*` on
//! the selector (`form * *= Save`) looks for the text in any descendant
//! instead; with no selector at all the whole tree is searched.

use crate::css::{self, CssError};
use crate::literal;

/// Excludes script and style elements from text searches.
const NOT_SCRIPT_OR_STYLE: &str = "[not(self::script) and not(self::style)]";

/// Byte offset of the first `*=` that is not part of an attribute predicate.
///
/// An occurrence is skipped when the text after it reaches a `]` before any
/// `[`, as in `a[href*=x]`.
pub fn find_top_level_contains(selector: &str) -> Option<usize> {
    selector
        .match_indices("*=")
        .map(|(offset, _)| offset)
        .find(|&offset| !closes_bracket(&selector[offset + 2..]))
}

fn closes_bracket(rest: &str) -> bool {
    rest.find(['[', ']'])
        .is_some_and(|offset| rest.as_bytes()[offset] == b']')
}

/// Split at the first top-level `*=` into trimmed `(selector, text)`.
///
/// Everything after the split point is text, including any later `*=`.
pub fn split(input: &str) -> Option<(&str, &str)> {
    let offset = find_top_level_contains(input)?;
    Some((input[..offset].trim(), input[offset + 2..].trim()))
}

/// Build the XPath for "element matching `selector` containing `text`".
pub fn contains_text(selector: &str, text: &str) -> Result<String, CssError> {
    let text = literal::encode(text);
    if selector.is_empty() {
        return Ok(anywhere(&text));
    }

    match selector.strip_suffix('*').map(str::trim) {
        // `*` on its own scopes to nothing narrower than the whole tree.
        Some("") => Ok(anywhere(&text)),
        Some(scope) => Ok(format!(
            "({}//*{}[contains(., {})])[last()]",
            css::to_xpath(scope)?,
            NOT_SCRIPT_OR_STYLE,
            text
        )),
        None => Ok(format!("{}[contains(., {})]", css::to_xpath(selector)?, text)),
    }
}

fn anywhere(text: &str) -> String {
    format!(
        "(.//*{}[contains(., {})])[last()]",
        NOT_SCRIPT_OR_STYLE, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_top_level_contains() {
        assert_eq!(find_top_level_contains("div *= foo"), Some(4));
        assert_eq!(find_top_level_contains("*=foo"), Some(0));
        assert_eq!(find_top_level_contains("div"), None);
    }

    #[test]
    fn test_attribute_predicate_is_not_top_level() {
        assert_eq!(find_top_level_contains("[data-x='*=y']"), None);
        assert_eq!(find_top_level_contains("a[href*=login]"), None);
    }

    #[test]
    fn test_skips_predicate_and_finds_later_occurrence() {
        let input = "a[href*=x] *= Next";
        assert_eq!(find_top_level_contains(input), Some(11));
        assert_eq!(split(input), Some(("a[href*=x]", "Next")));
    }

    #[test]
    fn test_occurrence_before_a_new_bracket_is_top_level() {
        // The next bracket opens rather than closes, so this `*=` is outside.
        assert_eq!(find_top_level_contains("li *= [draft]"), Some(3));
    }

    #[test]
    fn test_split_keeps_later_operators_in_text() {
        assert_eq!(split("p *= a *= b"), Some(("p", "a *= b")));
    }

    #[test]
    fn test_text_only() {
        assert_eq!(
            contains_text("", "Save").unwrap(),
            "(.//*[not(self::script) and not(self::style)][contains(., \"Save\")])[last()]"
        );
    }

    #[test]
    fn test_selector_contains_text_directly() {
        assert_eq!(
            contains_text("button", "Save").unwrap(),
            "//button[contains(., \"Save\")]"
        );
    }

    #[test]
    fn test_trailing_star_searches_descendants() {
        assert_eq!(
            contains_text("form *", "it's").unwrap(),
            "(//form//*[not(self::script) and not(self::style)][contains(., \"it's\")])[last()]"
        );
    }

    #[test]
    fn test_lone_star_searches_everything() {
        assert_eq!(contains_text("*", "x").unwrap(), contains_text("", "x").unwrap());
    }

    #[test]
    fn test_untranslatable_selector_is_an_error() {
        assert!(matches!(
            contains_text("a:hover", "x"),
            Err(CssError::UnsupportedPseudo(_))
        ));
    }
}
