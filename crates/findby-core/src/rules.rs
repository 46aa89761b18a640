//! The ordered shorthand rule table.
//!
//! Each [`Rule`] pairs a predicate with a transform. [`dispatch`] walks
//! [`RULES`] top to bottom and the first rule whose predicate matches and
//! whose transform succeeds decides the strategy. Order matters: several
//! inputs are valid under more than one rule.
//!
//! # Rule Priority (highest to lowest)
//!
//! 1. `#id` without CSS punctuation → `id`
//! 2. `/`, `(`, `../`, `./`, `*/` prefixes → `xpath`
//! 3. `=text` → `link text`
//! 4. `selector *= text` → synthesized `xpath`
//! 5. `*=text` → `partial link text`
//! 6. `android=...` → `-android uiautomator` (platform)
//! 7. `ios=...` → `-ios uiautomation` (platform)
//! 8. `~label` → `accessibility id` (platform)
//! 9. `<tag>`, `<tag />` → `tag name`
//! 10. `[name="..."]` → `name`
//! 11. `tag=text` → `xpath` exact text
//! 12. `tag*=text` → `xpath` contained text
//! 13. `tag.class=text`, `tag#id=text` → `xpath` exact text
//! 14. `tag.class*=text`, `tag#id*=text` → `xpath` contained text
//! 15. `..`, `.` → `xpath`
//! 16. anything else → `css selector`

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::css::CssError;
use crate::literal;
use crate::strategy::{LocatorDescriptor, Strategy};
use crate::synth;

// ============================================================================
// Patterns
// ============================================================================

static TAG_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[a-zA-Z\-]+( /)*>").expect("tag literal pattern"));

static TAG_LITERAL_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[<>/\s]").expect("tag noise pattern"));

static NAME_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[name=(?:"([a-zA-Z0-9\-_ ]+)"|'([a-zA-Z0-9\-_ ]+)')\]$"#)
        .expect("name attribute pattern")
});

static TAG_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]*=.+$").expect("tag text pattern"));

static TAG_CONTAINS_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]*\*=.+$").expect("tag contains pattern"));

static CLASS_OR_ID_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]*)([.#])(-?[_a-zA-Z]+[_a-zA-Z0-9-]*)=(.+)$")
        .expect("class or id text pattern")
});

static CLASS_OR_ID_CONTAINS_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]*)([.#])(-?[_a-zA-Z]+[_a-zA-Z0-9-]*)\*=(.+)$")
        .expect("class or id contains pattern")
});

// ============================================================================
// Rule Table
// ============================================================================

/// Identifies the rule that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    IdShorthand,
    #[serde(rename = "xpath_literal")]
    XPathLiteral,
    LinkText,
    ContainsText,
    PartialLinkText,
    AndroidUiAutomator,
    IosUiAutomation,
    AccessibilityId,
    TagName,
    NameAttribute,
    TagText,
    TagContainsText,
    ClassOrIdText,
    ClassOrIdContainsText,
    #[serde(rename = "xpath_navigation")]
    XPathNavigation,
    CssFallback,
    /// The caller named the strategy; no rule was consulted.
    Explicit,
}

impl RuleKind {
    /// Short human-readable description for `--explain` output.
    pub fn description(self) -> &'static str {
        match self {
            RuleKind::IdShorthand => "#id shorthand",
            RuleKind::XPathLiteral => "expression already looks like XPath",
            RuleKind::LinkText => "=text link text",
            RuleKind::ContainsText => "selector *= text",
            RuleKind::PartialLinkText => "*=text partial link text",
            RuleKind::AndroidUiAutomator => "android= UiAutomator query",
            RuleKind::IosUiAutomation => "ios= UIAutomation query",
            RuleKind::AccessibilityId => "~accessibility id",
            RuleKind::TagName => "<tag> literal",
            RuleKind::NameAttribute => "[name=...] attribute",
            RuleKind::TagText => "tag=text exact text",
            RuleKind::TagContainsText => "tag*=text contained text",
            RuleKind::ClassOrIdText => "tag.class=text / tag#id=text exact text",
            RuleKind::ClassOrIdContainsText => "tag.class*=text / tag#id*=text contained text",
            RuleKind::XPathNavigation => "parent or self navigation",
            RuleKind::CssFallback => "no shorthand matched, treated as CSS",
            RuleKind::Explicit => "explicit strategy override",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Per-call settings visible to rule transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// Build XPath relative to the current element (`./`) instead of `//`.
    pub relative: bool,
    /// Whether the mobile-only rules take part in dispatch.
    pub platform_strategies: bool,
}

impl Context {
    fn xpath_prefix(&self) -> &'static str {
        if self.relative {
            "./"
        } else {
            "//"
        }
    }
}

type Transform = fn(&str, &Context) -> Result<LocatorDescriptor, CssError>;

/// One entry of the rule table.
pub struct Rule {
    pub kind: RuleKind,
    /// Platform rules are skipped unless [`Context::platform_strategies`] is set.
    pub platform: bool,
    predicate: fn(&str) -> bool,
    transform: Transform,
}

impl Rule {
    const fn new(kind: RuleKind, predicate: fn(&str) -> bool, transform: Transform) -> Self {
        Self {
            kind,
            platform: false,
            predicate,
            transform,
        }
    }

    const fn platform(kind: RuleKind, predicate: fn(&str) -> bool, transform: Transform) -> Self {
        Self {
            kind,
            platform: true,
            predicate,
            transform,
        }
    }

    pub fn matches(&self, selector: &str) -> bool {
        (self.predicate)(selector)
    }
}

/// The rule table, in priority order. The last rule always matches.
pub static RULES: [Rule; 16] = [
    Rule::new(RuleKind::IdShorthand, is_id_shorthand, |s, _| {
        Ok(LocatorDescriptor::new(Strategy::Id, &s[1..]))
    }),
    Rule::new(RuleKind::XPathLiteral, is_xpath_literal, |s, _| {
        Ok(LocatorDescriptor::new(Strategy::XPath, s))
    }),
    Rule::new(RuleKind::LinkText, |s| s.starts_with('='), |s, _| {
        Ok(LocatorDescriptor::new(Strategy::LinkText, &s[1..]))
    }),
    Rule::new(RuleKind::ContainsText, is_contains_text, contains_text),
    Rule::new(RuleKind::PartialLinkText, |s| s.starts_with("*="), |s, _| {
        Ok(LocatorDescriptor::new(Strategy::PartialLinkText, &s[2..]))
    }),
    Rule::platform(
        RuleKind::AndroidUiAutomator,
        |s| s.starts_with("android="),
        |s, _| Ok(LocatorDescriptor::new(Strategy::AndroidUiAutomator, &s[8..])),
    ),
    Rule::platform(
        RuleKind::IosUiAutomation,
        |s| s.starts_with("ios="),
        |s, _| Ok(LocatorDescriptor::new(Strategy::IosUiAutomation, &s[4..])),
    ),
    Rule::platform(RuleKind::AccessibilityId, |s| s.starts_with('~'), |s, _| {
        Ok(LocatorDescriptor::new(Strategy::AccessibilityId, &s[1..]))
    }),
    Rule::new(RuleKind::TagName, |s| TAG_LITERAL.is_match(s), |s, _| {
        Ok(LocatorDescriptor::new(
            Strategy::TagName,
            TAG_LITERAL_NOISE.replace_all(s, ""),
        ))
    }),
    Rule::new(RuleKind::NameAttribute, |s| NAME_ATTRIBUTE.is_match(s), name_attribute),
    Rule::new(RuleKind::TagText, |s| TAG_TEXT.is_match(s), tag_text),
    Rule::new(
        RuleKind::TagContainsText,
        |s| TAG_CONTAINS_TEXT.is_match(s),
        tag_contains_text,
    ),
    Rule::new(
        RuleKind::ClassOrIdText,
        |s| CLASS_OR_ID_TEXT.is_match(s),
        |s, ctx| class_or_id(&CLASS_OR_ID_TEXT, "normalize-space() = ", s, ctx),
    ),
    Rule::new(
        RuleKind::ClassOrIdContainsText,
        |s| CLASS_OR_ID_CONTAINS_TEXT.is_match(s),
        |s, ctx| class_or_id(&CLASS_OR_ID_CONTAINS_TEXT, "contains(., ", s, ctx),
    ),
    Rule::new(RuleKind::XPathNavigation, |s| s == ".." || s == ".", |s, _| {
        Ok(LocatorDescriptor::new(Strategy::XPath, s))
    }),
    Rule::new(RuleKind::CssFallback, |_| true, |s, _| {
        Ok(LocatorDescriptor::new(Strategy::DEFAULT, s))
    }),
];

/// A resolved descriptor together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub descriptor: LocatorDescriptor,
    pub rule: RuleKind,
}

/// Run `selector` through the rule table.
pub fn dispatch(selector: &str, ctx: &Context) -> Resolution {
    let mut failed = None;

    for rule in RULES.iter() {
        if rule.platform && !ctx.platform_strategies {
            continue;
        }
        if !rule.matches(selector) {
            continue;
        }

        match (rule.transform)(selector, ctx) {
            Ok(descriptor) => {
                if let Some(failed) = failed {
                    warn!(
                        failed = ?failed,
                        rule = ?rule.kind,
                        using = %descriptor.using,
                        "'{}' resolved by a lower-priority rule",
                        selector
                    );
                }
                debug!(rule = ?rule.kind, using = %descriptor.using, "Resolved selector");
                return Resolution {
                    descriptor,
                    rule: rule.kind,
                };
            }
            Err(e) => {
                warn!(
                    "Rule {:?} matched '{}' but could not build a locator: {}",
                    rule.kind, selector, e
                );
                failed = failed.or(Some(rule.kind));
            }
        }
    }

    // The CSS fallback closes the table and always succeeds
    unreachable!("no rule resolved '{}'", selector)
}

// ============================================================================
// Predicates
// ============================================================================

fn is_id_shorthand(s: &str) -> bool {
    s.starts_with('#') && !s.contains(|c: char| c.is_whitespace() || matches!(c, '>' | '.' | '|'))
}

fn is_xpath_literal(s: &str) -> bool {
    ["/", "(", "../", "./", "*/"]
        .iter()
        .any(|prefix| s.starts_with(prefix))
}

/// Tag-qualified text shapes handled by the narrower rules 11-14.
fn is_tag_qualified(s: &str) -> bool {
    TAG_TEXT.is_match(s)
        || TAG_CONTAINS_TEXT.is_match(s)
        || CLASS_OR_ID_TEXT.is_match(s)
        || CLASS_OR_ID_CONTAINS_TEXT.is_match(s)
}

fn is_contains_text(s: &str) -> bool {
    !s.starts_with("*=")
        && synth::find_top_level_contains(s).is_some()
        && !is_tag_qualified(s)
}

// ============================================================================
// Transforms
// ============================================================================

fn contains_text(s: &str, _ctx: &Context) -> Result<LocatorDescriptor, CssError> {
    let (selector, text) = synth::split(s).unwrap_or(("", s));
    let xpath = synth::contains_text(selector, text)?;
    Ok(LocatorDescriptor::new(Strategy::XPath, xpath))
}

fn name_attribute(s: &str, _ctx: &Context) -> Result<LocatorDescriptor, CssError> {
    let name = NAME_ATTRIBUTE
        .captures(s)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map_or("", |m| m.as_str());
    Ok(LocatorDescriptor::new(Strategy::Name, name))
}

fn tag_or_any(tag: &str) -> &str {
    if tag.is_empty() {
        "*"
    } else {
        tag
    }
}

/// `tag=text`: exact normalized text.
///
/// The text is written with [`literal::encode`] rather than pasted between
/// double quotes, so text holding `"` becomes a `concat(...)` expression
/// instead of the plain `"<text>"` form.
fn tag_text(s: &str, ctx: &Context) -> Result<LocatorDescriptor, CssError> {
    let (tag, text) = s.split_once('=').unwrap_or(("", s));
    Ok(LocatorDescriptor::new(
        Strategy::XPath,
        format!(
            "{}{}[normalize-space() = {}]",
            ctx.xpath_prefix(),
            tag_or_any(tag),
            literal::encode(text)
        ),
    ))
}

fn tag_contains_text(s: &str, ctx: &Context) -> Result<LocatorDescriptor, CssError> {
    let (tag, text) = s.split_once("*=").unwrap_or(("", s));
    Ok(LocatorDescriptor::new(
        Strategy::XPath,
        format!(
            "{}{}[contains(., {})]",
            ctx.xpath_prefix(),
            tag_or_any(tag),
            literal::encode(text)
        ),
    ))
}

/// Shared transform for `tag.class` / `tag#id` text rules.
///
/// `text_test` is the opening of the text predicate; its closing paren, if
/// any, is balanced here.
fn class_or_id(
    pattern: &Regex,
    text_test: &str,
    s: &str,
    ctx: &Context,
) -> Result<LocatorDescriptor, CssError> {
    // The rule predicate already matched `pattern`
    let Some(caps) = pattern.captures(s) else {
        unreachable!("'{}' does not match {}", s, pattern.as_str());
    };
    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

    let attribute = if group(2) == "#" { "id" } else { "class" };
    let close = if text_test.ends_with('(') { ")" } else { "" };

    Ok(LocatorDescriptor::new(
        Strategy::XPath,
        format!(
            "{}{}[contains(@{}, {}) and {}{}{}]",
            ctx.xpath_prefix(),
            tag_or_any(group(1)),
            attribute,
            literal::encode(group(3)),
            text_test,
            literal::encode(group(4)),
            close
        ),
    ))
}
