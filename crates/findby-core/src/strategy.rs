//! Lookup strategies and the locator descriptor sent to the driver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Element lookup strategies understood by WebDriver/Appium endpoints.
///
/// Serialized using the protocol's wire names (`"css selector"`,
/// `"-android uiautomator"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "xpath")]
    XPath,
    #[serde(rename = "link text")]
    LinkText,
    #[serde(rename = "partial link text")]
    PartialLinkText,
    #[serde(rename = "-android uiautomator")]
    AndroidUiAutomator,
    #[serde(rename = "-ios uiautomation")]
    IosUiAutomation,
    #[serde(rename = "accessibility id")]
    AccessibilityId,
    #[serde(rename = "tag name")]
    TagName,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "css selector")]
    CssSelector,
}

impl Strategy {
    /// Strategy used when no shorthand rule matches.
    pub const DEFAULT: Strategy = Strategy::CssSelector;

    /// Every strategy, in rule-table order.
    pub const ALL: [Strategy; 10] = [
        Strategy::Id,
        Strategy::XPath,
        Strategy::LinkText,
        Strategy::PartialLinkText,
        Strategy::AndroidUiAutomator,
        Strategy::IosUiAutomation,
        Strategy::AccessibilityId,
        Strategy::TagName,
        Strategy::Name,
        Strategy::CssSelector,
    ];

    /// The protocol-level name of this strategy.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Id => "id",
            Strategy::XPath => "xpath",
            Strategy::LinkText => "link text",
            Strategy::PartialLinkText => "partial link text",
            Strategy::AndroidUiAutomator => "-android uiautomator",
            Strategy::IosUiAutomation => "-ios uiautomation",
            Strategy::AccessibilityId => "accessibility id",
            Strategy::TagName => "tag name",
            Strategy::Name => "name",
            Strategy::CssSelector => "css selector",
        }
    }

    /// Mobile-only strategies, emitted only when platform rules are enabled.
    pub fn is_platform(self) -> bool {
        matches!(
            self,
            Strategy::AndroidUiAutomator | Strategy::IosUiAutomation | Strategy::AccessibilityId
        )
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::DEFAULT
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lookup strategy '{0}'")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// A `{using, value}` pair ready for an element lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorDescriptor {
    pub using: Strategy,
    pub value: String,
}

impl LocatorDescriptor {
    pub fn new(using: Strategy, value: impl Into<String>) -> Self {
        Self {
            using,
            value: value.into(),
        }
    }
}

impl fmt::Display for LocatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.using, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip_through_from_str() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.as_str().parse::<Strategy>(), Ok(strategy));
        }
    }

    #[test]
    fn test_from_str_rejects_unknown_names() {
        let err = "link".parse::<Strategy>().unwrap_err();
        assert_eq!(err, UnknownStrategy("link".to_string()));
        assert!(err.to_string().contains("'link'"));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Strategy::PartialLinkText).unwrap();
        assert_eq!(json, "\"partial link text\"");

        let parsed: Strategy = serde_json::from_str("\"-ios uiautomation\"").unwrap();
        assert_eq!(parsed, Strategy::IosUiAutomation);
    }

    #[test]
    fn test_default_is_css_selector() {
        assert_eq!(Strategy::default(), Strategy::CssSelector);
    }

    #[test]
    fn test_platform_strategies() {
        let platform: Vec<_> = Strategy::ALL
            .into_iter()
            .filter(|s| s.is_platform())
            .collect();
        assert_eq!(
            platform,
            vec![
                Strategy::AndroidUiAutomator,
                Strategy::IosUiAutomation,
                Strategy::AccessibilityId
            ]
        );
    }

    #[test]
    fn test_descriptor_json_shape() {
        let descriptor = LocatorDescriptor::new(Strategy::CssSelector, "div > span");
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"using": "css selector", "value": "div > span"})
        );
    }

    #[test]
    fn test_descriptor_display() {
        let descriptor = LocatorDescriptor::new(Strategy::Id, "submit");
        assert_eq!(descriptor.to_string(), "id: submit");
    }
}
