//! Protocol types for the JSON-lines service.
//!
//! One request per line in, one response per line out:
//!
//! ```text
//! {"id":"1","command":{"action":"resolve","selector":"h1=Welcome"}}
//! {"id":"1","success":true,"data":{"type":"locator","using":"xpath","value":"//h1[normalize-space() = \"Welcome\"]","rule":"tag_text"}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::rules::RuleKind;
use crate::strategy::Strategy;

/// A request from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub command: Command,
}

/// Commands the service can execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Resolve a selector shorthand.
    ///
    /// `selector` is left untyped so non-string values reach the resolver
    /// and are reported as `INVALID_SELECTOR_TYPE`.
    Resolve {
        selector: Value,
        #[serde(default)]
        relative: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        using: Option<Strategy>,
    },
    /// Encode text as an XPath string literal.
    Encode { text: String },
    /// Translate a CSS selector to XPath.
    CssToXpath { selector: String },
    /// List the lookup strategies this service can emit.
    ListStrategies,
}

/// A response to a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    pub fn success(id: impl Into<String>, data: ResponseData) -> Self {
        Self {
            id: id.into(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(id: impl Into<String>, error: ApiError) -> Self {
        Self {
            id: id.into(),
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Response payload variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseData {
    /// A resolved locator and the rule that produced it.
    Locator {
        using: Strategy,
        value: String,
        rule: RuleKind,
    },
    /// An encoded XPath string literal.
    Literal { literal: String },
    /// A translated XPath expression.
    Xpath { xpath: String },
    /// Available strategies.
    Strategies { strategies: Vec<StrategyInfo> },
}

/// Information about one lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub name: Strategy,
    pub platform: bool,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_request_defaults() {
        let json = r##"{"id":"1","command":{"action":"resolve","selector":"#a"}}"##;
        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.command,
            Command::Resolve {
                selector: Value::String("#a".to_string()),
                relative: false,
                using: None,
            }
        );
    }

    #[test]
    fn test_resolve_request_with_override() {
        let json = r#"{"id":"2","command":{"action":"resolve","selector":"q","relative":true,"using":"name"}}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert!(matches!(
            request.command,
            Command::Resolve {
                relative: true,
                using: Some(Strategy::Name),
                ..
            }
        ));
    }

    #[test]
    fn test_non_string_selector_still_parses() {
        let json = r#"{"id":"3","command":{"action":"resolve","selector":42}}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert!(matches!(
            request.command,
            Command::Resolve { selector: Value::Number(_), .. }
        ));
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let json = r#"{"id":"4","command":{"action":"resolve","selector":"q","using":"label"}}"#;
        assert!(serde_json::from_str::<Request>(json).is_err());
    }

    #[test]
    fn test_unit_command() {
        let json = r#"{"id":"5","command":{"action":"list_strategies"}}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(request.command, Command::ListStrategies);
    }

    #[test]
    fn test_locator_response_serialization() {
        let response = Response::success(
            "1",
            ResponseData::Locator {
                using: Strategy::LinkText,
                value: "Sign in".to_string(),
                rule: RuleKind::LinkText,
            },
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "success": true,
                "data": {
                    "type": "locator",
                    "using": "link text",
                    "value": "Sign in",
                    "rule": "link_text"
                }
            })
        );
    }

    #[test]
    fn test_error_response_omits_data() {
        let response = Response::error("9", ApiError::invalid_selector_type("null"));
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("\"data\""));
        assert!(json.contains("INVALID_SELECTOR_TYPE"));

        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }
}
