//! Public entry points for selector resolution.
//!
//! A [`Resolver`] carries the capability flags; every call is an independent
//! pure computation, so one resolver can be shared freely across threads.

use serde_json::Value;

use crate::error::ApiError;
use crate::rules::{self, Context, RuleKind};
use crate::strategy::{LocatorDescriptor, Strategy};

pub use crate::rules::Resolution;

/// Capability flags for a [`Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Enable the `android=`, `ios=` and `~` shorthands.
    pub platform_strategies: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            platform_strategies: true,
        }
    }
}

/// Translates selector shorthands into locator descriptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolver {
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    /// A resolver without the mobile-only shorthands.
    pub fn web() -> Self {
        Self::new(ResolverOptions {
            platform_strategies: false,
        })
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// Resolve a selector string. Never fails: unrecognized input is
    /// treated as a CSS selector.
    ///
    /// `relative` switches generated XPath from `//` to `./`.
    pub fn resolve(&self, selector: &str, relative: bool) -> LocatorDescriptor {
        self.explain(selector, relative).descriptor
    }

    /// Like [`Resolver::resolve`], also reporting which rule matched.
    pub fn explain(&self, selector: &str, relative: bool) -> Resolution {
        let ctx = Context {
            relative,
            platform_strategies: self.options.platform_strategies,
        };
        rules::dispatch(selector, &ctx)
    }

    /// Bypass inference: the caller already knows the strategy.
    pub fn resolve_explicit(&self, using: Strategy, value: &str) -> LocatorDescriptor {
        LocatorDescriptor::new(using, value)
    }

    /// Resolve a selector that arrived as untyped JSON.
    ///
    /// Fails with `INVALID_SELECTOR_TYPE` unless `selector` is a string; the
    /// check runs before the explicit override is honored.
    pub fn resolve_value(
        &self,
        selector: &Value,
        relative: bool,
        using: Option<Strategy>,
    ) -> Result<Resolution, ApiError> {
        let Value::String(selector) = selector else {
            return Err(ApiError::invalid_selector_type(json_type_name(selector)));
        };

        Ok(self.explain_with(selector, relative, using))
    }

    /// Resolve with an optional explicit strategy, reporting the rule used.
    pub fn explain_with(
        &self,
        selector: &str,
        relative: bool,
        using: Option<Strategy>,
    ) -> Resolution {
        match using {
            Some(using) => Resolution {
                descriptor: self.resolve_explicit(using, selector),
                rule: RuleKind::Explicit,
            },
            None => self.explain(selector, relative),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
