//! Core types and logic for findby.
//!
//! This crate turns compact, human-authored selector strings into the
//! `{using, value}` locator descriptors understood by WebDriver-style
//! element lookup endpoints. It's used by both the CLI and the JSON-lines
//! service.
//!
//! # Modules
//!
//! - [`resolver`]: Public entry points and resolver options
//! - [`rules`]: The ordered shorthand rule table
//! - [`synth`]: XPath synthesis for the `selector *= text` form
//! - [`css`]: CSS selector to XPath location path translation
//! - [`literal`]: XPath 1.0 string literal encoding
//! - [`strategy`]: Lookup strategies and locator descriptors
//! - [`error`]: API error types with actionable suggestions
//! - [`protocol`]: JSON-line request/response protocol
//!
//! # Shorthand Grammar
//!
//! Rules are tried top to bottom; the first match wins.
//!
//! | Input | Strategy | Value |
//! |-------|----------|-------|
//! | `#submit` | `id` | `submit` |
//! | `//div`, `(//a)[1]`, `./p`, `../p`, `*/p` | `xpath` | unchanged |
//! | `=Sign in` | `link text` | `Sign in` |
//! | `button *= Save` | `xpath` | `//button[contains(., "Save")]` |
//! | `*=Sign` | `partial link text` | `Sign` |
//! | `android=...`, `ios=...`, `~label` | platform strategies | remainder |
//! | `<div />` | `tag name` | `div` |
//! | `[name="q"]` | `name` | `q` |
//! | `h1=Welcome` | `xpath` | `//h1[normalize-space() = "Welcome"]` |
//! | `div*=foo` | `xpath` | `//div[contains(., "foo")]` |
//! | `.cls=Hi` | `xpath` | `//*[contains(@class, "cls") and normalize-space() = "Hi"]` |
//! | `..`, `.` | `xpath` | unchanged |
//! | anything else | `css selector` | unchanged |

pub mod css;
pub mod error;
pub mod literal;
pub mod protocol;
pub mod resolver;
pub mod rules;
pub mod strategy;
pub mod synth;

pub use resolver::{Resolution, Resolver, ResolverOptions};
pub use strategy::{LocatorDescriptor, Strategy};
