//! JSON-lines request loop.
//!
//! Reads one [`Request`] per line and writes one [`Response`] per line, in
//! order. Malformed requests get an error response and the loop carries on;
//! it stops at EOF, on an I/O failure, or when a line exceeds the size limit.

use anyhow::{Context, Result};
use findby_core::css;
use findby_core::error::ApiError;
use findby_core::literal;
use findby_core::protocol::{Command, Request, Response, ResponseData, StrategyInfo};
use findby_core::{Resolver, Strategy};
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Serve requests from `reader` until EOF, writing responses to `writer`.
pub async fn serve<R, W>(
    resolver: Resolver,
    mut reader: R,
    mut writer: W,
    max_request_size: usize,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();

        // Read line with size limit to prevent memory DoS
        let bytes_read = read_line_bounded(&mut reader, &mut line, max_request_size).await?;

        if bytes_read == 0 {
            debug!("Input closed");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {} bytes", trimmed.len());

        let response = match serde_json::from_str::<Request>(trimmed) {
            Ok(request) => handle_request(&resolver, request),
            Err(e) => Response::error(
                "unknown",
                ApiError::invalid_input_with_suggestion(
                    format!("Invalid JSON request: {}", e),
                    "Ensure the request is valid JSON with 'id' and 'command' fields. Example: {\"id\":\"1\",\"command\":{\"action\":\"resolve\",\"selector\":\"#submit\"}}",
                ),
            ),
        };

        let response_json =
            serde_json::to_string(&response).context("Failed to serialize response")?;
        debug!("Sending: {}", response_json);

        writer
            .write_all(response_json.as_bytes())
            .await
            .context("Failed to write response")?;
        writer
            .write_all(b"\n")
            .await
            .context("Failed to write newline")?;
        writer.flush().await.context("Failed to flush")?;
    }

    Ok(())
}

/// Read a line with a maximum size limit.
///
/// Returns the number of bytes read (0 means EOF).
/// Returns an error if the line exceeds max_size before finding a newline.
async fn read_line_bounded<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut String,
    max_size: usize,
) -> Result<usize> {
    use tokio::io::AsyncBufReadExt;

    let mut total = 0;
    let mut bytes = Vec::new();

    loop {
        let available = reader.fill_buf().await.context("Failed to read request")?;

        if available.is_empty() {
            break;
        }

        let newline_pos = available.iter().position(|&b| b == b'\n');
        let bytes_to_consume = newline_pos.map(|p| p + 1).unwrap_or(available.len());

        if total + bytes_to_consume > max_size {
            anyhow::bail!("Request too large: exceeded {} byte limit", max_size);
        }

        // Append raw bytes and validate UTF-8 once at the end
        bytes.extend_from_slice(&available[..bytes_to_consume]);
        total += bytes_to_consume;

        reader.consume(bytes_to_consume);

        if newline_pos.is_some() {
            break;
        }
    }

    let line = std::str::from_utf8(&bytes).context("Invalid UTF-8 in request")?;
    buf.push_str(line);
    Ok(total)
}

/// Handle a single request and return a response.
pub fn handle_request(resolver: &Resolver, request: Request) -> Response {
    debug!("Handling command: {:?}", request.command);

    match request.command {
        Command::Resolve {
            selector,
            relative,
            using,
        } => match resolver.resolve_value(&selector, relative, using) {
            Ok(resolution) => Response::success(
                request.id,
                ResponseData::Locator {
                    using: resolution.descriptor.using,
                    value: resolution.descriptor.value,
                    rule: resolution.rule,
                },
            ),
            Err(e) => Response::error(request.id, e),
        },

        Command::Encode { text } => Response::success(
            request.id,
            ResponseData::Literal {
                literal: literal::encode(&text),
            },
        ),

        Command::CssToXpath { selector } => match css::to_xpath(&selector) {
            Ok(xpath) => Response::success(request.id, ResponseData::Xpath { xpath }),
            Err(e) => Response::error(
                request.id,
                ApiError::invalid_input_with_suggestion(
                    format!("Cannot translate '{}': {}", selector, e),
                    "Supported: tags, #id, .class, [attr] operators, descendant/>/+/~ combinators, :first-child, :last-child, :only-child, :nth-child(N), :empty, :checked, :disabled, :enabled",
                ),
            ),
        },

        Command::ListStrategies => Response::success(
            request.id,
            ResponseData::Strategies {
                strategies: strategy_info(resolver),
            },
        ),
    }
}

/// Describe every strategy and whether this resolver can emit it.
pub fn strategy_info(resolver: &Resolver) -> Vec<StrategyInfo> {
    let platform_enabled = resolver.options().platform_strategies;
    Strategy::ALL
        .into_iter()
        .map(|name| StrategyInfo {
            name,
            platform: name.is_platform(),
            enabled: platform_enabled || !name.is_platform(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use findby_core::error::ErrorCode;
    use findby_core::rules::RuleKind;
    use serde_json::json;
    use tokio::io::BufReader;

    use super::*;

    async fn run(input: &str) -> Vec<Response> {
        run_with(Resolver::default(), input, 1024).await.unwrap()
    }

    async fn run_with(resolver: Resolver, input: &str, limit: usize) -> Result<Vec<Response>> {
        let reader = BufReader::new(input.as_bytes());
        let mut output = Vec::new();
        serve(resolver, reader, &mut output, limit).await?;

        let text = String::from_utf8(output).expect("utf-8 output");
        Ok(text
            .lines()
            .map(|line| serde_json::from_str(line).expect("parse response"))
            .collect())
    }

    #[tokio::test]
    async fn test_resolve_request() {
        let responses =
            run(r##"{"id":"r1","command":{"action":"resolve","selector":"#submit"}}"##).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, "r1");
        assert!(responses[0].success);
        assert_eq!(
            responses[0].data,
            Some(ResponseData::Locator {
                using: Strategy::Id,
                value: "submit".to_string(),
                rule: RuleKind::IdShorthand,
            })
        );
    }

    #[tokio::test]
    async fn test_relative_resolve_request() {
        let responses = run(
            r#"{"id":"r2","command":{"action":"resolve","selector":"h1=Welcome","relative":true}}"#,
        )
        .await;

        match &responses[0].data {
            Some(ResponseData::Locator { using, value, .. }) => {
                assert_eq!(*using, Strategy::XPath);
                assert_eq!(value, "./h1[normalize-space() = \"Welcome\"]");
            }
            other => panic!("Expected locator, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_string_selector_is_an_error_response() {
        let responses =
            run(r#"{"id":"r3","command":{"action":"resolve","selector":{"css":"a"}}}"#).await;

        assert!(!responses[0].success);
        let err = responses[0].error.as_ref().expect("error payload");
        assert_eq!(err.code, ErrorCode::InvalidSelectorType);
        assert!(err.message.contains("object"));
    }

    #[tokio::test]
    async fn test_invalid_json_keeps_serving() {
        let input = concat!(
            "not json\n",
            "\n",
            r#"{"id":"e1","command":{"action":"encode","text":"it's"}}"#,
            "\n"
        );
        let responses = run(input).await;

        assert_eq!(responses.len(), 2, "blank lines get no response");
        assert_eq!(responses[0].id, "unknown");
        assert_eq!(
            responses[0].error.as_ref().map(|e| e.code.clone()),
            Some(ErrorCode::InvalidInput)
        );
        assert_eq!(
            responses[1].data,
            Some(ResponseData::Literal {
                literal: "\"it's\"".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_css_to_xpath_request() {
        let input = concat!(
            r#"{"id":"c1","command":{"action":"css_to_xpath","selector":"ul > li"}}"#,
            "\n",
            r#"{"id":"c2","command":{"action":"css_to_xpath","selector":"a:hover"}}"#,
        );
        let responses = run(input).await;

        assert_eq!(
            responses[0].data,
            Some(ResponseData::Xpath {
                xpath: "//ul/li".to_string()
            })
        );
        assert!(!responses[1].success);
        let err = responses[1].error.as_ref().expect("error payload");
        assert!(err.message.contains("hover"));
    }

    #[tokio::test]
    async fn test_list_strategies_respects_platform_flag() {
        let input = r#"{"id":"s1","command":{"action":"list_strategies"}}"#;
        let responses = run_with(Resolver::web(), input, 1024).await.unwrap();

        let Some(ResponseData::Strategies { strategies }) = &responses[0].data else {
            panic!("Expected strategies, got: {:?}", responses[0].data);
        };
        assert_eq!(strategies.len(), Strategy::ALL.len());
        for info in strategies {
            assert_eq!(info.enabled, !info.platform, "{:?}", info.name);
        }
    }

    #[tokio::test]
    async fn test_responses_preserve_request_order() {
        let input = [
            json!({"id": "1", "command": {"action": "resolve", "selector": "=Home"}}),
            json!({"id": "2", "command": {"action": "resolve", "selector": "q", "using": "name"}}),
            json!({"id": "3", "command": {"action": "resolve", "selector": null}}),
        ]
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("\n");

        let responses = run(&input).await;
        let ids: Vec<_> = responses.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert!(responses[0].success && responses[1].success);
        assert!(!responses[2].success);
    }

    #[tokio::test]
    async fn test_oversized_line_stops_serving() {
        let long = format!(
            r#"{{"id":"big","command":{{"action":"encode","text":"{}"}}}}"#,
            "x".repeat(200)
        );
        let result = run_with(Resolver::default(), &long, 64).await;

        let err = result.expect_err("oversized line should fail");
        assert!(err.to_string().contains("Request too large"));
    }
}
