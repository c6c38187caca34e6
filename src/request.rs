//! Builds a normalized HTTP request from an ALB invocation event.
//!
//! The load balancer delivers HTTP semantics in a JSON shape with a few
//! format quirks: query parameters arrive without the load balancer decoding
//! them (so a careless pass-through double-encodes), header casing is
//! unreliable, and the body may be base64-framed. This module normalizes all
//! of that into an [`AlbRequest`] plus raw body bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use lambda_runtime::Context;
use lambda_runtime::tracing::debug;
use serde_json::Value;
use std::borrow::Cow;

use crate::models::{AdapterError, AlbEvent, AlbRequest};

/// Server name used when the event carries no `host` header.
const DEFAULT_SERVER_NAME: &str = "lambda";

/// Reads an invocation event and produces a normalized request description.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    event: &'a AlbEvent,
    context: &'a Context,
}

impl<'a> RequestBuilder<'a> {
    #[must_use]
    pub const fn new(event: &'a AlbEvent, context: &'a Context) -> Self {
        Self { event, context }
    }

    /// Reconstructs a canonical query string from the event.
    ///
    /// ALB does not decode URL-encoded query parameters itself, so the raw
    /// values may arrive once- or twice-encoded depending on the caller.
    /// Every key and value is form-decoded first and the full pair set is
    /// then re-encoded, which is idempotent across both inputs and always
    /// yields a once-encoded output. `multiValueQueryStringParameters` takes
    /// precedence when present and non-empty; with no parameters at all the
    /// result is an empty byte string.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Decoding`] if a parameter decodes to invalid
    /// UTF-8, or [`AdapterError::MalformedEvent`] if a parameter value has an
    /// unsupported JSON type.
    pub fn encode_query_string(&self) -> Result<Vec<u8>, AdapterError> {
        let multi = self.event.multi_value_query_string_parameters.as_ref();
        let single = self.event.query_string_parameters.as_ref();
        let params = match (multi, single) {
            (Some(multi), _) if !multi.is_empty() => multi,
            (_, Some(single)) if !single.is_empty() => single,
            _ => return Ok(Vec::new()),
        };

        let mut pairs = Vec::with_capacity(params.len());
        for (key, value) in params {
            push_decoded_pairs(&mut pairs, key, value)?;
        }

        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        Ok(encoded.into_bytes())
    }

    /// Produces the normalized request for this invocation.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Decoding`] for invalid percent-encoded data
    /// and [`AdapterError::MalformedEvent`] for wrong-typed header values or
    /// an unparseable forwarded port.
    pub fn request(&self) -> Result<AlbRequest<'a>, AdapterError> {
        let headers = self.lowercased_headers()?;
        let query_string = self.encode_query_string()?;

        let source_ip = last_header(&headers, "x-forwarded-for")
            .unwrap_or_default()
            .to_string();

        let server = match last_header(&headers, "host") {
            Some(host) => match host.split_once(':') {
                Some((name, port)) => (name.to_string(), parse_port(port)?),
                None => (host.to_string(), forwarded_port(&headers)?),
            },
            None => (DEFAULT_SERVER_NAME.to_string(), forwarded_port(&headers)?),
        };

        let scheme = last_header(&headers, "x-forwarded-proto")
            .unwrap_or("https")
            .to_string();

        let raw_path = if self.event.path.is_empty() {
            "/"
        } else {
            self.event.path.as_str()
        };
        let path = urlencoding::decode(raw_path)
            .map_err(|e| AdapterError::Decoding(format!("invalid percent-encoding in path: {e}")))?
            .into_owned();

        debug!(
            method = %self.event.http_method,
            path = %path,
            "Normalized ALB request"
        );

        Ok(AlbRequest {
            method: self.event.http_method.clone(),
            path,
            headers,
            scheme,
            query_string,
            server,
            client: (source_ip, 0),
            event: self.event,
            context: self.context,
        })
    }

    /// Decodes the request body to raw bytes.
    ///
    /// An absent body is an empty byte vector, never a placeholder. A body
    /// flagged `isBase64Encoded` is decoded with the standard alphabet.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Decoding`] if the base64 payload is malformed.
    pub fn body(&self) -> Result<Vec<u8>, AdapterError> {
        let Some(body) = self.event.body.as_ref() else {
            return Ok(Vec::new());
        };
        if self.event.is_base64_encoded {
            STANDARD
                .decode(body)
                .map_err(|e| AdapterError::Decoding(format!("invalid base64 body: {e}")))
        } else {
            Ok(body.as_bytes().to_vec())
        }
    }

    fn lowercased_headers(&self) -> Result<Vec<(String, String)>, AdapterError> {
        let Some(headers) = self.event.headers.as_ref() else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(headers.len());
        for (name, value) in headers {
            let value = value.as_str().ok_or_else(|| {
                AdapterError::MalformedEvent(format!("header {name:?} is not a string"))
            })?;
            out.push((name.to_lowercase(), value.to_string()));
        }
        Ok(out)
    }
}

/// Form-decodes one parameter entry into key/value pairs, one pair per value.
fn push_decoded_pairs(
    pairs: &mut Vec<(String, String)>,
    key: &str,
    value: &Value,
) -> Result<(), AdapterError> {
    match value {
        Value::Array(values) => {
            for v in values {
                let v = v.as_str().ok_or_else(|| {
                    AdapterError::MalformedEvent(format!(
                        "query parameter {key:?} has a non-string value"
                    ))
                })?;
                pairs.push((unquote_plus(key)?, unquote_plus(v)?));
            }
        }
        Value::String(v) => pairs.push((unquote_plus(key)?, unquote_plus(v)?)),
        _ => {
            return Err(AdapterError::MalformedEvent(format!(
                "query parameter {key:?} has an unsupported type"
            )));
        }
    }
    Ok(())
}

/// Form decoding: plus signs become spaces, then percent sequences decode.
fn unquote_plus(input: &str) -> Result<String, AdapterError> {
    let spaced = input.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|e| AdapterError::Decoding(format!("invalid percent-encoding in {input:?}: {e}")))
}

/// Last occurrence wins, matching single-valued map semantics.
fn last_header<'h>(headers: &'h [(String, String)], name: &str) -> Option<&'h str> {
    headers
        .iter()
        .rev()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn forwarded_port(headers: &[(String, String)]) -> Result<u16, AdapterError> {
    last_header(headers, "x-forwarded-port").map_or(Ok(80), parse_port)
}

fn parse_port(port: &str) -> Result<u16, AdapterError> {
    port.parse()
        .map_err(|e| AdapterError::MalformedEvent(format!("invalid port {port:?}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(payload: Value) -> AlbEvent {
        AlbEvent::from_value(payload).unwrap()
    }

    fn base_event() -> Value {
        json!({
            "path": "/",
            "httpMethod": "GET",
            "headers": {},
            "isBase64Encoded": false
        })
    }

    #[test]
    fn test_query_string_absent_is_empty_bytes() {
        let event = event(base_event());
        let context = Context::default();
        let builder = RequestBuilder::new(&event, &context);
        assert_eq!(builder.encode_query_string().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_query_string_decode_then_encode_is_idempotent() {
        // Once-encoded and twice-encoded inputs both canonicalize to the
        // same once-encoded output.
        let mut once = base_event();
        once["queryStringParameters"] = json!({"name": "a b"});
        let mut twice = base_event();
        twice["queryStringParameters"] = json!({"name": "a%20b"});

        let context = Context::default();
        for payload in [once, twice] {
            let event = event(payload);
            let builder = RequestBuilder::new(&event, &context);
            assert_eq!(builder.encode_query_string().unwrap(), b"name=a%20b");
        }
    }

    #[test]
    fn test_query_string_plus_decodes_as_space() {
        let mut payload = base_event();
        payload["queryStringParameters"] = json!({"q": "a+b"});
        let event = event(payload);
        let context = Context::default();
        let builder = RequestBuilder::new(&event, &context);
        assert_eq!(builder.encode_query_string().unwrap(), b"q=a%20b");
    }

    #[test]
    fn test_multi_value_query_takes_precedence_and_keeps_order() {
        let mut payload = base_event();
        payload["queryStringParameters"] = json!({"ignored": "x"});
        payload["multiValueQueryStringParameters"] = json!({"tag": ["b", "a"], "page": ["2"]});
        let event = event(payload);
        let context = Context::default();
        let builder = RequestBuilder::new(&event, &context);
        assert_eq!(
            builder.encode_query_string().unwrap(),
            b"tag=b&tag=a&page=2"
        );
    }

    #[test]
    fn test_empty_multi_value_query_falls_back_to_single() {
        let mut payload = base_event();
        payload["queryStringParameters"] = json!({"a": "1"});
        payload["multiValueQueryStringParameters"] = json!({});
        let event = event(payload);
        let context = Context::default();
        let builder = RequestBuilder::new(&event, &context);
        assert_eq!(builder.encode_query_string().unwrap(), b"a=1");
    }

    #[test]
    fn test_header_names_lowercased_order_preserved() {
        let mut payload = base_event();
        payload["headers"] = json!({
            "Host": "example.org",
            "X-Custom": "1",
            "x-custom": "2"
        });
        let event = event(payload);
        let context = Context::default();
        let request = RequestBuilder::new(&event, &context).request().unwrap();
        assert_eq!(
            request.headers,
            vec![
                ("host".to_string(), "example.org".to_string()),
                ("x-custom".to_string(), "1".to_string()),
                ("x-custom".to_string(), "2".to_string()),
            ]
        );
        // Lookup collapses duplicates to the last occurrence.
        assert_eq!(request.header("x-custom"), Some("2"));
    }

    #[test]
    fn test_server_from_host_header_with_port() {
        let mut payload = base_event();
        payload["headers"] = json!({"host": "example.org:8443"});
        let event = event(payload);
        let context = Context::default();
        let request = RequestBuilder::new(&event, &context).request().unwrap();
        assert_eq!(request.server, ("example.org".to_string(), 8443));
    }

    #[test]
    fn test_server_defaults_without_host() {
        let mut payload = base_event();
        payload["headers"] = json!({"x-forwarded-port": "8080"});
        let event = event(payload);
        let context = Context::default();
        let request = RequestBuilder::new(&event, &context).request().unwrap();
        assert_eq!(request.server, ("lambda".to_string(), 8080));

        let event2 = super::AlbEvent::from_value(base_event()).unwrap();
        let request = RequestBuilder::new(&event2, &context).request().unwrap();
        assert_eq!(request.server, ("lambda".to_string(), 80));
    }

    #[test]
    fn test_client_from_x_forwarded_for() {
        let mut payload = base_event();
        payload["headers"] = json!({"x-forwarded-for": "192.0.2.10"});
        let event = event(payload);
        let context = Context::default();
        let request = RequestBuilder::new(&event, &context).request().unwrap();
        assert_eq!(request.client, ("192.0.2.10".to_string(), 0));
    }

    #[test]
    fn test_scheme_defaults_to_https() {
        let event = event(base_event());
        let context = Context::default();
        let request = RequestBuilder::new(&event, &context).request().unwrap();
        assert_eq!(request.scheme, "https");

        let mut payload = base_event();
        payload["headers"] = json!({"x-forwarded-proto": "http"});
        let event = super::AlbEvent::from_value(payload).unwrap();
        let request = RequestBuilder::new(&event, &context).request().unwrap();
        assert_eq!(request.scheme, "http");
    }

    #[test]
    fn test_empty_path_normalizes_to_root() {
        let mut payload = base_event();
        payload["path"] = json!("");
        let event = event(payload);
        let context = Context::default();
        let request = RequestBuilder::new(&event, &context).request().unwrap();
        assert_eq!(request.path, "/");
    }

    #[test]
    fn test_path_is_percent_decoded_once() {
        let mut payload = base_event();
        payload["path"] = json!("/a%20b");
        let event = event(payload);
        let context = Context::default();
        let request = RequestBuilder::new(&event, &context).request().unwrap();
        assert_eq!(request.path, "/a b");
    }

    #[test]
    fn test_missing_body_is_empty_bytes() {
        let event = event(base_event());
        let context = Context::default();
        let builder = RequestBuilder::new(&event, &context);
        assert_eq!(builder.body().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_base64_body_decodes() {
        let mut payload = base_event();
        payload["body"] = json!("aGVsbG8=");
        payload["isBase64Encoded"] = json!(true);
        let event = event(payload);
        let context = Context::default();
        let builder = RequestBuilder::new(&event, &context);
        assert_eq!(builder.body().unwrap(), b"hello");
    }

    #[test]
    fn test_malformed_base64_body_is_decoding_error() {
        let mut payload = base_event();
        payload["body"] = json!("not base64!!!");
        payload["isBase64Encoded"] = json!(true);
        let event = event(payload);
        let context = Context::default();
        let result = RequestBuilder::new(&event, &context).body();
        assert!(matches!(result, Err(AdapterError::Decoding(_))));
    }

    #[test]
    fn test_plain_body_passes_through_as_bytes() {
        let mut payload = base_event();
        payload["body"] = json!("plain text");
        let event = event(payload);
        let context = Context::default();
        let builder = RequestBuilder::new(&event, &context);
        assert_eq!(builder.body().unwrap(), b"plain text");
    }

    #[test]
    fn test_event_missing_http_method_is_malformed() {
        let result = AlbEvent::from_value(json!({"path": "/"}));
        assert!(matches!(result, Err(AdapterError::MalformedEvent(_))));
    }
}
