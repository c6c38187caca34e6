//! Encodes a handler response into the reply shape the load balancer expects.
//!
//! The tricky part is duplicate response headers. ALB target groups either
//! accept a native `multiValueHeaders` map or only a single-valued `headers`
//! map. In the single-valued case, duplicate values for one header name are
//! still conveyed by inserting each value under a distinct case permutation
//! of the name, a long-standing workaround inherited from
//! <https://github.com/logandk/serverless-wsgi/issues/11>.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use lambda_runtime::tracing::debug;
use std::collections::HashMap;

use crate::casing::all_casings;
use crate::models::{AdapterError, AlbEvent, AlbReply, HandlerResponse};

/// Content types whose bodies are sent as plain text rather than base64.
const TEXT_MIME_TYPES: [&str; 5] = [
    "application/json",
    "application/javascript",
    "application/xml",
    "application/vnd.api+json",
    "application/vnd.oai.openapi",
];

/// Reads a normalized response and produces the ALB reply structure.
#[derive(Debug, Clone, Copy)]
pub struct ResponseEncoder<'a> {
    event: &'a AlbEvent,
}

impl<'a> ResponseEncoder<'a> {
    #[must_use]
    pub const fn new(event: &'a AlbEvent) -> Self {
        Self { event }
    }

    /// Transforms a handler response into the reply returned to the load
    /// balancer.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Decoding`] if a text-typed body is not valid
    /// UTF-8.
    pub fn transform_response(&self, response: &HandlerResponse) -> Result<AlbReply, AdapterError> {
        let (headers, multi_value_headers) = self.handle_headers(&response.headers);
        let (body, is_base64_encoded) = encode_body(&response.body, &response.headers)?;

        debug!(
            status = response.status,
            is_base64_encoded, "Encoded ALB reply"
        );

        Ok(AlbReply {
            status_code: response.status,
            headers,
            multi_value_headers,
            body,
            is_base64_encoded,
        })
    }

    /// Flattens response header pairs into the reply's two header maps.
    ///
    /// With native multi-value support every header travels in
    /// `multiValueHeaders` as an ordered value list and the single-valued map
    /// stays empty. Without it, duplicated names are spread over case
    /// permutations of the name in the single-valued map; values beyond the
    /// `2^letters` representable casings are dropped.
    fn handle_headers(
        &self,
        pairs: &[(String, String)],
    ) -> (HashMap<String, String>, HashMap<String, Vec<String>>) {
        let (mut single, multi) = split_headers(pairs);

        if self.event.supports_multi_value_headers() {
            return (HashMap::new(), multi);
        }

        for (name, values) in &multi {
            if values.len() > 1 {
                // The all-lowercase casing comes first and replaces the
                // last-seen value already in the map with the first one.
                for (value, cased_name) in values.iter().zip(all_casings(name)) {
                    single.insert(cased_name, value.clone());
                }
            }
        }

        (single, HashMap::new())
    }
}

/// Partitions header pairs into a single-valued map (last value wins) and a
/// multi-value map holding every value per lower-cased name, in order.
fn split_headers(
    pairs: &[(String, String)],
) -> (HashMap<String, String>, HashMap<String, Vec<String>>) {
    let mut single = HashMap::new();
    let mut multi: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in pairs {
        let name = name.to_lowercase();
        single.insert(name.clone(), value.clone());
        multi.entry(name).or_default().push(value.clone());
    }
    (single, multi)
}

/// Decides base64 framing for the reply body.
///
/// Text content types pass through as UTF-8 strings; anything else is
/// base64-encoded with the flag set. The content type is read from the
/// response's own headers, last occurrence winning.
fn encode_body(
    body: &[u8],
    headers: &[(String, String)],
) -> Result<(String, bool), AdapterError> {
    if body.is_empty() {
        return Ok((String::new(), false));
    }

    let content_type = headers
        .iter()
        .rev()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .map(|(_, v)| v.as_str());

    let is_text = content_type
        .is_some_and(|ct| ct.starts_with("text/") || TEXT_MIME_TYPES.contains(&ct));

    if is_text {
        let text = std::str::from_utf8(body)
            .map_err(|e| AdapterError::Decoding(format!("text body is not valid UTF-8: {e}")))?;
        Ok((text.to_string(), false))
    } else {
        Ok((STANDARD.encode(body), true))
    }
}
