use lambda_runtime::Context;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::event::AlbEvent;

/// Transport-agnostic view of one inbound HTTP request, normalized from an
/// ALB invocation event.
///
/// Header names are lower-cased and source order is preserved, with duplicate
/// occurrences kept as repeated pairs. The query string is re-encoded into a
/// canonical byte form with no leading `?`. The original event and invocation
/// context are carried as back-references for downstream consumers.
#[derive(Debug)]
pub struct AlbRequest<'a> {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub scheme: String,
    pub query_string: Vec<u8>,
    /// Server endpoint as (host, port)
    pub server: (String, u16),
    /// Client endpoint as (source ip, 0) - the source port is unknown
    pub client: (String, u16),
    pub event: &'a AlbEvent,
    pub context: &'a Context,
}

impl AlbRequest<'_> {
    /// Looks up a header by its lower-cased name.
    ///
    /// When the source event carried the same name more than once, the last
    /// occurrence wins, matching single-valued map semantics.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The response a downstream application handler produces.
///
/// Duplicate header names are allowed and their order is significant.
#[derive(Debug)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// The reply structure the load balancer expects back from the function.
///
/// Key names are part of the ALB contract and must serialize exactly as
/// `statusCode`, `headers`, `multiValueHeaders`, `body` and `isBase64Encoded`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbReply {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub multi_value_headers: HashMap<String, Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}
