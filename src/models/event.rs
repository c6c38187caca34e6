use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::error::AdapterError;

/// The invocation event an Application Load Balancer delivers to a Lambda
/// target, as documented at
/// <https://docs.aws.amazon.com/lambda/latest/dg/services-alb.html>.
///
/// Header and query maps preserve the document order of the raw event so the
/// normalized request can keep source header order. The `multiValueHeaders`
/// key is a support flag: its presence means the target group accepts native
/// multi-value headers, and its content is otherwise ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbEvent {
    pub path: String,
    pub http_method: String,
    #[serde(default)]
    pub headers: Option<Map<String, Value>>,
    #[serde(default)]
    pub query_string_parameters: Option<Map<String, Value>>,
    #[serde(default)]
    pub multi_value_query_string_parameters: Option<Map<String, Value>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub multi_value_headers: Option<Value>,
}

impl AlbEvent {
    /// Parses a raw event payload into a typed ALB event.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MalformedEvent`] if required keys such as
    /// `path` or `httpMethod` are missing or have the wrong type.
    pub fn from_value(payload: Value) -> Result<Self, AdapterError> {
        serde_json::from_value(payload)
            .map_err(|e| AdapterError::MalformedEvent(format!("failed to parse ALB event: {e}")))
    }

    /// Whether the target group supports native multi-value headers.
    ///
    /// Only the presence of the `multiValueHeaders` key matters.
    #[must_use]
    pub const fn supports_multi_value_headers(&self) -> bool {
        self.multi_value_headers.is_some()
    }
}
