//! Lambda boundary glue.
//!
//! Parses the raw invocation payload, runs the request builder, invokes the
//! application handler and encodes its response back into the ALB reply
//! shape. Adapter and handler failures surface as `Diagnostic` values for the
//! runtime; the load balancer turns those into a 5xx reply.

use anyhow::Result;
use lambda_runtime::tracing::{error, info};
use lambda_runtime::{Diagnostic, LambdaEvent};
use serde_json::Value;

use crate::models::{AlbEvent, AlbRequest, HandlerResponse};
use crate::request::RequestBuilder;
use crate::response::ResponseEncoder;

/// Adapts one ALB invocation through an application handler.
///
/// The handler is a synchronous function from the normalized request and raw
/// body bytes to a [`HandlerResponse`]; the adapter owns no state across
/// invocations.
///
/// # Errors
///
/// Returns a `Diagnostic` with one of the following types:
///
/// - `MalformedEventError`: the event is missing required keys such as
///   `path` or `httpMethod`
/// - `DecodingError`: malformed base64 or percent-encoded data
/// - `HandlerError`: the application handler failed
/// - `SerializationError`: the reply could not be serialized
pub fn handle_event<H>(event: LambdaEvent<Value>, handler: H) -> Result<Value, Diagnostic>
where
    H: Fn(&AlbRequest<'_>, &[u8]) -> Result<HandlerResponse>,
{
    let (payload, context) = event.into_parts();
    let alb_event = AlbEvent::from_value(payload)?;

    let builder = RequestBuilder::new(&alb_event, &context);
    let request = builder.request()?;
    let body = builder.body()?;

    info!(method = %request.method, path = %request.path, "Invoking application handler");

    let response = handler(&request, &body).map_err(|e| {
        // Use {:#} to get the full error chain with causes
        error!(error = %format!("{e:#}"), "Application handler failed");
        Diagnostic {
            error_type: "HandlerError".to_string(),
            error_message: format!("{e:#}"),
        }
    })?;

    let reply = ResponseEncoder::new(&alb_event).transform_response(&response)?;

    serde_json::to_value(reply).map_err(|e| {
        error!(error = %e, "Failed to serialize reply");
        Diagnostic {
            error_type: "SerializationError".to_string(),
            error_message: format!("Failed to serialize reply: {e}"),
        }
    })
}
