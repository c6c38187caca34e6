//! Event-shape adapter between AWS Application Load Balancer invocation
//! events and a generic HTTP request/response description.
//!
//! An ALB target group invokes a Lambda function with HTTP semantics folded
//! into a JSON event. This crate normalizes that event into a transport
//! agnostic request (canonical query string, lower-cased ordered headers,
//! decoded body) and encodes a generic response back into the reply shape
//! the load balancer expects, including the case-permutation workaround for
//! duplicate headers when the target group lacks native multi-value support.
//!
//! The adapter is a pure, stateless transform invoked once per event; the
//! [`handler`] module wires it to the Lambda runtime.

pub mod casing;
pub mod handler;
pub mod models;
pub mod request;
pub mod response;

pub use handler::handle_event;
pub use models::{AdapterError, AlbEvent, AlbReply, AlbRequest, HandlerResponse};
pub use request::RequestBuilder;
pub use response::ResponseEncoder;
