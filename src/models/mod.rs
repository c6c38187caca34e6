pub mod error;
pub mod event;
pub mod http;

pub use error::AdapterError;
pub use event::AlbEvent;
pub use http::{AlbReply, AlbRequest, HandlerResponse};
