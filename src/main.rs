use anyhow::Result;
use aws_lambda_alb::{AlbRequest, HandlerResponse, handle_event};
use lambda_runtime::{Error, service_fn};

/// Minimal application handler used by the demo binary: echoes the request
/// line back to the caller.
fn echo(request: &AlbRequest<'_>, body: &[u8]) -> Result<HandlerResponse> {
    let text = format!(
        "{} {} ({} body bytes)\n",
        request.method,
        request.path,
        body.len()
    );
    Ok(HandlerResponse {
        status: 200,
        headers: vec![(
            "content-type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        )],
        body: text.into_bytes(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Use Lambda runtime's built-in tracing subscriber for CloudWatch Logs
    lambda_runtime::tracing::init_default_subscriber();

    lambda_runtime::run(service_fn(|event| async move { handle_event(event, echo) })).await
}
