/// HTTP client for the remote twin backend
///
/// The backend exposes two endpoints:
///
/// - `GET /health` - readiness probe, used once to warm the backend up
/// - `POST /chat` - `{message, session_id?}` in, `{session_id, response}` out
///
/// Both calls authenticate with a static `x-api-key` header.
///
/// # Usage
///
/// ```rust,no_run
/// use twin::api::{ChatBackend, ChatRequest, TwinApi};
///
/// # async fn example() -> twin::api::ApiResult<()> {
/// let api = TwinApi::from_env();
/// api.health().await?;
/// let reply = api
///     .chat(&ChatRequest { message: "Hello!".into(), session_id: None })
///     .await?;
/// println!("{}", reply.response);
/// # Ok(())
/// # }
/// ```
mod client;
mod error;

pub use client::{API_KEY_HEADER, ChatBackend, ChatReply, ChatRequest, TwinApi};
pub use error::{ApiError, ApiResult};
