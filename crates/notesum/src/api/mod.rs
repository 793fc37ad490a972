//! Plumbing shared by the HTTP summarization providers.
//!
//! - [`retry`] — transient error detection (429, 5xx, network timeouts) and a
//!   bounded retry loop with backoff. Never retries 400/401/403 errors.
//! - [`errors`] — maps HTTP statuses and transport failures to messages a
//!   note author can act on.

pub mod errors;
pub mod retry;

pub use retry::{RetryConfig, with_retry};
