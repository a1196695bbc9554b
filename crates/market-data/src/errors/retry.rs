/// Classification for retry policy.
///
/// Used by the ingestion engine to decide whether another attempt
/// against the same provider is worthwhile.
///
/// | Class | Retry after backoff? |
/// |-------|----------------------|
/// | `Never` | No |
/// | `WithBackoff` | Yes, until the attempt bound is reached |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad symbol, undecodable payload, or terminal failure.
    /// The request is fundamentally invalid and retrying won't help.
    Never,

    /// Transient failure such as a timeout, rate limiting or a dropped connection.
    /// Wait for the configured delay and try again.
    WithBackoff,
}

impl RetryClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, RetryClass::WithBackoff)
    }
}
