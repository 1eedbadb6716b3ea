use std::sync::Arc;

/// Outcome of applying a helper operator to an event.
///
/// Both variants carry the trace line precomputed when the helper was built.
/// A failure guarantees the event was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperResult {
    Success(Arc<str>),
    Failure(Arc<str>),
}

impl HelperResult {
    /// Returns true for the success variant.
    pub fn succeeded(&self) -> bool {
        matches!(self, HelperResult::Success(_))
    }

    /// Returns the trace line regardless of outcome.
    pub fn trace(&self) -> &str {
        match self {
            HelperResult::Success(trace) | HelperResult::Failure(trace) => trace,
        }
    }
}
