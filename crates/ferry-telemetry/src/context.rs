//! Per-invocation correlation for trace entries.
//!
//! The bridge creates one [`RequestContext`] for each call, moves it into the
//! worker thread and holds a [`RequestGuard`] for the call's lifetime. Every
//! entry the operation (or its guest's `console`) emits is then tagged with
//! the same short id.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identity and timing of one invocation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique invocation id.
    pub request_id: Uuid,
    /// Operation name as the caller requested it.
    pub operation: String,
    /// Sequence number of the worker serving the call.
    pub worker: Option<u64>,
    /// Number of arguments the caller passed.
    pub arg_count: usize,
    /// When the invocation was accepted.
    pub started_at: DateTime<Utc>,
}

impl RequestContext {
    /// Context for a call to `operation`.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            operation: operation.into(),
            worker: None,
            arg_count: 0,
            started_at: Utc::now(),
        }
    }

    /// Record the serving worker.
    #[must_use]
    pub fn with_worker(mut self, worker: u64) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Record the argument count.
    #[must_use]
    pub fn with_arg_count(mut self, count: usize) -> Self {
        self.arg_count = count;
        self
    }

    /// First eight hex digits of the id.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.request_id.simple().to_string().chars().take(8).collect()
    }

    /// Milliseconds since the invocation was accepted.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }

    /// Span tagging entries with this invocation.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "invocation",
            id = %self.short_id(),
            operation = %self.operation,
            worker = self.worker,
            args = self.arg_count,
        )
    }
}

/// Keeps an invocation's span entered and logs its duration on drop.
pub struct RequestGuard {
    context: RequestContext,
    _span: tracing::span::EnteredSpan,
}

impl RequestGuard {
    /// Enter the span of `context`.
    #[must_use]
    pub fn new(context: RequestContext) -> Self {
        let span = context.span().entered();
        tracing::debug!("Invocation started");
        Self {
            context,
            _span: span,
        }
    }

    /// The guarded context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        tracing::debug!(elapsed_ms = self.context.elapsed_ms(), "Invocation finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_records_call_shape() {
        let ctx = RequestContext::new("transformData")
            .with_worker(7)
            .with_arg_count(2);

        assert_eq!(ctx.operation, "transformData");
        assert_eq!(ctx.worker, Some(7));
        assert_eq!(ctx.arg_count, 2);
    }

    #[test]
    fn ids_are_unique_and_short_form_is_a_prefix() {
        let a = RequestContext::new("healthCheck");
        let b = RequestContext::new("healthCheck");
        assert_ne!(a.request_id, b.request_id);

        let short = a.short_id();
        assert_eq!(short.len(), 8);
        assert!(a.request_id.simple().to_string().starts_with(&short));
    }

    #[test]
    fn elapsed_grows() {
        let ctx = RequestContext::new("slow");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed_ms() >= 10);
    }

    #[test]
    fn guard_holds_its_context() {
        let ctx = RequestContext::new("evaluateScript").with_worker(1);
        let id = ctx.request_id;
        let guard = RequestGuard::new(ctx);
        assert_eq!(guard.context().request_id, id);
    }
}
