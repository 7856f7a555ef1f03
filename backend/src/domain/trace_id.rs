//! Correlation id carried by every request and stamped onto error payloads.
//!
//! The [`Trace`](crate::Trace) middleware opens a scope per request; anything
//! running inside it (handlers, services, [`Error`](crate::domain::Error)
//! construction) reads the id with [`TraceId::current`]. Task-locals do not
//! follow `tokio::spawn` or `spawn_blocking`, so detached work that must log
//! under the request id re-enters [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Request and response header carrying the trace id.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// UUID correlating one request's logs, error body, and `trace-id` header.
///
/// # Examples
/// ```
/// use textbook_api::domain::TraceId;
///
/// let upstream = "6f1c1d2e-8f7a-4d8b-9a51-0a6c2b7f4e10";
/// assert_eq!(TraceId::adopt_or_generate(Some(upstream)).to_string(), upstream);
/// assert_ne!(TraceId::adopt_or_generate(Some("req-17")).to_string(), "req-17");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse an id forwarded by an upstream proxy when it is a UUID,
    /// otherwise mint a fresh one.
    #[must_use]
    pub fn adopt_or_generate(forwarded: Option<&str>) -> Self {
        forwarded
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// Id of the request currently being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    pub async fn scope<Fut: Future>(trace_id: TraceId, fut: Fut) -> Fut::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FORWARDED: &str = "6f1c1d2e-8f7a-4d8b-9a51-0a6c2b7f4e10";

    #[rstest]
    #[case(Some(FORWARDED))]
    #[case(Some("  6f1c1d2e-8f7a-4d8b-9a51-0a6c2b7f4e10 "))]
    fn forwarded_uuid_is_adopted(#[case] forwarded: Option<&str>) {
        assert_eq!(
            TraceId::adopt_or_generate(forwarded).to_string(),
            FORWARDED
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("gateway-42"))]
    fn unusable_forwarded_value_mints_fresh_id(#[case] forwarded: Option<&str>) {
        let minted = TraceId::adopt_or_generate(forwarded).to_string();
        assert!(Uuid::parse_str(&minted).is_ok());
        assert_ne!(Some(minted.as_str()), forwarded);
    }

    #[rstest]
    #[tokio::test]
    async fn scope_sets_and_clears_current() {
        let id = TraceId::generate();
        assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
        assert!(TraceId::current().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn spawned_tasks_do_not_inherit_scope() {
        let id = TraceId::generate();
        let inner = TraceId::scope(id, async {
            tokio::spawn(async { TraceId::current() })
                .await
                .expect("task joins")
        })
        .await;
        assert!(inner.is_none());
    }
}
