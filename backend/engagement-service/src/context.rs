/// Per-request identity and deadline context
///
/// Every operation receives a `RequestContext` from the routing layer: the
/// authenticated actor (if any) and an optional deadline that bounds all
/// store accesses performed on its behalf.
use std::future::Future;
use std::time::Duration;

use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    actor: Option<Uuid>,
    deadline: Option<Duration>,
}

impl RequestContext {
    /// Context without an authenticated actor (anonymous-allowed reads)
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for an authenticated actor
    pub fn for_actor(actor: Uuid) -> Self {
        Self {
            actor: Some(actor),
            deadline: None,
        }
    }

    /// Bound every store access made under this context by `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn actor(&self) -> Option<Uuid> {
        self.actor
    }

    /// The authenticated actor, or `Unauthenticated` when absent
    pub fn require_actor(&self) -> Result<Uuid> {
        self.actor
            .ok_or_else(|| AppError::Unauthenticated("an authenticated actor is required".to_string()))
    }

    /// Run `fut` under this context's deadline
    ///
    /// On expiry the operation fails `Unavailable`. Mutations in this core
    /// are single-row, so an expired deadline never leaves a partial write.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, fut)
                .await
                .map_err(|_| AppError::Unavailable("operation deadline exceeded".to_string()))?,
            None => fut.await,
        }
    }
}
