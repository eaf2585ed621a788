use std::future::Future;
use std::sync::Arc;

use payload_store::PayloadStore;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::metrics::{OperationMetrics, OperationTimer, Outcome};

/// Everything a client handle needs to issue store calls.
#[derive(Clone)]
pub(crate) struct ClientContext {
    pub(crate) store: Arc<dyn PayloadStore>,
    pub(crate) config: Arc<ClientConfig>,
    metrics: Arc<dyn OperationMetrics>,
    cancel: CancellationToken,
}

impl ClientContext {
    pub(crate) fn new(
        store: Arc<dyn PayloadStore>,
        config: ClientConfig,
        metrics: Arc<dyn OperationMetrics>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            metrics,
            cancel: CancellationToken::new(),
        }
    }

    pub(crate) fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Context for a handle derived from this one; cancelling this context
    /// cancels the child too.
    pub(crate) fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            ..self.clone()
        }
    }

    pub(crate) fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..self.clone()
        }
    }

    /// Run one operation under a timer, racing it against the cancellation token.
    pub(crate) async fn run<T, F>(&self, operation: &'static str, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let timer = OperationTimer::start(Arc::clone(&self.metrics), operation);
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(operation, "operation cancelled before the store answered");
                Err(ClientError::Cancelled(operation))
            }
            result = fut => result,
        };
        timer.finish(match &result {
            Ok(_) => Outcome::Success,
            Err(ClientError::Cancelled(_)) => Outcome::Cancelled,
            Err(_) => Outcome::Failure,
        });
        result
    }
}
