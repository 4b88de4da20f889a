use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::{debug, info};

use crate::decision::ChatBackend;
use crate::error::DecisionError;

/// A request to be queued for LLM processing
struct QueuedRequest {
    system_prompt: String,
    user_input: String,
    response_tx: oneshot::Sender<Result<String, DecisionError>>,
}

/// LLM Queue that limits how many model requests are in flight at once.
///
/// A tick fans out one request per trader; the queue keeps that burst
/// within `max_concurrent` open connections. `request_timeout` bounds the
/// backend call only, not the time a request spends waiting for a slot.
/// Requests whose caller has gone away are dropped without being sent.
#[derive(Clone)]
pub struct LLMQueue {
    tx: mpsc::Sender<QueuedRequest>,
}

impl LLMQueue {
    /// Create a new LLM Queue and spawn its processor on the current runtime
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        max_concurrent: usize,
        queue_size: usize,
        request_timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<QueuedRequest>(queue_size.max(1));
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

        tokio::spawn(Self::process_queue(backend, semaphore, rx, request_timeout));

        Self { tx }
    }

    async fn process_queue(
        backend: Arc<dyn ChatBackend>,
        semaphore: Arc<Semaphore>,
        mut rx: mpsc::Receiver<QueuedRequest>,
        request_timeout: Duration,
    ) {
        info!(
            "📬 [QUEUE] LLM Queue processor started (max concurrent: {}, timeout: {:?})",
            semaphore.available_permits(),
            request_timeout
        );

        while let Some(request) = rx.recv().await {
            if request.response_tx.is_closed() {
                debug!("📬 [QUEUE] Dropping abandoned request");
                continue;
            }

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = request.response_tx.send(Err(DecisionError::QueueClosed));
                    continue;
                }
            };

            // The caller may have given up while we waited for a slot
            if request.response_tx.is_closed() {
                debug!("📬 [QUEUE] Dropping request abandoned while waiting for a slot");
                continue;
            }

            debug!(
                "📬 [QUEUE] Acquired permit. {} slots remaining",
                semaphore.available_permits()
            );

            let backend = backend.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let QueuedRequest {
                    system_prompt,
                    user_input,
                    mut response_tx,
                } = request;

                let call = tokio::time::timeout(request_timeout, backend.chat(&system_prompt, &user_input));
                let outcome = tokio::select! {
                    result = call => Some(result),
                    _ = response_tx.closed() => None,
                };

                match outcome {
                    Some(Ok(result)) => {
                        let _ = response_tx.send(result);
                    }
                    Some(Err(_)) => {
                        let _ = response_tx.send(Err(DecisionError::Timeout {
                            secs: request_timeout.as_secs(),
                        }));
                    }
                    None => debug!("📬 [QUEUE] Caller went away, cancelled in-flight request"),
                }
            });
        }

        info!("📬 [QUEUE] Channel closed, shutting down");
    }

    pub async fn chat(&self, system_prompt: &str, user_input: &str) -> Result<String, DecisionError> {
        let (response_tx, response_rx) = oneshot::channel();

        let request = QueuedRequest {
            system_prompt: system_prompt.to_string(),
            user_input: user_input.to_string(),
            response_tx,
        };

        self.tx
            .send(request)
            .await
            .map_err(|_| DecisionError::QueueClosed)?;

        response_rx.await.map_err(|_| DecisionError::QueueClosed)?
    }
}

#[async_trait]
impl ChatBackend for LLMQueue {
    async fn chat(&self, system_prompt: &str, user_input: &str) -> Result<String, DecisionError> {
        LLMQueue::chat(self, system_prompt, user_input).await
    }
}
