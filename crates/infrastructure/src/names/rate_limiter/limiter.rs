use super::backoff::BackoffPolicy;
use super::circuit_breaker::{CircuitBreaker, CircuitBreakerState};
use super::queue::{Operation, Payload, QueuedRequest, RequestQueue};
use ferrous_names_domain::config::RateLimitConfig;
use ferrous_names_domain::{DomainError, RequestPriority};
use futures::FutureExt;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type Waiter = oneshot::Sender<Result<Payload, DomainError>>;

struct PendingRequest {
    ticket: u64,
    waiters: Vec<Waiter>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    total: u64,
    successful: u64,
    failed: u64,
    rate_limited: u64,
    deduplicated: u64,
    delay_total: Duration,
    delay_samples: u64,
}

struct LimiterState {
    queue: RequestQueue,
    pending: FxHashMap<Arc<str>, PendingRequest>,
    backing_off: FxHashSet<u64>,
    breaker: CircuitBreaker,
    executing: Option<u64>,
    last_request_at: Option<Instant>,
    next_ticket: u64,
    counters: Counters,
}

impl LimiterState {
    /// Removes the pending request owning `ticket` and hands `result` to all
    /// of its waiters.
    fn settle(&mut self, id: &Arc<str>, ticket: u64, result: Result<Payload, DomainError>) {
        let owned = self.pending.get(id).is_some_and(|p| p.ticket == ticket);
        if !owned {
            return;
        }
        if let Some(pending) = self.pending.remove(id) {
            for waiter in pending.waiters {
                let _ = waiter.send(result.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub rate_limited_requests: u64,
    pub deduplicated_requests: u64,
    pub queue_length: usize,
    pub in_backoff: usize,
    pub circuit_open: bool,
    pub consecutive_failures: u32,
    pub average_delay_ms: f64,
}

struct Inner {
    state: Mutex<LimiterState>,
    notify: Notify,
    shutdown: CancellationToken,
    min_interval: Duration,
    max_retries: u32,
    backoff: BackoffPolicy,
    reject_while_open: bool,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Process-wide scheduler for upstream calls.
///
/// Every request runs through a single worker: strict priority with FIFO
/// inside a tier, a minimum spacing between dispatches, retries with
/// exponential backoff for throttling failures and a circuit breaker that
/// pauses dispatching after repeated throttling. Requests sharing an id
/// while one is pending are coalesced into a single execution.
pub struct GlobalRateLimiter {
    inner: Arc<Inner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl GlobalRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_shutdown(config, CancellationToken::new())
    }

    pub fn with_shutdown(config: &RateLimitConfig, shutdown: CancellationToken) -> Self {
        let state = LimiterState {
            queue: RequestQueue::default(),
            pending: FxHashMap::default(),
            backing_off: FxHashSet::default(),
            breaker: CircuitBreaker::new(
                config.circuit_breaker_threshold,
                config.circuit_breaker_cooldown(),
            ),
            executing: None,
            last_request_at: None,
            next_ticket: 0,
            counters: Counters::default(),
        };

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                notify: Notify::new(),
                shutdown: shutdown.child_token(),
                min_interval: config.min_request_interval(),
                max_retries: config.max_retries,
                backoff: BackoffPolicy::new(
                    config.base_delay(),
                    config.max_delay(),
                    config.jitter_ratio,
                ),
                reject_while_open: config.reject_while_open,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Spawns the worker. Idempotent; a disposed limiter stays stopped.
    pub fn start(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        *worker = Some(tokio::spawn(run_worker(inner)));
        info!(
            min_interval_ms = self.inner.min_interval.as_millis() as u64,
            max_retries = self.inner.max_retries,
            "Global rate limiter started"
        );
    }

    pub fn is_running(&self) -> bool {
        !self.inner.shutdown.is_cancelled()
            && self
                .worker
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
    }

    /// Stops the worker and rejects everything still queued or backing off
    /// with `LimiterStopped`.
    pub fn dispose(&self) {
        self.inner.shutdown.cancel();
        let rejected = {
            let mut state = self.inner.lock();
            state.queue.drain();
            state.backing_off.clear();
            state.executing = None;
            state.pending.drain().collect::<Vec<_>>()
        };
        let count = rejected.len();
        for (_, request) in rejected {
            for waiter in request.waiters {
                let _ = waiter.send(Err(DomainError::LimiterStopped));
            }
        }
        if let Some(handle) = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        info!(rejected = count, "Global rate limiter disposed");
    }

    /// Schedules `operation` under `request_id` and waits for its result.
    ///
    /// If a request with the same id is already pending, the caller joins it
    /// and `operation` is dropped unused. Starts the worker on first use.
    pub async fn enqueue<T, F, Fut>(
        &self,
        request_id: impl Into<String>,
        priority: RequestPriority,
        operation: F,
    ) -> Result<T, DomainError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
    {
        let id: Arc<str> = Arc::from(request_id.into());
        let rx = self.register(Arc::clone(&id), priority, erase(operation))?;

        self.start();
        self.inner.notify.notify_one();

        let payload = rx.await.map_err(|_| DomainError::LimiterStopped)??;
        payload
            .downcast::<T>()
            .map(|value| T::clone(&value))
            .map_err(|_| DomainError::ResultTypeMismatch(id.to_string()))
    }

    fn register(
        &self,
        id: Arc<str>,
        priority: RequestPriority,
        operation: Operation,
    ) -> Result<oneshot::Receiver<Result<Payload, DomainError>>, DomainError> {
        if self.inner.shutdown.is_cancelled() {
            return Err(DomainError::LimiterStopped);
        }

        let now = Instant::now();
        let mut state = self.inner.lock();

        if self.inner.reject_while_open {
            if let Some(remaining) = state.breaker.remaining_cooldown(now) {
                return Err(DomainError::CircuitOpen {
                    remaining_ms: remaining.as_millis() as u64,
                });
            }
        }

        let (tx, rx) = oneshot::channel();
        if let Some(pending) = state.pending.get_mut(&id) {
            pending.waiters.push(tx);
            state.counters.deduplicated += 1;
            debug!(request_id = %id, "Joined pending request");
            return Ok(rx);
        }

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.counters.total += 1;
        state.pending.insert(
            Arc::clone(&id),
            PendingRequest {
                ticket,
                waiters: vec![tx],
            },
        );
        state
            .queue
            .push(QueuedRequest::new(ticket, id, priority, operation, now));
        Ok(rx)
    }

    /// Rejects every queued or backing-off request with `QueueCleared`.
    /// The request currently executing is left to finish.
    pub fn clear_queue(&self) -> usize {
        let rejected: Vec<_> = {
            let mut state = self.inner.lock();
            state.queue.drain();
            state.backing_off.clear();
            let executing = state.executing;
            let ids: Vec<Arc<str>> = state
                .pending
                .iter()
                .filter(|(_, p)| Some(p.ticket) != executing)
                .map(|(id, _)| Arc::clone(id))
                .collect();
            ids.into_iter()
                .filter_map(|id| state.pending.remove(&id).map(|p| (id, p)))
                .collect()
        };

        let count = rejected.len();
        for (id, request) in rejected {
            for waiter in request.waiters {
                let _ = waiter.send(Err(DomainError::QueueCleared(id.to_string())));
            }
        }
        if count > 0 {
            warn!(rejected = count, "Rate limiter queue cleared");
        }
        count
    }

    pub fn circuit_state(&self) -> CircuitBreakerState {
        let mut state = self.inner.lock();
        state.breaker.is_open(Instant::now());
        state.breaker.state()
    }

    pub fn stats(&self) -> RateLimiterStats {
        let mut state = self.inner.lock();
        let circuit_open = state.breaker.is_open(Instant::now());
        let counters = state.counters;
        let average_delay_ms = if counters.delay_samples == 0 {
            0.0
        } else {
            counters.delay_total.as_secs_f64() * 1000.0 / counters.delay_samples as f64
        };

        RateLimiterStats {
            total_requests: counters.total,
            successful_requests: counters.successful,
            failed_requests: counters.failed,
            rate_limited_requests: counters.rate_limited,
            deduplicated_requests: counters.deduplicated,
            queue_length: state.queue.len(),
            in_backoff: state.backing_off.len(),
            circuit_open,
            consecutive_failures: state.breaker.state().consecutive_failures,
            average_delay_ms,
        }
    }
}

impl Drop for GlobalRateLimiter {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

fn erase<T, F, Fut>(operation: F) -> Operation
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
{
    Arc::new(move || {
        operation()
            .map(|result| result.map(|value| Arc::new(value) as Payload))
            .boxed()
    })
}

enum Step {
    Wait(Duration),
    Idle,
    Run(QueuedRequest),
}

fn next_step(inner: &Inner) -> Step {
    let now = Instant::now();
    let mut state = inner.lock();

    if let Some(remaining) = state.breaker.remaining_cooldown(now) {
        return Step::Wait(remaining);
    }
    if state.queue.is_empty() {
        return Step::Idle;
    }
    if let Some(last) = state.last_request_at {
        let ready_at = last + inner.min_interval;
        if ready_at > now {
            return Step::Wait(ready_at - now);
        }
    }

    let Some(request) = state.queue.pop() else {
        return Step::Idle;
    };
    if let Some(last) = state.last_request_at {
        state.counters.delay_total += now - last;
        state.counters.delay_samples += 1;
    }
    state.last_request_at = Some(now);
    state.executing = Some(request.ticket);
    Step::Run(request)
}

async fn run_worker(inner: Arc<Inner>) {
    loop {
        if inner.shutdown.is_cancelled() {
            break;
        }

        match next_step(&inner) {
            Step::Wait(delay) => {
                tokio::select! {
                    _ = inner.shutdown.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Step::Idle => {
                tokio::select! {
                    _ = inner.shutdown.cancelled() => break,
                    _ = inner.notify.notified() => {}
                }
            }
            Step::Run(request) => {
                debug!(
                    request_id = %request.id,
                    priority = %request.priority,
                    attempt = request.retry_count + 1,
                    waited_ms = request.enqueued_at.elapsed().as_millis() as u64,
                    "Dispatching upstream request"
                );
                let result = tokio::select! {
                    _ = inner.shutdown.cancelled() => break,
                    result = (request.operation)() => result,
                };
                complete(&inner, request, result);
            }
        }
    }
    debug!("Rate limiter worker exited");
}

fn complete(inner: &Arc<Inner>, mut request: QueuedRequest, result: Result<Payload, DomainError>) {
    let now = Instant::now();
    let mut state = inner.lock();
    state.executing = None;

    match result {
        Ok(payload) => {
            state.counters.successful += 1;
            state.breaker.record_success();
            state.settle(&request.id, request.ticket, Ok(payload));
        }
        Err(err) if err.is_rate_limit() => {
            state.counters.rate_limited += 1;
            state.counters.failed += 1;
            state.breaker.record_failure(now);

            let still_pending = state
                .pending
                .get(&request.id)
                .is_some_and(|p| p.ticket == request.ticket);
            if !still_pending {
                return;
            }

            if request.retry_count < inner.max_retries {
                let delay = inner.backoff.jittered_delay_for(request.retry_count);
                request.retry_count += 1;
                state.backing_off.insert(request.ticket);
                drop(state);

                debug!(
                    request_id = %request.id,
                    retry = request.retry_count,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off"
                );
                schedule_retry(Arc::clone(inner), request, delay);
            } else {
                let attempts = request.retry_count + 1;
                warn!(request_id = %request.id, attempts, "Giving up on rate-limited request");
                let error = DomainError::RetriesExhausted {
                    id: request.id.to_string(),
                    attempts,
                };
                state.settle(&request.id, request.ticket, Err(error));
            }
        }
        Err(err) => {
            state.counters.failed += 1;
            debug!(request_id = %request.id, error = %err, "Upstream request failed");
            state.settle(&request.id, request.ticket, Err(err));
        }
    }
}

fn schedule_retry(inner: Arc<Inner>, request: QueuedRequest, delay: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = inner.shutdown.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        let requeued = {
            let mut state = inner.lock();
            // Gone from the backoff set means the queue was cleared meanwhile.
            if state.backing_off.remove(&request.ticket) {
                state.queue.push(request);
                true
            } else {
                false
            }
        };
        if requeued {
            inner.notify.notify_one();
        }
    });
}
