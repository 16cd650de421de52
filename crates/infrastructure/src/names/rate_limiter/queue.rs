use ferrous_names_domain::{DomainError, RequestPriority};
use futures::future::BoxFuture;
use std::any::Any;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tokio::time::Instant;

/// Type-erased operation result; recovered with `Arc::downcast` by the caller.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Re-runnable unit of upstream work. Called once per attempt.
pub type Operation =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Payload, DomainError>> + Send + Sync>;

pub struct QueuedRequest {
    pub ticket: u64,
    pub id: Arc<str>,
    pub priority: RequestPriority,
    pub retry_count: u32,
    pub enqueued_at: Instant,
    pub operation: Operation,
    seq: u64,
}

impl QueuedRequest {
    pub fn new(
        ticket: u64,
        id: Arc<str>,
        priority: RequestPriority,
        operation: Operation,
        now: Instant,
    ) -> Self {
        Self {
            ticket,
            id,
            priority,
            retry_count: 0,
            enqueued_at: now,
            operation,
            seq: 0,
        }
    }
}

impl PartialEq for QueuedRequest {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedRequest {}

impl PartialOrd for QueuedRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Max-heap: higher priority first, then lower sequence number (FIFO).
impl Ord for QueuedRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .weight()
            .cmp(&other.priority.weight())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Strict-priority queue, FIFO within a tier. A re-inserted retry takes a
/// fresh sequence number and goes to the back of its tier.
#[derive(Default)]
pub struct RequestQueue {
    heap: BinaryHeap<QueuedRequest>,
    next_seq: u64,
}

impl RequestQueue {
    pub fn push(&mut self, mut request: QueuedRequest) {
        request.seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(request);
    }

    pub fn pop(&mut self) -> Option<QueuedRequest> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn drain(&mut self) -> Vec<QueuedRequest> {
        self.heap.drain().collect()
    }
}
