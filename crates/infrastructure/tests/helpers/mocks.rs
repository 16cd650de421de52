use async_trait::async_trait;
use ferrous_names_application::ports::{DurableStore, NameService, RpcTransport};
use ferrous_names_domain::{
    CacheEntry, DomainError, DomainSuffix, RpcRequest, RpcResponse,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum ServiceBehavior {
    Answer,
    RateLimited,
    NetworkError,
}

/// Name service answering from fixed tables, counting every call.
pub struct MockNameService {
    suffix: DomainSuffix,
    owners: Mutex<HashMap<String, String>>,
    domains: Mutex<HashMap<String, Vec<String>>>,
    behavior: Mutex<ServiceBehavior>,
    latency: Duration,
    pub resolve_calls: AtomicUsize,
    pub reverse_calls: AtomicUsize,
}

impl MockNameService {
    pub fn new(suffix: DomainSuffix) -> Self {
        Self {
            suffix,
            owners: Mutex::new(HashMap::new()),
            domains: Mutex::new(HashMap::new()),
            behavior: Mutex::new(ServiceBehavior::Answer),
            latency: Duration::from_millis(10),
            resolve_calls: AtomicUsize::new(0),
            reverse_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_domain(self, domain: &str, owner: &str) -> Self {
        self.owners
            .lock()
            .unwrap()
            .insert(domain.to_string(), owner.to_string());
        self.domains
            .lock()
            .unwrap()
            .entry(owner.to_string())
            .or_default()
            .push(domain.to_string());
        self
    }

    pub fn set_behavior(&self, behavior: ServiceBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn total_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst) + self.reverse_calls.load(Ordering::SeqCst)
    }

    fn check_behavior(&self) -> Result<(), DomainError> {
        match *self.behavior.lock().unwrap() {
            ServiceBehavior::Answer => Ok(()),
            ServiceBehavior::RateLimited => {
                Err(DomainError::RateLimited("429 Too Many Requests".into()))
            }
            ServiceBehavior::NetworkError => {
                Err(DomainError::Network("connection refused".into()))
            }
        }
    }
}

#[async_trait]
impl NameService for MockNameService {
    fn suffix(&self) -> DomainSuffix {
        self.suffix
    }

    async fn resolve_owner(&self, domain: &str) -> Result<Option<String>, DomainError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.check_behavior()?;
        Ok(self.owners.lock().unwrap().get(domain).cloned())
    }

    async fn domains_owned_by(&self, address: &str) -> Result<Vec<String>, DomainError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.check_behavior()?;
        Ok(self
            .domains
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory durable store that can be switched into a failing state.
#[derive(Default)]
pub struct MockDurableStore {
    rows: Mutex<HashMap<String, CacheEntry>>,
    failing: AtomicBool,
    get_delay: Mutex<Option<Duration>>,
    pub puts: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MockDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<CacheEntry>) -> Self {
        let store = Self::new();
        {
            let mut map = store.rows.lock().unwrap();
            for row in rows {
                map.insert(row.key.clone(), row);
            }
        }
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delays `get` after the row has been read, so writes made meanwhile
    /// are not observed by that read.
    pub fn set_get_delay(&self, delay: Duration) {
        *self.get_delay.lock().unwrap() = Some(delay);
    }

    pub fn row(&self, key: &str) -> Option<CacheEntry> {
        self.rows.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(DomainError::StorageUnavailable("disk I/O error".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DurableStore for MockDurableStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, DomainError> {
        self.check()?;
        let row = self.rows.lock().unwrap().get(key).cloned();
        let delay = *self.get_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(row)
    }

    async fn put(&self, entry: &CacheEntry) -> Result<(), DomainError> {
        self.check()?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        self.check()?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().remove(key);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<CacheEntry>, DomainError> {
        self.check()?;
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
}

/// Replays scripted responses and records every request it receives.
#[derive(Default)]
pub struct MockRpcTransport {
    responses: Mutex<VecDeque<Result<RpcResponse, DomainError>>>,
    pub requests: Mutex<Vec<RpcRequest>>,
}

impl MockRpcTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: Result<RpcResponse, DomainError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RpcTransport for MockRpcTransport {
    async fn call(&self, request: &RpcRequest) -> Result<RpcResponse, DomainError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(RpcResponse::ProgramAccounts(Vec::new())))
    }

    fn endpoint(&self) -> &str {
        "mock://rpc"
    }
}
