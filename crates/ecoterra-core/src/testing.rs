//! Test doubles for the transport and storage seams.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};

enum Reply {
    Respond(ApiResponse),
    Fail,
}

/// Answers each path from a queue of scripted replies and records every
/// request. An unscripted path fails like an unreachable server.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &'static str, status: u16, body: Value) {
        self.push(path, Reply::Respond(ApiResponse::new(status, body)));
    }

    pub fn fail(&self, path: &'static str) {
        self.push(path, Reply::Fail);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    fn push(&self, path: &'static str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(path)
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(request.path)
            .and_then(VecDeque::pop_front);
        self.requests.lock().unwrap().push(request);
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail) | None => Err(unreachable_error()),
        }
    }
}

/// A `TransportError::Network` like the one a dead host produces. reqwest
/// errors cannot be built directly, so this comes from a request whose URL
/// does not parse.
pub fn unreachable_error() -> TransportError {
    match reqwest::Client::new().get("http://").build() {
        Err(e) => TransportError::Network(e),
        Ok(_) => panic!("request without a host should not build"),
    }
}

/// In-memory store whose reads or writes can be made to fail per key.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_reads_of(&self, key: &str) {
        self.failing_reads.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_writes_of(&self, key: &str) {
        self.failing_writes.lock().unwrap().insert(key.to_string());
    }

    fn check(set: &Mutex<HashSet<String>>, key: &str) -> StorageResult<()> {
        if set.lock().unwrap().contains(key) {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Self::check(&self.failing_reads, key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        Self::check(&self.failing_writes, key)?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        Self::check(&self.failing_writes, key)?;
        self.inner.remove(key).await
    }
}

/// Successful login body as the backend sends it.
pub fn login_body(token: &str) -> Value {
    json!({
        "message": "ok",
        "user": {
            "id": 1,
            "fullName": "A",
            "email": "user@test.com",
            "username": "a",
            "category": "guru",
            "token": token
        }
    })
}

pub fn profile_json() -> String {
    json!({
        "id": 1,
        "fullName": "A",
        "email": "user@test.com",
        "username": "a",
        "category": "guru"
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::USER_PATH;

    #[tokio::test]
    async fn test_scripted_failure_is_a_network_error() {
        let transport = ScriptedTransport::new();
        transport.fail(USER_PATH);

        let scripted = transport.send(ApiRequest::get(USER_PATH)).await.unwrap_err();
        let unscripted = transport.send(ApiRequest::get(USER_PATH)).await.unwrap_err();

        assert!(matches!(scripted, TransportError::Network(_)));
        assert!(matches!(unscripted, TransportError::Network(_)));
        assert_eq!(transport.requests().len(), 2);
    }
}
