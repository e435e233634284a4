use crate::stores::client::{publish_if_changed, split_path, StoreClient, StoreError};
use crate::stores::memory_store::{remove_at, set_at, value_at};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// A subscribed path: the snapshot channel and the task polling it
struct Subscription {
    sender: Arc<watch::Sender<Option<Value>>>,
    poller: JoinHandle<()>,
}

/// REST client for the hosted real-time database.
///
/// Every path maps to `{database_url}/{path}.json`. Subscriptions are served
/// by one polling task per path which republishes the snapshot when it changes.
/// Confirmed writes are applied to the subscribed snapshots right away, so a
/// caller never reads a value older than its own last write.
pub struct FirebaseClient {
    client: reqwest::Client,
    database_url: String,
    auth_token: Option<String>,
    poll_interval: Duration,
    subscriptions: DashMap<String, Subscription>,
    connected: Arc<watch::Sender<bool>>,
    local_writes: Arc<AtomicU64>,
}

impl FirebaseClient {
    pub fn new(
        database_url: &str,
        auth_token: Option<String>,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let database_url = database_url.trim_end_matches('/').to_string();
        if !database_url.starts_with("http://") && !database_url.starts_with("https://") {
            bail!("database_url must be an http(s) URL, got '{}'", database_url);
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let (connected, _) = watch::channel(false);

        Ok(Self {
            client,
            database_url,
            auth_token,
            poll_interval,
            subscriptions: DashMap::new(),
            connected: Arc::new(connected),
            local_writes: Arc::new(AtomicU64::new(0)),
        })
    }

    /// URL of the JSON document at `path`
    pub fn url_for(&self, path: &str) -> Result<String, StoreError> {
        let segments = split_path(path)?;
        Ok(format!("{}/{}.json", self.database_url, segments.join("/")))
    }

    /// Shallow read of the database root, used at startup to report whether
    /// the database holds any data yet
    pub async fn has_data(&self) -> Result<bool, StoreError> {
        let url = self.url_for("")?;
        let mut request = self.client.get(&url).query(&[("shallow", "true")]);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token)]);
        }
        let value = fetch(request).await?;
        Ok(!value.is_null())
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    fn mark(&self, ok: bool) {
        self.connected.send_if_modified(|current| {
            let changed = *current != ok;
            *current = ok;
            changed
        });
    }

    /// Apply a write the server accepted to every cached snapshot it touches.
    /// `None` removes.
    fn apply_local(&self, path: &str, value: Option<&Value>) {
        let Ok(written) = split_path(path) else {
            return;
        };
        self.local_writes.fetch_add(1, Ordering::AcqRel);

        for entry in self.subscriptions.iter() {
            let Ok(subscribed) = split_path(entry.key()) else {
                continue;
            };
            let sender = &entry.value().sender;

            if let Some(relative) = written.strip_prefix(subscribed.as_slice()) {
                let mut snapshot = sender.borrow().clone().unwrap_or(Value::Null);
                match value {
                    Some(value) => set_at(&mut snapshot, relative, value.clone()),
                    None => {
                        if remove_at(&mut snapshot, relative) {
                            snapshot = Value::Null;
                        }
                    }
                }
                let snapshot = if snapshot.is_null() { None } else { Some(snapshot) };
                publish_if_changed(sender, snapshot);
            } else if let Some(relative) = subscribed.strip_prefix(written.as_slice()) {
                publish_if_changed(sender, value.and_then(|v| value_at(v, relative)).cloned());
            }
        }
    }

    fn spawn_poller(&self, url: String, sender: Arc<watch::Sender<Option<Value>>>) -> JoinHandle<()> {
        let client = self.client.clone();
        let auth_token = self.auth_token.clone();
        let connected = Arc::clone(&self.connected);
        let local_writes = Arc::clone(&self.local_writes);
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let mut request = client.get(&url);
                if let Some(token) = &auth_token {
                    request = request.query(&[("auth", token)]);
                }

                let writes_before = local_writes.load(Ordering::Acquire);
                match fetch(request).await {
                    Ok(value) => {
                        connected.send_if_modified(|current| !std::mem::replace(current, true));

                        // A local write landed while this poll was in flight; the
                        // response may predate it, so wait for the next tick.
                        if local_writes.load(Ordering::Acquire) != writes_before {
                            debug!(url = %url, "Discarding poll overtaken by a local write");
                            continue;
                        }

                        let snapshot = if value.is_null() { None } else { Some(value) };
                        if publish_if_changed(&sender, snapshot) {
                            debug!(url = %url, "Subscription snapshot updated");
                        }
                    }
                    Err(e) => {
                        connected.send_if_modified(|current| std::mem::replace(current, false));
                        warn!(url = %url, error = %e, "Subscription poll failed");
                    }
                }
            }
        })
    }
}

impl Drop for FirebaseClient {
    fn drop(&mut self) {
        for entry in self.subscriptions.iter() {
            entry.value().poller.abort();
        }
    }
}

async fn fetch(request: reqwest::RequestBuilder) -> Result<Value, StoreError> {
    let response = request.send().await?;
    let response = check_status(response).await?;
    response
        .json::<Value>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl StoreClient for FirebaseClient {
    fn subscribe(&self, path: &str) -> Result<watch::Receiver<Option<Value>>, StoreError> {
        let key = split_path(path)?.join("/");
        let url = self.url_for(path)?;

        match self.subscriptions.entry(key) {
            Entry::Occupied(existing) => Ok(existing.get().sender.subscribe()),
            Entry::Vacant(slot) => {
                let (sender, receiver) = watch::channel(None);
                let sender = Arc::new(sender);
                let poller = self.spawn_poller(url, Arc::clone(&sender));
                slot.insert(Subscription { sender, poller });
                Ok(receiver)
            }
        }
    }

    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let url = self.url_for(path)?;
        let result = fetch(self.request(reqwest::Method::GET, &url)).await;
        self.mark(result.is_ok());
        let value = result?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let url = self.url_for(path)?;
        let result = match self.request(reqwest::Method::PUT, &url).json(&value).send().await {
            Ok(response) => check_status(response).await.map(|_| ()),
            Err(e) => Err(StoreError::from(e)),
        };
        self.mark(!matches!(result, Err(StoreError::Request(_))));
        if result.is_ok() {
            self.apply_local(path, if value.is_null() { None } else { Some(&value) });
        }
        result
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let url = self.url_for(path)?;
        let result = match self.request(reqwest::Method::DELETE, &url).send().await {
            Ok(response) => check_status(response).await.map(|_| ()),
            Err(e) => Err(StoreError::from(e)),
        };
        self.mark(!matches!(result, Err(StoreError::Request(_))));
        if result.is_ok() {
            self.apply_local(path, None);
        }
        result
    }

    fn connected(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    fn is_persistent(&self) -> bool {
        true
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Local stand-in for the database REST API: GET, PUT and DELETE on
    //! `{path}.json` against an in-memory JSON tree.

    use super::FirebaseClient;
    use crate::stores::client::split_path;
    use crate::stores::memory_store::{remove_at, set_at, value_at};
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{Method, StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use serde_json::{Map, Value};
    use std::sync::atomic::{AtomicU16, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, Clone)]
    pub(crate) struct RecordedRequest {
        pub method: Method,
        pub path: String,
        pub query: String,
    }

    #[derive(Default)]
    struct MockState {
        root: Mutex<Value>,
        requests: Mutex<Vec<RecordedRequest>>,
        fail_status: AtomicU16,
    }

    pub(crate) struct MockDatabase {
        pub url: String,
        state: Arc<MockState>,
    }

    impl MockDatabase {
        pub async fn spawn() -> Self {
            let state = Arc::new(MockState::default());
            let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}", listener.local_addr().unwrap());
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self { url, state }
        }

        pub fn client(&self, auth_token: Option<&str>, poll_interval: Duration) -> FirebaseClient {
            FirebaseClient::new(
                &self.url,
                auth_token.map(str::to_string),
                poll_interval,
                Duration::from_secs(5),
            )
            .unwrap()
        }

        /// Change the tree behind the client's back
        pub fn set(&self, path: &str, value: Value) {
            let segments = split_path(path).unwrap();
            set_at(&mut self.state.root.lock().unwrap(), &segments, value);
        }

        /// Answer every request with `status` until `recover`
        pub fn fail_with(&self, status: StatusCode) {
            self.state.fail_status.store(status.as_u16(), Ordering::SeqCst);
        }

        pub fn recover(&self) {
            self.state.fail_status.store(0, Ordering::SeqCst);
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.state.requests.lock().unwrap().clone()
        }

        pub fn count(&self, method: Method, path: &str) -> usize {
            self.requests()
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .count()
        }
    }

    async fn handle(
        State(state): State<Arc<MockState>>,
        method: Method,
        uri: Uri,
        body: Bytes,
    ) -> Response {
        let query = uri.query().unwrap_or_default().to_string();
        state.requests.lock().unwrap().push(RecordedRequest {
            method: method.clone(),
            path: uri.path().to_string(),
            query: query.clone(),
        });

        let fail_status = state.fail_status.load(Ordering::SeqCst);
        if fail_status != 0 {
            let status = StatusCode::from_u16(fail_status).unwrap();
            return (status, Json(serde_json::json!({ "error": "Permission denied" })))
                .into_response();
        }

        let Some(path) = uri.path().strip_suffix(".json") else {
            return StatusCode::NOT_FOUND.into_response();
        };
        let Ok(segments) = split_path(path) else {
            return StatusCode::BAD_REQUEST.into_response();
        };

        let mut root = state.root.lock().unwrap();
        match method {
            Method::GET => {
                let value = value_at(&root, &segments).cloned().unwrap_or(Value::Null);
                let value = match value {
                    Value::Object(map) if query.contains("shallow=true") => Value::Object(
                        map.into_iter().map(|(k, _)| (k, Value::Bool(true))).collect::<Map<_, _>>(),
                    ),
                    other => other,
                };
                Json(value).into_response()
            }
            Method::PUT => {
                let value: Value = serde_json::from_slice(&body).unwrap();
                if value.is_null() {
                    if remove_at(&mut root, &segments) {
                        *root = Value::Null;
                    }
                } else {
                    set_at(&mut root, &segments, value.clone());
                }
                Json(value).into_response()
            }
            Method::DELETE => {
                if remove_at(&mut root, &segments) {
                    *root = Value::Null;
                }
                Json(Value::Null).into_response()
            }
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    }
}
