use crate::model::NameRecord;
use crate::store::{NameStore, StoreError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{error, info, warn};

const PROBE_ATTEMPTS: u32 = 3;
const PROBE_BACKOFF: Duration = Duration::from_millis(500);

/// Reachability of the store, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Pending,
    Ready,
    Failed,
}

enum Event {
    ProbeFinished(Result<(), StoreError>),
    NameFetched(Result<NameRecord, StoreError>),
}

/// Drives the startup probe and the generate flow, and owns the pieces of
/// UI state they produce: the connection flag, the in-flight flag, the
/// current record, and the error text.
pub struct NameGenerator {
    store: NameStore,
    handle: Handle,
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
    connection: Connection,
    loading: bool,
    current: Option<NameRecord>,
    error: Option<String>,
}

impl NameGenerator {
    /// Construct the generator and kick off the startup probe.
    pub fn new(store: NameStore, handle: Handle) -> Self {
        let (tx, rx) = mpsc::channel(8);
        let generator = NameGenerator {
            store,
            handle,
            tx,
            rx,
            connection: Connection::Pending,
            loading: false,
            current: None,
            error: None,
        };
        generator.spawn_probe();
        generator
    }

    fn spawn_probe(&self) {
        let store = self.store.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = probe_with_retry(&store).await;
            let _ = tx.send(Event::ProbeFinished(result)).await;
        });
    }

    /// Kick off one generate request. Refuses synchronously while the store
    /// is unreachable or a request is already in flight.
    pub fn request_name(&mut self) {
        if self.loading {
            return;
        }
        if self.connection != Connection::Ready {
            self.error =
                Some("Database connection is not available. Please try again later.".to_string());
            return;
        }

        self.loading = true;
        self.error = None;
        let store = self.store.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = store.random_name().await;
            let _ = tx.send(Event::NameFetched(result)).await;
        });
    }

    /// Drain finished async work into UI state. Call once per frame.
    pub fn poll(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Event::ProbeFinished(Ok(())) => {
                    info!("store is reachable");
                    self.connection = Connection::Ready;
                }
                Event::ProbeFinished(Err(e)) => {
                    error!("store probe failed: {}", e);
                    self.connection = Connection::Failed;
                    self.error = Some(
                        "Unable to connect to the database. Please check your internet connection and try again."
                            .to_string(),
                    );
                }
                Event::NameFetched(result) => {
                    self.loading = false;
                    match result {
                        Ok(record) => {
                            info!("generated name: {}", record.name);
                            self.error = None;
                            self.current = Some(record);
                        }
                        Err(e) => {
                            error!("failed to generate name: {}", e);
                            self.error = Some(fetch_error_message(e));
                        }
                    }
                }
            }
        }
    }

    pub fn connection(&self) -> Connection {
        self.connection
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_generate(&self) -> bool {
        self.connection == Connection::Ready && !self.loading
    }

    pub fn current(&self) -> Option<&NameRecord> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// The probe gets a few attempts before the failure becomes terminal; after
/// that the gate stays closed until restart.
async fn probe_with_retry(store: &NameStore) -> Result<(), StoreError> {
    let mut last = StoreError::Network;
    for attempt in 1..=PROBE_ATTEMPTS {
        match store.probe().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!("store probe attempt {}/{} failed: {}", attempt, PROBE_ATTEMPTS, e);
                last = e;
            }
        }
        if attempt < PROBE_ATTEMPTS {
            sleep(PROBE_BACKOFF * attempt).await;
        }
    }
    Err(last)
}

fn fetch_error_message(err: StoreError) -> String {
    match err {
        StoreError::Remote(msg) if msg.is_empty() => {
            "Failed to generate name. Please try again.".to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::model::Gender;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(uri: &str) -> NameStore {
        NameStore::new(&StoreConfig {
            endpoint: uri.to_string(),
            anon_key: "test-key".to_string(),
            table: "irish_names".to_string(),
            random_rpc: "get_random_name".to_string(),
        })
        .unwrap()
    }

    async fn mount_probe_ok(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/irish_names"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"count": 1}])))
            .mount(server)
            .await;
    }

    async fn settle(generator: &mut NameGenerator, mut done: impl FnMut(&NameGenerator) -> bool) {
        for _ in 0..400 {
            generator.poll();
            if done(generator) {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("generator did not settle");
    }

    #[tokio::test]
    async fn test_probe_success_enables_generate() {
        let server = MockServer::start().await;
        mount_probe_ok(&server).await;

        let mut generator = NameGenerator::new(store_for(&server.uri()), Handle::current());
        assert!(!generator.can_generate());

        settle(&mut generator, |g| g.connection() != Connection::Pending).await;
        assert_eq!(generator.connection(), Connection::Ready);
        assert!(generator.can_generate());
        assert!(generator.error().is_none());
    }

    #[tokio::test]
    async fn test_probe_failure_retries_then_disables() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/irish_names"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "permission denied"})),
            )
            .mount(&server)
            .await;

        let mut generator = NameGenerator::new(store_for(&server.uri()), Handle::current());
        settle(&mut generator, |g| g.connection() != Connection::Pending).await;

        assert_eq!(generator.connection(), Connection::Failed);
        assert!(!generator.can_generate());
        assert_eq!(
            generator.error(),
            Some("Unable to connect to the database. Please check your internet connection and try again.")
        );
        assert_eq!(server.received_requests().await.unwrap().len(), PROBE_ATTEMPTS as usize);
    }

    #[tokio::test]
    async fn test_request_before_probe_resolves_issues_no_call() {
        let server = MockServer::start().await;
        // Probe response held back so the connection stays pending.
        Mock::given(method("GET"))
            .and(path("/rest/v1/irish_names"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"count": 1}]))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let mut generator = NameGenerator::new(store_for(&server.uri()), Handle::current());
        generator.request_name();

        assert_eq!(generator.connection(), Connection::Pending);
        assert!(!generator.is_loading());
        assert_eq!(
            generator.error(),
            Some("Database connection is not available. Please try again later.")
        );

        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| !r.url.path().starts_with("/rest/v1/rpc")));
    }

    #[tokio::test]
    async fn test_successful_fetch_replaces_record() {
        let server = MockServer::start().await;
        mount_probe_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/get_random_name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "7f3e9a8c-1b2d-4c5e-8f90-a1b2c3d4e5f6",
                "name": "Oisin",
                "meaning": "little deer",
                "gender": "boy",
                "created_at": "2024-05-20T09:15:00+00:00"
            }])))
            .mount(&server)
            .await;

        let mut generator = NameGenerator::new(store_for(&server.uri()), Handle::current());
        settle(&mut generator, |g| g.connection() == Connection::Ready).await;

        generator.request_name();
        assert!(generator.is_loading());
        // A second click while loading is a no-op.
        generator.request_name();

        settle(&mut generator, |g| !g.is_loading()).await;
        let record = generator.current().unwrap();
        assert_eq!(record.name, "Oisin");
        assert_eq!(record.meaning, "little deer");
        assert_eq!(record.gender, Gender::Boy);
        assert!(generator.error().is_none());

        let rpc_calls = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path().starts_with("/rest/v1/rpc"))
            .count();
        assert_eq!(rpc_calls, 1);
    }

    #[tokio::test]
    async fn test_empty_result_message() {
        let server = MockServer::start().await;
        mount_probe_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/get_random_name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let mut generator = NameGenerator::new(store_for(&server.uri()), Handle::current());
        settle(&mut generator, |g| g.connection() == Connection::Ready).await;

        generator.request_name();
        settle(&mut generator, |g| !g.is_loading()).await;

        assert_eq!(generator.error(), Some("No names available in the database."));
        assert!(generator.current().is_none());
    }

    #[tokio::test]
    async fn test_remote_error_message_surfaced_verbatim() {
        let server = MockServer::start().await;
        mount_probe_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/get_random_name"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                json!({"message": "function get_random_name does not exist"}),
            ))
            .mount(&server)
            .await;

        let mut generator = NameGenerator::new(store_for(&server.uri()), Handle::current());
        settle(&mut generator, |g| g.connection() == Connection::Ready).await;

        generator.request_name();
        settle(&mut generator, |g| !g.is_loading()).await;

        assert_eq!(generator.error(), Some("function get_random_name does not exist"));
    }

    #[tokio::test]
    async fn test_network_error_message() {
        let server = MockServer::start().await;
        mount_probe_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/get_random_name"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({"message": "upstream connection refused"})),
            )
            .mount(&server)
            .await;

        let mut generator = NameGenerator::new(store_for(&server.uri()), Handle::current());
        settle(&mut generator, |g| g.connection() == Connection::Ready).await;

        generator.request_name();
        settle(&mut generator, |g| !g.is_loading()).await;

        assert_eq!(
            generator.error(),
            Some("Network connection error. Please check your internet connection and try again.")
        );
    }

    #[tokio::test]
    async fn test_blank_remote_message_falls_back() {
        assert_eq!(
            fetch_error_message(StoreError::Remote(String::new())),
            "Failed to generate name. Please try again."
        );
        assert_eq!(
            fetch_error_message(StoreError::Remote("row level security".to_string())),
            "row level security"
        );
    }
}
