//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use crate::client::{AgentClient, AgentReply, ChatRequest, ClientError};
use crate::store::{KeyValueStore, MemoryStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Agent Client
// ============================================================================

/// Mock agent client that returns queued outcomes
pub struct MockAgentClient {
    replies: Mutex<VecDeque<Result<AgentReply, ClientError>>>,
    /// Record of all (endpoint, request) pairs sent
    pub requests: Mutex<Vec<(String, ChatRequest)>>,
}

impl MockAgentClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, response: &str, session_id: &str) {
        self.replies.lock().unwrap().push_back(Ok(AgentReply {
            response: response.to_string(),
            session_id: session_id.to_string(),
        }));
    }

    /// Queue a failed exchange
    pub fn queue_error(&self, error: ClientError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<(String, ChatRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockAgentClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentClient for MockAgentClient {
    async fn send(&self, endpoint: &str, request: &ChatRequest) -> Result<AgentReply, ClientError> {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), request.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::network("No mock response queued")))
    }
}

/// Mock agent client with configurable delay
pub struct DelayedMockAgentClient {
    inner: MockAgentClient,
    delay: Duration,
    /// Notified when a request starts
    pub request_started: Arc<Notify>,
}

impl DelayedMockAgentClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockAgentClient::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, response: &str, session_id: &str) {
        self.inner.queue_reply(response, session_id);
    }

    pub fn request_count(&self) -> usize {
        self.inner.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AgentClient for DelayedMockAgentClient {
    async fn send(&self, endpoint: &str, request: &ChatRequest) -> Result<AgentReply, ClientError> {
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.send(endpoint, request).await
    }
}

// ============================================================================
// Stores
// ============================================================================

/// Memory store that records every write
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    pub writes: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes_to(&self, key: &str) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.as_str() == key)
            .count()
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.writes.lock().unwrap().push(key.to_string());
        self.inner.set(key, value)
    }
}

/// Store where every operation fails
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::endpoint_url;
    use crate::runtime::{ChatWidget, Resolution};
    use crate::state_machine::state::{default_history, FALLBACK_TEXT, GREETING_ID};
    use crate::state_machine::{MessageStatus, Mode, Phase, Role, WidgetContext};
    use crate::store::{PersistentStore, MESSAGES_KEY, SESSION_KEY};

    const BASE: &str = "http://agent.test";

    fn widget<C: AgentClient + ?Sized, S: KeyValueStore>(
        mode: Mode,
        client: Arc<C>,
        store: S,
    ) -> ChatWidget<C, S> {
        ChatWidget::with_parts(
            WidgetContext::default(),
            endpoint_url(BASE, mode),
            mode,
            client,
            store,
        )
    }

    #[tokio::test]
    async fn test_success_scenario() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("Sí, tenemos 3 ofertas", "sess-1");
        let mut w = widget(Mode::Stateful, client.clone(), RecordingStore::new());

        let resolution = w.submit("¿Tenéis ofertas?").await;

        assert_eq!(resolution, Some(Resolution::Success));
        let state = w.state();
        let last = state.messages.last().unwrap();
        assert_eq!(last.role, Role::Agent);
        assert_eq!(last.text, "Sí, tenemos 3 ofertas");
        assert_eq!(last.status, MessageStatus::None);
        assert_eq!(state.session_id, "sess-1");
        assert_eq!(state.typing_count(), 0);
        assert!(!state.is_sending);

        // greeting + user + agent
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[1].role, Role::User);
        assert_eq!(state.messages[1].text, "¿Tenéis ofertas?");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "http://agent.test/api/v1/agent/chat");
        assert_eq!(requests[0].1.user_id, "web-user");
        assert_eq!(requests[0].1.session_id, "");
        assert_eq!(requests[0].1.message, "¿Tenéis ofertas?");
    }

    #[tokio::test]
    async fn test_empty_reply_scenario() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("", "sess-1");
        let mut w = widget(Mode::Stateful, client, RecordingStore::new());

        let resolution = w.submit("¿Tenéis ofertas?").await;

        assert_eq!(resolution, Some(Resolution::Fallback));
        let last = w.state().messages.last().unwrap();
        assert_eq!(last.text, FALLBACK_TEXT);
        assert_eq!(last.status, MessageStatus::Fallback);
        assert_eq!(w.state().last_error, "");
    }

    #[tokio::test]
    async fn test_network_failure_scenario() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_error(ClientError::status(503));
        let mut w = widget(Mode::Stateful, client, RecordingStore::new());

        let resolution = w.submit("¿Tenéis ofertas?").await;

        assert_eq!(resolution, Some(Resolution::Error));
        let state = w.state();
        let last = state.messages.last().unwrap();
        assert_eq!(last.text, FALLBACK_TEXT);
        assert_eq!(last.status, MessageStatus::Error);
        assert_eq!(state.last_error, "No se pudo contactar con el agente.");
        assert!(!state.is_sending);
        // Optimistic user entry is kept
        assert_eq!(state.messages[1].role, Role::User);
    }

    #[tokio::test]
    async fn test_next_submit_clears_last_error() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_error(ClientError::network("down"));
        client.queue_reply("ok", "");
        let mut w = widget(Mode::Stateful, client, RecordingStore::new());

        w.submit("uno").await;
        assert_eq!(w.state().last_error, "down");

        let pending = w.begin_submit("dos").unwrap();
        assert_eq!(w.state().last_error, "");
        let outcome = pending.run().await;
        w.complete(outcome);
        assert_eq!(w.state().messages.len(), 5);
    }

    #[tokio::test]
    async fn test_submit_while_sending_is_noop() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("primera", "");
        client.queue_reply("segunda", "");
        let store = Arc::new(RecordingStore::new());
        let mut w = widget(Mode::Stateful, client.clone(), store.clone());

        let pending = w.begin_submit("primera pregunta").unwrap();
        assert_eq!(w.state().phase(), Phase::Sending);
        let before = w.state().clone();
        let writes_before = store.writes_to(MESSAGES_KEY);

        assert!(w.begin_submit("segunda pregunta").is_none());
        assert_eq!(w.state(), &before);
        assert_eq!(store.writes_to(MESSAGES_KEY), writes_before);

        let outcome = pending.run().await;
        w.complete(outcome);

        assert_eq!(client.recorded_requests().len(), 1);
        assert_eq!(w.state().messages.last().unwrap().text, "primera");
    }

    #[tokio::test]
    async fn test_blank_submit_is_noop() {
        let client = Arc::new(MockAgentClient::new());
        let store = Arc::new(RecordingStore::new());
        let mut w = widget(Mode::Stateful, client.clone(), store.clone());
        let before = w.state().clone();

        assert_eq!(w.submit("   \n ").await, None);

        assert_eq!(w.state(), &before);
        assert!(client.recorded_requests().is_empty());
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stateless_never_sends_or_stores_session() {
        let store = Arc::new(RecordingStore::new());
        PersistentStore::new(store.clone()).save(SESSION_KEY, "sess-old");

        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("uno", "sess-1");
        client.queue_reply("dos", "sess-2");
        let mut w = widget(Mode::Stateless, client.clone(), store.clone());
        assert_eq!(w.state().session_id, "");
        let session_writes = store.writes_to(SESSION_KEY);

        w.submit("hola").await;
        w.submit("otra vez").await;

        assert_eq!(w.state().session_id, "");
        assert_eq!(store.writes_to(SESSION_KEY), session_writes);
        for (endpoint, request) in client.recorded_requests() {
            assert_eq!(endpoint, "http://agent.test/api/v1/agent/chat-stateless");
            assert_eq!(request.session_id, "");
        }
    }

    #[tokio::test]
    async fn test_stateful_session_is_sent_on_next_exchange() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("uno", "sess-1");
        client.queue_reply("dos", "");
        let mut w = widget(Mode::Stateful, client.clone(), RecordingStore::new());

        w.submit("hola").await;
        w.submit("otra vez").await;

        let requests = client.recorded_requests();
        assert_eq!(requests[0].1.session_id, "");
        assert_eq!(requests[1].1.session_id, "sess-1");
        // Empty session id in a reply keeps the current one
        assert_eq!(w.state().session_id, "sess-1");
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let store = Arc::new(RecordingStore::new());
        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("respuesta", "sess-1");

        let mut first = widget(Mode::Stateful, client.clone(), store.clone());
        first.submit("pregunta").await;
        let expected = first.state().messages.clone();
        drop(first);

        let second = widget(Mode::Stateful, client, store);
        assert_eq!(second.state().messages, expected);
        assert_eq!(second.state().session_id, "sess-1");
        assert!(!second.state().is_open);
    }

    #[tokio::test]
    async fn test_corrupt_storage_yields_defaults() {
        let store = MemoryStore::new();
        store.set(MESSAGES_KEY, "[{\"id\":").unwrap();
        store.set(SESSION_KEY, "{}").unwrap();

        let w = widget(Mode::Stateful, Arc::new(MockAgentClient::new()), store);

        assert_eq!(w.state().messages, default_history());
        assert_eq!(w.state().messages[0].id, GREETING_ID);
        assert_eq!(w.state().session_id, "");
    }

    #[tokio::test]
    async fn test_failing_storage_does_not_break_exchange() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("funciona", "sess-1");
        let mut w = widget(Mode::Stateful, client, FailingStore);

        assert_eq!(w.state().messages, default_history());
        assert_eq!(w.submit("hola").await, Some(Resolution::Success));
        assert_eq!(w.state().messages.last().unwrap().text, "funciona");
    }

    #[tokio::test]
    async fn test_ui_intents_do_not_persist() {
        let store = Arc::new(RecordingStore::new());
        let mut w = widget(Mode::Stateful, Arc::new(MockAgentClient::new()), store.clone());

        w.toggle_open();
        assert!(w.state().is_open);
        w.set_draft("borrador");
        assert_eq!(w.state().draft, "borrador");
        w.set_open(false);
        assert!(!w.state().is_open);

        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_clears_draft() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("ok", "");
        let mut w = widget(Mode::Stateful, client, RecordingStore::new());

        w.set_draft("  hola  ");
        let draft = w.state().draft.clone();
        let pending = w.begin_submit(&draft).unwrap();
        assert_eq!(w.state().draft, "");
        assert_eq!(pending.request().message, "hola");

        let ids: Vec<_> = w.state().messages.iter().map(|m| m.id.clone()).collect();
        assert_ne!(ids[1], ids[2]);
    }

    #[tokio::test]
    async fn test_snapshots_follow_lifecycle() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("ok", "");
        let mut w = widget(Mode::Stateful, client, RecordingStore::new());
        let mut rx = w.subscribe();

        let pending = w.begin_submit("hola").unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_sending);

        let outcome = pending.run().await;
        w.complete(outcome);
        let snapshot = rx.borrow_and_update().clone();
        assert!(!snapshot.is_sending);
        assert_eq!(snapshot.typing_count(), 0);
    }

    #[tokio::test]
    async fn test_ui_intents_publish_snapshots() {
        let client = Arc::new(MockAgentClient::new());
        let mut w = widget(Mode::Stateful, client, RecordingStore::new());
        let mut rx = w.subscribe();
        assert!(!rx.has_changed().unwrap());

        w.toggle_open();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_open);

        w.set_draft("ho");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().draft, "ho");

        w.set_open(false);
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_open);
    }

    /// In-flight exchange keeps running while the panel closes, and its
    /// outcome is still applied.
    #[tokio::test]
    async fn test_outcome_applied_after_panel_closed() {
        let client = Arc::new(DelayedMockAgentClient::new(Duration::from_millis(50)));
        client.queue_reply("llegó", "sess-9");
        let mut w = widget(Mode::Stateful, client.clone(), RecordingStore::new());
        w.set_open(true);

        let started = client.request_started.clone();
        let pending = w.begin_submit("hola").unwrap();
        let handle = tokio::spawn(pending.run());

        started.notified().await;
        w.set_open(false);
        assert!(w.begin_submit("mientras tanto").is_none());

        let outcome = handle.await.unwrap();
        assert_eq!(w.complete(outcome), Some(Resolution::Success));

        assert!(!w.state().is_open);
        assert_eq!(w.state().messages.last().unwrap().text, "llegó");
        assert_eq!(w.state().session_id, "sess-9");
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_stray_outcome_is_dropped() {
        let client = Arc::new(MockAgentClient::new());
        client.queue_reply("ok", "");
        let mut w = widget(Mode::Stateful, client, RecordingStore::new());

        let pending = w.begin_submit("hola").unwrap();
        let outcome = pending.run().await;
        w.complete(outcome);
        let settled = w.state().clone();

        let stray = crate::runtime::ExchangeOutcome {
            result: Ok(AgentReply::default()),
        };
        assert_eq!(w.complete(stray), None);
        assert_eq!(w.state(), &settled);
    }
}
