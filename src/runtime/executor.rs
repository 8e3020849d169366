//! Widget runtime: applies events and executes their effects

use crate::client::{AgentClient, AgentReply, ChatRequest, ClientError};
use crate::config::WidgetConfig;
use crate::state_machine::state::default_history;
use crate::state_machine::{
    transition, ChatState, Effect, Event, ExchangeIds, MessageStatus, Mode, TransitionError,
    WidgetContext,
};
use crate::store::{KeyValueStore, PersistentStore, MESSAGES_KEY, SESSION_KEY};
use std::sync::Arc;
use tokio::sync::watch;

/// Result of one network exchange, applied with [`ChatWidget::complete`]
#[derive(Debug)]
pub struct ExchangeOutcome {
    pub result: Result<AgentReply, ClientError>,
}

/// Terminal state an exchange resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Success,
    Fallback,
    Error,
}

/// An exchange that has passed the single-flight guard and is ready to send.
///
/// Owns everything it needs, so it can be awaited in place or spawned.
pub struct PendingExchange<C: ?Sized> {
    client: Arc<C>,
    endpoint: String,
    request: ChatRequest,
}

impl<C: AgentClient + ?Sized> PendingExchange<C> {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    /// Performs the single network call. Always runs to completion.
    pub async fn run(self) -> ExchangeOutcome {
        let result = self.client.send(&self.endpoint, &self.request).await;
        ExchangeOutcome { result }
    }
}

/// Conversation state plus the request lifecycle around it
pub struct ChatWidget<C: ?Sized, S> {
    context: WidgetContext,
    endpoint: String,
    state: ChatState,
    client: Arc<C>,
    store: PersistentStore<S>,
    snapshot_tx: watch::Sender<ChatState>,
}

impl<C, S> ChatWidget<C, S>
where
    C: AgentClient + ?Sized,
    S: KeyValueStore,
{
    /// Restores state from `store`, falling back to the greeting and no session
    pub fn new(config: &WidgetConfig, client: Arc<C>, store: S) -> Self {
        Self::with_parts(config.context(), config.endpoint(), config.mode(), client, store)
    }

    pub fn with_parts(
        context: WidgetContext,
        endpoint: String,
        mode: Mode,
        client: Arc<C>,
        store: S,
    ) -> Self {
        let store = PersistentStore::new(store);
        let messages = store.load(MESSAGES_KEY, default_history());
        let session_id = if mode.is_stateless() {
            String::new()
        } else {
            store.load(SESSION_KEY, String::new())
        };
        let state = ChatState::restore(mode, messages, session_id);

        tracing::info!(
            mode = ?mode,
            endpoint = %endpoint,
            messages = state.messages.len(),
            has_session = !state.session_id.is_empty(),
            "Chat widget ready"
        );

        let (snapshot_tx, _) = watch::channel(state.clone());
        Self {
            context,
            endpoint,
            state,
            client,
            store,
            snapshot_tx,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Receives a snapshot after every applied event
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.snapshot_tx.subscribe()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.apply_ui(Event::SetDraft { text: text.into() });
    }

    pub fn set_open(&mut self, open: bool) {
        self.apply_ui(Event::SetOpen { open });
    }

    pub fn toggle_open(&mut self) {
        self.apply_ui(Event::TogglePanel);
    }

    /// Guard check and optimistic writes, with no suspension point in between.
    ///
    /// Returns `None` (and changes nothing) when the text is blank or an
    /// exchange is already in flight.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingExchange<C>> {
        let event = Event::Submit {
            text: text.to_string(),
            ids: ExchangeIds {
                user: new_message_id(),
                placeholder: new_message_id(),
            },
        };

        match self.process(event) {
            Ok(request) => request.map(|request| PendingExchange {
                client: Arc::clone(&self.client),
                endpoint: self.endpoint.clone(),
                request,
            }),
            Err(e @ (TransitionError::Busy | TransitionError::EmptyDraft)) => {
                tracing::debug!(reason = %e, "Submit ignored");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Unexpected submit rejection");
                None
            }
        }
    }

    /// Reconciles the placeholder with the exchange result and returns to Idle.
    ///
    /// Applies regardless of panel visibility.
    pub fn complete(&mut self, outcome: ExchangeOutcome) -> Option<Resolution> {
        let message_id = new_message_id();
        let event = match outcome.result {
            Ok(reply) => Event::ReplyReceived { reply, message_id },
            Err(e) => Event::ExchangeFailed {
                message: e.to_string(),
                message_id,
            },
        };

        if let Err(e) = self.process(event) {
            tracing::warn!(error = %e, "Dropping exchange outcome");
            return None;
        }

        let resolution = match self.state.messages.last().map(|m| m.status) {
            Some(MessageStatus::Fallback) => Resolution::Fallback,
            Some(MessageStatus::Error) => Resolution::Error,
            _ => Resolution::Success,
        };
        tracing::debug!(resolution = ?resolution, "Exchange reconciled");
        Some(resolution)
    }

    /// Full exchange: guard, optimistic writes, network call, reconciliation
    pub async fn submit(&mut self, text: &str) -> Option<Resolution> {
        let pending = self.begin_submit(text)?;
        let outcome = pending.run().await;
        self.complete(outcome)
    }

    fn apply_ui(&mut self, event: Event) {
        if let Err(e) = self.process(event) {
            tracing::warn!(error = %e, "UI event rejected");
        }
    }

    /// Pure transition, state swap, then effects. Returns the request to send, if any.
    fn process(&mut self, event: Event) -> Result<Option<ChatRequest>, TransitionError> {
        let result = transition(&self.state, &self.context, event)?;
        self.state = result.new_state;

        let mut request = None;
        for effect in result.effects {
            if let Some(r) = self.execute_effect(effect) {
                request = Some(r);
            }
        }

        self.snapshot_tx.send_replace(self.state.clone());
        Ok(request)
    }

    fn execute_effect(&self, effect: Effect) -> Option<ChatRequest> {
        match effect {
            Effect::PersistMessages => {
                self.store.save(MESSAGES_KEY, &self.state.messages);
                None
            }
            Effect::PersistSessionId => {
                self.store.save(SESSION_KEY, &self.state.session_id);
                None
            }
            Effect::SendRequest { request } => Some(request),
        }
    }
}

/// Unique, creation-ordered message id
fn new_message_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
