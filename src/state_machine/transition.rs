//! Pure state transition function
//!
//! Every mutation of [`ChatState`] goes through [`transition`]. The function
//! performs no I/O: persistence and the network exchange are returned as
//! [`Effect`]s for the runtime to execute.

use super::state::Message;
use super::{ChatState, Effect, Event, WidgetContext};
use crate::client::{AgentReply, ChatRequest};
use thiserror::Error;

/// `lastError` text when the failure carried no description
pub const DEFAULT_ERROR_TEXT: &str = "Se produjo un error al enviar tu mensaje.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// Adds an effect. Persist effects are queued at most once per transition.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        if !(effect.is_persist() && self.effects.contains(&effect)) {
            self.effects.push(effect);
        }
        self
    }

    pub fn with_effects(self, effects: impl IntoIterator<Item = Effect>) -> Self {
        effects.into_iter().fold(self, TransitionResult::with_effect)
    }

    /// The request to send, if this transition started an exchange
    pub fn request(&self) -> Option<&ChatRequest> {
        self.effects.iter().find_map(|e| match e {
            Effect::SendRequest { request } => Some(request),
            _ => None,
        })
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("An exchange is already in flight")]
    Busy,
    #[error("Draft is empty")]
    EmptyDraft,
    #[error("No exchange is in flight")]
    NoExchangeInFlight,
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs.
pub fn transition(
    state: &ChatState,
    context: &WidgetContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // UI-only fields: no persistence
        // ============================================================
        Event::SetDraft { text } => {
            let mut next = state.clone();
            next.set_draft(text);
            Ok(TransitionResult::new(next))
        }

        Event::SetOpen { open } => {
            let mut next = state.clone();
            next.set_open(open);
            Ok(TransitionResult::new(next))
        }

        Event::TogglePanel => {
            let mut next = state.clone();
            next.set_open(!state.is_open);
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Idle -> Sending
        // ============================================================
        Event::Submit { .. } if state.is_sending => Err(TransitionError::Busy),

        Event::Submit { text, ids } => {
            let content = text.trim();
            if content.is_empty() {
                return Err(TransitionError::EmptyDraft);
            }

            let mut next = state.clone();
            next.set_error("");
            next.set_sending(true);
            next.set_draft("");
            next.append_message(Message::user(ids.user, content));
            next.append_message(Message::typing(ids.placeholder));

            let request = build_request(&next, context, content);
            Ok(TransitionResult::new(next)
                .with_effect(Effect::PersistMessages)
                .with_effect(Effect::SendRequest { request }))
        }

        // ============================================================
        // Sending -> {Success | Fallback | Error} -> Idle
        // ============================================================
        Event::ReplyReceived { .. } | Event::ExchangeFailed { .. } if !state.is_sending => {
            Err(TransitionError::NoExchangeInFlight)
        }

        Event::ReplyReceived { reply, message_id } => Ok(apply_reply(state, &reply, message_id)),

        Event::ExchangeFailed {
            message,
            message_id,
        } => {
            let mut next = state.clone();
            next.set_error(if message.trim().is_empty() {
                DEFAULT_ERROR_TEXT.to_string()
            } else {
                message
            });
            next.replace_typing(Message::error(message_id));
            next.set_sending(false);
            Ok(TransitionResult::new(next).with_effect(Effect::PersistMessages))
        }
    }
}

/// Body for the outgoing request. Stateless mode never sends a session id.
pub fn build_request(state: &ChatState, context: &WidgetContext, content: &str) -> ChatRequest {
    let session_id = if state.mode.is_stateless() {
        String::new()
    } else {
        state.session_id.clone()
    };
    ChatRequest {
        user_id: context.user_id.clone(),
        session_id,
        message: content.to_string(),
    }
}

fn apply_reply(state: &ChatState, reply: &AgentReply, message_id: String) -> TransitionResult {
    let mut next = state.clone();
    let mut effects = Vec::new();

    if !reply.session_id.is_empty() && next.set_session_id(&reply.session_id) {
        effects.push(Effect::PersistSessionId);
    }

    let text = reply.response.trim();
    let message = if text.is_empty() {
        Message::fallback(message_id)
    } else {
        Message::agent(message_id, text)
    };
    next.replace_typing(message);
    next.set_sending(false);
    effects.push(Effect::PersistMessages);

    TransitionResult::new(next).with_effects(effects)
}
