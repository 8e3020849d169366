//! Conversation state types

use serde::{Deserialize, Serialize};

/// Greeting seeded into an empty history
pub const GREETING_TEXT: &str = "¡Hola! Soy tu asistente virtual. Pregúntame por ofertas, reservas o información de la plataforma.";

/// Text carried by the in-progress placeholder
pub const TYPING_TEXT: &str = "Escribiendo…";

/// Shown when the agent returns no usable reply or the exchange fails
pub const FALLBACK_TEXT: &str = "Lo siento, no he podido recuperar la respuesta ahora mismo. Por favor, inténtalo de nuevo o comparte más detalles.";

/// Id of the seeded greeting message
pub const GREETING_ID: &str = "intro";

// ============================================================================
// Messages
// ============================================================================

/// Author of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

/// Optional tag on a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    None,
    /// Placeholder for an exchange in flight
    Typing,
    /// Agent answered with nothing usable
    Fallback,
    /// The exchange failed
    Error,
}

impl MessageStatus {
    fn is_none(&self) -> bool {
        matches!(self, MessageStatus::None)
    }
}

/// One entry in the ordered history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "MessageStatus::is_none")]
    pub status: MessageStatus,
}

impl Message {
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            text: text.into(),
            status: MessageStatus::None,
        }
    }

    pub fn agent(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Agent,
            text: text.into(),
            status: MessageStatus::None,
        }
    }

    pub fn typing(id: impl Into<String>) -> Self {
        Self::agent(id, TYPING_TEXT).with_status(MessageStatus::Typing)
    }

    pub fn fallback(id: impl Into<String>) -> Self {
        Self::agent(id, FALLBACK_TEXT).with_status(MessageStatus::Fallback)
    }

    pub fn error(id: impl Into<String>) -> Self {
        Self::agent(id, FALLBACK_TEXT).with_status(MessageStatus::Error)
    }

    pub fn greeting() -> Self {
        Self::agent(GREETING_ID, GREETING_TEXT)
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_typing(&self) -> bool {
        self.status == MessageStatus::Typing
    }
}

/// History used when nothing usable was persisted
pub fn default_history() -> Vec<Message> {
    vec![Message::greeting()]
}

// ============================================================================
// Session mode
// ============================================================================

/// Whether the remote agent keeps conversation context between exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Session id is sent and persisted
    #[default]
    Stateful,
    /// Session id is always empty and never persisted
    Stateless,
}

impl Mode {
    pub fn is_stateless(self) -> bool {
        matches!(self, Mode::Stateless)
    }

    /// Endpoint path for this mode
    pub fn path(self) -> &'static str {
        match self {
            Mode::Stateful => "/api/v1/agent/chat",
            Mode::Stateless => "/api/v1/agent/chat-stateless",
        }
    }
}

/// Exchange phase derived from `is_sending`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
}

// ============================================================================
// Conversation State
// ============================================================================

/// Single source of truth for the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatState {
    pub messages: Vec<Message>,
    pub session_id: String,
    pub mode: Mode,
    pub is_open: bool,
    pub draft: String,
    pub is_sending: bool,
    pub last_error: String,
}

impl ChatState {
    /// Fresh state: greeting only, no session, panel closed
    pub fn new(mode: Mode) -> Self {
        Self::restore(mode, default_history(), String::new())
    }

    /// State rebuilt from persisted slots.
    ///
    /// Stateless mode ignores the stored session id. Placeholders left by an
    /// exchange that never completed are dropped; nothing is in flight after a restart.
    pub fn restore(mode: Mode, mut messages: Vec<Message>, session_id: String) -> Self {
        messages.retain(|m| !m.is_typing());
        Self {
            messages,
            session_id: if mode.is_stateless() {
                String::new()
            } else {
                session_id
            },
            mode,
            is_open: false,
            draft: String::new(),
            is_sending: false,
            last_error: String::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_sending {
            Phase::Sending
        } else {
            Phase::Idle
        }
    }

    pub fn typing_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_typing()).count()
    }

    /// Appends to the log
    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drops every typing placeholder, then appends `message`
    pub fn replace_typing(&mut self, message: Message) {
        self.messages.retain(|m| !m.is_typing());
        self.messages.push(message);
    }

    /// Returns true if the stored session id changed
    pub fn set_session_id(&mut self, session_id: &str) -> bool {
        if self.mode.is_stateless() || self.session_id == session_id {
            return false;
        }
        self.session_id = session_id.to_string();
        true
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    pub fn set_sending(&mut self, sending: bool) {
        self.is_sending = sending;
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.last_error = error.into();
    }
}

/// Immutable per-widget configuration visible to transitions
#[derive(Debug, Clone)]
pub struct WidgetContext {
    /// Fixed client identifier sent with every request
    pub user_id: String,
}

/// Client identifier used when none is configured
pub const DEFAULT_USER_ID: &str = "web-user";

impl WidgetContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Default for WidgetContext {
    fn default() -> Self {
        Self::new(DEFAULT_USER_ID)
    }
}
