//! Effects produced by state transitions

use crate::client::ChatRequest;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Mirror the message log to storage
    PersistMessages,

    /// Mirror the session id to storage
    PersistSessionId,

    /// Perform the network exchange
    SendRequest { request: ChatRequest },
}

impl Effect {
    pub fn is_persist(&self) -> bool {
        matches!(self, Effect::PersistMessages | Effect::PersistSessionId)
    }
}
