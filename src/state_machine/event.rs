//! Events that can occur in the widget

use crate::client::AgentReply;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Presentation intents
    SetDraft {
        text: String,
    },
    SetOpen {
        open: bool,
    },
    TogglePanel,
    Submit {
        text: String,
        /// Pre-allocated ids for the user entry and the typing placeholder
        ids: ExchangeIds,
    },

    // Exchange outcomes
    ReplyReceived {
        reply: AgentReply,
        message_id: String,
    },
    ExchangeFailed {
        message: String,
        message_id: String,
    },
}

/// Ids assigned to the two entries a submit appends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeIds {
    pub user: String,
    pub placeholder: String,
}
