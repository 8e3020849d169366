//! Conversation state machine
//!
//! Pure transitions over [`ChatState`]; the runtime executes the resulting effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{Event, ExchangeIds};
pub use state::{ChatState, Message, MessageStatus, Mode, Phase, Role, WidgetContext};
pub use transition::{transition, TransitionError, TransitionResult};
