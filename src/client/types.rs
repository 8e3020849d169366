//! Wire types for the agent endpoint

use serde::{Deserialize, Deserializer, Serialize};

/// Outgoing request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub user_id: String,
    /// Empty when there is no session or in stateless mode
    pub session_id: String,
    pub message: String,
}

/// Incoming reply. Absent or null fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub session_id: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}
