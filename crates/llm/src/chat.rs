//! In-character replies from catalog agents.

use pmos_core::{Agent, MAX_CHAT_MESSAGES, Squad};
use serde::{Deserialize, Serialize};

use crate::ai_types::Message;
use crate::client::LlmClient;
use crate::error::LlmError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the conversation history sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl LlmClient {
    /// Reply as `agent` to the conversation so far.
    ///
    /// Only the last `MAX_CHAT_MESSAGES` turns are forwarded. When a squad is
    /// given, its roster is added to the system prompt so the agent can refer
    /// to teammates.
    ///
    /// # Errors
    /// Gateway failures or an empty reply.
    pub async fn agent_reply(
        &self,
        agent: &Agent,
        squad: Option<&Squad>,
        history: &[ChatTurn],
    ) -> Result<String, LlmError> {
        let mut system = agent.system_prompt();
        if let Some(squad) = squad {
            let teammates: Vec<String> = squad
                .agents
                .iter()
                .filter(|a| a.slug != agent.slug)
                .map(|a| format!("{} ({})", a.name, a.specialty))
                .collect();
            if !teammates.is_empty() {
                system.push_str(&format!(
                    "\nYou work in the squad \"{}\" with: {}.",
                    squad.name,
                    teammates.join(", ")
                ));
            }
        }

        let skip = history.len().saturating_sub(MAX_CHAT_MESSAGES);
        let mut messages = Vec::with_capacity(history.len() - skip + 1);
        messages.push(Message::system(system));
        messages.extend(history.iter().skip(skip).map(|turn| match turn.role {
            ChatRole::User => Message::user(turn.content.clone()),
            ChatRole::Assistant => Message::assistant(turn.content.clone()),
        }));

        let request = self.request(messages);
        let reply = self.chat_completion(&request).await?;
        tracing::debug!(agent = agent.slug, chars = reply.len(), "agent replied");
        Ok(reply)
    }
}
