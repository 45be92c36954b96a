use dashmap::DashMap;
use ollama_rs::Ollama;
use ollama_rs::error::OllamaError;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::chat::{ChatMessage, ChatMessageResponse};
use poise::serenity_prelude::UserId;
use tracing::{debug, error, info};

use super::config::BotConfig;

pub type OllamaResult<T> = Result<T, OllamaError>;

/// Relays chat messages to an Ollama server, keeping one conversation per user
pub struct OllamaClient {
    client: Ollama,
    model: Option<String>,
    conversations: DashMap<UserId, Vec<ChatMessage>>,
}

impl OllamaClient {
    pub fn new(host: impl Into<String>, port: u16, model: Option<String>) -> Self {
        let host = host.into();
        debug!("Creating OllamaClient for {}:{}", host, port);
        Self {
            client: Ollama::new(host, port),
            model,
            conversations: DashMap::new(),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(
            config.ollama_host.clone(),
            config.ollama_port,
            config.ollama_model.clone(),
        )
    }

    /// Whether a model is configured
    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    /// Number of messages (both sides) in the user's current conversation
    pub fn history_len(&self, user_id: UserId) -> usize {
        self.conversations
            .get(&user_id)
            .map(|history| history.len())
            .unwrap_or_default()
    }

    /// Forget the user's conversation. Returns `false` if there was none.
    pub fn new_conversation(&self, user_id: UserId) -> bool {
        info!("Starting a new conversation for user {}", user_id);
        self.conversations.remove(&user_id).is_some()
    }

    pub async fn chat(&self, user_id: UserId, message: &str) -> OllamaResult<ChatMessageResponse> {
        let Some(model) = self.model.clone() else {
            return Err(OllamaError::Other("No model configured".to_string()));
        };
        info!("Processing chat request for user {} with model {}", user_id, model);

        // Work on a copy so the map is not locked across the request
        let mut history = self
            .conversations
            .get(&user_id)
            .map(|history| history.clone())
            .unwrap_or_default();
        debug!("Conversation for user {} has {} messages", user_id, history.len());

        let result = self
            .client
            .clone()
            .send_chat_messages_with_history(
                &mut history,
                ChatMessageRequest::new(model, vec![ChatMessage::user(message.to_string())]),
            )
            .await;

        match result {
            Ok(response) => {
                self.conversations.insert(user_id, history);
                Ok(response)
            }
            Err(e) => {
                error!("Failed to get response from Ollama for user {}: {}", user_id, e);
                Err(e)
            }
        }
    }
}
