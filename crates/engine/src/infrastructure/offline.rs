//! Messaging adapter for running without a chat connection.

use async_trait::async_trait;
use nomic_domain::{ChannelId, MessageId};

use crate::infrastructure::ports::{MessageContent, MessagingError, MessagingPort};

/// Refuses every request. Used by maintenance commands that only touch the
/// stored documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineMessaging;

impl OfflineMessaging {
    fn unavailable<T>() -> Result<T, MessagingError> {
        Err(MessagingError::Unavailable(
            "no chat connection in offline mode".to_string(),
        ))
    }
}

#[async_trait]
impl MessagingPort for OfflineMessaging {
    async fn send(&self, _: ChannelId, _: &MessageContent) -> Result<MessageId, MessagingError> {
        Self::unavailable()
    }

    async fn edit(
        &self,
        _: ChannelId,
        _: MessageId,
        _: &MessageContent,
    ) -> Result<(), MessagingError> {
        Self::unavailable()
    }

    async fn delete(&self, _: ChannelId, _: &[MessageId]) -> Result<(), MessagingError> {
        Self::unavailable()
    }

    async fn fetch(&self, _: ChannelId, _: MessageId) -> Result<MessageContent, MessagingError> {
        Self::unavailable()
    }

    async fn add_reaction(&self, _: ChannelId, _: MessageId, _: &str) -> Result<(), MessagingError> {
        Self::unavailable()
    }

    async fn clear_reactions(&self, _: ChannelId, _: MessageId) -> Result<(), MessagingError> {
        Self::unavailable()
    }
}
