//! Chat platform port.
//!
//! The engine only ever posts embeds into the designated proposals and rules
//! channels, so the surface is a handful of message operations keyed by
//! channel and message ID.

use async_trait::async_trait;
use nomic_domain::{ChannelId, MessageId};

use super::error::MessagingError;

/// Rendered body of a posted message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageContent {
    pub title: String,
    pub description: String,
    pub footer: Option<String>,
}

impl MessageContent {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            footer: None,
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send(
        &self,
        channel: ChannelId,
        content: &MessageContent,
    ) -> Result<MessageId, MessagingError>;

    async fn edit(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &MessageContent,
    ) -> Result<(), MessagingError>;

    /// Bulk delete. Fails with `NotFound` if any message is already gone.
    async fn delete(&self, channel: ChannelId, messages: &[MessageId])
        -> Result<(), MessagingError>;

    async fn fetch(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<MessageContent, MessagingError>;

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), MessagingError>;

    async fn clear_reactions(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), MessagingError>;
}
