//! Shared test helpers: a fake chat platform, an adjustable clock and a
//! ready-made game backed by the in-memory store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use nomic_domain::{ChannelId, GuildId, MessageId, PlayerId};

use crate::game::Game;
use crate::infrastructure::memory_store::InMemoryGameStore;
use crate::infrastructure::ports::{ClockPort, MessageContent, MessagingError, MessagingPort};

pub const GUILD: GuildId = GuildId::new(1);
pub const ALICE: PlayerId = PlayerId::new(100);
pub const BOB: PlayerId = PlayerId::new(200);
pub const ADMIN: PlayerId = PlayerId::new(900);
pub const PROPOSALS: ChannelId = ChannelId::new(1000);
pub const RULES: ChannelId = ChannelId::new(2000);

/// 2023-11-14T22:13:20Z
pub fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

// =============================================================================
// Clock
// =============================================================================

pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl ClockPort for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

// =============================================================================
// Messaging
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeMessage {
    pub channel: ChannelId,
    pub content: MessageContent,
    pub reactions: Vec<String>,
}

/// In-memory chat platform. Message IDs are handed out in ascending order.
pub struct FakeMessaging {
    messages: Mutex<BTreeMap<MessageId, FakeMessage>>,
    next_id: AtomicU64,
    forbidden: AtomicBool,
}

impl Default for FakeMessaging {
    fn default() -> Self {
        Self {
            messages: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(5000),
            forbidden: AtomicBool::new(false),
        }
    }
}

impl FakeMessaging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self, id: MessageId) -> Option<FakeMessage> {
        self.messages.lock().unwrap().get(&id).cloned()
    }

    /// Messages in `channel`, oldest first.
    pub fn messages_in(&self, channel: ChannelId) -> Vec<(MessageId, FakeMessage)> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m)| m.channel == channel)
            .map(|(id, m)| (*id, m.clone()))
            .collect()
    }

    /// Simulate a moderator deleting a message by hand.
    pub fn vanish(&self, id: MessageId) {
        self.messages.lock().unwrap().remove(&id);
    }

    /// Make every subsequent call fail with `Forbidden`.
    pub fn revoke_permissions(&self) {
        self.forbidden.store(true, Ordering::SeqCst);
    }

    fn check_permissions(&self) -> Result<(), MessagingError> {
        if self.forbidden.load(Ordering::SeqCst) {
            return Err(MessagingError::Forbidden("Missing Permissions".into()));
        }
        Ok(())
    }

    fn with_message<T>(
        &self,
        channel: ChannelId,
        id: MessageId,
        f: impl FnOnce(&mut FakeMessage) -> T,
    ) -> Result<T, MessagingError> {
        self.check_permissions()?;
        let mut messages = self.messages.lock().unwrap();
        match messages.get_mut(&id) {
            Some(message) if message.channel == channel => Ok(f(message)),
            _ => Err(MessagingError::NotFound),
        }
    }
}

#[async_trait]
impl MessagingPort for FakeMessaging {
    async fn send(
        &self,
        channel: ChannelId,
        content: &MessageContent,
    ) -> Result<MessageId, MessagingError> {
        self.check_permissions()?;
        let id = MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.messages.lock().unwrap().insert(
            id,
            FakeMessage {
                channel,
                content: content.clone(),
                reactions: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn edit(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &MessageContent,
    ) -> Result<(), MessagingError> {
        self.with_message(channel, message, |m| m.content = content.clone())
    }

    async fn delete(&self, channel: ChannelId, ids: &[MessageId]) -> Result<(), MessagingError> {
        self.check_permissions()?;
        let mut messages = self.messages.lock().unwrap();
        let mut missing = false;
        for id in ids {
            if messages.get(id).is_some_and(|m| m.channel == channel) {
                messages.remove(id);
            } else {
                missing = true;
            }
        }
        if missing {
            return Err(MessagingError::NotFound);
        }
        Ok(())
    }

    async fn fetch(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<MessageContent, MessagingError> {
        self.with_message(channel, message, |m| m.content.clone())
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), MessagingError> {
        self.with_message(channel, message, |m| m.reactions.push(emoji.to_string()))
    }

    async fn clear_reactions(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), MessagingError> {
        self.with_message(channel, message, |m| m.reactions.clear())
    }
}

// =============================================================================
// Games
// =============================================================================

/// A game for `GUILD` plus handles on everything it talks to.
pub struct TestGame {
    pub game: Arc<Game>,
    pub store: Arc<InMemoryGameStore>,
    pub messaging: Arc<FakeMessaging>,
    pub clock: Arc<TestClock>,
}

impl TestGame {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryGameStore::new());
        let messaging = Arc::new(FakeMessaging::new());
        let clock = Arc::new(TestClock::new(t0()));
        let game = Game::load(GUILD, store.clone(), messaging.clone(), clock.clone())
            .await
            .unwrap();
        Self {
            game: Arc::new(game),
            store,
            messaging,
            clock,
        }
    }

    /// Both channels bound.
    pub async fn with_channels() -> Self {
        let t = Self::new().await;
        {
            let mut guard = t.game.lock().await;
            guard.set_proposals_channel(Some(PROPOSALS)).await.unwrap();
            guard.set_rules_channel(Some(RULES)).await.unwrap();
        }
        t
    }

    /// A second, independent game loaded from the same store.
    pub async fn reload(&self) -> Arc<Game> {
        let game = Game::load(
            GUILD,
            self.store.clone(),
            self.messaging.clone(),
            self.clock.clone(),
        )
        .await
        .unwrap();
        Arc::new(game)
    }
}

/// A game whose chat platform is `messaging`, typically a mock.
pub async fn game_with_messaging(
    messaging: impl MessagingPort + 'static,
) -> (Arc<Game>, Arc<InMemoryGameStore>) {
    let store = Arc::new(InMemoryGameStore::new());
    let game = Game::load(
        GUILD,
        store.clone(),
        Arc::new(messaging),
        Arc::new(TestClock::new(t0())),
    )
    .await
    .unwrap();
    (Arc::new(game), store)
}
