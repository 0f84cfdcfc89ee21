//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Game document storage (SQLite, or memory in tests)
//! - The chat platform hosting the proposals and rules channels
//! - Clock (for testing)

mod error;
mod messaging;
mod repos;
mod testing;

pub use error::{MessagingError, RepoError};
pub use messaging::{MessageContent, MessagingPort};
pub use repos::GameStore;
pub use testing::ClockPort;

#[cfg(test)]
pub use messaging::MockMessagingPort;
#[cfg(test)]
pub use repos::MockGameStore;
#[cfg(test)]
pub use testing::MockClockPort;
