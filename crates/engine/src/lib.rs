//! Nomic Engine library.
//!
//! Holds one locked game per guild, persists it as a JSON document and keeps
//! the proposals and rules channels in step with it.
//!
//! ## Structure
//!
//! - `game/` - the lock protocol and every operation on a locked game
//! - `registry` - one shared `Game` per guild
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `config` - environment configuration

pub mod config;
pub mod error;
pub mod game;
pub mod infrastructure;
pub mod registry;

/// Test fixtures shared by the unit tests.
#[cfg(test)]
pub mod test_fixtures;

pub use config::EngineConfig;
pub use error::GameError;
pub use game::{Actor, Game, GameGuard, GameState, LoadReport, ProposalInfo, RefreshReport};
pub use registry::GameRegistry;
