//! Environment-driven configuration.

/// Settings read from the process environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// SQLite file holding one game document per guild.
    pub db_path: String,
}

impl EngineConfig {
    pub const DEFAULT_DB_PATH: &'static str = "nomic.db";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("NOMIC_DB_PATH")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_DB_PATH.into());
        Self { db_path }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: Self::DEFAULT_DB_PATH.into(),
        }
    }
}
