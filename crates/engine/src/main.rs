//! Nomic Engine - maintenance entry point.
//!
//! Works on the stored game documents without a chat connection:
//!
//! ```text
//! nomic-engine list               guilds with a stored game
//! nomic-engine check <guild>      report anything repaired on load
//! nomic-engine export <guild>     print the normalized document
//! nomic-engine normalize <guild>  rewrite the stored document in canonical form
//! ```

use std::sync::Arc;

use anyhow::{bail, Context};
use nomic_domain::GuildId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nomic_engine::infrastructure::{
    clock::SystemClock, offline::OfflineMessaging, ports::ClockPort, ports::GameStore,
    sqlite_store::SqliteGameStore,
};
use nomic_engine::{EngineConfig, GameRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nomic_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("usage: nomic-engine <list|check|export|normalize> [guild]");
    };

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    tracing::debug!("Opening game store at {}", config.db_path);
    let store = Arc::new(
        SqliteGameStore::new(&config.db_path, clock.clone())
            .await
            .with_context(|| format!("opening {}", config.db_path))?,
    );
    let registry = GameRegistry::new(store.clone(), Arc::new(OfflineMessaging), clock);

    if command == "list" {
        for guild in store.guilds().await? {
            println!("{guild}");
        }
        return Ok(());
    }

    let guild: GuildId = args
        .get(1)
        .context("missing guild ID")?
        .parse()
        .context("invalid guild ID")?;
    let game = registry.get_game(guild).await?;

    match command.as_str() {
        "check" => {
            let report = game.load_report();
            if report.is_clean() {
                println!("{guild}: ok");
            }
            for issue in &report.rule_issues {
                println!("{guild}: {issue}");
            }
            if report.renumbered > 0 {
                println!("{guild}: {} proposal numbers corrected", report.renumbered);
            }
        }
        "export" => {
            let snapshot = game.lock().await.export();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        "normalize" => {
            let guard = game.lock().await;
            guard.save().await?;
            tracing::info!(guild_id = %guild, "Normalized stored game");
        }
        other => bail!("unknown command: {other}"),
    }

    Ok(())
}
