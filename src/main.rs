use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use folio::{App, Config, Credentials, DocumentStore, Server, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::parse();

    let credentials = Credentials::load(&config.users)?;
    if credentials.is_empty() {
        warn!(users = %config.users.display(), "no users configured, nobody can sign in");
    }
    let documents = DocumentStore::open(&config.data_dir)
        .await
        .with_context(|| format!("cannot open data directory {}", config.data_dir.display()))?;
    let sessions = SessionStore::new()
        .with_ttl(config.session_ttl())
        .with_max_sessions(config.max_sessions);
    info!(data_dir = %config.data_dir.display(), users = credentials.len(), "folio starting");

    Server::bind(config.bind)
        .serve(App::new(documents, credentials).with_sessions(sessions))
        .await?;
    Ok(())
}
