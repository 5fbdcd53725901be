//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::session::{DEFAULT_MAX_SESSIONS, DEFAULT_TTL};

/// Serve a directory of markdown and text documents.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "FOLIO_BIND", default_value = "127.0.0.1:4567")]
    pub bind: SocketAddr,

    /// Directory holding the documents. Created if missing.
    #[arg(long, env = "FOLIO_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// YAML file mapping usernames to bcrypt password hashes.
    #[arg(long, env = "FOLIO_USERS", default_value = "./users.yml")]
    pub users: PathBuf,

    /// Seconds a session may stay idle before it is forgotten.
    #[arg(long, env = "FOLIO_SESSION_TTL_SECS", default_value_t = DEFAULT_TTL.as_secs())]
    pub session_ttl_secs: u64,

    /// Maximum number of sessions kept in memory.
    #[arg(long, env = "FOLIO_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,
}

impl Config {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
