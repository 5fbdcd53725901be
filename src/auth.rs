//! Static credential list.
//!
//! Users are not managed by the app. They come from a YAML file mapping each
//! username to a bcrypt hash:
//!
//! ```yaml
//! admin: $2b$12$kqoItNhiPLCZYtLfoUS38e/HUdqBhdhwq.TQpNv81S2/u.LaNtRX.
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use tracing::warn;

use crate::error::Error;

/// Password hashed into the stand-in hash checked for unknown usernames.
const DUMMY_PASSWORD: &str = "folio-unknown-user";

/// On-disk shape of the users file.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct UsersFile {
    users: Option<HashMap<String, String>>,
}

/// Username → bcrypt hash, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Credentials {
    users: HashMap<String, String>,
    /// Hash verified when the username is unknown, so both paths cost one
    /// bcrypt verification. Built on first use.
    dummy: Arc<OnceLock<String>>,
    dummy_cost: u32,
}

impl Default for Credentials {
    fn default() -> Self {
        Self::from_users(HashMap::new())
    }
}

/// Cost factor of a `$2b$12$...` style hash.
fn hash_cost(hash: &str) -> Option<u32> {
    hash.split('$')
        .nth(2)?
        .parse()
        .ok()
        .filter(|cost| (4..=31).contains(cost))
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let yaml = std::fs::read_to_string(path).map_err(|source| Error::CredentialsRead {
            path: path.to_owned(),
            source,
        })?;
        Self::from_yaml(&yaml).map_err(|source| Error::CredentialsParse {
            path: path.to_owned(),
            source,
        })
    }

    /// Parses the YAML mapping. An empty document means no users.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: UsersFile = serde_yaml::from_str(yaml)?;
        Ok(Self::from_users(file.users.unwrap_or_default()))
    }

    fn from_users(users: HashMap<String, String>) -> Self {
        let dummy_cost = users
            .values()
            .find_map(|hash| hash_cost(hash))
            .unwrap_or(bcrypt::DEFAULT_COST);
        Self { users, dummy: Arc::default(), dummy_cost }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Checks `password` against the stored hash for `username`.
    ///
    /// bcrypt is slow, so the comparison runs on the blocking pool. An
    /// unknown user is checked against a stand-in hash of the same cost and
    /// always fails, as does an unreadable stored hash.
    pub async fn validate(&self, username: &str, password: &str) -> bool {
        let stored = self.users.get(username).cloned();
        let dummy = Arc::clone(&self.dummy);
        let cost = self.dummy_cost;
        let password = password.to_owned();

        let check = move || match stored {
            Some(hash) => bcrypt::verify(password, &hash),
            None => {
                let dummy = dummy.get_or_init(|| {
                    bcrypt::hash(DUMMY_PASSWORD, cost).unwrap_or_default()
                });
                let _ = bcrypt::verify(password, dummy);
                Ok(false)
            }
        };
        match tokio::task::spawn_blocking(check).await {
            Ok(Ok(valid)) => valid,
            Ok(Err(e)) => {
                warn!(user = username, "stored password hash is unusable: {e}");
                false
            }
            Err(e) => {
                warn!(user = username, "password check did not complete: {e}");
                false
            }
        }
    }
}
