//! Unified error type.

use std::path::PathBuf;

/// The error type returned by folio's fallible startup and server operations.
///
/// Application-level outcomes (422, redirects with a flash message, etc.) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces infrastructure failures: binding to a port, opening the
/// document directory, or loading the credentials file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot read credentials file {}: {source}", path.display())]
    CredentialsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse credentials file {}: {source}", path.display())]
    CredentialsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;

    #[test]
    fn io_errors_keep_their_source() {
        let err = Error::from(io::Error::new(io::ErrorKind::AddrInUse, "taken"));
        assert_eq!(err.to_string(), "io: taken");
        assert!(err.source().is_some());
    }

    #[test]
    fn credential_errors_name_the_file() {
        let err = Error::CredentialsRead {
            path: PathBuf::from("/etc/folio/users.yml"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/etc/folio/users.yml"));
    }
}
