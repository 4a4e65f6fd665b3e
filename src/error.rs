use std::path::PathBuf;

use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transcription request failed to send: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("transcription service returned {status}: {message}")]
    Remote {
        status: StatusCode,
        message: String,
    },

    #[error("unexpected transcription response: {0}")]
    DataShape(String),

    #[error("{0} is not set")]
    MissingCredentials(&'static str),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
