use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("lesson \"{path}\" was not found")]
    LessonNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("keyboard layout \"{path}\" was not found")]
    LayoutNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("keyboard layout \"{path}\" is not valid JSON")]
    MalformedLayout {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed stats record: {0}")]
    MalformedRecord(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
