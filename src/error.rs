use std::io;

use thiserror::Error;

/// Errors reported to control-plane callers
#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not read: {0}")]
    Io(#[from] io::Error),
    #[error("Wrong data file format at line {line}: {content}")]
    Format { line: usize, content: String },
    #[error("Unable to deserialize: {0}")]
    Deserialize(#[from] serde_yaml::Error),
}
