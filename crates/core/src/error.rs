use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeerscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Metadata error: {0}")]
    Metadata(#[from] peerscope_api::MetadataError),
    #[error("Format error at line {line}: {message}")]
    Format { line: usize, message: String },
}

impl PeerscopeError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PeerscopeError>;
