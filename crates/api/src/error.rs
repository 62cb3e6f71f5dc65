#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Unreadable assembly '{path}': {reason}")]
    UnreadableAssembly { path: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MetadataResult<T> = std::result::Result<T, MetadataError>;
