pub mod error;
pub mod metadata;
pub mod models;

// Re-export commonly used types
pub use error::{MetadataError, MetadataResult};
pub use metadata::{
    AssemblyMetadata, AssemblyMetadataReader, AttributeMetadata, TypeMetadata, TypeRef,
};
pub use models::*;
