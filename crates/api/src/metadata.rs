//! Collaborator boundary with the assembly metadata reader.
//!
//! The pipeline never touches PE/ECMA-335 details itself: an
//! [`AssemblyMetadataReader`] implementation decodes assembly files into the
//! record types below, and everything downstream is a pure function of them.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::MetadataResult;
use crate::models::AttributeValue;

/// A type as referenced from metadata: the full CLR name plus the simple
/// name of the assembly expected to declare it. Edges between assemblies are
/// carried by name and resolved later against a shared index, so load order
/// and reference cycles never matter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub full_name: String,
    pub assembly_name: String,
}

impl TypeRef {
    pub fn new(full_name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            assembly_name: assembly_name.into(),
        }
    }
}

/// One custom-attribute instance as decoded from metadata.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AttributeMetadata {
    /// Declared attribute type's full name.
    pub attribute_type: String,
    pub constructor_arguments: Vec<AttributeValue>,
    /// Named properties, in blob order.
    pub properties: IndexMap<String, AttributeValue>,
    /// Set when the reader could only partially decode the attribute blob.
    /// The scanner keeps the owning type's record but drops the attribute.
    pub read_error: Option<String>,
}

impl AttributeMetadata {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            ..Default::default()
        }
    }
}

/// One type declaration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TypeMetadata {
    /// Full CLR name; nested types use '+' (e.g. "My.Outer+Inner"), generic
    /// definitions carry their arity marker (e.g. "My.Adapter`1").
    pub full_name: String,
    pub namespace: String,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub generic_parameter_count: u32,
    pub base_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    /// True when the type declares its own activation constructor. A type
    /// without one may still inherit it; the scanner resolves that through
    /// the base chain.
    pub declares_activation_constructor: bool,
    pub attributes: Vec<AttributeMetadata>,
}

/// Everything the pipeline needs from one assembly file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AssemblyMetadata {
    /// Simple name, no version/culture/key.
    pub assembly_name: String,
    pub types: Vec<TypeMetadata>,
}

/// Decodes raw assembly metadata from a file. A failure here is fatal to the
/// whole scan; per-attribute decode problems are instead surfaced through
/// [`AttributeMetadata::read_error`] and recovered by the scanner.
pub trait AssemblyMetadataReader {
    fn read_assembly(&self, path: &Path) -> MetadataResult<AssemblyMetadata>;
}
