#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use peerscope_api::{
    AssemblyMetadata, AssemblyMetadataReader, AttributeMetadata, AttributeValue, MetadataError,
    MetadataResult, TypeMetadata, TypeRef,
};

/// In-memory stand-in for the PE metadata reader collaborator: maps paths to
/// pre-built assembly records.
pub struct FakeAssemblyReader {
    assemblies: HashMap<PathBuf, AssemblyMetadata>,
}

impl FakeAssemblyReader {
    pub fn new() -> Self {
        Self {
            assemblies: HashMap::new(),
        }
    }

    pub fn add(&mut self, path: &str, assembly: AssemblyMetadata) {
        self.assemblies.insert(PathBuf::from(path), assembly);
    }
}

impl AssemblyMetadataReader for FakeAssemblyReader {
    fn read_assembly(&self, path: &Path) -> MetadataResult<AssemblyMetadata> {
        self.assemblies.get(path).cloned().ok_or_else(|| {
            MetadataError::UnreadableAssembly {
                path: path.display().to_string(),
                reason: "no such assembly".to_string(),
            }
        })
    }
}

pub fn assembly(name: &str, types: Vec<TypeMetadata>) -> AssemblyMetadata {
    AssemblyMetadata {
        assembly_name: name.to_string(),
        types,
    }
}

pub fn plain_type(full_name: &str) -> TypeMetadata {
    let namespace = match full_name.rfind('.') {
        Some(dot) => full_name[..dot].to_string(),
        None => String::new(),
    };
    TypeMetadata {
        full_name: full_name.to_string(),
        namespace,
        declares_activation_constructor: true,
        ..Default::default()
    }
}

pub fn subclass_of(full_name: &str, base: &str, base_assembly: &str) -> TypeMetadata {
    let mut ty = plain_type(full_name);
    ty.base_type = Some(TypeRef::new(base, base_assembly));
    ty
}

/// A [Register]-style explicit JNI name attribute.
pub fn register_attr(jni_name: &str) -> AttributeMetadata {
    let mut attr = AttributeMetadata::new("Android.Runtime.RegisterAttribute");
    attr.constructor_arguments
        .push(AttributeValue::Str(jni_name.to_string()));
    attr
}

/// A framework binding's register attribute (DoNotGenerateAcw = true).
pub fn mcw_register_attr(jni_name: &str) -> AttributeMetadata {
    let mut attr = register_attr(jni_name);
    attr.properties
        .insert("DoNotGenerateAcw".to_string(), AttributeValue::Bool(true));
    attr
}

pub fn component_attr(attribute_type: &str) -> AttributeMetadata {
    AttributeMetadata::new(attribute_type)
}

pub fn activity_attr() -> AttributeMetadata {
    component_attr("Android.App.ActivityAttribute")
}

pub fn service_attr() -> AttributeMetadata {
    component_attr("Android.App.ServiceAttribute")
}

pub fn application_attr() -> AttributeMetadata {
    component_attr("Android.App.ApplicationAttribute")
}

/// A minimal Mono.Android-like framework assembly: registered MCW bases the
/// user types under test can extend.
pub fn framework_assembly() -> AssemblyMetadata {
    let mut activity = plain_type("Android.App.Activity");
    activity.attributes.push(mcw_register_attr("android/app/Activity"));

    let mut service = plain_type("Android.App.Service");
    service.attributes.push(mcw_register_attr("android/app/Service"));

    let mut application = plain_type("Android.App.Application");
    application
        .attributes
        .push(mcw_register_attr("android/app/Application"));

    let mut backup_agent = plain_type("Android.App.Backup.BackupAgent");
    backup_agent
        .attributes
        .push(mcw_register_attr("android/app/backup/BackupAgent"));

    let mut java_object = plain_type("Java.Lang.Object");
    java_object
        .attributes
        .push(mcw_register_attr("java/lang/Object"));

    assembly(
        "Mono.Android",
        vec![activity, service, application, backup_agent, java_object],
    )
}
