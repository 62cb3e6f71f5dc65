//! Peer model scanner.
//!
//! Reads type and attribute metadata from a closed set of assemblies (the
//! build target first, then its references) and produces the `PeerInfo`
//! registry. Two passes: first an assembly-spanning name index is built with
//! no edges resolved, then every type is analyzed against that index so
//! base-type and interface edges that cross assembly boundaries resolve by
//! name lookup, independent of load order.

mod component;
mod naming;
mod reachability;

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use peerscope_api::{
    AssemblyMetadata, AssemblyMetadataReader, AttributeValue, PeerInfo, TypeMetadata, TypeRef,
};
use tracing::{debug, warn};

use crate::error::Result;

/// The in-memory result of a scan: one record per managed type that has (or
/// might need) a Java peer, keyed by managed type name. Discarded at the end
/// of the build step; nothing persists between invocations.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: IndexMap<String, PeerInfo>,
}

impl PeerRegistry {
    pub fn get(&self, managed_type_name: &str) -> Option<&PeerInfo> {
        self.peers.get(managed_type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerInfo> {
        self.peers.values()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// The filter step between the scanner and the per-assembly consumers:
    /// records whose owning assembly equals the build target.
    pub fn for_assembly(&self, assembly_name: &str) -> Vec<&PeerInfo> {
        self.peers
            .values()
            .filter(|p| p.assembly_name == assembly_name)
            .collect()
    }

    fn insert(&mut self, peer: PeerInfo) {
        self.peers.insert(peer.managed_type_name.clone(), peer);
    }

    fn mark_unconditional(&mut self, managed_type_name: &str) -> bool {
        match self.peers.get_mut(managed_type_name) {
            Some(peer) => {
                peer.is_unconditional = true;
                true
            }
            None => false,
        }
    }
}

/// All supplied assemblies, indexed by simple name for edge resolution.
#[derive(Default)]
struct AssemblyIndex {
    assemblies: IndexMap<String, AssemblyMetadata>,
}

impl AssemblyIndex {
    fn insert(&mut self, assembly: AssemblyMetadata) {
        self.assemblies
            .insert(assembly.assembly_name.clone(), assembly);
    }

    fn resolve(&self, type_ref: &TypeRef) -> Option<&TypeMetadata> {
        self.assemblies
            .get(&type_ref.assembly_name)?
            .types
            .iter()
            .find(|t| t.full_name == type_ref.full_name)
    }
}

struct RegisterInfo {
    jni_name: String,
    suppress_mapping: bool,
}

pub struct PeerScanner<'r> {
    reader: &'r dyn AssemblyMetadataReader,
}

impl<'r> PeerScanner<'r> {
    pub fn new(reader: &'r dyn AssemblyMetadataReader) -> Self {
        Self { reader }
    }

    /// Scans the target assembly and its references and returns the full
    /// registry for all of them; callers filter with
    /// [`PeerRegistry::for_assembly`] afterwards. An unreadable assembly
    /// aborts the scan.
    pub fn scan<P: AsRef<Path>>(&self, assembly_paths: &[P]) -> Result<PeerRegistry> {
        let mut index = AssemblyIndex::default();
        for path in assembly_paths {
            let path = path.as_ref();
            let assembly = self.reader.read_assembly(path)?;
            debug!(
                assembly = %assembly.assembly_name,
                types = assembly.types.len(),
                path = %path.display(),
                "indexed assembly"
            );
            index.insert(assembly);
        }

        let mut registry = PeerRegistry::default();
        let mut peer_base_cache: HashMap<String, bool> = HashMap::new();

        for assembly in index.assemblies.values() {
            for ty in &assembly.types {
                if let Some(peer) = build_peer(ty, assembly, &index, &mut peer_base_cache) {
                    registry.insert(peer);
                }
            }
        }

        reachability::propagate_unconditional(&mut registry);

        Ok(registry)
    }
}

fn build_peer(
    ty: &TypeMetadata,
    assembly: &AssemblyMetadata,
    index: &AssemblyIndex,
    peer_base_cache: &mut HashMap<String, bool>,
) -> Option<PeerInfo> {
    let register = register_info(ty);
    let component_data = component::build_component_data(ty);

    // Java-name precedence: [Register]-style explicit JNI name, then the
    // component attribute's Name property, then the CLR-derived fallback.
    let (java_name, compat_java_name, suppress_mapping) = if let Some(reg) = &register {
        (reg.jni_name.clone(), reg.jni_name.clone(), reg.suppress_mapping)
    } else if let Some(name) = component_data.as_ref().and_then(component::declared_name) {
        let jni = naming::dots_to_slashes(name);
        (jni.clone(), jni, false)
    } else if component_data.is_some()
        || derives_from_peer(ty, &assembly.assembly_name, index, peer_base_cache)
    {
        (
            naming::fallback_java_name(&ty.full_name),
            naming::compat_java_name(&ty.full_name),
            false,
        )
    } else {
        // Not JVM-visible: no explicit name, no component, no peer ancestry.
        return None;
    };

    let is_unconditional = component_data.is_some();

    Some(PeerInfo {
        managed_type_name: ty.full_name.clone(),
        assembly_name: assembly.assembly_name.clone(),
        java_name,
        compat_java_name,
        is_abstract: ty.is_abstract,
        has_activation_constructor: resolve_activation_ctor(ty, index),
        suppress_mapping,
        component_data,
        is_unconditional,
    })
}

/// The explicit JNI-name attribute, when present and readable. Its first
/// constructor argument is the JNI name; the `DoNotGenerateAcw` property
/// marks framework binding types that already exist on the Java side.
fn register_info(ty: &TypeMetadata) -> Option<RegisterInfo> {
    for attr in &ty.attributes {
        if component::short_name(&attr.attribute_type) != "RegisterAttribute" {
            continue;
        }
        if let Some(reason) = &attr.read_error {
            warn!(
                managed_type = %ty.full_name,
                %reason,
                "skipping partially unreadable register attribute"
            );
            continue;
        }
        let jni_name = match attr.constructor_arguments.first() {
            Some(AttributeValue::Str(s)) if !s.is_empty() => s.clone(),
            _ => continue,
        };
        let suppress_mapping = matches!(
            attr.properties.get("DoNotGenerateAcw"),
            Some(AttributeValue::Bool(true))
        );
        return Some(RegisterInfo {
            jni_name,
            suppress_mapping,
        });
    }
    None
}

fn has_peer_marker(ty: &TypeMetadata) -> bool {
    ty.attributes.iter().any(|attr| {
        attr.read_error.is_none()
            && (component::short_name(&attr.attribute_type) == "RegisterAttribute"
                || component::component_kind_for(&attr.attribute_type).is_some())
    })
}

/// Whether the type reaches a known Java peer through its base chain or any
/// implemented interface. Memoized per "assembly:type" key; the entry is
/// seeded false before recursing so reference cycles terminate.
fn derives_from_peer(
    ty: &TypeMetadata,
    assembly_name: &str,
    index: &AssemblyIndex,
    cache: &mut HashMap<String, bool>,
) -> bool {
    let key = format!("{}:{}", assembly_name, ty.full_name);
    if let Some(&cached) = cache.get(&key) {
        return cached;
    }
    cache.insert(key.clone(), false);

    let mut edges: Vec<&TypeRef> = Vec::with_capacity(1 + ty.interfaces.len());
    if let Some(base) = &ty.base_type {
        edges.push(base);
    }
    edges.extend(ty.interfaces.iter());

    let mut result = false;
    for edge in edges {
        let Some(target) = index.resolve(edge) else {
            continue;
        };
        if has_peer_marker(target)
            || derives_from_peer(target, &edge.assembly_name, index, cache)
        {
            result = true;
            break;
        }
    }

    cache.insert(key, result);
    result
}

/// A peer without its own activation constructor inherits the answer from
/// the nearest base that declares one.
fn resolve_activation_ctor(ty: &TypeMetadata, index: &AssemblyIndex) -> bool {
    if ty.declares_activation_constructor {
        return true;
    }
    let mut seen: Vec<&TypeRef> = Vec::new();
    let mut current = ty.base_type.as_ref();
    while let Some(base_ref) = current {
        if seen.iter().any(|s| *s == base_ref) {
            break;
        }
        seen.push(base_ref);
        let Some(base) = index.resolve(base_ref) else {
            break;
        };
        if base.declares_activation_constructor {
            return true;
        }
        current = base.base_type.as_ref();
    }
    false
}
