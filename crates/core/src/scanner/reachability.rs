//! Marks types the trimmer must never remove.
//!
//! The root set is every component-kind type (marked at record creation).
//! This pass adds the single level beyond it: component attributes may name
//! other managed types in type-valued properties (an Application's backup
//! agent, a "manage space" activity) and the Android runtime instantiates
//! those reflectively even though they carry no component attribute of
//! their own. Only component attributes carry such references, so one pass
//! over a bounded root set suffices; there is nothing to re-scan
//! transitively.

use peerscope_api::AttributeValue;
use tracing::debug;

use super::PeerRegistry;

pub(crate) fn propagate_unconditional(registry: &mut PeerRegistry) {
    let mut targets: Vec<String> = Vec::new();

    for peer in registry.iter() {
        let Some(data) = &peer.component_data else {
            continue;
        };
        for attr in data.all_attributes() {
            for value in attr.properties.values() {
                if let AttributeValue::TypeRef(name) = value {
                    targets.push(name.clone());
                }
            }
        }
    }

    for raw in targets {
        if !mark(registry, &raw) {
            // A dangling reference is not fatal to the scan.
            debug!(type_reference = %raw, "unresolved type reference; leaving unmarked");
        }
    }
}

/// References may be plain ("Ns.Type") or assembly-qualified
/// ("Ns.Type, Assembly, Version=..."). Try the exact string first, then the
/// part before the first comma.
fn mark(registry: &mut PeerRegistry, raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return false;
    }
    if registry.mark_unconditional(raw) {
        return true;
    }
    match raw.split_once(',') {
        Some((type_name, _)) => {
            let type_name = type_name.trim();
            !type_name.is_empty() && registry.mark_unconditional(type_name)
        }
        None => false,
    }
}
