//! Name-mapping builder and conflict detector.
//!
//! Per-assembly build steps call [`create_entries`] and write their own
//! slice; a single final step merges every assembly's entries through
//! [`write_map_to_file`], which is where cross-assembly conflicts surface.
//! Java-name collisions (XA4215) would produce two colliding Java classes at
//! runtime, so the merge artifact is suppressed entirely; managed-name
//! collisions (XA4214) only confuse .NET-side reflection and stay advisory.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use peerscope_api::PeerInfo;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::scanner::PeerRegistry;

/// Diagnostic codes, kept stable for downstream tooling.
pub const XA4214: &str = "XA4214";
pub const XA4215: &str = "XA4215";

/// One row of the name-mapping output (three lines on disk).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AcwMapEntry {
    /// Dotted JVM name, e.g. "my.app.MainActivity".
    pub java_key: String,
    /// CLR type name.
    pub managed_key: String,
    /// "Type, Assembly" — no version/culture/key.
    pub qualified_managed_name: String,
    /// Legacy compatibility name, dotted.
    pub compat_java_key: String,
    pub assembly_name: String,
}

impl AcwMapEntry {
    fn from_peer(peer: &PeerInfo) -> Self {
        Self {
            java_key: peer.java_name.replace('/', "."),
            managed_key: peer.managed_type_name.clone(),
            qualified_managed_name: format!(
                "{}, {}",
                peer.managed_type_name, peer.assembly_name
            ),
            compat_java_key: peer.compat_java_name.replace('/', "."),
            assembly_name: peer.assembly_name.clone(),
        }
    }
}

/// Conflicts found while computing a map over merged entries.
#[derive(Debug, Default)]
pub struct MapWriteResult {
    /// Java key -> qualified managed names claiming it from distinct
    /// assemblies. Any entry here is an XA4215 error.
    pub java_conflicts: BTreeMap<String, Vec<String>>,
    /// Managed key -> assembly names claiming it. Any entry here is an
    /// XA4214 warning.
    pub managed_conflicts: BTreeMap<String, Vec<String>>,
}

impl MapWriteResult {
    pub fn has_errors(&self) -> bool {
        !self.java_conflicts.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.managed_conflicts.is_empty()
    }
}

/// Pure projection of one assembly's slice of the registry: excludes
/// suppressed (MCW) records, converts JNI names to dotted form. No conflict
/// checking happens here, so concurrent build nodes can run this per
/// assembly independently.
pub fn create_entries(registry: &PeerRegistry, assembly_name: &str) -> Vec<AcwMapEntry> {
    registry
        .for_assembly(assembly_name)
        .into_iter()
        .filter(|p| !p.suppress_mapping)
        .map(AcwMapEntry::from_peer)
        .collect()
}

/// Sorts entries by managed key (ordinal, ascending) and writes exactly
/// three semicolon-delimited lines per entry. Conflicts are detected over
/// the full supplied set; output is still written when only warnings are
/// present, and callers that must not publish an erroneous map use
/// [`write_map_to_file`].
pub fn write_map<W: Write>(entries: &[AcwMapEntry], sink: &mut W) -> Result<MapWriteResult> {
    let mut sorted: Vec<&AcwMapEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.managed_key.cmp(&b.managed_key));

    for entry in &sorted {
        writeln!(sink, "{};{}", entry.qualified_managed_name, entry.java_key)?;
        writeln!(sink, "{};{}", entry.managed_key, entry.java_key)?;
        writeln!(sink, "{};{}", entry.compat_java_key, entry.java_key)?;
    }

    Ok(detect_conflicts(&sorted))
}

/// Computes the map and writes it to `path`, with two guards: nothing is
/// written when the result has errors (a stale prior file must not silently
/// appear usable, and incremental builds will retry), and an unchanged map
/// is not rewritten so the file's modification time does not trigger
/// needless downstream rebuilds.
pub fn write_map_to_file(entries: &[AcwMapEntry], path: &Path) -> Result<MapWriteResult> {
    let mut buf: Vec<u8> = Vec::new();
    let result = write_map(entries, &mut buf)?;

    for (managed_key, assemblies) in &result.managed_conflicts {
        warn!(
            code = XA4214,
            managed_type = %managed_key,
            assemblies = ?assemblies,
            "managed type name registered by multiple assemblies"
        );
    }

    if result.has_errors() {
        for (java_key, types) in &result.java_conflicts {
            error!(
                code = XA4215,
                java_type = %java_key,
                types = ?types,
                "Java type name produced by multiple assemblies; map file not written"
            );
        }
        return Ok(result);
    }

    if std::fs::read(path).is_ok_and(|current| current == buf) {
        debug!(path = %path.display(), "map unchanged, skipping write");
        return Ok(result);
    }

    std::fs::write(path, &buf)?;
    Ok(result)
}

fn detect_conflicts(entries: &[&AcwMapEntry]) -> MapWriteResult {
    // Group keys across the whole set; a key is a conflict only when held by
    // two or more distinct assemblies. Same-assembly duplicates are a
    // legitimate re-derivation, never a conflict.
    let mut by_java: BTreeMap<&str, (BTreeSet<&str>, Vec<&str>)> = BTreeMap::new();
    let mut by_managed: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for entry in entries {
        let java = by_java.entry(entry.java_key.as_str()).or_default();
        java.0.insert(entry.assembly_name.as_str());
        java.1.push(entry.qualified_managed_name.as_str());

        by_managed
            .entry(entry.managed_key.as_str())
            .or_default()
            .insert(entry.assembly_name.as_str());
    }

    let mut result = MapWriteResult::default();

    for (java_key, (assemblies, claimants)) in by_java {
        if assemblies.len() >= 2 {
            result.java_conflicts.insert(
                java_key.to_string(),
                claimants.iter().map(|c| c.to_string()).collect(),
            );
        }
    }

    for (managed_key, assemblies) in by_managed {
        if assemblies.len() >= 2 {
            result.managed_conflicts.insert(
                managed_key.to_string(),
                assemblies.iter().map(|a| a.to_string()).collect(),
            );
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(java: &str, managed: &str, assembly: &str) -> AcwMapEntry {
        AcwMapEntry {
            java_key: java.to_string(),
            managed_key: managed.to_string(),
            qualified_managed_name: format!("{managed}, {assembly}"),
            compat_java_key: java.to_string(),
            assembly_name: assembly.to_string(),
        }
    }

    #[test]
    fn empty_input_writes_nothing() {
        let mut sink = Vec::new();
        let result = write_map(&[], &mut sink).unwrap();
        assert!(sink.is_empty());
        assert!(!result.has_errors());
        assert!(!result.has_warnings());
    }

    #[test]
    fn conflict_requires_distinct_assemblies() {
        let entries = [
            entry("dup.Type", "A.Type", "Asm"),
            entry("dup.Type", "B.Type", "Asm"),
        ];
        let mut sink = Vec::new();
        let result = write_map(&entries, &mut sink).unwrap();
        assert!(!result.has_errors());
    }

    #[test]
    fn java_conflict_lists_all_claimants() {
        let entries = [
            entry("dup.Type", "A.Type", "AsmA"),
            entry("dup.Type", "B.Type", "AsmB"),
        ];
        let mut sink = Vec::new();
        let result = write_map(&entries, &mut sink).unwrap();
        let claimants = &result.java_conflicts["dup.Type"];
        assert_eq!(claimants, &vec!["A.Type, AsmA".to_string(), "B.Type, AsmB".to_string()]);
    }
}
