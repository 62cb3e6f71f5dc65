//! Component data serializer.
//!
//! A restartable, line-oriented text format that carries manifest-component
//! metadata across a build-stage boundary, so the consumer never needs the
//! producer's in-memory type model. One block per type, blank line between
//! blocks; every value carries a short type tag. The format is consumed
//! bit-for-bit by a later stage and must stay stable.

use std::path::Path;

use indexmap::IndexMap;
use peerscope_api::{AttributeKind, AttributeValue, ComponentAttributeInfo, ComponentKind, PeerInfo};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PeerscopeError, Result};

const TYPE_PREFIX: &str = "TYPE:";
const KIND_PREFIX: &str = "KIND:";
const JAVA_PREFIX: &str = "JAVA:";
const ABSTRACT_PREFIX: &str = "ABSTRACT:";
const DEFCTOR_PREFIX: &str = "DEFCTOR:";
const ATTR_PREFIX: &str = "ATTR:";
const PROP_PREFIX: &str = "PROP:";
const CTOR_ARG_PREFIX: &str = "CTORARG:";
const SUB_ATTR_PREFIX: &str = "SUBATTR:";
const SUB_PROP_PREFIX: &str = "SUBPROP:";
const SUB_CTOR_ARG_PREFIX: &str = "SUBCTORARG:";
const END_ATTR: &str = "ENDATTR";
const END_SUB_ATTR: &str = "ENDSUBATTR";
const END_TYPE: &str = "ENDTYPE";

/// String arrays are joined with the ASCII unit separator.
const UNIT_SEPARATOR: char = '\u{1F}';

/// What a later build stage reads back: the manifest-relevant view of one
/// peer type. The namespace is re-derived from the dotted full name rather
/// than stored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ManifestTypeInfo {
    pub full_name: String,
    pub namespace: String,
    pub component_kind: ComponentKind,
    /// Dotted Java name (converted from the slash form on read).
    pub java_name: String,
    pub compat_java_name: String,
    pub is_abstract: bool,
    pub has_default_constructor: bool,
    pub component_attribute: Option<ComponentAttributeInfo>,
    pub intent_filters: Vec<ComponentAttributeInfo>,
    pub meta_data_entries: Vec<ComponentAttributeInfo>,
    pub property_attributes: Vec<ComponentAttributeInfo>,
    pub layout_attribute: Option<ComponentAttributeInfo>,
    pub grant_uri_permissions: Vec<ComponentAttributeInfo>,
}

/// Writes one block per record with a non-`None` component kind; records
/// without manifest relevance are omitted entirely.
pub fn serialize<'a, I>(peers: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a PeerInfo>,
{
    std::fs::write(path, serialize_to_string(peers))?;
    Ok(())
}

pub fn serialize_to_string<'a, I>(peers: I) -> String
where
    I: IntoIterator<Item = &'a PeerInfo>,
{
    let mut out = String::new();
    let mut first = true;

    for peer in peers {
        let Some(data) = &peer.component_data else {
            continue;
        };
        if data.kind == ComponentKind::None {
            continue;
        }

        if !first {
            out.push('\n');
        }
        first = false;

        out.push_str(TYPE_PREFIX);
        out.push_str(&peer.managed_type_name);
        out.push('\n');

        out.push_str(KIND_PREFIX);
        out.push_str(&data.kind.as_wire().to_string());
        out.push('\n');

        out.push_str(JAVA_PREFIX);
        out.push_str(&peer.java_name);
        out.push('\n');

        out.push_str(ABSTRACT_PREFIX);
        out.push_str(if peer.is_abstract { "1" } else { "0" });
        out.push('\n');

        out.push_str(DEFCTOR_PREFIX);
        out.push_str(if peer.has_activation_constructor { "1" } else { "0" });
        out.push('\n');

        if let Some(attr) = &data.component_attribute {
            write_attribute(&mut out, attr, ATTR_PREFIX, PROP_PREFIX, CTOR_ARG_PREFIX, END_ATTR);
        }

        for sub in data
            .intent_filters
            .iter()
            .chain(data.meta_data_entries.iter())
            .chain(data.property_attributes.iter())
            .chain(data.layout_attribute.iter())
            .chain(data.grant_uri_permissions.iter())
        {
            write_attribute(
                &mut out,
                sub,
                SUB_ATTR_PREFIX,
                SUB_PROP_PREFIX,
                SUB_CTOR_ARG_PREFIX,
                END_SUB_ATTR,
            );
        }

        out.push_str(END_TYPE);
        out.push('\n');
    }

    out
}

fn write_attribute(
    out: &mut String,
    attr: &ComponentAttributeInfo,
    attr_prefix: &str,
    prop_prefix: &str,
    ctor_arg_prefix: &str,
    end_marker: &str,
) {
    out.push_str(attr_prefix);
    out.push_str(&attr.attribute_type);
    out.push('\n');

    for (key, value) in &attr.properties {
        out.push_str(prop_prefix);
        out.push_str(key);
        out.push('=');
        out.push_str(&encode_value(value));
        out.push('\n');
    }

    for arg in &attr.constructor_arguments {
        out.push_str(ctor_arg_prefix);
        out.push_str(&encode_value(arg));
        out.push('\n');
    }

    out.push_str(end_marker);
    out.push('\n');
}

/// Reads a component data file back in. The exact left inverse of
/// [`serialize`] for every emitted field; a missing file yields an empty
/// list (the producing stage had nothing manifest-relevant), a structurally
/// invalid one fails fast with the offending line.
pub fn deserialize(path: &Path) -> Result<Vec<ManifestTypeInfo>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    parse(&std::fs::read_to_string(path)?)
}

pub fn parse(text: &str) -> Result<Vec<ManifestTypeInfo>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }

        let Some(full_name) = lines[i].strip_prefix(TYPE_PREFIX) else {
            return Err(PeerscopeError::format(
                i + 1,
                format!("expected '{TYPE_PREFIX}', got: {}", lines[i]),
            ));
        };

        let mut info = ManifestTypeInfo {
            full_name: full_name.to_string(),
            ..Default::default()
        };
        i += 1;

        while i < lines.len() && lines[i] != END_TYPE {
            let line = lines[i];

            if let Some(value) = line.strip_prefix(KIND_PREFIX) {
                let raw: i32 = value.parse().map_err(|_| {
                    PeerscopeError::format(i + 1, format!("invalid component kind: {value}"))
                })?;
                info.component_kind = ComponentKind::from_wire(raw).ok_or_else(|| {
                    PeerscopeError::format(i + 1, format!("unknown component kind: {raw}"))
                })?;
            } else if let Some(value) = line.strip_prefix(JAVA_PREFIX) {
                info.java_name = value.replace('/', ".");
                info.compat_java_name = info.java_name.clone();
            } else if let Some(value) = line.strip_prefix(ABSTRACT_PREFIX) {
                info.is_abstract = value == "1";
            } else if let Some(value) = line.strip_prefix(DEFCTOR_PREFIX) {
                info.has_default_constructor = value == "1";
            } else if line.starts_with(ATTR_PREFIX) {
                let (attribute_type, properties, constructor_arguments) =
                    read_attribute(&lines, &mut i, ATTR_PREFIX, PROP_PREFIX, CTOR_ARG_PREFIX, END_ATTR)?;
                info.component_attribute = Some(ComponentAttributeInfo {
                    attribute_type,
                    kind: AttributeKind::Component,
                    properties,
                    constructor_arguments,
                });
                continue; // read_attribute advances past ENDATTR
            } else if line.starts_with(SUB_ATTR_PREFIX) {
                let (attribute_type, properties, constructor_arguments) = read_attribute(
                    &lines,
                    &mut i,
                    SUB_ATTR_PREFIX,
                    SUB_PROP_PREFIX,
                    SUB_CTOR_ARG_PREFIX,
                    END_SUB_ATTR,
                )?;
                classify_sub_attribute(
                    &mut info,
                    attribute_type,
                    properties,
                    constructor_arguments,
                );
                continue;
            }

            i += 1;
        }

        if i < lines.len() && lines[i] == END_TYPE {
            i += 1;
        }

        info.namespace = match info.full_name.rfind('.') {
            Some(last_dot) => info.full_name[..last_dot].to_string(),
            None => String::new(),
        };

        result.push(info);
    }

    Ok(result)
}

type RawAttribute = (String, IndexMap<String, AttributeValue>, Vec<AttributeValue>);

fn read_attribute(
    lines: &[&str],
    i: &mut usize,
    attr_prefix: &str,
    prop_prefix: &str,
    ctor_arg_prefix: &str,
    end_marker: &str,
) -> Result<RawAttribute> {
    let attribute_type = lines[*i][attr_prefix.len()..].to_string();
    *i += 1;

    let mut properties = IndexMap::new();
    let mut constructor_arguments = Vec::new();

    while *i < lines.len() && lines[*i] != end_marker {
        let line = lines[*i];

        if let Some(rest) = line.strip_prefix(prop_prefix) {
            if let Some((key, encoded)) = rest.split_once('=') {
                properties.insert(key.to_string(), decode_value(encoded, *i + 1)?);
            }
        } else if let Some(encoded) = line.strip_prefix(ctor_arg_prefix) {
            constructor_arguments.push(decode_value(encoded, *i + 1)?);
        }

        *i += 1;
    }

    if *i < lines.len() && lines[*i] == end_marker {
        *i += 1;
    }

    Ok((attribute_type, properties, constructor_arguments))
}

/// Buckets a sub-attribute by its declared type name's suffix. An
/// unrecognized suffix is dropped without a diagnostic; this preserves the
/// established forward-compatibility contract of the format.
fn classify_sub_attribute(
    info: &mut ManifestTypeInfo,
    attribute_type: String,
    properties: IndexMap<String, AttributeValue>,
    constructor_arguments: Vec<AttributeValue>,
) {
    let Some(kind) = AttributeKind::from_sub_attribute_type(&attribute_type) else {
        debug!(attribute_type = %attribute_type, "dropping unrecognized sub-attribute");
        return;
    };

    let attr = ComponentAttributeInfo {
        attribute_type,
        kind,
        properties,
        constructor_arguments,
    };

    match kind {
        AttributeKind::IntentFilter => info.intent_filters.push(attr),
        AttributeKind::MetaData => info.meta_data_entries.push(attr),
        AttributeKind::Property => info.property_attributes.push(attr),
        AttributeKind::Layout => info.layout_attribute = Some(attr),
        AttributeKind::GrantUriPermission => info.grant_uri_permissions.push(attr),
        AttributeKind::Component => {}
    }
}

fn encode_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Null => "null:".to_string(),
        AttributeValue::Str(s) => format!("s:{}", escape_string(s)),
        AttributeValue::Bool(b) => format!("b:{}", if *b { "1" } else { "0" }),
        AttributeValue::Int32(v) => format!("i:{v}"),
        AttributeValue::Int64(v) => format!("l:{v}"),
        AttributeValue::Float32(v) => format!("f:{v}"),
        AttributeValue::Float64(v) => format!("d:{v}"),
        AttributeValue::StrArray(items) => {
            let joined: Vec<String> = items
                .iter()
                .map(|v| v.replace('\\', "\\\\").replace(UNIT_SEPARATOR, "\\u001F"))
                .collect();
            format!("sa:{}", joined.join(&UNIT_SEPARATOR.to_string()))
        }
        // A type reference travels by name; the reader joins it back to a
        // registry if it needs to.
        AttributeValue::TypeRef(name) => format!("s:{}", escape_string(name)),
    }
}

fn decode_value(encoded: &str, line: usize) -> Result<AttributeValue> {
    if encoded.starts_with("null:") {
        return Ok(AttributeValue::Str(String::new()));
    }
    if let Some(rest) = encoded.strip_prefix("s:") {
        return Ok(AttributeValue::Str(unescape_string(rest)));
    }
    if let Some(rest) = encoded.strip_prefix("b:") {
        return Ok(AttributeValue::Bool(rest == "1"));
    }
    if let Some(rest) = encoded.strip_prefix("i:") {
        let v = rest
            .parse()
            .map_err(|_| PeerscopeError::format(line, format!("invalid int32: {rest}")))?;
        return Ok(AttributeValue::Int32(v));
    }
    if let Some(rest) = encoded.strip_prefix("l:") {
        let v = rest
            .parse()
            .map_err(|_| PeerscopeError::format(line, format!("invalid int64: {rest}")))?;
        return Ok(AttributeValue::Int64(v));
    }
    if let Some(rest) = encoded.strip_prefix("f:") {
        let v = rest
            .parse()
            .map_err(|_| PeerscopeError::format(line, format!("invalid float: {rest}")))?;
        return Ok(AttributeValue::Float32(v));
    }
    if let Some(rest) = encoded.strip_prefix("d:") {
        let v = rest
            .parse()
            .map_err(|_| PeerscopeError::format(line, format!("invalid double: {rest}")))?;
        return Ok(AttributeValue::Float64(v));
    }
    if let Some(rest) = encoded.strip_prefix("sa:") {
        let items = rest
            .split(UNIT_SEPARATOR)
            .map(|p| p.replace("\\u001F", &UNIT_SEPARATOR.to_string()).replace("\\\\", "\\"))
            .collect();
        return Ok(AttributeValue::StrArray(items));
    }

    // Untagged values pass through verbatim.
    Ok(AttributeValue::Str(encoded.to_string()))
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\\') => {
                    out.push('\\');
                    chars.next();
                }
                Some('n') => {
                    out.push('\n');
                    chars.next();
                }
                Some('r') => {
                    out.push('\r');
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}
