use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A property or constructor-argument value carried by a manifest-relevant
/// attribute. Closed sum so the component-data codec's encode/decode match
/// is exhaustive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Str(String),
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    StrArray(Vec<String>),
    /// A managed type named by the attribute (e.g. an Application's backup
    /// agent class). The name is a join key back into the peer registry;
    /// the writer side never resolves it.
    TypeRef(String),
}

/// Which manifest bucket an attribute belongs to. Resolved once, during
/// scanning, from the declared attribute type name's suffix; the component
/// data deserializer runs the same match when it reads a file back in a
/// later build stage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Component,
    IntentFilter,
    MetaData,
    Property,
    Layout,
    GrantUriPermission,
}

impl AttributeKind {
    /// Classifies a sub-attribute by its declared type name's suffix.
    /// An unknown suffix yields `None`; the deserializer drops such blocks
    /// silently, the scanner never produces them.
    pub fn from_sub_attribute_type(type_name: &str) -> Option<Self> {
        if type_name.ends_with("IntentFilterAttribute") {
            Some(Self::IntentFilter)
        } else if type_name.ends_with("MetaDataAttribute") {
            Some(Self::MetaData)
        } else if type_name.ends_with("PropertyAttribute") {
            Some(Self::Property)
        } else if type_name.ends_with("LayoutAttribute") {
            Some(Self::Layout)
        } else if type_name.ends_with("GrantUriPermissionAttribute") {
            Some(Self::GrantUriPermission)
        } else {
            None
        }
    }
}

/// One recognized manifest-relevant attribute instance on a peer type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComponentAttributeInfo {
    /// Declared attribute type name, e.g. "Android.App.ActivityAttribute".
    pub attribute_type: String,
    pub kind: AttributeKind,
    /// Named properties, in declaration order.
    pub properties: IndexMap<String, AttributeValue>,
    pub constructor_arguments: Vec<AttributeValue>,
}

impl ComponentAttributeInfo {
    pub fn new(attribute_type: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            kind,
            properties: IndexMap::new(),
            constructor_arguments: Vec::new(),
        }
    }
}
