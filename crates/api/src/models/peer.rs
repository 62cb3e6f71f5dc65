use serde::{Deserialize, Serialize};

use super::attribute::ComponentAttributeInfo;

/// Android manifest component categories. The discriminants are the wire
/// values written on the component data file's `KIND:` line and must not be
/// reordered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    #[default]
    None = 0,
    Activity = 1,
    Service = 2,
    BroadcastReceiver = 3,
    ContentProvider = 4,
    Application = 5,
    Instrumentation = 6,
}

impl ComponentKind {
    pub fn as_wire(self) -> i32 {
        self as i32
    }

    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Activity),
            2 => Some(Self::Service),
            3 => Some(Self::BroadcastReceiver),
            4 => Some(Self::ContentProvider),
            5 => Some(Self::Application),
            6 => Some(Self::Instrumentation),
            _ => None,
        }
    }
}

/// Manifest-relevant attribute data attached to a peer type: the component
/// declaration itself plus any intent filter, meta-data, property, layout
/// and grant-uri-permission attributes found alongside it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ComponentData {
    pub kind: ComponentKind,
    pub component_attribute: Option<ComponentAttributeInfo>,
    pub intent_filters: Vec<ComponentAttributeInfo>,
    pub meta_data_entries: Vec<ComponentAttributeInfo>,
    pub property_attributes: Vec<ComponentAttributeInfo>,
    pub layout_attribute: Option<ComponentAttributeInfo>,
    pub grant_uri_permissions: Vec<ComponentAttributeInfo>,
}

impl ComponentData {
    /// Every attribute instance held by this component, the component
    /// declaration first. The reachability pass walks these looking for
    /// type-valued properties.
    pub fn all_attributes(&self) -> impl Iterator<Item = &ComponentAttributeInfo> {
        self.component_attribute
            .iter()
            .chain(self.intent_filters.iter())
            .chain(self.meta_data_entries.iter())
            .chain(self.property_attributes.iter())
            .chain(self.layout_attribute.iter())
            .chain(self.grant_uri_permissions.iter())
    }
}

/// One managed type that has, or needs, a corresponding JVM-visible class.
/// Records are built in a single scan pass and immutable afterwards, apart
/// from `is_unconditional` which the reachability pass flips.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PeerInfo {
    /// Fully-qualified CLR type name, e.g. "MyApp.MainActivity".
    /// Unique within its assembly.
    pub managed_type_name: String,
    /// Owning assembly's simple name.
    pub assembly_name: String,
    /// JNI-internal name, slash-separated, e.g. "my/app/MainActivity".
    pub java_name: String,
    /// Legacy compatibility name (slash form). Opaque to all consumers.
    pub compat_java_name: String,
    pub is_abstract: bool,
    /// Whether an activation constructor is available, on the type itself or
    /// inherited through its base chain.
    pub has_activation_constructor: bool,
    /// True for framework binding types (MCWs) that already exist on the
    /// Java side. Excluded from name-mapping output, but the record still
    /// participates in hierarchy resolution and reachability.
    pub suppress_mapping: bool,
    pub component_data: Option<ComponentData>,
    /// Computed, never declared: true when the trimmer must not remove this
    /// type because the Android runtime instantiates it by name.
    pub is_unconditional: bool,
}

impl PeerInfo {
    pub fn component_kind(&self) -> ComponentKind {
        self.component_data
            .as_ref()
            .map(|d| d.kind)
            .unwrap_or(ComponentKind::None)
    }
}
