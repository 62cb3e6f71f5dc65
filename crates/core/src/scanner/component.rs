//! Component attribute detection and `ComponentData` assembly.

use peerscope_api::{
    AttributeKind, AttributeMetadata, AttributeValue, ComponentAttributeInfo, ComponentData,
    ComponentKind, TypeMetadata,
};
use tracing::warn;

/// Maps a component-declaring attribute to its manifest kind, by short name.
pub(crate) fn component_kind_for(attribute_type: &str) -> Option<ComponentKind> {
    match short_name(attribute_type) {
        "ActivityAttribute" => Some(ComponentKind::Activity),
        "ServiceAttribute" => Some(ComponentKind::Service),
        "BroadcastReceiverAttribute" => Some(ComponentKind::BroadcastReceiver),
        "ContentProviderAttribute" => Some(ComponentKind::ContentProvider),
        "ApplicationAttribute" => Some(ComponentKind::Application),
        "InstrumentationAttribute" => Some(ComponentKind::Instrumentation),
        _ => None,
    }
}

pub(crate) fn short_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

/// Builds the manifest-relevant view of a type: the first recognized
/// component attribute plus any sub-attributes (intent filters, meta-data,
/// properties, layout, grant-uri-permissions) found on the same type.
/// Returns `None` for types that declare no component.
///
/// Attributes the reader could not fully decode are skipped, not fatal: the
/// record keeps whatever was determinable.
pub(crate) fn build_component_data(ty: &TypeMetadata) -> Option<ComponentData> {
    let mut data = ComponentData::default();

    for attr in &ty.attributes {
        if let Some(reason) = &attr.read_error {
            warn!(
                managed_type = %ty.full_name,
                attribute = %attr.attribute_type,
                %reason,
                "skipping partially unreadable attribute"
            );
            continue;
        }

        if let Some(kind) = component_kind_for(&attr.attribute_type) {
            if data.component_attribute.is_none() {
                data.kind = kind;
                data.component_attribute = Some(to_info(attr, AttributeKind::Component));
            }
            continue;
        }

        match AttributeKind::from_sub_attribute_type(&attr.attribute_type) {
            Some(AttributeKind::IntentFilter) => {
                data.intent_filters.push(to_info(attr, AttributeKind::IntentFilter));
            }
            Some(AttributeKind::MetaData) => {
                data.meta_data_entries.push(to_info(attr, AttributeKind::MetaData));
            }
            Some(AttributeKind::Property) => {
                data.property_attributes.push(to_info(attr, AttributeKind::Property));
            }
            Some(AttributeKind::Layout) => {
                data.layout_attribute = Some(to_info(attr, AttributeKind::Layout));
            }
            Some(AttributeKind::GrantUriPermission) => {
                data.grant_uri_permissions
                    .push(to_info(attr, AttributeKind::GrantUriPermission));
            }
            Some(AttributeKind::Component) | None => {}
        }
    }

    if data.component_attribute.is_some() {
        Some(data)
    } else {
        None
    }
}

/// The component attribute's own `Name` property, when present; precedence
/// step 2 of Java-name resolution.
pub(crate) fn declared_name(data: &ComponentData) -> Option<&str> {
    let attr = data.component_attribute.as_ref()?;
    match attr.properties.get("Name") {
        Some(AttributeValue::Str(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn to_info(attr: &AttributeMetadata, kind: AttributeKind) -> ComponentAttributeInfo {
    ComponentAttributeInfo {
        attribute_type: attr.attribute_type.clone(),
        kind,
        properties: attr.properties.clone(),
        constructor_arguments: attr.constructor_arguments.clone(),
    }
}
