pub mod attribute;
pub mod peer;

pub use attribute::{AttributeKind, AttributeValue, ComponentAttributeInfo};
pub use peer::{ComponentData, ComponentKind, PeerInfo};
