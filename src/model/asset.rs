use crate::model::{
    default_quantity, null_as_default, quantity_or_one, Dimension, Id, UNKNOWN_MANUFACTURER,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Where an asset's manufacturer name came from.
///
/// Upstream payloads either embed the manufacturer object or carry a flat
/// `manufacturer_name` next to a bare id. Both collapse into this type at
/// ingestion so nothing downstream inspects the raw shape again.
#[derive(Debug, Clone, PartialEq)]
pub enum ManufacturerRef {
    Embedded { name: String },
    Flat(String),
    Unknown,
}

impl ManufacturerRef {
    /// Normalize the two payload shapes: embedded name first, then the flat one
    pub fn normalize(embedded_name: Option<&str>, flat_name: Option<&str>) -> Self {
        let non_empty = |s: &&str| !s.trim().is_empty();

        if let Some(name) = embedded_name.filter(non_empty) {
            return ManufacturerRef::Embedded {
                name: name.to_string(),
            };
        }
        if let Some(name) = flat_name.filter(non_empty) {
            return ManufacturerRef::Flat(name.to_string());
        }
        ManufacturerRef::Unknown
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ManufacturerRef::Embedded { name } => Some(name.as_str()),
            ManufacturerRef::Flat(name) => Some(name.as_str()),
            ManufacturerRef::Unknown => None,
        }
    }

    /// Name for display, `-` when unknown
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNKNOWN_MANUFACTURER)
    }
}

/// A catalog entry describing a type of physical item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AssetPayload", into = "AssetPayload")]
pub struct Asset {
    pub id: Id,
    pub name: String,
    /// Human-facing code such as "DR-204"
    pub type_id: String,
    pub manufacturer_id: Option<Id>,
    pub manufacturer: ManufacturerRef,
    pub model: String,
    /// Overall width in millimeters
    pub overall_width: Option<Dimension>,
    pub description: Option<String>,
    pub components: Vec<ComponentDefinition>,
}

impl Asset {
    pub fn manufacturer_name(&self) -> &str {
        self.manufacturer.display_name()
    }

    /// Width in millimeters; missing, unparseable or negative widths count as zero
    pub fn width_mm(&self) -> f64 {
        self.overall_width
            .as_ref()
            .map(Dimension::value)
            .unwrap_or(0.0)
            .max(0.0)
    }

    pub fn component(&self, component_id: Id) -> Option<&ComponentDefinition> {
        self.components
            .iter()
            .find(|component| component.id == Some(component_id))
    }

    /// Component definitions included automatically with every instance
    pub fn required_components(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.components
            .iter()
            .filter(|component| !component.can_add_per_instance)
    }

    /// Searchable text fields, lowercase matching is up to the caller
    pub fn search_fields(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.type_id.as_str(),
            self.model.as_str(),
            self.manufacturer_name(),
        ]
    }
}

/// Declares that a parent asset requires, or may optionally include, a child asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_asset_id: Option<Id>,
    /// Fully nested child, filled by expansion or supplied inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_asset: Option<Box<Asset>>,
    #[serde(default = "default_quantity", deserialize_with = "quantity_or_one")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_add_per_instance: bool,
}

impl ComponentDefinition {
    pub fn child(&self) -> Option<&Asset> {
        self.child_asset.as_deref()
    }

    pub fn child_id(&self) -> Option<Id> {
        self.child_asset
            .as_ref()
            .map(|child| child.id)
            .or(self.child_asset_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ManufacturerField {
    Object(EmbeddedManufacturer),
    Id(Id),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddedManufacturer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// Wire shape of an asset as exchanged over JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssetPayload {
    id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    type_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manufacturer: Option<ManufacturerField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manufacturer_name: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    overall_width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    components: Vec<ComponentDefinition>,
}

impl From<AssetPayload> for Asset {
    fn from(payload: AssetPayload) -> Self {
        let (manufacturer_id, embedded_name) = match payload.manufacturer {
            Some(ManufacturerField::Object(embedded)) => (embedded.id, embedded.name),
            Some(ManufacturerField::Id(id)) => (Some(id), None),
            None => (None, None),
        };

        Asset {
            id: payload.id,
            name: payload.name,
            type_id: payload.type_id,
            manufacturer_id,
            manufacturer: ManufacturerRef::normalize(
                embedded_name.as_deref(),
                payload.manufacturer_name.as_deref(),
            ),
            model: payload.model.unwrap_or_default(),
            overall_width: payload.overall_width,
            description: payload.description,
            components: payload.components,
        }
    }
}

impl From<Asset> for AssetPayload {
    fn from(asset: Asset) -> Self {
        let manufacturer_name = asset.manufacturer.name().map(str::to_string);
        let manufacturer = match &asset.manufacturer {
            ManufacturerRef::Embedded { name } => {
                Some(ManufacturerField::Object(EmbeddedManufacturer {
                    id: asset.manufacturer_id,
                    name: Some(name.clone()),
                }))
            }
            _ => asset.manufacturer_id.map(ManufacturerField::Id),
        };

        AssetPayload {
            id: asset.id,
            name: asset.name,
            type_id: asset.type_id,
            manufacturer,
            manufacturer_name,
            model: Some(asset.model),
            overall_width: asset.overall_width,
            description: asset.description,
            components: asset.components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_manufacturer_is_preferred() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 1,
            "name": "Gondola",
            "type_id": "GN-100",
            "manufacturer": {"id": 7, "name": "Madix"},
            "manufacturer_name": "Lozier"
        }))
        .unwrap();

        assert_eq!(asset.manufacturer_id, Some(7));
        assert_eq!(
            asset.manufacturer,
            ManufacturerRef::Embedded {
                name: "Madix".to_string()
            }
        );
        assert_eq!(asset.manufacturer_name(), "Madix");
    }

    #[test]
    fn test_flat_manufacturer_name() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 2,
            "name": "Endcap",
            "type_id": "EC-20",
            "manufacturer": 4,
            "manufacturer_name": "Lozier"
        }))
        .unwrap();

        assert_eq!(asset.manufacturer_id, Some(4));
        assert_eq!(asset.manufacturer, ManufacturerRef::Flat("Lozier".to_string()));
    }

    #[test]
    fn test_embedded_without_name_falls_back_to_flat() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 3,
            "name": "Hook",
            "type_id": "HK-1",
            "manufacturer": {"id": 4},
            "manufacturer_name": "Lozier"
        }))
        .unwrap();

        assert_eq!(asset.manufacturer_name(), "Lozier");
    }

    #[test]
    fn test_missing_manufacturer_uses_placeholder() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 4,
            "name": "Sign",
            "type_id": "SG-1",
            "manufacturer_name": "   "
        }))
        .unwrap();

        assert_eq!(asset.manufacturer, ManufacturerRef::Unknown);
        assert_eq!(asset.manufacturer_name(), "-");
        assert_eq!(asset.model, "");
        assert_eq!(asset.width_mm(), 0.0);
    }

    #[test]
    fn test_nested_components_and_string_width() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 10,
            "name": "Wall Bay",
            "type_id": "WB-48",
            "overall_width": "1219.20",
            "components": [
                {"id": 100, "child_asset": {"id": 11, "name": "Shelf", "type_id": "SH-48"}, "quantity": 4},
                {"id": 101, "child_asset_id": 12, "quantity": 1, "can_add_per_instance": true}
            ]
        }))
        .unwrap();

        assert_eq!(asset.width_mm(), 1219.2);
        assert_eq!(asset.components.len(), 2);
        assert_eq!(asset.components[0].child_id(), Some(11));
        assert_eq!(asset.components[1].child_id(), Some(12));
        assert!(asset.components[1].child().is_none());
        assert_eq!(asset.required_components().count(), 1);
        assert_eq!(asset.component(101).map(|c| c.quantity), Some(1));
    }

    #[test]
    fn test_null_and_malformed_fields_read_as_defaults() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 6,
            "name": null,
            "type_id": null,
            "model": null,
            "overall_width": false,
            "components": null
        }))
        .unwrap();

        assert_eq!(asset.name, "");
        assert_eq!(asset.type_id, "");
        assert!(asset.components.is_empty());
        assert_eq!(asset.width_mm(), 0.0);

        let component: ComponentDefinition = serde_json::from_value(json!({
            "id": 7,
            "child_asset_id": 8,
            "quantity": null,
            "can_add_per_instance": null
        }))
        .unwrap();
        assert_eq!(component.quantity, 1);
        assert!(!component.can_add_per_instance);
    }

    #[test]
    fn test_negative_width_counts_as_zero() {
        let asset: Asset = serde_json::from_value(json!({
            "id": 9,
            "name": "Filler",
            "type_id": "FL-1",
            "overall_width": "-609.6"
        }))
        .unwrap();

        assert_eq!(asset.width_mm(), 0.0);
    }

    #[test]
    fn test_serialization_keeps_manufacturer_shape() {
        let asset = Asset {
            id: 5,
            name: "Peg Hook".to_string(),
            type_id: "PH-6".to_string(),
            manufacturer_id: Some(9),
            manufacturer: ManufacturerRef::Flat("Trion".to_string()),
            model: "6in".to_string(),
            overall_width: None,
            description: None,
            components: vec![],
        };

        let value = serde_json::to_value(&asset).unwrap();
        assert_eq!(value["manufacturer"], json!(9));
        assert_eq!(value["manufacturer_name"], json!("Trion"));

        let back: Asset = serde_json::from_value(value).unwrap();
        assert_eq!(back, asset);
    }
}
