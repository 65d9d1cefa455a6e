use crate::model::{
    default_quantity, null_as_default, quantity_or_one, Asset, ComponentDefinition, Id,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Custom field holding the merchandising category tag(s)
pub const MERCH_CATEGORY_FIELD: &str = "merch_category";

/// Delimiter separating several categories inside one tag
pub const CATEGORY_DELIMITER: &str = "//";

/// One occurrence of an asset placed within a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInstance {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<Id>,
    #[serde(rename = "asset", default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<Id>,
    /// Fully nested asset; instances without one take no part in aggregation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_details: Option<Asset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_fields: HashMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub optional_components: Vec<OptionalComponentInstance>,
}

impl AssetInstance {
    pub fn asset(&self) -> Option<&Asset> {
        self.asset_details.as_ref()
    }

    pub fn resolved_asset_id(&self) -> Option<Id> {
        self.asset_details
            .as_ref()
            .map(|asset| asset.id)
            .or(self.asset_id)
    }

    /// The raw merchandising tag, if present as a non-blank string
    pub fn merch_category(&self) -> Option<&str> {
        self.custom_fields
            .get(MERCH_CATEGORY_FIELD)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }

    /// Category names encoded in the merchandising tag, trimmed, empties dropped
    pub fn merch_categories(&self) -> Vec<&str> {
        self.merch_category()
            .map(split_categories)
            .unwrap_or_default()
    }
}

/// Split a merchandising tag on `//` into trimmed, non-empty category names
pub fn split_categories(tag: &str) -> Vec<&str> {
    tag.split(CATEGORY_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// An optional component actually added to a specific asset instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalComponentInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "component", default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_details: Option<ComponentDefinition>,
    #[serde(default = "default_quantity", deserialize_with = "quantity_or_one")]
    pub quantity: u32,
}

impl OptionalComponentInstance {
    pub fn component(&self) -> Option<&ComponentDefinition> {
        self.component_details.as_ref()
    }

    pub fn child(&self) -> Option<&Asset> {
        self.component_details
            .as_ref()
            .and_then(ComponentDefinition::child)
    }

    pub fn resolved_component_id(&self) -> Option<Id> {
        self.component_details
            .as_ref()
            .and_then(|component| component.id)
            .or(self.component_id)
    }
}
