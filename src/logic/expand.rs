use crate::model::{Asset, AssetInstance, ComponentDefinition, Id, OptionalComponentInstance};
use log::debug;
use std::collections::HashMap;

/// Asset catalog keyed by id, used to resolve stored references
pub type AssetCatalog = HashMap<Id, Asset>;

pub fn build_catalog(assets: Vec<Asset>) -> AssetCatalog {
    assets.into_iter().map(|asset| (asset.id, asset)).collect()
}

/// Resolves stored id references into the nested shape the aggregators read.
///
/// Only one level of component nesting is resolved: a child asset keeps its
/// own component definitions as stored, unexpanded.
pub struct Expander;

impl Expander {
    pub fn expand_instances(
        instances: Vec<AssetInstance>,
        catalog: &AssetCatalog,
    ) -> Vec<AssetInstance> {
        instances
            .into_iter()
            .map(|instance| Self::expand_instance(instance, catalog))
            .collect()
    }

    pub fn expand_instance(mut instance: AssetInstance, catalog: &AssetCatalog) -> AssetInstance {
        let asset = match instance.asset_details.take() {
            Some(nested) => Some(nested),
            None => instance.asset_id.and_then(|id| catalog.get(&id).cloned()),
        };

        let Some(asset) = asset.map(|asset| Self::expand_asset(asset, catalog)) else {
            debug!(
                "Instance {} references unknown asset {:?}",
                instance.id, instance.asset_id
            );
            return instance;
        };

        instance.optional_components = instance
            .optional_components
            .into_iter()
            .map(|optional| Self::resolve_optional(optional, &asset, catalog))
            .collect();
        instance.asset_id = Some(asset.id);
        instance.asset_details = Some(asset);
        instance
    }

    /// Attach child assets to every component definition of `asset`
    pub fn expand_asset(mut asset: Asset, catalog: &AssetCatalog) -> Asset {
        asset.components = asset
            .components
            .into_iter()
            .map(|component| Self::resolve_child(component, catalog))
            .collect();
        asset
    }

    fn resolve_child(mut component: ComponentDefinition, catalog: &AssetCatalog) -> ComponentDefinition {
        if component.child_asset.is_none() {
            component.child_asset = component
                .child_asset_id
                .and_then(|id| catalog.get(&id))
                .map(|child| Box::new(child.clone()));
        }
        component
    }

    fn resolve_optional(
        mut optional: OptionalComponentInstance,
        parent: &Asset,
        catalog: &AssetCatalog,
    ) -> OptionalComponentInstance {
        optional.component_details = match optional.component_details.take() {
            Some(nested) => Some(Self::resolve_child(nested, catalog)),
            None => optional
                .component_id
                .and_then(|id| parent.component(id))
                .cloned(),
        };

        if optional.component_details.is_none() {
            debug!(
                "Optional component {:?} not defined on asset {}",
                optional.component_id, parent.id
            );
        }
        optional
    }
}
