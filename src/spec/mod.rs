//! Style spec model.
//!
//! Parses a `v8.json`-shaped style reference into an immutable model:
//! - `layer.type.values` names the layer types and their docs
//! - `layout_<type>` / `paint_<type>` hold each layer's properties
//! - `light` holds the light properties
//!
//! The model is loaded once per generation run and never mutated.

pub mod collate;
pub mod layer;
pub mod property;

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::SpecError;
use property::RawProperty;

pub use collate::locale_cmp;
pub use layer::LayerSpec;
pub use property::{PropertyKind, PropertySpec, ValueType};

/// Style reference bundled with the crate.
pub const EMBEDDED_SPEC: &str = include_str!("../../style-spec/v8.json");

/// Parsed style specification.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpec {
    /// Layer types, sorted by type name
    pub layers: Vec<LayerSpec>,
    /// Light properties, sorted by name
    pub light: Vec<PropertySpec>,
}

impl StyleSpec {
    /// Parse the bundled style reference.
    pub fn embedded() -> Result<Self, SpecError> {
        parse_spec_str(EMBEDDED_SPEC)
    }

    /// Find a layer type by name.
    pub fn layer(&self, type_name: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.type_name == type_name)
    }
}

/// Parse a style spec JSON file.
pub fn parse_spec(path: &Path) -> Result<StyleSpec, SpecError> {
    let content = fs::read_to_string(path)?;
    parse_spec_str(&content)
}

/// Parse a style spec from a JSON string.
pub fn parse_spec_str(json: &str) -> Result<StyleSpec, SpecError> {
    let root: Map<String, Value> = serde_json::from_str(json)?;

    let layer_types = root
        .get("layer")
        .and_then(|l| l.get("type"))
        .and_then(|t| t.get("values"))
        .and_then(Value::as_object)
        .ok_or_else(|| SpecError::Invalid("missing `layer.type.values`".to_string()))?;

    let mut layers = Vec::with_capacity(layer_types.len());
    for (type_name, entry) in layer_types {
        let doc = entry
            .get("doc")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let layout = property_set(&root, &format!("layout_{type_name}"))?;
        let paint = property_set(&root, &format!("paint_{type_name}"))?;
        layers.push(LayerSpec::new(type_name.as_str(), doc, layout, paint));
    }
    layers.sort_by(|a, b| locale_cmp(&a.type_name, &b.type_name));

    let mut light = property_set(&root, "light")?;
    light.sort_by(|a, b| locale_cmp(&a.name, &b.name));

    log::debug!(
        "Parsed style spec: {} layer types, {} light properties",
        layers.len(),
        light.len()
    );

    Ok(StyleSpec { layers, light })
}

/// Read one `{ name: property }` object. A missing set is empty.
fn property_set(root: &Map<String, Value>, key: &str) -> Result<Vec<PropertySpec>, SpecError> {
    let Some(value) = root.get(key) else {
        return Ok(Vec::new());
    };
    if !value.is_object() {
        return Err(SpecError::Invalid(format!("`{key}` is not an object")));
    }
    let raw: IndexMap<String, RawProperty> = serde_json::from_value(value.clone())?;
    let mut properties = Vec::with_capacity(raw.len());
    for (name, raw) in raw {
        properties.push(raw.into_spec(name)?);
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeError;

    fn minimal_spec_json() -> &'static str {
        r##"{
            "$version": 8,
            "layer": { "type": { "type": "enum", "values": {
                "fill": { "doc": "A filled polygon." },
                "background": { "doc": "The background color or pattern of the map." }
            } } },
            "layout_fill": {
                "visibility": { "type": "enum", "values": { "visible": {}, "none": {} }, "default": "visible", "property-type": "constant" },
                "fill-sort-key": { "type": "number", "property-type": "data-driven" }
            },
            "paint_fill": {
                "fill-opacity": { "type": "number", "default": 1, "property-type": "data-driven" },
                "fill-color": { "type": "color", "default": "#000000", "property-type": "data-driven" }
            },
            "layout_background": {
                "visibility": { "type": "enum", "values": { "visible": {}, "none": {} }, "default": "visible", "property-type": "constant" }
            },
            "paint_background": {
                "background-color": { "type": "color", "default": "#000000", "property-type": "data-constant" }
            },
            "light": {
                "intensity": { "type": "number", "default": 0.5, "property-type": "data-constant" },
                "anchor": { "type": "enum", "values": { "map": {}, "viewport": {} }, "default": "viewport", "property-type": "data-constant" }
            }
        }"##
    }

    #[test]
    fn test_parse_minimal_spec() {
        let spec = parse_spec_str(minimal_spec_json()).unwrap();
        let types: Vec<_> = spec.layers.iter().map(|l| l.type_name.as_str()).collect();
        assert_eq!(types, vec!["background", "fill"]);

        let fill = spec.layer("fill").unwrap();
        assert_eq!(fill.doc, "A filled polygon.");
        let paint: Vec<_> = fill.paint.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(paint, vec!["fill-color", "fill-opacity"]);
        let layout: Vec<_> = fill.layout.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(layout, vec!["fill-sort-key"]);

        let light: Vec<_> = spec.light.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(light, vec!["anchor", "intensity"]);
    }

    #[test]
    fn test_missing_layer_types_is_invalid() {
        let err = parse_spec_str(r#"{ "light": {} }"#).unwrap_err();
        assert!(matches!(err, SpecError::Invalid(_)));
    }

    #[test]
    fn test_unknown_type_aborts_load() {
        let json = r#"{
            "layer": { "type": { "values": { "fill": {} } } },
            "paint_fill": { "fill-sprite": { "type": "sprite" } }
        }"#;
        let err = parse_spec_str(json).unwrap_err();
        assert!(matches!(
            err,
            SpecError::Type(TypeError::UnknownType { ref property, .. }) if property == "fill-sprite"
        ));
    }

    #[test]
    fn test_embedded_spec_parses() {
        let spec = StyleSpec::embedded().unwrap();
        for name in ["background", "circle", "fill", "fill-extrusion", "heatmap", "hillshade", "line", "raster", "symbol"] {
            assert!(spec.layer(name).is_some(), "missing layer type {name}");
        }
        assert!(spec.layers.iter().all(|l| l.layout_property("visibility").is_none()));
        assert_eq!(spec.light.len(), 4);
    }
}
